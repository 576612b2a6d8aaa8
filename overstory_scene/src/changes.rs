// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change summaries returned from commit.

use crate::types::NodeId;

/// A node's resolved active state flipped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ActiveChange {
    /// The node whose membership in the active set changed.
    pub node: NodeId,
    /// The new membership: `true` if the node just became active.
    pub active: bool,
}

/// A batched set of changes derived from [`crate::Scene::commit`].
///
/// Carries every active-state flip observed since the previous commit, in
/// the order they were observed: eager flag mutations first, then any flips
/// the resolution pass itself produced.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Active-state flips, oldest first.
    pub activation: Vec<ActiveChange>,
}

impl FrameChanges {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.activation.is_empty()
    }

    /// Nodes that became active.
    pub fn activated(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.activation
            .iter()
            .filter(|c| c.active)
            .map(|c| c.node)
    }

    /// Nodes that became inactive.
    pub fn deactivated(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.activation
            .iter()
            .filter(|c| !c.active)
            .map(|c| c.node)
    }
}
