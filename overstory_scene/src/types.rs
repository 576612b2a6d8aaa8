// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: node identifiers, flags, and local state.

use overstory_cached::Compose;

use crate::transform::Transform;

/// Identifier for a node in the scene (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-node state bits resolved down the hierarchy by intersection.
    ///
    /// A node's resolved bits are the AND of its own bits with every
    /// ancestor's, so clearing a bit anywhere in the chain clears it for the
    /// whole subtree. The resolved [`ActiveFlags::ACTIVE`] bit drives the
    /// scene's active tag set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ActiveFlags: u8 {
        /// Node participates in per-frame updates (scripts, animation, physics).
        const ACTIVE  = 0b0000_0001;
        /// Node participates in rendering.
        const VISIBLE = 0b0000_0010;
    }
}

impl Default for ActiveFlags {
    fn default() -> Self {
        Self::ACTIVE | Self::VISIBLE
    }
}

/// Intersection semantics: `identity` is all bits (a root inherits nothing
/// away) and `compose` is bitwise AND.
impl Compose for ActiveFlags {
    fn identity() -> Self {
        Self::all()
    }

    fn compose(parent: &Self, local: &Self) -> Self {
        *parent & *local
    }
}

/// Authored per-node state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalNode {
    /// Local transform relative to parent space.
    pub transform: Transform,
    /// State bits relative to parent state.
    pub flags: ActiveFlags,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            flags: ActiveFlags::default(),
        }
    }
}
