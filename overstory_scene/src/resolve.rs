// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame resolution: the forced parallel pass and the lazy pull accessor.

use glam::Mat4;
use overstory_cached::ObserverId;
use rayon::prelude::*;

use crate::changes::FrameChanges;
use crate::tree::Scene;
use crate::types::{ActiveFlags, NodeId};

/// Counters of recombination work, for profiling and staleness debugging.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ResolveStats {
    /// Transform recombinations performed (pull accessor and commit).
    pub transform_recomputes: u64,
    /// Flag recombinations performed (eager refresh and commit).
    pub flag_recomputes: u64,
}

/// One node's freshly computed values, produced by the compute phase.
#[derive(Clone, Copy, Debug)]
struct ResolvedNode {
    id: NodeId,
    world: Mat4,
    flags: ActiveFlags,
}

impl Scene {
    /// Counters of recombination work performed so far.
    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    /// The world transform of a live node, recomputing on demand.
    ///
    /// If `observer`'s staleness bit is set, the accessor climbs the parent
    /// chain — stopping at the first ancestor that is clean for `observer` —
    /// and recombines top-down, clearing only `observer`'s bit on each node
    /// touched. Repeated reads after a single invalidation are amortized
    /// O(1).
    ///
    /// A node whose own bit is clear returns its memo as-is, even if an
    /// ancestor was invalidated afterwards; [`Scene::commit`] restores full
    /// freshness once per frame.
    pub fn world_transform(&mut self, id: NodeId, observer: ObserverId) -> Option<Mat4> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.pull_world_transform(id, observer))
    }

    fn pull_world_transform(&mut self, id: NodeId, observer: ObserverId) -> Mat4 {
        if !self.node(id).transform.is_dirty(observer) {
            return *self.node(id).transform.resolved();
        }
        let parent = self.node(id).parent;
        let parent_world = parent.map(|p| self.pull_world_transform(p, observer));
        self.stats.transform_recomputes += 1;
        *self
            .node_mut(id)
            .transform
            .resolve_observer(parent_world.as_ref(), observer)
    }

    /// The memoized world transform as of the last resolution, with no
    /// staleness check and no recomputation.
    pub fn world_transform_cached(&self, id: NodeId) -> Option<Mat4> {
        if !self.is_alive(id) {
            return None;
        }
        Some(*self.node(id).transform.resolved())
    }

    /// Run the per-frame resolution pass and return what changed.
    ///
    /// Every root subtree is resolved in full, top-down, regardless of dirty
    /// state, so afterwards every memo reflects the current local values and
    /// every dirty bit is clear for every observer.
    ///
    /// The pass fans out one task per root on the rayon pool. Tasks share
    /// the scene read-only and each touches only its own subtree — subtrees
    /// are disjoint by the single-parent, acyclic structure — so the compute
    /// phase needs no locks; the results are written back after the join,
    /// parents first.
    pub fn commit(&mut self) -> FrameChanges {
        let roots = self.roots();
        log::trace!("commit: resolving {} root subtrees", roots.len());

        let scene: &Self = self;
        let resolved: Vec<Vec<ResolvedNode>> = roots
            .par_iter()
            .map(|&root| scene.resolve_subtree(root))
            .collect();

        for batch in resolved {
            for entry in batch {
                let node = self.node_mut(entry.id);
                node.transform.store_resolved(entry.world);
                node.active.store_resolved(entry.flags);
                self.stats.transform_recomputes += 1;
                self.stats.flag_recomputes += 1;
                self.apply_activation(entry.id, entry.flags.contains(ActiveFlags::ACTIVE));
            }
        }

        FrameChanges {
            activation: core::mem::take(&mut self.pending_activation),
        }
    }

    /// Compute fresh values for one root's subtree, depth-first, carrying
    /// each node's freshly computed values down to its children.
    fn resolve_subtree(&self, root: NodeId) -> Vec<ResolvedNode> {
        let mut out = Vec::new();
        let mut stack = vec![(root, Mat4::IDENTITY, ActiveFlags::all())];
        while let Some((id, parent_world, parent_flags)) = stack.pop() {
            let node = self.node(id);
            let world = parent_world * *node.transform.local();
            let flags = parent_flags & *node.active.local();
            out.push(ResolvedNode { id, world, flags });
            // The `.rev()` means children are visited in declared order.
            for &child in node.children.iter().rev() {
                stack.push((child, world, flags));
            }
        }
        out
    }
}
