// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, mutation, queries.

use glam::{Mat4, Quat, Vec2, Vec3};
use hashbrown::HashSet;
use overstory_cached::{Cached, Propagation};
use smallvec::SmallVec;

use crate::changes::ActiveChange;
use crate::resolve::ResolveStats;
use crate::roots::RootRegistry;
use crate::transform::Transform;
use crate::types::{ActiveFlags, LocalNode, NodeId};

/// `sort_index` value while a node has no parent.
pub(crate) const ORPHAN_SORT_INDEX: usize = usize::MAX;

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    /// Position among siblings; contiguous `0..len` under one parent.
    pub(crate) sort_index: usize,
    /// Creation-order rank while parentless.
    pub(crate) root_order: u64,
    /// Authored components; `transform.local()` is their matrix form.
    pub(crate) local: Transform,
    pub(crate) transform: Cached<Mat4>,
    pub(crate) active: Cached<ActiveFlags>,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: SmallVec::new(),
            sort_index: ORPHAN_SORT_INDEX,
            root_order: 0,
            transform: Cached::new(local.transform.to_matrix(), Propagation::Pull),
            local: local.transform,
            active: Cached::new(local.flags, Propagation::Push),
        }
    }
}

/// Top-level scene tree.
///
/// Nodes live in a generational arena and carry two hierarchy-resolved
/// attributes: a spatial transform (lazy — descendants recompute when read or
/// at [`Scene::commit`]) and active-state flags (eager — mutations re-resolve
/// the affected subtree immediately and maintain the active tag set).
///
/// Structural mutation and local-value setters take `&mut self` and must not
/// interleave with [`Scene::commit`]; the borrow checker enforces exactly
/// that.
///
/// ## Example
///
/// ```rust
/// use glam::Vec3;
/// use overstory_scene::{LocalNode, Scene, Transform};
///
/// let mut scene = Scene::new();
/// let root = scene.insert(None, LocalNode::default());
/// let child = scene.insert(
///     Some(root),
///     LocalNode {
///         transform: Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)),
///         ..LocalNode::default()
///     },
/// );
///
/// scene.set_translation(root, Vec3::new(0.0, 5.0, 0.0));
/// let _ = scene.commit();
///
/// let world = scene.world_transform_cached(child).unwrap();
/// assert_eq!(world.w_axis.truncate(), Vec3::new(10.0, 5.0, 0.0));
/// ```
pub struct Scene {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root_registry: RootRegistry,
    /// Nodes whose resolved ACTIVE bit is set.
    active_set: HashSet<NodeId>,
    pub(crate) pending_activation: Vec<ActiveChange>,
    pub(crate) stats: ResolveStats,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("active", &self.active_set.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root_registry: RootRegistry::default(),
            active_set: HashSet::new(),
            pending_activation: Vec::new(),
            stats: ResolveStats::default(),
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// A stale `parent` is treated as absent: the node becomes a root rather
    /// than failing, which keeps construction of partially-initialized
    /// hierarchies resilient. The new node's flags are resolved immediately,
    /// so the active tag set is correct from birth; its transform resolves on
    /// first read or at the next [`Scene::commit`].
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        match parent {
            Some(p) if self.is_alive(p) => self.attach_child(p, id),
            Some(_) => {
                log::debug!("insert: parent handle is stale, inserting as root");
                self.register_root(id);
            }
            None => self.register_root(id),
        }
        self.refresh_active_subtree(id);
        id
    }

    /// Remove a node and its entire subtree from the scene.
    ///
    /// Descendants do not outlive a removed ancestor: the whole reachable
    /// subtree is destroyed and every involved id becomes stale. Destroyed
    /// nodes leave the active tag set without producing change records.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        match self.node(id).parent {
            Some(parent) => {
                self.detach_child(parent, id);
            }
            None => self.root_registry.signal_changed(),
        }
        self.remove_subtree(id);
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let children = self.node(id).children.clone();
        for child in children {
            self.remove_subtree(child);
        }
        self.active_set.remove(&id);
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Move `id` under `new_parent` (or make it a root for `None`).
    ///
    /// Returns `false` with no mutation at all when the move is invalid:
    /// `id` or `new_parent` is stale, `new_parent` is `id` itself or a
    /// descendant of `id` (the move would create a cycle), or `new_parent`
    /// already is the current parent.
    ///
    /// With `preserve_world` the node's world transform is snapshotted before
    /// the move and its local transform rewritten so the node does not move
    /// in world space; the decomposed component view recovers translation,
    /// rotation, and scale from that matrix (see
    /// [`Transform::from_matrix`]).
    pub fn set_parent(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        preserve_world: bool,
    ) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        if let Some(np) = new_parent {
            if !self.is_alive(np) {
                log::warn!("set_parent: target parent is stale");
                return false;
            }
            if np == id {
                log::warn!("set_parent: a node cannot be its own parent");
                return false;
            }
            if self.in_subtree_of(np, id) {
                log::warn!("set_parent: target parent is a descendant, move would create a cycle");
                return false;
            }
        }
        if self.node(id).parent == new_parent {
            return false;
        }

        let snapshot = preserve_world.then(|| self.world_matrix_now(id));

        match self.node(id).parent {
            Some(old) => {
                self.detach_child(old, id);
            }
            // A root is leaving the root set.
            None => self.root_registry.signal_changed(),
        }
        match new_parent {
            Some(np) => self.attach_child(np, id),
            None => self.register_root(id),
        }

        if let Some(world) = snapshot {
            let local = match new_parent {
                Some(np) => self.world_matrix_now(np).inverse() * world,
                None => world,
            };
            let node = self.node_mut(id);
            node.local = Transform::from_matrix(&local);
            node.transform.set_local(local);
        }

        self.mark_transform_subtree_dirty(id);
        self.refresh_active_subtree(id);
        true
    }

    // --- local transform ---

    /// The authored local transform components of a live node.
    pub fn local_transform(&self, id: NodeId) -> Option<Transform> {
        self.node_opt(id).map(|n| n.local)
    }

    /// The matrix form of a live node's local transform.
    pub fn local_matrix(&self, id: NodeId) -> Option<Mat4> {
        self.node_opt(id).map(|n| *n.transform.local())
    }

    /// Replace the local transform.
    ///
    /// Invalidation is lazy: only this node is marked stale, and descendants
    /// recompute through the stale chain when they are actually read or at
    /// the next [`Scene::commit`].
    pub fn set_local_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(n) = self.node_opt_mut(id)
            && n.local != transform
        {
            n.local = transform;
            n.transform.set_local(transform.to_matrix());
        }
    }

    /// Update the local translation.
    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        self.update_transform(id, |t| t.translation = translation);
    }

    /// Update the local rotation.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) {
        self.update_transform(id, |t| t.rotation = rotation);
    }

    /// Update the local scale.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) {
        self.update_transform(id, |t| t.scale = scale);
    }

    /// Update the local shear factors.
    pub fn set_skew(&mut self, id: NodeId, skew: Vec2) {
        self.update_transform(id, |t| t.skew = skew);
    }

    /// Update the local perspective distance (`0.0` disables it).
    pub fn set_perspective(&mut self, id: NodeId, perspective: f32) {
        self.update_transform(id, |t| t.perspective = perspective);
    }

    fn update_transform(&mut self, id: NodeId, update: impl FnOnce(&mut Transform)) {
        if let Some(n) = self.node_opt_mut(id) {
            let mut t = n.local;
            update(&mut t);
            if t != n.local {
                n.local = t;
                n.transform.set_local(t.to_matrix());
            }
        }
    }

    // --- active flags ---

    /// The authored flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<ActiveFlags> {
        self.node_opt(id).map(|n| *n.active.local())
    }

    /// Replace the authored flags.
    ///
    /// Flags propagate eagerly: the affected subtree is re-resolved
    /// immediately, the active tag set is updated, and one change record is
    /// produced per node whose resolved active state actually flipped.
    pub fn set_flags(&mut self, id: NodeId, flags: ActiveFlags) {
        if let Some(n) = self.node_opt_mut(id)
            && *n.active.local() != flags
        {
            n.active.set_local(flags);
            self.refresh_active_subtree(id);
        }
    }

    /// The hierarchy-resolved flags of a live node.
    ///
    /// Always current: flag mutations and reparenting re-resolve eagerly.
    pub fn world_flags(&self, id: NodeId) -> Option<ActiveFlags> {
        self.node_opt(id).map(|n| *n.active.resolved())
    }

    /// Whether a node's resolved ACTIVE bit is set (`false` for stale ids).
    pub fn is_active(&self, id: NodeId) -> bool {
        self.active_set.contains(&id)
    }

    /// Iterate the nodes whose resolved ACTIVE bit is set, in no particular
    /// order.
    pub fn active_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.active_set.iter().copied()
    }

    // --- structure queries ---

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation
    /// matches the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node(id).children
    }

    /// Position among siblings, or `None` for roots and stale ids.
    ///
    /// Sibling indices are contiguous: the live children of any parent carry
    /// exactly `0..len`.
    pub fn sort_index(&self, id: NodeId) -> Option<usize> {
        let n = self.node_opt(id)?;
        n.parent.map(|_| n.sort_index)
    }

    /// Creation-order rank among roots, or `None` for parented and stale ids.
    ///
    /// Assigned anew each time a node becomes parentless, monotonically
    /// across the scene's lifetime.
    pub fn root_order(&self, id: NodeId) -> Option<u64> {
        let n = self.node_opt(id)?;
        match n.parent {
            None => Some(n.root_order),
            Some(_) => None,
        }
    }

    /// Live parentless nodes, ordered by creation-order rank.
    pub fn roots(&self) -> Vec<NodeId> {
        let mut roots: Vec<(u64, NodeId)> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some((n.root_order, NodeId::new(i as u32, n.generation)))
                }
                _ => None,
            })
            .collect();
        roots.sort_unstable_by_key(|&(order, _)| order);
        roots.into_iter().map(|(_, id)| id).collect()
    }

    /// Read and clear the "root set changed" signal.
    ///
    /// Single-consumer semantics: whichever component caches the ordered
    /// root list owns this signal and refreshes via [`Scene::roots`] when it
    /// fires.
    pub fn consume_roots_changed(&mut self) -> bool {
        self.root_registry.consume_changed()
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Whether `node` is `root` or lies in `root`'s subtree.
    fn in_subtree_of(&self, mut node: NodeId, root: NodeId) -> bool {
        loop {
            if node == root {
                return true;
            }
            match self.node(node).parent {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    fn attach_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.node(child).parent.is_none(),
            "attach_child expects a detached child"
        );
        let parent_node = self.node_mut(parent);
        parent_node.children.push(child);
        let sort_index = parent_node.children.len() - 1;
        let child_node = self.node_mut(child);
        child_node.parent = Some(parent);
        child_node.sort_index = sort_index;
    }

    /// Unlink `child` from `parent`, keeping sibling indices contiguous.
    ///
    /// Returns `false` if `child` is not among `parent`'s children.
    fn detach_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(pos) = self.node(parent).children.iter().position(|&c| c == child) else {
            return false;
        };
        self.node_mut(parent).children.remove(pos);
        let shifted: SmallVec<[NodeId; 4]> =
            self.node(parent).children[pos..].iter().copied().collect();
        for (offset, sibling) in shifted.into_iter().enumerate() {
            self.node_mut(sibling).sort_index = pos + offset;
        }
        let child_node = self.node_mut(child);
        child_node.parent = None;
        child_node.sort_index = ORPHAN_SORT_INDEX;
        true
    }

    fn register_root(&mut self, id: NodeId) {
        let order = self.root_registry.assign_order();
        let node = self.node_mut(id);
        node.parent = None;
        node.sort_index = ORPHAN_SORT_INDEX;
        node.root_order = order;
    }

    /// Compose local matrices from the root down to `id`, independent of any
    /// memoized state. Used where a mutation needs a trustworthy world value
    /// (for example a preserve-world snapshot) without touching dirty bits.
    fn world_matrix_now(&self, id: NodeId) -> Mat4 {
        let node = self.node(id);
        let local = *node.transform.local();
        match node.parent {
            Some(p) => self.world_matrix_now(p) * local,
            None => local,
        }
    }

    fn mark_transform_subtree_dirty(&mut self, id: NodeId) {
        let children = {
            let n = self.node_mut(id);
            n.transform.mark_all_dirty();
            n.children.clone()
        };
        for child in children {
            self.mark_transform_subtree_dirty(child);
        }
    }

    /// Re-resolve flags for `id`'s subtree from its parent's (current)
    /// resolved flags, updating the tag set as it goes.
    fn refresh_active_subtree(&mut self, id: NodeId) {
        let parent_flags = self
            .node(id)
            .parent
            .map(|p| *self.node(p).active.resolved());
        self.refresh_active_recursive(id, parent_flags);
    }

    fn refresh_active_recursive(&mut self, id: NodeId, parent: Option<ActiveFlags>) {
        let resolved = *self.node_mut(id).active.resolve(parent.as_ref());
        self.stats.flag_recomputes += 1;
        self.apply_activation(id, resolved.contains(ActiveFlags::ACTIVE));
        let children = self.node(id).children.clone();
        for child in children {
            self.refresh_active_recursive(child, Some(resolved));
        }
    }

    /// Ensure tag-set membership matches `active`, recording actual flips.
    pub(crate) fn apply_activation(&mut self, id: NodeId, active: bool) {
        let flipped = if active {
            self.active_set.insert(id)
        } else {
            self.active_set.remove(&id)
        };
        if flipped {
            self.pending_activation.push(ActiveChange { node: id, active });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::default());
        let a = scene.insert(Some(root), LocalNode::default());

        assert!(scene.is_alive(root));
        assert!(scene.is_alive(a));

        scene.remove(a);
        assert!(!scene.is_alive(a));

        let b = scene.insert(Some(root), LocalNode::default());
        assert!(scene.is_alive(b));
        assert!(!scene.is_alive(a));
        // Sanity: either same slot or different, but if same slot, generation must be greater.
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn children_are_ordered_with_contiguous_indices() {
        let mut scene = Scene::new();
        let p = scene.insert(None, LocalNode::default());
        let a = scene.insert(Some(p), LocalNode::default());
        let b = scene.insert(Some(p), LocalNode::default());
        let c = scene.insert(Some(p), LocalNode::default());

        assert_eq!(scene.children_of(p), &[a, b, c]);
        assert_eq!(scene.sort_index(a), Some(0));
        assert_eq!(scene.sort_index(b), Some(1));
        assert_eq!(scene.sort_index(c), Some(2));
        assert_eq!(scene.sort_index(p), None, "roots have no sibling index");
    }

    #[test]
    fn detach_reindexes_remaining_siblings() {
        let mut scene = Scene::new();
        let p = scene.insert(None, LocalNode::default());
        let a = scene.insert(Some(p), LocalNode::default());
        let b = scene.insert(Some(p), LocalNode::default());
        let c = scene.insert(Some(p), LocalNode::default());

        assert!(scene.set_parent(b, None, false));
        assert_eq!(scene.children_of(p), &[a, c]);
        assert_eq!(scene.sort_index(a), Some(0));
        assert_eq!(scene.sort_index(c), Some(1));
        assert_eq!(scene.sort_index(b), None);
        assert!(scene.root_order(b).is_some(), "detached node is a root now");
    }

    #[test]
    fn self_parenting_is_rejected() {
        let mut scene = Scene::new();
        let n = scene.insert(None, LocalNode::default());
        assert!(!scene.set_parent(n, Some(n), false));
        assert_eq!(scene.parent_of(n), None);
    }

    #[test]
    fn cycle_is_rejected_without_mutation() {
        let mut scene = Scene::new();
        let a = scene.insert(None, LocalNode::default());
        let b = scene.insert(None, LocalNode::default());

        assert!(scene.set_parent(a, Some(b), false));
        assert!(!scene.set_parent(b, Some(a), false), "b is a's ancestor");
        assert_eq!(scene.parent_of(b), None, "rejected move must not mutate");
        assert_eq!(scene.parent_of(a), Some(b));

        // Deeper cycle: grandchild as parent.
        let c = scene.insert(Some(a), LocalNode::default());
        assert!(!scene.set_parent(b, Some(c), false));
        assert_eq!(scene.parent_of(b), None);
    }

    #[test]
    fn reparent_to_current_parent_is_a_noop() {
        let mut scene = Scene::new();
        let p = scene.insert(None, LocalNode::default());
        let n = scene.insert(Some(p), LocalNode::default());
        assert!(!scene.set_parent(n, Some(p), false));
        // Roots: None -> None is also a no-op.
        assert!(!scene.set_parent(p, None, false));
    }

    #[test]
    fn stale_ids_are_inert() {
        let mut scene = Scene::new();
        let n = scene.insert(None, LocalNode::default());
        scene.remove(n);

        assert_eq!(scene.parent_of(n), None);
        assert!(scene.children_of(n).is_empty());
        assert_eq!(scene.sort_index(n), None);
        assert_eq!(scene.root_order(n), None);
        assert_eq!(scene.local_transform(n), None);
        assert_eq!(scene.flags(n), None);
        assert!(!scene.is_active(n));
        assert!(!scene.set_parent(n, None, false));
        // Setters must not panic on stale ids.
        scene.set_translation(n, Vec3::ONE);
        scene.set_flags(n, ActiveFlags::empty());
    }

    #[test]
    fn remove_cascades_to_descendants() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::default());
        let a = scene.insert(Some(root), LocalNode::default());
        let b = scene.insert(Some(a), LocalNode::default());

        scene.remove(a);
        assert!(!scene.is_alive(a));
        assert!(!scene.is_alive(b), "descendants do not outlive an ancestor");
        assert!(scene.children_of(root).is_empty());
        assert!(!scene.is_active(b), "destroyed nodes leave the tag set");
    }

    #[test]
    fn root_set_changes_are_signalled() {
        let mut scene = Scene::new();
        assert!(!scene.consume_roots_changed());

        let r = scene.insert(None, LocalNode::default());
        assert!(scene.consume_roots_changed(), "insert as root signals");
        assert!(!scene.consume_roots_changed(), "signal is read-and-clear");

        let c = scene.insert(Some(r), LocalNode::default());
        assert!(!scene.consume_roots_changed(), "child insert does not");

        assert!(scene.set_parent(c, None, false));
        assert!(scene.consume_roots_changed(), "detach to root signals");

        assert!(scene.set_parent(c, Some(r), false));
        assert!(scene.consume_roots_changed(), "root gaining a parent signals");

        scene.remove(r);
        assert!(scene.consume_roots_changed(), "removing a root signals");
    }

    #[test]
    fn roots_are_ordered_by_creation() {
        let mut scene = Scene::new();
        let r1 = scene.insert(None, LocalNode::default());
        let r2 = scene.insert(None, LocalNode::default());
        let child = scene.insert(Some(r1), LocalNode::default());

        assert_eq!(scene.roots(), vec![r1, r2]);

        // A node detached to root ranks after every existing root.
        assert!(scene.set_parent(child, None, false));
        assert_eq!(scene.roots(), vec![r1, r2, child]);
        assert!(scene.root_order(child) > scene.root_order(r2));
    }

    #[test]
    fn stale_parent_on_insert_falls_back_to_root() {
        let mut scene = Scene::new();
        let p = scene.insert(None, LocalNode::default());
        scene.remove(p);

        let n = scene.insert(Some(p), LocalNode::default());
        assert_eq!(scene.parent_of(n), None);
        assert!(scene.root_order(n).is_some());
    }

    #[test]
    fn flag_intersection_down_a_three_level_chain() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::default());
        let mid = scene.insert(Some(root), LocalNode::default());
        let leaf = scene.insert(Some(mid), LocalNode::default());

        // Deactivate the middle node; the leaf stays locally active but its
        // resolved state goes inactive through the chain.
        scene.set_flags(mid, ActiveFlags::VISIBLE);
        assert!(scene.is_active(root));
        assert!(!scene.is_active(mid));
        assert!(!scene.is_active(leaf));
        assert_eq!(scene.world_flags(leaf), Some(ActiveFlags::VISIBLE));
        assert_eq!(
            scene.flags(leaf),
            Some(ActiveFlags::default()),
            "local flags are untouched"
        );
    }

    #[test]
    fn newborn_under_inactive_parent_is_inactive() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::default());
        scene.set_flags(root, ActiveFlags::empty());

        let child = scene.insert(Some(root), LocalNode::default());
        assert!(!scene.is_active(child));
        assert_eq!(scene.world_flags(child), Some(ActiveFlags::empty()));
    }

    #[test]
    fn reparenting_resolves_flags_eagerly() {
        let mut scene = Scene::new();
        let active_root = scene.insert(None, LocalNode::default());
        let inactive_root = scene.insert(None, LocalNode::default());
        scene.set_flags(inactive_root, ActiveFlags::empty());

        let n = scene.insert(Some(active_root), LocalNode::default());
        let leaf = scene.insert(Some(n), LocalNode::default());
        assert!(scene.is_active(leaf));

        assert!(scene.set_parent(n, Some(inactive_root), false));
        assert!(!scene.is_active(n), "no commit needed, flags push eagerly");
        assert!(!scene.is_active(leaf));

        assert!(scene.set_parent(n, None, false));
        assert!(scene.is_active(leaf), "made a root, nothing inherits away");
    }

    #[test]
    fn active_nodes_mirrors_resolved_state() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::default());
        let a = scene.insert(Some(root), LocalNode::default());
        let b = scene.insert(Some(root), LocalNode::default());
        scene.set_flags(b, ActiveFlags::VISIBLE);

        let mut active: Vec<NodeId> = scene.active_nodes().collect();
        active.sort_by_key(|id| id.0);
        let mut expected = vec![root, a];
        expected.sort_by_key(|id| id.0);
        assert_eq!(active, expected);
    }
}
