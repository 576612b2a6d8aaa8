// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Scene: a glam-native scene tree with hierarchy-resolved
//! attributes.
//!
//! Overstory Scene is a reusable building block for engines, editors, and
//! simulation frontends that need "what is my value given where I am in the
//! tree" maintained correctly and cheaply.
//!
//! - Represents a hierarchy of nodes with local transforms and active-state
//!   flags, resolved down the tree (matrix composition and bit
//!   intersection respectively).
//! - Tracks staleness per node and per reader with eight independent
//!   observer bits, so up to eight consumers each self-heal on read without
//!   disturbing one another.
//! - Resolves the whole scene once per frame with [`Scene::commit`], which
//!   fans out across root subtrees on a thread pool and returns an
//!   activation-change summary.
//!
//! ## Two disciplines, chosen per attribute
//!
//! Transforms change often but are read selectively, so they propagate
//! lazily: mutating one marks only the mutated node, and readers (or the
//! commit pass) recompute through the stale chain on demand. Active flags
//! are read by nearly everything and change rarely, so they propagate
//! eagerly: mutating one re-resolves the affected subtree immediately,
//! maintains a tag set of currently-active nodes, and records each actual
//! flip exactly once.
//!
//! ## API overview
//!
//! - [`Scene`]: container managing nodes, both attributes, and the root
//!   registry.
//! - [`LocalNode`]: authored per-node state (transform components, flags).
//! - [`Transform`]: decomposed local transform (translation, rotation,
//!   scale, skew, perspective) with a [`glam::Mat4`] matrix form.
//! - [`ActiveFlags`]: per-node state bits resolved by intersection.
//! - [`NodeId`]: generational handle of a node.
//! - [`ObserverId`] / [`Propagation`]: re-exported from
//!   [`overstory_cached`], the generic cache cell underneath.
//! - [`FrameChanges`] / [`ActiveChange`]: what a commit observed.
//! - [`ResolveStats`]: recombination counters for profiling.
//!
//! Key operations:
//! - [`Scene::insert`] → [`NodeId`]; [`Scene::remove`] destroys a whole
//!   subtree.
//! - [`Scene::set_parent`] moves nodes, rejecting self-parenting and cycles
//!   with no partial mutation, optionally preserving the world transform.
//! - [`Scene::set_local_transform`] (and per-component setters) /
//!   [`Scene::set_flags`].
//! - [`Scene::world_transform`] — lazy, self-healing read for one observer;
//!   [`Scene::world_transform_cached`] — memo as of the last resolution.
//! - [`Scene::is_active`] / [`Scene::active_nodes`] — resolved active state
//!   in O(1) via the tag set.
//! - [`Scene::commit`] — the once-per-frame forced resolution pass.
//! - [`Scene::roots`] / [`Scene::consume_roots_changed`] — stable top-level
//!   enumeration for hierarchy views.
//!
//! ## Concurrency
//!
//! [`Scene::commit`] parallelizes across roots only: the tree partitions
//! nodes into disjoint subtrees, one task per root, sharing the scene
//! read-only and joining before any write. Everything else takes `&mut
//! Scene` and is serialized by the borrow checker; there is no interior
//! mutability and no locking anywhere.
//!
//! ## Example
//!
//! ```rust
//! use glam::Vec3;
//! use overstory_scene::{ActiveFlags, LocalNode, ObserverId, Scene, Transform};
//!
//! let mut scene = Scene::new();
//! let root = scene.insert(None, LocalNode::default());
//! let arm = scene.insert(
//!     Some(root),
//!     LocalNode {
//!         transform: Transform::from_translation(Vec3::new(2.0, 0.0, 0.0)),
//!         ..LocalNode::default()
//!     },
//! );
//! let _ = scene.commit(); // first frame
//!
//! // Move the root; the arm's world transform follows on read.
//! scene.set_translation(root, Vec3::new(0.0, 1.0, 0.0));
//! let renderer = ObserverId::new(0);
//! let world = scene.world_transform(arm, renderer).unwrap();
//! assert_eq!(world.w_axis.truncate(), Vec3::new(2.0, 1.0, 0.0));
//!
//! // Deactivate the root; the whole subtree leaves the active set at once.
//! scene.set_flags(root, ActiveFlags::VISIBLE);
//! assert!(!scene.is_active(arm));
//!
//! // Once per frame, resolve everything and collect what flipped.
//! let changes = scene.commit();
//! assert_eq!(changes.deactivated().count(), 2);
//! ```

mod changes;
mod resolve;
mod roots;
mod transform;
mod tree;
mod types;

pub use changes::{ActiveChange, FrameChanges};
pub use overstory_cached::{ObserverId, Propagation};
pub use resolve::ResolveStats;
pub use transform::Transform;
pub use tree::Scene;
pub use types::{ActiveFlags, LocalNode, NodeId};
