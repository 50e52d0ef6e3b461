//! Spatial partitioning
//!
//! Broad-phase structures rebuilt from scratch every tick: an octree arena
//! and a sweep-and-prune pass. Both work on [`HitboxRef`]s, back-references
//! to hitboxes owned by scene objects.

mod aabb;
mod octree;
mod sweep_and_prune;

pub use aabb::Aabb;
pub use octree::{NodeId, Octree, OctreeConfig};
pub use sweep_and_prune::SweepAndPrune;

use crate::scene::ObjectId;

/// Back-reference to one hitbox of one object, with its bounds cached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitboxRef {
    /// Owning object
    pub object: ObjectId,
    /// Index into the object's hitbox list
    pub hitbox: usize,
    /// World-space bounds at the time of insertion
    pub aabb: Aabb,
}

impl HitboxRef {
    /// Create a new reference
    pub fn new(object: ObjectId, hitbox: usize, aabb: Aabb) -> Self {
        Self { object, hitbox, aabb }
    }
}
