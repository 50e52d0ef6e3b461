//! Collision and intersection
//!
//! Hitboxes are convex polyhedra stored as model-space templates and
//! re-transformed whenever their owner's current state changes. The
//! collision pipeline runs a broad phase (octree or sweep-and-prune) to
//! completion, then the SAT narrow phase on every surviving pair. Results
//! are returned to the caller; nothing here moves objects.

pub mod clipping;
pub mod collision_layers;
pub mod collision_system;
pub mod hitbox;
pub mod intersection;
pub mod mesh;
pub mod primitives;
pub mod ray;
pub mod terrain;

pub use collision_layers::{CollisionFilter, CollisionLayers};
pub use collision_system::{CollisionEvents, CollisionSystem, ObjectPair};
pub use hitbox::{Hitbox, HitboxTemplate};
pub use intersection::{test_hitbox_intersection, test_intersection, HitboxContact, Intersection};
pub use mesh::GeometryError;
pub use primitives::{BoundingSphere, Ray, RayHit, Triangle};
pub use terrain::{test_terrain_intersection, TerrainCollider, TerrainIntersection};

use serde::{Deserialize, Serialize};

/// Broad-phase strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BroadPhaseKind {
    /// Sort along the highest-variance axis and sweep
    #[default]
    SweepAndPrune,
    /// Rebuild an octree each tick and pair items sharing a subtree
    Octree,
}
