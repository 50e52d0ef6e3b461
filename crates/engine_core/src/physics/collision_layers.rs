//! Collision layers and masks
//!
//! Every object sits on one or more layers and carries a mask of the layers
//! it reacts to. A candidate pair survives the broad phase only if each
//! side's mask accepts the other side's layer.

use bitflags::bitflags;

bitflags! {
    /// Layer bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Static level geometry
        const ENVIRONMENT = 1 << 0;
        /// Player characters
        const PLAYER = 1 << 1;
        /// Non-player characters
        const ENEMY = 1 << 2;
        /// Bullets, missiles and the like
        const PROJECTILE = 1 << 3;
        /// Volumes that report overlap but need no response
        const TRIGGER = 1 << 4;
        /// Small physics props
        const DEBRIS = 1 << 5;
        /// Vehicles
        const VEHICLE = 1 << 6;
        /// Pickups and collectibles
        const PICKUP = 1 << 7;
        /// General dynamic objects
        const DEFAULT = 1 << 8;
    }
}

/// Layer membership plus the mask of layers this object collides with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionFilter {
    /// Layers the object belongs to
    pub layer: CollisionLayers,
    /// Layers the object collides with
    pub mask: CollisionLayers,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayers::DEFAULT,
            mask: CollisionLayers::all(),
        }
    }
}

impl CollisionFilter {
    /// Filter on `layer` that collides with `mask`
    pub fn new(layer: CollisionLayers, mask: CollisionLayers) -> Self {
        Self { layer, mask }
    }

    /// Filter that collides with nothing
    pub fn disabled() -> Self {
        Self::new(CollisionLayers::empty(), CollisionLayers::empty())
    }

    /// Check if two filters accept each other
    pub fn should_collide(&self, other: &CollisionFilter) -> bool {
        self.mask.intersects(other.layer) && other.mask.intersects(self.layer)
    }
}
