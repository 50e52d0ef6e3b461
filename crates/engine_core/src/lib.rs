//! # Engine Core
//!
//! State interpolation, frustum culling and intersection core for a
//! real-time 3D engine.
//!
//! ## Features
//!
//! - **Dual-state objects**: previous/current/render transforms with a blend step
//! - **Camera**: first-person and arc-ball controls, mouse unprojection
//! - **Culling**: frustum plane extraction and two visibility tiers
//! - **Broad phase**: octree arena and sweep-and-prune
//! - **Narrow phase**: SAT with vertical MTV, face clipping, terrain contacts
//! - **Ray queries**: triangles, boxes, objects, terrain and mouse picking
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine_core::prelude::*;
//!
//! struct Idle;
//!
//! impl Simulation for Idle {
//!     fn tick(&mut self, _world: &mut World, _camera: &mut Camera, _dt: f32) {}
//! }
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut engine = Engine::new(CoreConfig::default())?;
//!     engine.world_mut().spawn(
//!         GameObject::new("crate", EntityState::identity())
//!             .with_hitbox(HitboxTemplate::cuboid(Vec3::new(0.5, 0.5, 0.5))),
//!     );
//!     let report = engine.advance_frame(1.0 / 60.0, &mut Idle);
//!     println!("{} visible", report.visible);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod foundation;
pub mod config;
pub mod state;
pub mod camera;
pub mod culling;
pub mod spatial;
pub mod physics;
pub mod scene;
pub mod input;

mod engine;

pub use engine::{Engine, EngineError, FrameReport, Simulation};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineError, FrameReport, Simulation,
        camera::{Camera, CameraState, ProjectionType},
        core::{Config, CoreConfig},
        culling::{Frustum, HasBounds, ScreenSpaceStatus},
        foundation::{
            math::{Mat4, Quat, Vec2, Vec3},
            time::FixedTimestep,
        },
        input::MouseState,
        physics::{
            CollisionEvents, CollisionFilter, CollisionLayers, HitboxTemplate, Intersection, Ray,
            RayHit, TerrainCollider, TerrainIntersection,
        },
        scene::{FrameContext, GameObject, ObjectId, RenderInstance, TerrainId, World},
        spatial::{Aabb, Octree},
        state::EntityState,
    };
}
