//! Scene objects and the world container
//!
//! Objects are stored in a `slotmap` and addressed by [`ObjectId`]; terrain
//! colliders have their own [`TerrainId`] space. Per-frame inputs the core
//! needs from the outside (viewport, render camera, spatial index) travel
//! in an explicit [`FrameContext`].

mod frame_context;
mod game_object;
mod render_instance;
mod world;

pub use frame_context::FrameContext;
pub use game_object::GameObject;
pub use render_instance::RenderInstance;
pub use world::World;

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a [`GameObject`] in a [`World`]
    pub struct ObjectId;

    /// Handle of a terrain collider in a [`World`]
    pub struct TerrainId;
}
