//! Frustum culling
//!
//! Planes are extracted from a combined view-projection matrix and every
//! visible entity is tested in two tiers: its exact bounds and its bounds
//! inflated for the render pass.

mod frustum;
mod plane;
mod visibility;

pub use frustum::Frustum;
pub use plane::Plane;
pub use visibility::{HasBounds, ScreenSpaceStatus};
