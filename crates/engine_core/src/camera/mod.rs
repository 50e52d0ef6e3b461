//! # Camera Subsystem
//!
//! A [`Camera`] owns previous/current/render [`CameraState`]s the same way
//! entities own their state slots, plus the projection parameters shared by
//! all three.

mod camera;
mod camera_state;

pub use camera::Camera;
pub use camera_state::CameraState;

use serde::{Deserialize, Serialize};

/// Projection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionType {
    /// Perspective projection driven by the field of view
    #[default]
    Perspective,
    /// Orthographic projection sized by the viewport
    Orthographic,
}
