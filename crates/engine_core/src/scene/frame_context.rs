//! Per-frame inputs for visibility and picking

use crate::camera::{Camera, CameraState};
use crate::culling::Frustum;
use crate::spatial::Octree;

/// Everything a frame's visibility pass reads, passed explicitly
///
/// The frustum always belongs to the render camera state, so culling
/// matches what is drawn rather than the latest simulation tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Viewport size in pixels
    pub viewport: (u32, u32),
    /// Interpolated camera state
    pub camera: &'a CameraState,
    /// Frustum of `camera`
    pub frustum: &'a Frustum,
    /// Spatial index from the last tick, if one was built
    pub octree: Option<&'a Octree>,
    /// Bounds scale for the render-pass visibility tier
    pub render_pass_expansion: f32,
}

impl<'a> FrameContext<'a> {
    /// Context for the camera's render state
    pub fn new(camera: &'a Camera, render_pass_expansion: f32) -> Self {
        Self {
            viewport: camera.viewport(),
            camera: camera.render(),
            frustum: camera.render().frustum(),
            octree: None,
            render_pass_expansion,
        }
    }

    /// Builder pattern: attach a spatial index
    pub fn with_octree(mut self, octree: Option<&'a Octree>) -> Self {
        self.octree = octree;
        self
    }
}
