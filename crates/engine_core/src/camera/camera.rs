//! # 3D Camera
//!
//! Perspective/orthographic camera with first-person and arc-ball controls.
//! Setters mutate the `current` state; [`Camera::snapshot`] and
//! [`Camera::blend`] drive the previous/render slots exactly like entity
//! state, and every screen-space query reads the `render` state because that
//! is what is on screen.

use super::{CameraState, ProjectionType};
use crate::core::CameraConfig;
use crate::culling::{Frustum, HasBounds};
use crate::foundation::math::{rotation, utils, Mat4, Mat4Ext, Vec2, Vec3};
use crate::physics::{ray::line_plane_intersection, Ray};

/// Valid range for the stored FOV half-angle in degrees
const FOV_HALF_ANGLE_RANGE: (f32, f32) = (10.0, 89.9999);

/// Pitch limit in degrees for first-person and arc-ball controls
const PITCH_LIMIT: f32 = 89.9;

/// Camera with previous/current/render states
#[derive(Debug, Clone)]
pub struct Camera {
    previous: CameraState,
    current: CameraState,
    render: CameraState,
    z_near: f32,
    z_far: f32,
    projection_type: ProjectionType,
    fov_half_angle: f32,
    viewport_width: u32,
    viewport_height: u32,
    yaw: f32,
    pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Camera {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `target` - Point to look at
    /// * `fov_degrees` - Full vertical field of view in degrees
    /// * `viewport` - Viewport size in pixels
    /// * `z_near`, `z_far` - Clip plane distances
    pub fn perspective(position: Vec3, target: Vec3, fov_degrees: f32, viewport: (u32, u32), z_near: f32, z_far: f32) -> Self {
        let mut camera = Self {
            previous: CameraState::new(position, target, Mat4::identity()),
            current: CameraState::new(position, target, Mat4::identity()),
            render: CameraState::new(position, target, Mat4::identity()),
            z_near: 0.1,
            z_far: 1000.0,
            projection_type: ProjectionType::Perspective,
            fov_half_angle: 45.0,
            viewport_width: viewport.0.max(1),
            viewport_height: viewport.1.max(1),
            yaw: 0.0,
            pitch: 0.0,
        };
        camera.fov_half_angle = clamp_half_angle(fov_degrees * 0.5);
        camera.apply_clip_planes(z_near, z_far);
        camera.set_position_and_target(position, target);
        camera.reset_history();
        camera
    }

    /// Create an orthographic camera sized by the viewport
    pub fn orthographic(position: Vec3, target: Vec3, viewport: (u32, u32), z_near: f32, z_far: f32) -> Self {
        let mut camera = Self::perspective(position, target, 90.0, viewport, z_near, z_far);
        camera.set_projection_type(ProjectionType::Orthographic);
        camera.reset_history();
        camera
    }

    /// Create a camera from configuration
    pub fn from_config(config: &CameraConfig) -> Self {
        let viewport = (config.viewport_width, config.viewport_height);
        match config.projection {
            ProjectionType::Perspective => Self::perspective(
                config.position,
                config.target,
                config.fov_degrees,
                viewport,
                config.z_near,
                config.z_far,
            ),
            ProjectionType::Orthographic => {
                Self::orthographic(config.position, config.target, viewport, config.z_near, config.z_far)
            }
        }
    }

    /// State at the start of the current tick
    pub fn previous(&self) -> &CameraState { &self.previous }
    /// Authoritative state mutated by the setters
    pub fn current(&self) -> &CameraState { &self.current }
    /// Interpolated state used for drawing and screen-space queries
    pub fn render(&self) -> &CameraState { &self.render }
    /// Frustum of the render state
    pub fn frustum(&self) -> &Frustum { self.render.frustum() }

    /// Near clip distance
    pub fn z_near(&self) -> f32 { self.z_near }
    /// Far clip distance
    pub fn z_far(&self) -> f32 { self.z_far }
    /// Projection kind
    pub fn projection_type(&self) -> ProjectionType { self.projection_type }
    /// Stored FOV half-angle in degrees
    pub fn fov_half_angle(&self) -> f32 { self.fov_half_angle }
    /// Viewport size in pixels
    pub fn viewport(&self) -> (u32, u32) { (self.viewport_width, self.viewport_height) }
    /// Accumulated yaw in degrees, `[0, 360)`
    pub fn yaw(&self) -> f32 { self.yaw }
    /// Accumulated pitch in degrees, `[-89.9, 89.9]`
    pub fn pitch(&self) -> f32 { self.pitch }

    /// Width over height of the viewport
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height as f32
    }

    /// Copy `current` into `previous`; call once per tick before mutation
    pub fn snapshot(&mut self) {
        self.previous.clone_from(&self.current);
    }

    /// Interpolate previous/current into the render state
    pub fn blend(&mut self, alpha: f32) {
        self.render = CameraState::blend(&self.previous, &self.current, alpha);
    }

    /// Make all three states equal to `current` (cuts, teleports)
    pub fn reset_history(&mut self) {
        self.previous.clone_from(&self.current);
        self.render.clone_from(&self.current);
    }

    /// Update camera position, keeping the target
    pub fn set_position(&mut self, position: Vec3) {
        self.set_position_and_target(position, self.current.target());
    }

    /// Update camera target (look-at point)
    pub fn set_target(&mut self, target: Vec3) {
        self.set_position_and_target(self.current.position(), target);
    }

    /// Update both ends of the view direction
    ///
    /// The yaw/pitch accumulators are re-derived from the new direction so
    /// that later first-person input continues from it.
    pub fn set_position_and_target(&mut self, position: Vec3, target: Vec3) {
        self.current = CameraState::new(position, target, self.projection_matrix());
        let (yaw, pitch) = rotation::yaw_pitch_from_direction(&self.current.look_at_vector());
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        log::trace!("Camera moved to {:?} looking at {:?}", position, self.current.target());
    }

    /// Set the full vertical field of view in degrees
    ///
    /// The stored half-angle is clamped to `[10, 89.9999]`. Orthographic
    /// cameras ignore the call.
    pub fn set_fov(&mut self, degrees: f32) {
        if self.projection_type == ProjectionType::Orthographic {
            log::warn!("Ignoring FOV {degrees} on an orthographic camera; viewport height is used instead");
            return;
        }
        let half = clamp_half_angle(degrees * 0.5);
        if (half - degrees * 0.5).abs() > f32::EPSILON {
            log::debug!("FOV half-angle {} clamped to {}", degrees * 0.5, half);
        }
        self.fov_half_angle = half;
        self.refresh();
    }

    /// Resize the viewport; zero dimensions are raised to one pixel
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Zero-size viewport {width}x{height} requested; clamping to 1 pixel");
        }
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) != (self.viewport_width, self.viewport_height) {
            log::info!("Camera viewport changed: {}x{} -> {}x{}", self.viewport_width, self.viewport_height, width, height);
        }
        self.viewport_width = width;
        self.viewport_height = height;
        self.refresh();
    }

    /// Switch between perspective and orthographic projection
    pub fn set_projection_type(&mut self, projection_type: ProjectionType) {
        self.projection_type = projection_type;
        self.refresh();
    }

    /// Change the clip planes; invalid pairs are ignored with a warning
    pub fn set_clip_planes(&mut self, z_near: f32, z_far: f32) {
        self.apply_clip_planes(z_near, z_far);
        self.refresh();
    }

    /// Move along the look direction
    pub fn move_forward(&mut self, units: f32) {
        self.translate(self.current.look_at_vector() * units);
    }

    /// Move along the local right axis
    pub fn strafe(&mut self, units: f32) {
        self.translate(self.current.local_right() * units);
    }

    /// Move along the local up axis
    pub fn move_up_down(&mut self, units: f32) {
        self.translate(self.current.local_up() * units);
    }

    /// First-person look: rotate the target around the camera position
    ///
    /// Yaw wraps into `[0, 360)`, pitch is clamped to `[-89.9, 89.9]`. The
    /// distance to the target is preserved.
    pub fn yaw_and_pitch(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        let position = self.current.position();
        let distance = match (self.current.target() - position).magnitude() {
            d if d.is_finite() && d > f32::EPSILON => d,
            _ => 1.0,
        };
        let direction = self.accumulate(yaw_degrees, pitch_degrees);
        self.current = CameraState::new(position, position + direction * distance, self.projection_matrix());
    }

    /// Orbit around `pivot` at `distance`, looking at the pivot
    pub fn arc_ball(&mut self, pivot: &Vec3, yaw_degrees: f32, pitch_degrees: f32, distance: f32) {
        let distance = if distance.is_finite() && distance > 0.0 { distance } else {
            log::warn!("Invalid arc-ball distance {distance}; using 1.0");
            1.0
        };
        let direction = self.accumulate(yaw_degrees, pitch_degrees);
        self.current = CameraState::new(pivot - direction * distance, *pivot, self.projection_matrix());
    }

    /// Orbit around the centre of an object's bounds
    pub fn arc_ball_around<B: HasBounds + ?Sized>(&mut self, object: &B, yaw_degrees: f32, pitch_degrees: f32, distance: f32) {
        self.arc_ball(&object.bounds_center(), yaw_degrees, pitch_degrees, distance);
    }

    /// World-space direction through the cursor (normalized device coordinates)
    pub fn mouse_ray_direction(&self, cursor_ndc: &Vec2) -> Vec3 {
        self.render.mouse_ray_direction(cursor_ndc)
    }

    /// World-space ray through the cursor (normalized device coordinates)
    pub fn mouse_ray(&self, cursor_ndc: &Vec2) -> Ray {
        self.render.mouse_ray(cursor_ndc)
    }

    /// Point where the cursor ray meets a plane in front of the camera
    pub fn mouse_intersection_on_plane(&self, cursor_ndc: &Vec2, plane_point: &Vec3, plane_normal: &Vec3) -> Option<Vec3> {
        let ray = self.mouse_ray(cursor_ndc);
        let hit = line_plane_intersection(&ray.origin, &ray.direction, plane_point, plane_normal)?;
        ((hit - ray.origin).dot(&ray.direction) >= 0.0).then_some(hit)
    }

    /// Pixel coordinates of a world point (origin top-left, Y down)
    ///
    /// Returns `None` for points behind the camera.
    pub fn world_to_screen(&self, point: &Vec3) -> Option<Vec2> {
        let ndc = self.render.world_to_ndc(point)?;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport_width as f32,
            (1.0 - ndc.y) * 0.5 * self.viewport_height as f32,
        ))
    }

    /// Projection matrix for the current parameters
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection_type {
            ProjectionType::Perspective => Mat4::perspective(
                utils::deg_to_rad(self.fov_half_angle * 2.0),
                self.aspect_ratio(),
                self.z_near,
                self.z_far,
            ),
            ProjectionType::Orthographic => Mat4::orthographic(
                self.viewport_width as f32,
                self.viewport_height as f32,
                self.z_near,
                self.z_far,
            ),
        }
    }

    fn translate(&mut self, offset: Vec3) {
        let position = self.current.position() + offset;
        let target = self.current.target() + offset;
        self.current = CameraState::new(position, target, self.projection_matrix());
    }

    fn accumulate(&mut self, yaw_degrees: f32, pitch_degrees: f32) -> Vec3 {
        self.yaw = utils::wrap_degrees(self.yaw + yaw_degrees);
        self.pitch = (self.pitch + pitch_degrees).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        rotation::spherical_direction(self.yaw, self.pitch)
    }

    fn apply_clip_planes(&mut self, z_near: f32, z_far: f32) {
        if z_near > 0.0 && z_far > z_near && z_far.is_finite() {
            self.z_near = z_near;
            self.z_far = z_far;
        } else {
            log::warn!("Invalid clip planes near={z_near} far={z_far}; keeping {}/{}", self.z_near, self.z_far);
        }
    }

    fn refresh(&mut self) {
        self.current = CameraState::new(self.current.position(), self.current.target(), self.projection_matrix());
    }
}

fn clamp_half_angle(half_degrees: f32) -> f32 {
    if half_degrees.is_finite() {
        half_degrees.clamp(FOV_HALF_ANGLE_RANGE.0, FOV_HALF_ANGLE_RANGE.1)
    } else {
        FOV_HALF_ANGLE_RANGE.1 * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Aabb;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::perspective(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), 90.0, (800, 600), 0.1, 100.0)
    }

    #[test]
    fn test_fov_is_clamped() {
        let mut camera = camera();
        camera.set_fov(5.0);
        assert_eq!(camera.fov_half_angle(), 10.0);
        camera.set_fov(400.0);
        assert!((camera.fov_half_angle() - 89.9999).abs() < 1e-4);
        camera.set_fov(60.0);
        assert!((camera.fov_half_angle() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_fov_ignored_for_orthographic() {
        let mut camera = Camera::orthographic(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), (800, 600), 0.1, 100.0);
        let before = camera.fov_half_angle();
        camera.set_fov(30.0);
        assert_eq!(camera.fov_half_angle(), before);
    }

    #[test]
    fn test_set_target_equal_to_position() {
        let mut camera = camera();
        camera.set_target(Vec3::new(0.0, 0.0, 10.0));
        assert!(!camera.current().view_matrix().has_non_finite());
        assert_relative_eq!(camera.current().look_at_vector().magnitude(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_move_preserves_direction() {
        let mut camera = camera();
        let look = camera.current().look_at_vector();
        camera.move_forward(2.0);
        camera.strafe(1.0);
        camera.move_up_down(-3.0);
        assert_relative_eq!(camera.current().look_at_vector(), look, epsilon = 1e-5);
        assert_relative_eq!(camera.current().position(), Vec3::new(1.0, -3.0, 8.0), epsilon = 1e-5);
    }

    #[test]
    fn test_yaw_wraps_and_pitch_clamps() {
        let mut camera = camera();
        camera.yaw_and_pitch(-10.0, 200.0);
        assert!((camera.yaw() - 350.0).abs() < 1e-3);
        assert!((camera.pitch() - 89.9).abs() < 1e-4);
        camera.yaw_and_pitch(20.0, -400.0);
        assert!((camera.yaw() - 10.0).abs() < 1e-3);
        assert!((camera.pitch() + 89.9).abs() < 1e-4);
        assert!(!camera.current().view_matrix().has_non_finite());
    }

    #[test]
    fn test_yaw_keeps_target_distance() {
        let mut camera = camera();
        camera.yaw_and_pitch(90.0, 0.0);
        let current = camera.current();
        assert_relative_eq!((current.target() - current.position()).magnitude(), 10.0, epsilon = 1e-3);
        // Yaw 90 from looking down -Z turns towards +X
        assert_relative_eq!(current.look_at_vector(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_yaw_keeps_short_target_distance() {
        let mut camera = camera();
        camera.set_position_and_target(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 9.75));
        camera.yaw_and_pitch(30.0, 10.0);
        let current = camera.current();
        assert!(((current.target() - current.position()).magnitude() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_arc_ball_around_object() {
        let mut camera = camera();
        let object = Aabb::from_center_half_extents(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        camera.arc_ball_around(&object, 0.0, 0.0, 4.0);
        let current = camera.current();
        assert_relative_eq!(current.target(), Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!((current.position() - current.target()).magnitude(), 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_render_state_lags_until_blend() {
        let mut camera = camera();
        camera.snapshot();
        camera.set_position(Vec3::new(10.0, 0.0, 10.0));
        assert_relative_eq!(camera.render().position(), Vec3::new(0.0, 0.0, 10.0), epsilon = 1e-6);
        camera.blend(0.5);
        assert_relative_eq!(camera.render().position(), Vec3::new(5.0, 0.0, 10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_mouse_intersection_on_ground_plane() {
        let mut camera = Camera::perspective(Vec3::new(0.0, 10.0, 10.0), Vec3::zeros(), 60.0, (800, 600), 0.1, 100.0);
        camera.blend(1.0);
        let hit = camera
            .mouse_intersection_on_plane(&Vec2::zeros(), &Vec3::zeros(), &Vec3::y())
            .unwrap();
        assert_relative_eq!(hit, Vec3::zeros(), epsilon = 1e-3);
    }

    #[test]
    fn test_world_to_screen_center() {
        let camera = camera();
        let screen = camera.world_to_screen(&Vec3::zeros()).unwrap();
        assert_relative_eq!(screen, Vec2::new(400.0, 300.0), epsilon = 1e-2);
        assert!(camera.world_to_screen(&Vec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn test_zero_viewport_is_clamped() {
        let mut camera = camera();
        camera.set_viewport(0, 0);
        assert_eq!(camera.viewport(), (1, 1));
        assert!(!camera.current().projection_matrix().has_non_finite());
    }
}
