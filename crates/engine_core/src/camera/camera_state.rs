//! Position/target pair and everything derived from it

use crate::culling::Frustum;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec2, Vec3, Vec4, WORLD_UP};
use crate::physics::Ray;

/// Horizontal distance below which the look direction counts as vertical
const DEGENERATE_EPSILON: f32 = 1.0e-5;

/// Nudge applied to `target.z`, relative to the coordinate magnitude
const NUDGE_FACTOR: f32 = 1.0e-3;

/// One lifecycle slot of a camera
///
/// All matrices, the local axes and the frustum are derived from
/// `position`, `target` and the projection matrix at construction and
/// cannot be changed independently.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    position: Vec3,
    target: Vec3,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection_matrix: Mat4,
    look_at_vector: Vec3,
    local_up: Vec3,
    local_right: Vec3,
    frustum: Frustum,
}

impl CameraState {
    /// Derive a state, correcting a target that would make the view degenerate
    pub fn new(position: Vec3, target: Vec3, projection_matrix: Mat4) -> Self {
        let target = correct_degenerate_target(&position, &target);
        let view_matrix = Mat4::look_at(&position, &target, &WORLD_UP);
        let view_projection_matrix = projection_matrix * view_matrix;

        let look_at_vector = (target - position)
            .try_normalize(1.0e-12)
            .unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0));
        let local_right = look_at_vector
            .cross(&WORLD_UP)
            .try_normalize(1.0e-12)
            .unwrap_or_else(Vec3::x);
        let local_up = local_right.cross(&look_at_vector).normalize();

        Self {
            position,
            target,
            view_matrix,
            projection_matrix,
            view_projection_matrix,
            look_at_vector,
            local_up,
            local_right,
            frustum: Frustum::from_view_projection(&view_projection_matrix),
        }
    }

    /// Camera position
    pub fn position(&self) -> Vec3 { self.position }
    /// Look-at target (after degenerate correction)
    pub fn target(&self) -> Vec3 { self.target }
    /// World-to-view matrix
    pub fn view_matrix(&self) -> &Mat4 { &self.view_matrix }
    /// View-to-clip matrix
    pub fn projection_matrix(&self) -> &Mat4 { &self.projection_matrix }
    /// `projection * view`
    pub fn view_projection_matrix(&self) -> &Mat4 { &self.view_projection_matrix }
    /// Unit view direction
    pub fn look_at_vector(&self) -> Vec3 { self.look_at_vector }
    /// Unit up axis of the view
    pub fn local_up(&self) -> Vec3 { self.local_up }
    /// Unit right axis of the view
    pub fn local_right(&self) -> Vec3 { self.local_right }
    /// Frustum planes derived from the view-projection matrix
    pub fn frustum(&self) -> &Frustum { &self.frustum }

    /// Interpolate position and target, keeping `current`'s projection
    pub fn blend(previous: &Self, current: &Self, alpha: f32) -> Self {
        let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 };
        if previous == current || alpha >= 1.0 {
            return current.clone();
        }
        Self::new(
            utils::lerp_vec3(&previous.position, &current.position, alpha),
            utils::lerp_vec3(&previous.target, &current.target, alpha),
            current.projection_matrix,
        )
    }

    /// World-space direction through a point given in normalized device coordinates
    ///
    /// The NDC point is unprojected on the near and far planes through the
    /// inverse projection and then the inverse view matrix.
    pub fn mouse_ray_direction(&self, ndc: &Vec2) -> Vec3 {
        self.unproject_segment(ndc)
            .and_then(|(near, far)| (far - near).try_normalize(1.0e-12))
            .unwrap_or(self.look_at_vector)
    }

    /// Ray from the near plane through a point in normalized device coordinates
    pub fn mouse_ray(&self, ndc: &Vec2) -> Ray {
        match self.unproject_segment(ndc) {
            Some((near, far)) => {
                let direction = (far - near).try_normalize(1.0e-12).unwrap_or(self.look_at_vector);
                Ray::new(near, direction)
            }
            None => Ray::new(self.position, self.look_at_vector),
        }
    }

    /// Project a world point to normalized device coordinates
    ///
    /// Returns `None` for points behind the camera.
    pub fn world_to_ndc(&self, point: &Vec3) -> Option<Vec3> {
        let clip = self.view_projection_matrix * Vec4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= 1.0e-7 {
            return None;
        }
        Some(Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w))
    }

    fn unproject_segment(&self, ndc: &Vec2) -> Option<(Vec3, Vec3)> {
        let inverse_projection = self.projection_matrix.try_inverse()?;
        let inverse_view = self.view_matrix.try_inverse()?;
        let unproject = |depth: f32| -> Option<Vec3> {
            let eye = inverse_projection * Vec4::new(ndc.x, ndc.y, depth, 1.0);
            let world = inverse_view * eye;
            if world.w.abs() < 1.0e-7 {
                return None;
            }
            Some(Vec3::new(world.x / world.w, world.y / world.w, world.z / world.w))
        };
        Some((unproject(-1.0)?, unproject(1.0)?))
    }
}

/// Keep the look direction off the vertical axis
///
/// When the horizontal offset between position and target is below
/// `1e-5` the view matrix would be built from a direction parallel to the
/// world up axis. The target is pushed along -Z by an amount proportional to
/// the larger of the vertical offset and the coordinate magnitude. A target
/// that coincides with the position gets the same nudge.
pub(crate) fn correct_degenerate_target(position: &Vec3, target: &Vec3) -> Vec3 {
    let delta = target - position;
    let horizontal = (delta.x * delta.x + delta.z * delta.z).sqrt();
    if horizontal >= DEGENERATE_EPSILON && horizontal.is_finite() {
        return *target;
    }

    let magnitude = delta.y.abs().max(target.z.abs()).max(1.0);
    let mut corrected = *target;
    corrected.z -= magnitude * NUDGE_FACTOR;
    log::trace!("Camera target nudged from {:?} to {:?}", target, corrected);
    corrected
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn projection() -> Mat4 {
        Mat4::perspective(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0)
    }

    #[test]
    fn test_target_equal_to_position_is_not_nan() {
        let p = Vec3::new(3.0, 4.0, 5.0);
        let state = CameraState::new(p, p, projection());
        assert!(!state.view_matrix().has_non_finite());
        assert!(!state.view_projection_matrix().has_non_finite());
        assert_relative_eq!(state.look_at_vector().magnitude(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_straight_down_is_not_nan() {
        let state = CameraState::new(Vec3::new(0.0, 10.0, 0.0), Vec3::zeros(), projection());
        assert!(!state.view_matrix().has_non_finite());
        assert_relative_eq!(state.look_at_vector().magnitude(), 1.0, epsilon = 1e-4);
        assert!(state.look_at_vector().y < -0.99);
    }

    #[test]
    fn test_local_axes_are_orthonormal() {
        let state = CameraState::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 0.0, -2.0), projection());
        assert_relative_eq!(state.local_right().dot(&state.look_at_vector()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(state.local_up().dot(&state.look_at_vector()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(state.local_up().magnitude(), 1.0, epsilon = 1e-5);
        assert!(state.local_up().y > 0.0);
    }

    #[test]
    fn test_center_of_screen_ray_follows_look_vector() {
        let state = CameraState::new(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), projection());
        let direction = state.mouse_ray_direction(&Vec2::zeros());
        assert_relative_eq!(direction, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-4);
    }

    #[test]
    fn test_world_to_ndc_round_trip() {
        let state = CameraState::new(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), projection());
        let ndc = state.world_to_ndc(&Vec3::new(1.0, 1.0, 0.0)).unwrap();
        let ray = state.mouse_ray(&Vec2::new(ndc.x, ndc.y));
        // The ray must pass through the projected point
        let t = (0.0 - ray.origin.z) / ray.direction.z;
        let hit = ray.point_at(t);
        assert_relative_eq!(hit, Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-3);
        assert!(state.world_to_ndc(&Vec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn test_blend_endpoints() {
        let a = CameraState::new(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), projection());
        let b = CameraState::new(Vec3::new(10.0, 0.0, 10.0), Vec3::new(10.0, 0.0, 0.0), projection());
        assert_eq!(CameraState::blend(&a, &b, 1.0), b);
        let half = CameraState::blend(&a, &b, 0.5);
        assert_relative_eq!(half.position(), Vec3::new(5.0, 0.0, 10.0), epsilon = 1e-5);
    }
}
