//! Spatial state of a single entity in one lifecycle slot

use crate::foundation::math::{Mat4, Mat4Ext, Quat, Vec3, MODEL_FORWARD, rotation};

/// Position, rotation and scale of an entity plus the values derived from them
///
/// The look-at vector, model matrix and normal matrix are private and are
/// re-derived by every setter, so they can never drift from the TRS values.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    look_at_vector: Vec3,
    model_matrix: Mat4,
    normal_matrix: Mat4,
}

impl Default for EntityState {
    fn default() -> Self {
        Self::from_trs(Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl EntityState {
    /// Create identity state
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self::default().with_position(position)
    }

    /// Create from position, rotation and scale
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let mut state = Self {
            position,
            rotation,
            scale,
            look_at_vector: MODEL_FORWARD,
            model_matrix: Mat4::identity(),
            normal_matrix: Mat4::identity(),
        };
        state.update_derived();
        state
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    /// Builder pattern: Set rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// World-space rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Per-axis scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Normalized forward direction (model +Z rotated into world space)
    pub fn look_at_vector(&self) -> Vec3 {
        self.look_at_vector
    }

    /// Model matrix in translation * rotation * scale order
    pub fn model_matrix(&self) -> &Mat4 {
        &self.model_matrix
    }

    /// Inverse-transpose of the model matrix
    pub fn normal_matrix(&self) -> &Mat4 {
        &self.normal_matrix
    }

    /// Set position and re-derive matrices
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_derived();
    }

    /// Set rotation and re-derive matrices
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.update_derived();
    }

    /// Set scale and re-derive matrices
    ///
    /// Zero scale components are replaced with a tiny positive value so the
    /// normal matrix stays invertible.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale.map(|s| if s.abs() < 1.0e-6 { 1.0e-6 } else { s });
        self.update_derived();
    }

    /// Translate by `offset`
    pub fn translate(&mut self, offset: &Vec3) {
        self.set_position(self.position + offset);
    }

    /// Apply an additional rotation after the current one
    pub fn rotate(&mut self, delta: &Quat) {
        self.set_rotation(rotation::combine(&self.rotation, delta));
    }

    /// Turn the forward axis towards a world-space point
    pub fn turn_towards(&mut self, target: &Vec3) {
        let direction = target - self.position;
        if direction.magnitude_squared() > 1.0e-12 {
            self.set_rotation(rotation::look_rotation(&direction, &crate::foundation::math::WORLD_UP));
        }
    }

    fn update_derived(&mut self) {
        self.model_matrix = Mat4::from_trs(&self.position, &self.rotation, &self.scale);
        self.normal_matrix = self.model_matrix.normal_matrix();
        self.look_at_vector = (self.rotation * MODEL_FORWARD)
            .try_normalize(1.0e-9)
            .unwrap_or(MODEL_FORWARD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{transform_point, WORLD_UP};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_identity_state() {
        let state = EntityState::identity();
        assert_eq!(state.position(), Vec3::zeros());
        assert_relative_eq!(*state.model_matrix(), Mat4::identity(), epsilon = EPSILON);
        assert_relative_eq!(state.look_at_vector(), MODEL_FORWARD, epsilon = EPSILON);
    }

    #[test]
    fn test_model_matrix_follows_setters() {
        let mut state = EntityState::from_position(Vec3::new(1.0, 2.0, 3.0));
        state.set_scale(Vec3::new(2.0, 2.0, 2.0));

        let corner = transform_point(state.model_matrix(), &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(corner, Vec3::new(3.0, 4.0, 5.0), epsilon = EPSILON);

        state.translate(&Vec3::new(-1.0, 0.0, 0.0));
        let corner = transform_point(state.model_matrix(), &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(corner, Vec3::new(2.0, 4.0, 5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_vector_tracks_rotation() {
        let mut state = EntityState::identity();
        state.set_rotation(rotation::from_axis_degrees(WORLD_UP, 90.0));
        // Rotating +Z by 90 degrees around +Y gives +X
        assert_relative_eq!(state.look_at_vector(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_turn_towards() {
        let mut state = EntityState::from_position(Vec3::new(0.0, 0.0, 0.0));
        state.turn_towards(&Vec3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(state.look_at_vector(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_zero_scale_keeps_normal_matrix_finite() {
        let state = EntityState::identity().with_scale(Vec3::new(0.0, 1.0, 1.0));
        assert!(!state.normal_matrix().has_non_finite());
    }
}
