//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics and game development,
//! plus the rotation and interpolation helpers shared by the state model,
//! the camera and the intersection code.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// World up axis (Y-up, right-handed)
pub const WORLD_UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Model-space forward axis used to derive look-at vectors
pub const MODEL_FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Component-wise linear interpolation between two vectors
    pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a + (b - a) * t
    }

    /// Spherical interpolation between two rotations
    ///
    /// Falls back to normalized linear interpolation when the rotations are
    /// (anti)parallel, where slerp has no unique great-circle path.
    pub fn slerp(a: &Quat, b: &Quat, t: f32) -> Quat {
        a.try_slerp(b, t, 1.0e-6)
            .unwrap_or_else(|| a.nlerp(b, t))
    }

    /// Wrap an angle in degrees into `[0, 360)`
    pub fn wrap_degrees(degrees: f32) -> f32 {
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    }
}

/// Rotation helpers (quaternion construction and composition)
pub mod rotation {
    use super::*;

    /// Build a rotation from Euler angles given in degrees (X, Y, Z order)
    pub fn from_euler_degrees(x: f32, y: f32, z: f32) -> Quat {
        Quat::from_euler_angles(
            utils::deg_to_rad(x),
            utils::deg_to_rad(y),
            utils::deg_to_rad(z),
        )
    }

    /// Build a rotation of `degrees` around an arbitrary axis
    ///
    /// A zero-length axis yields the identity rotation.
    pub fn from_axis_degrees(axis: Vec3, degrees: f32) -> Quat {
        match Unit::try_new(axis, 1.0e-6) {
            Some(axis) => Quat::from_axis_angle(&axis, utils::deg_to_rad(degrees)),
            None => Quat::identity(),
        }
    }

    /// Compose two rotations: `first` is applied, then `second`
    pub fn combine(first: &Quat, second: &Quat) -> Quat {
        second * first
    }

    /// Rotation that turns the model forward axis (+Z) towards `direction`
    ///
    /// Handles the case where `direction` is parallel to `up` by switching
    /// to an alternate up axis.
    pub fn look_rotation(direction: &Vec3, up: &Vec3) -> Quat {
        if direction.magnitude_squared() < 1.0e-12 {
            return Quat::identity();
        }
        let dir = direction.normalize();
        let up = if dir.cross(up).magnitude_squared() > 1.0e-10 {
            *up
        } else if dir.z.abs() < 0.9 {
            Vec3::z()
        } else {
            Vec3::x()
        };
        Quat::face_towards(&dir, &up)
    }

    /// Unit direction for yaw/pitch angles in degrees
    ///
    /// Yaw 0 / pitch 0 points down -Z; positive yaw turns towards +X,
    /// positive pitch towards +Y.
    pub fn spherical_direction(yaw_degrees: f32, pitch_degrees: f32) -> Vec3 {
        let yaw = utils::deg_to_rad(yaw_degrees);
        let pitch = utils::deg_to_rad(pitch_degrees);
        Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            -pitch.cos() * yaw.cos(),
        )
    }

    /// Inverse of [`spherical_direction`]: yaw in `[0, 360)` and pitch in degrees
    pub fn yaw_pitch_from_direction(direction: &Vec3) -> (f32, f32) {
        let dir = direction.try_normalize(1.0e-9).unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0));
        let yaw = utils::rad_to_deg(dir.x.atan2(-dir.z));
        let pitch = utils::rad_to_deg(dir.y.clamp(-1.0, 1.0).asin());
        (utils::wrap_degrees(yaw), pitch)
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Build a model matrix in translation * rotation * scale order
    fn from_trs(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4;

    /// Inverse-transpose of the matrix (identity if singular)
    fn normal_matrix(&self) -> Mat4;

    /// Right-handed perspective projection (OpenGL clip space, z in [-1, 1])
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed orthographic projection centred on the view axis
    fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4;

    /// Returns `true` if any element is NaN or infinite
    fn has_non_finite(&self) -> bool;
}

impl Mat4Ext for Mat4 {
    fn from_trs(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
        Mat4::new_translation(position)
            * rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(scale)
    }

    fn normal_matrix(&self) -> Mat4 {
        self.try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Mat4::identity)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        Mat4::new_orthographic(-half_w, half_w, -half_h, half_h, near, far)
    }

    fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(*eye), &Point3::from(*target), up)
    }

    fn has_non_finite(&self) -> bool {
        self.iter().any(|v| !v.is_finite())
    }
}

/// Transform a point by a 4x4 matrix (with perspective divide guard)
pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
    let h = matrix * Vec4::new(point.x, point.y, point.z, 1.0);
    if h.w.abs() > 1.0e-7 && (h.w - 1.0).abs() > f32::EPSILON {
        Vec3::new(h.x / h.w, h.y / h.w, h.z / h.w)
    } else {
        Vec3::new(h.x, h.y, h.z)
    }
}

/// Transform a direction by a 4x4 matrix (ignores translation)
pub fn transform_direction(matrix: &Mat4, direction: &Vec3) -> Vec3 {
    let h = matrix * Vec4::new(direction.x, direction.y, direction.z, 0.0);
    Vec3::new(h.x, h.y, h.z)
}
