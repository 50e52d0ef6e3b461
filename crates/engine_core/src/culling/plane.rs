//! Plane in normal/distance form

use crate::foundation::math::{Vec3, Vec4};

/// Plane satisfying `normal · p + distance = 0`
///
/// Points with a positive signed distance are on the side the normal points
/// to. Frustum planes point inwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Vec3,
    /// Signed offset from the origin along `-normal`
    pub distance: f32,
}

impl Plane {
    /// Plane through `point` facing `normal` (normalized here)
    pub fn from_point_normal(point: &Vec3, normal: &Vec3) -> Self {
        let normal = normal.try_normalize(1.0e-9).unwrap_or_else(Vec3::y);
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Build from raw `(a, b, c, d)` coefficients, normalizing by `|(a, b, c)|`
    ///
    /// A zero-length normal yields a plane that accepts every point.
    pub fn from_coefficients(coefficients: &Vec4) -> Self {
        let normal = Vec3::new(coefficients.x, coefficients.y, coefficients.z);
        let length = normal.magnitude();
        if length > 1.0e-12 {
            Self {
                normal: normal / length,
                distance: coefficients.w / length,
            }
        } else {
            Self { normal: Vec3::y(), distance: f32::MAX }
        }
    }

    /// Signed distance from the plane to `point`
    pub fn signed_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_distance() {
        let plane = Plane::from_point_normal(&Vec3::new(0.0, 2.0, 0.0), &Vec3::new(0.0, 4.0, 0.0));
        assert!((plane.signed_distance(&Vec3::new(3.0, 5.0, -1.0)) - 3.0).abs() < 1e-6);
        assert!((plane.signed_distance(&Vec3::new(0.0, 0.0, 0.0)) + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_coefficients_normalizes() {
        let plane = Plane::from_coefficients(&Vec4::new(0.0, 0.0, 2.0, 4.0));
        assert!((plane.normal.magnitude() - 1.0).abs() < 1e-6);
        assert!((plane.distance - 2.0).abs() < 1e-6);
    }
}
