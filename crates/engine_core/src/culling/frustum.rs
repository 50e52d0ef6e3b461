//! View frustum extracted from a view-projection matrix

use super::Plane;
use crate::foundation::math::{Mat4, Vec3};
use crate::spatial::Aabb;

/// Six inward-facing unit planes of a camera's view volume
///
/// Plane order: left, right, bottom, top, near, far. A frustum is a pure
/// function of the matrix it was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Default for Frustum {
    fn default() -> Self {
        Self::from_view_projection(&Mat4::identity())
    }
}

impl Frustum {
    /// Combine `projection * view` and extract the planes
    pub fn from_matrices(projection: &Mat4, view: &Mat4) -> Self {
        Self::from_view_projection(&(projection * view))
    }

    /// Extract planes with the Gribb/Hartmann method
    ///
    /// Matrices use column vectors (`clip = M * p`) and OpenGL clip space,
    /// so each plane is row 3 plus or minus one of rows 0 to 2.
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let row = |i: usize| view_projection.row(i).transpose();
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(&(r3 + r0)),
                Plane::from_coefficients(&(r3 - r0)),
                Plane::from_coefficients(&(r3 + r1)),
                Plane::from_coefficients(&(r3 - r1)),
                Plane::from_coefficients(&(r3 + r2)),
                Plane::from_coefficients(&(r3 - r2)),
            ],
        }
    }

    /// The six planes
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Check if a point lies inside or on the boundary
    pub fn point_vs_frustum(&self, point: &Vec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(point) >= 0.0)
    }

    /// Conservative sphere test
    ///
    /// Rejects only when the sphere is entirely behind one plane. Spheres
    /// near frustum corners may be accepted even though they are outside.
    pub fn sphere_vs_frustum(&self, center: &Vec3, radius: f32) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(center) >= -radius)
    }

    /// Conservative box test on all eight corners
    ///
    /// The box is rejected only if every corner lies outside the same plane,
    /// so a box larger than the frustum that straddles all planes passes.
    pub fn volume_vs_frustum(&self, center: &Vec3, half_width: f32, half_height: f32, half_length: f32) -> bool {
        let corners = box_corners(center, half_width, half_height, half_length);
        !self.planes.iter().any(|plane| {
            corners.iter().all(|corner| plane.signed_distance(corner) < 0.0)
        })
    }

    /// [`volume_vs_frustum`](Self::volume_vs_frustum) for an [`Aabb`]
    pub fn aabb_vs_frustum(&self, aabb: &Aabb) -> bool {
        let half = aabb.half_extents();
        self.volume_vs_frustum(&aabb.center(), half.x, half.y, half.z)
    }
}

fn box_corners(center: &Vec3, hw: f32, hh: f32, hl: f32) -> [Vec3; 8] {
    let mut corners = [Vec3::zeros(); 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        let sx = if i & 1 == 0 { -hw } else { hw };
        let sy = if i & 2 == 0 { -hh } else { hh };
        let sz = if i & 4 == 0 { -hl } else { hl };
        *corner = center + Vec3::new(sx, sy, sz);
    }
    corners
}
