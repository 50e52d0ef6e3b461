//! Ray intersection utilities
//!
//! Free functions over borrowed geometry. None of them allocate or keep
//! state, so they can be called from anywhere in the frame.

use super::{Ray, RayHit};
use crate::foundation::math::Vec3;
use crate::scene::GameObject;
use crate::spatial::Aabb;

/// Determinant and distance threshold for Möller-Trumbore
pub const RAY_EPSILON: f32 = 1.0e-7;

/// Parametric result of a ray/triangle hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Distance along the (unit) ray direction
    pub t: f32,
    /// Barycentric weight of the second vertex
    pub u: f32,
    /// Barycentric weight of the third vertex
    pub v: f32,
    /// Contact point
    pub point: Vec3,
}

/// Möller-Trumbore ray/triangle intersection
///
/// Rejects near-parallel rays (`|det| < 1e-7`), hits at or behind the
/// origin (`t <= 1e-7`) and points outside the triangle. With
/// `cull_back_faces` a ray travelling along the triangle's normal
/// (`dot(direction, normal) >= 0`, counter-clockwise winding) misses.
pub fn ray_triangle_intersection(
    origin: &Vec3,
    direction: &Vec3,
    v0: &Vec3,
    v1: &Vec3,
    v2: &Vec3,
    cull_back_faces: bool,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(&edge2);
    // det = -dot(direction, edge1 x edge2), positive for front faces
    let det = edge1.dot(&h);

    if cull_back_faces {
        if det < RAY_EPSILON {
            return None;
        }
    } else if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv_det * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(&q);
    (t > RAY_EPSILON).then(|| TriangleHit { t, u, v, point: origin + direction * t })
}

/// Slab test against an axis-aligned box
///
/// Returns the entry distance, or `0.0` when the origin is inside. The
/// inverse direction is computed once. An axis the ray is parallel to is
/// a miss if the origin lies outside that slab and is skipped otherwise.
pub fn ray_box_intersection(origin: &Vec3, direction: &Vec3, aabb: &Aabb) -> Option<f32> {
    let inverse = direction.map(|d| 1.0 / d);
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        if direction[axis] == 0.0 {
            if origin[axis] < aabb.min[axis] || origin[axis] > aabb.max[axis] {
                return None;
            }
            continue;
        }
        let mut t0 = (aabb.min[axis] - origin[axis]) * inverse[axis];
        let mut t1 = (aabb.max[axis] - origin[axis]) * inverse[axis];
        if inverse[axis] < 0.0 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_exit < t_enter || t_exit < 0.0 {
            return None;
        }
    }

    Some(t_enter.max(0.0))
}

/// Closest front-facing hit on any hitbox face of `object`
///
/// Faces whose normal does not oppose the ray (`dot(direction, normal) >= 0`)
/// are skipped. Polygon faces are fanned into triangles around their first
/// vertex. The closest hit is chosen by squared distance from the origin.
pub fn intersection_point_on_object_for_ray(ray: &Ray, object: &GameObject) -> Option<RayHit> {
    let mut closest: Option<(f32, RayHit)> = None;

    for hitbox in object.hitboxes() {
        if ray_box_intersection(&ray.origin, &ray.direction, hitbox.aabb()).is_none() {
            continue;
        }
        let vertices = hitbox.vertices();
        for (face, normal) in hitbox.faces().iter().zip(hitbox.face_normals()) {
            if ray.direction.dot(normal) >= 0.0 || face.len() < 3 {
                continue;
            }
            let anchor = vertices[face[0]];
            for window in face[1..].windows(2) {
                let hit = ray_triangle_intersection(
                    &ray.origin,
                    &ray.direction,
                    &anchor,
                    &vertices[window[0]],
                    &vertices[window[1]],
                    false,
                );
                if let Some(hit) = hit {
                    let distance_squared = (hit.point - ray.origin).magnitude_squared();
                    if closest.map_or(true, |(best, _)| distance_squared < best) {
                        closest = Some((
                            distance_squared,
                            RayHit { distance: hit.t, point: hit.point, normal: *normal },
                        ));
                    }
                }
            }
        }
    }

    closest.map(|(_, hit)| hit)
}

/// Intersection of a line with a plane given by point and normal
///
/// Returns `None` when the line is parallel to the plane. The line extends
/// in both directions from `origin`.
pub fn line_plane_intersection(origin: &Vec3, direction: &Vec3, plane_point: &Vec3, plane_normal: &Vec3) -> Option<Vec3> {
    let denominator = plane_normal.dot(direction);
    if denominator.abs() < RAY_EPSILON {
        return None;
    }
    let t = plane_normal.dot(&(plane_point - origin)) / denominator;
    Some(origin + direction * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::HitboxTemplate;
    use crate::state::EntityState;
    use approx::assert_relative_eq;

    fn horizontal_triangle() -> (Vec3, Vec3, Vec3) {
        (Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn test_ray_hits_horizontal_triangle() {
        let (v0, v1, v2) = horizontal_triangle();
        let down = Vec3::new(0.0, -1.0, 0.0);

        let hit = ray_triangle_intersection(&Vec3::new(0.0, 5.0, 0.0), &down, &v0, &v1, &v2, false).unwrap();
        assert_relative_eq!(hit.point, Vec3::new(0.0, 0.0, 0.0), epsilon = 1e-4);
        assert!((hit.t - 5.0).abs() < 1e-4);

        // Dropped onto the centroid
        let hit = ray_triangle_intersection(&Vec3::new(0.0, 5.0, -1.0 / 3.0), &down, &v0, &v1, &v2, false).unwrap();
        assert_relative_eq!(hit.point, Vec3::new(0.0, 0.0, -0.333), epsilon = 1e-3);
        assert!(hit.point.y.abs() < 1e-6);
    }

    #[test]
    fn test_back_face_culling() {
        let (v0, v1, v2) = horizontal_triangle();
        // (v1 - v0) x (v2 - v0) points down, so a downward ray sees the back face
        let down = Vec3::new(0.0, -1.0, 0.0);
        let origin = Vec3::new(0.0, 5.0, 0.0);
        assert!(ray_triangle_intersection(&origin, &down, &v0, &v1, &v2, true).is_none());

        // From below, travelling up, the ray meets the front face
        let up = Vec3::new(0.0, 1.0, 0.0);
        let hit = ray_triangle_intersection(&Vec3::new(0.0, -5.0, 0.0), &up, &v0, &v1, &v2, true);
        assert!(hit.is_some());
    }

    #[test]
    fn test_ray_triangle_rejects_behind_and_outside() {
        let (v0, v1, v2) = horizontal_triangle();
        let up = Vec3::new(0.0, 1.0, 0.0);
        assert!(ray_triangle_intersection(&Vec3::new(0.0, 5.0, 0.0), &up, &v0, &v1, &v2, false).is_none());
        let down = Vec3::new(0.0, -1.0, 0.0);
        assert!(ray_triangle_intersection(&Vec3::new(3.0, 5.0, 0.0), &down, &v0, &v1, &v2, false).is_none());
        // Parallel to the triangle plane
        let sideways = Vec3::new(1.0, 0.0, 0.0);
        assert!(ray_triangle_intersection(&Vec3::new(-5.0, 0.0, 0.0), &sideways, &v0, &v1, &v2, false).is_none());
    }

    #[test]
    fn test_ray_box_slab() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let t = ray_box_intersection(&Vec3::new(0.0, 0.0, 5.0), &Vec3::new(0.0, 0.0, -1.0), &aabb).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        // Origin inside
        assert_eq!(ray_box_intersection(&Vec3::zeros(), &Vec3::new(1.0, 0.0, 0.0), &aabb), Some(0.0));
        // Pointing away
        assert!(ray_box_intersection(&Vec3::new(0.0, 0.0, 5.0), &Vec3::new(0.0, 0.0, 1.0), &aabb).is_none());
        // Axis-parallel miss
        assert!(ray_box_intersection(&Vec3::new(2.0, 0.0, 5.0), &Vec3::new(0.0, 0.0, -1.0), &aabb).is_none());
    }

    #[test]
    fn test_ray_box_grazing_a_face() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        // Origin on the x = 1 face plane with no x motion
        let t = ray_box_intersection(&Vec3::new(1.0, 0.0, 5.0), &Vec3::new(0.0, 0.0, -1.0), &aabb);
        assert!((t.unwrap() - 4.0).abs() < 1e-5);
        let t = ray_box_intersection(&Vec3::new(-1.0, 1.0, 5.0), &Vec3::new(-0.0, 0.0, -1.0), &aabb);
        assert!((t.unwrap() - 4.0).abs() < 1e-5);
        assert!(ray_box_intersection(&Vec3::new(1.0 + 1.0e-4, 0.0, 5.0), &Vec3::new(0.0, 0.0, -1.0), &aabb).is_none());
    }

    #[test]
    fn test_line_plane_intersection() {
        let hit = line_plane_intersection(
            &Vec3::new(1.0, 4.0, 2.0),
            &Vec3::new(0.0, -2.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
        );
        assert_relative_eq!(hit.unwrap(), Vec3::new(1.0, 1.0, 2.0), epsilon = 1e-6);

        let parallel = line_plane_intersection(
            &Vec3::zeros(),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
        );
        assert!(parallel.is_none());
    }

    #[test]
    fn test_ray_against_object_faces() {
        let object = GameObject::new("crate", EntityState::from_position(Vec3::new(0.0, 0.0, -10.0)))
            .with_hitbox(HitboxTemplate::cuboid(Vec3::new(1.0, 1.0, 1.0)));
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        let hit = intersection_point_on_object_for_ray(&ray, &object).unwrap();
        assert_relative_eq!(hit.point, Vec3::new(0.0, 0.0, -9.0), epsilon = 1e-4);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);

        // From inside every face points away from the ray
        let inside = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(intersection_point_on_object_for_ray(&inside, &object).is_none());
    }
}
