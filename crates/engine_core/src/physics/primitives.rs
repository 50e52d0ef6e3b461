//! Primitive shapes used by ray casts and terrain

use super::ray::ray_triangle_intersection;
use crate::foundation::math::Vec3;
use crate::spatial::Aabb;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray; a zero direction falls back to -Z
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction
                .try_normalize(1.0e-12)
                .unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0)),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray intersection test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The distance from the ray origin to the hit point
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
    /// The surface normal at the intersection point
    pub normal: Vec3,
}

/// A bounding sphere for quick rejection tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius: radius.abs() }
    }

    /// Sphere circumscribing a box
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(aabb.center(), aabb.half_extents().magnitude())
    }

    /// Closest forward hit of `ray` on the sphere surface
    ///
    /// A ray starting inside the sphere hits the far side.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<RayHit> {
        let oc = ray.origin - self.center;
        let b = oc.dot(&ray.direction);
        let c = oc.magnitude_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let t = if -b - root > 0.0 {
            -b - root
        } else if -b + root > 0.0 {
            -b + root
        } else {
            return None;
        };

        let point = ray.point_at(t);
        let normal = (point - self.center).try_normalize(1.0e-12).unwrap_or(-ray.direction);
        Some(RayHit { distance: t, point, normal })
    }
}

/// A triangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unit normal by the right-hand rule, +Y for degenerate triangles
    pub fn normal(&self) -> Vec3 {
        (self.v1 - self.v0)
            .cross(&(self.v2 - self.v0))
            .try_normalize(1.0e-12)
            .unwrap_or_else(Vec3::y)
    }

    /// Surface area
    pub fn area(&self) -> f32 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0)).magnitude() * 0.5
    }

    /// Bounding box of the three vertices
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.v0.inf(&self.v1).inf(&self.v2),
            self.v0.sup(&self.v1).sup(&self.v2),
        )
    }

    /// Möller-Trumbore hit without back-face culling
    pub fn intersect_ray(&self, ray: &Ray) -> Option<RayHit> {
        let hit = ray_triangle_intersection(&ray.origin, &ray.direction, &self.v0, &self.v1, &self.v2, false)?;
        Some(RayHit {
            distance: hit.t,
            point: hit.point,
            normal: self.normal(),
        })
    }

    /// Barycentric coordinates of `(x, z)` projected onto the XZ plane
    ///
    /// Returns `None` if the point lies outside the projected triangle or
    /// the triangle is vertical.
    pub fn barycentric_xz(&self, x: f32, z: f32) -> Option<(f32, f32, f32)> {
        const TOLERANCE: f32 = 1.0e-6;
        let (ax, az) = (self.v0.x, self.v0.z);
        let (bx, bz) = (self.v1.x, self.v1.z);
        let (cx, cz) = (self.v2.x, self.v2.z);

        let det = (bz - cz) * (ax - cx) + (cx - bx) * (az - cz);
        if det.abs() < 1.0e-12 {
            return None;
        }
        let w0 = ((bz - cz) * (x - cx) + (cx - bx) * (z - cz)) / det;
        let w1 = ((cz - az) * (x - cx) + (ax - cx) * (z - cz)) / det;
        let w2 = 1.0 - w0 - w1;

        (w0 >= -TOLERANCE && w1 >= -TOLERANCE && w2 >= -TOLERANCE).then_some((w0, w1, w2))
    }

    /// Height of the triangle's plane at `(x, z)` if the point is above/below it
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let (w0, w1, w2) = self.barycentric_xz(x, z)?;
        Some(w0 * self.v0.y + w1 * self.v1.y + w2 * self.v2.y)
    }
}
