//! Axis-aligned bounding box shared by culling, the octree and hitboxes

use crate::foundation::math::Vec3;
use crate::physics::ray::ray_box_intersection;

/// Axis-aligned bounding box
///
/// Face accessors follow the engine's Y-up, right-handed convention:
/// `left/right` are X, `bottom/top` are Y and `back/front` are Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box enclosing every point, `None` for an empty set
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half extents of the AABB
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full edge lengths
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Minimum X
    pub fn left(&self) -> f32 { self.min.x }
    /// Maximum X
    pub fn right(&self) -> f32 { self.max.x }
    /// Minimum Y
    pub fn bottom(&self) -> f32 { self.min.y }
    /// Maximum Y
    pub fn top(&self) -> f32 { self.max.y }
    /// Minimum Z
    pub fn back(&self) -> f32 { self.min.z }
    /// Maximum Z
    pub fn front(&self) -> f32 { self.max.z }

    /// Check if this AABB contains a point (boundary inclusive)
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if `other` lies entirely inside this box (boundary inclusive)
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x && other.max.x <= self.max.x &&
        other.min.y >= self.min.y && other.max.y <= self.max.y &&
        other.min.z >= self.min.z && other.max.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Box with the same center and half extents multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self::from_center_half_extents(self.center(), self.half_extents() * factor)
    }

    /// Smallest box enclosing both boxes
    pub fn merged(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Distance along the ray to the entry point, `0.0` if the origin is inside
    pub fn intersect_ray(&self, origin: &Vec3, direction: &Vec3) -> Option<f32> {
        ray_box_intersection(origin, direction, self)
    }
}
