//! Terrain collision
//!
//! Terrain triangles are bucketed into a regular XZ sector grid so the
//! triangle under a point is found without scanning the whole mesh.
//! Terrain is one-sided: objects are only ever pushed up out of it.

use super::mesh::{triangles_from_indexed, GeometryError};
use super::ray::ray_box_intersection;
use super::{Ray, RayHit, Triangle};
use crate::foundation::math::Vec3;
use crate::scene::{GameObject, ObjectId, TerrainId};
use crate::spatial::Aabb;

/// Upper bound on sectors per axis
const MAX_SECTORS_PER_AXIS: usize = 1024;

/// Vertical-only contact between an object and a terrain
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainIntersection {
    /// Pure +Y push that lifts the deepest vertex onto the surface
    pub minimum_translation_vector_vertical: Vec3,
    /// Upward normal of the terrain triangle under the deepest vertex
    pub collision_surface_normal: Vec3,
    /// Penetration depth along Y
    pub penetration_depth: f32,
    /// Name of the terrain
    pub terrain_name: String,
    /// Object that should be lifted
    pub caller: ObjectId,
    /// Hitbox of the caller with the deepest vertex
    pub caller_hitbox: usize,
    /// Terrain it collided with
    pub terrain: TerrainId,
}

/// Height-field style collider built from arbitrary terrain triangles
#[derive(Debug, Clone)]
pub struct TerrainCollider {
    name: String,
    triangles: Vec<Triangle>,
    bounds: Aabb,
    sector_size: f32,
    sectors_x: usize,
    sectors_z: usize,
    sectors: Vec<Vec<usize>>,
}

impl TerrainCollider {
    /// Build from mesh geometry with square sectors of `sector_size`
    pub fn from_mesh(
        name: impl Into<String>,
        positions: &[Vec3],
        indices: &[u32],
        sector_size: f32,
    ) -> Result<Self, GeometryError> {
        let triangles = triangles_from_indexed(positions, indices)?;
        let bounds = triangles
            .iter()
            .map(Triangle::aabb)
            .reduce(|a, b| a.merged(&b))
            .ok_or(GeometryError::EmptyMesh)?;

        let size = bounds.size();
        let mut sector_size = if sector_size.is_finite() && sector_size > 0.0 { sector_size } else { 1.0 };
        let largest = size.x.max(size.z);
        if largest / sector_size > MAX_SECTORS_PER_AXIS as f32 {
            sector_size = largest / MAX_SECTORS_PER_AXIS as f32;
        }
        let sectors_x = ((size.x / sector_size).ceil() as usize).max(1);
        let sectors_z = ((size.z / sector_size).ceil() as usize).max(1);

        let mut terrain = Self {
            name: name.into(),
            triangles,
            bounds,
            sector_size,
            sectors_x,
            sectors_z,
            sectors: vec![Vec::new(); sectors_x * sectors_z],
        };

        for (index, triangle) in terrain.triangles.iter().enumerate() {
            let aabb = triangle.aabb();
            let (x0, z0) = terrain.sector_coords(aabb.left(), aabb.back());
            let (x1, z1) = terrain.sector_coords(aabb.right(), aabb.front());
            for z in z0..=z1 {
                for x in x0..=x1 {
                    terrain.sectors[z * sectors_x + x].push(index);
                }
            }
        }

        log::debug!(
            "Terrain '{}': {} triangles in {}x{} sectors of {:.2}",
            terrain.name,
            terrain.triangles.len(),
            sectors_x,
            sectors_z,
            terrain.sector_size
        );
        Ok(terrain)
    }

    /// Terrain name
    pub fn name(&self) -> &str { &self.name }
    /// All triangles
    pub fn triangles(&self) -> &[Triangle] { &self.triangles }
    /// Bounds of the whole mesh
    pub fn bounds(&self) -> &Aabb { &self.bounds }
    /// Sector grid dimensions (x, z)
    pub fn sector_grid(&self) -> (usize, usize) { (self.sectors_x, self.sectors_z) }

    /// Highest triangle whose XZ footprint contains `(x, z)`, with its height there
    pub fn triangle_below(&self, x: f32, z: f32) -> Option<(&Triangle, f32)> {
        if x < self.bounds.left() || x > self.bounds.right() || z < self.bounds.back() || z > self.bounds.front() {
            return None;
        }
        let (sx, sz) = self.sector_coords(x, z);
        self.sectors[sz * self.sectors_x + sx]
            .iter()
            .filter_map(|&i| {
                let triangle = &self.triangles[i];
                triangle.height_at(x, z).map(|h| (triangle, h))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Surface height at `(x, z)`
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.triangle_below(x, z).map(|(_, h)| h)
    }

    /// Closest triangle hit along `ray` (either winding)
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        ray_box_intersection(&ray.origin, &ray.direction, &self.bounds)?;
        self.triangles
            .iter()
            .filter_map(|triangle| triangle.intersect_ray(ray))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|mut hit| {
                if hit.normal.dot(&ray.direction) > 0.0 {
                    hit.normal = -hit.normal;
                }
                hit
            })
    }

    fn sector_coords(&self, x: f32, z: f32) -> (usize, usize) {
        let to_cell = |value: f32, origin: f32, count: usize| -> usize {
            let cell = ((value - origin) / self.sector_size).floor();
            if cell <= 0.0 { 0 } else { (cell as usize).min(count - 1) }
        };
        (
            to_cell(x, self.bounds.left(), self.sectors_x),
            to_cell(z, self.bounds.back(), self.sectors_z),
        )
    }
}

/// Vertical penetration of `object`'s hitboxes into `terrain`
///
/// Every hitbox vertex above the terrain footprint is compared with the
/// surface height under it. The deepest vertex decides the push, which is
/// always straight up.
pub fn test_terrain_intersection(
    object_id: ObjectId,
    object: &GameObject,
    terrain_id: TerrainId,
    terrain: &TerrainCollider,
) -> Option<TerrainIntersection> {
    let mut deepest: Option<(f32, usize, Vec3)> = None;

    for (index, hitbox) in object.hitboxes().iter().enumerate() {
        let aabb = hitbox.aabb();
        if aabb.bottom() > terrain.bounds().top() || !overlaps_xz(aabb, terrain.bounds()) {
            continue;
        }
        for vertex in hitbox.vertices() {
            let Some((triangle, height)) = terrain.triangle_below(vertex.x, vertex.z) else {
                continue;
            };
            let penetration = height - vertex.y;
            if penetration > 0.0 && deepest.map_or(true, |(best, ..)| penetration > best) {
                let mut normal = triangle.normal();
                if normal.y < 0.0 {
                    normal = -normal;
                }
                deepest = Some((penetration, index, normal));
            }
        }
    }

    deepest.map(|(penetration_depth, caller_hitbox, collision_surface_normal)| TerrainIntersection {
        minimum_translation_vector_vertical: Vec3::new(0.0, penetration_depth, 0.0),
        collision_surface_normal,
        penetration_depth,
        terrain_name: terrain.name().to_string(),
        caller: object_id,
        caller_hitbox,
        terrain: terrain_id,
    })
}

fn overlaps_xz(a: &Aabb, b: &Aabb) -> bool {
    a.left() <= b.right() && a.right() >= b.left() && a.back() <= b.front() && a.front() >= b.back()
}
