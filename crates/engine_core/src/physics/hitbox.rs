//! Oriented hitboxes
//!
//! A [`HitboxTemplate`] is immutable model-space geometry: vertices, faces
//! as vertex index loops, per-face outward normals and the deduplicated
//! face axes used by SAT. A [`Hitbox`] pairs a template with its world-space
//! copy, which [`Hitbox::update`] recomputes from the owner's matrices.

use super::mesh::{triangles_from_indexed, GeometryError};
use crate::foundation::math::{transform_direction, transform_point, Mat4, Mat4Ext, Vec3};
use crate::spatial::Aabb;

/// Two axes closer than this (|dot| above `1 - tolerance`) count as one
const AXIS_PARALLEL_TOLERANCE: f32 = 1.0e-4;

/// Model-space hitbox geometry
#[derive(Debug, Clone, PartialEq)]
pub struct HitboxTemplate {
    vertices: Vec<Vec3>,
    faces: Vec<Vec<usize>>,
    face_normals: Vec<Vec3>,
    axes: Vec<Vec3>,
    bounds: Aabb,
}

impl HitboxTemplate {
    /// Box centred on the model origin
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::cuboid_at(Vec3::zeros(), half_extents)
    }

    /// Box centred at `center` in model space
    pub fn cuboid_at(center: Vec3, half_extents: Vec3) -> Self {
        let h = half_extents.abs();
        // Vertex i has +x when bit 0 is set, +y for bit 1 and +z for bit 2
        let vertices: Vec<Vec3> = (0..8)
            .map(|i| {
                center + Vec3::new(
                    if i & 1 == 0 { -h.x } else { h.x },
                    if i & 2 == 0 { -h.y } else { h.y },
                    if i & 4 == 0 { -h.z } else { h.z },
                )
            })
            .collect();
        // Counter-clockwise seen from outside: -X, +X, -Y, +Y, -Z, +Z
        let faces = vec![
            vec![0, 4, 6, 2],
            vec![1, 3, 7, 5],
            vec![0, 1, 5, 4],
            vec![2, 6, 7, 3],
            vec![0, 2, 3, 1],
            vec![4, 5, 7, 6],
        ];
        let face_normals = vec![
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        Self::assemble(vertices, faces, face_normals)
    }

    /// Convex hitbox from an indexed triangle mesh
    ///
    /// Every triangle becomes a face. Faces are re-wound where needed so
    /// their normals point away from the vertex centroid, which is correct
    /// for convex input.
    pub fn from_mesh(positions: &[Vec3], indices: &[u32]) -> Result<Self, GeometryError> {
        let triangles = triangles_from_indexed(positions, indices)?;

        let mut vertices: Vec<Vec3> = Vec::new();
        let mut index_of = |p: Vec3| -> usize {
            match vertices.iter().position(|v| (v - p).magnitude_squared() < 1.0e-12) {
                Some(i) => i,
                None => {
                    vertices.push(p);
                    vertices.len() - 1
                }
            }
        };
        let mut faces = Vec::with_capacity(triangles.len());
        for triangle in &triangles {
            faces.push(vec![index_of(triangle.v0), index_of(triangle.v1), index_of(triangle.v2)]);
        }

        let centroid = vertices.iter().sum::<Vec3>() / vertices.len() as f32;
        let mut face_normals = Vec::with_capacity(faces.len());
        for face in &mut faces {
            let mut normal = polygon_normal(&vertices, face);
            let face_center = face.iter().map(|&i| vertices[i]).sum::<Vec3>() / face.len() as f32;
            if normal.dot(&(face_center - centroid)) < 0.0 {
                face.reverse();
                normal = -normal;
            }
            face_normals.push(normal);
        }

        log::debug!(
            "Hitbox template from mesh: {} vertices, {} faces",
            vertices.len(),
            faces.len()
        );
        Ok(Self::assemble(vertices, faces, face_normals))
    }

    fn assemble(vertices: Vec<Vec3>, faces: Vec<Vec<usize>>, face_normals: Vec<Vec3>) -> Self {
        let axes = unique_axes(&face_normals);
        let bounds = Aabb::from_points(&vertices)
            .unwrap_or_else(|| Aabb::new(Vec3::zeros(), Vec3::zeros()));
        Self { vertices, faces, face_normals, axes, bounds }
    }

    /// Model-space vertices
    pub fn vertices(&self) -> &[Vec3] { &self.vertices }
    /// Faces as vertex index loops
    pub fn faces(&self) -> &[Vec<usize>] { &self.faces }
    /// Outward unit normal per face
    pub fn face_normals(&self) -> &[Vec3] { &self.face_normals }
    /// Deduplicated face axes
    pub fn axes(&self) -> &[Vec3] { &self.axes }
    /// Model-space bounds
    pub fn bounds(&self) -> &Aabb { &self.bounds }
}

/// World-space hitbox owned by a single object
#[derive(Debug, Clone, PartialEq)]
pub struct Hitbox {
    template: HitboxTemplate,
    vertices: Vec<Vec3>,
    face_normals: Vec<Vec3>,
    axes: Vec<Vec3>,
    center: Vec3,
    aabb: Aabb,
}

impl Hitbox {
    /// World copy placed with the identity transform
    pub fn new(template: HitboxTemplate) -> Self {
        let mut hitbox = Self {
            vertices: template.vertices.clone(),
            face_normals: template.face_normals.clone(),
            axes: template.axes.clone(),
            center: template.bounds.center(),
            aabb: template.bounds,
            template,
        };
        hitbox.update(&Mat4::identity(), &Mat4::identity());
        hitbox
    }

    /// Recompute the world-space copy from the owner's model and normal matrices
    pub fn update(&mut self, model_matrix: &Mat4, normal_matrix: &Mat4) {
        for (world, local) in self.vertices.iter_mut().zip(&self.template.vertices) {
            *world = transform_point(model_matrix, local);
        }
        let to_world = |n: &Vec3| {
            transform_direction(normal_matrix, n)
                .try_normalize(1.0e-12)
                .unwrap_or(*n)
        };
        for (world, local) in self.face_normals.iter_mut().zip(&self.template.face_normals) {
            *world = to_world(local);
        }
        for (world, local) in self.axes.iter_mut().zip(&self.template.axes) {
            *world = to_world(local);
        }

        self.aabb = Aabb::from_points(&self.vertices).unwrap_or(self.aabb);
        self.center = self.vertices.iter().sum::<Vec3>() / self.vertices.len().max(1) as f32;
    }

    /// Convenience for [`update`](Self::update) from a model matrix alone
    pub fn update_from_model(&mut self, model_matrix: &Mat4) {
        self.update(model_matrix, &model_matrix.normal_matrix());
    }

    /// Model-space template
    pub fn template(&self) -> &HitboxTemplate { &self.template }
    /// World-space vertices
    pub fn vertices(&self) -> &[Vec3] { &self.vertices }
    /// Faces as indices into [`vertices`](Self::vertices)
    pub fn faces(&self) -> &[Vec<usize>] { &self.template.faces }
    /// World-space outward face normals
    pub fn face_normals(&self) -> &[Vec3] { &self.face_normals }
    /// World-space SAT axes
    pub fn axes(&self) -> &[Vec3] { &self.axes }
    /// Vertex centroid
    pub fn center(&self) -> Vec3 { self.center }
    /// World-space bounds
    pub fn aabb(&self) -> &Aabb { &self.aabb }

    /// Vertex positions of one face in loop order
    pub fn face_polygon(&self, face: usize) -> Vec<Vec3> {
        self.template
            .faces
            .get(face)
            .map(|indices| indices.iter().map(|&i| self.vertices[i]).collect())
            .unwrap_or_default()
    }
}

/// Newell's method; robust for slightly non-planar loops
fn polygon_normal(vertices: &[Vec3], face: &[usize]) -> Vec3 {
    let mut normal = Vec3::zeros();
    for (i, &a) in face.iter().enumerate() {
        let current = vertices[a];
        let next = vertices[face[(i + 1) % face.len()]];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal.try_normalize(1.0e-12).unwrap_or_else(Vec3::y)
}

fn unique_axes(normals: &[Vec3]) -> Vec<Vec3> {
    let mut axes: Vec<Vec3> = Vec::new();
    for normal in normals {
        let parallel = axes
            .iter()
            .any(|axis| axis.dot(normal).abs() > 1.0 - AXIS_PARALLEL_TOLERANCE);
        if !parallel {
            axes.push(*normal);
        }
    }
    axes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{rotation, Quat, WORLD_UP};
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_normals_match_winding() {
        let template = HitboxTemplate::cuboid(Vec3::new(1.0, 2.0, 3.0));
        for (face, normal) in template.faces().iter().zip(template.face_normals()) {
            assert_relative_eq!(polygon_normal(template.vertices(), face), *normal, epsilon = 1e-6);
        }
        assert_eq!(template.axes().len(), 3);
    }

    #[test]
    fn test_update_moves_world_copy() {
        let mut hitbox = Hitbox::new(HitboxTemplate::cuboid(Vec3::new(1.0, 1.0, 1.0)));
        let model = Mat4::from_trs(
            &Vec3::new(5.0, 0.0, 0.0),
            &rotation::from_axis_degrees(WORLD_UP, 45.0),
            &Vec3::new(1.0, 1.0, 1.0),
        );
        hitbox.update_from_model(&model);

        assert_relative_eq!(hitbox.center(), Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
        let half_diagonal = 2.0f32.sqrt();
        assert!((hitbox.aabb().right() - (5.0 + half_diagonal)).abs() < 1e-4);
        for axis in hitbox.axes() {
            assert!((axis.magnitude() - 1.0).abs() < 1e-5);
        }
        // Template is untouched
        assert_eq!(hitbox.template().bounds().right(), 1.0);
    }

    #[test]
    fn test_non_uniform_scale_keeps_normals_perpendicular() {
        let mut hitbox = Hitbox::new(HitboxTemplate::cuboid(Vec3::new(1.0, 1.0, 1.0)));
        let model = Mat4::from_trs(
            &Vec3::zeros(),
            &Quat::from_euler_angles(0.3, 0.5, 0.1),
            &Vec3::new(3.0, 1.0, 0.5),
        );
        hitbox.update_from_model(&model);
        for (face, normal) in hitbox.faces().iter().zip(hitbox.face_normals()) {
            let edge = hitbox.vertices()[face[1]] - hitbox.vertices()[face[0]];
            assert!(edge.dot(normal).abs() < 1e-4);
        }
    }

    #[test]
    fn test_from_mesh_tetrahedron() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        // Deliberately mixed winding
        let indices = [0, 1, 2, 0, 1, 3, 0, 2, 3, 1, 2, 3];
        let template = HitboxTemplate::from_mesh(&positions, &indices).unwrap();
        assert_eq!(template.vertices().len(), 4);
        assert_eq!(template.faces().len(), 4);
        assert_eq!(template.axes().len(), 4);

        let centroid = Vec3::new(0.25, 0.25, 0.25);
        for (face, normal) in template.faces().iter().zip(template.face_normals()) {
            let on_face = template.vertices()[face[0]];
            assert!(normal.dot(&(on_face - centroid)) > 0.0);
        }
    }

    #[test]
    fn test_from_mesh_propagates_errors() {
        let result = HitboxTemplate::from_mesh(&[Vec3::zeros()], &[0, 1, 2]);
        assert!(matches!(result, Err(GeometryError::IndexOutOfRange { .. })));
    }
}
