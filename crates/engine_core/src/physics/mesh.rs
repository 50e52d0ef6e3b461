//! Indexed triangle mesh input
//!
//! Geometry arrives from the asset layer as positions plus triangle index
//! triples. Everything built from it goes through [`triangles_from_indexed`]
//! so malformed input is rejected in one place.

use thiserror::Error;

use super::Triangle;
use crate::foundation::math::Vec3;

/// Reasons mesh geometry cannot be turned into collision data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// No vertices or no indices
    #[error("mesh has no geometry")]
    EmptyMesh,

    /// Index count is not a multiple of three
    #[error("index count {0} is not a multiple of 3")]
    NonTriangleIndices(usize),

    /// An index points past the vertex array
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index
        index: u32,
        /// Number of vertices supplied
        vertex_count: usize,
    },

    /// Every triangle has zero area
    #[error("mesh contains only degenerate triangles")]
    Degenerate,
}

/// Resolve index triples into triangles, dropping zero-area ones
pub fn triangles_from_indexed(positions: &[Vec3], indices: &[u32]) -> Result<Vec<Triangle>, GeometryError> {
    if positions.is_empty() || indices.is_empty() {
        return Err(GeometryError::EmptyMesh);
    }
    if indices.len() % 3 != 0 {
        return Err(GeometryError::NonTriangleIndices(indices.len()));
    }

    let vertex = |index: u32| -> Result<Vec3, GeometryError> {
        positions
            .get(index as usize)
            .copied()
            .ok_or(GeometryError::IndexOutOfRange { index, vertex_count: positions.len() })
    };

    let mut triangles = Vec::with_capacity(indices.len() / 3);
    for chunk in indices.chunks_exact(3) {
        let triangle = Triangle::new(vertex(chunk[0])?, vertex(chunk[1])?, vertex(chunk[2])?);
        if triangle.area() > 1.0e-12 {
            triangles.push(triangle);
        }
    }

    if triangles.is_empty() {
        return Err(GeometryError::Degenerate);
    }
    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn test_valid_mesh() {
        let triangles = triangles_from_indexed(&quad(), &[0, 2, 1, 0, 3, 2]).unwrap();
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(triangles_from_indexed(&[], &[0, 1, 2]), Err(GeometryError::EmptyMesh));
        assert_eq!(triangles_from_indexed(&quad(), &[0, 1]), Err(GeometryError::NonTriangleIndices(2)));
        assert_eq!(
            triangles_from_indexed(&quad(), &[0, 1, 9]),
            Err(GeometryError::IndexOutOfRange { index: 9, vertex_count: 4 })
        );
        assert_eq!(triangles_from_indexed(&quad(), &[0, 0, 1]), Err(GeometryError::Degenerate));
    }
}
