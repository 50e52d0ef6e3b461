//! Sutherland-Hodgman face clipping for contact polygons

use super::Hitbox;
use crate::culling::Plane;
use crate::foundation::math::Vec3;

/// Points within this distance in front of a plane are kept
const CLIP_TOLERANCE: f32 = 1.0e-6;

/// Keep the part of `polygon` on or behind `plane` (opposite its normal)
pub fn clip_polygon_against_plane(polygon: &[Vec3], plane: &Plane) -> Vec<Vec3> {
    let mut output = Vec::with_capacity(polygon.len() + 1);
    let Some(mut previous) = polygon.last() else {
        return output;
    };
    let mut previous_distance = plane.signed_distance(previous);

    for current in polygon {
        let current_distance = plane.signed_distance(current);
        let current_inside = current_distance <= CLIP_TOLERANCE;
        let previous_inside = previous_distance <= CLIP_TOLERANCE;

        if current_inside != previous_inside {
            let t = previous_distance / (previous_distance - current_distance);
            output.push(previous + (current - previous) * t);
        }
        if current_inside {
            output.push(*current);
        }

        previous = current;
        previous_distance = current_distance;
    }
    output
}

/// Clip every face of `caller` against all face planes of `collider`
///
/// Each returned polygon is the part of one caller face lying inside the
/// collider; faces clipped away entirely are omitted. Together they form
/// the contact region of the two convex hitboxes.
pub fn clip_faces(caller: &Hitbox, collider: &Hitbox) -> Vec<Vec<Vec3>> {
    let planes: Vec<Plane> = collider
        .faces()
        .iter()
        .zip(collider.face_normals())
        .filter_map(|(face, normal)| {
            let point = collider.vertices().get(*face.first()?)?;
            Some(Plane::from_point_normal(point, normal))
        })
        .collect();

    (0..caller.faces().len())
        .filter_map(|face| {
            let clipped = planes.iter().try_fold(caller.face_polygon(face), |polygon, plane| {
                let clipped = clip_polygon_against_plane(&polygon, plane);
                (!clipped.is_empty()).then_some(clipped)
            })?;
            (clipped.len() >= 3).then_some(clipped)
        })
        .collect()
}
