//! Separating Axis Theorem narrow phase
//!
//! Both hitboxes are projected onto every unique face axis of the caller
//! and then of the collider. Any gap is a separating axis and ends the test.
//! Otherwise two translation vectors are tracked: the overall minimum over
//! all axes and a vertical one restricted to mostly-vertical axes, expressed
//! as a pure Y push for step-up and ground snapping.

use super::Hitbox;
use crate::foundation::math::Vec3;
use crate::scene::{GameObject, ObjectId};

/// Result of a successful hitbox/hitbox test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitboxContact {
    /// Smallest translation that separates the caller from the collider
    pub minimum_translation_vector: Vec3,
    /// Smallest pure-Y translation over mostly-vertical axes (zero if none)
    pub minimum_translation_vector_vertical: Vec3,
    /// Unit direction of the overall MTV (collider surface normal at contact)
    pub collision_surface_normal: Vec3,
}

/// Object-level intersection handed back to gameplay
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    /// Smallest translation that separates the caller from the collider
    pub minimum_translation_vector: Vec3,
    /// Smallest pure-Y translation over mostly-vertical axes (zero if none)
    pub minimum_translation_vector_vertical: Vec3,
    /// Unit direction of the overall MTV
    pub collision_surface_normal: Vec3,
    /// Name of the collider object
    pub collider_name: String,
    /// Object that should be moved by the MTV
    pub caller: ObjectId,
    /// Object it collided with
    pub collider: ObjectId,
    /// Index of the caller's hitbox that produced the contact
    pub caller_hitbox: usize,
    /// Index of the collider's hitbox that produced the contact
    pub collider_hitbox: usize,
}

/// SAT test between two world-space hitboxes
///
/// Moving `caller` by the returned MTV moves it away from `collider`'s
/// centre. Returns `None` when a separating axis exists or the overlap is
/// zero on the best axis (touching faces).
pub fn test_hitbox_intersection(caller: &Hitbox, collider: &Hitbox) -> Option<HitboxContact> {
    let center_delta = caller.center() - collider.center();

    let mut best_overlap = f32::INFINITY;
    let mut best_axis = Vec3::zeros();
    let mut best_vertical = f32::INFINITY;

    for axis in caller.axes().iter().chain(collider.axes()) {
        if axis.magnitude_squared() < 1.0e-12 {
            continue;
        }
        let (min_a, max_a) = project(caller.vertices(), axis);
        let (min_b, max_b) = project(collider.vertices(), axis);
        if max_a < min_b || max_b < min_a {
            return None;
        }

        let overlap = (max_a - min_b).min(max_b - min_a);
        if overlap < best_overlap {
            best_overlap = overlap;
            best_axis = if center_delta.dot(axis) < 0.0 { -axis } else { *axis };
        }
        if is_mostly_vertical(axis) {
            best_vertical = best_vertical.min(overlap / axis.y.abs());
        }
    }

    let minimum_translation_vector = best_axis * best_overlap;
    if !best_overlap.is_finite() || minimum_translation_vector.magnitude_squared() <= 0.0 {
        return None;
    }

    let minimum_translation_vector_vertical = if best_vertical.is_finite() {
        let up = if center_delta.y < 0.0 { -1.0 } else { 1.0 };
        Vec3::new(0.0, best_vertical * up, 0.0)
    } else {
        Vec3::zeros()
    };

    Some(HitboxContact {
        minimum_translation_vector,
        minimum_translation_vector_vertical,
        collision_surface_normal: best_axis.normalize(),
    })
}

/// SAT test between every hitbox pair of two objects
///
/// Hitbox pairs whose boxes do not overlap are skipped. When several pairs
/// intersect, the deepest one (largest MTV) is reported because it needs
/// the largest correction.
pub fn test_intersection(
    caller_id: ObjectId,
    caller: &GameObject,
    collider_id: ObjectId,
    collider: &GameObject,
) -> Option<Intersection> {
    let mut deepest: Option<(f32, usize, usize, HitboxContact)> = None;

    for (i, a) in caller.hitboxes().iter().enumerate() {
        for (j, b) in collider.hitboxes().iter().enumerate() {
            if !a.aabb().intersects(b.aabb()) {
                continue;
            }
            if let Some(contact) = test_hitbox_intersection(a, b) {
                let depth = contact.minimum_translation_vector.magnitude_squared();
                if deepest.map_or(true, |(best, ..)| depth > best) {
                    deepest = Some((depth, i, j, contact));
                }
            }
        }
    }

    deepest.map(|(_, caller_hitbox, collider_hitbox, contact)| Intersection {
        minimum_translation_vector: contact.minimum_translation_vector,
        minimum_translation_vector_vertical: contact.minimum_translation_vector_vertical,
        collision_surface_normal: contact.collision_surface_normal,
        collider_name: collider.name().to_string(),
        caller: caller_id,
        collider: collider_id,
        caller_hitbox,
        collider_hitbox,
    })
}

fn project(vertices: &[Vec3], axis: &Vec3) -> (f32, f32) {
    vertices.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), v| {
        let d = v.dot(axis);
        (min.min(d), max.max(d))
    })
}

fn is_mostly_vertical(axis: &Vec3) -> bool {
    let y = axis.y.abs();
    y > 1.0e-6 && y >= axis.x.abs() && y >= axis.z.abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{rotation, Mat4, Mat4Ext, WORLD_UP};
    use crate::physics::HitboxTemplate;
    use crate::state::EntityState;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn unit_cube_at(position: Vec3) -> Hitbox {
        let mut hitbox = Hitbox::new(HitboxTemplate::cuboid(Vec3::new(1.0, 1.0, 1.0)));
        hitbox.update_from_model(&Mat4::new_translation(&position));
        hitbox
    }

    #[test]
    fn test_two_cube_scenario() {
        let a = unit_cube_at(Vec3::zeros());
        let b = unit_cube_at(Vec3::new(1.5, 0.0, 0.0));
        let contact = test_hitbox_intersection(&a, &b).unwrap();
        assert_relative_eq!(contact.minimum_translation_vector, Vec3::new(-0.5, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(contact.collision_surface_normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        // Vertical push clears the full two-unit overlap on Y
        assert_relative_eq!(contact.minimum_translation_vector_vertical, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_symmetry() {
        let a = unit_cube_at(Vec3::zeros());
        let mut b = Hitbox::new(HitboxTemplate::cuboid(Vec3::new(0.5, 1.5, 0.75)));
        b.update_from_model(&Mat4::from_trs(
            &Vec3::new(1.2, 0.4, -0.3),
            &rotation::from_axis_degrees(WORLD_UP, 30.0),
            &Vec3::new(1.0, 1.0, 1.0),
        ));

        let ab = test_hitbox_intersection(&a, &b).unwrap();
        let ba = test_hitbox_intersection(&b, &a).unwrap();
        assert!(
            (ab.minimum_translation_vector.magnitude() - ba.minimum_translation_vector.magnitude()).abs() < 1e-5
        );
        assert_relative_eq!(ab.minimum_translation_vector, -ba.minimum_translation_vector, epsilon = 1e-5);

        let far = unit_cube_at(Vec3::new(10.0, 0.0, 0.0));
        assert!(test_hitbox_intersection(&a, &far).is_none());
        assert!(test_hitbox_intersection(&far, &a).is_none());
    }

    #[test]
    fn test_separating_axis_gap_and_overlap() {
        let a = unit_cube_at(Vec3::zeros());
        let gap = unit_cube_at(Vec3::new(2.001, 0.0, 0.0));
        assert!(test_hitbox_intersection(&a, &gap).is_none());

        let overlapping = unit_cube_at(Vec3::new(1.99, 0.0, 0.0));
        let contact = test_hitbox_intersection(&a, &overlapping).unwrap();
        assert!((contact.minimum_translation_vector.magnitude() - 0.01).abs() < 1e-4);
        assert!(contact.minimum_translation_vector.x < 0.0);
        assert!(contact.minimum_translation_vector.y.abs() < 1e-6);
    }

    #[test]
    fn test_vertical_mtv_pushes_up_from_below() {
        let ground = {
            let mut hitbox = Hitbox::new(HitboxTemplate::cuboid(Vec3::new(10.0, 0.5, 10.0)));
            hitbox.update_from_model(&Mat4::new_translation(&Vec3::new(0.0, -0.5, 0.0)));
            hitbox
        };
        let player = unit_cube_at(Vec3::new(0.0, 0.9, 0.0));
        let contact = test_hitbox_intersection(&player, &ground).unwrap();
        assert_relative_eq!(contact.minimum_translation_vector, Vec3::new(0.0, 0.1, 0.0), epsilon = 1e-5);
        assert_relative_eq!(contact.minimum_translation_vector_vertical, Vec3::new(0.0, 0.1, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_vertical_mtv_on_a_slope() {
        // Wide slab tilted 30 degrees about Z; its top normal is (-sin30, cos30, 0)
        let mut ramp = Hitbox::new(HitboxTemplate::cuboid(Vec3::new(10.0, 0.5, 10.0)));
        ramp.update_from_model(&Mat4::from_trs(
            &Vec3::zeros(),
            &rotation::from_axis_degrees(Vec3::z(), 30.0),
            &Vec3::new(1.0, 1.0, 1.0),
        ));
        let player = unit_cube_at(Vec3::new(0.0, 1.5, 0.0));

        let contact = test_hitbox_intersection(&player, &ramp).unwrap();
        let (sin, cos) = 30.0f32.to_radians().sin_cos();
        let slope_normal = Vec3::new(-sin, cos, 0.0);
        // Lowest player corner (1, 0.5, z) sits this far below the ramp surface
        let depth = 0.5 - slope_normal.dot(&Vec3::new(1.0, 0.5, 0.0));

        assert_relative_eq!(contact.collision_surface_normal, slope_normal, epsilon = 1e-4);
        assert_relative_eq!(contact.minimum_translation_vector, slope_normal * depth, epsilon = 1e-4);
        assert_relative_eq!(
            contact.minimum_translation_vector_vertical,
            Vec3::new(0.0, depth / cos, 0.0),
            epsilon = 1e-4
        );
        assert!(contact.minimum_translation_vector_vertical.y > contact.minimum_translation_vector.magnitude());
    }

    #[test]
    fn test_object_level_reports_ids_and_hitboxes() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let (id_a, id_b) = (ids.insert(()), ids.insert(()));

        let cube = HitboxTemplate::cuboid(Vec3::new(1.0, 1.0, 1.0));
        let a = GameObject::new("a", EntityState::identity()).with_hitbox(cube.clone());
        let b = GameObject::new("wall", EntityState::from_position(Vec3::new(1.5, 0.0, 0.0)))
            .with_hitbox(HitboxTemplate::cuboid_at(Vec3::new(20.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)))
            .with_hitbox(cube);

        let hit = test_intersection(id_a, &a, id_b, &b).unwrap();
        assert_eq!(hit.caller, id_a);
        assert_eq!(hit.collider, id_b);
        assert_eq!(hit.collider_name, "wall");
        assert_eq!(hit.caller_hitbox, 0);
        assert_eq!(hit.collider_hitbox, 1);
        assert_relative_eq!(hit.minimum_translation_vector, Vec3::new(-0.5, 0.0, 0.0), epsilon = 1e-5);
    }
}
