//! Sweep-and-prune broad phase
//!
//! Items are sorted by their minimum along one axis and swept once; pairs
//! whose intervals overlap on that axis become candidates. The axis is the
//! one with the largest positional variance measured on the previous call,
//! which keeps the sweep short for scenes spread along one direction.

use super::HitboxRef;
use crate::foundation::math::Vec3;

const AXIS_NAMES: [&str; 3] = ["X", "Y", "Z"];

/// Self-tuning sweep-and-prune state carried between ticks
#[derive(Debug, Clone, Default)]
pub struct SweepAndPrune {
    axis: usize,
}

impl SweepAndPrune {
    /// Start sweeping along X
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis used by the next sweep (0 = X, 1 = Y, 2 = Z)
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Candidate pairs from different objects overlapping on the sweep axis
    ///
    /// Pairs overlapping on one axis only are expected; the narrow phase
    /// rejects them. After the sweep the axis for the next call is chosen
    /// from the variance of the item centres.
    pub fn find_pairs(&mut self, items: &[HitboxRef]) -> Vec<(HitboxRef, HitboxRef)> {
        let axis = self.axis;
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| items[a].aabb.min[axis].total_cmp(&items[b].aabb.min[axis]));

        let mut pairs = Vec::new();
        for (i, &a) in order.iter().enumerate() {
            let current = &items[a];
            for &b in &order[i + 1..] {
                let other = &items[b];
                if other.aabb.min[axis] > current.aabb.max[axis] {
                    break;
                }
                if current.object != other.object {
                    pairs.push((*current, *other));
                }
            }
        }

        self.update_axis(items);
        pairs
    }

    fn update_axis(&mut self, items: &[HitboxRef]) {
        if items.len() < 2 {
            return;
        }
        let n = items.len() as f32;
        let (sum, sum_squares) = items.iter().fold((Vec3::zeros(), Vec3::zeros()), |(s, sq), item| {
            let c = item.aabb.center();
            (s + c, sq + c.component_mul(&c))
        });
        let mean = sum / n;
        let variance = sum_squares / n - mean.component_mul(&mean);

        let axis = variance.imax();
        if axis != self.axis {
            log::debug!(
                "Sweep-and-prune axis {} -> {} (variance {:.3?})",
                AXIS_NAMES[self.axis],
                AXIS_NAMES[axis],
                variance
            );
            self.axis = axis;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectId;
    use crate::spatial::Aabb;
    use slotmap::SlotMap;

    fn refs(centers: &[Vec3]) -> Vec<HitboxRef> {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        centers
            .iter()
            .map(|&c| HitboxRef::new(ids.insert(()), 0, Aabb::from_center_half_extents(c, Vec3::new(0.5, 0.5, 0.5))))
            .collect()
    }

    #[test]
    fn test_finds_overlapping_pairs() {
        let items = refs(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.8, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(0.5, 10.0, 0.0),
        ]);
        let mut sap = SweepAndPrune::new();
        let pairs = sap.find_pairs(&items);
        // Overlap along X only is still a candidate
        assert_eq!(pairs.len(), 3);
        assert!(!pairs.iter().any(|(a, b)| a.object == items[2].object || b.object == items[2].object));
    }

    #[test]
    fn test_axis_follows_variance() {
        let spread_along_z: Vec<Vec3> = (0..10).map(|i| Vec3::new(0.0, 0.0, i as f32 * 3.0)).collect();
        let items = refs(&spread_along_z);
        let mut sap = SweepAndPrune::new();
        assert_eq!(sap.axis(), 0);
        // Everything overlaps on X this tick
        assert_eq!(sap.find_pairs(&items).len(), 45);
        assert_eq!(sap.axis(), 2);
        // Sorted along Z nothing overlaps
        assert!(sap.find_pairs(&items).is_empty());
    }

    #[test]
    fn test_same_object_hitboxes_are_not_paired() {
        let mut items = refs(&[Vec3::zeros()]);
        let mut second = items[0];
        second.hitbox = 1;
        items.push(second);
        assert!(SweepAndPrune::new().find_pairs(&items).is_empty());
    }
}
