//! Two-tier visibility status for anything with bounds

use super::Frustum;
use crate::foundation::math::Vec3;
use crate::spatial::Aabb;

/// Capability of being frustum-tested
///
/// Implemented by every visible entity kind so that visibility updates are
/// a single call instead of a per-type dispatch.
pub trait HasBounds {
    /// World-space centre of the bounds
    fn bounds_center(&self) -> Vec3;

    /// World-space half extents of the bounds
    fn bounds_half_extents(&self) -> Vec3;

    /// Bounds as an [`Aabb`]
    fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.bounds_center(), self.bounds_half_extents())
    }
}

impl HasBounds for Aabb {
    fn bounds_center(&self) -> Vec3 {
        self.center()
    }

    fn bounds_half_extents(&self) -> Vec3 {
        self.half_extents()
    }
}

/// Visibility flags handed to the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenSpaceStatus {
    /// Exact bounds intersect the frustum
    pub inside_screen_space: bool,
    /// Bounds scaled by the render-pass factor intersect the frustum
    pub inside_screen_space_for_render_pass: bool,
}

impl ScreenSpaceStatus {
    /// Not visible in either tier
    pub const HIDDEN: Self = Self {
        inside_screen_space: false,
        inside_screen_space_for_render_pass: false,
    };

    /// Evaluate both tiers for `item` against `frustum`
    ///
    /// `render_pass_expansion` scales the half extents for the second tier.
    /// Factors below one are raised to one so the second tier is never
    /// tighter than the first.
    pub fn evaluate<B: HasBounds + ?Sized>(item: &B, frustum: &Frustum, render_pass_expansion: f32) -> Self {
        let center = item.bounds_center();
        let half = item.bounds_half_extents();
        let expanded = half * render_pass_expansion.max(1.0);

        Self {
            inside_screen_space: frustum.volume_vs_frustum(&center, half.x, half.y, half.z),
            inside_screen_space_for_render_pass: frustum
                .volume_vs_frustum(&center, expanded.x, expanded.y, expanded.z),
        }
    }

    /// Visible in either tier
    pub fn any(&self) -> bool {
        self.inside_screen_space || self.inside_screen_space_for_render_pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4, Mat4Ext};

    fn frustum() -> Frustum {
        let projection = Mat4::perspective(90f32.to_radians(), 1.0, 0.1, 100.0);
        let view = Mat4::look_at(&Vec3::zeros(), &Vec3::new(0.0, 0.0, -1.0), &Vec3::y());
        Frustum::from_matrices(&projection, &view)
    }

    #[test]
    fn test_both_tiers_visible() {
        let bounds = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::new(1.0, 1.0, 1.0));
        let status = ScreenSpaceStatus::evaluate(&bounds, &frustum(), 1.25);
        assert!(status.inside_screen_space);
        assert!(status.inside_screen_space_for_render_pass);
    }

    #[test]
    fn test_only_expanded_tier_visible() {
        // Right plane at z = -10 is x = 10; box spans x in [10.3, 12.3]
        let bounds = Aabb::from_center_half_extents(Vec3::new(11.3, 0.0, -10.0), Vec3::new(1.0, 0.1, 0.1));
        let status = ScreenSpaceStatus::evaluate(&bounds, &frustum(), 1.25);
        assert!(!status.inside_screen_space);
        assert!(status.inside_screen_space_for_render_pass);
        assert!(status.any());
    }

    #[test]
    fn test_hidden() {
        let bounds = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 10.0), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(ScreenSpaceStatus::evaluate(&bounds, &frustum(), 1.25), ScreenSpaceStatus::HIDDEN);
    }
}
