//! A simulated, collidable, renderable object

use crate::culling::{HasBounds, ScreenSpaceStatus};
use crate::foundation::math::{transform_direction, transform_point, Mat4, Vec3};
use crate::physics::ray::intersection_point_on_object_for_ray;
use crate::physics::{BoundingSphere, CollisionFilter, Hitbox, HitboxTemplate, Ray, RayHit};
use crate::spatial::Aabb;
use crate::state::{EntityState, StateSlots};

/// Model-space bounds used for objects without hitboxes
const DEFAULT_LOCAL_BOUNDS: Vec3 = Vec3::new(0.5, 0.5, 0.5);

/// Scene object with dual-state transform, hitboxes and visibility flags
///
/// The current state can only be changed through
/// [`modify_current`](Self::modify_current) and the helpers built on it,
/// so the world-space hitboxes always match it.
#[derive(Debug, Clone)]
pub struct GameObject {
    name: String,
    slots: StateSlots,
    hitboxes: Vec<Hitbox>,
    filter: CollisionFilter,
    local_bounds: Aabb,
    screen_space: ScreenSpaceStatus,
}

impl GameObject {
    /// Create an object with every state slot set to `state`
    pub fn new(name: impl Into<String>, state: EntityState) -> Self {
        Self {
            name: name.into(),
            slots: StateSlots::new(state),
            hitboxes: Vec::new(),
            filter: CollisionFilter::default(),
            local_bounds: Aabb::from_center_half_extents(Vec3::zeros(), DEFAULT_LOCAL_BOUNDS),
            screen_space: ScreenSpaceStatus::default(),
        }
    }

    /// Builder pattern: add a hitbox
    pub fn with_hitbox(mut self, template: HitboxTemplate) -> Self {
        self.add_hitbox(template);
        self
    }

    /// Builder pattern: set the collision filter
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Attach a hitbox placed at the current state
    pub fn add_hitbox(&mut self, template: HitboxTemplate) {
        let template_bounds = *template.bounds();
        self.local_bounds = if self.hitboxes.is_empty() {
            template_bounds
        } else {
            self.local_bounds.merged(&template_bounds)
        };
        let mut hitbox = Hitbox::new(template);
        let current = self.slots.current();
        hitbox.update(current.model_matrix(), current.normal_matrix());
        self.hitboxes.push(hitbox);
    }

    /// Object name
    pub fn name(&self) -> &str { &self.name }
    /// State slots
    pub fn slots(&self) -> &StateSlots { &self.slots }
    /// Authoritative state
    pub fn current(&self) -> &EntityState { self.slots.current() }
    /// Interpolated state
    pub fn render(&self) -> &EntityState { self.slots.render() }
    /// World-space hitboxes (current state)
    pub fn hitboxes(&self) -> &[Hitbox] { &self.hitboxes }
    /// Collision layer and mask
    pub fn filter(&self) -> &CollisionFilter { &self.filter }
    /// Change the collision layer and mask
    pub fn set_filter(&mut self, filter: CollisionFilter) { self.filter = filter; }
    /// Visibility from the last update
    pub fn screen_space(&self) -> ScreenSpaceStatus { self.screen_space }
    /// Model-space bounds
    pub fn local_bounds(&self) -> &Aabb { &self.local_bounds }

    /// Mutate the current state and re-derive the hitboxes
    pub fn modify_current(&mut self, f: impl FnOnce(&mut EntityState)) {
        f(self.slots.current_mut());
        self.refresh_hitboxes();
    }

    /// Set the current position
    pub fn set_position(&mut self, position: Vec3) {
        self.modify_current(|state| state.set_position(position));
    }

    /// Move the current position by `offset` (e.g. an MTV)
    pub fn translate(&mut self, offset: &Vec3) {
        self.modify_current(|state| state.translate(offset));
    }

    /// Place the object without interpolation from its old position
    pub fn teleport(&mut self, state: EntityState) {
        self.slots.reset(state);
        self.refresh_hitboxes();
    }

    /// Copy current into previous
    pub fn snapshot(&mut self) {
        self.slots.snapshot();
    }

    /// Interpolate the render state
    pub fn blend(&mut self, alpha: f32) {
        self.slots.blend(alpha);
    }

    /// Store the visibility computed by the culling pass
    pub fn set_screen_space(&mut self, status: ScreenSpaceStatus) {
        self.screen_space = status;
    }

    /// Union of the world-space hitbox bounds, `None` without hitboxes
    pub fn hitbox_bounds(&self) -> Option<Aabb> {
        self.hitboxes
            .iter()
            .map(|h| *h.aabb())
            .reduce(|a, b| a.merged(&b))
    }

    /// Sphere around the render-state bounds
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::from_aabb(&self.render_bounds())
    }

    /// World-space bounds of each hitbox at the render state
    pub fn render_hitbox_bounds(&self) -> impl Iterator<Item = Aabb> + '_ {
        let model = self.slots.render().model_matrix();
        self.hitboxes
            .iter()
            .map(move |hitbox| transformed_bounds(model, hitbox.template().bounds()))
    }

    /// Closest front-facing hit on this object's hitbox faces (current state)
    pub fn intersect_ray(&self, ray: &Ray) -> Option<RayHit> {
        intersection_point_on_object_for_ray(ray, self)
    }

    /// Closest front-facing hit on the object as drawn (render state)
    ///
    /// The ray is mapped from render space into current space, tested
    /// against the hitboxes and the hit mapped back. Rays that miss the
    /// render-state bounding sphere are rejected first.
    pub fn intersect_render_ray(&self, ray: &Ray) -> Option<RayHit> {
        if self.hitboxes.is_empty() {
            return None;
        }
        self.bounding_sphere().intersect_ray(ray)?;

        let render = self.slots.render().model_matrix();
        let current = self.slots.current().model_matrix();
        if render == current {
            return self.intersect_ray(ray);
        }

        let to_current = current * render.try_inverse()?;
        let to_render = render * current.try_inverse()?;
        let current_ray = Ray::new(
            transform_point(&to_current, &ray.origin),
            transform_direction(&to_current, &ray.direction),
        );
        let hit = self.intersect_ray(&current_ray)?;

        let point = transform_point(&to_render, &hit.point);
        let normal = to_current
            .fixed_view::<3, 3>(0, 0)
            .transpose()
            * hit.normal;
        Some(RayHit {
            distance: (point - ray.origin).magnitude(),
            point,
            normal: normal.try_normalize(1.0e-12).unwrap_or(hit.normal),
        })
    }

    fn refresh_hitboxes(&mut self) {
        let current = self.slots.current();
        for hitbox in &mut self.hitboxes {
            hitbox.update(current.model_matrix(), current.normal_matrix());
        }
    }

    fn render_bounds(&self) -> Aabb {
        transformed_bounds(self.slots.render().model_matrix(), &self.local_bounds)
    }
}

/// Axis-aligned box around the eight transformed corners of `local`
fn transformed_bounds(model: &Mat4, local: &Aabb) -> Aabb {
    let corners: Vec<Vec3> = (0..8)
        .map(|i| {
            transform_point(
                model,
                &Vec3::new(
                    if i & 1 == 0 { local.min.x } else { local.max.x },
                    if i & 2 == 0 { local.min.y } else { local.max.y },
                    if i & 4 == 0 { local.min.z } else { local.max.z },
                ),
            )
        })
        .collect();
    Aabb::from_points(&corners).unwrap_or(*local)
}

/// Visibility uses the render state, since that is what gets drawn
impl HasBounds for GameObject {
    fn bounds_center(&self) -> Vec3 {
        self.render_bounds().center()
    }

    fn bounds_half_extents(&self) -> Vec3 {
        self.render_bounds().half_extents()
    }

    fn bounds(&self) -> Aabb {
        self.render_bounds()
    }
}
