//! World container: objects, terrains and the collision pipeline

use std::collections::HashSet;

use slotmap::SlotMap;

use super::{FrameContext, GameObject, ObjectId, RenderInstance, TerrainId};
use crate::core::CollisionConfig;
use crate::culling::ScreenSpaceStatus;
use crate::foundation::math::Vec2;
use crate::physics::{
    test_terrain_intersection, CollisionEvents, CollisionSystem, Ray, RayHit, TerrainCollider,
    TerrainIntersection,
};
use crate::spatial::Octree;

/// Owns every scene object and terrain collider
#[derive(Debug, Clone, Default)]
pub struct World {
    objects: SlotMap<ObjectId, GameObject>,
    terrains: SlotMap<TerrainId, TerrainCollider>,
    collision: CollisionSystem,
    ray_index: Option<Octree>,
}

impl World {
    /// Create an empty world
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            objects: SlotMap::with_key(),
            terrains: SlotMap::with_key(),
            collision: CollisionSystem::new(config),
            ray_index: None,
        }
    }

    /// Add an object
    pub fn spawn(&mut self, object: GameObject) -> ObjectId {
        log::debug!("Spawning '{}' with {} hitbox(es)", object.name(), object.hitboxes().len());
        self.ray_index = None;
        self.objects.insert(object)
    }

    /// Remove an object, returning it
    pub fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        self.ray_index = None;
        let removed = self.objects.remove(id);
        if removed.is_none() {
            log::warn!("Tried to remove unknown object {id:?}");
        }
        removed
    }

    /// Object by id
    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Mutable object by id; drops the ray-query index
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.ray_index = None;
        self.objects.get_mut(id)
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the world holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> {
        self.objects.iter()
    }

    /// All objects, mutably; drops the ray-query index
    pub fn objects_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut GameObject)> {
        self.ray_index = None;
        self.objects.iter_mut()
    }

    /// Add a terrain collider
    pub fn add_terrain(&mut self, terrain: TerrainCollider) -> TerrainId {
        let (sx, sz) = terrain.sector_grid();
        log::debug!(
            "Adding terrain '{}' ({} triangles, {}x{} sectors)",
            terrain.name(),
            terrain.triangles().len(),
            sx,
            sz
        );
        self.terrains.insert(terrain)
    }

    /// Remove a terrain collider
    pub fn remove_terrain(&mut self, id: TerrainId) -> Option<TerrainCollider> {
        self.terrains.remove(id)
    }

    /// Terrain by id
    pub fn terrain(&self, id: TerrainId) -> Option<&TerrainCollider> {
        self.terrains.get(id)
    }

    /// Collision pipeline
    pub fn collision_system(&self) -> &CollisionSystem {
        &self.collision
    }

    /// Collision pipeline, mutably (broad-phase switching)
    pub fn collision_system_mut(&mut self) -> &mut CollisionSystem {
        &mut self.collision
    }

    /// Start a simulation tick: `previous := current` for every object
    pub fn begin_tick(&mut self) {
        for object in self.objects.values_mut() {
            object.snapshot();
        }
    }

    /// Broad phase then narrow phase over every object
    pub fn detect_collisions(&mut self) -> CollisionEvents {
        self.collision.detect(&self.objects)
    }

    /// Vertical contacts of every collidable object against every terrain
    pub fn terrain_intersections(&self) -> Vec<TerrainIntersection> {
        let mut intersections = Vec::new();
        for (terrain_id, terrain) in &self.terrains {
            for (object_id, object) in &self.objects {
                if object.filter().layer.is_empty() {
                    continue;
                }
                intersections.extend(test_terrain_intersection(object_id, object, terrain_id, terrain));
            }
        }
        intersections
    }

    /// Rebuild the ray-query index from the render-state hitbox bounds
    ///
    /// The frame driver calls this after blending. Any mutable access to
    /// the objects afterwards drops the index until the next rebuild.
    pub fn rebuild_octree(&mut self) -> &Octree {
        let index = self.collision.build_ray_index(&self.objects);
        self.ray_index.insert(index)
    }

    /// Ray-query index, `None` if objects changed since the last rebuild
    pub fn octree(&self) -> Option<&Octree> {
        self.ray_index.as_ref()
    }

    /// Interpolate every object's render state
    pub fn blend(&mut self, alpha: f32) {
        self.ray_index = None;
        for object in self.objects.values_mut() {
            object.blend(alpha);
        }
    }

    /// Evaluate both visibility tiers for every object
    ///
    /// A sphere around the expanded bounds is tested first; objects it
    /// rejects are hidden in both tiers without the corner tests. Returns
    /// the number of objects visible in the exact tier.
    pub fn update_visibility(&mut self, context: &FrameContext) -> usize {
        let expansion = context.render_pass_expansion.max(1.0);
        let mut visible = 0;
        for object in self.objects.values_mut() {
            let sphere = object.bounding_sphere();
            let status = if context.frustum.sphere_vs_frustum(&sphere.center, sphere.radius * expansion) {
                ScreenSpaceStatus::evaluate(&*object, context.frustum, expansion)
            } else {
                ScreenSpaceStatus::HIDDEN
            };
            if status.inside_screen_space {
                visible += 1;
            }
            object.set_screen_space(status);
        }
        visible
    }

    /// Closest object hit by `ray` at the current state, tested against every object
    pub fn raycast(&self, ray: &Ray) -> Option<(ObjectId, RayHit)> {
        self.raycast_with(ray, None, GameObject::intersect_ray)
    }

    /// Closest terrain hit by `ray`
    pub fn raycast_terrain(&self, ray: &Ray) -> Option<(TerrainId, RayHit)> {
        self.terrains
            .iter()
            .filter_map(|(id, terrain)| terrain.raycast(ray).map(|hit| (id, hit)))
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
    }

    /// Object under the cursor as drawn: render camera against render state
    ///
    /// When the context carries an octree only objects whose indexed bounds
    /// the ray enters are tested. The index must come from
    /// [`octree`](Self::octree) so it matches the render state.
    pub fn pick(&self, context: &FrameContext, cursor_ndc: &Vec2) -> Option<(ObjectId, RayHit)> {
        let ray = context.camera.mouse_ray(cursor_ndc);
        self.raycast_with(&ray, context.octree, GameObject::intersect_render_ray)
    }

    /// Renderer records for objects visible in either tier
    pub fn render_instances(&self) -> Vec<RenderInstance> {
        self.objects
            .values()
            .filter(|object| object.screen_space().any())
            .map(RenderInstance::from_object)
            .collect()
    }

    fn raycast_with(
        &self,
        ray: &Ray,
        octree: Option<&Octree>,
        intersect: fn(&GameObject, &Ray) -> Option<RayHit>,
    ) -> Option<(ObjectId, RayHit)> {
        let test = |id: ObjectId| -> Option<(ObjectId, RayHit)> {
            self.objects
                .get(id)
                .and_then(|object| intersect(object, ray))
                .map(|hit| (id, hit))
        };

        let hits: Vec<(ObjectId, RayHit)> = match octree {
            Some(octree) => {
                let mut seen = HashSet::new();
                octree
                    .query_ray(&ray.origin, &ray.direction)
                    .into_iter()
                    .filter(|item| seen.insert(item.object))
                    .filter_map(|item| test(item.object))
                    .collect()
            }
            None => self.objects.keys().filter_map(test).collect(),
        };

        hits.into_iter().min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
    }
}
