//! Collision pipeline
//!
//! The collision detection system is split into two phases. The broad
//! phase (sweep-and-prune or a freshly built octree) runs to completion
//! and yields the full candidate list; only then does the SAT narrow phase
//! test each surviving object pair. Pairs are tracked across ticks so
//! gameplay can react to contacts starting and ending.

use std::collections::HashSet;

use slotmap::SlotMap;

use super::intersection::{test_intersection, Intersection};
use super::BroadPhaseKind;
use crate::core::CollisionConfig;
use crate::foundation::math::Vec3;
use crate::scene::{GameObject, ObjectId};
use crate::spatial::{HitboxRef, Octree, OctreeConfig, SweepAndPrune};

/// Unordered object pair, stored with the smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPair {
    /// Smaller id
    pub first: ObjectId,
    /// Larger id
    pub second: ObjectId,
}

impl ObjectPair {
    /// Create a pair; argument order does not matter
    pub fn new(a: ObjectId, b: ObjectId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Returns `true` if `object` is one of the two
    pub fn contains(&self, object: ObjectId) -> bool {
        self.first == object || self.second == object
    }
}

/// Output of one detection pass
#[derive(Debug, Clone, Default)]
pub struct CollisionEvents {
    /// One entry per intersecting pair and direction (each object as caller)
    pub intersections: Vec<Intersection>,
    /// Pairs touching this tick that were apart last tick
    pub started: Vec<ObjectPair>,
    /// Pairs that were touching last tick and are apart now
    pub ended: Vec<ObjectPair>,
    /// Object pairs handed to the narrow phase after filtering
    pub candidate_pairs: usize,
}

impl CollisionEvents {
    /// Intersections where `object` is the caller
    pub fn for_caller(&self, object: ObjectId) -> impl Iterator<Item = &Intersection> + '_ {
        self.intersections.iter().filter(move |i| i.caller == object)
    }
}

/// Broad phase + narrow phase over a set of scene objects
#[derive(Debug, Clone)]
pub struct CollisionSystem {
    broad_phase: BroadPhaseKind,
    sweep_and_prune: SweepAndPrune,
    octree_config: OctreeConfig,
    world_half_extent: f32,
    octree: Option<Octree>,
    current_pairs: HashSet<ObjectPair>,
    previous_pairs: HashSet<ObjectPair>,
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new(&CollisionConfig::default())
    }
}

impl CollisionSystem {
    /// Create a collision system from its configuration section
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            broad_phase: config.broad_phase,
            sweep_and_prune: SweepAndPrune::new(),
            octree_config: config.octree.clone(),
            world_half_extent: config.world_half_extent,
            octree: None,
            current_pairs: HashSet::new(),
            previous_pairs: HashSet::new(),
        }
    }

    /// Active broad-phase strategy
    pub fn broad_phase(&self) -> BroadPhaseKind {
        self.broad_phase
    }

    /// Switch broad-phase strategy
    pub fn set_broad_phase(&mut self, kind: BroadPhaseKind) {
        if kind != self.broad_phase {
            log::debug!("Broad phase switched from {:?} to {:?}", self.broad_phase, kind);
            self.broad_phase = kind;
        }
    }

    /// Octree from the last [`build_octree`](Self::build_octree) call
    ///
    /// It indexes current-state hitboxes as they were during that pass;
    /// contact resolution may have moved objects since.
    pub fn octree(&self) -> Option<&Octree> {
        self.octree.as_ref()
    }

    /// Pairs that were intersecting after the last detection pass
    pub fn current_pairs(&self) -> &HashSet<ObjectPair> {
        &self.current_pairs
    }

    /// Rebuild the octree from every collidable hitbox
    pub fn build_octree(&mut self, objects: &SlotMap<ObjectId, GameObject>) -> &Octree {
        let half = Vec3::repeat(self.world_half_extent);
        let octree = Octree::build(Vec3::zeros(), half, self.octree_config.clone(), collect_hitbox_refs(objects));
        self.octree.insert(octree)
    }

    /// Octree over the render-state hitbox bounds, for ray queries
    ///
    /// Uses the same node settings and world extent as the collision octree
    /// but is not stored here.
    pub fn build_ray_index(&self, objects: &SlotMap<ObjectId, GameObject>) -> Octree {
        let refs: Vec<HitboxRef> = objects
            .iter()
            .flat_map(|(id, object)| {
                object
                    .render_hitbox_bounds()
                    .enumerate()
                    .map(move |(index, aabb)| HitboxRef::new(id, index, aabb))
            })
            .collect();
        Octree::build(Vec3::zeros(), Vec3::repeat(self.world_half_extent), self.octree_config.clone(), refs)
    }

    /// Run the broad phase then the narrow phase
    ///
    /// The returned intersections describe contacts only; nothing is moved.
    pub fn detect(&mut self, objects: &SlotMap<ObjectId, GameObject>) -> CollisionEvents {
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        let candidates = self.broad_phase_pairs(objects);
        let intersections = self.narrow_phase(objects, &candidates);

        let mut started: Vec<ObjectPair> = self.current_pairs.difference(&self.previous_pairs).copied().collect();
        let mut ended: Vec<ObjectPair> = self.previous_pairs.difference(&self.current_pairs).copied().collect();
        started.sort_unstable();
        ended.sort_unstable();

        log::trace!(
            "Collision pass: {} candidates, {} intersections, {} started, {} ended",
            candidates.len(),
            intersections.len(),
            started.len(),
            ended.len()
        );

        CollisionEvents {
            intersections,
            started,
            ended,
            candidate_pairs: candidates.len(),
        }
    }

    /// Forget contact history, e.g. after a level reload
    pub fn clear(&mut self) {
        self.current_pairs.clear();
        self.previous_pairs.clear();
        self.octree = None;
    }

    /// Full candidate list: deduplicated, ordered, layer-filtered object pairs
    fn broad_phase_pairs(&mut self, objects: &SlotMap<ObjectId, GameObject>) -> Vec<ObjectPair> {
        let hitbox_pairs = match self.broad_phase {
            BroadPhaseKind::SweepAndPrune => {
                let refs = collect_hitbox_refs(objects);
                self.sweep_and_prune.find_pairs(&refs)
            }
            BroadPhaseKind::Octree => self.build_octree(objects).candidate_pairs(),
        };

        let mut pairs: Vec<ObjectPair> = hitbox_pairs
            .iter()
            .filter(|(a, b)| a.object != b.object)
            .map(|(a, b)| ObjectPair::new(a.object, b.object))
            .collect::<HashSet<_>>()
            .into_iter()
            .filter(|pair| match (objects.get(pair.first), objects.get(pair.second)) {
                (Some(a), Some(b)) => a.filter().should_collide(b.filter()),
                _ => false,
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }

    fn narrow_phase(&mut self, objects: &SlotMap<ObjectId, GameObject>, candidates: &[ObjectPair]) -> Vec<Intersection> {
        let mut intersections = Vec::new();
        for pair in candidates {
            let (Some(a), Some(b)) = (objects.get(pair.first), objects.get(pair.second)) else {
                continue;
            };
            let forward = test_intersection(pair.first, a, pair.second, b);
            let backward = test_intersection(pair.second, b, pair.first, a);
            if forward.is_some() || backward.is_some() {
                self.current_pairs.insert(*pair);
            }
            intersections.extend(forward);
            intersections.extend(backward);
        }
        intersections
    }
}

fn collect_hitbox_refs(objects: &SlotMap<ObjectId, GameObject>) -> Vec<HitboxRef> {
    objects
        .iter()
        .filter(|(_, object)| !object.filter().layer.is_empty())
        .flat_map(|(id, object)| {
            object
                .hitboxes()
                .iter()
                .enumerate()
                .map(move |(index, hitbox)| HitboxRef::new(id, index, *hitbox.aabb()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{CollisionFilter, CollisionLayers, HitboxTemplate};
    use crate::state::EntityState;
    use approx::assert_relative_eq;

    fn cube(objects: &mut SlotMap<ObjectId, GameObject>, name: &str, position: Vec3) -> ObjectId {
        objects.insert(
            GameObject::new(name, EntityState::from_position(position))
                .with_hitbox(HitboxTemplate::cuboid(Vec3::new(1.0, 1.0, 1.0))),
        )
    }

    fn systems() -> [CollisionSystem; 2] {
        let mut octree = CollisionConfig::default();
        octree.broad_phase = BroadPhaseKind::Octree;
        [CollisionSystem::default(), CollisionSystem::new(&octree)]
    }

    #[test]
    fn test_both_broad_phases_find_the_same_contacts() {
        for mut system in systems() {
            let mut objects = SlotMap::with_key();
            let a = cube(&mut objects, "a", Vec3::new(0.0, 0.0, 0.0));
            let b = cube(&mut objects, "b", Vec3::new(1.5, 0.0, 0.0));
            cube(&mut objects, "far", Vec3::new(20.0, 0.0, 0.0));

            let events = system.detect(&objects);
            assert_eq!(events.candidate_pairs, 1);
            assert_eq!(events.intersections.len(), 2);
            assert_eq!(events.started, vec![ObjectPair::new(a, b)]);

            let from_a: Vec<_> = events.for_caller(a).collect();
            assert_eq!(from_a.len(), 1);
            assert_eq!(from_a[0].collider, b);
            assert_relative_eq!(from_a[0].minimum_translation_vector, Vec3::new(-0.5, 0.0, 0.0), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_started_and_ended_tracking() {
        let mut system = CollisionSystem::default();
        let mut objects = SlotMap::with_key();
        let a = cube(&mut objects, "a", Vec3::zeros());
        let b = cube(&mut objects, "b", Vec3::new(1.5, 0.0, 0.0));

        let first = system.detect(&objects);
        assert_eq!(first.started.len(), 1);

        let second = system.detect(&objects);
        assert!(second.started.is_empty());
        assert!(second.ended.is_empty());
        assert!(system.current_pairs().contains(&ObjectPair::new(b, a)));

        if let Some(object) = objects.get_mut(b) {
            object.set_position(Vec3::new(5.0, 0.0, 0.0));
        }
        let third = system.detect(&objects);
        assert!(third.intersections.is_empty());
        assert_eq!(third.ended, vec![ObjectPair::new(a, b)]);
    }

    #[test]
    fn test_multi_hitbox_contacts_report_one_event_per_pair() {
        for mut system in systems() {
            let mut objects = SlotMap::with_key();
            let body = objects.insert(
                GameObject::new("body", EntityState::identity())
                    .with_hitbox(HitboxTemplate::cuboid_at(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)))
                    .with_hitbox(HitboxTemplate::cuboid_at(Vec3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0))),
            );
            let other = cube(&mut objects, "other", Vec3::new(1.2, 0.0, 0.0));

            let events = system.detect(&objects);
            assert_eq!(events.candidate_pairs, 1);
            assert_eq!(events.started, vec![ObjectPair::new(body, other)]);
            assert_eq!(events.intersections.len(), 2);
            let from_body: Vec<_> = events.for_caller(body).collect();
            assert_eq!(from_body.len(), 1);
            assert_eq!(from_body[0].caller_hitbox, 1);

            assert!(system.detect(&objects).started.is_empty());

            if let Some(object) = objects.get_mut(other) {
                object.set_position(Vec3::new(8.0, 0.0, 0.0));
            }
            let apart = system.detect(&objects);
            assert_eq!(apart.ended, vec![ObjectPair::new(body, other)]);
            assert!(apart.started.is_empty());
        }
    }

    #[test]
    fn test_layer_filter_drops_pairs_before_narrow_phase() {
        let mut system = CollisionSystem::default();
        let mut objects = SlotMap::with_key();
        let a = cube(&mut objects, "player", Vec3::zeros());
        let b = cube(&mut objects, "pickup", Vec3::new(0.5, 0.0, 0.0));
        if let Some(object) = objects.get_mut(a) {
            object.set_filter(CollisionFilter::new(CollisionLayers::PLAYER, CollisionLayers::ENVIRONMENT));
        }
        if let Some(object) = objects.get_mut(b) {
            object.set_filter(CollisionFilter::new(CollisionLayers::PICKUP, CollisionLayers::all()));
        }

        let events = system.detect(&objects);
        assert_eq!(events.candidate_pairs, 0);
        assert!(events.intersections.is_empty());
    }

    #[test]
    fn test_octree_is_kept_for_queries() {
        let mut system = CollisionSystem::default();
        assert!(system.octree().is_none());
        let mut objects = SlotMap::with_key();
        cube(&mut objects, "a", Vec3::zeros());
        let disabled = cube(&mut objects, "ghost", Vec3::zeros());
        if let Some(object) = objects.get_mut(disabled) {
            object.set_filter(CollisionFilter::disabled());
        }

        assert_eq!(system.build_octree(&objects).len(), 1);
        assert!(system.octree().is_some());
        system.clear();
        assert!(system.octree().is_none());
    }
}
