//! Octree spatial partitioning structure
//!
//! Nodes live in a `slotmap` arena addressed by [`NodeId`]. A node has a
//! fixed centre and half-size, a list of hitbox references and, once it
//! overflows, eight half-size children. An item is stored at the deepest
//! node whose region fully encloses it; items that straddle child
//! boundaries stay at the parent.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SecondaryMap, SlotMap};

use super::{Aabb, HitboxRef};
use crate::foundation::math::Vec3;
use crate::physics::ray::ray_box_intersection;
use crate::scene::ObjectId;

new_key_type! {
    /// Handle of an octree node
    pub struct NodeId;
}

/// Configuration for octree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Item count at which a node subdivides
    pub max_items_per_node: usize,

    /// Nodes whose half-size vector is shorter than this never subdivide
    pub min_node_scale: f32,

    /// Maximum subdivision depth
    pub max_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_items_per_node: 4,
            min_node_scale: 1.0,
            max_depth: 16,
        }
    }
}

#[derive(Debug, Clone)]
struct OctreeNode {
    center: Vec3,
    scale: Vec3,
    depth: u32,
    items: Vec<HitboxRef>,
    children: Option<[NodeId; 8]>,
}

impl OctreeNode {
    fn region(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, self.scale)
    }
}

/// Arena-backed octree
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: SlotMap<NodeId, OctreeNode>,
    root: NodeId,
    config: OctreeConfig,
    debug_colors: SecondaryMap<NodeId, [f32; 4]>,
    item_count: usize,
}

impl Octree {
    /// Empty tree covering `center ± half_size`
    pub fn new(center: Vec3, half_size: Vec3, config: OctreeConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(OctreeNode {
            center,
            scale: half_size.abs(),
            depth: 0,
            items: Vec::new(),
            children: None,
        });
        let mut debug_colors = SecondaryMap::new();
        debug_colors.insert(root, debug_color(0));
        Self { nodes, root, config, debug_colors, item_count: 0 }
    }

    /// Build a tree from scratch
    pub fn build<I>(center: Vec3, half_size: Vec3, config: OctreeConfig, items: I) -> Self
    where
        I: IntoIterator<Item = HitboxRef>,
    {
        let mut octree = Self::new(center, half_size, config);
        for item in items {
            octree.insert(item);
        }
        log::trace!(
            "Octree rebuilt: {} items in {} nodes",
            octree.item_count,
            octree.nodes.len()
        );
        octree
    }

    /// Root node handle
    pub fn root(&self) -> NodeId { self.root }
    /// Number of stored items
    pub fn len(&self) -> usize { self.item_count }
    /// True when no items are stored
    pub fn is_empty(&self) -> bool { self.item_count == 0 }
    /// Number of nodes, including empty ones
    pub fn node_count(&self) -> usize { self.nodes.len() }
    /// Active configuration
    pub fn config(&self) -> &OctreeConfig { &self.config }

    /// Region covered by `node`
    pub fn node_bounds(&self, node: NodeId) -> Option<Aabb> {
        self.nodes.get(node).map(OctreeNode::region)
    }

    /// Items stored directly at `node`
    pub fn items_at(&self, node: NodeId) -> &[HitboxRef] {
        self.nodes.get(node).map(|n| n.items.as_slice()).unwrap_or_default()
    }

    /// Children of `node`, if it has been subdivided
    pub fn children(&self, node: NodeId) -> Option<[NodeId; 8]> {
        self.nodes.get(node).and_then(|n| n.children)
    }

    /// Depth of `node` (root is 0)
    pub fn depth(&self, node: NodeId) -> Option<u32> {
        self.nodes.get(node).map(|n| n.depth)
    }

    /// Per-node debug colors for visualisation
    pub fn debug_colors(&self) -> &SecondaryMap<NodeId, [f32; 4]> {
        &self.debug_colors
    }

    /// Iterate over every node handle
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    /// Insert an item at the deepest node that fully encloses it
    ///
    /// Items the root cannot enclose are kept at the root.
    pub fn insert(&mut self, item: HitboxRef) {
        self.insert_from(self.root, item);
        self.item_count += 1;
    }

    fn insert_from(&mut self, start: NodeId, item: HitboxRef) {
        let mut node = start;
        loop {
            if let Some(child) = self.child_containing(node, &item.aabb) {
                node = child;
                continue;
            }
            if self.should_subdivide(node) {
                self.subdivide(node);
                if let Some(child) = self.child_containing(node, &item.aabb) {
                    node = child;
                    continue;
                }
            }
            if let Some(target) = self.nodes.get_mut(node) {
                target.items.push(item);
            }
            return;
        }
    }

    fn child_containing(&self, node: NodeId, aabb: &Aabb) -> Option<NodeId> {
        let children = self.nodes.get(node)?.children?;
        children
            .into_iter()
            .find(|&child| self.nodes.get(child).is_some_and(|c| c.region().contains_aabb(aabb)))
    }

    fn should_subdivide(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| {
            n.children.is_none()
                && n.items.len() >= self.config.max_items_per_node
                && n.scale.magnitude() >= self.config.min_node_scale
                && n.depth < self.config.max_depth
        })
    }

    fn subdivide(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node) else {
            return;
        };
        let (center, scale, depth) = (parent.center, parent.scale * 0.5, parent.depth + 1);

        let mut children = [NodeId::default(); 8];
        for (octant, slot) in children.iter_mut().enumerate() {
            let offset = Vec3::new(
                if octant & 1 == 0 { -scale.x } else { scale.x },
                if octant & 2 == 0 { -scale.y } else { scale.y },
                if octant & 4 == 0 { -scale.z } else { scale.z },
            );
            let child = self.nodes.insert(OctreeNode {
                center: center + offset,
                scale,
                depth,
                items: Vec::new(),
                children: None,
            });
            let index = self.nodes.len() - 1;
            self.debug_colors.insert(child, debug_color(index));
            *slot = child;
        }

        let items = match self.nodes.get_mut(node) {
            Some(parent) => {
                parent.children = Some(children);
                std::mem::take(&mut parent.items)
            }
            None => return,
        };
        log::trace!("Octree node at depth {} subdivided with {} items", depth - 1, items.len());

        for item in items {
            match self.child_containing(node, &item.aabb) {
                Some(child) => self.insert_from(child, item),
                None => {
                    if let Some(parent) = self.nodes.get_mut(node) {
                        parent.items.push(item);
                    }
                }
            }
        }
    }

    /// Node holding the given hitbox, if it was inserted
    pub fn node_of(&self, object: ObjectId, hitbox: usize) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.items.iter().any(|i| i.object == object && i.hitbox == hitbox))
            .map(|(id, _)| id)
    }

    /// Items whose bounds intersect `query`
    pub fn query_aabb(&self, query: &Aabb) -> Vec<HitboxRef> {
        let mut results = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else { continue };
            // The root may hold items outside its region
            if id != self.root && !node.region().intersects(query) {
                continue;
            }
            results.extend(node.items.iter().filter(|item| item.aabb.intersects(query)));
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }
        results
    }

    /// Items whose bounds are hit by the ray, nearest entry first
    pub fn query_ray(&self, origin: &Vec3, direction: &Vec3) -> Vec<HitboxRef> {
        let mut hits: Vec<(f32, HitboxRef)> = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else { continue };
            if id != self.root && ray_box_intersection(origin, direction, &node.region()).is_none() {
                continue;
            }
            for item in &node.items {
                if let Some(t) = ray_box_intersection(origin, direction, &item.aabb) {
                    hits.push((t, *item));
                }
            }
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, item)| item).collect()
    }

    /// Pairs of items from different objects whose bounds overlap
    ///
    /// Items are only compared with items at the same node or below it,
    /// since a node's region encloses everything in its subtree.
    pub fn candidate_pairs(&self) -> Vec<(HitboxRef, HitboxRef)> {
        let mut pairs = Vec::new();
        for node in self.nodes.values() {
            let below = node
                .children
                .map(|children| self.collect_subtree(&children))
                .unwrap_or_default();
            for (i, a) in node.items.iter().enumerate() {
                for b in node.items[i + 1..].iter().chain(below.iter()) {
                    if a.object != b.object && a.aabb.intersects(&b.aabb) {
                        pairs.push((*a, *b));
                    }
                }
            }
        }
        pairs
    }

    fn collect_subtree(&self, roots: &[NodeId]) -> Vec<HitboxRef> {
        let mut items = Vec::new();
        let mut stack = roots.to_vec();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                items.extend_from_slice(&node.items);
                if let Some(children) = node.children {
                    stack.extend(children);
                }
            }
        }
        items
    }
}

/// Deterministic palette cycling through hues by node creation order
fn debug_color(index: usize) -> [f32; 4] {
    const PALETTE: [[f32; 4]; 8] = [
        [1.0, 0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0, 1.0],
        [0.0, 0.0, 1.0, 1.0],
        [1.0, 1.0, 0.0, 1.0],
        [1.0, 0.0, 1.0, 1.0],
        [0.0, 1.0, 1.0, 1.0],
        [1.0, 0.5, 0.0, 1.0],
        [1.0, 1.0, 1.0, 1.0],
    ];
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(count: usize) -> Vec<ObjectId> {
        let mut map: SlotMap<ObjectId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    fn small_box(id: ObjectId, center: Vec3) -> HitboxRef {
        HitboxRef::new(id, 0, Aabb::from_center_half_extents(center, Vec3::new(0.25, 0.25, 0.25)))
    }

    fn scattered_tree() -> (Octree, Vec<ObjectId>) {
        let objects = ids(40);
        let items = objects.iter().enumerate().map(|(i, &id)| {
            let f = i as f32;
            small_box(id, Vec3::new((f * 7.3) % 30.0 - 15.0, (f * 3.1) % 30.0 - 15.0, (f * 5.7) % 30.0 - 15.0))
        });
        let tree = Octree::build(Vec3::zeros(), Vec3::new(16.0, 16.0, 16.0), OctreeConfig::default(), items);
        (tree, objects)
    }

    #[test]
    fn test_containment_invariant() {
        let (tree, _) = scattered_tree();
        assert_eq!(tree.len(), 40);
        assert!(tree.node_count() > 1);
        for id in tree.node_ids() {
            let Some(children) = tree.children(id) else { continue };
            for item in tree.items_at(id) {
                for child in children {
                    let region = tree.node_bounds(child).unwrap();
                    assert!(!region.contains_aabb(&item.aabb));
                }
            }
        }
    }

    #[test]
    fn test_subdivides_after_four_items() {
        let objects = ids(5);
        let mut tree = Octree::new(Vec3::zeros(), Vec3::new(8.0, 8.0, 8.0), OctreeConfig::default());
        for (i, &id) in objects.iter().take(4).enumerate() {
            tree.insert(small_box(id, Vec3::new(2.0 + i as f32, 2.0, 2.0)));
        }
        assert_eq!(tree.node_count(), 1);
        tree.insert(small_box(objects[4], Vec3::new(-4.0, -4.0, -4.0)));
        assert_eq!(tree.node_count(), 9);
        // Everything fitted a child, so the root is empty
        assert!(tree.items_at(tree.root()).is_empty());
        let node = tree.node_of(objects[4], 0).unwrap();
        assert_eq!(tree.depth(node), Some(1));
        assert!(tree.debug_colors().contains_key(node));
    }

    #[test]
    fn test_straddling_item_stays_at_parent() {
        let objects = ids(6);
        let mut tree = Octree::new(Vec3::zeros(), Vec3::new(8.0, 8.0, 8.0), OctreeConfig::default());
        for (i, &id) in objects.iter().take(5).enumerate() {
            tree.insert(small_box(id, Vec3::new(2.0 + i as f32 * 0.5, 2.0, 2.0)));
        }
        let straddler = HitboxRef::new(objects[5], 0, Aabb::from_center_half_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)));
        tree.insert(straddler);
        assert_eq!(tree.node_of(objects[5], 0), Some(tree.root()));
    }

    #[test]
    fn test_tiny_nodes_do_not_subdivide() {
        let objects = ids(10);
        let mut tree = Octree::new(Vec3::zeros(), Vec3::new(0.4, 0.4, 0.4), OctreeConfig::default());
        for &id in &objects {
            tree.insert(HitboxRef::new(id, 0, Aabb::from_center_half_extents(Vec3::zeros(), Vec3::new(0.01, 0.01, 0.01))));
        }
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.items_at(tree.root()).len(), 10);
    }

    #[test]
    fn test_item_outside_root_is_kept() {
        let objects = ids(1);
        let mut tree = Octree::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), OctreeConfig::default());
        let far = small_box(objects[0], Vec3::new(50.0, 0.0, 0.0));
        tree.insert(far);
        assert_eq!(tree.query_aabb(&far.aabb).len(), 1);
    }

    #[test]
    fn test_queries() {
        let (tree, objects) = scattered_tree();
        let everything = Aabb::from_center_half_extents(Vec3::zeros(), Vec3::new(100.0, 100.0, 100.0));
        assert_eq!(tree.query_aabb(&everything).len(), 40);

        let first = tree.query_aabb(&Aabb::from_center_half_extents(Vec3::new(-15.0, -15.0, -15.0), Vec3::new(0.1, 0.1, 0.1)));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].object, objects[0]);

        let hits = tree.query_ray(&Vec3::new(-15.0, -15.0, -40.0), &Vec3::new(0.0, 0.0, 1.0));
        assert!(hits.iter().any(|h| h.object == objects[0]));
    }

    #[test]
    fn test_candidate_pairs_match_brute_force() {
        let objects = ids(30);
        let items: Vec<HitboxRef> = objects
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let f = i as f32;
                HitboxRef::new(id, 0, Aabb::from_center_half_extents(
                    Vec3::new((f * 1.7) % 6.0 - 3.0, (f * 2.3) % 6.0 - 3.0, (f * 0.9) % 6.0 - 3.0),
                    Vec3::new(0.6, 0.6, 0.6),
                ))
            })
            .collect();
        let tree = Octree::build(Vec3::zeros(), Vec3::new(8.0, 8.0, 8.0), OctreeConfig::default(), items.clone());

        let mut expected = 0;
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                if a.aabb.intersects(&b.aabb) {
                    expected += 1;
                }
            }
        }
        assert_eq!(tree.candidate_pairs().len(), expected);
    }
}
