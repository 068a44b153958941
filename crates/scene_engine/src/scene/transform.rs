//! Hierarchical transforms
//!
//! All transforms live in one [`TransformGraph`] arena and refer to each
//! other by [`TransformId`]. A node stores its local position, pitch/yaw/roll
//! and scale plus its place in the hierarchy; world matrices are derived on
//! demand and cached.
//!
//! # Caching
//!
//! Every mutation stamps the node with a fresh revision from a graph-wide
//! counter. A cached world matrix remembers the node revision and the stamp
//! of the parent world matrix it was built from, and receives a stamp of its
//! own. A read walks the ancestor chain and rebuilds only the links whose
//! inputs changed, so:
//!
//! - mutating a node is O(1) and never touches descendants,
//! - reading a world matrix is O(depth) and recomputes only stale links,
//! - a descendant can never observe a stale ancestor, because a rebuilt
//!   ancestor always carries a stamp its descendants have not seen.
//!
//! Hierarchy edits that would break the tree (self-parenting, cycles,
//! duplicate children) are silently ignored; check
//! [`TransformGraph::index_of_child`] to see whether an edit took effect.

use std::cell::Cell;

use slotmap::SlotMap;

use crate::foundation::math::{
    compose_trs, matrix_rotation, matrix_scale, matrix_translation, pitch_yaw_roll_from_quat,
    quat_from_pitch_yaw_roll, Mat4, Point3, Quat, Vec3,
};

slotmap::new_key_type! {
    /// Stable reference to a node in a [`TransformGraph`]
    pub struct TransformId;
}

/// Local position, rotation and scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    /// Offset from the parent origin
    pub position: Vec3,
    /// Pitch (X), yaw (Y) and roll (Z) in radians
    pub pitch_yaw_roll: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            pitch_yaw_roll: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl LocalTransform {
    /// Identity transform moved to `position`
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Set the scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set the rotation
    pub fn with_pitch_yaw_roll(mut self, pitch_yaw_roll: Vec3) -> Self {
        self.pitch_yaw_roll = pitch_yaw_roll;
        self
    }

    /// Orientation as a quaternion
    pub fn rotation(&self) -> Quat {
        quat_from_pitch_yaw_roll(&self.pitch_yaw_roll)
    }

    /// Local `T * R * S` matrix
    pub fn to_matrix(&self) -> Mat4 {
        compose_trs(&self.position, &self.rotation(), &self.scale)
    }
}

#[derive(Debug, Clone, Copy)]
struct WorldCache {
    matrix: Mat4,
    revision: u64,
    parent_stamp: u64,
    stamp: u64,
}

#[derive(Debug)]
struct TransformNode {
    local: LocalTransform,
    parent: Option<TransformId>,
    children: Vec<TransformId>,
    revision: u64,
    cache: Cell<Option<WorldCache>>,
}

/// Arena of hierarchical transforms with lazily cached world matrices
#[derive(Debug, Default)]
pub struct TransformGraph {
    nodes: SlotMap<TransformId, TransformNode>,
    clock: Cell<u64>,
}

impl TransformGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    fn next_stamp(&self) -> u64 {
        let stamp = self.clock.get() + 1;
        self.clock.set(stamp);
        stamp
    }

    /// Add a root node with the identity transform
    pub fn create(&mut self) -> TransformId {
        self.insert(LocalTransform::default())
    }

    /// Add a root node at `position`
    pub fn create_at(&mut self, position: Vec3) -> TransformId {
        self.insert(LocalTransform::from_position(position))
    }

    /// Add a root node with the given local transform
    pub fn insert(&mut self, local: LocalTransform) -> TransformId {
        let revision = self.next_stamp();
        self.nodes.insert(TransformNode {
            local,
            parent: None,
            children: Vec::new(),
            revision,
            cache: Cell::new(None),
        })
    }

    /// Remove a node, detaching it from its parent; its children become roots
    pub fn remove(&mut self, id: TransformId) -> bool {
        let Some(parent) = self.nodes.get(id).map(|node| node.parent) else {
            return false;
        };
        if let Some(parent) = parent {
            self.remove_child(parent, id);
        }

        let Some(node) = self.nodes.remove(id) else {
            return false;
        };
        for child in node.children {
            let revision = self.next_stamp();
            if let Some(child) = self.nodes.get_mut(child) {
                child.parent = None;
                child.revision = revision;
            }
        }
        true
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: TransformId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---- local state -------------------------------------------------------

    fn edit(&mut self, id: TransformId, f: impl FnOnce(&mut LocalTransform)) {
        let revision = self.next_stamp();
        if let Some(node) = self.nodes.get_mut(id) {
            f(&mut node.local);
            node.revision = revision;
        }
    }

    /// Local transform of a node
    pub fn local(&self, id: TransformId) -> Option<LocalTransform> {
        self.nodes.get(id).map(|node| node.local)
    }

    /// Local position
    pub fn position(&self, id: TransformId) -> Option<Vec3> {
        self.nodes.get(id).map(|node| node.local.position)
    }

    /// Local pitch/yaw/roll
    pub fn pitch_yaw_roll(&self, id: TransformId) -> Option<Vec3> {
        self.nodes.get(id).map(|node| node.local.pitch_yaw_roll)
    }

    /// Local scale
    pub fn scale(&self, id: TransformId) -> Option<Vec3> {
        self.nodes.get(id).map(|node| node.local.scale)
    }

    /// Local `T * R * S` matrix
    pub fn local_matrix(&self, id: TransformId) -> Option<Mat4> {
        self.nodes.get(id).map(|node| node.local.to_matrix())
    }

    /// Replace the local position
    pub fn set_position(&mut self, id: TransformId, position: Vec3) {
        self.edit(id, |local| local.position = position);
    }

    /// Replace the local rotation
    pub fn set_pitch_yaw_roll(&mut self, id: TransformId, pitch_yaw_roll: Vec3) {
        self.edit(id, |local| local.pitch_yaw_roll = pitch_yaw_roll);
    }

    /// Replace the local scale
    pub fn set_scale(&mut self, id: TransformId, scale: Vec3) {
        self.edit(id, |local| local.scale = scale);
    }

    /// Add `offset` to the local position without regard to rotation
    pub fn move_absolute(&mut self, id: TransformId, offset: Vec3) {
        self.edit(id, |local| local.position += offset);
    }

    /// Add `offset`, rotated by the node's own local rotation, to its position
    pub fn move_relative(&mut self, id: TransformId, offset: Vec3) {
        self.edit(id, |local| local.position += local.rotation() * offset);
    }

    /// Add `delta` to the local pitch/yaw/roll
    pub fn rotate(&mut self, id: TransformId, delta: Vec3) {
        self.edit(id, |local| local.pitch_yaw_roll += delta);
    }

    // ---- hierarchy ---------------------------------------------------------

    /// Parent of a node, `None` for roots
    pub fn parent(&self, id: TransformId) -> Option<TransformId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Children of a node in insertion order
    pub fn children(&self, id: TransformId) -> &[TransformId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Number of children
    pub fn child_count(&self, id: TransformId) -> usize {
        self.children(id).len()
    }

    /// Child at `index`
    pub fn child(&self, id: TransformId, index: usize) -> Option<TransformId> {
        self.children(id).get(index).copied()
    }

    /// Position of `child` among `parent`'s children
    pub fn index_of_child(&self, parent: TransformId, child: TransformId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Whether `ancestor` lies on the parent chain of `node`
    pub fn is_ancestor(&self, ancestor: TransformId, node: TransformId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Make `child` the last child of `parent`
    ///
    /// A child that already has another parent is moved. The edit is ignored
    /// when either node is missing, `child` is already a child of `parent`,
    /// `child == parent`, or `child` is an ancestor of `parent`.
    pub fn add_child(&mut self, parent: TransformId, child: TransformId) {
        if !self.contains(parent) || !self.contains(child) {
            return;
        }
        if parent == child || self.is_ancestor(child, parent) {
            log::debug!("Rejected reparent of {child:?} under {parent:?}: would create a cycle");
            return;
        }
        if self.index_of_child(parent, child).is_some() {
            return;
        }

        if let Some(previous) = self.parent(child) {
            self.remove_child(previous, child);
        }

        let revision = self.next_stamp();
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            node.revision = revision;
        }
    }

    /// Detach `child` from `parent`, making it a root; ignored if it is not a child
    pub fn remove_child(&mut self, parent: TransformId, child: TransformId) {
        let Some(index) = self.index_of_child(parent, child) else {
            return;
        };

        let revision = self.next_stamp();
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.remove(index);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
            node.revision = revision;
        }
    }

    // ---- world state -------------------------------------------------------

    fn world_entry(&self, id: TransformId) -> Option<(Mat4, u64)> {
        let node = self.nodes.get(id)?;
        let (parent_matrix, parent_stamp) = match node.parent {
            Some(parent) => self.world_entry(parent)?,
            None => (Mat4::identity(), 0),
        };

        if let Some(cache) = node.cache.get() {
            if cache.revision == node.revision && cache.parent_stamp == parent_stamp {
                return Some((cache.matrix, cache.stamp));
            }
        }

        let matrix = parent_matrix * node.local.to_matrix();
        let stamp = self.next_stamp();
        node.cache.set(Some(WorldCache {
            matrix,
            revision: node.revision,
            parent_stamp,
            stamp,
        }));
        Some((matrix, stamp))
    }

    fn valid_stamp(&self, id: TransformId) -> Option<u64> {
        let node = self.nodes.get(id)?;
        let parent_stamp = match node.parent {
            Some(parent) => self.valid_stamp(parent)?,
            None => 0,
        };
        let cache = node.cache.get()?;
        (cache.revision == node.revision && cache.parent_stamp == parent_stamp).then_some(cache.stamp)
    }

    /// Whether reading the world matrix would recompute anything
    pub fn is_dirty(&self, id: TransformId) -> bool {
        self.contains(id) && self.valid_stamp(id).is_none()
    }

    /// World matrix, `parent_world * local`
    pub fn world_matrix(&self, id: TransformId) -> Option<Mat4> {
        self.world_entry(id).map(|(matrix, _)| matrix)
    }

    /// Inverse-transpose of the world matrix, for transforming normals
    pub fn world_inverse_transpose(&self, id: TransformId) -> Option<Mat4> {
        let world = self.world_matrix(id)?;
        Some(world.try_inverse().unwrap_or_else(Mat4::identity).transpose())
    }

    /// Position in world space
    pub fn world_position(&self, id: TransformId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| matrix_translation(&m))
    }

    /// Orientation in world space
    pub fn world_rotation(&self, id: TransformId) -> Option<Quat> {
        self.world_matrix(id).map(|m| matrix_rotation(&m))
    }

    /// Per-axis scale in world space
    pub fn world_scale(&self, id: TransformId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| matrix_scale(&m))
    }

    /// Place a node at a world-space position and orientation
    ///
    /// Parented nodes get the equivalent pose in their parent's space.
    /// Scale is left alone.
    pub fn set_world_pose(&mut self, id: TransformId, position: Vec3, rotation: Quat) {
        let (local_position, local_rotation) = match self.parent(id) {
            None => (position, rotation),
            Some(parent) => {
                let Some(parent_world) = self.world_matrix(parent) else {
                    return;
                };
                let Some(inverse) = parent_world.try_inverse() else {
                    log::debug!("Cannot place {id:?}: parent world matrix is singular");
                    return;
                };
                let local_position = inverse.transform_point(&Point3::from(position)).coords;
                let local_rotation = matrix_rotation(&parent_world).inverse() * rotation;
                (local_position, local_rotation)
            }
        };

        let pitch_yaw_roll = pitch_yaw_roll_from_quat(&local_rotation);
        self.edit(id, |local| {
            local.position = local_position;
            local.pitch_yaw_roll = pitch_yaw_roll;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_new_node_is_identity_root() {
        let mut graph = TransformGraph::new();
        let id = graph.create();

        assert_eq!(graph.parent(id), None);
        assert_eq!(graph.child_count(id), 0);
        assert_relative_eq!(graph.world_matrix(id).unwrap(), Mat4::identity());
    }

    #[test]
    fn test_parent_rotation_carries_child() {
        let mut graph = TransformGraph::new();
        let root = graph.create();
        let child = graph.create_at(Vec3::new(1.0, 0.0, 0.0));
        graph.add_child(root, child);

        graph.set_pitch_yaw_roll(root, Vec3::new(0.0, HALF_PI, 0.0));

        assert_relative_eq!(
            graph.world_position(child).unwrap(),
            Vec3::new(0.0, 0.0, -1.0),
            epsilon = 1e-6
        );
        // Local state is untouched by the parent's rotation
        assert_eq!(graph.position(child), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_world_is_parent_world_times_local() {
        let mut graph = TransformGraph::new();
        let root = graph.insert(
            LocalTransform::from_position(Vec3::new(0.0, 1.0, 0.0)).with_scale(Vec3::new(3.0, 3.0, 3.0)),
        );
        let child = graph.insert(
            LocalTransform::from_position(Vec3::new(4.0, 0.0, 0.0)).with_scale(Vec3::new(2.0, 2.0, 2.0)),
        );
        graph.add_child(root, child);

        let expected = graph.local_matrix(root).unwrap() * graph.local_matrix(child).unwrap();
        assert_relative_eq!(graph.world_matrix(child).unwrap(), expected, epsilon = 1e-5);
        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::new(12.0, 1.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(graph.world_scale(child).unwrap(), Vec3::new(6.0, 6.0, 6.0), epsilon = 1e-5);
    }

    #[test]
    fn test_ancestor_change_reaches_grandchild_lazily() {
        let mut graph = TransformGraph::new();
        let root = graph.create();
        let middle = graph.create_at(Vec3::new(1.0, 0.0, 0.0));
        let leaf = graph.create_at(Vec3::new(1.0, 0.0, 0.0));
        graph.add_child(root, middle);
        graph.add_child(middle, leaf);

        assert_relative_eq!(graph.world_position(leaf).unwrap(), Vec3::new(2.0, 0.0, 0.0));
        assert!(!graph.is_dirty(leaf));

        graph.move_absolute(root, Vec3::new(0.0, 5.0, 0.0));
        assert!(graph.is_dirty(leaf));
        assert!(graph.is_dirty(middle));

        assert_relative_eq!(graph.world_position(leaf).unwrap(), Vec3::new(2.0, 5.0, 0.0));
        assert!(!graph.is_dirty(leaf));
        assert!(!graph.is_dirty(root));
    }

    #[test]
    fn test_sibling_edit_leaves_other_sibling_cached() {
        let mut graph = TransformGraph::new();
        let root = graph.create();
        let a = graph.create();
        let b = graph.create();
        graph.add_child(root, a);
        graph.add_child(root, b);
        graph.world_matrix(a);
        graph.world_matrix(b);

        graph.set_scale(a, Vec3::new(2.0, 2.0, 2.0));

        assert!(graph.is_dirty(a));
        assert!(!graph.is_dirty(b));
    }

    #[test]
    fn test_add_child_rejects_self_and_cycles() {
        let mut graph = TransformGraph::new();
        let a = graph.create();
        let b = graph.create();
        let c = graph.create();
        graph.add_child(a, b);
        graph.add_child(b, c);

        graph.add_child(a, a);
        graph.add_child(c, a);
        graph.add_child(b, a);

        assert_eq!(graph.parent(a), None);
        assert_eq!(graph.index_of_child(c, a), None);
        assert_eq!(graph.index_of_child(a, a), None);
        assert!(graph.is_ancestor(a, c));
    }

    #[test]
    fn test_add_child_twice_keeps_one_entry() {
        let mut graph = TransformGraph::new();
        let parent = graph.create();
        let child = graph.create();
        graph.add_child(parent, child);
        graph.add_child(parent, child);

        assert_eq!(graph.children(parent), &[child]);
        assert_eq!(graph.index_of_child(parent, child), Some(0));
    }

    #[test]
    fn test_reparent_moves_child_between_parents() {
        let mut graph = TransformGraph::new();
        let first = graph.create();
        let second = graph.create_at(Vec3::new(0.0, 10.0, 0.0));
        let child = graph.create();
        graph.add_child(first, child);
        graph.add_child(second, child);

        assert_eq!(graph.index_of_child(first, child), None);
        assert_eq!(graph.index_of_child(second, child), Some(0));
        assert_eq!(graph.parent(child), Some(second));
        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_remove_child_only_affects_actual_children() {
        let mut graph = TransformGraph::new();
        let parent = graph.create_at(Vec3::new(3.0, 0.0, 0.0));
        let child = graph.create();
        let stranger = graph.create();
        graph.add_child(parent, child);

        graph.remove_child(parent, stranger);
        assert_eq!(graph.child_count(parent), 1);

        graph.remove_child(parent, child);
        assert_eq!(graph.child_count(parent), 0);
        assert_eq!(graph.parent(child), None);
        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::zeros());
    }

    #[test]
    fn test_remove_node_orphans_children() {
        let mut graph = TransformGraph::new();
        let root = graph.create();
        let middle = graph.create_at(Vec3::new(1.0, 0.0, 0.0));
        let leaf = graph.create_at(Vec3::new(0.0, 1.0, 0.0));
        graph.add_child(root, middle);
        graph.add_child(middle, leaf);

        assert!(graph.remove(middle));

        assert!(!graph.contains(middle));
        assert_eq!(graph.child_count(root), 0);
        assert_eq!(graph.parent(leaf), None);
        assert_relative_eq!(graph.world_position(leaf).unwrap(), Vec3::new(0.0, 1.0, 0.0));
        assert!(!graph.remove(middle));
    }

    #[test]
    fn test_move_relative_follows_local_rotation() {
        let mut graph = TransformGraph::new();
        let id = graph.create();
        graph.rotate(id, Vec3::new(0.0, HALF_PI, 0.0));
        graph.move_relative(id, Vec3::new(1.0, 0.0, 0.0));
        graph.move_absolute(id, Vec3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(graph.position(id).unwrap(), Vec3::new(1.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_set_world_pose_under_parent() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(
            LocalTransform::from_position(Vec3::new(5.0, 0.0, 0.0))
                .with_pitch_yaw_roll(Vec3::new(0.0, 0.7, 0.0))
                .with_scale(Vec3::new(2.0, 2.0, 2.0)),
        );
        let child = graph.create();
        graph.add_child(parent, child);

        let rotation = quat_from_pitch_yaw_roll(&Vec3::new(0.2, -0.4, 0.1));
        graph.set_world_pose(child, Vec3::new(1.0, 2.0, 3.0), rotation);

        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-4);
        assert!(graph.world_rotation(child).unwrap().angle_to(&rotation) < 1e-3);
    }

    #[test]
    fn test_stale_ids_are_ignored() {
        let mut graph = TransformGraph::new();
        let id = graph.create();
        graph.remove(id);

        graph.set_position(id, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(graph.position(id), None);
        assert_eq!(graph.world_matrix(id), None);
        assert!(!graph.is_dirty(id));
        assert!(graph.children(id).is_empty());
    }

    fn composed_world(graph: &TransformGraph, id: TransformId) -> Mat4 {
        let mut matrix = graph.local_matrix(id).unwrap();
        let mut current = graph.parent(id);
        while let Some(parent) = current {
            matrix = graph.local_matrix(parent).unwrap() * matrix;
            current = graph.parent(parent);
        }
        matrix
    }

    fn random_vec3(rng: &mut StdRng, extent: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        )
    }

    #[test]
    fn test_random_edit_sequences_never_read_stale() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut graph = TransformGraph::new();
            let nodes: Vec<_> = (0..8).map(|_| graph.create()).collect();

            for _ in 0..200 {
                let a = nodes[rng.gen_range(0..nodes.len())];
                let b = nodes[rng.gen_range(0..nodes.len())];

                match rng.gen_range(0..6) {
                    0 => {
                        // Moving a node never disturbs its parent
                        let parent = graph.parent(a);
                        let before = parent.and_then(|p| graph.world_matrix(p));
                        graph.set_position(a, random_vec3(&mut rng, 5.0));
                        assert_eq!(parent.and_then(|p| graph.world_matrix(p)), before);
                    }
                    1 => graph.rotate(a, random_vec3(&mut rng, 0.5)),
                    2 => graph.set_scale(a, Vec3::repeat(rng.gen_range(0.5..1.5))),
                    3 => graph.add_child(a, b),
                    4 => graph.remove_child(a, b),
                    _ => {
                        let _ = graph.world_matrix(a);
                    }
                }

                // Only a couple of reads per edit, so caches go stale across several edits
                for _ in 0..2 {
                    let id = nodes[rng.gen_range(0..nodes.len())];
                    assert_relative_eq!(
                        graph.world_matrix(id).unwrap(),
                        composed_world(&graph, id),
                        epsilon = 1e-3,
                        max_relative = 1e-3
                    );
                    assert!(!graph.is_dirty(id));
                }
            }

            // Hierarchy stays acyclic
            for id in &nodes {
                let mut depth = 0;
                let mut current = graph.parent(*id);
                while let Some(parent) = current {
                    depth += 1;
                    assert!(depth < nodes.len());
                    current = graph.parent(parent);
                }
            }
        }
    }
}
