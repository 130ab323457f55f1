//! Transform hierarchy with lazily derived world state
//!
//! Transforms live in a [`TransformTree`] arena and refer to each other through
//! [`TransformId`] handles. A node owns its local position, rotation and scale;
//! its world position/rotation/scale and the local-to-world / world-to-local
//! matrices are caches that are rebuilt on the next read after a mutation.
//!
//! # Dirty propagation
//!
//! Local setters mark one [`DirtyFlags`] bit on the node and every descendant.
//! A node that already carries the bit stops the walk, since its whole subtree
//! carries it too. Reads call `calculate_transform`, which cleans the parent
//! chain first and then rebuilds only what the bits say is stale. Reading a
//! clean node is O(1).
//!
//! # Matrix convention
//!
//! Column vectors: `local = T * R * S` and `world = parent_world * local`, which
//! applies scale, then rotation, then translation, then the parent.

use bitflags::bitflags;
use slotmap::SlotMap;

use crate::foundation::math::{constants, transform_point, utils, Mat3, Vec2};

slotmap::new_key_type! {
    /// Handle to a node in a [`TransformTree`]
    pub struct TransformId;
}

bitflags! {
    /// Which parts of the derived world state are stale
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u8 {
        /// Local position (or an ancestor's) changed
        const POSITION = 1 << 0;
        /// Local scale (or an ancestor's) changed
        const SCALE = 1 << 1;
        /// Local rotation (or an ancestor's) changed
        const ROTATION = 1 << 2;
    }
}

/// How [`TransformTree::set_parent_with`] rewrites the local state of the moved node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reparent {
    /// Rewrite local position, rotation and scale so the world pose is unchanged
    #[default]
    KeepWorldPosition,
    /// Zero the local position; rotation and scale stay as they are
    ResetToOrigin,
}

/// A single node of the hierarchy
#[derive(Debug, Clone)]
pub struct TransformNode {
    parent: Option<TransformId>,
    children: Vec<TransformId>,

    local_position: Vec2,
    local_rotation: f32,
    local_scale: Vec2,

    // Derived world state
    position: Vec2,
    rotation: f32,
    scale: Vec2,

    translation_matrix: Mat3,
    rotation_matrix: Mat3,
    scale_matrix: Mat3,
    local_transform: Mat3,
    world_transform: Mat3,
    world_to_local: Mat3,

    hierarchy_dirty: DirtyFlags,
    local_dirty: bool,
    local_position_dirty: bool,
    local_rotation_dirty: bool,
    local_scale_dirty: bool,
    world_to_local_dirty: bool,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            local_position: Vec2::zeros(),
            local_rotation: 0.0,
            local_scale: Vec2::new(1.0, 1.0),
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            translation_matrix: Mat3::identity(),
            rotation_matrix: Mat3::identity(),
            scale_matrix: Mat3::identity(),
            local_transform: Mat3::identity(),
            world_transform: Mat3::identity(),
            world_to_local: Mat3::identity(),
            hierarchy_dirty: DirtyFlags::all(),
            local_dirty: true,
            local_position_dirty: true,
            local_rotation_dirty: true,
            local_scale_dirty: true,
            world_to_local_dirty: true,
        }
    }
}

impl TransformNode {
    /// Parent handle, `None` for roots
    pub fn parent(&self) -> Option<TransformId> {
        self.parent
    }

    /// Child handles in attachment order
    pub fn children(&self) -> &[TransformId] {
        &self.children
    }

    /// Position relative to the parent
    pub fn local_position(&self) -> Vec2 {
        self.local_position
    }

    /// Rotation relative to the parent, in radians
    pub fn local_rotation(&self) -> f32 {
        self.local_rotation
    }

    /// Scale relative to the parent
    pub fn local_scale(&self) -> Vec2 {
        self.local_scale
    }

    /// Pending dirty bits; empty when the world cache is valid
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.hierarchy_dirty
    }
}

/// Arena owning every transform node.
///
/// Handles are generational, so a [`TransformId`] of a destroyed node never
/// aliases a newer one. Passing a stale handle to an accessor panics.
#[derive(Debug, Default)]
pub struct TransformTree {
    nodes: SlotMap<TransformId, TransformNode>,
    recalculations: u64,
}

impl TransformTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root transform with identity local state
    pub fn create(&mut self) -> TransformId {
        self.nodes.insert(TransformNode::default())
    }

    /// Create a root transform with the given local state
    pub fn create_with(&mut self, position: Vec2, rotation: f32, scale: Vec2) -> TransformId {
        self.nodes.insert(TransformNode {
            local_position: position,
            local_rotation: rotation,
            local_scale: scale,
            ..TransformNode::default()
        })
    }

    /// Destroy a transform. Its children become roots and keep their world pose.
    pub fn destroy(&mut self, id: TransformId) {
        if !self.nodes.contains_key(id) {
            return;
        }
        let children = std::mem::take(&mut self.nodes[id].children);
        for child in children {
            // Detach by hand: the child list is already taken from `id`.
            let pose = self.world_pose(child);
            self.nodes[child].parent = None;
            self.set_dirty(child, DirtyFlags::all());
            self.apply_world_pose(child, pose);
        }
        if let Some(parent) = self.nodes[id].parent {
            self.nodes[parent].children.retain(|c| *c != id);
        }
        self.nodes.remove(id);
        log::trace!("Destroyed transform {:?}", id);
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: TransformId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checked access to a node
    pub fn get(&self, id: TransformId) -> Option<&TransformNode> {
        self.nodes.get(id)
    }

    /// Number of times a node's world state was actually rebuilt
    pub fn recalculation_count(&self) -> u64 {
        self.recalculations
    }

    // --- hierarchy ---

    /// Parent of `id`
    pub fn parent(&self, id: TransformId) -> Option<TransformId> {
        self.nodes[id].parent
    }

    /// Children of `id` in attachment order
    pub fn children(&self, id: TransformId) -> &[TransformId] {
        &self.nodes[id].children
    }

    /// Number of children of `id`
    pub fn child_count(&self, id: TransformId) -> usize {
        self.nodes[id].children.len()
    }

    /// Child of `id` at `index`
    pub fn child(&self, id: TransformId, index: usize) -> Option<TransformId> {
        self.nodes[id].children.get(index).copied()
    }

    /// Re-parent `id`, keeping its world pose
    pub fn set_parent(&mut self, id: TransformId, parent: Option<TransformId>) {
        self.set_parent_with(id, parent, Reparent::KeepWorldPosition);
    }

    /// Re-parent `id` using the given local rewrite policy.
    ///
    /// Assigning a node under one of its own descendants creates a cycle; that
    /// is a caller error and is not detected.
    pub fn set_parent_with(&mut self, id: TransformId, parent: Option<TransformId>, mode: Reparent) {
        if self.nodes[id].parent == parent {
            return;
        }
        debug_assert!(parent != Some(id), "a transform cannot be its own parent");

        let pose = match mode {
            Reparent::KeepWorldPosition => Some(self.world_pose(id)),
            Reparent::ResetToOrigin => None,
        };

        if let Some(old) = self.nodes[id].parent {
            self.nodes[old].children.retain(|c| *c != id);
        }
        if let Some(new) = parent {
            self.nodes[new].children.push(id);
        }
        self.nodes[id].parent = parent;
        log::debug!("Reparented transform {:?} under {:?} ({:?})", id, parent, mode);

        // The new ancestors may carry bits this subtree does not; mark everything.
        self.set_dirty(id, DirtyFlags::all());

        match pose {
            Some(pose) => self.apply_world_pose(id, pose),
            None => self.set_local_position(id, Vec2::zeros()),
        }
    }

    /// Restore identity local state and clear every parent/child link of `id`.
    ///
    /// Former children become roots and keep their world pose.
    pub fn reset(&mut self, id: TransformId) {
        let children = self.nodes[id].children.clone();
        for child in children {
            self.set_parent(child, None);
        }
        self.set_parent_with(id, None, Reparent::ResetToOrigin);
        self.set_local_rotation(id, 0.0);
        self.set_local_scale(id, Vec2::new(1.0, 1.0));
        self.set_local_position(id, Vec2::zeros());
    }

    /// Copy the local state of `source` onto `id`
    pub fn copy_from(&mut self, id: TransformId, source: TransformId) {
        let (position, rotation, scale) = {
            let src = &self.nodes[source];
            (src.local_position, src.local_rotation, src.local_scale)
        };
        self.set_local_position(id, position);
        self.set_local_rotation(id, rotation);
        self.set_local_scale(id, scale);
    }

    // --- local state ---

    /// Position relative to the parent
    pub fn local_position(&self, id: TransformId) -> Vec2 {
        self.nodes[id].local_position
    }

    /// Rotation relative to the parent, in radians
    pub fn local_rotation(&self, id: TransformId) -> f32 {
        self.nodes[id].local_rotation
    }

    /// Rotation relative to the parent, in degrees
    pub fn local_rotation_degrees(&self, id: TransformId) -> f32 {
        utils::rad_to_deg(self.nodes[id].local_rotation)
    }

    /// Scale relative to the parent
    pub fn local_scale(&self, id: TransformId) -> Vec2 {
        self.nodes[id].local_scale
    }

    /// Set the position relative to the parent
    pub fn set_local_position(&mut self, id: TransformId, position: Vec2) {
        let node = &mut self.nodes[id];
        if node.local_position == position {
            return;
        }
        node.local_position = position;
        node.local_dirty = true;
        node.local_position_dirty = true;
        self.set_dirty(id, DirtyFlags::POSITION);
    }

    /// Set the rotation relative to the parent, in radians
    pub fn set_local_rotation(&mut self, id: TransformId, radians: f32) {
        let node = &mut self.nodes[id];
        if node.local_rotation == radians {
            return;
        }
        node.local_rotation = radians;
        node.local_dirty = true;
        node.local_rotation_dirty = true;
        self.set_dirty(id, DirtyFlags::ROTATION);
    }

    /// Set the rotation relative to the parent, in degrees
    pub fn set_local_rotation_degrees(&mut self, id: TransformId, degrees: f32) {
        self.set_local_rotation(id, utils::deg_to_rad(degrees));
    }

    /// Set the scale relative to the parent
    pub fn set_local_scale(&mut self, id: TransformId, scale: Vec2) {
        let node = &mut self.nodes[id];
        if node.local_scale == scale {
            return;
        }
        node.local_scale = scale;
        node.local_dirty = true;
        node.local_scale_dirty = true;
        self.set_dirty(id, DirtyFlags::SCALE);
    }

    /// Move by `delta` in parent space
    pub fn translate(&mut self, id: TransformId, delta: Vec2) {
        let position = self.nodes[id].local_position + delta;
        self.set_local_position(id, position);
    }

    /// Rotate by `radians` relative to the current local rotation
    pub fn rotate(&mut self, id: TransformId, radians: f32) {
        let rotation = self.nodes[id].local_rotation + radians;
        self.set_local_rotation(id, rotation);
    }

    // --- world state ---

    /// World-space position
    pub fn position(&mut self, id: TransformId) -> Vec2 {
        self.calculate_transform(id);
        self.nodes[id].position
    }

    /// World-space rotation in radians (sum of the chain's local rotations)
    pub fn rotation(&mut self, id: TransformId) -> f32 {
        self.calculate_transform(id);
        self.nodes[id].rotation
    }

    /// World-space rotation in degrees
    pub fn rotation_degrees(&mut self, id: TransformId) -> f32 {
        utils::rad_to_deg(self.rotation(id))
    }

    /// World-space scale (component-wise product of the chain's local scales)
    pub fn scale(&mut self, id: TransformId) -> Vec2 {
        self.calculate_transform(id);
        self.nodes[id].scale
    }

    /// Matrix mapping local coordinates of `id` to world coordinates
    pub fn local_to_world(&mut self, id: TransformId) -> Mat3 {
        self.calculate_transform(id);
        self.nodes[id].world_transform
    }

    /// Matrix mapping world coordinates to local coordinates of `id`
    pub fn world_to_local(&mut self, id: TransformId) -> Mat3 {
        self.calculate_transform(id);
        let node = &mut self.nodes[id];
        if node.world_to_local_dirty {
            node.world_to_local = node.world_transform.try_inverse().unwrap_or_else(|| {
                log::warn!("Transform {:?} has a singular world matrix; using identity inverse", id);
                Mat3::identity()
            });
            node.world_to_local_dirty = false;
        }
        node.world_to_local
    }

    /// Set the world-space position by rewriting the local position through the parent
    pub fn set_position(&mut self, id: TransformId, position: Vec2) {
        let local = match self.nodes[id].parent {
            Some(parent) => transform_point(&self.world_to_local(parent), position),
            None => position,
        };
        self.set_local_position(id, local);
    }

    /// Set the world-space rotation in radians
    pub fn set_rotation(&mut self, id: TransformId, radians: f32) {
        let local = match self.nodes[id].parent {
            Some(parent) => radians - self.rotation(parent),
            None => radians,
        };
        self.set_local_rotation(id, local);
    }

    /// Set the world-space rotation in degrees
    pub fn set_rotation_degrees(&mut self, id: TransformId, degrees: f32) {
        self.set_rotation(id, utils::deg_to_rad(degrees));
    }

    /// Set the world-space scale.
    ///
    /// An axis whose parent scale is zero cannot be solved for; that axis keeps
    /// its current local value.
    pub fn set_scale(&mut self, id: TransformId, scale: Vec2) {
        let local = match self.nodes[id].parent {
            Some(parent) => {
                let parent_scale = self.scale(parent);
                let current = self.nodes[id].local_scale;
                if parent_scale.x == 0.0 || parent_scale.y == 0.0 {
                    log::warn!("Cannot derive local scale of {:?}: parent scale is {:?}", id, parent_scale);
                }
                Vec2::new(
                    if parent_scale.x == 0.0 { current.x } else { scale.x / parent_scale.x },
                    if parent_scale.y == 0.0 { current.y } else { scale.y / parent_scale.y },
                )
            }
            None => scale,
        };
        self.set_local_scale(id, local);
    }

    /// Rotate so the node's +X axis points at `target` (world space)
    pub fn look_at(&mut self, id: TransformId, target: Vec2) {
        let direction = target - self.position(id);
        if direction.magnitude_squared() == 0.0 {
            return;
        }
        let angle = direction.y.atan2(direction.x);
        self.set_rotation(id, angle.rem_euclid(constants::TAU));
    }

    // --- internals ---

    /// Mark `flag` on `id` and all descendants, stopping at nodes that already carry it
    fn set_dirty(&mut self, id: TransformId, flag: DirtyFlags) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let node = &mut self.nodes[current];
            if node.hierarchy_dirty.contains(flag) {
                continue;
            }
            node.hierarchy_dirty |= flag;
            pending.extend_from_slice(&node.children);
        }
    }

    /// Rebuild the world cache of `id` if any dirty bit is set, parents first
    fn calculate_transform(&mut self, id: TransformId) {
        // A clean node has only clean ancestors, so the dirty chain ends at the
        // first clean one
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            if node.hierarchy_dirty.is_empty() {
                break;
            }
            chain.push(node_id);
            current = node.parent;
        }

        for node_id in chain.into_iter().rev() {
            self.rebuild_world(node_id);
        }
    }

    /// Recompute one node's cache; its parent must already be clean
    fn rebuild_world(&mut self, id: TransformId) {
        let parent_state = self.nodes[id].parent.map(|parent| {
            let p = &self.nodes[parent];
            (p.world_transform, p.rotation, p.scale)
        });

        self.recalculations += 1;
        let node = &mut self.nodes[id];

        if node.local_dirty {
            if node.local_position_dirty {
                node.translation_matrix = Mat3::new_translation(&node.local_position);
                node.local_position_dirty = false;
            }
            if node.local_rotation_dirty {
                node.rotation_matrix = Mat3::new_rotation(node.local_rotation);
                node.local_rotation_dirty = false;
            }
            if node.local_scale_dirty {
                node.scale_matrix = Mat3::new_nonuniform_scaling(&node.local_scale);
                node.local_scale_dirty = false;
            }
            node.local_transform = node.translation_matrix * node.rotation_matrix * node.scale_matrix;
            node.local_dirty = false;
        }

        match parent_state {
            Some((parent_world, parent_rotation, parent_scale)) => {
                node.world_transform = parent_world * node.local_transform;
                node.rotation = parent_rotation + node.local_rotation;
                node.scale = parent_scale.component_mul(&node.local_scale);
            }
            None => {
                node.world_transform = node.local_transform;
                node.rotation = node.local_rotation;
                node.scale = node.local_scale;
            }
        }
        node.position = Vec2::new(node.world_transform[(0, 2)], node.world_transform[(1, 2)]);

        node.world_to_local_dirty = true;
        node.hierarchy_dirty = DirtyFlags::empty();
    }

    fn world_pose(&mut self, id: TransformId) -> (Vec2, f32, Vec2) {
        (self.position(id), self.rotation(id), self.scale(id))
    }

    fn apply_world_pose(&mut self, id: TransformId, (position, rotation, scale): (Vec2, f32, Vec2)) {
        // Scale and rotation first: set_position inverts the parent, not this node.
        self.set_scale(id, scale);
        self.set_rotation(id, rotation);
        self.set_position(id, position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn new_transform_is_identity() {
        let mut tree = TransformTree::new();
        let id = tree.create();

        assert_eq!(tree.position(id), Vec2::zeros());
        assert_eq!(tree.rotation(id), 0.0);
        assert_eq!(tree.scale(id), Vec2::new(1.0, 1.0));
        assert_eq!(tree.local_to_world(id), Mat3::identity());
    }

    #[test]
    fn child_inherits_parent_translation_rotation_and_scale() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Vec2::new(10.0, 0.0), HALF_PI, Vec2::new(2.0, 2.0));
        let child = tree.create_with(Vec2::new(1.0, 0.0), 0.25, Vec2::new(3.0, 0.5));
        tree.set_parent_with(child, Some(parent), Reparent::ResetToOrigin);
        tree.set_local_position(child, Vec2::new(1.0, 0.0));

        // (1, 0) scaled by 2 and rotated a quarter turn lands on (0, 2), then offset by (10, 0).
        assert_relative_eq!(tree.position(child), Vec2::new(10.0, 2.0), epsilon = EPSILON);
        assert_relative_eq!(tree.rotation(child), HALF_PI + 0.25, epsilon = EPSILON);
        assert_relative_eq!(tree.scale(child), Vec2::new(6.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn clean_reads_never_recalculate() {
        let mut tree = TransformTree::new();
        let root = tree.create_with(Vec2::new(5.0, 5.0), 0.0, Vec2::new(1.0, 1.0));
        let mid = tree.create();
        let leaf = tree.create();
        tree.set_parent(mid, Some(root));
        tree.set_parent(leaf, Some(mid));

        let _ = tree.position(leaf);
        let settled = tree.recalculation_count();
        for _ in 0..10 {
            let _ = tree.position(leaf);
            let _ = tree.rotation(mid);
            let _ = tree.local_to_world(root);
        }
        assert_eq!(tree.recalculation_count(), settled, "clean nodes must not recompute");
    }

    #[test]
    fn leaf_mutation_recomputes_only_the_leaf() {
        let mut tree = TransformTree::new();
        let root = tree.create();
        let mut chain = vec![root];
        for _ in 0..8 {
            let node = tree.create();
            tree.set_parent(node, chain.last().copied());
            chain.push(node);
        }
        let leaf = *chain.last().expect("chain is not empty");
        let _ = tree.position(leaf);
        let before = tree.recalculation_count();

        tree.set_local_position(leaf, Vec2::new(1.0, 2.0));
        let _ = tree.position(leaf);
        assert_eq!(tree.recalculation_count(), before + 1);
        assert_relative_eq!(tree.position(leaf), Vec2::new(1.0, 2.0), epsilon = EPSILON);
    }

    #[test]
    fn very_deep_chain_updates_without_recursion() {
        const DEPTH: usize = 100_000;
        let mut tree = TransformTree::new();
        let root = tree.create();
        let mut leaf = root;
        for _ in 0..DEPTH {
            let node = tree.create();
            tree.set_parent_with(node, Some(leaf), Reparent::ResetToOrigin);
            tree.set_local_position(node, Vec2::new(1.0, 0.0));
            leaf = node;
        }

        #[allow(clippy::cast_precision_loss)]
        let length = DEPTH as f32;
        assert_relative_eq!(tree.position(leaf), Vec2::new(length, 0.0), epsilon = EPSILON);

        tree.set_local_position(root, Vec2::new(0.0, 1.0));
        assert_relative_eq!(tree.position(leaf), Vec2::new(length, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn parent_mutation_reaches_descendants() {
        let mut tree = TransformTree::new();
        let parent = tree.create();
        let child = tree.create_with(Vec2::new(0.0, 3.0), 0.0, Vec2::new(1.0, 1.0));
        tree.set_parent_with(child, Some(parent), Reparent::KeepWorldPosition);
        let _ = tree.position(child);

        tree.set_local_position(parent, Vec2::new(4.0, 0.0));
        assert!(tree.get(child).expect("live child").dirty_flags().contains(DirtyFlags::POSITION));
        assert_relative_eq!(tree.position(child), Vec2::new(4.0, 3.0), epsilon = EPSILON);
        assert!(tree.get(child).expect("live child").dirty_flags().is_empty());
    }

    #[test]
    fn reparent_keeps_world_position() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Vec2::new(-3.0, 7.0), 0.7, Vec2::new(2.0, 2.0));
        let node = tree.create_with(Vec2::new(12.0, -4.0), 0.3, Vec2::new(1.0, 1.0));
        let before = tree.position(node);
        let rotation_before = tree.rotation(node);

        tree.set_parent(node, Some(parent));
        assert_relative_eq!(tree.position(node), before, epsilon = EPSILON);
        assert_relative_eq!(tree.rotation(node), rotation_before, epsilon = EPSILON);
        assert_eq!(tree.children(parent), &[node]);
    }

    #[test]
    fn reparent_reset_to_origin_zeroes_local_position() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Vec2::new(8.0, 1.0), 0.0, Vec2::new(1.0, 1.0));
        let node = tree.create_with(Vec2::new(100.0, 100.0), 0.0, Vec2::new(1.0, 1.0));

        tree.set_parent_with(node, Some(parent), Reparent::ResetToOrigin);
        assert_eq!(tree.local_position(node), Vec2::zeros());
        assert_relative_eq!(tree.position(node), Vec2::new(8.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn detach_and_reattach_reproduces_world_matrix() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Vec2::new(2.0, 3.0), 0.4, Vec2::new(1.5, 1.5));
        let node = tree.create();
        tree.set_parent_with(node, Some(parent), Reparent::ResetToOrigin);
        tree.set_local_position(node, Vec2::new(1.0, -2.0));
        tree.set_local_rotation(node, -0.2);
        let original = tree.local_to_world(node);

        tree.set_parent(node, None);
        assert_relative_eq!(tree.local_to_world(node), original, epsilon = EPSILON);
        tree.set_parent(node, Some(parent));
        assert_relative_eq!(tree.local_to_world(node), original, epsilon = EPSILON);
        assert_relative_eq!(tree.local_position(node), Vec2::new(1.0, -2.0), epsilon = EPSILON);
    }

    #[test]
    fn attaching_under_dirty_parent_still_tracks_parent_moves() {
        let mut tree = TransformTree::new();
        let parent = tree.create();
        let child = tree.create();
        let _ = tree.position(child);

        tree.set_local_position(parent, Vec2::new(1.0, 0.0));
        tree.set_parent_with(child, Some(parent), Reparent::ResetToOrigin);
        tree.set_local_position(parent, Vec2::new(2.0, 0.0));
        assert_relative_eq!(tree.position(child), Vec2::new(2.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn world_setters_rewrite_local_state() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Vec2::new(10.0, 10.0), HALF_PI, Vec2::new(2.0, 4.0));
        let child = tree.create();
        tree.set_parent_with(child, Some(parent), Reparent::ResetToOrigin);

        tree.set_position(child, Vec2::new(10.0, 14.0));
        assert_relative_eq!(tree.position(child), Vec2::new(10.0, 14.0), epsilon = EPSILON);

        tree.set_rotation(child, 0.0);
        assert_relative_eq!(tree.local_rotation(child), -HALF_PI, epsilon = EPSILON);

        tree.set_scale(child, Vec2::new(1.0, 1.0));
        assert_relative_eq!(tree.local_scale(child), Vec2::new(0.5, 0.25), epsilon = EPSILON);
    }

    #[test]
    fn world_to_local_inverts_local_to_world() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Vec2::new(-1.0, 2.0), 1.1, Vec2::new(3.0, 0.5));
        let child = tree.create_with(Vec2::new(4.0, 4.0), -0.3, Vec2::new(1.0, 2.0));
        tree.set_parent(child, Some(parent));

        let product = tree.local_to_world(child) * tree.world_to_local(child);
        assert_relative_eq!(product, Mat3::identity(), epsilon = 1e-4);
    }

    #[test]
    fn degree_helpers_round_trip() {
        let mut tree = TransformTree::new();
        let id = tree.create();
        tree.set_local_rotation_degrees(id, 90.0);
        assert_relative_eq!(tree.local_rotation(id), HALF_PI, epsilon = EPSILON);
        assert_relative_eq!(tree.rotation_degrees(id), 90.0, epsilon = 1e-3);
    }

    #[test]
    fn look_at_points_positive_x_at_target() {
        let mut tree = TransformTree::new();
        let id = tree.create_with(Vec2::new(1.0, 1.0), 0.0, Vec2::new(1.0, 1.0));
        tree.look_at(id, Vec2::new(1.0, 5.0));
        assert_relative_eq!(tree.rotation(id), HALF_PI, epsilon = EPSILON);
    }

    #[test]
    fn reset_clears_links_and_state() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Vec2::new(3.0, 0.0), 0.0, Vec2::new(1.0, 1.0));
        let node = tree.create_with(Vec2::new(1.0, 1.0), 0.5, Vec2::new(2.0, 2.0));
        let grandchild = tree.create_with(Vec2::new(9.0, 9.0), 0.0, Vec2::new(1.0, 1.0));
        tree.set_parent(node, Some(parent));
        tree.set_parent(grandchild, Some(node));
        let grandchild_world = tree.position(grandchild);

        tree.reset(node);
        assert_eq!(tree.parent(node), None);
        assert_eq!(tree.child_count(node), 0);
        assert_eq!(tree.child_count(parent), 0);
        assert_eq!(tree.position(node), Vec2::zeros());
        assert_eq!(tree.scale(node), Vec2::new(1.0, 1.0));
        assert_relative_eq!(tree.position(grandchild), grandchild_world, epsilon = EPSILON);
    }

    #[test]
    fn destroy_orphans_children_in_place() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Vec2::new(5.0, 5.0), 0.0, Vec2::new(1.0, 1.0));
        let child = tree.create();
        tree.set_parent_with(child, Some(parent), Reparent::ResetToOrigin);
        tree.set_local_position(child, Vec2::new(1.0, 0.0));

        tree.destroy(parent);
        assert!(!tree.contains(parent));
        assert_eq!(tree.parent(child), None);
        assert_relative_eq!(tree.position(child), Vec2::new(6.0, 5.0), epsilon = EPSILON);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn copy_from_duplicates_local_state() {
        let mut tree = TransformTree::new();
        let source = tree.create_with(Vec2::new(1.0, 2.0), 0.3, Vec2::new(4.0, 5.0));
        let target = tree.create();
        tree.copy_from(target, source);
        assert_eq!(tree.local_position(target), Vec2::new(1.0, 2.0));
        assert_eq!(tree.local_rotation(target), 0.3);
        assert_eq!(tree.local_scale(target), Vec2::new(4.0, 5.0));
        assert_relative_eq!(tree.local_to_world(target), tree.local_to_world(source));
    }
}
