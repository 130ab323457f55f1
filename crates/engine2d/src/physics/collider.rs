//! Colliders: shapes attached to transforms, and the set that queries them
//!
//! A [`Collider`] keeps the shape as it was authored and a world-space copy
//! that [`Collider::sync_with_transform`] rebuilds from the transform it
//! follows. [`ColliderSet`] owns colliders in a slotmap arena and answers
//! overlap, cast and movement queries by testing every enabled collider whose
//! layers match.
//!
//! There is no broad phase here. `registered_region` records the bounds under
//! which a collider was last handed to an external spatial index, and
//! [`ColliderSet::sync_all`] reports every region that moved so the index can
//! re-bucket it.

use slotmap::SlotMap;

use crate::config::PhysicsConfig;
use crate::foundation::math::{rotate_vector, Rect, Vec2};
use crate::scene::{TransformId, TransformTree};
use super::collision::{BoxShape, CollisionHit, LineCastHit, Shape};
use super::collision_layers::PhysicsLayers;

slotmap::new_key_type! {
    /// Handle to a collider in a [`ColliderSet`]
    pub struct ColliderId;
}

/// A shape taking part in collision queries
#[derive(Debug, Clone)]
pub struct Collider {
    /// World-space shape used by every query
    pub shape: Shape,
    local_shape: Shape,

    /// Offset of the shape from the followed transform, in its local space
    pub local_offset: Vec2,
    /// Transform the shape follows, if any
    pub transform: Option<TransformId>,
    /// Apply the transform's rotation to the shape and offset
    pub rotate_with_transform: bool,
    /// Apply the transform's scale to the shape and offset
    pub scale_with_transform: bool,

    /// Triggers report overlaps but never block movement
    pub is_trigger: bool,
    /// Layers this collider sits on
    pub physics_layer: PhysicsLayers,
    /// Layers this collider reacts to
    pub collides_with_layers: PhysicsLayers,

    /// Bounds under which the collider was last registered with a spatial index
    pub registered_region: Option<Rect>,
    /// Disabled colliders are skipped by all queries
    pub enabled: bool,
}

impl Collider {
    /// Collider for `shape` on every layer, reacting to every layer
    pub fn new(shape: Shape) -> Self {
        Self {
            local_shape: shape.clone(),
            shape,
            local_offset: Vec2::zeros(),
            transform: None,
            rotate_with_transform: true,
            scale_with_transform: true,
            is_trigger: false,
            physics_layer: PhysicsLayers::all(),
            collides_with_layers: PhysicsLayers::all(),
            registered_region: None,
            enabled: true,
        }
    }

    /// Follow `transform`
    #[must_use]
    pub fn with_transform(mut self, transform: TransformId) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Offset the shape from the followed transform
    #[must_use]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.local_offset = offset;
        self
    }

    /// Set the layer and the mask of layers it reacts to
    #[must_use]
    pub fn with_layers(mut self, layer: PhysicsLayers, collides_with: PhysicsLayers) -> Self {
        self.physics_layer = layer;
        self.collides_with_layers = collides_with;
        self
    }

    /// Mark as a trigger
    #[must_use]
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// The shape as authored, before any transform is applied
    pub fn local_shape(&self) -> &Shape {
        &self.local_shape
    }

    /// Replace the authored shape; the world shape is rebuilt on the next sync
    pub fn set_local_shape(&mut self, shape: Shape) {
        self.shape = shape.clone();
        self.local_shape = shape;
    }

    /// World-space bounds
    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    /// Whether both colliders accept each other's layer
    pub fn accepts(&self, other: &Collider) -> bool {
        PhysicsLayers::should_collide(
            self.physics_layer,
            self.collides_with_layers,
            other.physics_layer,
            other.collides_with_layers,
        )
    }

    /// Rebuild the world shape from the followed transform.
    ///
    /// Circles scale by the larger scale axis; boxes and polygons scale per axis.
    /// Does nothing for colliders without a transform.
    pub fn sync_with_transform(&mut self, tree: &mut TransformTree) {
        let Some(transform) = self.transform else {
            return;
        };
        if !tree.contains(transform) {
            log::warn!("Collider follows a destroyed transform {transform:?}; keeping last pose");
            return;
        }

        let position = tree.position(transform);
        let rotation = if self.rotate_with_transform { tree.rotation(transform) } else { 0.0 };
        let scale = if self.scale_with_transform { tree.scale(transform) } else { Vec2::new(1.0, 1.0) };

        let offset = rotate_vector(self.local_offset.component_mul(&scale), rotation);

        let mut shape = match &self.local_shape {
            Shape::Circle(circle) => {
                let mut circle = circle.clone();
                circle.set_radius(circle.radius() * scale.x.abs().max(scale.y.abs()));
                Shape::Circle(circle)
            }
            Shape::Box(rect) => {
                let mut rect = rect.clone();
                rect.set_size(rect.width() * scale.x, rect.height() * scale.y);
                rect.set_rotation(rect.rotation() + rotation);
                Shape::Box(rect)
            }
            Shape::Polygon(polygon) => Shape::Polygon(polygon.transformed(scale, rotation)),
        };
        shape.set_position(position + offset);
        self.shape = shape;
    }
}

/// A collision between two colliders, oriented from `other` toward `this`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderHit {
    /// Collider the query was made for
    pub this: ColliderId,
    /// Collider it ran into
    pub other: ColliderId,
    /// Contact, with `normal` pointing from `other` toward `this`
    pub hit: CollisionHit,
}

/// Outcome of [`ColliderSet::calculate_movement`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementResult {
    /// Motion left after pushing out of every blocking collider
    pub motion: Vec2,
    /// Every blocking collision found along the way
    pub hits: Vec<ColliderHit>,
}

impl MovementResult {
    /// Whether anything blocked the motion
    pub fn collided(&self) -> bool {
        !self.hits.is_empty()
    }
}

/// Bounds change reported by [`ColliderSet::sync_all`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionChange {
    /// Collider that moved
    pub id: ColliderId,
    /// Region it was registered under before the sync
    pub previous: Option<Rect>,
    /// Region it is registered under now
    pub current: Rect,
}

/// Arena of colliders and the queries over them
#[derive(Debug, Default)]
pub struct ColliderSet {
    colliders: SlotMap<ColliderId, Collider>,
    config: PhysicsConfig,
}

impl ColliderSet {
    /// Empty set with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set with the given settings
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            colliders: SlotMap::with_key(),
            config,
        }
    }

    /// Active settings
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Add a collider; enabled colliders are registered under their current bounds
    pub fn insert(&mut self, mut collider: Collider) -> ColliderId {
        if collider.enabled {
            collider.registered_region = Some(collider.bounds());
        }
        let id = self.colliders.insert(collider);
        log::debug!("Inserted collider {id:?}");
        id
    }

    /// Remove a collider, returning it with its last registered region
    pub fn remove(&mut self, id: ColliderId) -> Option<Collider> {
        let removed = self.colliders.remove(id);
        if removed.is_some() {
            log::debug!("Removed collider {id:?}");
        }
        removed
    }

    /// Get a collider
    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id)
    }

    /// Get a collider mutably
    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.colliders.get_mut(id)
    }

    /// Number of colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Iterate over all colliders
    pub fn iter(&self) -> impl Iterator<Item = (ColliderId, &Collider)> + '_ {
        self.colliders.iter()
    }

    /// Enable or disable a collider; disabling drops its registered region
    pub fn set_enabled(&mut self, id: ColliderId, enabled: bool) {
        if let Some(collider) = self.colliders.get_mut(id) {
            collider.enabled = enabled;
            collider.registered_region = enabled.then(|| collider.bounds());
        }
    }

    /// Sync every collider with its transform and report moved regions
    pub fn sync_all(&mut self, tree: &mut TransformTree) -> Vec<RegionChange> {
        let mut changes = Vec::new();
        for (id, collider) in &mut self.colliders {
            collider.sync_with_transform(tree);
            if !collider.enabled {
                continue;
            }
            let current = collider.bounds();
            if collider.registered_region != Some(current) {
                changes.push(RegionChange {
                    id,
                    previous: collider.registered_region,
                    current,
                });
                collider.registered_region = Some(current);
            }
        }
        changes
    }

    /// Enabled colliders other than `id` that pass the mutual layer test with it
    fn candidates(&self, id: ColliderId) -> impl Iterator<Item = (ColliderId, &Collider, &Collider)> + '_ {
        let this = self.colliders.get(id).filter(|c| c.enabled);
        self.colliders
            .iter()
            .filter_map(move |(other_id, other)| {
                let this = this?;
                (other_id != id && other.enabled && this.accepts(other)).then_some((other_id, this, other))
            })
    }

    /// Colliders whose shapes overlap `id`'s
    pub fn overlapping(&self, id: ColliderId) -> Vec<ColliderId> {
        self.candidates(id)
            .filter(|(_, this, other)| this.shape.overlaps(&other.shape))
            .map(|(other_id, _, _)| other_id)
            .collect()
    }

    /// Narrow-phase hits between `id` and every collider it touches
    pub fn collisions_for(&self, id: ColliderId) -> Vec<ColliderHit> {
        self.candidates(id)
            .filter_map(|(other_id, this, other)| {
                this.shape.collides_with(&other.shape).map(|hit| ColliderHit {
                    this: id,
                    other: other_id,
                    hit,
                })
            })
            .collect()
    }

    /// First enabled collider on `layers` containing `point`
    pub fn overlap_point(&self, point: Vec2, layers: PhysicsLayers) -> Option<ColliderId> {
        self.colliders
            .iter()
            .find(|(_, c)| c.enabled && c.physics_layer.intersects(layers) && c.shape.contains_point(point))
            .map(|(id, _)| id)
    }

    /// Enabled colliders on `layers` overlapping `rect`
    pub fn overlap_rect(&self, rect: Rect, layers: PhysicsLayers) -> Vec<ColliderId> {
        let probe = Shape::Box(BoxShape::at(rect.center(), rect.width, rect.height));
        self.colliders
            .iter()
            .filter(|(_, c)| c.enabled && c.physics_layer.intersects(layers) && c.shape.overlaps(&probe))
            .map(|(id, _)| id)
            .collect()
    }

    /// Nearest collider hit by the segment `start..end`
    pub fn linecast(&self, start: Vec2, end: Vec2, layers: PhysicsLayers) -> Option<(ColliderId, LineCastHit)> {
        self.cast_hits(start, end, layers)
            .min_by(|(_, a), (_, b)| a.fraction.total_cmp(&b.fraction))
    }

    /// Every collider hit by the segment `start..end`, nearest first
    pub fn linecast_all(&self, start: Vec2, end: Vec2, layers: PhysicsLayers) -> Vec<(ColliderId, LineCastHit)> {
        let mut hits: Vec<_> = self.cast_hits(start, end, layers).collect();
        hits.sort_by(|(_, a), (_, b)| a.fraction.total_cmp(&b.fraction));
        hits
    }

    fn cast_hits(
        &self,
        start: Vec2,
        end: Vec2,
        layers: PhysicsLayers,
    ) -> impl Iterator<Item = (ColliderId, LineCastHit)> + '_ {
        let config = &self.config;
        self.colliders.iter().filter_map(move |(id, collider)| {
            if !collider.enabled || !collider.physics_layer.intersects(layers) {
                return None;
            }
            if collider.is_trigger && !config.raycasts_hit_triggers {
                return None;
            }
            if !config.raycasts_start_in_colliders && collider.shape.contains_point(start) {
                return None;
            }
            collider.shape.linecast(start, end).map(|hit| (id, hit))
        })
    }

    /// Resolve `motion` for collider `id` against every blocking collider.
    ///
    /// Each non-trigger collider that would overlap after the move pushes the
    /// motion back by its penetration. Trigger colliders never block, and a
    /// trigger collider moves freely.
    pub fn calculate_movement(&self, id: ColliderId, motion: Vec2) -> MovementResult {
        let mut result = MovementResult {
            motion,
            hits: Vec::new(),
        };
        let Some(this) = self.colliders.get(id) else {
            return result;
        };
        if this.is_trigger {
            return result;
        }

        let origin = this.shape.position();
        let mut probe = this.shape.clone();
        for (other_id, _, other) in self.candidates(id) {
            if other.is_trigger {
                continue;
            }
            probe.set_position(origin + result.motion);
            if !probe.bounds().intersects(&other.bounds()) {
                continue;
            }
            if let Some(hit) = probe.collides_with(&other.shape) {
                result.motion -= hit.penetration;
                result.hits.push(ColliderHit {
                    this: id,
                    other: other_id,
                    hit,
                });
            }
        }

        log::trace!(
            "Movement for {id:?}: requested {motion:?}, resolved {:?} after {} hit(s)",
            result.motion,
            result.hits.len()
        );
        result
    }

    /// Calculate and apply movement, moving the followed transform too
    pub fn apply_movement(&mut self, id: ColliderId, motion: Vec2, tree: &mut TransformTree) -> MovementResult {
        let result = self.calculate_movement(id, motion);
        let Some(collider) = self.colliders.get_mut(id) else {
            return result;
        };

        match collider.transform.filter(|t| tree.contains(*t)) {
            Some(transform) => {
                let position = tree.position(transform);
                tree.set_position(transform, position + result.motion);
                collider.sync_with_transform(tree);
            }
            None => collider.shape.translate(result.motion),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::constants::HALF_PI;

    fn rect_at(position: Vec2, width: f32, height: f32) -> Shape {
        Shape::Box(BoxShape::at(position, width, height))
    }

    #[test]
    fn sync_applies_transform_pose() {
        let mut tree = TransformTree::new();
        let node = tree.create_with(Vec2::new(10.0, 0.0), HALF_PI, Vec2::new(2.0, 2.0));
        let mut collider = Collider::new(Shape::circle(1.0))
            .with_transform(node)
            .with_offset(Vec2::new(1.0, 0.0));

        collider.sync_with_transform(&mut tree);
        assert_relative_eq!(collider.shape.position(), Vec2::new(10.0, 2.0), epsilon = 1e-5);
        match &collider.shape {
            Shape::Circle(circle) => assert_relative_eq!(circle.radius(), 2.0),
            other => panic!("expected a circle, got {other:?}"),
        }
    }

    #[test]
    fn sync_rotates_boxes_only_when_asked() {
        let mut tree = TransformTree::new();
        let node = tree.create_with(Vec2::zeros(), HALF_PI, Vec2::new(1.0, 1.0));
        let mut collider = Collider::new(Shape::rect(4.0, 2.0)).with_transform(node);

        collider.sync_with_transform(&mut tree);
        assert_relative_eq!(collider.bounds().height, 4.0, epsilon = 1e-5);

        collider.rotate_with_transform = false;
        collider.sync_with_transform(&mut tree);
        assert_relative_eq!(collider.bounds().height, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn layer_masks_filter_collisions() {
        let mut set = ColliderSet::new();
        let player = set.insert(
            Collider::new(Shape::circle(1.0)).with_layers(PhysicsLayers::PLAYER, PhysicsLayers::ENEMY),
        );
        let enemy = set.insert(
            Collider::new(Shape::circle(1.0)).with_layers(PhysicsLayers::ENEMY, PhysicsLayers::PLAYER),
        );
        let pickup = set.insert(
            Collider::new(Shape::circle(1.0)).with_layers(PhysicsLayers::PICKUP, PhysicsLayers::all()),
        );

        assert_eq!(set.overlapping(player), vec![enemy]);
        let hits = set.collisions_for(player);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].this, player);
        assert_eq!(hits[0].other, enemy);
        assert!(set.overlapping(pickup).is_empty());
    }

    #[test]
    fn movement_stops_at_wall() {
        let mut set = ColliderSet::new();
        let mover = set.insert(Collider::new(rect_at(Vec2::zeros(), 2.0, 2.0)));
        let wall = set.insert(Collider::new(rect_at(Vec2::new(5.0, 0.0), 2.0, 10.0)));

        let result = set.calculate_movement(mover, Vec2::new(4.0, 0.0));
        assert!(result.collided());
        assert_eq!(result.hits[0].other, wall);
        assert_relative_eq!(result.motion, Vec2::new(3.0, 0.0));

        let free = set.calculate_movement(mover, Vec2::new(0.0, 4.0));
        assert!(!free.collided());
        assert_relative_eq!(free.motion, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn triggers_do_not_block_movement() {
        let mut set = ColliderSet::new();
        let mover = set.insert(Collider::new(rect_at(Vec2::zeros(), 2.0, 2.0)));
        set.insert(Collider::new(rect_at(Vec2::new(5.0, 0.0), 2.0, 10.0)).as_trigger());

        let result = set.calculate_movement(mover, Vec2::new(4.0, 0.0));
        assert!(!result.collided());
        assert_relative_eq!(result.motion, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn apply_movement_moves_followed_transform() {
        let mut tree = TransformTree::new();
        let node = tree.create_with(Vec2::zeros(), 0.0, Vec2::new(1.0, 1.0));
        let mut set = ColliderSet::new();
        let mover = set.insert(Collider::new(Shape::rect(2.0, 2.0)).with_transform(node));
        set.insert(Collider::new(rect_at(Vec2::new(5.0, 0.0), 2.0, 10.0)));
        set.sync_all(&mut tree);

        let result = set.apply_movement(mover, Vec2::new(4.0, 0.0), &mut tree);
        assert_relative_eq!(result.motion, Vec2::new(3.0, 0.0));
        assert_relative_eq!(tree.position(node), Vec2::new(3.0, 0.0));
        let collider = set.get(mover).expect("collider exists");
        assert_relative_eq!(collider.shape.position(), Vec2::new(3.0, 0.0));
    }

    #[test]
    fn linecast_honours_trigger_and_start_settings() {
        let mut set = ColliderSet::new();
        set.insert(Collider::new(rect_at(Vec2::new(3.0, 0.0), 2.0, 2.0)).as_trigger());
        let solid = set.insert(Collider::new(rect_at(Vec2::new(8.0, 0.0), 2.0, 2.0)));
        set.insert(Collider::new(Shape::circle(1.0)));

        let (id, hit) = set
            .linecast(Vec2::zeros(), Vec2::new(20.0, 0.0), PhysicsLayers::all())
            .expect("hits the solid box");
        assert_eq!(id, solid);
        assert_relative_eq!(hit.point, Vec2::new(7.0, 0.0));

        let mut permissive = ColliderSet::with_config(PhysicsConfig {
            raycasts_hit_triggers: true,
            raycasts_start_in_colliders: true,
            ..PhysicsConfig::default()
        });
        for (_, collider) in set.iter() {
            permissive.insert(collider.clone());
        }
        let hits = permissive.linecast_all(Vec2::zeros(), Vec2::new(20.0, 0.0), PhysicsLayers::all());
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].1.fraction, 0.0, "circle around the start is hit immediately");
        assert!(hits.windows(2).all(|w| w[0].1.fraction <= w[1].1.fraction));
    }

    #[test]
    fn point_and_rect_queries_respect_layers() {
        let mut set = ColliderSet::new();
        let wall = set.insert(
            Collider::new(rect_at(Vec2::zeros(), 4.0, 4.0))
                .with_layers(PhysicsLayers::ENVIRONMENT, PhysicsLayers::all()),
        );

        assert_eq!(set.overlap_point(Vec2::new(1.0, 1.0), PhysicsLayers::ENVIRONMENT), Some(wall));
        assert_eq!(set.overlap_point(Vec2::new(1.0, 1.0), PhysicsLayers::PLAYER), None);
        assert_eq!(set.overlap_rect(Rect::new(1.0, 1.0, 5.0, 5.0), PhysicsLayers::all()), vec![wall]);
        assert!(set.overlap_rect(Rect::new(3.0, 3.0, 5.0, 5.0), PhysicsLayers::all()).is_empty());
    }

    #[test]
    fn sync_all_reports_moved_regions() {
        let mut tree = TransformTree::new();
        let node = tree.create();
        let mut set = ColliderSet::new();
        let id = set.insert(Collider::new(Shape::circle(1.0)).with_transform(node));
        let initial = set.get(id).and_then(|c| c.registered_region);
        assert!(set.sync_all(&mut tree).is_empty(), "nothing moved yet");

        tree.set_local_position(node, Vec2::new(3.0, 0.0));
        let changes = set.sync_all(&mut tree);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].previous, initial);
        assert_eq!(changes[0].current, Rect::new(2.0, -1.0, 2.0, 2.0));

        set.set_enabled(id, false);
        assert!(set.get(id).and_then(|c| c.registered_region).is_none());
    }
}
