//! Physics module for 2D collision detection
//!
//! Provides world-space collision shapes with pairwise narrow-phase queries,
//! layer filtering, and colliders that follow the transform hierarchy and
//! resolve movement against each other.

pub mod collision;
pub mod collision_layers;
pub mod collider;

pub use collision::{
    point_to_shape,
    BoxShape,
    Circle,
    CollisionHit,
    LineCastHit,
    Polygon,
    Shape,
    ShapeError,
};
pub use collision_layers::PhysicsLayers;
pub use collider::{Collider, ColliderHit, ColliderId, ColliderSet, MovementResult, RegionChange};
