//! # engine2d
//!
//! 2D scene hierarchy and collision detection.
//!
//! ## Features
//!
//! - **Transform hierarchy**: Arena of parent/child transforms with lazily
//!   rebuilt world state and dirty-flag propagation
//! - **Collision shapes**: Circles, boxes and convex polygons with overlap,
//!   contact, point and segment queries
//! - **Colliders**: Shapes that follow transforms, filtered by physics layers,
//!   with movement resolution
//! - **Configuration**: TOML/RON settings files
//!
//! ## Quick Start
//!
//! ```rust
//! use engine2d::prelude::*;
//!
//! let mut tree = TransformTree::new();
//! let player = tree.create_with(Vec2::new(0.0, 0.0), 0.0, Vec2::new(1.0, 1.0));
//!
//! let mut colliders = ColliderSet::new();
//! let body = colliders.insert(Collider::new(Shape::circle(1.0)).with_transform(player));
//! colliders.insert(Collider::new(Shape::Box(BoxShape::at(Vec2::new(4.0, 0.0), 2.0, 8.0))));
//! colliders.sync_all(&mut tree);
//!
//! // The wall's left face is at x = 3, so the circle stops touching it at x = 2
//! let result = colliders.apply_movement(body, Vec2::new(2.5, 0.0), &mut tree);
//! assert!(result.collided());
//! assert!((tree.position(player).x - 2.0).abs() < 1e-4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod physics;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        foundation::math::{Rect, Vec2, Mat3},
        scene::{Reparent, TransformId, TransformTree},
        physics::{
            BoxShape, Circle, Collider, ColliderId, ColliderSet, CollisionHit,
            LineCastHit, PhysicsLayers, Polygon, Shape, ShapeError,
        },
    };
}
