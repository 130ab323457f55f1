//! Collision shapes and narrow-phase queries
//!
//! Shapes are stored in world space and tested pairwise through an exhaustive
//! dispatch on the shape kinds. Rotated boxes are converted to polygons before
//! any narrow-phase work.
//!
//! # Module Organization
//!
//! - [`primitives`] - Hit records and segment helpers
//! - [`polygon`] - Convex polygon geometry with cached edge normals
//! - [`shape`] - Circle and box shapes, and the [`Shape`] dispatch enum
//! - [`shape_collisions`] - The pairwise algorithms (SAT, circle/box, casts)
//!
//! # Hit orientation
//!
//! [`CollisionHit::normal`] points from the other shape toward the shape the
//! query was called on, and subtracting [`CollisionHit::penetration`] from that
//! shape's position separates the two.

pub mod primitives;
pub mod polygon;
pub mod shape;
pub mod shape_collisions;

// Re-export commonly used types
pub use primitives::{line_to_line, CollisionHit, LineCastHit, SegmentIntersection};
pub use polygon::Polygon;
pub use shape::{point_to_shape, BoxShape, Circle, Shape, ShapeError};
