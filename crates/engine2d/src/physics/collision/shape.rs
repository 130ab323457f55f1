//! Collision shapes and pairwise query dispatch
//!
//! Shapes live in world space: `position` is where the shape currently sits,
//! and `bounds` is kept in sync with every field that changes the geometry.
//! Colliders rebuild them from their local definition when the transform they
//! follow moves.

use std::borrow::Cow;

use thiserror::Error;

use crate::foundation::math::{rotate_vector, Rect, Vec2};
use super::polygon::Polygon;
use super::primitives::{CollisionHit, LineCastHit};
use super::shape_collisions as algo;

/// Errors raised while building shapes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Fewer than three vertices
    #[error("Polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// A coordinate is NaN or infinite
    #[error("Polygon vertices must be finite")]
    NonFinite,

    /// All vertices are collinear
    #[error("Polygon vertices enclose no area")]
    ZeroArea,
}

/// Circle defined by a center and radius
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    position: Vec2,
    radius: f32,
    bounds: Rect,
}

impl Circle {
    /// Circle of `radius` centered on the origin
    pub fn new(radius: f32) -> Self {
        Self::at(Vec2::zeros(), radius)
    }

    /// Circle of `radius` centered on `position`
    pub fn at(position: Vec2, radius: f32) -> Self {
        let radius = radius.abs();
        Self {
            position,
            radius,
            bounds: circle_bounds(position, radius),
        }
    }

    /// Center
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the center
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.bounds = circle_bounds(position, self.radius);
        }
    }

    /// Radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Set the radius; negative values are taken as their magnitude
    pub fn set_radius(&mut self, radius: f32) {
        let radius = radius.abs();
        if self.radius != radius {
            self.radius = radius;
            self.bounds = circle_bounds(self.position, radius);
        }
    }

    /// World-space axis-aligned bounds
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

fn circle_bounds(center: Vec2, radius: f32) -> Rect {
    Rect::from_center_size(center, Vec2::new(radius * 2.0, radius * 2.0))
}

/// Rectangle centered on `position`, optionally rotated about its center
#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    position: Vec2,
    width: f32,
    height: f32,
    rotation: f32,
    bounds: Rect,
}

impl BoxShape {
    /// Unrotated box of the given size centered on the origin
    pub fn new(width: f32, height: f32) -> Self {
        Self::at(Vec2::zeros(), width, height)
    }

    /// Unrotated box of the given size centered on `position`
    pub fn at(position: Vec2, width: f32, height: f32) -> Self {
        let mut shape = Self {
            position,
            width: width.abs(),
            height: height.abs(),
            rotation: 0.0,
            bounds: Rect::ZERO,
        };
        shape.recalculate_bounds();
        shape
    }

    /// Center
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the center
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.bounds = self.bounds.translated(position - self.position);
            self.position = position;
        }
    }

    /// Extent along the box's local x axis
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Extent along the box's local y axis
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Resize around the center
    pub fn set_size(&mut self, width: f32, height: f32) {
        let (width, height) = (width.abs(), height.abs());
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.recalculate_bounds();
        }
    }

    /// Rotation about the center in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set the rotation about the center in radians
    pub fn set_rotation(&mut self, rotation: f32) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.recalculate_bounds();
        }
    }

    /// Whether the box is rotated away from the axes
    pub fn is_rotated(&self) -> bool {
        self.rotation != 0.0
    }

    /// The box as an axis-aligned rectangle, ignoring rotation
    pub fn aabb(&self) -> Rect {
        Rect::from_center_size(self.position, Vec2::new(self.width, self.height))
    }

    /// Corners relative to the center, counter-clockwise, rotation applied
    pub fn local_corners(&self) -> [Vec2; 4] {
        let half_x = self.width * 0.5;
        let half_y = self.height * 0.5;
        [
            Vec2::new(-half_x, -half_y),
            Vec2::new(half_x, -half_y),
            Vec2::new(half_x, half_y),
            Vec2::new(-half_x, half_y),
        ]
        .map(|corner| rotate_vector(corner, self.rotation))
    }

    /// Four-vertex polygon with the same geometry, used by the narrow phase
    pub fn to_polygon(&self) -> Polygon {
        Polygon::from_points(self.position, self.local_corners().to_vec())
    }

    /// World-space axis-aligned bounds, covering the rotated corners
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    fn recalculate_bounds(&mut self) {
        self.bounds = if self.is_rotated() {
            let position = self.position;
            Rect::from_points(self.local_corners().into_iter().map(|c| c + position))
                .unwrap_or_else(|| self.aabb())
        } else {
            self.aabb()
        };
    }
}

/// A collision shape
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Circle
    Circle(Circle),
    /// Box, axis-aligned unless rotated
    Box(BoxShape),
    /// Convex polygon
    Polygon(Polygon),
}

/// Form a shape takes inside the narrow phase: rotated boxes become polygons
enum NarrowShape<'a> {
    Circle(&'a Circle),
    Aabb(&'a BoxShape),
    Polygon(Cow<'a, Polygon>),
}

impl Shape {
    /// Circle centered on the origin
    pub fn circle(radius: f32) -> Self {
        Self::Circle(Circle::new(radius))
    }

    /// Unrotated box centered on the origin
    pub fn rect(width: f32, height: f32) -> Self {
        Self::Box(BoxShape::new(width, height))
    }

    /// Polygon from local vertices
    pub fn polygon(points: Vec<Vec2>) -> Result<Self, ShapeError> {
        Polygon::new(points).map(Self::Polygon)
    }

    /// Center of circles and boxes, local origin of polygons
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Circle(circle) => circle.position(),
            Self::Box(rect) => rect.position(),
            Self::Polygon(polygon) => polygon.position(),
        }
    }

    /// Move the shape so [`Shape::position`] returns `position`
    pub fn set_position(&mut self, position: Vec2) {
        match self {
            Self::Circle(circle) => circle.set_position(position),
            Self::Box(rect) => rect.set_position(position),
            Self::Polygon(polygon) => polygon.set_position(position),
        }
    }

    /// Move the shape by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        let position = self.position() + delta;
        self.set_position(position);
    }

    /// World-space axis-aligned bounds
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Circle(circle) => circle.bounds(),
            Self::Box(rect) => rect.bounds(),
            Self::Polygon(polygon) => polygon.bounds(),
        }
    }

    fn narrow(&self) -> NarrowShape<'_> {
        match self {
            Self::Circle(circle) => NarrowShape::Circle(circle),
            Self::Box(rect) if rect.is_rotated() => NarrowShape::Polygon(Cow::Owned(rect.to_polygon())),
            Self::Box(rect) => NarrowShape::Aabb(rect),
            Self::Polygon(polygon) => NarrowShape::Polygon(Cow::Borrowed(polygon)),
        }
    }

    /// Cheap boolean overlap test
    pub fn overlaps(&self, other: &Shape) -> bool {
        match (self.narrow(), other.narrow()) {
            (NarrowShape::Aabb(a), NarrowShape::Aabb(b)) => a.aabb().intersects(&b.aabb()),
            (NarrowShape::Circle(a), NarrowShape::Circle(b)) => algo::circle_overlaps_circle(a, b),
            (NarrowShape::Circle(circle), NarrowShape::Aabb(rect))
            | (NarrowShape::Aabb(rect), NarrowShape::Circle(circle)) => {
                algo::circle_overlaps_rect(circle, &rect.aabb())
            }
            (NarrowShape::Polygon(_), _) | (_, NarrowShape::Polygon(_)) => {
                self.collides_with(other).is_some()
            }
        }
    }

    /// Narrow-phase test; the hit is oriented from `other` toward `self`
    pub fn collides_with(&self, other: &Shape) -> Option<CollisionHit> {
        match (self.narrow(), other.narrow()) {
            (NarrowShape::Circle(a), NarrowShape::Circle(b)) => algo::circle_to_circle(a, b),
            (NarrowShape::Circle(a), NarrowShape::Aabb(b)) => algo::circle_to_box(a, b),
            (NarrowShape::Aabb(a), NarrowShape::Circle(b)) => {
                algo::circle_to_box(b, a).map(CollisionHit::inverted)
            }
            (NarrowShape::Aabb(a), NarrowShape::Aabb(b)) => algo::box_to_box(a, b),
            (NarrowShape::Circle(a), NarrowShape::Polygon(b)) => algo::circle_to_polygon(a, &b),
            (NarrowShape::Polygon(a), NarrowShape::Circle(b)) => {
                algo::circle_to_polygon(b, &a).map(CollisionHit::inverted)
            }
            (NarrowShape::Aabb(a), NarrowShape::Polygon(b)) => {
                algo::polygon_to_polygon(&a.to_polygon(), &b)
            }
            (NarrowShape::Polygon(a), NarrowShape::Aabb(b)) => {
                algo::polygon_to_polygon(&a, &b.to_polygon())
            }
            (NarrowShape::Polygon(a), NarrowShape::Polygon(b)) => algo::polygon_to_polygon(&a, &b),
        }
    }

    /// Whether `point` lies inside or on the shape
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self.narrow() {
            NarrowShape::Circle(circle) => {
                (point - circle.position()).magnitude_squared() <= circle.radius() * circle.radius()
            }
            NarrowShape::Aabb(rect) => rect.aabb().contains(point),
            NarrowShape::Polygon(polygon) => polygon.contains_point(point),
        }
    }

    /// Cast the segment `start..end` against the shape, returning the nearest hit
    pub fn linecast(&self, start: Vec2, end: Vec2) -> Option<LineCastHit> {
        match self {
            Self::Circle(circle) => algo::line_to_circle(start, end, circle),
            Self::Box(rect) => algo::line_to_polygon(start, end, &rect.to_polygon()),
            Self::Polygon(polygon) => algo::line_to_polygon(start, end, polygon),
        }
    }
}

/// Push a point out of a shape.
///
/// The hit is oriented from the shape toward the point, so subtracting the
/// penetration from `point` lands it on the shape's boundary.
pub fn point_to_shape(point: Vec2, shape: &Shape) -> Option<CollisionHit> {
    match shape.narrow() {
        NarrowShape::Circle(circle) => algo::point_to_circle(point, circle),
        NarrowShape::Aabb(rect) => algo::point_to_rect(point, &rect.aabb()),
        NarrowShape::Polygon(polygon) => algo::point_to_polygon(point, &polygon),
    }
}
