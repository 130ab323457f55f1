//! Convex polygon collision geometry
//!
//! Vertices are stored relative to the polygon's `position` and are always
//! wound counter-clockwise in y-up coordinates (clockwise on a y-down screen).
//! With that winding `perpendicular(edge)` points out of the polygon, which the
//! SAT, closest-point and linecast algorithms rely on.

use crate::foundation::math::{cross, perpendicular, rotate_vector, safe_normalize, Rect, Vec2};
use super::primitives::closest_point_on_segment;
use super::shape::ShapeError;

/// Convex polygon with cached outward edge normals
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    position: Vec2,
    points: Vec<Vec2>,
    edge_normals: Vec<Vec2>,
    bounds: Rect,
}

impl Polygon {
    /// Create a polygon at the origin from local vertices.
    ///
    /// Clockwise input is reversed so the stored winding is counter-clockwise.
    pub fn new(points: Vec<Vec2>) -> Result<Self, ShapeError> {
        if points.len() < 3 {
            return Err(ShapeError::TooFewVertices(points.len()));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(ShapeError::NonFinite);
        }
        if signed_area(&points) == 0.0 {
            return Err(ShapeError::ZeroArea);
        }
        Ok(Self::from_points(Vec2::zeros(), points))
    }

    /// Create a polygon positioned at `position`
    pub fn at(position: Vec2, points: Vec<Vec2>) -> Result<Self, ShapeError> {
        let mut polygon = Self::new(points)?;
        polygon.set_position(position);
        Ok(polygon)
    }

    /// Regular polygon with `vertex_count` vertices on a circle of `radius`
    pub fn regular(vertex_count: usize, radius: f32) -> Result<Self, ShapeError> {
        if vertex_count < 3 {
            return Err(ShapeError::TooFewVertices(vertex_count));
        }
        #[allow(clippy::cast_precision_loss)]
        let step = std::f32::consts::TAU / vertex_count as f32;
        #[allow(clippy::cast_precision_loss)]
        let points = (0..vertex_count)
            .map(|i| {
                let angle = step * i as f32;
                Vec2::new(angle.cos(), angle.sin()) * radius
            })
            .collect();
        Self::new(points)
    }

    /// Build from vertices already known to be a valid polygon
    pub(crate) fn from_points(position: Vec2, mut points: Vec<Vec2>) -> Self {
        if signed_area(&points) < 0.0 {
            log::trace!("Reversing clockwise polygon with {} vertices", points.len());
            points.reverse();
        }
        let mut polygon = Self {
            position,
            points,
            edge_normals: Vec::new(),
            bounds: Rect::ZERO,
        };
        polygon.rebuild_edge_normals();
        polygon.recalculate_bounds();
        polygon
    }

    /// World-space position of the polygon's local origin
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the polygon
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.bounds = self.bounds.translated(position - self.position);
            self.position = position;
        }
    }

    /// Local vertices in counter-clockwise order
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Replace the local vertices
    pub fn set_points(&mut self, points: Vec<Vec2>) -> Result<(), ShapeError> {
        let position = self.position;
        *self = Self::new(points)?;
        self.set_position(position);
        Ok(())
    }

    /// Vertices in world space
    pub fn world_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().map(move |p| *p + self.position)
    }

    /// Unit outward normal of edge `i -> i + 1`, one per vertex
    pub fn edge_normals(&self) -> &[Vec2] {
        &self.edge_normals
    }

    /// World-space axis-aligned bounds
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Copy with every local vertex scaled then rotated about the local origin
    pub fn transformed(&self, scale: Vec2, rotation: f32) -> Self {
        let points = self
            .points
            .iter()
            .map(|p| rotate_vector(p.component_mul(&scale), rotation))
            .collect();
        Self::from_points(self.position, points)
    }

    /// Average of the vertices
    pub fn centroid(points: &[Vec2]) -> Vec2 {
        if points.is_empty() {
            return Vec2::zeros();
        }
        #[allow(clippy::cast_precision_loss)]
        let count = points.len() as f32;
        points.iter().fold(Vec2::zeros(), |sum, p| sum + p) / count
    }

    /// World-space vertex centroid; differs from `position` when the
    /// vertices are not centered on the local origin
    pub fn world_centroid(&self) -> Vec2 {
        self.position + Self::centroid(&self.points)
    }

    /// Shift vertices so their centroid sits on the local origin
    pub fn recenter(points: &mut [Vec2]) {
        let center = Self::centroid(points);
        for point in points.iter_mut() {
            *point -= center;
        }
    }

    /// Even-odd point containment test
    pub fn contains_point(&self, point: Vec2) -> bool {
        let local = point - self.position;
        let mut inside = false;
        let count = self.points.len();
        let mut j = count - 1;
        for i in 0..count {
            let pi = self.points[i];
            let pj = self.points[j];
            if (pi.y > local.y) != (pj.y > local.y)
                && local.x < (pj.x - pi.x) * (local.y - pi.y) / (pj.y - pi.y) + pi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Closest point on the polygon boundary to `point` (world space).
    ///
    /// Returns the point, its squared distance to `point`, and the outward
    /// normal of the edge it lies on.
    pub fn closest_point_to(&self, point: Vec2) -> (Vec2, f32, Vec2) {
        let local = point - self.position;
        let mut best_distance = f32::INFINITY;
        let mut best_point = Vec2::zeros();
        let mut best_normal = Vec2::zeros();

        let count = self.points.len();
        for i in 0..count {
            let a = self.points[i];
            let b = self.points[(i + 1) % count];
            let candidate = closest_point_on_segment(a, b, local);
            let distance = (local - candidate).magnitude_squared();
            if distance < best_distance {
                best_distance = distance;
                best_point = candidate;
                best_normal = self.edge_normals[i];
            }
        }

        (best_point + self.position, best_distance, best_normal)
    }

    /// Project the local vertices onto `axis`, returning `(min, max)`
    pub(crate) fn project_local(&self, axis: Vec2) -> (f32, f32) {
        self.points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), p| {
            let d = p.dot(&axis);
            (min.min(d), max.max(d))
        })
    }

    fn rebuild_edge_normals(&mut self) {
        let count = self.points.len();
        self.edge_normals = (0..count)
            .map(|i| safe_normalize(perpendicular(self.points[(i + 1) % count] - self.points[i])))
            .collect();
    }

    fn recalculate_bounds(&mut self) {
        self.bounds = Rect::from_points(self.world_points()).unwrap_or(Rect::ZERO);
    }
}

/// Twice the signed area; positive for counter-clockwise winding
fn signed_area(points: &[Vec2]) -> f32 {
    let count = points.len();
    (0..count).map(|i| cross(points[i], points[(i + 1) % count])).sum()
}
