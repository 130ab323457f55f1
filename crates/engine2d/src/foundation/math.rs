//! Math utilities and types
//!
//! Provides the 2D math vocabulary shared by the transform hierarchy and the
//! collision shapes: nalgebra vector/matrix aliases, an axis-aligned [`Rect`],
//! and a handful of vector helpers that never produce NaN.
//!
//! Matrices are homogeneous 3x3 (a 2x3 affine with an implicit `[0 0 1]` row)
//! and use nalgebra's column-vector convention, so `parent * child` applies
//! `child` first.

pub use nalgebra::{Matrix3, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Homogeneous 2D affine matrix type
pub type Mat3 = Matrix3<f32>;

/// Squared-length threshold below which a vector is treated as zero
pub const EPSILON: f32 = 1e-12;

/// Normalize `v`, returning the zero vector instead of NaN for zero-length input
pub fn safe_normalize(v: Vec2) -> Vec2 {
    let length_squared = v.magnitude_squared();
    if length_squared <= EPSILON || !length_squared.is_finite() {
        Vec2::zeros()
    } else {
        v / length_squared.sqrt()
    }
}

/// Perpendicular of `v` rotated a quarter turn clockwise: `(v.y, -v.x)`.
///
/// For counter-clockwise (y-up) polygons this is the outward edge normal.
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// 2D cross product (z component of the 3D cross product)
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Rotate `v` by `radians` around the origin
pub fn rotate_vector(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Apply an affine matrix to a position
pub fn transform_point(matrix: &Mat3, point: Vec2) -> Vec2 {
    matrix.transform_point(&Point2::from(point)).coords
}

/// Axis-aligned rectangle stored as a minimum corner plus size.
///
/// The "minimum" corner is the one with the smallest x and y; whether that is
/// top-left or bottom-left depends only on the caller's y convention.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Minimum x coordinate
    pub x: f32,
    /// Minimum y coordinate
    pub y: f32,
    /// Extent along x (non-negative)
    pub width: f32,
    /// Extent along y (non-negative)
    pub height: f32,
}

impl Rect {
    /// Empty rectangle at the origin
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    /// Create a rectangle from its minimum corner and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle spanning two corners
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Create a rectangle of `size` centered on `center`
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self::from_min_max(center - size * 0.5, center + size * 0.5)
    }

    /// Smallest rectangle containing every point, or `None` for an empty iterator
    pub fn from_points<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (
                Vec2::new(min.x.min(p.x), min.y.min(p.y)),
                Vec2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        Some(Self::from_min_max(min, max))
    }

    /// Minimum x
    pub fn min_x(&self) -> f32 {
        self.x
    }

    /// Maximum x
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// Minimum y
    pub fn min_y(&self) -> f32 {
        self.y
    }

    /// Maximum y
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.max_x(), self.max_y())
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Size as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Check whether the rectangles share interior area (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        other.min_x() < self.max_x()
            && self.min_x() < other.max_x()
            && other.min_y() < self.max_y()
            && self.min_y() < other.max_y()
    }

    /// Overlapping region of two rectangles, `None` if they do not intersect
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let min_x = self.min_x().max(other.min_x());
        let min_y = self.min_y().max(other.min_y());
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        if max_x > min_x && max_y > min_y {
            Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
        } else {
            None
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Copy of this rectangle moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Point inside (or on) the rectangle closest to `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min_x(), self.max_x()),
            point.y.clamp(self.min_y(), self.max_y()),
        )
    }

    /// Point on the rectangle border closest to `point`, with the normal of the edge it lies on.
    ///
    /// For points inside, the nearest edge wins (ties prefer min y, max y, min x, then max x).
    /// For points outside at a corner region the returned normal is diagonal and not unit length.
    pub fn closest_point_on_border(&self, point: Vec2) -> (Vec2, Vec2) {
        let mut edge_normal = Vec2::zeros();
        let mut result = self.closest_point(point);

        if self.contains(result) && result == point {
            let to_min_x = result.x - self.min_x();
            let to_max_x = self.max_x() - result.x;
            let to_min_y = result.y - self.min_y();
            let to_max_y = self.max_y() - result.y;
            let min = to_min_x.min(to_max_x).min(to_min_y).min(to_max_y);

            if min == to_min_y {
                result.y = self.min_y();
                edge_normal.y = -1.0;
            } else if min == to_max_y {
                result.y = self.max_y();
                edge_normal.y = 1.0;
            } else if min == to_min_x {
                result.x = self.min_x();
                edge_normal.x = -1.0;
            } else {
                result.x = self.max_x();
                edge_normal.x = 1.0;
            }
        } else {
            if result.x == self.min_x() {
                edge_normal.x = -1.0;
            }
            if result.x == self.max_x() {
                edge_normal.x = 1.0;
            }
            if result.y == self.min_y() {
                edge_normal.y = -1.0;
            }
            if result.y == self.max_y() {
                edge_normal.y = 1.0;
            }
        }

        (result, edge_normal)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn safe_normalize_zero_is_zero() {
        assert_eq!(safe_normalize(Vec2::zeros()), Vec2::zeros());
        assert_relative_eq!(safe_normalize(Vec2::new(3.0, 4.0)), Vec2::new(0.6, 0.8), epsilon = 1e-6);
    }

    #[test]
    fn rect_intersection_region() {
        let a = Rect::from_center_size(Vec2::zeros(), Vec2::new(10.0, 10.0));
        let b = Rect::from_center_size(Vec2::new(5.0, 0.0), Vec2::new(10.0, 10.0));
        let region = a.intersection(&b).expect("overlapping rects");
        assert_relative_eq!(region.width, 5.0);
        assert_relative_eq!(region.height, 10.0);

        let far = Rect::new(20.0, 0.0, 1.0, 1.0);
        assert!(a.intersection(&far).is_none());
        assert!(!a.intersects(&far));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(1.0, 0.0, 1.0, 1.0);
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn closest_point_on_border_from_inside_picks_nearest_edge() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let (point, normal) = rect.closest_point_on_border(Vec2::new(9.0, 5.0));
        assert_relative_eq!(point, Vec2::new(10.0, 5.0));
        assert_relative_eq!(normal, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn closest_point_on_border_from_outside_clamps() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let (point, normal) = rect.closest_point_on_border(Vec2::new(-4.0, 5.0));
        assert_relative_eq!(point, Vec2::new(0.0, 5.0));
        assert_relative_eq!(normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn rotate_vector_quarter_turn() {
        let rotated = rotate_vector(Vec2::new(1.0, 0.0), constants::HALF_PI);
        assert_relative_eq!(rotated, Vec2::new(0.0, 1.0), epsilon = 1e-6);
    }
}
