//! Primitive geometric queries shared by the shape algorithms
//!
//! Segment/segment intersection, closest points on segments, and the
//! hit records returned by the collision queries.

use crate::foundation::math::{cross, Vec2};

/// Result of a narrow-phase collision test.
///
/// Orientation is always from the perspective of the shape the query was
/// called on ("self"): `normal` points from the other shape toward self, and
/// subtracting `penetration` from self's position separates the two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    /// Unit contact normal, pointing from the other shape toward self
    pub normal: Vec2,
    /// Minimum translation vector; `self.position - penetration` resolves the overlap
    pub penetration: Vec2,
    /// Representative contact point, when the algorithm produces one
    pub point: Option<Vec2>,
}

impl CollisionHit {
    /// The same contact seen from the other shape
    pub fn inverted(self) -> Self {
        Self {
            normal: -self.normal,
            penetration: -self.penetration,
            point: self.point,
        }
    }

    /// Penetration depth along the normal
    pub fn depth(&self) -> f32 {
        self.penetration.magnitude()
    }
}

/// Result of a segment cast against a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCastHit {
    /// Fraction of the cast segment (0..=1) at which the hit occurred
    pub fraction: f32,
    /// Distance from the cast start to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec2,
    /// Unit surface normal at the hit point
    pub normal: Vec2,
}

/// Intersection of two segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentIntersection {
    /// Intersection point
    pub point: Vec2,
    /// Parameter along the first segment (0..=1)
    pub t: f32,
    /// Parameter along the second segment (0..=1)
    pub u: f32,
}

/// Intersect segment `a1..a2` with segment `b1..b2`.
///
/// Uses the parametric cross-product form; parallel and collinear segments
/// report no intersection.
pub fn line_to_line(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<SegmentIntersection> {
    let b = a2 - a1;
    let d = b2 - b1;
    let b_cross_d = cross(b, d);
    if b_cross_d == 0.0 {
        return None;
    }

    let c = b1 - a1;
    let t = cross(c, d) / b_cross_d;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let u = cross(c, b) / b_cross_d;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(SegmentIntersection {
        point: a1 + b * t,
        t,
        u,
    })
}

/// Closest point to `point` on the segment `a..b`
pub fn closest_point_on_segment(a: Vec2, b: Vec2, point: Vec2) -> Vec2 {
    let edge = b - a;
    let length_squared = edge.magnitude_squared();
    if length_squared == 0.0 {
        return a;
    }
    let t = ((point - a).dot(&edge) / length_squared).clamp(0.0, 1.0);
    a + edge * t
}

/// Fraction of `start..end` at which `point` lies, measured on the X axis and
/// falling back to Y when the segment is vertical
pub fn segment_fraction(start: Vec2, end: Vec2, point: Vec2) -> f32 {
    let fraction = (point.x - start.x) / (end.x - start.x);
    if fraction.is_nan() || fraction.is_infinite() {
        (point.y - start.y) / (end.y - start.y)
    } else {
        fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn crossing_segments_intersect_at_midpoints() {
        let hit = line_to_line(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
        )
        .expect("segments cross");
        assert_relative_eq!(hit.point, Vec2::new(5.0, 0.0));
        assert_relative_eq!(hit.t, 0.5);
        assert_relative_eq!(hit.u, 0.5);
    }

    #[test]
    fn parallel_and_disjoint_segments_do_not_intersect() {
        assert!(line_to_line(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
        )
        .is_none());
        assert!(line_to_line(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 0.0),
        )
        .is_none(), "collinear overlap is treated as no intersection");
        assert!(line_to_line(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
        )
        .is_none());
    }

    #[test]
    fn closest_point_clamps_to_segment_ends() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_relative_eq!(closest_point_on_segment(a, b, Vec2::new(4.0, 3.0)), Vec2::new(4.0, 0.0));
        assert_relative_eq!(closest_point_on_segment(a, b, Vec2::new(-4.0, 3.0)), a);
        assert_relative_eq!(closest_point_on_segment(a, a, Vec2::new(1.0, 1.0)), a);
    }

    #[test]
    fn vertical_segment_fraction_falls_back_to_y() {
        let fraction = segment_fraction(Vec2::new(2.0, 0.0), Vec2::new(2.0, 8.0), Vec2::new(2.0, 2.0));
        assert_relative_eq!(fraction, 0.25);
    }

    #[test]
    fn inverted_hit_flips_direction_only() {
        let hit = CollisionHit {
            normal: Vec2::new(1.0, 0.0),
            penetration: Vec2::new(-2.0, 0.0),
            point: Some(Vec2::new(3.0, 3.0)),
        };
        let inverted = hit.inverted();
        assert_eq!(inverted.normal, Vec2::new(-1.0, 0.0));
        assert_eq!(inverted.penetration, Vec2::new(2.0, 0.0));
        assert_eq!(inverted.point, hit.point);
    }
}
