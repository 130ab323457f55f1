//! Pairwise narrow-phase algorithms
//!
//! Every function returns a hit oriented from the second argument toward the
//! first. [`Shape`](super::Shape) picks the right function and inverts the
//! result for reversed pairs.

use crate::foundation::math::{perpendicular, safe_normalize, Rect, Vec2};
use super::polygon::Polygon;
use super::primitives::{line_to_line, segment_fraction, CollisionHit, LineCastHit};
use super::shape::{BoxShape, Circle};

/// Boolean circle overlap; touching circles do not overlap
pub fn circle_overlaps_circle(a: &Circle, b: &Circle) -> bool {
    let radii = a.radius() + b.radius();
    (a.position() - b.position()).magnitude_squared() < radii * radii
}

/// Boolean circle/rectangle overlap using the clamped closest point
pub fn circle_overlaps_rect(circle: &Circle, rect: &Rect) -> bool {
    let closest = rect.closest_point(circle.position());
    (closest - circle.position()).magnitude_squared() <= circle.radius() * circle.radius()
}

/// Circle against circle
pub fn circle_to_circle(first: &Circle, second: &Circle) -> Option<CollisionHit> {
    let offset = first.position() - second.position();
    let radii = first.radius() + second.radius();
    let distance_squared = offset.magnitude_squared();
    if distance_squared >= radii * radii {
        return None;
    }

    let normal = safe_normalize(offset);
    let depth = radii - distance_squared.sqrt();
    Some(CollisionHit {
        normal,
        penetration: -normal * depth,
        point: Some(second.position() + normal * second.radius()),
    })
}

/// Circle against an unrotated box
pub fn circle_to_box(circle: &Circle, rect: &BoxShape) -> Option<CollisionHit> {
    let bounds = rect.aabb();
    let center = circle.position();
    let radius = circle.radius();
    let (closest, edge_normal) = bounds.closest_point_on_border(center);

    // Centers on the border land here as well and get pushed out by the full radius
    if bounds.contains(center) {
        let normal = safe_normalize(edge_normal);
        let safe_place = closest + normal * radius;
        return Some(CollisionHit {
            normal,
            penetration: center - safe_place,
            point: Some(closest),
        });
    }

    let distance_squared = (closest - center).magnitude_squared();
    if distance_squared > radius * radius {
        return None;
    }

    let distance = distance_squared.sqrt();
    let normal = (center - closest) / distance;
    Some(CollisionHit {
        normal,
        penetration: normal * (distance - radius),
        point: Some(closest),
    })
}

/// Two unrotated boxes, resolved along the axis of least overlap
pub fn box_to_box(first: &BoxShape, second: &BoxShape) -> Option<CollisionHit> {
    let a = first.aabb();
    let b = second.aabb();
    let region = a.intersection(&b)?;
    let delta = a.center() - b.center();

    let penetration = if region.width <= region.height {
        Vec2::new(if delta.x < 0.0 { region.width } else { -region.width }, 0.0)
    } else {
        Vec2::new(0.0, if delta.y < 0.0 { region.height } else { -region.height })
    };

    Some(CollisionHit {
        normal: -safe_normalize(penetration),
        penetration,
        point: Some(region.center()),
    })
}

/// Separating axis test over the edge normals of both polygons
pub fn polygon_to_polygon(first: &Polygon, second: &Polygon) -> Option<CollisionHit> {
    let offset = first.position() - second.position();
    // Vertices need not surround the local origin, so orient by the centroids
    let facing = first.world_centroid() - second.world_centroid();
    let mut min_depth = f32::INFINITY;
    let mut best_axis = Vec2::zeros();

    for axis in first.edge_normals().iter().chain(second.edge_normals()) {
        let (mut min_a, mut max_a) = first.project_local(*axis);
        let (min_b, max_b) = second.project_local(*axis);
        let shift = offset.dot(axis);
        min_a += shift;
        max_a += shift;

        let distance = interval_distance(min_a, max_a, min_b, max_b);
        if distance >= 0.0 {
            return None;
        }

        let depth = -distance;
        if depth < min_depth {
            min_depth = depth;
            best_axis = if axis.dot(&facing) < 0.0 { -*axis } else { *axis };
        }
    }

    Some(CollisionHit {
        normal: best_axis,
        penetration: -best_axis * min_depth,
        point: None,
    })
}

/// Gap between two projected intervals; negative when they overlap
fn interval_distance(min_a: f32, max_a: f32, min_b: f32, max_b: f32) -> f32 {
    if min_a < min_b {
        min_b - max_a
    } else {
        min_a - max_b
    }
}

/// Circle against convex polygon
pub fn circle_to_polygon(circle: &Circle, polygon: &Polygon) -> Option<CollisionHit> {
    let center = circle.position();
    let radius = circle.radius();
    let (closest, distance_squared, edge_normal) = polygon.closest_point_to(center);
    let inside = polygon.contains_point(center);

    if !inside && distance_squared > radius * radius {
        return None;
    }

    let (normal, depth) = if inside {
        (edge_normal, distance_squared.sqrt() + radius)
    } else if distance_squared == 0.0 {
        (edge_normal, radius)
    } else {
        let distance = distance_squared.sqrt();
        ((center - closest) / distance, radius - distance)
    };

    Some(CollisionHit {
        normal,
        penetration: -normal * depth,
        point: Some(closest),
    })
}

/// Nearest crossing of `start..end` with any polygon edge
pub fn line_to_polygon(start: Vec2, end: Vec2, polygon: &Polygon) -> Option<LineCastHit> {
    let points: Vec<Vec2> = polygon.world_points().collect();
    let mut best: Option<(f32, Vec2, Vec2)> = None;

    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let edge_start = points[j];
        let edge_end = points[i];
        if let Some(hit) = line_to_line(edge_start, edge_end, start, end) {
            let fraction = segment_fraction(start, end, hit.point);
            if best.map_or(true, |(best_fraction, _, _)| fraction < best_fraction) {
                best = Some((fraction, hit.point, perpendicular(edge_end - edge_start)));
            }
        }
        j = i;
    }

    best.map(|(fraction, point, normal)| LineCastHit {
        fraction,
        distance: (point - start).magnitude(),
        point,
        normal: safe_normalize(normal),
    })
}

/// Segment against circle, solved as a clamped ray/circle quadratic
pub fn line_to_circle(start: Vec2, end: Vec2, circle: &Circle) -> Option<LineCastHit> {
    let length = (end - start).magnitude();
    if length == 0.0 {
        return None;
    }
    let direction = (end - start) / length;
    let from_center = start - circle.position();
    let b = from_center.dot(&direction);
    let c = from_center.magnitude_squared() - circle.radius() * circle.radius();

    // Starting outside and pointing away
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let distance = (-b - discriminant.sqrt()).max(0.0);
    if distance > length {
        return None;
    }

    let point = start + direction * distance;
    Some(LineCastHit {
        fraction: distance / length,
        distance,
        point,
        normal: safe_normalize(point - circle.position()),
    })
}

/// Push a point out of a circle
pub fn point_to_circle(point: Vec2, circle: &Circle) -> Option<CollisionHit> {
    let offset = point - circle.position();
    let distance_squared = offset.magnitude_squared();
    if distance_squared > circle.radius() * circle.radius() {
        return None;
    }

    let normal = safe_normalize(offset);
    let depth = circle.radius() - distance_squared.sqrt();
    Some(CollisionHit {
        normal,
        penetration: -normal * depth,
        point: Some(circle.position() + normal * circle.radius()),
    })
}

/// Push a point out of a rectangle through its nearest edge
pub fn point_to_rect(point: Vec2, rect: &Rect) -> Option<CollisionHit> {
    if !rect.contains(point) {
        return None;
    }

    let (border, edge_normal) = rect.closest_point_on_border(point);
    Some(CollisionHit {
        normal: edge_normal,
        penetration: point - border,
        point: Some(border),
    })
}

/// Push a point out of a polygon through its nearest edge
pub fn point_to_polygon(point: Vec2, polygon: &Polygon) -> Option<CollisionHit> {
    if !polygon.contains_point(point) {
        return None;
    }

    let (closest, _, edge_normal) = polygon.closest_point_to(point);
    Some(CollisionHit {
        normal: edge_normal,
        penetration: point - closest,
        point: Some(closest),
    })
}
