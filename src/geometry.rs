//! Planar geometry primitives shared by the pipeline stages
//!
//! All polygons here are implicitly closed: the edge `i` runs from
//! `points[i]` to `points[(i + 1) % n]`.

use glam::DVec2;

/// A point (or vector) in the working plane
pub type Point2D = DVec2;

/// Twice the signed area of triangle `abc` (positive when counter-clockwise)
#[inline]
pub fn orient(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    (b - a).perp_dot(c - a)
}

/// `p` is assumed collinear with `ab`; checks that it lies within the segment
#[inline]
fn within_segment(a: Point2D, b: Point2D, p: Point2D) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed segment intersection test (touching counts as intersecting)
pub fn segments_intersect(a: Point2D, b: Point2D, c: Point2D, d: Point2D) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_segment(c, d, a))
        || (d2 == 0.0 && within_segment(c, d, b))
        || (d3 == 0.0 && within_segment(a, b, c))
        || (d4 == 0.0 && within_segment(a, b, d))
}

/// Two edges meeting at `shared` fold back onto each other
pub(crate) fn folds_back(shared: Point2D, a: Point2D, b: Point2D) -> bool {
    orient(shared, a, b) == 0.0 && (a - shared).dot(b - shared) > 0.0
}

/// Edges `i` and `j` of an `n`-gon share a vertex
#[inline]
pub fn edges_adjacent(i: usize, j: usize, n: usize) -> bool {
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    hi == lo + 1 || (lo == 0 && hi == n - 1)
}

/// Collect pairs of edges that violate simplicity
///
/// Non-adjacent edges may not touch at all; adjacent edges may only share
/// their common vertex. Zero-length edges are reported as `(i, i)`.
/// Stops after `limit` violations.
pub fn edge_violations(points: &[Point2D], limit: usize) -> Vec<(usize, usize)> {
    let n = points.len();
    let mut violations = Vec::new();
    if n < 3 {
        return violations;
    }

    let edge = |i: usize| (points[i], points[(i + 1) % n]);
    let bbox = |i: usize| {
        let (a, b) = edge(i);
        (a.min(b), a.max(b))
    };

    for i in 0..n {
        let (a, b) = edge(i);
        if a == b {
            violations.push((i, i));
            if violations.len() >= limit {
                return violations;
            }
            continue;
        }
        let (min_i, max_i) = bbox(i);

        for j in (i + 1)..n {
            let (c, d) = edge(j);
            let (min_j, max_j) = bbox(j);
            if max_i.x < min_j.x || max_j.x < min_i.x || max_i.y < min_j.y || max_j.y < min_i.y {
                continue;
            }

            let bad = if edges_adjacent(i, j, n) {
                if j == i + 1 {
                    folds_back(b, a, d)
                } else {
                    // i == 0, j == n - 1: the shared vertex is points[0]
                    folds_back(a, b, c)
                }
            } else {
                segments_intersect(a, b, c, d)
            };

            if bad {
                violations.push((i, j));
                if violations.len() >= limit {
                    return violations;
                }
            }
        }
    }

    violations
}

/// Check that a closed polygon is simple (no edge touches a non-adjacent edge)
pub fn is_simple_polygon(points: &[Point2D]) -> bool {
    points.len() >= 3 && signed_area(points) != 0.0 && edge_violations(points, 1).is_empty()
}

/// Shoelace area; positive for counter-clockwise winding
pub fn signed_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum();
    twice * 0.5
}

/// Length of the closed polyline
pub fn perimeter(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| points[i].distance(points[(i + 1) % n])).sum()
}

/// Area-weighted centroid of a closed polygon
///
/// Falls back to the vertex mean for degenerate (zero-area) input.
pub fn polygon_centroid(points: &[Point2D]) -> Point2D {
    let n = points.len();
    if n == 0 {
        return Point2D::ZERO;
    }
    let area = signed_area(points);
    if area.abs() < f64::EPSILON {
        return mean(points);
    }

    let mut acc = Point2D::ZERO;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        acc += (p + q) * p.perp_dot(q);
    }
    acc / (6.0 * area)
}

/// Arithmetic mean of a point set
pub fn mean(points: &[Point2D]) -> Point2D {
    if points.is_empty() {
        return Point2D::ZERO;
    }
    points.iter().copied().sum::<Point2D>() / points.len() as f64
}

/// Wrap an angle into (-π, π]
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}
