//! Voronoi cell construction from Delaunay adjacency
//!
//! A seed's Voronoi cell is the intersection of the half-planes closer to
//! it than to each Delaunay neighbor. Starting from the bounds rectangle and
//! clipping by every neighbor bisector yields the cell restricted to the
//! bounding box.

use crate::config::Bounds;
use crate::geometry::Point2D;
use crate::region::Region;

/// Build one clipped region per seed
///
/// # Arguments
///
/// * `seeds` - Seed points
/// * `adjacency` - Delaunay adjacency (`adjacency[i]` lists neighbors of seed `i`)
/// * `bounds` - Clipping square
pub fn build_regions(seeds: &[Point2D], adjacency: &[Vec<usize>], bounds: &Bounds) -> Vec<Region> {
    seeds
        .iter()
        .enumerate()
        .map(|(id, &seed)| {
            let neighbors = adjacency[id].clone();
            let vertices = clip_cell(seed, neighbors.iter().map(|&n| seeds[n]), bounds);
            Region::new(id, seed, neighbors, vertices)
        })
        .collect()
}

/// Bounds rectangle as a counter-clockwise polygon
fn bounds_polygon(bounds: &Bounds) -> Vec<Point2D> {
    vec![
        Point2D::new(bounds.min, bounds.min),
        Point2D::new(bounds.max, bounds.min),
        Point2D::new(bounds.max, bounds.max),
        Point2D::new(bounds.min, bounds.max),
    ]
}

/// Clip the bounds rectangle by the bisectors between `seed` and each neighbor
fn clip_cell<I>(seed: Point2D, neighbors: I, bounds: &Bounds) -> Vec<Point2D>
where
    I: IntoIterator<Item = Point2D>,
{
    let mut polygon = bounds_polygon(bounds);

    for neighbor in neighbors {
        let midpoint = (seed + neighbor) * 0.5;
        let normal = neighbor - seed;
        polygon = clip_half_plane(&polygon, midpoint, normal);
        if polygon.is_empty() {
            break;
        }
    }

    polygon
}

/// Sutherland-Hodgman step: keep the part of `polygon` where
/// `dot(p - origin, normal) <= 0`
fn clip_half_plane(polygon: &[Point2D], origin: Point2D, normal: Point2D) -> Vec<Point2D> {
    let n = polygon.len();
    let mut out = Vec::with_capacity(n + 1);
    let side = |p: Point2D| (p - origin).dot(normal);

    for i in 0..n {
        let current = polygon[i];
        let next = polygon[(i + 1) % n];
        let s_current = side(current);
        let s_next = side(next);

        if s_current <= 0.0 {
            out.push(current);
        }
        if (s_current < 0.0 && s_next > 0.0) || (s_current > 0.0 && s_next < 0.0) {
            let t = s_current / (s_current - s_next);
            out.push(current + (next - current) * t);
        }
    }

    out
}
