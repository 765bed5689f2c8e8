//! Expand mode: cheapest-insertion growth
//!
//! Starts from a wide triangle of working seeds and repeatedly inserts the
//! seed whose insertion adds the least perimeter, skipping insertions that
//! would make the loop self-intersect. Working seeds are preferred; reserve
//! seeds are only used, in selection order, once no working seed fits.

use tracing::debug;

use super::{seed_points, RawLoop};
use crate::error::{Result, TrackError};
use crate::geometry::{folds_back, orient, segments_intersect, Point2D};
use crate::tessellation::Tessellation;

/// A candidate insertion of `seed` into edge `edge`
#[derive(Debug, Clone, Copy)]
struct Insertion {
    seed: usize,
    edge: usize,
    cost: f64,
}

pub(super) fn build(tessellation: &Tessellation, region_count: usize) -> Result<RawLoop> {
    let seeds = tessellation.seeds();
    let working = tessellation.working_subset(region_count);
    let reserve = &tessellation.selection_order()[working.len()..];

    let mut ring = start_triangle(seeds, working, reserve)?;
    let mut in_ring = vec![false; seeds.len()];
    for &id in &ring {
        in_ring[id] = true;
    }

    let mut reserve_used = 0usize;

    while ring.len() < region_count {
        let pending: Vec<usize> = working.iter().copied().filter(|&id| !in_ring[id]).collect();

        let insertion = match cheapest_insertion(seeds, &ring, &pending) {
            Some(insertion) => insertion,
            None => {
                let fallback = reserve
                    .iter()
                    .copied()
                    .filter(|&id| !in_ring[id])
                    .find_map(|id| cheapest_insertion(seeds, &ring, &[id]));
                match fallback {
                    Some(insertion) => {
                        reserve_used += 1;
                        insertion
                    }
                    None => {
                        return Err(TrackError::LoopConstructionFailed(format!(
                            "no seed can be inserted into a loop of {} vertices",
                            ring.len()
                        )))
                    }
                }
            }
        };

        ring.insert(insertion.edge + 1, insertion.seed);
        in_ring[insertion.seed] = true;
    }

    debug!(vertices = ring.len(), reserve_used, "expand loop grown");

    let points = seed_points(tessellation, &ring);
    RawLoop::new(points, ring)
}

/// Counter-clockwise start triangle: the first working seed, the seed
/// farthest from it and the seed spanning the largest triangle with both
fn start_triangle(seeds: &[Point2D], working: &[usize], reserve: &[usize]) -> Result<Vec<usize>> {
    let &first = working.first().ok_or_else(|| {
        TrackError::LoopConstructionFailed("empty working set".to_string())
    })?;
    let a = seeds[first];

    let far = working
        .iter()
        .copied()
        .filter(|&id| id != first)
        .max_by(|&x, &y| a.distance_squared(seeds[x]).total_cmp(&a.distance_squared(seeds[y])))
        .ok_or_else(|| TrackError::LoopConstructionFailed("working set too small".to_string()))?;
    let b = seeds[far];

    let widest = |pool: &[usize]| {
        pool.iter()
            .copied()
            .filter(|&id| id != first && id != far)
            .map(|id| (id, orient(a, b, seeds[id])))
            .filter(|&(_, area)| area != 0.0)
            .max_by(|x, y| x.1.abs().total_cmp(&y.1.abs()))
    };

    let (third, area) = widest(working).or_else(|| widest(reserve)).ok_or_else(|| {
        TrackError::LoopConstructionFailed("all seeds are collinear".to_string())
    })?;

    if area > 0.0 {
        Ok(vec![first, far, third])
    } else {
        Ok(vec![first, third, far])
    }
}

/// Cheapest simplicity-preserving insertion of any candidate into the ring
fn cheapest_insertion(seeds: &[Point2D], ring: &[usize], candidates: &[usize]) -> Option<Insertion> {
    let n = ring.len();
    let mut options: Vec<Insertion> = Vec::with_capacity(candidates.len() * n);
    for &seed in candidates {
        let p = seeds[seed];
        for edge in 0..n {
            let a = seeds[ring[edge]];
            let b = seeds[ring[(edge + 1) % n]];
            let cost = a.distance(p) + p.distance(b) - a.distance(b);
            options.push(Insertion { seed, edge, cost });
        }
    }

    // Stable: ties keep candidate order, then edge order
    options.sort_by(|x, y| x.cost.total_cmp(&y.cost));
    options
        .into_iter()
        .find(|option| insertion_is_simple(seeds, ring, option.seed, option.edge))
}

/// Check that replacing edge `edge` by `a → p → b` keeps the ring simple
fn insertion_is_simple(seeds: &[Point2D], ring: &[usize], seed: usize, edge: usize) -> bool {
    let n = ring.len();
    let vertex = |i: usize| seeds[ring[i % n]];
    let p = seeds[seed];
    let a = vertex(edge);
    let b = vertex(edge + 1);

    if p == a || p == b || folds_back(p, a, b) {
        return false;
    }

    let before = (edge + n - 1) % n;
    let after = (edge + 1) % n;

    for k in 0..n {
        if k == edge {
            continue;
        }
        let c = vertex(k);
        let d = vertex(k + 1);

        // a → p shares `a` with the previous edge
        let ap_bad = if k == before {
            folds_back(a, c, p)
        } else {
            segments_intersect(a, p, c, d)
        };
        // p → b shares `b` with the next edge
        let pb_bad = if k == after {
            folds_back(b, p, d)
        } else {
            segments_intersect(p, b, c, d)
        };

        if ap_bad || pb_bad {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfigBuilder;
    use crate::generation::RegionSampler;

    #[test]
    fn test_expand_reaches_region_count() {
        let config = GenerationConfigBuilder::new().seed(42).build().unwrap();
        let tess = RegionSampler::generate(&config).unwrap();

        let raw = build(&tess, 10).unwrap();

        assert_eq!(raw.len(), 10);
        assert!(raw.is_simple());
    }

    #[test]
    fn test_start_triangle_is_ccw() {
        let seeds = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(5.0, -4.0),
        ];
        let triangle = start_triangle(&seeds, &[0, 1, 2, 3], &[]).unwrap();

        assert_eq!(triangle[0], 0);
        let [a, b, c] = [seeds[triangle[0]], seeds[triangle[1]], seeds[triangle[2]]];
        assert!(orient(a, b, c) > 0.0);
        // Seed 3 spans the larger triangle with 0 and 2
        assert!(triangle.contains(&2) && triangle.contains(&3));
    }

    #[test]
    fn test_insertion_rejects_crossing() {
        let seeds = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
            Point2D::new(5.0, 20.0),
        ];
        let ring = [0, 1, 2, 3];

        // Above the top edge: fine between 2 and 3
        assert!(insertion_is_simple(&seeds, &ring, 4, 2));
        // Between 0 and 1 the new edges would cut through the square
        assert!(!insertion_is_simple(&seeds, &ring, 4, 0));
    }

    #[test]
    fn test_collinear_seeds_fail() {
        let seeds: Vec<Point2D> = (0..5).map(|i| Point2D::new(i as f64, i as f64)).collect();
        let result = start_triangle(&seeds, &[0, 1, 2], &[3, 4]);
        assert!(matches!(result, Err(TrackError::LoopConstructionFailed(_))));
    }
}
