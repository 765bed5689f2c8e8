//! Random mode: star-shaped loop around the working-set centroid
//!
//! Hull seeds stay put; interior seeds are pulled radially toward the
//! centroid by a random factor, then every point is ordered by angle. A
//! polygon ordered by angle around a point inside its hull cannot cross
//! itself.

use parry2d_f64::math::Point;
use parry2d_f64::transformation;
use rand::Rng;

use super::{seed_points, RawLoop};
use crate::error::{Result, TrackError};
use crate::geometry::{mean, Point2D};
use crate::tessellation::Tessellation;

/// Lower bound of the radial pull applied to interior seeds
pub const MIN_INTERIOR_FACTOR: f64 = 0.75;

pub(super) fn build<R: Rng>(
    tessellation: &Tessellation,
    region_count: usize,
    rng: &mut R,
) -> Result<RawLoop> {
    let ids = tessellation.working_subset(region_count).to_vec();
    let seeds = seed_points(tessellation, &ids);

    let hull_points: Vec<Point<f64>> = seeds.iter().map(|p| Point::new(p.x, p.y)).collect();
    let hull = transformation::convex_hull_idx(&hull_points);
    if hull.len() < 3 {
        return Err(TrackError::LoopConstructionFailed(format!(
            "working seeds are collinear (hull has {} points)",
            hull.len()
        )));
    }

    let mut on_hull = vec![false; seeds.len()];
    for &i in &hull {
        on_hull[i] = true;
    }

    let centroid = mean(&seeds);

    // Draw factors in index order so the sequence is independent of sorting
    let points: Vec<Point2D> = seeds
        .iter()
        .zip(&on_hull)
        .map(|(&p, &hull_vertex)| {
            if hull_vertex {
                p
            } else {
                let factor = rng.gen_range(MIN_INTERIOR_FACTOR..=1.0);
                centroid + (p - centroid) * factor
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        let da = points[a] - centroid;
        let db = points[b] - centroid;
        da.y.atan2(da.x)
            .total_cmp(&db.y.atan2(db.x))
            .then(da.length_squared().total_cmp(&db.length_squared()))
    });

    let loop_points = order.iter().map(|&i| points[i]).collect();
    let loop_ids = order.iter().map(|&i| ids[i]).collect();
    RawLoop::new(loop_points, loop_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfigBuilder;
    use crate::generation::RegionSampler;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_loop_uses_working_seeds() {
        let config = GenerationConfigBuilder::new().seed(42).build().unwrap();
        let tess = RegionSampler::generate(&config).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let raw = build(&tess, 10, &mut rng).unwrap();

        assert_eq!(raw.len(), 10);
        assert!(raw.is_simple());
        // Counter-clockwise by construction
        assert!(raw.signed_area() > 0.0);

        let mut ids = raw.seed_ids().to_vec();
        ids.sort_unstable();
        let mut working = tess.working_seeds().to_vec();
        working.sort_unstable();
        assert_eq!(ids, working);
    }

    #[test]
    fn test_interior_points_move_inward() {
        let config = GenerationConfigBuilder::new().seed(3).build().unwrap();
        let tess = RegionSampler::generate(&config).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let raw = build(&tess, 10, &mut rng).unwrap();
        let seeds: Vec<Point2D> = tess.working_seeds().iter().map(|&i| tess.seeds()[i]).collect();
        let centroid = mean(&seeds);

        for (&p, &id) in raw.points().iter().zip(raw.seed_ids()) {
            let seed = tess.seeds()[id];
            let ratio = p.distance(centroid) / seed.distance(centroid);
            assert!(ratio >= MIN_INTERIOR_FACTOR - 1e-9 && ratio <= 1.0 + 1e-9);
        }
    }
}
