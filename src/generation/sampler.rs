//! Uniform seed point sampling
//!
//! Draws seed points uniformly inside the square bounds. Draws that land
//! (almost) on top of an earlier point are redrawn, since coincident seeds
//! collapse Voronoi cells.

use rand::Rng;

use crate::config::Bounds;
use crate::error::{Result, TrackError};
use crate::geometry::Point2D;

/// Minimum seed separation as a fraction of the bounds extent
pub const DUPLICATE_EPSILON: f64 = 1e-6;

/// Redraws allowed per seed before giving up
const MAX_REDRAWS: usize = 64;

/// Sample `count` distinct points uniformly in `[min, max)²`
///
/// # Errors
///
/// Returns `InvalidConfig` if a point cannot be placed away from all
/// previous points within the redraw budget, which only happens when the
/// bounds are too small to separate the requested number of points.
pub fn sample_points<R: Rng>(count: usize, bounds: &Bounds, rng: &mut R) -> Result<Vec<Point2D>> {
    let min_separation = bounds.extent() * DUPLICATE_EPSILON;
    let mut points: Vec<Point2D> = Vec::with_capacity(count);

    for index in 0..count {
        let mut placed = false;
        for _ in 0..MAX_REDRAWS {
            let candidate = Point2D::new(
                rng.gen_range(bounds.min..bounds.max),
                rng.gen_range(bounds.min..bounds.max),
            );
            if points.iter().all(|p| p.distance(candidate) > min_separation) {
                points.push(candidate);
                placed = true;
                break;
            }
        }
        if !placed {
            return Err(TrackError::InvalidConfig(format!(
                "could not place seed {} of {} apart from earlier seeds in bounds {}..{}",
                index + 1,
                count,
                bounds.min,
                bounds.max
            )));
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_point_count_and_bounds() {
        let bounds = Bounds::new(-50.0, 80.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let points = sample_points(100, &bounds, &mut rng).unwrap();

        assert_eq!(points.len(), 100);
        for p in &points {
            assert!(p.x >= -50.0 && p.x < 80.0);
            assert!(p.y >= -50.0 && p.y < 80.0);
        }
    }

    #[test]
    fn test_determinism() {
        let bounds = Bounds::default();
        let a = sample_points(20, &bounds, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = sample_points(20, &bounds, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds() {
        let bounds = Bounds::default();
        let a = sample_points(20, &bounds, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        let b = sample_points(20, &bounds, &mut ChaCha8Rng::seed_from_u64(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_points_are_separated() {
        let bounds = Bounds::default();
        let points = sample_points(200, &bounds, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        let min_separation = bounds.extent() * DUPLICATE_EPSILON;
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                assert!(a.distance(*b) > min_separation);
            }
        }
    }
}
