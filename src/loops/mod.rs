//! Closed-loop construction over a tessellation
//!
//! Three policies turn the working seeds into a simple closed polygon:
//!
//! - [`Mode::Random`]: angular ordering around the working-set centroid
//! - [`Mode::Extend`]: depth-first walk of the Delaunay graph
//! - [`Mode::Expand`]: cheapest-insertion growth from a seed triangle
//!
//! The mode is dispatched once per run in [`LoopBuilder::build`].

mod expand;
mod extend;
mod random;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::Mode;
use crate::error::{Result, TrackError};
use crate::geometry::{is_simple_polygon, perimeter, signed_area, Point2D};
use crate::tessellation::Tessellation;

pub use extend::MAX_EXTEND_EXPANSIONS;
pub use random::MIN_INTERIOR_FACTOR;

/// Relative distance below which consecutive loop points are merged
const COINCIDENT_EPSILON: f64 = 1e-9;

/// Ordered, implicitly closed polygon through selected seeds
///
/// Always holds at least 3 distinct points and never self-intersects.
/// `seed_ids[i]` is the tessellation seed that produced `points[i]`; the
/// point may sit closer to the centroid than the seed (Random mode).
#[derive(Debug, Clone, PartialEq)]
pub struct RawLoop {
    points: Vec<Point2D>,
    seed_ids: Vec<usize>,
}

impl RawLoop {
    /// Validate and wrap a candidate loop
    ///
    /// Consecutive coincident points (including last → first) are merged
    /// along with their seed ids.
    ///
    /// # Errors
    ///
    /// Returns `LoopConstructionFailed` if fewer than 3 distinct points remain
    /// or the polygon is not simple.
    pub fn new(points: Vec<Point2D>, seed_ids: Vec<usize>) -> Result<Self> {
        if points.len() != seed_ids.len() {
            return Err(TrackError::LoopConstructionFailed(format!(
                "{} points but {} seed ids",
                points.len(),
                seed_ids.len()
            )));
        }

        let scale = points
            .iter()
            .fold(1.0_f64, |acc, p| acc.max(p.x.abs()).max(p.y.abs()));
        let epsilon = scale * COINCIDENT_EPSILON;

        let mut kept_points: Vec<Point2D> = Vec::with_capacity(points.len());
        let mut kept_ids: Vec<usize> = Vec::with_capacity(seed_ids.len());
        for (p, id) in points.into_iter().zip(seed_ids) {
            if kept_points.last().map_or(true, |last| last.distance(p) > epsilon) {
                kept_points.push(p);
                kept_ids.push(id);
            }
        }
        while kept_points.len() > 1
            && kept_points[0].distance(kept_points[kept_points.len() - 1]) <= epsilon
        {
            kept_points.pop();
            kept_ids.pop();
        }

        if kept_points.len() < 3 {
            return Err(TrackError::LoopConstructionFailed(format!(
                "only {} distinct points",
                kept_points.len()
            )));
        }
        if !is_simple_polygon(&kept_points) {
            return Err(TrackError::LoopConstructionFailed(
                "loop is not a simple polygon".to_string(),
            ));
        }

        Ok(Self {
            points: kept_points,
            seed_ids: kept_ids,
        })
    }

    /// Number of vertices
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed loop
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    #[inline]
    pub fn seed_ids(&self) -> &[usize] {
        &self.seed_ids
    }

    /// Closed polyline length
    pub fn perimeter(&self) -> f64 {
        perimeter(&self.points)
    }

    /// Shoelace area (positive when counter-clockwise)
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    pub fn is_simple(&self) -> bool {
        is_simple_polygon(&self.points)
    }
}

/// Second pipeline stage: tessellation → raw loop
pub struct LoopBuilder;

impl LoopBuilder {
    /// Build a closed loop through `region_count` seeds using `mode`
    ///
    /// The working set is the first `region_count` seeds of the tessellation's
    /// selection order. Randomized choices draw from a generator seeded with
    /// the tessellation's policy seed, so the result is deterministic.
    ///
    /// # Errors
    ///
    /// Returns `LoopConstructionFailed` if `region_count` is below 3 or above
    /// the seed count, or if the mode cannot produce a simple loop.
    pub fn build(tessellation: &Tessellation, mode: Mode, region_count: usize) -> Result<RawLoop> {
        if region_count < 3 {
            return Err(TrackError::LoopConstructionFailed(format!(
                "a closed loop needs at least 3 regions (got {})",
                region_count
            )));
        }
        if region_count > tessellation.seed_count() {
            return Err(TrackError::LoopConstructionFailed(format!(
                "region_count {} exceeds seed count {}",
                region_count,
                tessellation.seed_count()
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(tessellation.policy_seed());

        let raw_loop = match mode {
            Mode::Random => random::build(tessellation, region_count, &mut rng)?,
            Mode::Extend => extend::build(tessellation, region_count)?,
            Mode::Expand => expand::build(tessellation, region_count)?,
        };

        debug!(
            mode = mode.name(),
            vertices = raw_loop.len(),
            perimeter = raw_loop.perimeter(),
            "raw loop built"
        );

        Ok(raw_loop)
    }
}

/// Look up seed positions for a list of ids
fn seed_points(tessellation: &Tessellation, ids: &[usize]) -> Vec<Point2D> {
    let seeds = tessellation.seeds();
    ids.iter().map(|&id| seeds[id]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfigBuilder;
    use crate::generation::RegionSampler;

    fn tessellation(seed: u64) -> Tessellation {
        let config = GenerationConfigBuilder::new().seed(seed).build().unwrap();
        RegionSampler::generate(&config).unwrap()
    }

    #[test]
    fn test_raw_loop_validation() {
        let square = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ];
        let raw = RawLoop::new(square.clone(), vec![0, 1, 2, 3]).unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(raw.perimeter(), 40.0);
        assert!(raw.signed_area() > 0.0);

        let bowtie = vec![square[0], square[2], square[1], square[3]];
        let result = RawLoop::new(bowtie, vec![0, 2, 1, 3]);
        assert!(matches!(result, Err(TrackError::LoopConstructionFailed(_))));
    }

    #[test]
    fn test_raw_loop_merges_duplicates() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 0.0),
        ];
        let raw = RawLoop::new(points, vec![0, 1, 1, 2, 0]).unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw.seed_ids(), &[0, 1, 2]);

        let collapsed = vec![Point2D::new(1.0, 1.0); 4];
        assert!(RawLoop::new(collapsed, vec![0, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_region_count_limits() {
        let tess = tessellation(42);
        for mode in Mode::ALL {
            assert!(matches!(
                LoopBuilder::build(&tess, mode, 2),
                Err(TrackError::LoopConstructionFailed(_))
            ));
            assert!(matches!(
                LoopBuilder::build(&tess, mode, 21),
                Err(TrackError::LoopConstructionFailed(_))
            ));
        }
    }

    #[test]
    fn test_all_modes_deterministic() {
        let tess = tessellation(7);
        for mode in Mode::ALL {
            let a = LoopBuilder::build(&tess, mode, 10);
            let b = LoopBuilder::build(&tess, mode, 10);
            assert_eq!(a, b, "{} must be deterministic", mode.name());
        }
    }

    #[test]
    fn test_loops_are_simple() {
        for seed in 0..10 {
            let tess = tessellation(seed);
            for mode in Mode::ALL {
                match LoopBuilder::build(&tess, mode, 10) {
                    Ok(raw) => {
                        assert!(raw.is_simple());
                        assert!(raw.len() >= 3 && raw.len() <= 10);
                    }
                    Err(e) => {
                        assert_ne!(mode, Mode::Random, "angular ordering always closes: {}", e);
                        assert!(matches!(e, TrackError::LoopConstructionFailed(_)));
                    }
                }
            }
        }
    }
}
