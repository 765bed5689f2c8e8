//! Region sampling
//!
//! Draws random seed points in the bounds, computes their Delaunay
//! adjacency and the clipped Voronoi regions, and picks the working subset
//! used for loop construction.

pub mod delaunay;
pub mod sampler;
pub mod voronoi;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::tessellation::Tessellation;

/// First pipeline stage: configuration → tessellation
pub struct RegionSampler;

impl RegionSampler {
    /// Generate a tessellation from configuration
    ///
    /// The random source is a `ChaCha8Rng` seeded from `config.seed`, so the
    /// same configuration always yields a bit-identical tessellation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` before any geometry work if the configuration
    /// is invalid (e.g. `point_count < 4`).
    pub fn generate(config: &GenerationConfig) -> Result<Tessellation> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::generate_with_rng(config, &mut rng)
    }

    /// Generate a tessellation drawing from a caller-provided random source
    pub fn generate_with_rng<R: Rng>(config: &GenerationConfig, rng: &mut R) -> Result<Tessellation> {
        config.validate()?;

        // Step 1: Random seed points in the bounds
        let seeds = sampler::sample_points(config.point_count, &config.bounds, rng)?;

        // Step 2: Delaunay adjacency
        let adjacency = delaunay::delaunay_adjacency(&seeds)?;

        // Step 3: Voronoi regions clipped to the bounds
        let regions = voronoi::build_regions(&seeds, &adjacency, &config.bounds);

        // Step 4: Working subset and the loop builder's seed
        let mut selection_order: Vec<usize> = (0..seeds.len()).collect();
        selection_order.shuffle(rng);
        let policy_seed: u64 = rng.gen();

        debug!(
            seeds = seeds.len(),
            edges = adjacency.iter().map(Vec::len).sum::<usize>() / 2,
            region_count = config.region_count,
            "tessellation built"
        );

        Ok(Tessellation::new(
            seeds,
            regions,
            adjacency,
            config.bounds,
            selection_order,
            config.region_count,
            policy_seed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfigBuilder;
    use crate::error::TrackError;

    fn config(seed: u64) -> GenerationConfig {
        GenerationConfigBuilder::new().seed(seed).build().unwrap()
    }

    #[test]
    fn test_generate_tessellation() {
        let tessellation = RegionSampler::generate(&config(42)).unwrap();

        assert_eq!(tessellation.seed_count(), 20);
        assert_eq!(tessellation.regions().len(), 20);
        assert_eq!(tessellation.working_seeds().len(), 10);

        for region in tessellation.regions() {
            assert!(region.neighbor_count() > 0, "Region should have neighbors");
            assert!(region.vertex_count() >= 3);
        }
    }

    #[test]
    fn test_selection_order_is_permutation() {
        let tessellation = RegionSampler::generate(&config(9)).unwrap();
        let mut order = tessellation.selection_order().to_vec();
        order.sort_unstable();
        assert_eq!(order, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_determinism() {
        let a = RegionSampler::generate(&config(1234)).unwrap();
        let b = RegionSampler::generate(&config(1234)).unwrap();
        assert_eq!(a, b);

        let c = RegionSampler::generate(&config(4321)).unwrap();
        assert_ne!(a.seeds(), c.seeds());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GenerationConfig {
            point_count: 3,
            ..GenerationConfig::default()
        };
        let result = RegionSampler::generate(&config);
        assert!(matches!(result, Err(TrackError::InvalidConfig(_))));
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_region_at_seed() {
        let tessellation = RegionSampler::generate(&config(5)).unwrap();
        for region in tessellation.regions() {
            assert_eq!(tessellation.region_at(region.seed), region.id);
        }
    }
}
