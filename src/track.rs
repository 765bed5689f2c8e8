//! Track main structure and pipeline orchestration

use tracing::info;

use crate::boundary::{BoundaryOffsetter, BoundaryPair};
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::export::{build_export, TrackExport};
use crate::generation::RegionSampler;
use crate::loops::{LoopBuilder, RawLoop};
use crate::projection::{CoordinateProjector, GeoPoint};
use crate::smoothing::{Centerline, CenterlineSmoother};
use crate::tessellation::Tessellation;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A fully generated track with every intermediate stage
///
/// Each stage is an immutable value produced from the previous one, so a
/// run can be inspected (or a stage re-run) at any point of the chain.
///
/// # Examples
///
/// ```
/// use voronoi_track_gen::*;
///
/// let config = GenerationConfigBuilder::new()
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let track = TrackGenerator::generate(&config).unwrap();
/// println!("{} cones per side", track.boundaries().len());
///
/// assert_eq!(track.raw_loop().len(), 10);
/// assert_eq!(track.boundaries().len(), track.centerline().len());
/// ```
#[derive(Debug, Clone)]
pub struct Track {
    /// Configuration used to generate this track
    config: GenerationConfig,

    /// Seeds, regions and Delaunay adjacency
    tessellation: Tessellation,

    /// Closed loop through the selected seeds
    raw_loop: RawLoop,

    /// Smoothed, resampled loop
    centerline: Centerline,

    /// Planar cone positions
    boundaries: BoundaryPair,

    /// Geographic cone positions (only with a configured anchor)
    geo_boundaries: Option<BoundaryPair<GeoPoint>>,
}

impl Track {
    /// Get the configuration used to generate this track
    #[inline]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    #[inline]
    pub fn tessellation(&self) -> &Tessellation {
        &self.tessellation
    }

    #[inline]
    pub fn raw_loop(&self) -> &RawLoop {
        &self.raw_loop
    }

    #[inline]
    pub fn centerline(&self) -> &Centerline {
        &self.centerline
    }

    /// Planar left/right cones in metres
    #[inline]
    pub fn boundaries(&self) -> &BoundaryPair {
        &self.boundaries
    }

    /// Geographic left/right cones, if the config carries an anchor
    #[inline]
    pub fn geo_boundaries(&self) -> Option<&BoundaryPair<GeoPoint>> {
        self.geo_boundaries.as_ref()
    }

    /// Centerline length in metres
    pub fn length(&self) -> f64 {
        self.centerline.length()
    }

    /// Check whether smoothing or offsetting had to degrade the track
    pub fn is_degraded(&self) -> bool {
        self.centerline.is_degraded() || !self.boundaries.flagged().is_empty()
    }

    /// Export data for the configured simulator format
    ///
    /// # Example
    ///
    /// ```
    /// # use voronoi_track_gen::*;
    /// let config = GenerationConfigBuilder::new()
    ///     .seed(42)
    ///     .format(SimFormat::Fssim)
    ///     .geo_anchor(51.197682, 5.323411)
    ///     .unwrap()
    ///     .build()
    ///     .unwrap();
    /// let track = TrackGenerator::generate(&config).unwrap();
    ///
    /// let export = track.export().unwrap();
    /// assert!(export.coordinates.is_geographic());
    /// assert_eq!(export.format.identifier(), "fssim");
    /// ```
    pub fn export(&self) -> Result<TrackExport> {
        build_export(
            &self.centerline,
            &self.boundaries,
            self.config.format,
            self.config.geo_anchor,
        )
    }
}

/// Runs the full pipeline: sample → loop → smooth → offset → project
pub struct TrackGenerator;

impl TrackGenerator {
    /// Generate a track from configuration
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for an invalid configuration (checked first)
    /// - `LoopConstructionFailed` if the mode cannot close a simple loop
    /// - `InvalidAnchor` if the geographic anchor is out of range
    pub fn generate(config: &GenerationConfig) -> Result<Track> {
        config.validate()?;

        let tessellation = RegionSampler::generate(config)?;
        let raw_loop = LoopBuilder::build(&tessellation, config.mode, config.region_count)?;
        let centerline =
            CenterlineSmoother::new(config.min_turn_radius).smooth(&raw_loop, config.sample_spacing)?;
        let boundaries = BoundaryOffsetter::default().offset(&centerline, config.half_width());

        let geo_boundaries = match config.geo_anchor {
            Some(anchor) => Some(CoordinateProjector::from_anchor(anchor)?.project_pair(&boundaries)),
            None => None,
        };

        info!(
            seed = config.seed,
            mode = config.mode.name(),
            vertices = raw_loop.len(),
            cones = boundaries.len(),
            length = centerline.length(),
            "track generated"
        );

        Ok(Track {
            config: *config,
            tessellation,
            raw_loop,
            centerline,
            boundaries,
            geo_boundaries,
        })
    }

    /// Generate one track per configuration
    ///
    /// Runs are independent (each owns its random source), so with the
    /// `parallel` feature they are spread over the rayon thread pool. Results
    /// keep the order of `configs`.
    pub fn generate_batch(configs: &[GenerationConfig]) -> Vec<Result<Track>> {
        #[cfg(feature = "parallel")]
        {
            configs.par_iter().map(Self::generate).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            configs.iter().map(Self::generate).collect()
        }
    }
}
