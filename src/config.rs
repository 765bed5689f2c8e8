//! Track Generation Configuration and Builder
//!
//! This module provides configuration types for deterministic track generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};

/// Default number of random seed points
pub const DEFAULT_POINT_COUNT: usize = 20;
/// Default number of seeds that make up the loop
pub const DEFAULT_REGION_COUNT: usize = 10;
/// Default full track width in metres (Formula Student minimum)
pub const DEFAULT_TRACK_WIDTH: f64 = 3.0;
/// Default distance between consecutive cones in metres
pub const DEFAULT_SAMPLE_SPACING: f64 = 4.0;
/// Default minimum centerline turn radius in metres
pub const DEFAULT_MIN_TURN_RADIUS: f64 = 4.5;

/// Closed-loop construction policy
///
/// The mode is fixed for a run and dispatched once by the loop builder.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Angular ordering of a random seed subset around its centroid
    Random,
    /// Greedy walk over the Delaunay adjacency with bounded backtracking
    #[default]
    Extend,
    /// Cheapest-insertion growth from a small seed triangle
    Expand,
}

impl Mode {
    /// All modes, in declaration order
    pub const ALL: [Mode; 3] = [Mode::Random, Mode::Extend, Mode::Expand];

    /// Get a human-readable name for this mode
    pub fn name(self) -> &'static str {
        match self {
            Mode::Random => "Random",
            Mode::Extend => "Extend",
            Mode::Expand => "Expand",
        }
    }
}

/// Target simulator schema for exported cones
///
/// The generator only tags coordinates with the format; writing files is
/// left to the caller.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimFormat {
    /// Formula Student Driverless Simulator
    #[default]
    Fsds,
    /// FSSIM
    Fssim,
}

impl SimFormat {
    /// Get the identifier used by external writers to select a layout
    pub fn identifier(self) -> &'static str {
        match self {
            SimFormat::Fsds => "fsds",
            SimFormat::Fssim => "fssim",
        }
    }
}

/// Square, axis-aligned generation area `[min, max]²`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Side length of the square
    #[inline]
    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    /// Midpoint of the square along either axis
    #[inline]
    pub fn center(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    /// Check that the bounds span a non-empty, finite area
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self { min: 0.0, max: 250.0 }
    }
}

/// Reference coordinate for geographic export (degrees)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoAnchor {
    pub lat: f64,
    pub lon: f64,
}

impl GeoAnchor {
    /// Create an anchor, rejecting latitudes outside [-90, 90]
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(TrackError::InvalidAnchor { lat, lon });
        }
        Ok(Self { lat, lon })
    }
}

/// Configuration for deterministic track generation
///
/// The same configuration always produces the identical track: every
/// random decision is derived from `seed`.
///
/// # Example
///
/// ```rust
/// use voronoi_track_gen::*;
///
/// let config = GenerationConfigBuilder::new()
///     .seed(42)
///     .mode(Mode::Expand)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.seed, 42);
/// assert_eq!(config.point_count, 20);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    /// Number of random seed points drawn inside the bounds
    pub point_count: usize,

    /// Number of seeds that make up the raw loop
    ///
    /// The remaining `point_count - region_count` seeds only shape the
    /// Voronoi cells and the Delaunay graph.
    pub region_count: usize,

    /// Square generation area
    pub bounds: Bounds,

    /// Full track width in metres (cones sit at half this distance)
    pub track_width: f64,

    /// Target distance between consecutive centerline samples and cones
    pub sample_spacing: f64,

    /// Minimum radius the smoother tolerates inside a fitted segment
    pub min_turn_radius: f64,

    /// Loop construction policy
    pub mode: Mode,

    /// Random seed for deterministic generation
    pub seed: u64,

    /// Anchor for geographic export; `None` keeps planar coordinates
    pub geo_anchor: Option<GeoAnchor>,

    /// Simulator schema the exported cones are tagged with
    pub format: SimFormat,
}

impl GenerationConfig {
    /// Half of the track width (lateral cone offset)
    #[inline]
    pub fn half_width(&self) -> f64 {
        self.track_width * 0.5
    }

    /// Copy of this configuration with a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// One configuration per seed, everything else unchanged
    ///
    /// Useful for batch sweeps with [`crate::TrackGenerator::generate_batch`].
    pub fn variations<I>(&self, seeds: I) -> Vec<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        seeds.into_iter().map(|seed| self.with_seed(seed)).collect()
    }

    /// Validate every field
    ///
    /// Called by the builder and again by the region sampler, so configs
    /// assembled by hand are checked before any geometry work happens.
    pub fn validate(&self) -> Result<()> {
        if self.point_count < 4 {
            return Err(TrackError::InvalidConfig(format!(
                "point_count must be >= 4 (got {})",
                self.point_count
            )));
        }
        if self.region_count < 1 {
            return Err(TrackError::InvalidConfig(
                "region_count must be >= 1 (got 0)".to_string(),
            ));
        }
        if self.region_count > self.point_count {
            return Err(TrackError::InvalidConfig(format!(
                "region_count must be <= point_count ({} > {})",
                self.region_count, self.point_count
            )));
        }
        if !self.bounds.is_valid() {
            return Err(TrackError::InvalidConfig(format!(
                "bounds must satisfy min < max (got {}..{})",
                self.bounds.min, self.bounds.max
            )));
        }
        check_positive("track_width", self.track_width)?;
        check_positive("sample_spacing", self.sample_spacing)?;
        check_positive("min_turn_radius", self.min_turn_radius)?;
        if let Some(anchor) = self.geo_anchor {
            GeoAnchor::new(anchor.lat, anchor.lon)?;
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            point_count: DEFAULT_POINT_COUNT,
            region_count: DEFAULT_REGION_COUNT,
            bounds: Bounds::default(),
            track_width: DEFAULT_TRACK_WIDTH,
            sample_spacing: DEFAULT_SAMPLE_SPACING,
            min_turn_radius: DEFAULT_MIN_TURN_RADIUS,
            mode: Mode::default(),
            seed: rand::random(),
            geo_anchor: None,
            format: SimFormat::default(),
        }
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrackError::InvalidConfig(format!(
            "{} must be positive (got {})",
            name, value
        )))
    }
}

/// Builder for creating GenerationConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_track_gen::*;
///
/// let config = GenerationConfigBuilder::new()
///     .seed(7)
///     .point_count(30)
///     .region_count(12)
///     .bounds(-50.0, 80.0)
///     .track_width(4.0)
///     .unwrap()
///     .geo_anchor(51.197682, 5.323411)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.half_width(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct GenerationConfigBuilder {
    point_count: usize,
    region_count: usize,
    bounds: Bounds,
    track_width: f64,
    sample_spacing: f64,
    min_turn_radius: f64,
    mode: Mode,
    seed: Option<u64>,
    geo_anchor: Option<GeoAnchor>,
    format: SimFormat,
}

impl GenerationConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - point_count: 20, region_count: 10
    /// - bounds: 0..250
    /// - track_width: 3.0, sample_spacing: 4.0, min_turn_radius: 4.5
    /// - mode: Extend, format: Fsds
    /// - seed: random (generated on `build`)
    /// - geo_anchor: None
    pub fn new() -> Self {
        Self {
            point_count: DEFAULT_POINT_COUNT,
            region_count: DEFAULT_REGION_COUNT,
            bounds: Bounds::default(),
            track_width: DEFAULT_TRACK_WIDTH,
            sample_spacing: DEFAULT_SAMPLE_SPACING,
            min_turn_radius: DEFAULT_MIN_TURN_RADIUS,
            mode: Mode::default(),
            seed: None,
            geo_anchor: None,
            format: SimFormat::default(),
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of random seed points
    pub fn point_count(mut self, count: usize) -> Self {
        self.point_count = count;
        self
    }

    /// Set the number of seeds in the loop
    pub fn region_count(mut self, count: usize) -> Self {
        self.region_count = count;
        self
    }

    /// Set the square generation area
    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Bounds::new(min, max);
        self
    }

    /// Set the loop construction policy
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the exported simulator schema
    pub fn format(mut self, format: SimFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the full track width
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if width <= 0.0
    pub fn track_width(mut self, width: f64) -> Result<Self> {
        check_positive("track_width", width)?;
        self.track_width = width;
        Ok(self)
    }

    /// Set the distance between consecutive cones
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if spacing <= 0.0
    pub fn sample_spacing(mut self, spacing: f64) -> Result<Self> {
        check_positive("sample_spacing", spacing)?;
        self.sample_spacing = spacing;
        Ok(self)
    }

    /// Set the minimum turn radius tolerated by the smoother
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if radius <= 0.0
    pub fn min_turn_radius(mut self, radius: f64) -> Result<Self> {
        check_positive("min_turn_radius", radius)?;
        self.min_turn_radius = radius;
        Ok(self)
    }

    /// Request geographic export around an anchor
    ///
    /// # Errors
    ///
    /// Returns `InvalidAnchor` if the latitude is outside [-90, 90]
    pub fn geo_anchor(mut self, lat: f64, lon: f64) -> Result<Self> {
        self.geo_anchor = Some(GeoAnchor::new(lat, lon)?);
        Ok(self)
    }

    /// Build and validate the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    pub fn build(self) -> Result<GenerationConfig> {
        let config = GenerationConfig {
            point_count: self.point_count,
            region_count: self.region_count,
            bounds: self.bounds,
            track_width: self.track_width,
            sample_spacing: self.sample_spacing,
            min_turn_radius: self.min_turn_radius,
            mode: self.mode,
            seed: self.seed.unwrap_or_else(rand::random),
            geo_anchor: self.geo_anchor,
            format: self.format,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for GenerationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = GenerationConfigBuilder::new().build().unwrap();
        assert_eq!(config.point_count, 20);
        assert_eq!(config.region_count, 10);
        assert_eq!(config.bounds, Bounds::new(0.0, 250.0));
        assert_eq!(config.mode, Mode::Extend);
        assert_eq!(config.format, SimFormat::Fsds);
        assert_eq!(config.geo_anchor, None);
    }

    #[test]
    fn test_builder_custom() {
        let config = GenerationConfigBuilder::new()
            .seed(42)
            .point_count(25)
            .region_count(15)
            .bounds(-50.0, 80.0)
            .mode(Mode::Random)
            .format(SimFormat::Fssim)
            .sample_spacing(3.5)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.point_count, 25);
        assert_eq!(config.region_count, 15);
        assert_eq!(config.bounds.extent(), 130.0);
        assert_eq!(config.mode, Mode::Random);
        assert_eq!(config.format.identifier(), "fssim");
        assert_eq!(config.sample_spacing, 3.5);
    }

    #[test]
    fn test_too_few_points() {
        let result = GenerationConfigBuilder::new().point_count(3).build();
        assert!(matches!(result, Err(TrackError::InvalidConfig(_))));
    }

    #[test]
    fn test_region_count_limits() {
        let result = GenerationConfigBuilder::new().region_count(0).build();
        assert!(matches!(result, Err(TrackError::InvalidConfig(_))));

        let result = GenerationConfigBuilder::new()
            .point_count(8)
            .region_count(9)
            .build();
        assert!(matches!(result, Err(TrackError::InvalidConfig(_))));

        let result = GenerationConfigBuilder::new()
            .point_count(8)
            .region_count(8)
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_degenerate_bounds() {
        let result = GenerationConfigBuilder::new().bounds(10.0, 10.0).build();
        assert!(matches!(result, Err(TrackError::InvalidConfig(_))));

        let result = GenerationConfigBuilder::new().bounds(0.0, f64::INFINITY).build();
        assert!(matches!(result, Err(TrackError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_widths() {
        assert!(GenerationConfigBuilder::new().track_width(0.0).is_err());
        assert!(GenerationConfigBuilder::new().track_width(-1.0).is_err());
        assert!(GenerationConfigBuilder::new().sample_spacing(f64::NAN).is_err());
        assert!(GenerationConfigBuilder::new().min_turn_radius(0.0).is_err());
    }

    #[test]
    fn test_geo_anchor_validation() {
        let builder = GenerationConfigBuilder::new().geo_anchor(51.197682, 5.323411);
        assert!(builder.is_ok());

        let result = GenerationConfigBuilder::new().geo_anchor(90.5, 0.0);
        assert!(matches!(result, Err(TrackError::InvalidAnchor { .. })));
    }

    #[test]
    fn test_hand_built_config_is_validated() {
        let config = GenerationConfig {
            point_count: 3,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_variations() {
        let base = GenerationConfigBuilder::new().seed(1).build().unwrap();
        let configs = base.variations([10, 11, 12]);
        assert_eq!(configs.len(), 3);
        assert_eq!(configs[2].seed, 12);
        assert_eq!(configs[2].point_count, base.point_count);
    }

    #[test]
    fn test_mode_names() {
        let names: Vec<&str> = Mode::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["Random", "Extend", "Expand"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = GenerationConfigBuilder::new()
            .seed(12345)
            .mode(Mode::Expand)
            .geo_anchor(51.2, 5.3)
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: GenerationConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
