//! Error types for track generation

use thiserror::Error;

/// Errors that can occur while generating or projecting a track
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    /// Configuration validation failed (raised before any geometry work)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The generation policy could not produce a simple closed loop
    #[error("loop construction failed: {0}")]
    LoopConstructionFailed(String),
    /// Geographic anchor is outside the valid latitude range
    #[error("invalid anchor: lat={lat}, lon={lon}")]
    InvalidAnchor { lat: f64, lon: f64 },
    /// Delaunay triangulation rejected the seed points
    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

impl TrackError {
    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            TrackError::InvalidConfig(_) => "invalid_config",
            TrackError::LoopConstructionFailed(_) => "loop_construction_failed",
            TrackError::InvalidAnchor { .. } => "invalid_anchor",
            TrackError::Triangulation(_) => "triangulation",
        }
    }
}

/// Result type alias for track generation
pub type Result<T> = std::result::Result<T, TrackError>;
