//! Voronoi-based procedural racetrack generation
//!
//! Generates closed-loop racetrack layouts (left and right cone sequences)
//! for autonomous-racing simulators. Output is plain data; plotting and
//! file writing are left to the caller.
//!
//! The pipeline runs leaf-first:
//!
//! 1. [`RegionSampler`]: random seeds, Delaunay adjacency, clipped Voronoi regions
//! 2. [`LoopBuilder`]: a simple closed loop through the working seeds ([`Mode`])
//! 3. [`CenterlineSmoother`]: Hermite smoothing and resampling at the cone spacing
//! 4. [`BoundaryOffsetter`]: left/right cones at half the track width
//! 5. [`CoordinateProjector`]: optional WGS84 latitude/longitude
//!
//! # Quick Start
//!
//! ```rust
//! use voronoi_track_gen::*;
//!
//! let config = GenerationConfigBuilder::new()
//!     .seed(42)
//!     .mode(Mode::Extend)
//!     .build()
//!     .unwrap();
//!
//! let track = TrackGenerator::generate(&config).unwrap();
//! println!("{} cones per side, {:.0} m", track.boundaries().len(), track.length());
//!
//! for cone in track.boundaries().tagged_cones().iter().take(4) {
//!     println!("{:?} at {:?}", cone.kind, cone.position);
//! }
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): O(log n) position-to-region lookups using a KD-tree
//! - `parallel` (default): batch generation on the rayon thread pool
//! - `serde`: serialization support for configuration and export types

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod region;
pub mod tessellation;
pub mod generation;
pub mod loops;
pub mod smoothing;
pub mod boundary;
pub mod projection;
pub mod export;
pub mod track;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{TrackError, Result};
pub use config::{Bounds, GeoAnchor, GenerationConfig, GenerationConfigBuilder, Mode, SimFormat};
pub use region::Region;
pub use tessellation::Tessellation;
pub use generation::RegionSampler;
pub use loops::{LoopBuilder, RawLoop};
pub use smoothing::{Centerline, CenterlineSmoother};
pub use boundary::{BoundaryOffsetter, BoundaryPair, FlagKind, FlaggedRegion};
pub use projection::{CoordinateProjector, GeoPoint};
pub use export::{build_export, ConeKind, ExportCoordinates, Side, StartPose, TaggedCone, TrackExport};
pub use track::{Track, TrackGenerator};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export the planar point type for convenience
pub use geometry::Point2D;
