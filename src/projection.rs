//! Planar ↔ geographic coordinate conversion
//!
//! Planar `x`/`y` are east/north offsets in metres from an anchor. The
//! conversion scales by the WGS84 meridional radius of curvature `M` (north)
//! and the prime-vertical radius `N·cos φ` (east) at the anchor latitude, a
//! local equirectangular projection that is accurate over track-sized areas.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryPair;
use crate::config::GeoAnchor;
use crate::error::{Result, TrackError};
use crate::export::ExportCoordinates;
use crate::geometry::Point2D;

/// WGS84 semi-major axis in metres
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Floor for `cos φ` so longitudes stay finite at the poles
const MIN_COS_LAT: f64 = 1e-12;

/// Latitude/longitude in degrees
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Wrap a longitude difference or value into (-180, 180]
fn wrap_degrees(lon: f64) -> f64 {
    let mut wrapped = lon % 360.0;
    if wrapped <= -180.0 {
        wrapped += 360.0;
    } else if wrapped > 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}

/// Fifth pipeline stage: planar boundary pair → geographic boundary pair
///
/// # Example
///
/// ```rust
/// use voronoi_track_gen::*;
///
/// let projector = CoordinateProjector::new(51.197682, 5.323411).unwrap();
/// let geo = projector.to_geo(Point2D::new(100.0, -50.0));
/// let back = projector.to_planar(geo);
///
/// assert!((back.x - 100.0).abs() < 1e-6);
/// assert!((back.y + 50.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateProjector {
    anchor: GeoPoint,
    /// Metres per radian of latitude
    meridional: f64,
    /// Metres per radian of longitude
    parallel: f64,
}

impl CoordinateProjector {
    /// Create a projector anchored at `(lat, lon)` degrees
    ///
    /// # Errors
    ///
    /// Returns `InvalidAnchor` if the latitude is outside [-90, 90] or
    /// either value is not finite.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(TrackError::InvalidAnchor { lat, lon });
        }

        let phi = lat.to_radians();
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let w = 1.0 - e2 * phi.sin().powi(2);
        let meridional = WGS84_A * (1.0 - e2) / w.powf(1.5);
        let prime_vertical = WGS84_A / w.sqrt();
        let parallel = prime_vertical * phi.cos().max(MIN_COS_LAT);

        Ok(Self {
            anchor: GeoPoint::new(lat, wrap_degrees(lon)),
            meridional,
            parallel,
        })
    }

    /// Create a projector from a validated anchor
    pub fn from_anchor(anchor: GeoAnchor) -> Result<Self> {
        Self::new(anchor.lat, anchor.lon)
    }

    #[inline]
    pub fn anchor(&self) -> GeoPoint {
        self.anchor
    }

    /// Planar metres → degrees
    pub fn to_geo(&self, p: Point2D) -> GeoPoint {
        GeoPoint {
            lat: self.anchor.lat + (p.y / self.meridional).to_degrees(),
            lon: wrap_degrees(self.anchor.lon + (p.x / self.parallel).to_degrees()),
        }
    }

    /// Degrees → planar metres
    pub fn to_planar(&self, g: GeoPoint) -> Point2D {
        Point2D::new(
            wrap_degrees(g.lon - self.anchor.lon).to_radians() * self.parallel,
            (g.lat - self.anchor.lat).to_radians() * self.meridional,
        )
    }

    /// Project every cone of a planar pair
    pub fn project_pair(&self, pair: &BoundaryPair) -> BoundaryPair<GeoPoint> {
        pair.map(|&p| self.to_geo(p))
    }

    /// Convert a geographic pair back to planar metres
    pub fn inverse_project_pair(&self, pair: &BoundaryPair<GeoPoint>) -> BoundaryPair {
        pair.map(|&g| self.to_planar(g))
    }

    /// Project a planar pair around the anchor `(lat, lon)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidAnchor` for an invalid anchor.
    pub fn project(pair: &BoundaryPair, lat: f64, lon: f64) -> Result<BoundaryPair<GeoPoint>> {
        Ok(Self::new(lat, lon)?.project_pair(pair))
    }

    /// Inverse of [`CoordinateProjector::project`]
    pub fn inverse_project(pair: &BoundaryPair<GeoPoint>, lat: f64, lon: f64) -> Result<BoundaryPair> {
        Ok(Self::new(lat, lon)?.inverse_project_pair(pair))
    }

    /// Project when an anchor is given, otherwise pass the planar pair through
    pub fn project_optional(pair: &BoundaryPair, anchor: Option<GeoAnchor>) -> Result<ExportCoordinates> {
        match anchor {
            Some(anchor) => Ok(ExportCoordinates::Geographic(
                Self::from_anchor(anchor)?.project_pair(pair),
            )),
            None => Ok(ExportCoordinates::Planar(pair.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_anchor_maps_to_origin() {
        let projector = CoordinateProjector::new(51.197682, 5.323411).unwrap();
        let g = projector.to_geo(Point2D::ZERO);
        assert_eq!(g, GeoPoint::new(51.197682, 5.323411));
        assert_eq!(projector.to_planar(g), Point2D::ZERO);
    }

    #[test]
    fn test_wgs84_radii_at_equator() {
        let projector = CoordinateProjector::new(0.0, 0.0).unwrap();
        // One degree of longitude at the equator is a / (180/π) metres
        let g = projector.to_geo(Point2D::new(WGS84_A.to_radians(), 0.0));
        assert_relative_eq!(g.lon, 1.0, epsilon = 1e-12);

        // Meridional radius at the equator is a(1 - e²)
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let g = projector.to_geo(Point2D::new(0.0, (WGS84_A * (1.0 - e2)).to_radians()));
        assert_relative_eq!(g.lat, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_north_and_east() {
        let projector = CoordinateProjector::new(45.0, 10.0).unwrap();
        let g = projector.to_geo(Point2D::new(100.0, 100.0));
        assert!(g.lat > 45.0);
        assert!(g.lon > 10.0);
        // ~111 km per degree of latitude
        assert_relative_eq!((g.lat - 45.0) * 111_132.0, 100.0, max_relative = 1e-2);
    }

    #[test]
    fn test_invalid_anchor() {
        for (lat, lon) in [(90.1, 0.0), (-91.0, 0.0), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
            assert!(matches!(
                CoordinateProjector::new(lat, lon),
                Err(TrackError::InvalidAnchor { .. })
            ));
        }
    }

    #[test]
    fn test_poles_stay_finite() {
        let projector = CoordinateProjector::new(90.0, 0.0).unwrap();
        let g = projector.to_geo(Point2D::new(10.0, -10.0));
        assert!(g.lat.is_finite() && g.lon.is_finite());
        assert!(g.lon > -180.0 && g.lon <= 180.0);
    }

    #[test]
    fn test_antimeridian_wrap() {
        let projector = CoordinateProjector::new(0.0, 179.9999).unwrap();
        let g = projector.to_geo(Point2D::new(1000.0, 0.0));
        assert!(g.lon < 0.0);
        let back = projector.to_planar(g);
        assert_relative_eq!(back.x, 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pair_roundtrip() {
        let pair = BoundaryPair::new(
            vec![Point2D::new(0.0, 1.5), Point2D::new(10.0, 1.5)],
            vec![Point2D::new(0.0, -1.5), Point2D::new(10.0, -1.5)],
            Vec::new(),
        )
        .unwrap();

        let geo = CoordinateProjector::project(&pair, 51.197682, 5.323411).unwrap();
        let back = CoordinateProjector::inverse_project(&geo, 51.197682, 5.323411).unwrap();

        for (a, b) in pair.left().iter().chain(pair.right()).zip(back.left().iter().chain(back.right())) {
            assert_relative_eq!(a.x, b.x, epsilon = 1e-6);
            assert_relative_eq!(a.y, b.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_optional_passthrough() {
        let pair = BoundaryPair::new(vec![Point2D::X], vec![Point2D::Y], Vec::new()).unwrap();
        match CoordinateProjector::project_optional(&pair, None).unwrap() {
            ExportCoordinates::Planar(p) => assert_eq!(p, pair),
            other => panic!("expected planar coordinates, got {:?}", other),
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_roundtrip_property(
                lat in -85.0..85.0_f64,
                lon in -180.0..180.0_f64,
                x in -2000.0..2000.0_f64,
                y in -2000.0..2000.0_f64,
            ) {
                let projector = CoordinateProjector::new(lat, lon).unwrap();
                let p = Point2D::new(x, y);
                let back = projector.to_planar(projector.to_geo(p));

                let tolerance = 1e-6 * p.length().max(1.0);
                prop_assert!((back - p).length() <= tolerance,
                    "roundtrip drifted: {:?} -> {:?}", p, back);
            }
        }
    }
}
