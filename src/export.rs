//! Simulator-facing export data
//!
//! Produces format-agnostic cone data from a generated track: tagged cone
//! positions (planar or geographic), the start pose and the target
//! simulator schema. Writing files is left to the caller.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryPair;
use crate::config::{GeoAnchor, SimFormat};
use crate::error::Result;
use crate::geometry::Point2D;
use crate::projection::{CoordinateProjector, GeoPoint};
use crate::smoothing::Centerline;

/// Cone colour as used by Formula Student simulators
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConeKind {
    /// Left boundary
    Blue,
    /// Right boundary
    Yellow,
    /// Start line (first left/right pair)
    BigOrange,
}

/// Track side a cone belongs to
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// One cone with its colour and position in the boundary sequence
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedCone<P> {
    pub position: P,
    pub kind: ConeKind,
    pub side: Side,
    /// Index into the side's boundary sequence
    pub index: usize,
}

impl<P: Copy> BoundaryPair<P> {
    /// Every cone tagged with its colour, left then right per index
    ///
    /// The pair at index 0 marks the start line.
    pub fn tagged_cones(&self) -> Vec<TaggedCone<P>> {
        let mut cones = Vec::with_capacity(self.len() * 2);
        for (index, (&left, &right)) in self.pairs().enumerate() {
            let (left_kind, right_kind) = if index == 0 {
                (ConeKind::BigOrange, ConeKind::BigOrange)
            } else {
                (ConeKind::Blue, ConeKind::Yellow)
            };
            cones.push(TaggedCone {
                position: left,
                kind: left_kind,
                side: Side::Left,
                index,
            });
            cones.push(TaggedCone {
                position: right,
                kind: right_kind,
                side: Side::Right,
                index,
            });
        }
        cones
    }
}

/// Where the car starts: first centerline sample, facing along the track
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPose {
    pub position: Point2D,
    /// Radians counter-clockwise from +x (east)
    pub heading: f64,
}

impl StartPose {
    pub fn from_centerline(centerline: &Centerline) -> Self {
        let points = centerline.points();
        let position = points.first().copied().unwrap_or(Point2D::ZERO);
        let direction = points.get(1).map_or(Point2D::X, |&next| next - position);
        Self {
            position,
            heading: direction.y.atan2(direction.x),
        }
    }
}

/// Cone coordinates in the frame requested by the configuration
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCoordinates {
    /// Metres in the generation plane
    Planar(BoundaryPair<Point2D>),
    /// Degrees around the configured anchor
    Geographic(BoundaryPair<GeoPoint>),
}

impl ExportCoordinates {
    /// Number of cones per side
    pub fn len(&self) -> usize {
        match self {
            ExportCoordinates::Planar(pair) => pair.len(),
            ExportCoordinates::Geographic(pair) => pair.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, ExportCoordinates::Geographic(_))
    }
}

/// Everything an external writer needs to emit a simulator track file
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TrackExport {
    pub format: SimFormat,
    pub coordinates: ExportCoordinates,
    pub start_pose: StartPose,
    pub anchor: Option<GeoAnchor>,
}

impl TrackExport {
    /// Total number of cones on both sides
    pub fn cone_count(&self) -> usize {
        self.coordinates.len() * 2
    }
}

/// Build export data from a centerline and its boundaries
///
/// Boundaries are projected when an anchor is given and passed through as
/// planar metres otherwise.
///
/// # Errors
///
/// Returns `InvalidAnchor` if the anchor cannot be projected around.
pub fn build_export(
    centerline: &Centerline,
    boundaries: &BoundaryPair,
    format: SimFormat,
    anchor: Option<GeoAnchor>,
) -> Result<TrackExport> {
    Ok(TrackExport {
        format,
        coordinates: CoordinateProjector::project_optional(boundaries, anchor)?,
        start_pose: StartPose::from_centerline(centerline),
        anchor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryOffsetter;
    use crate::loops::RawLoop;
    use crate::smoothing::CenterlineSmoother;

    fn square_centerline() -> Centerline {
        let raw = RawLoop::new(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(60.0, 0.0),
                Point2D::new(60.0, 60.0),
                Point2D::new(0.0, 60.0),
            ],
            vec![0, 1, 2, 3],
        )
        .unwrap();
        CenterlineSmoother::default().smooth(&raw, 4.0).unwrap()
    }

    #[test]
    fn test_tagged_cones() {
        let pair = BoundaryPair::new(
            vec![Point2D::new(0.0, 1.0), Point2D::new(1.0, 1.0), Point2D::new(2.0, 1.0)],
            vec![Point2D::new(0.0, -1.0), Point2D::new(1.0, -1.0), Point2D::new(2.0, -1.0)],
            Vec::new(),
        )
        .unwrap();

        let cones = pair.tagged_cones();
        assert_eq!(cones.len(), 6);
        assert_eq!(cones[0].kind, ConeKind::BigOrange);
        assert_eq!(cones[1].kind, ConeKind::BigOrange);
        assert_eq!(cones[2].kind, ConeKind::Blue);
        assert_eq!(cones[2].side, Side::Left);
        assert_eq!(cones[3].kind, ConeKind::Yellow);
        assert_eq!(cones[5].position, Point2D::new(2.0, -1.0));
        assert_eq!(cones[5].index, 2);
    }

    #[test]
    fn test_start_pose() {
        let centerline = square_centerline();
        let pose = StartPose::from_centerline(&centerline);
        assert_eq!(pose.position, Point2D::ZERO);
        // First segment leaves the corner between east and south-east
        assert!(pose.heading < 0.0 && pose.heading > -std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_build_export_planar_and_geographic() {
        let centerline = square_centerline();
        let pair = BoundaryOffsetter::default().offset(&centerline, 1.5);

        let planar = build_export(&centerline, &pair, SimFormat::Fsds, None).unwrap();
        assert!(!planar.coordinates.is_geographic());
        assert_eq!(planar.cone_count(), 2 * centerline.len());

        let anchor = GeoAnchor::new(51.197682, 5.323411).unwrap();
        let geo = build_export(&centerline, &pair, SimFormat::Fssim, Some(anchor)).unwrap();
        assert!(geo.coordinates.is_geographic());
        assert_eq!(geo.format.identifier(), "fssim");
        assert_eq!(geo.coordinates.len(), pair.len());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_export_serialization() {
        let centerline = square_centerline();
        let pair = BoundaryOffsetter::default().offset(&centerline, 1.5);
        let export = build_export(&centerline, &pair, SimFormat::Fsds, None).unwrap();

        let json = serde_json::to_string(&export).unwrap();
        let restored: TrackExport = serde_json::from_str(&json).unwrap();
        assert_eq!(export.cone_count(), restored.cone_count());
        assert_eq!(export.format, restored.format);
    }
}
