//! Centerline smoothing
//!
//! Fits a closed piecewise cubic Hermite curve through a control polygon
//! (initially the raw loop) and resamples it at roughly the cone spacing.
//! Tangents follow the Catmull-Rom construction (central differences)
//! scaled by a per-vertex influence in `[1/16, 1]`.
//!
//! Smoothing never fails on geometry. When a segment bends tighter than
//! the minimum turn radius (joints included), or the resampled polyline
//! crosses itself, the influence of the vertices involved is halved and the
//! curve refit. A vertex still in violation at the lowest influence has its
//! corner cut (Chaikin style) so the turn is spread over two gentler
//! corners. Only if the sampled curve still crosses itself once the rounds
//! run out are the tangents at the crossing dropped to zero, which leaves
//! straight chords of the (simple) control polygon.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::DEFAULT_MIN_TURN_RADIUS;
use crate::error::{Result, TrackError};
use crate::geometry::{edge_violations, orient, perimeter, signed_area, Point2D};
use crate::loops::RawLoop;

/// Curvature checks per segment (points `j / CURVATURE_STEPS`, both joints included)
const CURVATURE_STEPS: usize = 16;

/// Integration steps per segment for the arc-length table
const ARC_STEPS: usize = 32;

/// Lowest tangent influence reached by halving
const MIN_INFLUENCE: f64 = 1.0 / 16.0;

/// Corner cut positions tried along each edge, as a fraction of its length
const CUT_FRACTIONS: [f64; 2] = [0.25, 0.125];

/// Corners with an edge shorter than `spacing / MIN_CUT_DIVISOR` are not cut
const MIN_CUT_DIVISOR: f64 = 8.0;

/// Default bound on refit rounds
pub const DEFAULT_MAX_ROUNDS: usize = 64;

/// Upper bound on the resampled point count
pub const MAX_SAMPLES: usize = 1_000_000;

/// Dense closed polyline fit through the raw loop
#[derive(Debug, Clone, PartialEq)]
pub struct Centerline {
    points: Vec<Point2D>,
    relaxed_vertices: Vec<usize>,
    rounded_vertices: Vec<usize>,
    turn_radius: f64,
}

impl Centerline {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Closed polyline length
    pub fn length(&self) -> f64 {
        perimeter(&self.points)
    }

    /// Shoelace area; same sign as the raw loop it was fit to
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// Smallest radius of curvature of the fitted curve
    ///
    /// Measured on the Hermite segments themselves (not the samples), at
    /// `CURVATURE_STEPS + 1` parameters per segment including both joints. A joint
    /// with zero tangent (a corner) reports `0.0`; a curve made only of
    /// straight pieces reports `f64::INFINITY`.
    #[inline]
    pub fn min_turn_radius(&self) -> f64 {
        self.turn_radius
    }

    /// Raw loop vertices whose tangent influence was reduced
    #[inline]
    pub fn relaxed_vertices(&self) -> &[usize] {
        &self.relaxed_vertices
    }

    /// Raw loop vertices whose corner was cut; these are not samples
    #[inline]
    pub fn rounded_vertices(&self) -> &[usize] {
        &self.rounded_vertices
    }

    /// True when smoothing had to relax the curve anywhere
    #[inline]
    pub fn is_degraded(&self) -> bool {
        !self.relaxed_vertices.is_empty()
    }
}

/// Cubic Hermite segment from `p0` to `p1` with end tangents `m0`, `m1`
#[derive(Debug, Clone, Copy)]
struct Hermite {
    p0: Point2D,
    p1: Point2D,
    m0: Point2D,
    m1: Point2D,
}

impl Hermite {
    fn point(&self, t: f64) -> Point2D {
        let t2 = t * t;
        let t3 = t2 * t;
        self.p0 * (2.0 * t3 - 3.0 * t2 + 1.0)
            + self.m0 * (t3 - 2.0 * t2 + t)
            + self.p1 * (-2.0 * t3 + 3.0 * t2)
            + self.m1 * (t3 - t2)
    }

    fn velocity(&self, t: f64) -> Point2D {
        let t2 = t * t;
        (self.p1 - self.p0) * (6.0 * t - 6.0 * t2)
            + self.m0 * (3.0 * t2 - 4.0 * t + 1.0)
            + self.m1 * (3.0 * t2 - 2.0 * t)
    }

    fn acceleration(&self, t: f64) -> Point2D {
        (self.p1 - self.p0) * (6.0 - 12.0 * t) + self.m0 * (6.0 * t - 4.0) + self.m1 * (6.0 * t - 2.0)
    }

    fn chord(&self) -> f64 {
        self.p0.distance(self.p1)
    }

    /// Smallest radius of curvature over the checked parameters; `0.0` at a cusp
    fn min_radius(&self) -> f64 {
        let min_speed = self.chord() * 1e-9;
        (0..=CURVATURE_STEPS)
            .map(|j| {
                let t = j as f64 / CURVATURE_STEPS as f64;
                let v = self.velocity(t);
                let speed = v.length();
                if speed <= min_speed {
                    return 0.0;
                }
                let bend = v.perp_dot(self.acceleration(t)).abs();
                if bend == 0.0 {
                    f64::INFINITY
                } else {
                    speed * speed * speed / bend
                }
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Cumulative arc length at `t = k / ARC_STEPS`
    fn arc_table(&self) -> Vec<f64> {
        let mut table = Vec::with_capacity(ARC_STEPS + 1);
        let mut length = 0.0;
        let mut previous = self.p0;
        table.push(0.0);
        for k in 1..=ARC_STEPS {
            let p = self.point(k as f64 / ARC_STEPS as f64);
            length += previous.distance(p);
            table.push(length);
            previous = p;
        }
        table
    }

    /// Parameter at arc length `s` by linear interpolation in the table
    fn parameter_at(table: &[f64], s: f64) -> f64 {
        let k = table.partition_point(|&len| len < s).clamp(1, ARC_STEPS);
        let (lo, hi) = (table[k - 1], table[k]);
        let frac = if hi > lo { (s - lo) / (hi - lo) } else { 0.0 };
        ((k - 1) as f64 + frac.clamp(0.0, 1.0)) / ARC_STEPS as f64
    }
}

/// Polygon the curve interpolates, with per-vertex influence and the raw
/// vertex each control vertex descends from
struct Control {
    points: Vec<Point2D>,
    influence: Vec<f64>,
    origin: Vec<usize>,
}

impl Control {
    fn new(points: &[Point2D]) -> Self {
        Self {
            points: points.to_vec(),
            influence: vec![1.0; points.len()],
            origin: (0..points.len()).collect(),
        }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    /// Replace corner `v` by two points on its edges
    ///
    /// The cut triangle must hold no other control vertex, which keeps a
    /// simple polygon simple. Returns false if no cut was made.
    fn cut(&mut self, v: usize, min_edge: f64) -> bool {
        let n = self.points.len();
        let corner = self.points[v];
        let previous = self.points[(v + n - 1) % n];
        let next = self.points[(v + 1) % n];
        if corner.distance(previous).min(corner.distance(next)) < min_edge
            || orient(previous, corner, next) == 0.0
        {
            return false;
        }

        for fraction in CUT_FRACTIONS {
            let before = corner + (previous - corner) * fraction;
            let after = corner + (next - corner) * fraction;
            let blocked = self
                .points
                .iter()
                .enumerate()
                .any(|(k, &p)| k != v && in_triangle(p, before, corner, after));
            if blocked {
                continue;
            }

            let origin = self.origin[v];
            self.points.splice(v..=v, [before, after]);
            self.influence.splice(v..=v, [1.0, 1.0]);
            self.origin.splice(v..=v, [origin, origin]);
            return true;
        }
        false
    }
}

/// Closed triangle test (`abc` non-degenerate)
fn in_triangle(p: Point2D, a: Point2D, b: Point2D, c: Point2D) -> bool {
    let d1 = orient(a, b, p);
    let d2 = orient(b, c, p);
    let d3 = orient(c, a, p);
    let negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(negative && positive)
}

/// Resampled polyline plus the segment each sample starts an edge on
struct Samples {
    points: Vec<Point2D>,
    segments: Vec<usize>,
}

impl Samples {
    /// Control vertices bounding the segments of crossing sample edges
    fn crossing_vertices(&self, n: usize) -> BTreeSet<usize> {
        edge_violations(&self.points, usize::MAX)
            .into_iter()
            .flat_map(|(a, b)| [self.segments[a], self.segments[b]])
            .flat_map(|i| [i, (i + 1) % n])
            .collect()
    }
}

/// Third pipeline stage: raw loop → centerline
#[derive(Debug, Clone)]
pub struct CenterlineSmoother {
    min_turn_radius: f64,
    max_rounds: usize,
}

impl Default for CenterlineSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TURN_RADIUS)
    }
}

impl CenterlineSmoother {
    pub fn new(min_turn_radius: f64) -> Self {
        Self {
            min_turn_radius,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Bound the number of refit rounds
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    #[inline]
    pub fn min_turn_radius(&self) -> f64 {
        self.min_turn_radius
    }

    /// Smooth and resample a raw loop
    ///
    /// The output keeps the order and winding of the raw loop and contains
    /// every raw vertex except the [rounded](Centerline::rounded_vertices)
    /// ones. It holds `max(round(length / target_spacing), control_len)`
    /// points, where `control_len` counts the control polygon after corner
    /// cuts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `target_spacing` is not a positive finite
    /// number or would produce more than [`MAX_SAMPLES`] points.
    pub fn smooth(&self, raw: &RawLoop, target_spacing: f64) -> Result<Centerline> {
        if !target_spacing.is_finite() || target_spacing <= 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "target_spacing must be positive (got {})",
                target_spacing
            )));
        }

        let mut control = Control::new(raw.points());
        let mut relaxed: BTreeSet<usize> = BTreeSet::new();
        let mut rounded: BTreeSet<usize> = BTreeSet::new();
        let min_edge = target_spacing / MIN_CUT_DIVISOR;

        for round in 0..self.max_rounds {
            let segments = fit(&control.points, &control.influence);
            let samples = resample(&segments, target_spacing)?;

            let n = control.len();
            let mut offenders = samples.crossing_vertices(n);
            for (i, segment) in segments.iter().enumerate() {
                if segment.min_radius() < self.min_turn_radius {
                    offenders.insert(i);
                    offenders.insert((i + 1) % n);
                }
            }

            if offenders.is_empty() {
                debug!(round, samples = samples.points.len(), control = n, "centerline smoothed");
                return Ok(finish(samples.points, &segments, relaxed, rounded));
            }

            // Descending, so a cut never shifts an index still to visit
            let mut progressed = false;
            for &v in offenders.iter().rev() {
                let origin = control.origin[v];
                if control.influence[v] > MIN_INFLUENCE {
                    control.influence[v] = (control.influence[v] * 0.5).max(MIN_INFLUENCE);
                    relaxed.insert(origin);
                    progressed = true;
                } else if control.cut(v, min_edge) {
                    relaxed.insert(origin);
                    rounded.insert(origin);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        settle(control, target_spacing, relaxed, rounded)
    }
}

/// Accept the current fit once no more rounds help, straightening only
/// where the samples still cross
fn settle(
    mut control: Control,
    target_spacing: f64,
    mut relaxed: BTreeSet<usize>,
    rounded: BTreeSet<usize>,
) -> Result<Centerline> {
    let mut straightened = 0usize;
    loop {
        let segments = fit(&control.points, &control.influence);
        let samples = resample(&segments, target_spacing)?;

        let crossing: Vec<usize> = samples
            .crossing_vertices(control.len())
            .into_iter()
            .filter(|&v| control.influence[v] > 0.0)
            .collect();
        if crossing.is_empty() {
            if straightened > 0 {
                warn!(straightened, "centerline kept straight chords where the curve crossed itself");
            }
            return Ok(finish(samples.points, &segments, relaxed, rounded));
        }

        for v in crossing {
            control.influence[v] = 0.0;
            relaxed.insert(control.origin[v]);
            straightened += 1;
        }
    }
}

fn finish(
    points: Vec<Point2D>,
    segments: &[Hermite],
    relaxed: BTreeSet<usize>,
    rounded: BTreeSet<usize>,
) -> Centerline {
    let relaxed_vertices: Vec<usize> = relaxed.into_iter().collect();
    let rounded_vertices: Vec<usize> = rounded.into_iter().collect();
    let turn_radius = segments
        .iter()
        .map(Hermite::min_radius)
        .fold(f64::INFINITY, f64::min);
    if !relaxed_vertices.is_empty() {
        warn!(
            relaxed = relaxed_vertices.len(),
            rounded = rounded_vertices.len(),
            vertices = ?relaxed_vertices,
            turn_radius,
            "centerline smoothing relaxed"
        );
    }
    Centerline {
        points,
        relaxed_vertices,
        rounded_vertices,
        turn_radius,
    }
}

/// Hermite segments through `points` with Catmull-Rom tangent directions
fn fit(points: &[Point2D], influence: &[f64]) -> Vec<Hermite> {
    let n = points.len();
    let directions: Vec<Point2D> = (0..n)
        .map(|i| {
            let previous = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            (next - previous)
                .try_normalize()
                .or_else(|| (next - points[i]).try_normalize())
                .unwrap_or(Point2D::ZERO)
        })
        .collect();

    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            let chord = points[i].distance(points[j]);
            Hermite {
                p0: points[i],
                p1: points[j],
                m0: directions[i] * (influence[i] * chord),
                m1: directions[j] * (influence[j] * chord),
            }
        })
        .collect()
}

/// Resample at roughly `spacing`, starting every segment at its control vertex
fn resample(segments: &[Hermite], spacing: f64) -> Result<Samples> {
    let n = segments.len();
    let tables: Vec<Vec<f64>> = segments.iter().map(Hermite::arc_table).collect();
    let lengths: Vec<f64> = tables.iter().map(|t| t[ARC_STEPS]).collect();
    let total: f64 = lengths.iter().sum();

    let wanted = (total / spacing).round();
    if !wanted.is_finite() || wanted > MAX_SAMPLES as f64 {
        return Err(TrackError::InvalidConfig(format!(
            "spacing {} gives too many samples for a {:.1} m centerline",
            spacing, total
        )));
    }
    let count = (wanted as usize).max(n);

    let counts = allocate(&lengths, total, count - n);

    let mut points = Vec::with_capacity(count);
    let mut segment_of = Vec::with_capacity(count);
    for (i, segment) in segments.iter().enumerate() {
        let c = counts[i];
        points.push(segment.p0);
        segment_of.push(i);
        for j in 1..c {
            let s = lengths[i] * j as f64 / c as f64;
            let t = Hermite::parameter_at(&tables[i], s);
            points.push(segment.point(t));
            segment_of.push(i);
        }
    }

    Ok(Samples {
        points,
        segments: segment_of,
    })
}

/// One sample per segment plus `extra` split by largest remainder
fn allocate(lengths: &[f64], total: f64, extra: usize) -> Vec<usize> {
    let n = lengths.len();
    if total <= 0.0 || extra == 0 {
        return vec![1; n];
    }

    let quotas: Vec<f64> = lengths.iter().map(|l| extra as f64 * l / total).collect();
    let mut counts: Vec<usize> = quotas.iter().map(|q| q.floor() as usize).collect();
    let assigned: usize = counts.iter().sum();

    let mut by_remainder: Vec<usize> = (0..n).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra)
    });
    for &i in by_remainder.iter().take(extra.saturating_sub(assigned)) {
        counts[i] += 1;
    }

    counts.iter().map(|c| c + 1).collect()
}
