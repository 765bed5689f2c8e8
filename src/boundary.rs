//! Lateral boundary extraction
//!
//! Offsets the centerline by the half track width along its left normal.
//! Cone `i` on either side sits on the rung through centerline sample `i`,
//! so both sides stay index-aligned with the centerline.
//!
//! The offset is checked for crossing rungs, for a side crossing itself and
//! for the two sides crossing each other. Crossings between nearby indices
//! (the inner side of a turn tighter than the half width) have their normals
//! replaced by a windowed average, and the check is repeated with a wider
//! window. Whatever still crosses after the last round, including any
//! crossing between distant parts of the track, is flagged as a pinch. The
//! width itself is never reduced.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::{edge_violations, segments_intersect, Point2D};
use crate::smoothing::Centerline;

/// Default bound on re-normalization rounds
pub const DEFAULT_MAX_ROUNDS: usize = 16;

/// What happened in a flagged index range
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    /// Normals were replaced by a windowed average
    Renormalized,
    /// Boundaries still cross here after re-normalization
    Pinch,
}

/// Cyclic, inclusive index range `start..=end` (wrapping past the last index)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlaggedRegion {
    pub start: usize,
    pub end: usize,
    pub kind: FlagKind,
}

impl FlaggedRegion {
    /// Check whether `index` lies in the range on a loop of `len` samples
    pub fn contains(&self, index: usize, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        let span = (self.end + len - self.start) % len;
        (index + len - self.start) % len <= span
    }
}

/// Left and right cone sequences, index-aligned with the centerline
///
/// Generic over the coordinate type so the geographic pair reuses the same
/// structure.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPair<P = Point2D> {
    left: Vec<P>,
    right: Vec<P>,
    flagged: Vec<FlaggedRegion>,
}

impl<P> BoundaryPair<P> {
    /// Assemble a pair; `None` if the sides differ in length
    pub fn new(left: Vec<P>, right: Vec<P>, flagged: Vec<FlaggedRegion>) -> Option<Self> {
        (left.len() == right.len()).then_some(Self {
            left,
            right,
            flagged,
        })
    }

    /// Number of cones per side
    #[inline]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    #[inline]
    pub fn left(&self) -> &[P] {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &[P] {
        &self.right
    }

    /// Diagnostic ranges where the offset needed correction
    ///
    /// Outside the [`FlagKind::Pinch`] ranges no rung crosses another rung,
    /// neither side crosses itself and the sides do not cross each other.
    #[inline]
    pub fn flagged(&self) -> &[FlaggedRegion] {
        &self.flagged
    }

    /// Iterate over `(left, right)` cone pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&P, &P)> {
        self.left.iter().zip(self.right.iter())
    }

    /// Convert every cone, keeping order and flags
    pub fn map<Q, F>(&self, mut f: F) -> BoundaryPair<Q>
    where
        F: FnMut(&P) -> Q,
    {
        BoundaryPair {
            left: self.left.iter().map(&mut f).collect(),
            right: self.right.iter().map(&mut f).collect(),
            flagged: self.flagged.clone(),
        }
    }

    /// Fallible version of [`BoundaryPair::map`]
    pub fn try_map<Q, E, F>(&self, mut f: F) -> Result<BoundaryPair<Q>, E>
    where
        F: FnMut(&P) -> Result<Q, E>,
    {
        Ok(BoundaryPair {
            left: self.left.iter().map(&mut f).collect::<Result<_, E>>()?,
            right: self.right.iter().map(&mut f).collect::<Result<_, E>>()?,
            flagged: self.flagged.clone(),
        })
    }
}

/// Fourth pipeline stage: centerline → boundary pair
#[derive(Debug, Clone)]
pub struct BoundaryOffsetter {
    max_rounds: usize,
}

impl Default for BoundaryOffsetter {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl BoundaryOffsetter {
    pub fn new(max_rounds: usize) -> Self {
        Self { max_rounds }
    }

    /// Offset the centerline by `half_width` to both sides
    ///
    /// `left[i] - right[i]` always has length exactly `2 * |half_width|`.
    pub fn offset(&self, centerline: &Centerline, half_width: f64) -> BoundaryPair {
        let points = centerline.points();
        let n = points.len();
        let h = half_width.abs();

        let mut normals = left_normals(points);
        let mut affected = vec![false; n];
        let local_gap = (n / 8).max(1);

        for round in 0..self.max_rounds {
            let local: Vec<(usize, usize)> = crossings(points, &normals, h)
                .into_iter()
                .filter(|&(i, j)| cyclic_gap(i, j, n) <= local_gap)
                .collect();
            if local.is_empty() {
                break;
            }

            let radius = round + 1;
            let mut mask = vec![false; n];
            for (i, j) in local {
                let (start, len) = short_arc(i, j, n);
                let padded = (len + 2 * radius).min(n - 1);
                let first = (start + n - radius.min(n)) % n;
                for k in 0..=padded {
                    mask[(first + k) % n] = true;
                }
            }
            normals = window_average(&normals, &mask, radius);
            for (a, m) in affected.iter_mut().zip(&mask) {
                *a |= *m;
            }
        }

        let mut pinched = vec![false; n];
        for (i, j) in crossings(points, &normals, h) {
            for k in [i, (i + 1) % n, j, (j + 1) % n] {
                pinched[k] = true;
            }
        }

        let mut flagged = runs(&affected, FlagKind::Renormalized);
        flagged.extend(runs(&pinched, FlagKind::Pinch));

        if !flagged.is_empty() {
            warn!(
                regions = flagged.len(),
                pinches = flagged.iter().filter(|f| f.kind == FlagKind::Pinch).count(),
                "boundary offset needed correction"
            );
        }

        let left = points.iter().zip(&normals).map(|(&c, &nrm)| c + nrm * h).collect();
        let right = points.iter().zip(&normals).map(|(&c, &nrm)| c - nrm * h).collect();

        BoundaryPair {
            left,
            right,
            flagged,
        }
    }
}

/// Unit left normals from central-difference tangents
fn left_normals(points: &[Point2D]) -> Vec<Point2D> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let previous = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            (next - previous)
                .try_normalize()
                .or_else(|| (next - points[i]).try_normalize())
                .map(|tangent| tangent.perp())
                .unwrap_or(Point2D::Y)
        })
        .collect()
}

/// Index pairs of every crossing in the offset: rung vs rung, each side
/// against itself and left against right
///
/// Rung pairs are sample indices; side pairs are segment indices (segment
/// `k` runs from cone `k` to cone `k + 1`).
fn crossings(points: &[Point2D], normals: &[Point2D], h: f64) -> Vec<(usize, usize)> {
    let left: Vec<Point2D> = points.iter().zip(normals).map(|(&c, &nrm)| c + nrm * h).collect();
    let right: Vec<Point2D> = points.iter().zip(normals).map(|(&c, &nrm)| c - nrm * h).collect();
    side_crossings(&left, &right)
}

fn side_crossings(left: &[Point2D], right: &[Point2D]) -> Vec<(usize, usize)> {
    let n = left.len();
    let rungs: Vec<(Point2D, Point2D)> = left.iter().copied().zip(right.iter().copied()).collect();
    let closed = |side: &[Point2D]| -> Vec<(Point2D, Point2D)> {
        (0..n).map(|k| (side[k], side[(k + 1) % n])).collect()
    };

    let mut pairs = intersecting(&rungs, &rungs, true);
    pairs.extend(edge_violations(left, usize::MAX));
    pairs.extend(edge_violations(right, usize::MAX));
    pairs.extend(intersecting(&closed(left), &closed(right), false));
    pairs
}

/// Pairs `(i, j)` where `first[i]` touches `second[j]`
///
/// With `same` both slices are the same set and only `i < j` is tested.
fn intersecting(
    first: &[(Point2D, Point2D)],
    second: &[(Point2D, Point2D)],
    same: bool,
) -> Vec<(usize, usize)> {
    let bbox = |&(a, b): &(Point2D, Point2D)| (a.min(b), a.max(b));
    let first_boxes: Vec<(Point2D, Point2D)> = first.iter().map(bbox).collect();
    let second_boxes: Vec<(Point2D, Point2D)> = second.iter().map(bbox).collect();

    let mut pairs = Vec::new();
    for (i, &(min_i, max_i)) in first_boxes.iter().enumerate() {
        let from = if same { i + 1 } else { 0 };
        for j in from..second.len() {
            let (min_j, max_j) = second_boxes[j];
            if max_i.x < min_j.x || max_j.x < min_i.x || max_i.y < min_j.y || max_j.y < min_i.y {
                continue;
            }
            if segments_intersect(first[i].0, first[i].1, second[j].0, second[j].1) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

fn cyclic_gap(i: usize, j: usize, n: usize) -> usize {
    let d = i.abs_diff(j);
    d.min(n - d)
}

/// Start and length of the shorter cyclic arc between `i` and `j`
fn short_arc(i: usize, j: usize, n: usize) -> (usize, usize) {
    let forward = (j + n - i) % n;
    if forward <= n - forward {
        (i, forward)
    } else {
        (j, n - forward)
    }
}

/// Replace masked normals by the normalized mean over `±radius` neighbors
fn window_average(normals: &[Point2D], mask: &[bool], radius: usize) -> Vec<Point2D> {
    let n = normals.len();
    normals
        .iter()
        .enumerate()
        .map(|(i, &normal)| {
            if !mask[i] {
                return normal;
            }
            let sum: Point2D = (0..=2 * radius)
                .map(|k| normals[(i + n * (radius / n + 1) + k - radius) % n])
                .sum();
            sum.try_normalize().unwrap_or(normal)
        })
        .collect()
}

/// Maximal cyclic runs of `true` as flagged regions
fn runs(mask: &[bool], kind: FlagKind) -> Vec<FlaggedRegion> {
    let n = mask.len();
    if n == 0 || !mask.iter().any(|&m| m) {
        return Vec::new();
    }
    if mask.iter().all(|&m| m) {
        return vec![FlaggedRegion {
            start: 0,
            end: n - 1,
            kind,
        }];
    }

    // Start scanning right after a false entry so no run is split at the seam
    let offset = mask.iter().position(|&m| !m).unwrap_or(0) + 1;
    let mut regions = Vec::new();
    let mut current: Option<usize> = None;
    for k in 0..n {
        let i = (offset + k) % n;
        match (mask[i], current) {
            (true, None) => current = Some(i),
            (false, Some(start)) => {
                regions.push(FlaggedRegion {
                    start,
                    end: (i + n - 1) % n,
                    kind,
                });
                current = None;
            }
            _ => {}
        }
    }
    regions
}
