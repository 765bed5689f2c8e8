//! Extend mode: depth-first walk over the Delaunay graph
//!
//! The walk starts at a working seed and steps to Delaunay neighbors,
//! preferring the neighbor that keeps it rotating counter-clockwise around
//! the working-set centroid in even angular steps. Once `region_count` seeds
//! are on the path the closing segment is tried. Dead ends backtrack.
//!
//! Path edges are Delaunay edges and never cross each other, so only the
//! closing segment can break simplicity.

use std::f64::consts::{PI, TAU};

use tracing::debug;

use super::{seed_points, RawLoop};
use crate::error::{Result, TrackError};
use crate::geometry::{is_simple_polygon, mean, wrap_angle, Point2D};
use crate::tessellation::Tessellation;

/// Upper bound on path extensions across all start seeds
pub const MAX_EXTEND_EXPANSIONS: usize = 20_000;

/// Penalty for a step that does not advance counter-clockwise
const BACKWARD_PENALTY: f64 = PI;

/// Weight of the heading change (in half turns) in a candidate's score
const TURN_WEIGHT: f64 = 0.25;

/// Depth-first search state shared by every start seed
struct Walk<'a> {
    seeds: &'a [Point2D],
    tessellation: &'a Tessellation,
    centroid: Point2D,
    target: usize,
    path: Vec<usize>,
    visited: Vec<bool>,
    /// Accumulated angular progress around the centroid, one entry per path vertex
    progress: Vec<f64>,
}

impl Walk<'_> {
    fn angle(&self, id: usize) -> f64 {
        let d = self.seeds[id] - self.centroid;
        d.y.atan2(d.x)
    }

    /// Unvisited neighbors of the path head, best first
    fn candidates(&self) -> Vec<usize> {
        let Some(&current) = self.path.last() else {
            return Vec::new();
        };
        let progress = self.progress.last().copied().unwrap_or(0.0);
        // Edges still to place, counting the closing segment
        let remaining = (self.target - self.path.len() + 1) as f64;
        let desired = (TAU - progress) / remaining;
        let current_angle = self.angle(current);

        let heading = (self.path.len() >= 2).then(|| {
            let previous = self.path[self.path.len() - 2];
            self.seeds[current] - self.seeds[previous]
        });

        let mut scored: Vec<(usize, f64)> = self
            .tessellation
            .neighbors(current)
            .iter()
            .filter(|&&n| !self.visited[n])
            .map(|&n| {
                let delta = wrap_angle(self.angle(n) - current_angle);
                let mut score = (delta - desired).abs();
                if delta <= 0.0 {
                    score += BACKWARD_PENALTY;
                }
                if let Some(heading) = heading {
                    let step = self.seeds[n] - self.seeds[current];
                    let turn = wrap_angle(step.y.atan2(step.x) - heading.y.atan2(heading.x));
                    score += TURN_WEIGHT * turn.abs() / PI;
                }
                (n, score)
            })
            .collect();

        // Stable: equal scores keep ascending id order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.into_iter().map(|(n, _)| n).collect()
    }

    fn push(&mut self, id: usize) {
        let step = match self.path.last() {
            Some(&current) => wrap_angle(self.angle(id) - self.angle(current)),
            None => 0.0,
        };
        let progress = self.progress.last().copied().unwrap_or(0.0) + step;
        self.path.push(id);
        self.visited[id] = true;
        self.progress.push(progress);
    }

    fn pop(&mut self) {
        if let Some(id) = self.path.pop() {
            self.visited[id] = false;
            self.progress.pop();
        }
    }

    fn closes(&self) -> bool {
        is_simple_polygon(&seed_points(self.tessellation, &self.path))
    }
}

pub(super) fn build(tessellation: &Tessellation, region_count: usize) -> Result<RawLoop> {
    build_with_budget(tessellation, region_count, MAX_EXTEND_EXPANSIONS)
}

fn build_with_budget(tessellation: &Tessellation, region_count: usize, budget: usize) -> Result<RawLoop> {
    let working = tessellation.working_subset(region_count);
    let seeds = tessellation.seeds();

    let mut walk = Walk {
        seeds,
        tessellation,
        centroid: mean(&seed_points(tessellation, working)),
        target: region_count,
        path: Vec::with_capacity(region_count),
        visited: vec![false; seeds.len()],
        progress: Vec::with_capacity(region_count),
    };

    let mut expansions = 0usize;

    for &start in working {
        walk.push(start);
        let mut stack: Vec<(Vec<usize>, usize)> = vec![(walk.candidates(), 0)];

        while !stack.is_empty() {
            let top = stack.len() - 1;
            let next = {
                let (candidates, cursor) = &mut stack[top];
                let next = candidates.get(*cursor).copied();
                *cursor += 1;
                next
            };

            let Some(next) = next else {
                // Dead end: drop this vertex and resume at its parent
                stack.pop();
                walk.pop();
                continue;
            };

            expansions += 1;
            if expansions > budget {
                return Err(TrackError::LoopConstructionFailed(format!(
                    "extend search exhausted {} expansions",
                    budget
                )));
            }

            walk.push(next);
            if walk.path.len() == region_count {
                if walk.closes() {
                    debug!(start, expansions, "extend walk closed");
                    let points = seed_points(tessellation, &walk.path);
                    return RawLoop::new(points, walk.path.clone());
                }
                walk.pop();
                continue;
            }
            stack.push((walk.candidates(), 0));
        }
    }

    Err(TrackError::LoopConstructionFailed(format!(
        "no closed Delaunay walk through {} seeds",
        region_count
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfigBuilder;
    use crate::generation::RegionSampler;

    #[test]
    fn test_extend_default_scenario() {
        let config = GenerationConfigBuilder::new().seed(42).build().unwrap();
        let tess = RegionSampler::generate(&config).unwrap();

        let raw = build(&tess, 10).unwrap();

        assert_eq!(raw.len(), 10);
        assert!(raw.is_simple());
        assert!(tess.working_seeds().contains(&raw.seed_ids()[0]));
    }

    #[test]
    fn test_consecutive_vertices_are_delaunay_neighbors() {
        let config = GenerationConfigBuilder::new().seed(11).build().unwrap();
        let tess = RegionSampler::generate(&config).unwrap();

        let raw = build(&tess, 8).unwrap();
        let ids = raw.seed_ids();
        for pair in ids.windows(2) {
            assert!(tess.neighbors(pair[0]).contains(&pair[1]));
        }
    }

    #[test]
    fn test_triangle_loop() {
        let config = GenerationConfigBuilder::new().seed(5).build().unwrap();
        let tess = RegionSampler::generate(&config).unwrap();
        let raw = build(&tess, 3).unwrap();
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn test_budget_exhaustion_fails() {
        let config = GenerationConfigBuilder::new().seed(42).build().unwrap();
        let tess = RegionSampler::generate(&config).unwrap();

        // Reaching 10 vertices takes at least 9 extensions
        let result = build_with_budget(&tess, 10, 5);
        match result {
            Err(TrackError::LoopConstructionFailed(message)) => {
                assert!(message.contains("exhausted"), "{}", message)
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_every_seed_in_loop_often_exhausts() {
        let mut exhausted = 0;
        for seed in 0..10 {
            let config = GenerationConfigBuilder::new()
                .seed(seed)
                .point_count(30)
                .region_count(30)
                .build()
                .unwrap();
            let tess = RegionSampler::generate(&config).unwrap();
            match build(&tess, 30) {
                Ok(raw) => assert!(raw.is_simple()),
                Err(TrackError::LoopConstructionFailed(message)) => {
                    assert!(message.contains("exhausted") || message.contains("no closed"));
                    exhausted += 1;
                }
                Err(e) => panic!("unexpected error {}", e),
            }
        }
        assert!(exhausted > 0);
    }
}
