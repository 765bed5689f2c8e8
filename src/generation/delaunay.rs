//! Delaunay adjacency via spade
//!
//! The Delaunay graph is the dual of the Voronoi diagram: two seeds are
//! adjacent iff their cells share an edge. It is stored as an index-based
//! adjacency list over the seed array.

use std::collections::HashMap;

use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::error::{Result, TrackError};
use crate::geometry::Point2D;

/// Adjacency list: `adjacency[i]` holds the sorted neighbor ids of seed `i`
pub type Adjacency = Vec<Vec<usize>>;

/// Compute the Delaunay adjacency of a set of distinct points
///
/// # Errors
///
/// Returns `Triangulation` if spade rejects a point (non-finite or too
/// large) or if duplicates were merged during insertion.
pub fn delaunay_adjacency(points: &[Point2D]) -> Result<Adjacency> {
    let vertices: Vec<Point2<f64>> = points.iter().map(|p| Point2::new(p.x, p.y)).collect();

    let triangulation: DelaunayTriangulation<Point2<f64>> =
        DelaunayTriangulation::bulk_load_stable(vertices).map_err(|e| {
            TrackError::Triangulation(format!(
                "spade bulk load failed for {} points: {:?}",
                points.len(),
                e
            ))
        })?;

    if triangulation.num_vertices() != points.len() {
        return Err(TrackError::Triangulation(format!(
            "expected {} vertices, triangulation has {}",
            points.len(),
            triangulation.num_vertices()
        )));
    }

    // Map spade's vertex handles back to seed ids by exact position
    let seed_ids: HashMap<(u64, u64), usize> = points
        .iter()
        .enumerate()
        .map(|(id, p)| ((p.x.to_bits(), p.y.to_bits()), id))
        .collect();
    let mut handle_to_seed = vec![usize::MAX; triangulation.num_vertices()];
    for vertex in triangulation.vertices() {
        let position = vertex.position();
        let id = seed_ids
            .get(&(position.x.to_bits(), position.y.to_bits()))
            .copied()
            .ok_or_else(|| {
                TrackError::Triangulation(format!(
                    "triangulation vertex ({}, {}) does not match any seed",
                    position.x, position.y
                ))
            })?;
        handle_to_seed[vertex.fix().index()] = id;
    }

    let mut adjacency: Adjacency = vec![Vec::new(); points.len()];
    for edge in triangulation.undirected_edges() {
        let [a, b] = edge.vertices();
        let a = handle_to_seed[a.fix().index()];
        let b = handle_to_seed[b.fix().index()];
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    for neighbors in adjacency.iter_mut() {
        neighbors.sort_unstable();
        neighbors.dedup();
    }

    Ok(adjacency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_with_center() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
            Point2D::new(5.0, 5.0),
        ];

        let adjacency = delaunay_adjacency(&points).unwrap();

        // Center connects to all corners
        assert_eq!(adjacency[4], vec![0, 1, 2, 3]);
        // Hull edges are always Delaunay edges
        assert!(adjacency[0].contains(&1));
        assert!(adjacency[1].contains(&2));
        assert!(adjacency[2].contains(&3));
        assert!(adjacency[3].contains(&0));
    }

    #[test]
    fn test_adjacency_symmetry() {
        let points: Vec<Point2D> = (0..30)
            .map(|i| {
                let t = i as f64 * 0.7;
                Point2D::new(t.cos() * (10.0 + i as f64), t.sin() * (10.0 + i as f64))
            })
            .collect();

        let adjacency = delaunay_adjacency(&points).unwrap();

        for (id, neighbors) in adjacency.iter().enumerate() {
            assert!(!neighbors.is_empty());
            assert!(!neighbors.contains(&id));
            for &n in neighbors {
                assert!(adjacency[n].contains(&id), "adjacency must be symmetric");
            }
        }
    }
}
