//! Voronoi Region Structure
//!
//! Represents an individual Voronoi cell of the tessellation, clipped to the
//! generation bounds.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{orient, polygon_centroid, signed_area, Point2D};

/// A single Voronoi cell in the working plane
///
/// Each region has:
/// - A unique ID matching the index of its generating seed
/// - The generating seed point
/// - Neighbor connectivity (Delaunay adjacency) for loop construction
/// - Vertices of the cell polygon, clipped to the bounds
///
/// Regions are produced once by the region sampler and read-only afterwards.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Unique identifier for this region (0 to seed_count-1)
    pub id: usize,

    /// Seed point that generated this cell
    pub seed: Point2D,

    /// IDs of Delaunay-adjacent seeds
    ///
    /// Sorted ascending. Two seeds are neighbors when their unclipped
    /// Voronoi cells share an edge.
    pub neighbors: Vec<usize>,

    /// Vertices of the clipped cell polygon, ordered counter-clockwise
    pub vertices: Vec<Point2D>,
}

impl Region {
    /// Create a new region
    ///
    /// This is typically called during tessellation, not by user code.
    pub fn new(id: usize, seed: Point2D, neighbors: Vec<usize>, vertices: Vec<Point2D>) -> Self {
        Self {
            id,
            seed,
            neighbors,
            vertices,
        }
    }

    /// Get the number of neighboring regions
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Check if this region is a neighbor of another region
    #[inline]
    pub fn is_neighbor_of(&self, other_region_id: usize) -> bool {
        self.neighbors.binary_search(&other_region_id).is_ok()
    }

    /// Get the vertex count (polygon complexity)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Area of the clipped cell
    pub fn area(&self) -> f64 {
        signed_area(&self.vertices).abs()
    }

    /// Centroid of the clipped cell
    pub fn centroid(&self) -> Point2D {
        polygon_centroid(&self.vertices)
    }

    /// Check if a point lies inside the (convex) cell or on its boundary
    pub fn contains(&self, point: Point2D) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        (0..n).all(|i| orient(self.vertices[i], self.vertices[(i + 1) % n], point) >= 0.0)
    }
}
