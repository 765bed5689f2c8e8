//! Spatial indexing for fast position-to-region lookups
//!
//! This module is only available with the `spatial-index` feature.

use std::fmt;

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::geometry::Point2D;

/// Wrapper around a 2D KD-tree over seed points
///
/// The nearest seed to a position identifies the Voronoi region that
/// contains it, so this answers "which cell is this point in" in O(log n).
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
    len: usize,
}

impl SpatialIndex {
    /// Build spatial index from seed points
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_track_gen::{Point2D, SpatialIndex};
    ///
    /// let seeds = vec![
    ///     Point2D::new(0.0, 0.0),
    ///     Point2D::new(10.0, 0.0),
    ///     Point2D::new(0.0, 10.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&seeds);
    /// assert_eq!(index.find_nearest(Point2D::new(9.0, 1.0)), 1);
    /// ```
    pub fn new(seeds: &[Point2D]) -> Self {
        let points: Vec<[f64; 2]> = seeds.iter().map(|p| [p.x, p.y]).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
            len: points.len(),
        }
    }

    /// Find the index of the seed nearest to a position
    pub fn find_nearest(&self, position: Point2D) -> usize {
        let query = [position.x, position.y];
        let result = self.tree.nearest_one::<SquaredEuclidean>(&query);
        result.item
    }

    /// Number of indexed seeds
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_index_basic() {
        let seeds = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            Point2D::new(100.0, 100.0),
            Point2D::new(0.0, 100.0),
        ];

        let index = SpatialIndex::new(&seeds);
        assert_eq!(index.len(), 4);

        assert_eq!(index.find_nearest(Point2D::new(10.0, 5.0)), 0);
        assert_eq!(index.find_nearest(Point2D::new(90.0, 20.0)), 1);
        assert_eq!(index.find_nearest(Point2D::new(70.0, 80.0)), 2);
        assert_eq!(index.find_nearest(Point2D::new(-5.0, 95.0)), 3);
    }

    #[test]
    fn test_spatial_index_exact_match() {
        let seeds = vec![Point2D::new(12.5, 3.0), Point2D::new(-4.0, 8.0)];
        let index = SpatialIndex::new(&seeds);

        assert_eq!(index.find_nearest(seeds[0]), 0);
        assert_eq!(index.find_nearest(seeds[1]), 1);
    }
}
