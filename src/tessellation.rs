//! Tessellation structure
//!
//! The result of region sampling: seeds, clipped Voronoi regions, the
//! Delaunay adjacency graph and the working-subset selection.

use crate::config::Bounds;
use crate::geometry::Point2D;
use crate::region::Region;

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// Voronoi tessellation of the generation bounds
///
/// Created once per generation run and read-only afterwards. The Delaunay
/// adjacency is index based (`neighbors(i)` lists seed ids), so the cyclic
/// graph never needs owning references.
#[derive(Debug, Clone)]
pub struct Tessellation {
    /// Seed points (indexed by region ID)
    seeds: Vec<Point2D>,

    /// Clipped Voronoi regions (indexed by region ID)
    regions: Vec<Region>,

    /// Delaunay adjacency list
    adjacency: Vec<Vec<usize>>,

    /// Clipping bounds
    bounds: Bounds,

    /// Random permutation of all seed ids; the first `region_count` form the
    /// working subset
    selection_order: Vec<usize>,

    /// Size of the working subset
    region_count: usize,

    /// Seed for the loop builder's own random source
    policy_seed: u64,

    /// Spatial index for fast position-to-region lookups
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl Tessellation {
    /// Assemble a tessellation from its parts
    ///
    /// This is typically called by the region sampler, not by user code.
    pub fn new(
        seeds: Vec<Point2D>,
        regions: Vec<Region>,
        adjacency: Vec<Vec<usize>>,
        bounds: Bounds,
        selection_order: Vec<usize>,
        region_count: usize,
        policy_seed: u64,
    ) -> Self {
        #[cfg(feature = "spatial-index")]
        let spatial_index = SpatialIndex::new(&seeds);

        Self {
            seeds,
            regions,
            adjacency,
            bounds,
            selection_order,
            region_count,
            policy_seed,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        }
    }

    /// Get the number of seeds (and regions)
    #[inline]
    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    /// Get all seed points
    #[inline]
    pub fn seeds(&self) -> &[Point2D] {
        &self.seeds
    }

    /// Get all regions as a slice
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Get a region by ID
    ///
    /// Returns `None` if the ID is out of bounds.
    #[inline]
    pub fn region(&self, id: usize) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Get the Delaunay neighbors of a seed
    ///
    /// Returns an empty slice if the ID is invalid.
    pub fn neighbors(&self, id: usize) -> &[usize] {
        self.adjacency.get(id).map(|n| n.as_slice()).unwrap_or(&[])
    }

    /// Get the full adjacency list
    #[inline]
    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    /// Get the clipping bounds
    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Random permutation of every seed id
    #[inline]
    pub fn selection_order(&self) -> &[usize] {
        &self.selection_order
    }

    /// Size of the working subset chosen by the sampler
    #[inline]
    pub fn region_count(&self) -> usize {
        self.region_count
    }

    /// The working subset of seed ids
    pub fn working_seeds(&self) -> &[usize] {
        self.working_subset(self.region_count)
    }

    /// The first `count` seed ids of the selection order (clamped to the seed count)
    pub fn working_subset(&self, count: usize) -> &[usize] {
        &self.selection_order[..count.min(self.selection_order.len())]
    }

    /// Seed for the loop builder's random source
    #[inline]
    pub fn policy_seed(&self) -> u64 {
        self.policy_seed
    }

    /// Find the region containing a position (requires spatial-index feature)
    ///
    /// The nearest seed owns the position, by definition of the Voronoi
    /// diagram.
    #[cfg(feature = "spatial-index")]
    pub fn region_at(&self, position: Point2D) -> usize {
        self.spatial_index.find_nearest(position)
    }
}

impl PartialEq for Tessellation {
    fn eq(&self, other: &Self) -> bool {
        self.seeds == other.seeds
            && self.regions == other.regions
            && self.adjacency == other.adjacency
            && self.bounds == other.bounds
            && self.selection_order == other.selection_order
            && self.region_count == other.region_count
            && self.policy_seed == other.policy_seed
    }
}
