//! Brute-force flat index — O(n) exact k-NN search under L2

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::distance::squared_euclidean;
use crate::embedding::check_dimension;
use crate::error::{LabelStoreError, Result};
use crate::index::{Neighbor, NeighborIndex};

/// Row count at which the distance scan is spread across the rayon pool.
pub const PARALLEL_SCAN_MIN_ROWS: usize = 4096;

/// A flat (brute-force) index that computes distance to every stored vector.
///
/// Vectors live row-major in one contiguous buffer; row `i` is the vector
/// inserted at position `i`.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create a new empty flat index for vectors of `dimension` components.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_capacity(dimension, 0)
    }

    /// Create an empty flat index with room for `rows` vectors.
    pub fn with_capacity(dimension: usize, rows: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(LabelStoreError::InvalidDimension);
        }
        Ok(Self {
            dimension,
            data: Vec::with_capacity(dimension * rows),
        })
    }

    /// Get the vector stored at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Iterate over stored vectors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }

    fn scan(&self, query: &[f32]) -> Vec<(usize, f32)> {
        if self.len() >= PARALLEL_SCAN_MIN_ROWS {
            self.data
                .par_chunks_exact(self.dimension)
                .enumerate()
                .map(|(position, row)| (position, squared_euclidean(query, row)))
                .collect()
        } else {
            self.iter()
                .enumerate()
                .map(|(position, row)| (position, squared_euclidean(query, row)))
                .collect()
        }
    }
}

/// Nearest first, NaN last, ties by lower position.
fn by_distance(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.is_nan()
        .cmp(&b.1.is_nan())
        .then_with(|| a.1.total_cmp(&b.1))
        .then_with(|| a.0.cmp(&b.0))
}

impl NeighborIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn insert(&mut self, vector: &[f32]) -> Result<usize> {
        check_dimension(self.dimension, vector)?;
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(LabelStoreError::Capability(
                "k must be at least 1".to_string(),
            ));
        }
        check_dimension(self.dimension, vector)?;

        let mut candidates = self.scan(vector);
        if k < candidates.len() {
            candidates.select_nth_unstable_by(k - 1, by_distance);
            candidates.truncate(k);
        }
        candidates.sort_by(by_distance);

        let mut neighbors: Vec<Neighbor> = Vec::new();
        neighbors.try_reserve_exact(k).map_err(|e| {
            LabelStoreError::Capability(format!("cannot hold {k} neighbors: {e}"))
        })?;
        neighbors.extend(
            candidates
                .into_iter()
                .map(|(position, squared)| Neighbor::new(position, squared.sqrt())),
        );
        neighbors.resize(k, Neighbor::no_match());
        Ok(neighbors)
    }
}
