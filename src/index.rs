//! Index trait for the pluggable nearest-neighbor capability

use crate::error::Result;

/// Position reported by an index for a result slot with no stored vector.
pub const NO_MATCH: i64 = -1;

/// One slot of a k-NN answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion position of the vector, or [`NO_MATCH`] for padding.
    pub position: i64,
    /// L2 distance to the query. `f32::MAX` for padding.
    pub distance: f32,
}

impl Neighbor {
    pub fn new(position: usize, distance: f32) -> Self {
        Self {
            position: position as i64,
            distance,
        }
    }

    /// The padding slot used when fewer than `k` vectors exist.
    pub fn no_match() -> Self {
        Self {
            position: NO_MATCH,
            distance: f32::MAX,
        }
    }

    /// The position as an index into a table of `len` entries, or `None` if
    /// this slot is a sentinel or out of range.
    pub fn resolve(&self, len: usize) -> Option<usize> {
        usize::try_from(self.position).ok().filter(|&p| p < len)
    }
}

/// An exact or approximate nearest-neighbor search structure over fixed-size
/// vectors, addressed by insertion position.
///
/// Implementations are append-only: the n-th successful `insert` returns
/// position `n`. The `VectorLabelStore` keeps its labels aligned with these
/// positions.
pub trait NeighborIndex {
    /// The fixed dimensionality of every vector in this index.
    fn dimension(&self) -> usize;

    /// The number of vectors in this index.
    fn len(&self) -> usize;

    /// Whether the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a vector and return its position.
    fn insert(&mut self, vector: &[f32]) -> Result<usize>;

    /// Find the `k` nearest neighbors of `vector`.
    ///
    /// Returns exactly `k` slots sorted by distance ascending. When fewer
    /// than `k` vectors are stored, the tail is padded with
    /// [`Neighbor::no_match`]. A `k` too large to allocate is a
    /// `Capability` error; `VectorLabelStore` never asks for more than
    /// `len()` slots.
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}
