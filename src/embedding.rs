//! Embedding type and the shared length check

use crate::error::{LabelStoreError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A fixed-length embedding in 32-bit floating point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    data: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding from a Vec<f32>
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Narrow a double-precision embedding to the store's native precision
    pub fn from_f64(data: &[f64]) -> Self {
        Self::new(data.iter().map(|&x| x as f32).collect())
    }

    /// Get the dimension of the embedding
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get the underlying data as a slice
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

/// Parse an embedding from a comma-separated string, e.g. `"0.1, 0.0"`
impl FromStr for Embedding {
    type Err = LabelStoreError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(LabelStoreError::InvalidVector {
                reason: "empty embedding".to_string(),
            });
        }
        let data = s
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<f32>()
                    .map_err(|_| LabelStoreError::InvalidVector {
                        reason: format!("Invalid float: {}", x.trim()),
                    })
            })
            .collect::<Result<Vec<f32>>>()?;
        Ok(Embedding::new(data))
    }
}

/// Fail with `DimensionMismatch` unless `embedding` has exactly `expected` components.
pub fn check_dimension(expected: usize, embedding: &[f32]) -> Result<()> {
    if embedding.len() != expected {
        return Err(LabelStoreError::DimensionMismatch {
            expected,
            actual: embedding.len(),
        });
    }
    Ok(())
}
