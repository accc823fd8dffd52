//! Error types for the label store

use thiserror::Error;

/// Result type alias for label store operations
pub type Result<T> = std::result::Result<T, LabelStoreError>;

/// Error types that can occur in label store operations
#[derive(Error, Debug)]
pub enum LabelStoreError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid dimension: embeddings must have at least one component")]
    InvalidDimension,

    #[error("Batch length mismatch: {embeddings} embeddings, {texts} texts")]
    BatchLengthMismatch { embeddings: usize, texts: usize },

    #[error("Invalid vector: {reason}")]
    InvalidVector { reason: String },

    #[error("Invalid corpus at line {line}: {reason}")]
    InvalidCorpus { line: usize, reason: String },

    #[error("Search capability error: {0}")]
    Capability(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
