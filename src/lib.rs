//! # Vector Label Store
//!
//! An in-memory nearest-neighbor text store: embeddings go into an exact L2
//! flat index, each paired with a text label, and a query embedding returns
//! the texts of its nearest neighbors.
//!
//! This library provides:
//! - An append-only store keeping vectors and labels in lockstep
//! - A pluggable `NeighborIndex` seam with an exact brute-force implementation
//! - An HTTP API and a CLI on top of the store
//!
//! ## Example
//!
//! ```rust
//! use vector_label_store::VectorLabelStore;
//!
//! let mut store = VectorLabelStore::new(2).unwrap();
//! store.add(&[0.0, 0.0], "origin").unwrap();
//! store.add(&[1.0, 0.0], "right").unwrap();
//! store.add(&[0.0, 5.0], "far").unwrap();
//!
//! let results = store.search(&[0.1, 0.0], 2).unwrap();
//! assert_eq!(results, vec!["origin", "right"]);
//! ```

pub mod config;
pub mod corpus;
pub mod distance;
pub mod embedding;
pub mod error;
pub mod flat_index;
pub mod index;
pub mod metrics;
pub mod server;
pub mod store;

pub use embedding::Embedding;
pub use error::{LabelStoreError, Result};
pub use flat_index::FlatIndex;
pub use index::{Neighbor, NeighborIndex, NO_MATCH};
pub use store::{Entry, SearchHit, StoreStats, VectorLabelStore, DEFAULT_TOP_K};
