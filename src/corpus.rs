//! JSON-lines corpus loading for the CLI.
//!
//! Each non-blank line is `{"embedding": [..], "text": "..", "metadata": {..}}`
//! with `metadata` optional. The store's dimension is taken from the first
//! record unless one is given.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LabelStoreError, Result};
use crate::store::{Metadata, VectorLabelStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub embedding: Vec<f32>,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Build a store from the corpus file at `path`.
pub fn load_corpus_file(
    path: impl AsRef<Path>,
    dimension: Option<usize>,
) -> Result<VectorLabelStore> {
    let file = File::open(path)?;
    load_corpus(BufReader::new(file), dimension)
}

/// Build a store from a JSON-lines reader.
pub fn load_corpus<R: BufRead>(
    reader: R,
    dimension: Option<usize>,
) -> Result<VectorLabelStore> {
    let mut store: Option<VectorLabelStore> = dimension.map(VectorLabelStore::new).transpose()?;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = i + 1;
        let record: CorpusRecord =
            serde_json::from_str(&line).map_err(|e| LabelStoreError::InvalidCorpus {
                line: line_no,
                reason: e.to_string(),
            })?;

        let invalid = |e: LabelStoreError| LabelStoreError::InvalidCorpus {
            line: line_no,
            reason: e.to_string(),
        };
        if store.is_none() {
            store = Some(VectorLabelStore::new(record.embedding.len()).map_err(invalid)?);
        }
        if let Some(target) = store.as_mut() {
            target
                .add_with_metadata(&record.embedding, record.text, record.metadata)
                .map_err(invalid)?;
        }
    }

    let store = store.ok_or_else(|| LabelStoreError::InvalidCorpus {
        line: 0,
        reason: "corpus has no entries and no dimension was given".to_string(),
    })?;
    tracing::info!(entries = store.len(), dimension = store.dimension(), "corpus loaded");
    Ok(store)
}
