//! In-memory nearest-neighbor text store

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::embedding::check_dimension;
use crate::error::{LabelStoreError, Result};
use crate::flat_index::FlatIndex;
use crate::index::NeighborIndex;

/// Number of results `search_default` asks for.
pub const DEFAULT_TOP_K: usize = 3;

/// Free-form JSON attributes stored next to a label.
pub type Metadata = Map<String, Value>;

/// A search result with the matched text and its L2 distance to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub position: usize,
    pub text: String,
    pub distance: f32,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Metadata,
}

/// A stored text together with its insertion position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub position: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Metadata,
}

/// Summary of what the store currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub entries: usize,
    pub dimension: usize,
}

#[derive(Debug, Clone)]
struct Label {
    text: String,
    metadata: Metadata,
}

/// Append-only table of embeddings and their text labels.
///
/// Vectors are owned by the index and addressed by position; `labels[i]` is
/// the text (and metadata) for the vector at position `i`. Both grow together
/// in `add`.
///
/// If the index ever answers an insert with a position other than the next
/// one, the vector is already in the index but has no label. From then on
/// `add` and every search fail with `Capability`; reads of existing labels
/// keep working.
#[derive(Debug)]
pub struct VectorLabelStore<I: NeighborIndex = FlatIndex> {
    index: I,
    labels: Vec<Label>,
}

impl VectorLabelStore<FlatIndex> {
    /// Create an empty store over an exact L2 flat index.
    pub fn new(embedding_dim: usize) -> Result<Self> {
        Ok(Self {
            index: FlatIndex::new(embedding_dim)?,
            labels: Vec::new(),
        })
    }
}

impl<I: NeighborIndex> VectorLabelStore<I> {
    /// Create an empty store over the given index.
    ///
    /// The index must be empty, otherwise its positions would have no labels.
    pub fn with_index(index: I) -> Result<Self> {
        if index.dimension() == 0 {
            return Err(LabelStoreError::InvalidDimension);
        }
        if !index.is_empty() {
            return Err(LabelStoreError::Capability(format!(
                "index already holds {} unlabeled vectors",
                index.len()
            )));
        }
        Ok(Self {
            index,
            labels: Vec::new(),
        })
    }

    fn check_in_step(&self) -> Result<()> {
        if self.index.len() != self.labels.len() {
            return Err(LabelStoreError::Capability(format!(
                "index holds {} vectors for {} labels",
                self.index.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }

    /// Append an embedding with its text and return the entry's position.
    pub fn add(&mut self, embedding: &[f32], text: impl Into<String>) -> Result<usize> {
        self.add_with_metadata(embedding, text, Metadata::new())
    }

    /// Append an embedding with its text and metadata.
    pub fn add_with_metadata(
        &mut self,
        embedding: &[f32],
        text: impl Into<String>,
        metadata: Metadata,
    ) -> Result<usize> {
        check_dimension(self.dimension(), embedding)?;
        self.check_in_step()?;

        let expected = self.labels.len();
        let position = self.index.insert(embedding)?;
        if position != expected {
            return Err(LabelStoreError::Capability(format!(
                "index assigned position {position}, expected {expected}"
            )));
        }
        self.labels.push(Label {
            text: text.into(),
            metadata,
        });

        debug!(position, "added entry");
        Ok(position)
    }

    /// Append several entries. Every embedding is checked before anything is
    /// inserted, so a batch with a wrong-length embedding leaves the store
    /// unchanged.
    pub fn add_batch<T, E>(
        &mut self,
        items: impl IntoIterator<Item = (E, T)>,
    ) -> Result<Vec<usize>>
    where
        E: AsRef<[f32]>,
        T: Into<String>,
    {
        self.add_batch_with_metadata(
            items
                .into_iter()
                .map(|(embedding, text)| (embedding, text, Metadata::new())),
        )
    }

    /// [`add_batch`](Self::add_batch) with a metadata payload per entry.
    pub fn add_batch_with_metadata<T, E>(
        &mut self,
        items: impl IntoIterator<Item = (E, T, Metadata)>,
    ) -> Result<Vec<usize>>
    where
        E: AsRef<[f32]>,
        T: Into<String>,
    {
        let items: Vec<(E, T, Metadata)> = items.into_iter().collect();
        for (embedding, _, _) in &items {
            check_dimension(self.dimension(), embedding.as_ref())?;
        }

        let mut positions = Vec::with_capacity(items.len());
        for (embedding, text, metadata) in items {
            positions.push(self.add_with_metadata(embedding.as_ref(), text, metadata)?);
        }
        Ok(positions)
    }

    /// Like [`add_batch`](Self::add_batch), taking embeddings and texts as
    /// two parallel lists that must have the same length.
    pub fn add_batch_parallel<E, T>(
        &mut self,
        embeddings: Vec<E>,
        texts: Vec<T>,
    ) -> Result<Vec<usize>>
    where
        E: AsRef<[f32]>,
        T: Into<String>,
    {
        if embeddings.len() != texts.len() {
            return Err(LabelStoreError::BatchLengthMismatch {
                embeddings: embeddings.len(),
                texts: texts.len(),
            });
        }
        self.add_batch(embeddings.into_iter().zip(texts))
    }

    /// Return the texts of the `top_k` entries nearest to `embedding`,
    /// nearest first.
    pub fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<String>> {
        Ok(self
            .search_with_distances(embedding, top_k)?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// [`search`](Self::search) with [`DEFAULT_TOP_K`].
    pub fn search_default(&self, embedding: &[f32]) -> Result<Vec<String>> {
        self.search(embedding, DEFAULT_TOP_K)
    }

    /// Search for the `top_k` nearest entries, keeping positions and distances.
    ///
    /// A `top_k` above the entry count asks the index for every entry.
    pub fn search_with_distances(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        self.check_in_step()?;
        if self.is_empty() || top_k == 0 {
            return Ok(vec![]);
        }
        check_dimension(self.dimension(), embedding)?;

        let k = top_k.min(self.len());
        let neighbors = self.index.query(embedding, k)?;
        let hits: Vec<SearchHit> = neighbors
            .into_iter()
            .filter_map(|neighbor| {
                let position = neighbor.resolve(self.labels.len())?;
                let label = &self.labels[position];
                Some(SearchHit {
                    position,
                    text: label.text.clone(),
                    distance: neighbor.distance,
                    metadata: label.metadata.clone(),
                })
            })
            .collect();

        debug!(top_k, returned = hits.len(), "search complete");
        Ok(hits)
    }

    /// Search, then drop hits farther than `max_distance` from the query.
    pub fn search_within(
        &self,
        embedding: &[f32],
        top_k: usize,
        max_distance: f32,
    ) -> Result<Vec<SearchHit>> {
        let mut hits = self.search_with_distances(embedding, top_k)?;
        hits.retain(|hit| hit.distance <= max_distance);
        Ok(hits)
    }

    /// Get the entry at `position`
    pub fn get(&self, position: usize) -> Option<Entry> {
        self.labels.get(position).map(|label| Entry {
            position,
            text: label.text.clone(),
            metadata: label.metadata.clone(),
        })
    }

    /// List up to `limit` entries in insertion order
    pub fn entries(&self, limit: usize) -> Vec<Entry> {
        self.labels
            .iter()
            .take(limit)
            .enumerate()
            .map(|(position, label)| Entry {
                position,
                text: label.text.clone(),
                metadata: label.metadata.clone(),
            })
            .collect()
    }

    /// All label texts in insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.iter().map(|label| label.text.as_str())
    }

    /// Get the number of entries in the store
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The fixed embedding dimension of this store
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Entry count and dimension, as reported by the health endpoint
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.len(),
            dimension: self.dimension(),
        }
    }

    /// Get a reference to the underlying index.
    pub fn index(&self) -> &I {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Neighbor, NO_MATCH};
    use approx::assert_relative_eq;

    fn scenario_store() -> VectorLabelStore {
        let mut store = VectorLabelStore::new(2).unwrap();
        store.add(&[0.0, 0.0], "origin").unwrap();
        store.add(&[1.0, 0.0], "right").unwrap();
        store.add(&[0.0, 5.0], "far").unwrap();
        store
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = VectorLabelStore::new(4).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), 4);
        assert_eq!(store.stats(), StoreStats { entries: 0, dimension: 4 });
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            VectorLabelStore::new(0),
            Err(LabelStoreError::InvalidDimension)
        ));
    }

    #[test]
    fn test_add_returns_positions() {
        let mut store = VectorLabelStore::new(2).unwrap();
        assert_eq!(store.add(&[0.0, 0.0], "a").unwrap(), 0);
        assert_eq!(store.add(&[1.0, 1.0], "b").unwrap(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.index().len(), 2);
        assert_eq!(store.get(1).unwrap().text, "b");
    }

    #[test]
    fn test_add_dimension_mismatch_leaves_store_unchanged() {
        let mut store = VectorLabelStore::new(2).unwrap();
        store.add(&[0.0, 0.0], "a").unwrap();

        let result = store.add(&[1.0, 2.0, 3.0], "bad");
        assert!(matches!(
            result,
            Err(LabelStoreError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.index().len(), 1);
    }

    #[test]
    fn test_search_scenario() {
        let store = scenario_store();
        let results = store.search(&[0.1, 0.0], 2).unwrap();
        assert_eq!(results, vec!["origin", "right"]);
    }

    #[test]
    fn test_search_default_top_k() {
        let mut store = scenario_store();
        store.add(&[9.0, 9.0], "corner").unwrap();
        let results = store.search_default(&[0.0, 0.0]).unwrap();
        assert_eq!(results, vec!["origin", "right", "far"]);
    }

    #[test]
    fn test_search_empty_store() {
        let store = VectorLabelStore::new(3).unwrap();
        assert!(store.search(&[1.0, 2.0, 3.0], 5).unwrap().is_empty());
        // empty store short-circuits before the length check
        assert!(store.search(&[1.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_search_zero_top_k() {
        let store = scenario_store();
        assert!(store.search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_top_k_larger_than_store() {
        let store = scenario_store();
        let results = store.search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(results, vec!["origin", "right", "far"]);
    }

    #[test]
    fn test_search_huge_top_k_returns_every_entry() {
        let store = scenario_store();
        let results = store.search(&[0.0, 0.0], usize::MAX).unwrap();
        assert_eq!(results, vec!["origin", "right", "far"]);
    }

    #[test]
    fn test_metadata_round_trips() {
        let mut store = VectorLabelStore::new(2).unwrap();
        let mut metadata = Metadata::new();
        metadata.insert("type".to_string(), Value::from("idea"));
        metadata.insert("priority".to_string(), Value::from(2));

        store.add(&[0.0, 0.0], "plain").unwrap();
        store
            .add_with_metadata(&[1.0, 0.0], "tagged", metadata.clone())
            .unwrap();

        assert_eq!(store.get(1).unwrap().metadata, metadata);
        assert!(store.get(0).unwrap().metadata.is_empty());

        let hits = store.search_with_distances(&[1.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].text, "tagged");
        assert_eq!(hits[0].metadata, metadata);

        let positions = store
            .add_batch_with_metadata(vec![(vec![5.0f32, 5.0], "batched", metadata.clone())])
            .unwrap();
        assert_eq!(store.entries(10)[positions[0]].metadata, metadata);
    }

    #[test]
    fn test_search_query_dimension_mismatch() {
        let store = scenario_store();
        assert!(matches!(
            store.search(&[0.0, 0.0, 0.0], 2),
            Err(LabelStoreError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_search_with_distances() {
        let store = scenario_store();
        let hits = store.search_with_distances(&[0.0, 1.0], 3).unwrap();

        assert_eq!(hits[0].text, "origin");
        assert_eq!(hits[0].position, 0);
        assert_relative_eq!(hits[0].distance, 1.0, epsilon = 1e-6);
        assert_eq!(hits[1].text, "right");
        assert_relative_eq!(hits[1].distance, 2.0f32.sqrt(), epsilon = 1e-6);
        assert_eq!(hits[2].text, "far");
        assert_relative_eq!(hits[2].distance, 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_search_within() {
        let store = scenario_store();
        let hits = store.search_within(&[0.0, 0.0], 3, 1.0).unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["origin", "right"]);
    }

    #[test]
    fn test_add_batch_is_all_or_nothing() {
        let mut store = VectorLabelStore::new(2).unwrap();
        let result = store.add_batch(vec![
            (vec![0.0f32, 0.0], "a"),
            (vec![1.0f32], "short"),
        ]);
        assert!(matches!(result, Err(LabelStoreError::DimensionMismatch { .. })));
        assert!(store.is_empty());

        let positions = store
            .add_batch(vec![(vec![0.0f32, 0.0], "a"), (vec![1.0f32, 1.0], "b")])
            .unwrap();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(store.labels().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_add_batch_parallel_length_mismatch() {
        let mut store = VectorLabelStore::new(1).unwrap();
        let result =
            store.add_batch_parallel(vec![vec![0.0f32], vec![1.0f32]], vec!["only"]);
        assert!(matches!(
            result,
            Err(LabelStoreError::BatchLengthMismatch {
                embeddings: 2,
                texts: 1
            })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_entries_respects_limit() {
        let store = scenario_store();
        let entries = store.entries(2);
        assert_eq!(
            entries,
            vec![
                Entry {
                    position: 0,
                    text: "origin".to_string(),
                    metadata: Metadata::new(),
                },
                Entry {
                    position: 1,
                    text: "right".to_string(),
                    metadata: Metadata::new(),
                },
            ]
        );
        assert_eq!(store.entries(100).len(), 3);
        assert!(store.get(3).is_none());
    }

    /// Index that pads every answer with sentinels and an out-of-range slot.
    #[derive(Debug, Default)]
    struct PaddingIndex {
        rows: usize,
    }

    impl NeighborIndex for PaddingIndex {
        fn dimension(&self) -> usize {
            1
        }

        fn len(&self) -> usize {
            self.rows
        }

        fn insert(&mut self, _vector: &[f32]) -> Result<usize> {
            self.rows += 1;
            Ok(self.rows - 1)
        }

        fn query(&self, _vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
            let mut out = vec![Neighbor { position: NO_MATCH, distance: f32::MAX }];
            out.push(Neighbor::new(self.rows + 5, 0.0));
            out.extend((0..self.rows).map(|p| Neighbor::new(p, p as f32)));
            out.truncate(k.max(3));
            Ok(out)
        }
    }

    #[test]
    fn test_sentinels_are_filtered() {
        let mut store = VectorLabelStore::with_index(PaddingIndex::default()).unwrap();
        store.add(&[0.0], "only").unwrap();

        let results = store.search(&[0.0], 3).unwrap();
        assert_eq!(results, vec!["only"]);
    }

    /// Index that reports a position the store did not expect.
    #[derive(Debug, Default)]
    struct SkippingIndex {
        rows: usize,
    }

    impl NeighborIndex for SkippingIndex {
        fn dimension(&self) -> usize {
            1
        }

        fn len(&self) -> usize {
            self.rows
        }

        fn insert(&mut self, _vector: &[f32]) -> Result<usize> {
            self.rows += 1;
            Ok(self.rows + 10)
        }

        fn query(&self, _vector: &[f32], _k: usize) -> Result<Vec<Neighbor>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_position_desync_rejects_later_operations() {
        let mut store = VectorLabelStore::with_index(SkippingIndex::default()).unwrap();
        assert!(matches!(
            store.add(&[0.0], "x"),
            Err(LabelStoreError::Capability(_))
        ));
        assert_eq!(store.index().len(), 1);
        assert_eq!(store.len(), 0);

        // the unlabeled vector blocks further inserts without touching the index
        assert!(matches!(
            store.add(&[1.0], "y"),
            Err(LabelStoreError::Capability(_))
        ));
        assert_eq!(store.index().len(), 1);
        assert_eq!(store.len(), 0);

        assert!(matches!(
            store.search(&[0.0], 1),
            Err(LabelStoreError::Capability(_))
        ));
    }

    #[test]
    fn test_with_index_rejects_populated_index() {
        let mut index = FlatIndex::new(2).unwrap();
        index.insert(&[0.0, 0.0]).unwrap();
        assert!(matches!(
            VectorLabelStore::with_index(index),
            Err(LabelStoreError::Capability(_))
        ));
    }
}
