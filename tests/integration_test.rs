//! Integration tests for the label store

use vector_label_store::{LabelStoreError, VectorLabelStore, DEFAULT_TOP_K};

#[test]
fn test_basic_workflow() {
    let mut store = VectorLabelStore::new(3).unwrap();
    assert!(store.search(&[1.0, 0.0, 0.0], 3).unwrap().is_empty());

    store.add(&[1.0, 0.0, 0.0], "x axis").unwrap();
    store.add(&[0.0, 1.0, 0.0], "y axis").unwrap();
    store.add(&[0.0, 0.0, 1.0], "z axis").unwrap();
    assert_eq!(store.len(), 3);

    let results = store.search(&[1.0, 0.1, 0.0], 2).unwrap();
    assert_eq!(results, vec!["x axis", "y axis"]);
}

#[test]
fn test_concrete_scenario() {
    let mut store = VectorLabelStore::new(2).unwrap();
    store.add(&[0.0, 0.0], "origin").unwrap();
    store.add(&[1.0, 0.0], "right").unwrap();
    store.add(&[0.0, 5.0], "far").unwrap();

    assert_eq!(store.search(&[0.1, 0.0], 2).unwrap(), vec!["origin", "right"]);
}

#[test]
fn test_nearest_to_farthest_order() {
    let mut store = VectorLabelStore::new(2).unwrap();
    // inserted out of distance order
    store.add(&[3.0, 0.0], "third").unwrap();
    store.add(&[1.0, 0.0], "first").unwrap();
    store.add(&[0.0, 2.0], "second").unwrap();

    assert_eq!(
        store.search(&[0.0, 0.0], 3).unwrap(),
        vec!["first", "second", "third"]
    );
}

#[test]
fn test_top_k_boundaries() {
    let mut store = VectorLabelStore::new(2).unwrap();
    store.add(&[0.0, 0.0], "a").unwrap();
    store.add(&[2.0, 0.0], "b").unwrap();

    assert!(store.search(&[0.0, 0.0], 0).unwrap().is_empty());
    assert_eq!(store.search(&[0.0, 0.0], 50).unwrap(), vec!["a", "b"]);
    assert_eq!(store.search_default(&[0.0, 0.0]).unwrap().len(), 2.min(DEFAULT_TOP_K));
}

#[test]
fn test_dimension_mismatch_on_add_and_search() {
    let mut store = VectorLabelStore::new(2).unwrap();
    assert!(matches!(
        store.add(&[1.0], "short"),
        Err(LabelStoreError::DimensionMismatch { expected: 2, actual: 1 })
    ));
    assert!(store.is_empty());

    store.add(&[1.0, 1.0], "ok").unwrap();
    assert!(matches!(
        store.search(&[1.0, 1.0, 1.0], 1),
        Err(LabelStoreError::DimensionMismatch { expected: 2, actual: 3 })
    ));
}

#[test]
fn test_batch_then_search_within() {
    let mut store = VectorLabelStore::new(1).unwrap();
    let positions = store
        .add_batch_parallel(vec![vec![0.0f32], vec![1.0], vec![10.0]], vec!["zero", "one", "ten"])
        .unwrap();
    assert_eq!(positions, vec![0, 1, 2]);

    let hits = store.search_within(&[0.0], 3, 1.5).unwrap();
    let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["zero", "one"]);
    assert_eq!(hits[1].position, 1);
}
