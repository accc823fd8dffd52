//! HTTP route handlers for the label store API.

use crate::error::LabelStoreError;
use crate::server::AppState;
use crate::metrics::LatencySummary;
use crate::store::{Entry, Metadata, SearchHit};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Entries returned by `GET /entries` when no limit is given.
pub const DEFAULT_LIST_LIMIT: usize = 100;

// --- Request/Response types ---

#[derive(Deserialize)]
pub struct AddRequest {
    pub embedding: Vec<f32>,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Deserialize)]
pub struct BatchAddRequest {
    pub items: Vec<AddRequest>,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub embedding: Vec<f32>,
    pub top_k: Option<usize>,
    pub max_distance: Option<f32>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub entries: usize,
    pub dimension: usize,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub total_searches: u64,
    pub total_inserts: u64,
    pub total_rejected: u64,
    pub search_latency: LatencySummary,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn lock_poisoned() -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Lock poisoned")
}

fn store_error(state: &AppState, e: LabelStoreError) -> ApiError {
    let status = match e {
        LabelStoreError::DimensionMismatch { .. }
        | LabelStoreError::BatchLengthMismatch { .. }
        | LabelStoreError::InvalidVector { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::BAD_REQUEST {
        if let Ok(mut metrics) = state.metrics.write() {
            metrics.record_rejected();
        }
    } else {
        tracing::error!(error = %e, "store operation failed");
    }
    api_error(status, e.to_string())
}

// --- Router ---

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/entries", post(add_entry).get(list_entries))
        .route("/entries/batch", post(add_batch))
        .route("/entries/:position", get(get_entry))
        .route("/search", post(search))
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

// --- Handlers ---

async fn add_entry(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let position = {
        let mut store = state.store.write().map_err(|_| lock_poisoned())?;
        store
            .add_with_metadata(&req.embedding, req.text, req.metadata)
            .map_err(|e| store_error(&state, e))?
    };

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_inserts(1);
    }

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"position": position, "status": "inserted"})),
    ))
}

async fn add_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchAddRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let positions = {
        let mut store = state.store.write().map_err(|_| lock_poisoned())?;
        store
            .add_batch_with_metadata(
                req.items
                    .into_iter()
                    .map(|item| (item.embedding, item.text, item.metadata)),
            )
            .map_err(|e| store_error(&state, e))?
    };

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_inserts(positions.len());
    }

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"positions": positions, "status": "inserted"})),
    ))
}

async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
) -> Result<Json<Entry>, ApiError> {
    let store = state.store.read().map_err(|_| lock_poisoned())?;

    store.get(position).map(Json).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("Entry not found: {}", position),
        )
    })
}

async fn list_entries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let store = state.store.read().map_err(|_| lock_poisoned())?;
    Ok(Json(
        store.entries(params.limit.unwrap_or(DEFAULT_LIST_LIMIT)),
    ))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let top_k = req.top_k.unwrap_or(state.default_top_k);

    let start = Instant::now();
    let hits = {
        let store = state.store.read().map_err(|_| lock_poisoned())?;
        let result = match req.max_distance {
            Some(max_distance) => store.search_within(&req.embedding, top_k, max_distance),
            None => store.search_with_distances(&req.embedding, top_k),
        };
        result.map_err(|e| store_error(&state, e))?
    };
    let elapsed = start.elapsed();

    if let Ok(mut metrics) = state.metrics.write() {
        metrics.record_search(elapsed);
    }

    Ok(Json(hits))
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let stats = state.store.read().map_err(|_| lock_poisoned())?.stats();

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        entries: stats.entries,
        dimension: stats.dimension,
    }))
}

async fn get_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let metrics = state.metrics.read().map_err(|_| lock_poisoned())?;

    Ok(Json(MetricsResponse {
        total_searches: metrics.searches(),
        total_inserts: metrics.inserts(),
        total_rejected: metrics.rejected(),
        search_latency: metrics.latency_summary(),
    }))
}
