//! HTTP routes for the journal service.
//!
//! REST API for journal entry CRUD and LLM-backed analysis. Request bodies
//! are parsed explicitly so malformed payloads map to 400 rather than the
//! framework's default rejection.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use journal_common::Error as ServiceError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analysis::{AnalysisError, AnalysisResult, Analyzer};
use crate::store::{Entry, EntryCreate, EntryStore, EntryUpdate};

/// Shared state for all entry routes.
#[derive(Clone)]
pub struct AppState {
    pub store: EntryStore,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(store: EntryStore, analyzer: Arc<Analyzer>) -> Self {
        Self { store, analyzer }
    }
}

/// Error body for all failure responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Detail-only success body.
#[derive(Debug, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

/// Response for entry creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEntryResponse {
    pub detail: String,
    pub entry: Entry,
}

/// Response for listing all entries.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEntriesResponse {
    pub entries: Vec<Entry>,
    pub count: usize,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a service error to its status code and detail body.
fn service_error(err: ServiceError) -> ApiError {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.to_string())))
}

fn bad_request(detail: impl Into<String>) -> ApiError {
    service_error(ServiceError::InvalidInput(detail.into()))
}

fn not_found() -> ApiError {
    service_error(ServiceError::NotFound("Entry not found".into()))
}

fn internal(detail: impl Into<String>) -> ApiError {
    service_error(ServiceError::Internal(detail.into()))
}

/// Build the entry API routes.
pub fn entry_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/entries",
            post(create_entry)
                .get(list_entries)
                .delete(delete_all_entries),
        )
        .route(
            "/entries/:id",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
        .route("/entries/:id/analyze", post(analyze_entry))
        .route("/health", get(health))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "journal-api",
    }))
}

/// Create a new journal entry.
///
/// POST /entries
async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<CreateEntryResponse>), ApiError> {
    let fields: EntryCreate = serde_json::from_value(body)
        .map_err(|e| bad_request(format!("Error creating entry: {}", e)))?;

    for (name, value) in [
        ("work", &fields.work),
        ("struggle", &fields.struggle),
        ("intention", &fields.intention),
    ] {
        if value.trim().is_empty() {
            return Err(bad_request(format!("Field '{}' must be non-empty", name)));
        }
    }

    match state.store.create(&fields) {
        Ok(entry) => {
            tracing::info!(entry_id = %entry.id, "Created entry");
            Ok((
                StatusCode::CREATED,
                Json(CreateEntryResponse {
                    detail: "Entry created successfully".into(),
                    entry,
                }),
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create entry");
            Err(bad_request(format!("Error creating entry: {}", e)))
        }
    }
}

/// List all journal entries.
///
/// GET /entries
async fn list_entries(
    State(state): State<AppState>,
) -> Result<Json<ListEntriesResponse>, ApiError> {
    match state.store.list_all() {
        Ok(entries) => {
            let count = entries.len();
            Ok(Json(ListEntriesResponse { entries, count }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list entries");
            Err(internal(format!("Error listing entries: {}", e)))
        }
    }
}

/// Get a specific journal entry.
///
/// GET /entries/:id
async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Entry>, ApiError> {
    match state.store.get(&id) {
        Ok(Some(entry)) => Ok(Json(entry)),
        Ok(None) => Err(not_found()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get entry");
            Err(internal(format!("Error getting entry: {}", e)))
        }
    }
}

/// Apply a partial update to a journal entry.
///
/// PATCH /entries/:id
async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Entry>, ApiError> {
    // Unknown keys are a 400, not silently dropped
    let update: EntryUpdate = serde_json::from_value(body)
        .map_err(|e| bad_request(format!("Error updating entry: {}", e)))?;

    if update.is_empty() {
        return Err(bad_request("No fields to update"));
    }

    for (name, value) in [
        ("work", &update.work),
        ("struggle", &update.struggle),
        ("intention", &update.intention),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(bad_request(format!("Field '{}' must be non-empty", name)));
        }
    }

    match state.store.update(&id, &update) {
        Ok(Some(entry)) => Ok(Json(entry)),
        Ok(None) => Err(not_found()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update entry");
            Err(internal(format!("Error updating entry: {}", e)))
        }
    }
}

/// Delete a specific journal entry.
///
/// DELETE /entries/:id
async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DetailResponse>, ApiError> {
    match state.store.delete(&id) {
        Ok(true) => Ok(Json(DetailResponse {
            detail: "Entry deleted".into(),
        })),
        Ok(false) => Err(not_found()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete entry");
            Err(internal(format!("Error deleting entry: {}", e)))
        }
    }
}

/// Delete all journal entries.
///
/// DELETE /entries
async fn delete_all_entries(
    State(state): State<AppState>,
) -> Result<Json<DetailResponse>, ApiError> {
    match state.store.delete_all() {
        Ok(()) => Ok(Json(DetailResponse {
            detail: "All entries deleted".into(),
        })),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete all entries");
            Err(internal(format!("Error deleting entries: {}", e)))
        }
    }
}

/// Analyze a journal entry via the LLM.
///
/// POST /entries/:id/analyze
async fn analyze_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisResult>, ApiError> {
    match state.analyzer.analyze_entry(&state.store, &id).await {
        Ok(result) => Ok(Json(result)),
        Err(AnalysisError::EntryNotFound(_)) => Err(not_found()),
        Err(e) => {
            tracing::error!(error = %e, entry_id = %id, "Analysis failed");
            Err(internal(format!("Error analyzing entry: {}", e)))
        }
    }
}
