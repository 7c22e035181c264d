//! Recent search terms (JSON API)
//!
//! The list is capped, deduplicated and persisted to the state file on
//! every change.

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SearchesResponse {
    pub terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordSearch {
    pub term: String,
}

pub async fn api_searches(State(state): State<AppState>) -> Json<SearchesResponse> {
    let ledger = state.ledger.read().await;
    Json(SearchesResponse {
        terms: ledger.recent_searches().to_vec(),
    })
}

/// Remember a search term
pub async fn api_searches_record(
    State(state): State<AppState>,
    Json(body): Json<RecordSearch>,
) -> ApiResult<Json<SearchesResponse>> {
    if body.term.trim().is_empty() {
        return Err(ApiError::bad_request("Search term must not be empty"));
    }
    let mut ledger = state.ledger.write().await;
    ledger.record_search(&body.term).await?;
    Ok(Json(SearchesResponse {
        terms: ledger.recent_searches().to_vec(),
    }))
}

pub async fn api_searches_clear(State(state): State<AppState>) -> ApiResult<Json<SearchesResponse>> {
    let mut ledger = state.ledger.write().await;
    ledger.clear_searches().await?;
    Ok(Json(SearchesResponse { terms: Vec::new() }))
}
