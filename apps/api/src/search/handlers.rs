use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::query::{QueryProvenance, StructuredQuery};
use crate::search::executor::{execute, SearchPage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StructuredSearchRequest {
    #[serde(flatten)]
    pub query: StructuredQuery,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub provenance: QueryProvenance,
    /// The query that was actually executed. For NL search this echoes the
    /// translation so callers can inspect what the oracle understood.
    pub query: StructuredQuery,
    #[serde(flatten)]
    pub page: SearchPage,
}

/// POST /api/v1/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<StructuredSearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let snapshot = state.snapshots.load();
    let page = execute(
        &req.query,
        &snapshot,
        req.page,
        req.page_size,
        state.normalizer.synonyms(),
        &state.config.page_limits,
        Utc::now().date_naive(),
    )?;
    Ok(Json(SearchResponse {
        provenance: QueryProvenance::Direct,
        query: req.query,
        page,
    }))
}

#[derive(Debug, Deserialize)]
pub struct NlSearchRequest {
    pub text: String,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// POST /api/v1/search/nl
///
/// Translation is strictly separate from execution: the translator only
/// produces a `StructuredQuery`, which then runs through the same executor
/// as a human-authored query.
pub async fn handle_nl_search(
    State(state): State<AppState>,
    Json(req): Json<NlSearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("empty query text".to_string()));
    }
    let snapshot = state.snapshots.load();
    let translated = state.translator.translate(&req.text, &snapshot).await;
    let page = execute(
        &translated.query,
        &snapshot,
        req.page,
        req.page_size,
        state.normalizer.synonyms(),
        &state.config.page_limits,
        Utc::now().date_naive(),
    )?;
    Ok(Json(SearchResponse {
        provenance: translated.provenance,
        query: translated.query,
        page,
    }))
}
