//! Closed set of exposed operations, one tagged variant per operation with
//! a typed input and output. A tool-invocation layer posts these to
//! `/api/v1/ops`; adding an operation means extending the variant, never
//! string matching on names.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::query::StructuredQuery;
use crate::network::graph::NetworkStats;
use crate::network::handlers::{build_graph, colleagues, shortest_path, ColleaguesResponse, PathResponse};
use crate::search::executor::execute;
use crate::search::handlers::SearchResponse;
use crate::similarity::engine::{find_similar, SimilarityResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpRequest {
    SimilaritySearch {
        candidate_id: Uuid,
        #[serde(default)]
        limit: Option<usize>,
    },
    StructuredSearch {
        query: StructuredQuery,
        #[serde(default)]
        page: usize,
        #[serde(default)]
        page_size: Option<usize>,
    },
    NlSearch {
        text: String,
        #[serde(default)]
        page: usize,
        #[serde(default)]
        page_size: Option<usize>,
    },
    ColleagueLookup {
        candidate_id: Uuid,
    },
    NetworkPath {
        from: Uuid,
        to: Uuid,
    },
    NetworkStats {},
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpResponse {
    SimilaritySearch(SimilarityResult),
    StructuredSearch(SearchResponse),
    NlSearch(SearchResponse),
    ColleagueLookup(ColleaguesResponse),
    NetworkPath(PathResponse),
    NetworkStats(NetworkStats),
}

/// POST /api/v1/ops
pub async fn handle_op(
    State(state): State<AppState>,
    Json(req): Json<OpRequest>,
) -> Result<Json<OpResponse>, AppError> {
    Ok(Json(dispatch(&state, req).await?))
}

/// Dispatches one operation against the active snapshot. Every arm reads
/// exactly one snapshot for its whole lifetime.
pub async fn dispatch(state: &AppState, req: OpRequest) -> Result<OpResponse, AppError> {
    let snapshot = state.snapshots.load();
    let today = Utc::now().date_naive();

    match req {
        OpRequest::SimilaritySearch {
            candidate_id,
            limit,
        } => Ok(OpResponse::SimilaritySearch(find_similar(
            candidate_id,
            &snapshot,
            limit,
            &state.config.feature_weights,
        ))),

        OpRequest::StructuredSearch {
            query,
            page,
            page_size,
        } => {
            let result = execute(
                &query,
                &snapshot,
                page,
                page_size,
                state.normalizer.synonyms(),
                &state.config.page_limits,
                today,
            )?;
            Ok(OpResponse::StructuredSearch(SearchResponse {
                provenance: crate::models::query::QueryProvenance::Direct,
                query,
                page: result,
            }))
        }

        OpRequest::NlSearch {
            text,
            page,
            page_size,
        } => {
            if text.trim().is_empty() {
                return Err(AppError::Validation("empty query text".to_string()));
            }
            let translated = state.translator.translate(&text, &snapshot).await;
            let result = execute(
                &translated.query,
                &snapshot,
                page,
                page_size,
                state.normalizer.synonyms(),
                &state.config.page_limits,
                today,
            )?;
            Ok(OpResponse::NlSearch(SearchResponse {
                provenance: translated.provenance,
                query: translated.query,
                page: result,
            }))
        }

        OpRequest::ColleagueLookup { candidate_id } => Ok(OpResponse::ColleagueLookup(
            colleagues(&snapshot, candidate_id)?,
        )),

        OpRequest::NetworkPath { from, to } => Ok(OpResponse::NetworkPath(shortest_path(
            &snapshot, from, to,
        )?)),

        OpRequest::NetworkStats {} => {
            let graph = build_graph(&snapshot)?;
            Ok(OpResponse::NetworkStats(graph.stats(snapshot.len())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_request_tag_round_trip() {
        let req: OpRequest = serde_json::from_str(
            r#"{"op": "similarity_search", "candidate_id": "00000000-0000-0000-0000-000000000001"}"#,
        )
        .unwrap();
        assert!(matches!(req, OpRequest::SimilaritySearch { limit: None, .. }));
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let parsed: Result<OpRequest, _> =
            serde_json::from_str(r#"{"op": "drop_all_tables"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_structured_search_op_carries_query() {
        let req: OpRequest = serde_json::from_str(
            r#"{"op": "structured_search", "query": {"organization": "Acme"}, "page": 2}"#,
        )
        .unwrap();
        match req {
            OpRequest::StructuredSearch { query, page, .. } => {
                assert_eq!(query.organization.as_deref(), Some("Acme"));
                assert_eq!(page, 2);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
