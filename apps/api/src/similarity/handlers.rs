use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::cache;
use crate::errors::AppError;
use crate::similarity::engine::{find_similar, SimilarityResult, DEFAULT_LIMIT};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SimilarRequest {
    pub candidate_id: uuid::Uuid,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Cache input for a similarity request. Keyed by the effective limit, so
/// an omitted limit and an explicit default share an entry while `limit: 0`
/// gets its own.
fn cache_input(candidate_id: uuid::Uuid, limit: Option<usize>) -> String {
    format!("{}:{}", candidate_id, limit.unwrap_or(DEFAULT_LIMIT))
}

/// POST /api/v1/search/similar
///
/// The engine is a pure function of (reference, snapshot), so results are
/// memoized by (reference id, effective limit, snapshot version).
pub async fn handle_similar(
    State(state): State<AppState>,
    Json(req): Json<SimilarRequest>,
) -> Result<Json<SimilarityResult>, AppError> {
    let snapshot = state.snapshots.load();
    let cache_key = cache::key(
        "similar",
        snapshot.version,
        &cache_input(req.candidate_id, req.limit),
    );

    if let Some(cached) = cache::get::<SimilarityResult>(&state.redis, &cache_key).await {
        return Ok(Json(cached));
    }

    let result = find_similar(
        req.candidate_id,
        &snapshot,
        req.limit,
        &state.config.feature_weights,
    );
    cache::put(&state.redis, &cache_key, &result).await;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_zero_limit_gets_its_own_cache_entry() {
        let id = Uuid::from_u128(1);
        assert_ne!(cache_input(id, None), cache_input(id, Some(0)));
    }

    #[test]
    fn test_omitted_limit_shares_entry_with_explicit_default() {
        let id = Uuid::from_u128(1);
        assert_eq!(cache_input(id, None), cache_input(id, Some(DEFAULT_LIMIT)));
    }
}
