//! Batch resume ingestion. Per-record normalization failures are isolated:
//! one bad resume never aborts the batch; the failing record is reported
//! and excluded. A successful batch persists its candidates and publishes a
//! new pool snapshot in one atomic pointer swap.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::normalizer::RawResume;
use crate::ingest::store;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestBatchRequest {
    pub resumes: Vec<RawResume>,
}

#[derive(Debug, Serialize)]
pub struct RejectedResume {
    /// Zero-based index into the submitted batch.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct IngestBatchResponse {
    pub accepted: Vec<Uuid>,
    pub rejected: Vec<RejectedResume>,
    pub snapshot_version: u64,
}

/// POST /api/v1/resumes
pub async fn handle_ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestBatchRequest>,
) -> Result<Json<IngestBatchResponse>, AppError> {
    if req.resumes.is_empty() {
        return Err(AppError::Validation("empty resume batch".to_string()));
    }

    let today = Utc::now().date_naive();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, raw) in req.resumes.iter().enumerate() {
        match state.normalizer.normalize(raw, today) {
            Ok(candidate) => {
                store::upsert(&state.db, &candidate)
                    .await
                    .map_err(AppError::Internal)?;
                accepted.push(candidate.id);
            }
            Err(e) => rejected.push(RejectedResume {
                index,
                reason: e.to_string(),
            }),
        }
    }

    let snapshot_version = publish_snapshot(&state).await?;
    info!(
        "ingested batch: {} accepted, {} rejected, snapshot v{}",
        accepted.len(),
        rejected.len(),
        snapshot_version
    );

    Ok(Json(IngestBatchResponse {
        accepted,
        rejected,
        snapshot_version,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub snapshot_version: u64,
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = store::delete(&state.db, id)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound(format!("candidate {id} not found")));
    }
    let snapshot_version = publish_snapshot(&state).await?;
    Ok(Json(DeleteResponse {
        deleted,
        snapshot_version,
    }))
}

/// Reloads the full pool and swaps in a new snapshot. In-flight requests
/// keep the snapshot they started with.
async fn publish_snapshot(state: &AppState) -> Result<u64, AppError> {
    let candidates = store::load_all(&state.db)
        .await
        .map_err(AppError::Internal)?;
    Ok(state.snapshots.publish(candidates))
}
