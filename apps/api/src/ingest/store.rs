//! Candidate persistence. The core depends on exactly two operations:
//! load the full pool (to build a snapshot) and replace one candidate's
//! record wholesale. Candidates are stored as one row each with the full
//! normalized record in JSONB.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::candidate::{Candidate, CandidateRow};

/// Loads the entire candidate pool, ordered by id for deterministic
/// snapshot construction.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Candidate>> {
    let rows: Vec<CandidateRow> =
        sqlx::query_as("SELECT * FROM candidates ORDER BY id")
            .fetch_all(pool)
            .await
            .context("loading candidate pool")?;

    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row.record)
                .with_context(|| format!("corrupt candidate record {}", row.id))
        })
        .collect()
}

/// Inserts or wholesale-replaces one candidate. Re-parsing a resume never
/// partially mutates the stored record.
pub async fn upsert(pool: &PgPool, candidate: &Candidate) -> Result<()> {
    let record = serde_json::to_value(candidate).context("serializing candidate")?;
    sqlx::query(
        r#"
        INSERT INTO candidates (id, display_name, record, created_at, updated_at)
        VALUES ($1, $2, $3, now(), now())
        ON CONFLICT (id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                record = EXCLUDED.record,
                updated_at = now()
        "#,
    )
    .bind(candidate.id)
    .bind(&candidate.display_name)
    .bind(record)
    .execute(pool)
    .await
    .context("upserting candidate")?;
    Ok(())
}

/// Deletes a candidate. Returns false when the id was already absent.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("deleting candidate")?;
    Ok(result.rows_affected() > 0)
}
