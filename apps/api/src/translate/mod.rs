//! Natural-Language Query Translator: maps a free-text request to a
//! `StructuredQuery` for the executor to run. The translator never executes
//! the query itself; that separation keeps it swappable and testable
//! independent of execution.

pub mod fallback;
pub mod oracle;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::query::{QueryProvenance, StructuredQuery};
use crate::snapshot::PoolSnapshot;

/// Translation output: the structured query plus where it came from, so
/// downstream UX can indicate confidence.
#[derive(Debug, Clone, Serialize)]
pub struct TranslatedQuery {
    pub query: StructuredQuery,
    pub provenance: QueryProvenance,
}

/// Pluggable translator backend, held in `AppState` as
/// `Arc<dyn QueryTranslator>`. Translation is infallible by contract: a
/// degraded structured query beats no results, so backends fall back
/// rather than error.
#[async_trait]
pub trait QueryTranslator: Send + Sync {
    async fn translate(&self, free_text: &str, snapshot: &PoolSnapshot) -> TranslatedQuery;
}
