use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::ingest::normalizer::Normalizer;
use crate::snapshot::SnapshotStore;
use crate::translate::QueryTranslator;

/// Shared application state injected into all route handlers via Axum
/// extractors. The snapshot store is the single source of truth for the
/// candidate pool; everything else is derived per request.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Optional memoization of similarity/network results keyed by snapshot
    /// version. Every cache failure is treated as a miss.
    pub redis: RedisClient,
    pub snapshots: SnapshotStore,
    pub normalizer: Arc<Normalizer>,
    /// Pluggable NL translator. Default: OracleTranslator with keyword
    /// fallback; tests swap in KeywordTranslator directly.
    pub translator: Arc<dyn QueryTranslator>,
    pub config: Config,
}
