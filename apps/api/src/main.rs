mod cache;
mod config;
mod db;
mod errors;
mod ingest;
mod models;
mod network;
mod ops;
mod oracle;
mod routes;
mod search;
mod similarity;
mod snapshot;
mod state;
mod translate;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::ingest::normalizer::Normalizer;
use crate::ingest::skills::SkillSynonyms;
use crate::ingest::store;
use crate::oracle::OracleClient;
use crate::routes::build_router;
use crate::snapshot::{PoolSnapshot, SnapshotStore};
use crate::state::AppState;
use crate::translate::oracle::OracleTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rolodex API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Initialize Redis (optional memoization; every failure is a cache miss)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize the NL oracle client with its mandatory timeout
    let oracle_client = OracleClient::new(
        config.oracle_api_key.clone(),
        Duration::from_secs(config.oracle_timeout_secs),
    );
    info!("Oracle client initialized (model: {})", oracle::MODEL);

    // Translator: oracle-backed with deterministic keyword fallback
    let translator = Arc::new(OracleTranslator::new(oracle_client));

    // Normalizer shared by ingestion and query execution
    let normalizer = Arc::new(Normalizer::new(
        SkillSynonyms::default(),
        config.seniority_thresholds.clone(),
    ));

    // Load the candidate pool and publish the initial snapshot
    let candidates = store::load_all(&db).await?;
    info!("Loaded {} candidates from storage", candidates.len());
    let snapshots = SnapshotStore::new(PoolSnapshot::empty());
    snapshots.publish(candidates);

    let state = AppState {
        db,
        redis,
        snapshots,
        normalizer,
        translator,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
