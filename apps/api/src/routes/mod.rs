pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::ingest::handlers as ingest;
use crate::network::handlers as network;
use crate::ops;
use crate::search::handlers as search;
use crate::similarity::handlers as similarity;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ingestion
        .route("/api/v1/resumes", post(ingest::handle_ingest))
        .route("/api/v1/resumes/:id", delete(ingest::handle_delete))
        // Search
        .route("/api/v1/search", post(search::handle_search))
        .route("/api/v1/search/nl", post(search::handle_nl_search))
        .route("/api/v1/search/similar", post(similarity::handle_similar))
        // Network
        .route(
            "/api/v1/network/:id/colleagues",
            get(network::handle_colleagues),
        )
        .route(
            "/api/v1/network/:id/component",
            get(network::handle_component),
        )
        .route("/api/v1/network/path", get(network::handle_path))
        .route("/api/v1/network/stats", get(network::handle_stats))
        // Tool-invocation surface: one closed tagged-variant per operation
        .route("/api/v1/ops", post(ops::handle_op))
        .with_state(state)
}
