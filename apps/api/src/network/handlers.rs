use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache;
use crate::errors::AppError;
use crate::network::edges::{build_edges, ColleagueEdge};
use crate::network::graph::{NetworkGraph, NetworkStats};
use crate::snapshot::PoolSnapshot;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ColleagueEntry {
    pub candidate_id: Uuid,
    pub display_name: Option<String>,
    pub edge: ColleagueEdge,
}

/// `candidate_found = false` with empty colleagues means the id was absent
/// from the snapshot, an expected race with pool updates, not an error.
#[derive(Debug, Serialize)]
pub struct ColleaguesResponse {
    pub candidate_id: Uuid,
    pub candidate_found: bool,
    pub colleagues: Vec<ColleagueEntry>,
}

/// GET /api/v1/network/:id/colleagues
pub async fn handle_colleagues(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ColleaguesResponse>, AppError> {
    let snapshot = state.snapshots.load();
    Ok(Json(colleagues(&snapshot, id)?))
}

pub fn colleagues(snapshot: &PoolSnapshot, id: Uuid) -> Result<ColleaguesResponse, AppError> {
    if snapshot.get(id).is_none() {
        return Ok(ColleaguesResponse {
            candidate_id: id,
            candidate_found: false,
            colleagues: Vec::new(),
        });
    }

    let graph = build_graph(snapshot)?;
    let colleagues = graph
        .neighbors(id)
        .into_iter()
        .map(|(neighbor, edge)| ColleagueEntry {
            candidate_id: neighbor,
            display_name: snapshot.get(neighbor).map(|c| c.display_name.clone()),
            edge: edge.clone(),
        })
        .collect();

    Ok(ColleaguesResponse {
        candidate_id: id,
        candidate_found: true,
        colleagues,
    })
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub from: Uuid,
    pub to: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub from: Uuid,
    pub to: Uuid,
    pub reachable: bool,
    /// Shortest sequence of candidate ids, inclusive of both endpoints;
    /// empty when unreachable.
    pub path: Vec<Uuid>,
}

/// GET /api/v1/network/path?from=&to=
pub async fn handle_path(
    State(state): State<AppState>,
    Query(params): Query<PathQuery>,
) -> Result<Json<PathResponse>, AppError> {
    let snapshot = state.snapshots.load();
    Ok(Json(shortest_path(&snapshot, params.from, params.to)?))
}

pub fn shortest_path(
    snapshot: &PoolSnapshot,
    from: Uuid,
    to: Uuid,
) -> Result<PathResponse, AppError> {
    let graph = build_graph(snapshot)?;
    let path = graph.shortest_path(from, to);
    Ok(PathResponse {
        from,
        to,
        reachable: path.is_some(),
        path: path.unwrap_or_default(),
    })
}

#[derive(Debug, Serialize)]
pub struct ComponentResponse {
    pub candidate_id: Uuid,
    pub candidate_found: bool,
    /// Ids in the candidate's connected component, sorted ascending. A
    /// connected candidate always appears in its own component; isolated
    /// candidates have an empty one.
    pub component: Vec<Uuid>,
}

/// GET /api/v1/network/:id/component
pub async fn handle_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ComponentResponse>, AppError> {
    let snapshot = state.snapshots.load();
    let candidate_found = snapshot.get(id).is_some();
    let component = if candidate_found {
        build_graph(&snapshot)?.connected_component(id)
    } else {
        Vec::new()
    };
    Ok(Json(ComponentResponse {
        candidate_id: id,
        candidate_found,
        component,
    }))
}

/// GET /api/v1/network/stats
///
/// Edge building is deterministic per snapshot, so the stats are memoized
/// by snapshot version alone.
pub async fn handle_stats(
    State(state): State<AppState>,
) -> Result<Json<NetworkStats>, AppError> {
    let snapshot = state.snapshots.load();
    let cache_key = cache::key("network_stats", snapshot.version, "all");

    if let Some(cached) = cache::get::<NetworkStats>(&state.redis, &cache_key).await {
        return Ok(Json(cached));
    }

    let graph = build_graph(&snapshot)?;
    let stats = graph.stats(snapshot.len());
    cache::put(&state.redis, &cache_key, &stats).await;
    Ok(Json(stats))
}

/// Builds the colleague graph for a snapshot and checks the symmetry
/// invariant before handing it to queries.
pub fn build_graph(snapshot: &PoolSnapshot) -> Result<NetworkGraph, AppError> {
    let edges = build_edges(snapshot, Utc::now().date_naive());
    let graph = NetworkGraph::from_edges(edges);
    graph.verify_symmetric().map_err(AppError::Inconsistency)?;
    Ok(graph)
}
