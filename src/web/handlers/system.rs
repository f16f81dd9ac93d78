//! Health and metrics endpoints.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::web::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let core_state = state.core.state.lock();
    Json(json!({
        "ok": true,
        "environment": state.core.config.environment,
        "tasks": core_state.tasks.len(),
        "readings": core_state.readings.len(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub token: Option<String>,
}

/// Plaintext counters. Loopback callers are always allowed; remote callers
/// must present the configured token as a bearer header or `token` query
/// parameter.
pub async fn metrics(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<MetricsQuery>,
) -> Result<String, StatusCode> {
    if !metrics_allowed(&state, peer, &headers, query.token.as_deref()) {
        return Err(StatusCode::FORBIDDEN);
    }
    let core_state = state.core.state.lock();
    Ok(core_state.metrics.render())
}

fn metrics_allowed(
    state: &AppState,
    peer: SocketAddr,
    headers: &HeaderMap,
    query_token: Option<&str>,
) -> bool {
    if peer.ip().is_loopback() {
        return true;
    }
    let Some(expected) = state.core.config.metrics_token.as_deref() else {
        return false;
    };
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer == Some(expected) || query_token == Some(expected)
}
