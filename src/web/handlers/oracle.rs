//! Synchronous oracle endpoints: ask, recent feed, and aggregate stats.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::constants::codes;
use crate::orchestration::{ask_oracle, OracleAsk, OracleOutcome};
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

const RECENT_DEFAULT_LIMIT: usize = 20;
const RECENT_MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    pub style: Option<String>,
    /// Payment token; the `X-Cashu` header takes precedence when both are
    /// present.
    pub token: Option<String>,
}

pub async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AskRequest>,
) -> ApiResult<Response> {
    let header_proof = headers
        .get("x-cashu")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let outcome = ask_oracle(
        &state.core,
        OracleAsk {
            question: body.question,
            style: body.style,
            proof: header_proof.or(body.token),
        },
    )
    .await?;

    Ok(match outcome {
        OracleOutcome::Paid(response) => Json(response).into_response(),
        OracleOutcome::PaymentRequired(payment) => {
            let encoded = payment["payment_request"].as_str().unwrap_or_default().to_string();
            let body = json!({
                "error": {
                    "code": codes::PAYMENT_REQUIRED,
                    "message": "payment required",
                },
                "payment": payment,
            });
            let mut response = (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response();
            // mirror the encoded request in the header clients pay from
            if let Ok(value) = HeaderValue::from_str(&encoded) {
                response.headers_mut().insert("x-cashu", value);
            }
            response
        }
    })
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    /// Cursor: return entries with seq strictly below this value.
    pub before_seq: Option<u64>,
    pub limit: Option<usize>,
}

/// Newest-first page of paid readings, cursored on the monotonic sequence
/// number rather than timestamps.
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<serde_json::Value> {
    let limit = query
        .limit
        .unwrap_or(RECENT_DEFAULT_LIMIT)
        .clamp(1, RECENT_MAX_LIMIT);
    let core_state = state.core.state.lock();
    // over-fetch by one so the cursor is only emitted when an older entry
    // actually remains in the ring
    let mut entries: Vec<_> = core_state
        .recent
        .iter()
        .filter(|entry| query.before_seq.map_or(true, |cursor| entry.seq < cursor))
        .take(limit + 1)
        .cloned()
        .collect();
    let next_before_seq = if entries.len() > limit {
        entries.truncate(limit);
        entries.last().map(|entry| entry.seq)
    } else {
        None
    };
    Json(json!({
        "entries": entries,
        "next_before_seq": next_before_seq,
    }))
}

pub async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let core_state = state.core.state.lock();
    Json(json!({
        "paid_count": core_state.totals.paid_count,
        "amount_received": core_state.totals.amount_received,
        "recent_count": core_state.recent.len(),
        "tasks_total": core_state.tasks.len(),
    }))
}
