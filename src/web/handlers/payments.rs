//! Settlement callback endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::orchestration::{process_settlement, SettlementNotification};
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SettlementRequest {
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub idempotency_key: String,
    pub proof: Option<String>,
}

/// Accept a settlement notification. The cached response body is replayed
/// byte-identically for duplicate deliveries; only the `idempotent_replay`
/// flag differs between first processing and replay.
pub async fn settle(
    State(state): State<AppState>,
    Json(body): Json<SettlementRequest>,
) -> ApiResult<Json<Value>> {
    let ack = process_settlement(
        &state.core,
        SettlementNotification {
            task_id: body.task_id,
            amount: body.amount,
            payment_id: body.payment_id,
            idempotency_key: body.idempotency_key,
            proof: body.proof,
        },
    )
    .await?;

    if !ack.replayed {
        state.trigger_dispatch();
    }

    let mut response = ack.response;
    if let Some(object) = response.as_object_mut() {
        object.insert("idempotent_replay".to_string(), Value::Bool(ack.replayed));
    }
    Ok(Json(response))
}
