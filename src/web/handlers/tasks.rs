//! Queued-task endpoints: submission, status, and manual quote refresh.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::orchestration::{refresh_quote, submit_task};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub input: String,
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let created = submit_task(&state.core, &body.input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let task_id = parse_task_id(&task_id)?;
    let core_state = state.core.state.lock();
    let task = core_state
        .tasks
        .get(&task_id)
        .ok_or_else(|| ApiError::from(ServiceError::NotFound("task not found".to_string())))?;
    Ok(Json(task.to_public()))
}

/// Re-query the task's quote on demand; a settled observation releases the
/// task to the dispatcher immediately.
pub async fn refresh_task_quote(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let task_id = parse_task_id(&task_id)?;
    let refreshed = refresh_quote(&state.core, &task_id).await?;
    if refreshed["paid"] == true {
        state.trigger_dispatch();
    }
    Ok(Json(refreshed))
}

fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    // an unparsable id is indistinguishable from an unknown one
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::from(ServiceError::NotFound("task not found".to_string())))
}
