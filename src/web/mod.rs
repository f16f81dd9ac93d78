//! # HTTP Surface
//!
//! Thin axum layer over the orchestration flows: extraction, the error
//! envelope, and routing live here; all semantics live below.

pub mod errors;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::service::ServiceCore;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

pub fn build_router(core: Arc<ServiceCore>) -> Router {
    let state = AppState::new(core);
    Router::new()
        .route("/health", get(handlers::system::health))
        .route("/metrics", get(handlers::system::metrics))
        .route("/api/tasks", post(handlers::tasks::create_task))
        .route("/api/tasks/{task_id}", get(handlers::tasks::get_task))
        .route(
            "/api/tasks/{task_id}/refresh-quote",
            post(handlers::tasks::refresh_task_quote),
        )
        .route("/api/payments/settlement", post(handlers::payments::settle))
        .route("/api/oracle/ask", post(handlers::oracle::ask))
        .route("/api/oracle/recent", get(handlers::oracle::recent))
        .route("/api/oracle/stats", get(handlers::oracle::stats))
        .with_state(state)
}
