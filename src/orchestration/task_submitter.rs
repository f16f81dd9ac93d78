//! Task submission: quote first, then the task record.
//!
//! The upstream quote is created before any state mutation, so a gateway
//! failure leaves no half-created task behind.

use serde_json::{json, Value};
use tracing::info;

use crate::constants::events;
use crate::error::{Result, ServiceError};
use crate::models::{MintQuote, Payment};
use crate::service::ServiceCore;

const INPUT_MAX_CHARS: usize = 4000;

/// Create a task in `awaiting_payment` with a freshly issued payment quote.
pub async fn submit_task(core: &ServiceCore, input: &str) -> Result<Value> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ServiceError::validation("input is required"));
    }
    if input.chars().count() > INPUT_MAX_CHARS {
        return Err(ServiceError::validation(format!(
            "input exceeds {INPUT_MAX_CHARS} characters"
        )));
    }

    let amount = core.config.task_price;
    let quote = core.gateway.create_quote(amount, "task execution").await?;

    let mut state = core.state.lock();
    let task_id = state.tasks.create(
        input.to_string(),
        amount,
        Payment::with_quote(MintQuote {
            quote_id: quote.quote_id,
            request: quote.request,
            amount: quote.amount,
            unit: quote.unit,
            state: quote.state,
            expiry: quote.expiry,
            last_checked_at: None,
        }),
    );
    state.metrics.tasks_created_total += 1;
    core.persist(&state)?;
    core.events
        .publish(events::TASK_CREATED, json!({"task_id": task_id}));
    info!(task_id = %task_id, amount, "task created");

    let task = state.tasks.get(&task_id).ok_or(ServiceError::Internal)?;
    Ok(task.to_public())
}
