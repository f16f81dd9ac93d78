//! # Settlement Processing
//!
//! The queued-flow payment paths: the settlement callback with its
//! idempotency guarantee, and the shared settled-quote application used by
//! both the poller and the manual refresh.
//!
//! The callback runs in three phases so the state mutex is never held
//! across the verification await:
//!
//! 1. validate under the lock (replay fast path, existence, amount, status)
//! 2. verify with the lock released
//! 3. re-validate and mutate under the lock as one unit

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::constants::{codes, events, QUOTE_KEY_PREFIX};
use crate::error::{Result, ServiceError};
use crate::ledger::{event_fingerprint, LedgerLookup};
use crate::models::{QuoteBinding, VerificationMode};
use crate::service::ServiceCore;
use crate::settlement::is_settled_state;
use crate::state_machine::TaskStatus;
use crate::store::ServiceState;
use crate::verification::VerifyRequest;

/// An inbound settlement notification for a queued task.
#[derive(Debug, Clone)]
pub struct SettlementNotification {
    pub task_id: String,
    pub amount: u64,
    pub payment_id: String,
    pub idempotency_key: String,
    pub proof: Option<String>,
}

/// Acknowledgement of a processed settlement. The response body is
/// byte-identical across replays; the flag is carried separately.
#[derive(Debug, Clone)]
pub struct SettlementAck {
    pub response: Value,
    pub replayed: bool,
}

impl SettlementNotification {
    fn validate(&self) -> Result<Uuid> {
        if self.payment_id.trim().is_empty() {
            return Err(ServiceError::validation("payment_id is required"));
        }
        if self.idempotency_key.trim().is_empty() {
            return Err(ServiceError::validation("idempotency_key is required"));
        }
        Uuid::parse_str(&self.task_id)
            .map_err(|_| ServiceError::NotFound("task not found".to_string()))
    }
}

/// Process a settlement notification end to end.
pub async fn process_settlement(
    core: &ServiceCore,
    notification: SettlementNotification,
) -> Result<SettlementAck> {
    let task_id = notification.validate()?;
    let key = notification.idempotency_key.clone();
    let fingerprint = event_fingerprint(
        &notification.task_id,
        notification.amount,
        &notification.payment_id,
    );

    // phase 1: validate under the lock
    {
        let mut state = core.state.lock();
        if let LedgerLookup::Replay(response) = state.ledger.lookup(&key, &fingerprint)? {
            state.metrics.payment_replays_total += 1;
            info!(task_id = %task_id, idempotency_key = %key, "settlement replayed");
            return Ok(SettlementAck {
                response,
                replayed: true,
            });
        }
        let task = state
            .tasks
            .get(&task_id)
            .ok_or_else(|| ServiceError::NotFound("task not found".to_string()))?;
        if notification.amount != task.quoted_amount {
            return Err(ServiceError::conflict(
                codes::AMOUNT_MISMATCH,
                format!("expected amount {}", task.quoted_amount),
            ));
        }
        if task.status != TaskStatus::AwaitingPayment {
            return Err(ServiceError::conflict(
                codes::ALREADY_PAID,
                format!("task is {}, not awaiting_payment", task.status),
            ));
        }
    }

    // phase 2: verify with the lock released
    let outcome = core
        .verification
        .verify(VerifyRequest {
            task_id: &notification.task_id,
            amount: notification.amount,
            payment_id: &notification.payment_id,
            idempotency_key: &key,
            proof: notification.proof.as_deref(),
        })
        .await;
    if !outcome.accepted {
        let reason = outcome
            .detail
            .unwrap_or_else(|| "payment could not be verified".to_string());
        warn!(task_id = %task_id, mode = %outcome.mode, reason = %reason, "payment rejected");
        return Err(ServiceError::PaymentRejected(reason));
    }

    // phase 3: re-validate and mutate as one unit
    let mut state = core.state.lock();
    let mut ledger = std::mem::take(&mut state.ledger);
    let recorded = ledger.record_or_replay(&key, &fingerprint, &mut *state, |state| {
        state.record_settlement(
            &task_id,
            notification.payment_id.clone(),
            notification.amount,
            key.clone(),
            outcome.mode,
        )?;
        let task = state
            .tasks
            .get(&task_id)
            .ok_or(ServiceError::Internal)?;
        Ok(json!({
            "ok": true,
            "task_id": task.id,
            "status": task.status,
            "payment": task.payment.redacted(),
            "status_timestamps": task.status_timestamps,
        }))
    });
    state.ledger = ledger;
    let (response, replayed) = recorded?;

    if replayed {
        state.metrics.payment_replays_total += 1;
    } else {
        core.persist(&state)?;
        core.events.publish(
            events::TASK_PAID,
            json!({"task_id": task_id, "mode": outcome.mode.to_string()}),
        );
        info!(task_id = %task_id, mode = %outcome.mode, "settlement recorded");
    }

    Ok(SettlementAck { response, replayed })
}

/// Write an observed upstream quote state onto a task; when the state means
/// settlement occurred and the task still awaits payment, apply the same
/// paid effects as the callback path under a synthesized idempotency key.
///
/// Returns whether the task transitioned to paid.
pub fn apply_quote_observation(
    state: &mut ServiceState,
    task_id: &Uuid,
    observed: &str,
) -> Result<bool> {
    let now = Utc::now();
    let (quote_id, amount, awaiting) = {
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| ServiceError::NotFound("task not found".to_string()))?;
        let quote = task
            .payment
            .quote
            .quote_mut()
            .ok_or_else(|| ServiceError::validation("task has no payment quote"))?;
        quote.state = observed.to_string();
        quote.last_checked_at = Some(now);
        task.updated_at = now;
        (
            quote.quote_id.clone(),
            task.quoted_amount,
            task.status == TaskStatus::AwaitingPayment,
        )
    };

    if !(is_settled_state(observed) && awaiting) {
        return Ok(false);
    }

    let key = format!("{QUOTE_KEY_PREFIX}{quote_id}");
    state.record_settlement(
        task_id,
        quote_id,
        amount,
        key,
        VerificationMode::MintQuoteState,
    )?;
    if let Some(task) = state.tasks.get_mut(task_id) {
        let binding = std::mem::replace(&mut task.payment.quote, QuoteBinding::None);
        task.payment.quote = match binding {
            QuoteBinding::Pending { quote } => QuoteBinding::Settled { quote },
            other => other,
        };
    }
    Ok(true)
}

/// On-demand re-query of a task's quote, sharing the poller's settled path.
pub async fn refresh_quote(core: &ServiceCore, task_id: &Uuid) -> Result<Value> {
    let quote_id = {
        let state = core.state.lock();
        let task = state
            .tasks
            .get(task_id)
            .ok_or_else(|| ServiceError::NotFound("task not found".to_string()))?;
        let quote = task
            .payment
            .quote
            .quote()
            .ok_or_else(|| ServiceError::validation("task has no payment quote"))?;
        quote.quote_id.clone()
    };

    let observed = core.gateway.check_quote(&quote_id).await?;

    let mut state = core.state.lock();
    let paid = apply_quote_observation(&mut state, task_id, &observed.state)?;
    core.persist(&state)?;
    if paid {
        core.events
            .publish(events::QUOTE_SETTLED, json!({"task_id": task_id}));
        core.events
            .publish(events::TASK_PAID, json!({"task_id": task_id, "mode": VerificationMode::MintQuoteState.to_string()}));
        info!(task_id = %task_id, "quote settled on refresh");
    }
    let task = state.tasks.get(task_id).ok_or(ServiceError::Internal)?;
    Ok(json!({
        "task": task.to_public(),
        "quote_state": observed.state,
        "paid": paid,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MintQuote, Payment};
    use crate::state_machine::PaymentStatus;

    fn state_with_quoted_task(quote_id: &str, state_str: &str) -> (ServiceState, Uuid) {
        let mut state = ServiceState::new();
        let id = state.tasks.create(
            "summarize this".to_string(),
            100,
            Payment::with_quote(MintQuote {
                quote_id: quote_id.to_string(),
                request: "lnbc...".to_string(),
                amount: 100,
                unit: "sat".to_string(),
                state: state_str.to_string(),
                expiry: None,
                last_checked_at: None,
            }),
        );
        (state, id)
    }

    #[test]
    fn unsettled_observation_only_updates_quote_view() {
        let (mut state, id) = state_with_quoted_task("q-1", "UNPAID");
        let paid = apply_quote_observation(&mut state, &id, "UNPAID").unwrap();
        assert!(!paid);
        let task = state.tasks.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::AwaitingPayment);
        let quote = task.payment.quote.quote().unwrap();
        assert!(quote.last_checked_at.is_some());
        assert_eq!(quote.state, "UNPAID");
    }

    #[test]
    fn settled_observation_applies_paid_effects() {
        let (mut state, id) = state_with_quoted_task("q-1", "UNPAID");
        let paid = apply_quote_observation(&mut state, &id, "ISSUED").unwrap();
        assert!(paid);
        let task = state.tasks.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Paid);
        assert_eq!(task.payment.status, PaymentStatus::Received);
        assert_eq!(task.payment.payment_id.as_deref(), Some("q-1"));
        assert_eq!(
            task.payment.idempotency_key.as_deref(),
            Some("mintquote:q-1")
        );
        assert_eq!(
            task.payment.verification_mode,
            Some(VerificationMode::MintQuoteState)
        );
        assert!(matches!(task.payment.quote, QuoteBinding::Settled { .. }));
        assert_eq!(state.metrics.payments_received_total, 1);
    }

    #[test]
    fn settled_observation_on_paid_task_is_a_no_op() {
        let (mut state, id) = state_with_quoted_task("q-1", "UNPAID");
        apply_quote_observation(&mut state, &id, "ISSUED").unwrap();
        let paid = apply_quote_observation(&mut state, &id, "PAID").unwrap();
        assert!(!paid);
        assert_eq!(state.metrics.payments_received_total, 1);
        // the view still tracks the latest observed state
        let task = state.tasks.get(&id).unwrap();
        assert_eq!(task.payment.quote.quote().unwrap().state, "PAID");
    }
}
