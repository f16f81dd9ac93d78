//! # Quote Poller
//!
//! Periodically re-queries pending upstream quotes for tasks still awaiting
//! payment. Two throttles bound upstream load: a per-quote staleness floor
//! (a quote checked more recently than the floor is skipped) and a per-tick
//! batch cap. Selection happens in store order under one lock acquisition;
//! the upstream calls run with the lock released, and each result is
//! written back in its own critical section so one bad quote never stalls
//! the rest of the batch.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::events;
use crate::models::VerificationMode;
use crate::orchestration::apply_quote_observation;
use crate::service::ServiceCore;
use crate::state_machine::TaskStatus;

/// What one poller tick did, for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TickSummary {
    pub attempted: usize,
    pub settled: usize,
    pub skipped: usize,
    pub errors: usize,
}

pub struct QuotePoller {
    core: Arc<ServiceCore>,
}

impl QuotePoller {
    pub fn new(core: Arc<ServiceCore>) -> Self {
        Self { core }
    }

    /// Run one poll cycle. Returns a summary of what was attempted.
    pub async fn tick(&self) -> TickSummary {
        let mut summary = TickSummary::default();
        let now = Utc::now();
        let min_age_ms = self.core.config.quote_refresh_min_age_ms;
        let batch_size = self.core.config.quote_refresh_batch_size;

        let batch: Vec<(Uuid, String)> = {
            let mut state = self.core.state.lock();
            let mut eligible = Vec::new();
            let mut skipped = 0usize;
            for task in state.tasks.iter() {
                if task.status != TaskStatus::AwaitingPayment || !task.payment.quote.is_pending() {
                    continue;
                }
                let Some(quote) = task.payment.quote.quote() else {
                    continue;
                };
                let stale = match quote.last_checked_at {
                    None => true,
                    Some(checked) => (now - checked).num_milliseconds() >= min_age_ms,
                };
                if stale {
                    eligible.push((task.id, quote.quote_id.clone()));
                } else {
                    skipped += 1;
                }
            }
            // quotes past the batch cap stay eligible for the next tick,
            // they are not counted as skipped
            eligible.truncate(batch_size);
            state.metrics.quote_refresh_skipped_total += skipped as u64;
            state.metrics.quote_refresh_attempts_total += eligible.len() as u64;
            summary.skipped = skipped;
            summary.attempted = eligible.len();
            eligible
        };

        for (task_id, quote_id) in batch {
            match self.core.gateway.check_quote(&quote_id).await {
                Ok(observed) => {
                    let mut state = self.core.state.lock();
                    match apply_quote_observation(&mut state, &task_id, &observed.state) {
                        Ok(true) => {
                            summary.settled += 1;
                            self.core.persist_logged(&state);
                            self.core
                                .events
                                .publish(events::QUOTE_SETTLED, json!({"task_id": task_id}));
                            self.core.events.publish(
                                events::TASK_PAID,
                                json!({
                                    "task_id": task_id,
                                    "mode": VerificationMode::MintQuoteState.to_string(),
                                }),
                            );
                            info!(task_id = %task_id, state = %observed.state, "quote settled");
                        }
                        Ok(false) => {
                            self.core.persist_logged(&state);
                            debug!(task_id = %task_id, state = %observed.state, "quote still pending");
                        }
                        Err(err) => {
                            summary.errors += 1;
                            state.metrics.quote_refresh_errors_total += 1;
                            warn!(task_id = %task_id, error = %err, "quote observation failed");
                        }
                    }
                }
                Err(err) => {
                    summary.errors += 1;
                    let mut state = self.core.state.lock();
                    state.metrics.quote_refresh_errors_total += 1;
                    warn!(task_id = %task_id, error = %err, "quote check failed");
                }
            }
        }

        summary
    }
}
