//! # Entity Store and Service State
//!
//! The single owned aggregate of all process-wide mutable state: tasks,
//! readings, idempotency ledger, recent-content ring, receipts, totals,
//! counters, and the dispatcher's busy flag. It is passed explicitly to
//! every operation and guarded by one mutex — never ambient global state.

use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::ledger::IdempotencyLedger;
use crate::metrics::Metrics;
use crate::models::{Payment, Reading, Receipt, RecentEntry, Task, Totals};
use crate::state_machine::{PaymentStatus, StateMachineError, TaskStatus};

/// Task store with insertion-order iteration. Store order is the stable
/// order the poller and dispatcher select in.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    order: Vec<Uuid>,
    tasks: HashMap<Uuid, Task>,
}

impl TaskStore {
    /// Create a task in `awaiting_payment` and return its id.
    pub fn create(&mut self, input: String, quoted_amount: u64, payment: Payment) -> Uuid {
        let task = Task::new(input, quoted_amount, payment);
        let id = task.id;
        self.order.push(id);
        self.tasks.insert(id, task);
        id
    }

    /// Re-insert a persisted task, preserving snapshot order.
    pub fn insert(&mut self, task: Task) {
        let id = task.id;
        if !self.tasks.contains_key(&id) {
            self.order.push(id);
        }
        self.tasks.insert(id, task);
    }

    pub fn get(&self, id: &Uuid) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    /// Insertion-order iteration.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// First task in store order with the given status.
    pub fn first_with_status(&self, status: TaskStatus) -> Option<Uuid> {
        self.iter().find(|t| t.status == status).map(|t| t.id)
    }

    /// Validate and apply a forward-only transition, stamping `<status>_at`
    /// and `updated_at`. Fails with `InvalidTransition` and leaves state
    /// unchanged when the target does not follow the current status.
    pub fn transition(&mut self, id: &Uuid, next: TaskStatus) -> Result<(), ServiceError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| ServiceError::NotFound("task not found".to_string()))?;
        if !task.status.can_transition_to(next) {
            return Err(StateMachineError::InvalidTransition {
                from: task.status.to_string(),
                to: next.to_string(),
            }
            .into());
        }
        let ts = Utc::now();
        task.status = next;
        task.updated_at = ts;
        task.status_timestamps.insert(format!("{next}_at"), ts);
        Ok(())
    }
}

impl From<StateMachineError> for ServiceError {
    fn from(err: StateMachineError) -> Self {
        ServiceError::conflict(crate::constants::codes::ALREADY_PAID, err.to_string())
    }
}

/// Everything the service owns. All mutation happens through `&mut` access
/// under the service mutex; check-then-act sequences never straddle an
/// await while holding a borrow.
#[derive(Debug, Default, Clone)]
pub struct ServiceState {
    pub tasks: TaskStore,
    pub readings: HashMap<Uuid, Reading>,
    /// Newest-first ring of paid-content projections.
    pub recent: VecDeque<RecentEntry>,
    pub totals: Totals,
    /// Newest-first settlement receipts.
    pub receipts: VecDeque<Receipt>,
    pub ledger: IdempotencyLedger,
    pub metrics: Metrics,
    /// Single-flight guard for the worker dispatcher.
    pub worker_busy: bool,
    /// Next recent-ring sequence number; monotonic across restarts.
    pub next_seq: u64,
}

impl ServiceState {
    pub fn new() -> Self {
        Self {
            next_seq: 1,
            ..Default::default()
        }
    }

    /// Record a verified settlement on a task: payment fields and the
    /// awaiting_payment → paid transition set atomically in one operation.
    pub fn record_settlement(
        &mut self,
        id: &Uuid,
        payment_id: String,
        amount: u64,
        idempotency_key: String,
        mode: crate::models::VerificationMode,
    ) -> Result<(), ServiceError> {
        self.tasks.transition(id, TaskStatus::Paid)?;
        // transition validated; the task exists
        if let Some(task) = self.tasks.get_mut(id) {
            task.payment.status = PaymentStatus::Received;
            task.payment.payment_id = Some(payment_id);
            task.payment.amount = Some(amount);
            task.payment.idempotency_key = Some(idempotency_key);
            task.payment.verification_mode = Some(mode);
        }
        self.metrics.payments_received_total += 1;
        Ok(())
    }

    /// Push a recent-ring entry, assigning its sequence number and trimming
    /// to the cap. Returns the assigned seq.
    pub fn push_recent(&mut self, mut entry: RecentEntry, cap: usize) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        entry.seq = seq;
        self.recent.push_front(entry);
        self.recent.truncate(cap);
        seq
    }

    /// Push a settlement receipt, newest first, trimming to the cap.
    pub fn push_receipt(&mut self, receipt: Receipt, cap: usize) {
        self.receipts.push_front(receipt);
        self.receipts.truncate(cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MintQuote, VerificationMode};

    fn quoted_payment() -> Payment {
        Payment::with_quote(MintQuote {
            quote_id: "q-1".to_string(),
            request: "lnbc...".to_string(),
            amount: 100,
            unit: "sat".to_string(),
            state: "UNPAID".to_string(),
            expiry: None,
            last_checked_at: None,
        })
    }

    #[test]
    fn create_then_get() {
        let mut store = TaskStore::default();
        let id = store.create("summarize this".to_string(), 100, quoted_payment());
        let task = store.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::AwaitingPayment);
        assert_eq!(task.quoted_amount, 100);
    }

    #[test]
    fn transition_stamps_timestamp_and_updated_at() {
        let mut store = TaskStore::default();
        let id = store.create("x".to_string(), 100, quoted_payment());
        store.transition(&id, TaskStatus::Paid).unwrap();
        let task = store.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Paid);
        assert!(task.status_timestamps.contains_key("paid_at"));
    }

    #[test]
    fn out_of_order_transition_fails_and_leaves_state_unchanged() {
        let mut store = TaskStore::default();
        let id = store.create("x".to_string(), 100, quoted_payment());
        let err = store.transition(&id, TaskStatus::Running).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));
        let task = store.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::AwaitingPayment);
        assert!(!task.status_timestamps.contains_key("running_at"));
    }

    #[test]
    fn iteration_is_insertion_ordered() {
        let mut store = TaskStore::default();
        let a = store.create("a".to_string(), 100, quoted_payment());
        let b = store.create("b".to_string(), 100, quoted_payment());
        let c = store.create("c".to_string(), 100, quoted_payment());
        let ids: Vec<Uuid> = store.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        store.transition(&b, TaskStatus::Paid).unwrap();
        assert_eq!(store.first_with_status(TaskStatus::Paid), Some(b));
    }

    #[test]
    fn record_settlement_sets_payment_atomically() {
        let mut state = ServiceState::new();
        let id = state
            .tasks
            .create("x".to_string(), 100, quoted_payment());
        state
            .record_settlement(
                &id,
                "pay-1".to_string(),
                100,
                "key-1".to_string(),
                VerificationMode::TrustCallback,
            )
            .unwrap();
        let task = state.tasks.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Paid);
        assert_eq!(task.payment.status, PaymentStatus::Received);
        assert_eq!(task.payment.amount, Some(100));
        assert_eq!(state.metrics.payments_received_total, 1);

        // a second settlement on the same task is rejected
        let err = state
            .record_settlement(
                &id,
                "pay-2".to_string(),
                100,
                "key-2".to_string(),
                VerificationMode::TrustCallback,
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));
    }

    #[test]
    fn recent_ring_is_capped_and_seq_monotonic() {
        let mut state = ServiceState::new();
        for i in 0..5 {
            let entry = RecentEntry {
                seq: 0,
                reading_id: Uuid::new_v4(),
                question: format!("q{i}"),
                style: crate::models::Style::Funny,
                fortune: String::new(),
                lucky_number: 1,
                created_at: Utc::now(),
                paid_at: Utc::now(),
            };
            state.push_recent(entry, 3);
        }
        assert_eq!(state.recent.len(), 3);
        // newest first, seq strictly decreasing front to back
        let seqs: Vec<u64> = state.recent.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![5, 4, 3]);
    }
}
