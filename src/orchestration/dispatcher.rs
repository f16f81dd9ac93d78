//! # Worker Dispatcher
//!
//! Single-flight execution of paid tasks. A busy flag claimed under the
//! state lock guarantees at most one task runs at a time no matter how many
//! triggers race; the work function itself runs between lock acquisitions
//! with a panic boundary so a poisoned input fails one task, not the
//! process.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::brief::build_structured_brief;
use crate::constants::events;
use crate::service::ServiceCore;
use crate::state_machine::TaskStatus;

#[derive(Clone)]
pub struct WorkerDispatcher {
    core: Arc<ServiceCore>,
}

impl WorkerDispatcher {
    pub fn new(core: Arc<ServiceCore>) -> Self {
        Self { core }
    }

    /// Run at most one paid task. Re-entrant triggers while a task is in
    /// flight return immediately; the next trigger picks up remaining work.
    pub fn trigger(&self) {
        let Some((task_id, input)) = self.claim() else {
            return;
        };

        let result = catch_unwind(AssertUnwindSafe(|| build_structured_brief(&input)));
        self.finish(task_id, result.ok());
    }

    /// Claim the oldest paid task: set the busy flag and move the task to
    /// running in one critical section.
    fn claim(&self) -> Option<(Uuid, String)> {
        let mut state = self.core.state.lock();
        if state.worker_busy {
            return None;
        }
        let task_id = state.tasks.first_with_status(TaskStatus::Paid)?;
        let input = state.tasks.get(&task_id)?.input.clone();
        if let Err(err) = state.tasks.transition(&task_id, TaskStatus::Running) {
            error!(task_id = %task_id, error = %err, "could not start claimed task");
            return None;
        }
        state.worker_busy = true;
        self.core.persist_logged(&state);
        self.core
            .events
            .publish(events::TASK_RUNNING, json!({"task_id": task_id}));
        Some((task_id, input))
    }

    fn finish(&self, task_id: Uuid, brief: Option<serde_json::Value>) {
        let mut state = self.core.state.lock();
        state.metrics.worker_runs_total += 1;
        match brief {
            Some(brief) => {
                if let Some(task) = state.tasks.get_mut(&task_id) {
                    task.result = Some(brief);
                }
                match state.tasks.transition(&task_id, TaskStatus::Completed) {
                    Ok(()) => {
                        state.metrics.tasks_completed_total += 1;
                        info!(task_id = %task_id, "task completed");
                        self.core
                            .events
                            .publish(events::TASK_COMPLETED, json!({"task_id": task_id}));
                    }
                    Err(err) => error!(task_id = %task_id, error = %err, "completion transition failed"),
                }
            }
            None => {
                if let Some(task) = state.tasks.get_mut(&task_id) {
                    task.error = Some("task execution failed".to_string());
                }
                match state.tasks.transition(&task_id, TaskStatus::Failed) {
                    Ok(()) => {
                        state.metrics.tasks_failed_total += 1;
                        error!(task_id = %task_id, "task failed");
                        self.core
                            .events
                            .publish(events::TASK_FAILED, json!({"task_id": task_id}));
                    }
                    Err(err) => error!(task_id = %task_id, error = %err, "failure transition failed"),
                }
            }
        }
        state.worker_busy = false;
        self.core.persist_logged(&state);
    }
}
