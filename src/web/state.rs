//! Shared handler state.

use std::sync::Arc;

use crate::orchestration::WorkerDispatcher;
use crate::service::ServiceCore;

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<ServiceCore>,
    pub dispatcher: WorkerDispatcher,
}

impl AppState {
    pub fn new(core: Arc<ServiceCore>) -> Self {
        let dispatcher = WorkerDispatcher::new(core.clone());
        Self { core, dispatcher }
    }

    /// Run the dispatcher off the request path; its work is synchronous CPU.
    pub fn trigger_dispatch(&self) {
        let dispatcher = self.dispatcher.clone();
        tokio::task::spawn_blocking(move || dispatcher.trigger());
    }
}
