//! # Orchestration
//!
//! The flows that tie entities, verification, settlement, and the content
//! selector together: task submission, settlement processing, single-flight
//! task execution, and the synchronous reading flow.

pub mod dispatcher;
pub mod payment_processor;
pub mod reading_flow;
pub mod task_submitter;

pub use dispatcher::WorkerDispatcher;
pub use payment_processor::{
    apply_quote_observation, process_settlement, refresh_quote, SettlementAck,
    SettlementNotification,
};
pub use reading_flow::{ask_oracle, OracleAsk, OracleOutcome};
pub use task_submitter::submit_task;
