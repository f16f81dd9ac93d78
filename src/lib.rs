//! # paygate-core
//!
//! A payment-gated task pipeline with two money flows:
//!
//! - **Queued flow** — a task is created with an upstream payment quote and
//!   held in `awaiting_payment`; a verified settlement (callback or poller
//!   observation) releases it to a single-flight worker that produces a
//!   structured brief.
//! - **Synchronous flow** — an oracle reading is paid inline per call: no
//!   payment token yields an HTTP 402 challenge, a redeemed token covering
//!   the price yields deterministic, seeded content.
//!
//! Settlement confirmation is idempotent: duplicate deliveries of the same
//! logical event replay the recorded response byte-identically, and key
//! reuse across different events is a conflict. All state lives in one
//! aggregate persisted through an atomic snapshot file.

pub mod brief;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod ledger;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod oracle;
pub mod orchestration;
pub mod service;
pub mod settlement;
pub mod snapshot;
pub mod state_machine;
pub mod store;
pub mod verification;
pub mod wallet;
pub mod web;

pub use error::{Result, ServiceError};
pub use service::ServiceCore;
