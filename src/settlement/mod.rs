//! # Settlement Authority Interface
//!
//! The upstream service that issues payment quotes and reports their state.
//! Consumed behind a trait so the poller and the submission path can be
//! exercised against a scripted gateway in tests.

pub mod http;
pub mod poller;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

pub use http::HttpSettlementGateway;
pub use poller::{QuotePoller, TickSummary};

/// Version prefix for encoded payment challenges.
pub const CHALLENGE_PREFIX: &str = "creqA";

/// Upstream quote states that mean settlement occurred. The vocabulary is
/// upstream-defined; the poller only distinguishes settled vs not yet.
pub fn is_settled_state(state: &str) -> bool {
    matches!(state, "ISSUED" | "PAID")
}

/// A freshly created upstream quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote_id: String,
    pub request: String,
    pub amount: u64,
    pub unit: String,
    pub state: String,
    pub expiry: Option<i64>,
}

/// The upstream view of an existing quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteState {
    pub state: String,
}

/// Payment challenge offered with an HTTP 402 in the synchronous flow:
/// a version-prefixed, URL-safe base64 encoding of the request terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentChallenge {
    pub id: String,
    pub amount: u64,
    pub unit: String,
    pub mints: Vec<String>,
    pub memo: String,
}

impl PaymentChallenge {
    pub fn new(amount: u64, unit: impl Into<String>, mint: impl Into<String>, memo: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            amount,
            unit: unit.into(),
            mints: vec![mint.into()],
            memo: memo.into(),
        }
    }

    pub fn encode(&self) -> String {
        // serializing this struct cannot fail
        let body = serde_json::to_vec(self).unwrap_or_default();
        format!("{CHALLENGE_PREFIX}{}", URL_SAFE_NO_PAD.encode(body))
    }
}

#[async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Create a payment quote for the given amount.
    async fn create_quote(&self, amount: u64, memo: &str) -> Result<QuoteResponse>;

    /// Fetch the current state of a quote.
    async fn check_quote(&self, quote_id: &str) -> Result<QuoteState>;
}
