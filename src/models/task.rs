//! # Task Records
//!
//! The queued-flow entity: a task gated on verified payment, with its
//! payment sub-record and the upstream quote binding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::constants::REDACTED;
use crate::state_machine::{PaymentStatus, TaskStatus};

/// How a claimed payment was accepted. Recorded so audits can distinguish
/// the trust fallback from the verified modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// Self-contained proof decoded and summed locally
    TokenAmountCheck,
    /// External verifier endpoint acknowledged the payment
    ExternalVerifier,
    /// No proof and no verifier configured; accepted unconditionally
    TrustCallback,
    /// Settlement observed on the upstream quote by the poller
    MintQuoteState,
}

impl std::fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenAmountCheck => write!(f, "token_amount_check"),
            Self::ExternalVerifier => write!(f, "external_verifier"),
            Self::TrustCallback => write!(f, "trust_callback"),
            Self::MintQuoteState => write!(f, "mint_quote_state"),
        }
    }
}

/// An upstream-issued payment quote and the poller's view of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintQuote {
    /// Upstream quote identifier. Sensitive: redacted in public projections.
    pub quote_id: String,
    /// The request payload the payer settles (bolt11 string upstream).
    pub request: String,
    pub amount: u64,
    pub unit: String,
    /// Upstream state string, vocabulary owned by the settlement authority.
    pub state: String,
    pub expiry: Option<i64>,
    /// Null until the first poll; the staleness floor keys off this.
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// Presence and lifecycle of a quote inside a payment, as an explicit
/// variant rather than an optional field: each verification strategy's
/// applicable shape is enforced by the type, not by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteBinding {
    /// Inline settlement; no upstream quote exists (synchronous flow).
    None,
    /// Quote issued, settlement not yet observed.
    Pending { quote: MintQuote },
    /// Settlement observed upstream.
    Settled { quote: MintQuote },
}

impl QuoteBinding {
    pub fn quote(&self) -> Option<&MintQuote> {
        match self {
            Self::None => None,
            Self::Pending { quote } | Self::Settled { quote } => Some(quote),
        }
    }

    pub fn quote_mut(&mut self) -> Option<&mut MintQuote> {
        match self {
            Self::None => None,
            Self::Pending { quote } | Self::Settled { quote } => Some(quote),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Payment sub-record carried by both tasks and readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment method tag.
    pub method: String,
    pub status: PaymentStatus,
    pub payment_id: Option<String>,
    /// Settled amount; present only after the payment is received.
    pub amount: Option<u64>,
    pub idempotency_key: Option<String>,
    pub verification_mode: Option<VerificationMode>,
    #[serde(default = "QuoteBinding::default_none")]
    pub quote: QuoteBinding,
}

impl QuoteBinding {
    fn default_none() -> Self {
        Self::None
    }
}

impl Payment {
    /// A fresh pending payment bound to an upstream quote.
    pub fn with_quote(quote: MintQuote) -> Self {
        Self {
            method: "ecash".to_string(),
            status: PaymentStatus::Pending,
            payment_id: None,
            amount: None,
            idempotency_key: None,
            verification_mode: None,
            quote: QuoteBinding::Pending { quote },
        }
    }

    /// A fresh pending payment settled inline (no quote).
    pub fn inline() -> Self {
        Self {
            method: "ecash".to_string(),
            status: PaymentStatus::Pending,
            payment_id: None,
            amount: None,
            idempotency_key: None,
            verification_mode: None,
            quote: QuoteBinding::None,
        }
    }

    /// Copy with the quote identifier replaced by the redaction placeholder.
    pub fn redacted(&self) -> Self {
        let mut public = self.clone();
        if let Some(quote) = public.quote.quote_mut() {
            quote.quote_id = REDACTED.to_string();
        }
        public
    }
}

/// A queued task: created on submission, released to execution once its
/// payment is verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub status: TaskStatus,
    pub input: String,
    /// Quoted price, immutable after creation.
    pub quoted_amount: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Instant of each transition, keyed `<status>_at`.
    pub status_timestamps: BTreeMap<String, DateTime<Utc>>,
    pub payment: Payment,
    /// Present only after the task completed.
    pub result: Option<serde_json::Value>,
    /// Present only after the task failed. Generic, never internal detail.
    pub error: Option<String>,
}

impl Task {
    pub fn new(input: String, quoted_amount: u64, payment: Payment) -> Self {
        let created = Utc::now();
        let mut status_timestamps = BTreeMap::new();
        status_timestamps.insert(
            format!("{}_at", TaskStatus::AwaitingPayment),
            created,
        );
        Self {
            id: Uuid::new_v4(),
            status: TaskStatus::AwaitingPayment,
            input,
            quoted_amount,
            created_at: created,
            updated_at: created,
            status_timestamps,
            payment,
            result: None,
            error: None,
        }
    }

    /// Public projection: the quote's sensitive identifier is redacted.
    pub fn to_public(&self) -> serde_json::Value {
        serde_json::json!({
            "task_id": self.id,
            "status": self.status,
            "quoted_amount": self.quoted_amount,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
            "status_timestamps": self.status_timestamps,
            "payment": self.payment.redacted(),
            "result": self.result,
            "error": self.error,
        })
    }
}
