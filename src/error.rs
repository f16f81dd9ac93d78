//! # Service Error Taxonomy
//!
//! Typed outcomes for every public operation. Each variant maps to a stable
//! machine-readable code (see [`crate::constants::codes`]) and an HTTP status
//! in the web layer; internal identifiers never leak into the message text.

use thiserror::Error;

/// Errors surfaced by the core pipeline operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Malformed or missing input. Caller error, no state change.
    #[error("{0}")]
    Validation(String),

    /// Unknown task or reading identifier.
    #[error("{0}")]
    NotFound(String),

    /// Caller-correctable conflict: idempotency-key reuse with a different
    /// fingerprint, amount mismatch, or an already-transitioned task.
    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: String,
    },

    /// Payment verification failed; the caller must resupply payment.
    #[error("{0}")]
    PaymentRejected(String),

    /// Settlement authority or verifier unreachable or erroring. Retryable.
    #[error("{0}")]
    Upstream(String),

    /// Unexpected fault. Surfaced with a generic message only.
    #[error("internal error")]
    Internal,
}

impl ServiceError {
    /// Build a conflict with its machine-readable code.
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
