//! # Verification Pipeline
//!
//! Decides whether a claimed payment is acceptable via one of three
//! interchangeable strategies, in priority order:
//!
//! 1. **Token-proof check** — a supplied proof is decoded and summed
//!    locally; accepted when the sum covers the required amount.
//! 2. **External verifier** — when no proof is supplied and an endpoint is
//!    configured, the verifier must return a success status *and* an
//!    explicit `ok` acknowledgement.
//! 3. **Trust fallback** — neither proof nor verifier: accepted
//!    unconditionally, recorded distinguishably for audits.
//!
//! The pipeline never throws past its boundary: every failure is a
//! rejection value.

pub mod proof;

use serde_json::json;
use tracing::debug;

use crate::models::VerificationMode;

pub use proof::{sum_proof_amount, ProofDecodeError};

/// Inputs to a verification decision.
#[derive(Debug, Clone, Copy)]
pub struct VerifyRequest<'a> {
    pub task_id: &'a str,
    pub amount: u64,
    pub payment_id: &'a str,
    pub idempotency_key: &'a str,
    pub proof: Option<&'a str>,
}

/// Outcome of a verification decision. `accepted == false` carries the
/// rejection detail; acceptance may carry supporting detail (for example
/// the summed token amount).
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub accepted: bool,
    pub mode: VerificationMode,
    pub detail: Option<String>,
}

impl VerificationOutcome {
    fn accept(mode: VerificationMode, detail: Option<String>) -> Self {
        Self {
            accepted: true,
            mode,
            detail,
        }
    }

    fn reject(mode: VerificationMode, reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            mode,
            detail: Some(reason.into()),
        }
    }
}

/// Strategy selection and execution.
pub struct VerificationPipeline {
    http: reqwest::Client,
    verifier_url: Option<String>,
    verifier_token: Option<String>,
}

impl VerificationPipeline {
    pub fn new(
        http: reqwest::Client,
        verifier_url: Option<String>,
        verifier_token: Option<String>,
    ) -> Self {
        Self {
            http,
            verifier_url,
            verifier_token,
        }
    }

    /// Run the pipeline. Strategy is selected by input shape and
    /// configuration; all failures come back as rejection values.
    pub async fn verify(&self, request: VerifyRequest<'_>) -> VerificationOutcome {
        if let Some(proof) = request.proof.filter(|p| !p.trim().is_empty()) {
            return self.check_token_amount(proof, request.amount);
        }

        match &self.verifier_url {
            Some(url) => self.call_external_verifier(url, request).await,
            None => {
                debug!(task_id = %request.task_id, "no proof or verifier; trust fallback");
                VerificationOutcome::accept(VerificationMode::TrustCallback, None)
            }
        }
    }

    fn check_token_amount(&self, proof: &str, required: u64) -> VerificationOutcome {
        match sum_proof_amount(proof) {
            Ok(total) if total >= required => VerificationOutcome::accept(
                VerificationMode::TokenAmountCheck,
                Some(format!("token amount {total}")),
            ),
            Ok(total) => VerificationOutcome::reject(
                VerificationMode::TokenAmountCheck,
                format!("token amount too low ({total} < {required})"),
            ),
            Err(err) => VerificationOutcome::reject(
                VerificationMode::TokenAmountCheck,
                format!("invalid payment proof: {err}"),
            ),
        }
    }

    async fn call_external_verifier(
        &self,
        url: &str,
        request: VerifyRequest<'_>,
    ) -> VerificationOutcome {
        let body = json!({
            "task_id": request.task_id,
            "amount": request.amount,
            "payment_id": request.payment_id,
            "idempotency_key": request.idempotency_key,
            "proof": request.proof,
        });

        let mut outbound = self.http.post(url).json(&body);
        if let Some(token) = &self.verifier_token {
            outbound = outbound.bearer_auth(token);
        }

        let response = match outbound.send().await {
            Ok(response) => response,
            Err(err) => {
                return VerificationOutcome::reject(
                    VerificationMode::ExternalVerifier,
                    format!("verifier request failed: {err}"),
                )
            }
        };

        let status = response.status();
        let payload: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);

        let acknowledged = payload
            .get("ok")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !status.is_success() || !acknowledged {
            let reason = payload
                .pointer("/error/message")
                .or_else(|| payload.get("message"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("verifier rejected payment ({})", status.as_u16()));
            return VerificationOutcome::reject(VerificationMode::ExternalVerifier, reason);
        }

        VerificationOutcome::accept(VerificationMode::ExternalVerifier, None)
    }
}
