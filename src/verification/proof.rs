//! # Payment Proof Decoding
//!
//! A proof is a self-contained redeemable artifact: a version-prefixed
//! base64 JSON envelope carrying constituent proofs with amounts. Decoding
//! and summing happens locally; no network call. Two envelope shapes are
//! accepted: a top-level `proofs` array, or a `token` array whose entries
//! each carry their own `proofs`.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

/// Leading tag of an encoded proof token; one version character follows.
const PROOF_PREFIX: &str = "cashu";

#[derive(Error, Debug, PartialEq)]
pub enum ProofDecodeError {
    #[error("unrecognized proof prefix")]
    BadPrefix,

    #[error("proof is not valid base64")]
    Base64,

    #[error("proof payload is not valid JSON")]
    Json,
}

#[derive(Debug, Deserialize)]
struct ProofEnvelope {
    #[serde(default)]
    proofs: Vec<ProofEntry>,
    #[serde(default)]
    token: Vec<TokenEntry>,
}

#[derive(Debug, Deserialize)]
struct TokenEntry {
    #[serde(default)]
    proofs: Vec<ProofEntry>,
}

#[derive(Debug, Deserialize)]
struct ProofEntry {
    #[serde(default)]
    amount: u64,
}

/// Decode a proof token and sum its constituent amounts.
pub fn sum_proof_amount(token: &str) -> Result<u64, ProofDecodeError> {
    let token = token.trim();
    let rest = token
        .strip_prefix(PROOF_PREFIX)
        .ok_or(ProofDecodeError::BadPrefix)?;
    // skip the single version character
    let mut chars = rest.chars();
    if chars.next().is_none() {
        return Err(ProofDecodeError::BadPrefix);
    }
    let body = chars.as_str();

    let raw = URL_SAFE_NO_PAD
        .decode(body)
        .or_else(|_| STANDARD.decode(body))
        .map_err(|_| ProofDecodeError::Base64)?;

    let envelope: ProofEnvelope =
        serde_json::from_slice(&raw).map_err(|_| ProofDecodeError::Json)?;

    if !envelope.proofs.is_empty() {
        return Ok(envelope.proofs.iter().map(|p| p.amount).sum());
    }

    Ok(envelope
        .token
        .iter()
        .flat_map(|entry| entry.proofs.iter())
        .map(|p| p.amount)
        .sum())
}

#[cfg(test)]
pub(crate) fn encode_test_proof(json: &serde_json::Value) -> String {
    format!(
        "{PROOF_PREFIX}A{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(json).unwrap())
    )
}
