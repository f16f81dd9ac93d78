//! # Synchronous Reading Flow
//!
//! Pay-per-call fortunes: a request without a payment token gets a 402
//! challenge; a request with one has the token redeemed through the wallet,
//! and only a redemption covering the quoted price releases content. The
//! whole reading (entity, recent-ring entry, receipt, totals) commits in
//! one critical section after redemption.

use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::constants::events;
use crate::error::{Result, ServiceError};
use crate::models::{Reading, Receipt, RecentEntry, Style, RECEIPT_KIND_ORACLE_RECEIVE};
use crate::oracle::{derive_seed, select_with_anti_repeat};
use crate::service::ServiceCore;
use crate::state_machine::{PaymentStatus, ReadingStatus};

const QUESTION_MAX_CHARS: usize = 280;

/// An oracle request as received from the caller.
#[derive(Debug, Clone)]
pub struct OracleAsk {
    pub question: String,
    pub style: Option<String>,
    pub proof: Option<String>,
}

/// Either a 402 challenge body or the paid response body.
#[derive(Debug)]
pub enum OracleOutcome {
    PaymentRequired(Value),
    Paid(Value),
}

/// An absent style is drawn at random; a provided one must be valid, and
/// blank is a caller error, not an omission.
fn choose_style(raw: Option<&str>) -> Result<Style> {
    match raw {
        None => {
            let pick = rand::thread_rng().gen_range(0..Style::ALL.len());
            Ok(Style::ALL[pick])
        }
        Some(raw) if raw.trim().is_empty() => {
            Err(ServiceError::validation("style cannot be blank"))
        }
        Some(raw) => raw.trim().parse().map_err(|_| {
            ServiceError::validation("style must be one of: funny, chaotic, wholesome")
        }),
    }
}

/// Answer an oracle request.
pub async fn ask_oracle(core: &ServiceCore, ask: OracleAsk) -> Result<OracleOutcome> {
    let question = ask.question.trim().to_string();
    if question.is_empty() {
        return Err(ServiceError::validation("question is required"));
    }
    if question.chars().count() > QUESTION_MAX_CHARS {
        return Err(ServiceError::validation(format!(
            "question exceeds {QUESTION_MAX_CHARS} characters"
        )));
    }
    let style = choose_style(ask.style.as_deref())?;
    let price = core.config.oracle_price;

    let Some(proof) = ask.proof.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
        let challenge = crate::settlement::PaymentChallenge::new(
            price,
            core.config.settlement_unit.clone(),
            core.config.settlement_base_url.clone(),
            "oracle reading",
        );
        return Ok(OracleOutcome::PaymentRequired(json!({
            "price": price,
            "unit": core.config.settlement_unit,
            "payment_request": challenge.encode(),
            "hint": "resend the request with the payment token in the `token` field",
        })));
    };

    let redeemed = match core.wallet.redeem(proof).await {
        Ok(redeemed) => redeemed,
        Err(reason) => {
            warn!(reason = %reason, "wallet redemption failed");
            return Err(ServiceError::PaymentRejected(reason));
        }
    };
    if redeemed.amount < price {
        return Err(ServiceError::PaymentRejected(format!(
            "payment amount too low (received {}, need {})",
            redeemed.amount, price
        )));
    }

    let mut state = core.state.lock();
    let now = Utc::now();
    let seed = derive_seed(&question, style, now.timestamp_millis());
    let previous = state.recent.front().map(|entry| entry.fortune.clone());
    let fortune = select_with_anti_repeat(&question, style, seed, previous.as_deref());

    let mut reading = Reading::new(question.clone(), style, price);
    reading.status = ReadingStatus::Paid;
    reading.updated_at = now;
    reading.payment.status = PaymentStatus::Received;
    reading.payment.amount = Some(redeemed.amount);
    reading.result = Some(fortune.clone());
    let reading_id = reading.id;
    let created_at = reading.created_at;
    state.readings.insert(reading_id, reading);

    state.push_recent(
        RecentEntry {
            seq: 0,
            reading_id,
            question: question.clone(),
            style,
            fortune: fortune.fortune.clone(),
            lucky_number: fortune.lucky_number,
            created_at,
            paid_at: now,
        },
        core.config.recent_max,
    );
    state.push_receipt(
        Receipt {
            id: Uuid::new_v4(),
            ts: now,
            kind: RECEIPT_KIND_ORACLE_RECEIVE.to_string(),
            reading_id,
            amount: redeemed.amount,
            raw: redeemed.raw,
        },
        core.config.receipt_max,
    );
    state.totals.paid_count += 1;
    state.totals.amount_received += redeemed.amount;
    core.persist(&state)?;

    core.events.publish(
        events::READING_PAID,
        json!({"reading_id": reading_id, "amount": redeemed.amount}),
    );
    info!(reading_id = %reading_id, amount = redeemed.amount, %style, "reading paid");

    Ok(OracleOutcome::Paid(json!({
        "reading_id": reading_id,
        "amount_received": redeemed.amount,
        "fortune": fortune,
    })))
}
