//! # Reading Records
//!
//! The synchronous pay-per-call flow: a reading is paid inline, so its
//! lifecycle is the binary pending/paid pair, and its payment never carries
//! a quote binding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::state_machine::ReadingStatus;

use super::task::Payment;

/// Content style tag for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Funny,
    Chaotic,
    Wholesome,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Funny, Style::Chaotic, Style::Wholesome];
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Funny => write!(f, "funny"),
            Self::Chaotic => write!(f, "chaotic"),
            Self::Wholesome => write!(f, "wholesome"),
        }
    }
}

impl std::str::FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "funny" => Ok(Self::Funny),
            "chaotic" => Ok(Self::Chaotic),
            "wholesome" => Ok(Self::Wholesome),
            _ => Err(format!("Invalid style: {s}")),
        }
    }
}

/// A generated fortune payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fortune {
    pub title: String,
    pub style: Style,
    pub question: String,
    pub fortune: String,
    pub lucky_number: u32,
}

/// A synchronous-flow entity. Created and paid in one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub question: String,
    pub style: Style,
    pub status: ReadingStatus,
    pub quoted_amount: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payment: Payment,
    /// Present only when paid.
    pub result: Option<Fortune>,
}

impl Reading {
    pub fn new(question: String, style: Style, quoted_amount: u64) -> Self {
        let created = Utc::now();
        Self {
            id: Uuid::new_v4(),
            question,
            style,
            status: ReadingStatus::Pending,
            quoted_amount,
            created_at: created,
            updated_at: created,
            payment: Payment::inline(),
            result: None,
        }
    }
}

/// Compact projection of a paid reading for the public feed and for the
/// anti-repeat comparison. Derived display state, not authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    /// Monotonic sequence number; the true pagination cursor. Timestamps
    /// below are display metadata only.
    pub seq: u64,
    pub reading_id: Uuid,
    pub question: String,
    pub style: Style,
    pub fortune: String,
    pub lucky_number: u32,
    pub created_at: DateTime<Utc>,
    pub paid_at: DateTime<Utc>,
}

/// Denormalized aggregate totals, reconstructable by folding receipts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub paid_count: u64,
    pub amount_received: u64,
}

/// Kind tag for receipts counted into the aggregate totals.
pub const RECEIPT_KIND_ORACLE_RECEIVE: &str = "oracle_receive";

/// A settlement receipt: raw source of truth for the aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub ts: DateTime<Utc>,
    pub kind: String,
    pub reading_id: Uuid,
    pub amount: u64,
    /// Raw wallet output retained for audit.
    pub raw: String,
}

impl Totals {
    /// Fold receipts back into totals; the migration/recovery path for
    /// snapshots persisted before totals were denormalized.
    pub fn from_receipts<'a>(receipts: impl Iterator<Item = &'a Receipt>) -> Self {
        let mut totals = Totals::default();
        for receipt in receipts.filter(|r| r.kind == RECEIPT_KIND_ORACLE_RECEIVE) {
            totals.paid_count += 1;
            totals.amount_received += receipt.amount;
        }
        totals
    }
}
