//! # Idempotency Ledger
//!
//! Maps a client-supplied idempotency key to the cached outcome plus the
//! event fingerprint that produced it. Repeated delivery of the same logical
//! event replays the cached response; the same key with a different
//! fingerprint is a conflict, never an update.
//!
//! Entries are retained indefinitely: truncating the ledger would break the
//! replay guarantee for old keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::constants::codes;
use crate::error::ServiceError;

/// A recorded settlement event outcome. The fingerprint is immutable once
/// set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub fingerprint: String,
    pub response: Value,
}

/// Stable tuple identifying the semantic content of a settlement event.
pub fn event_fingerprint(task_id: &str, amount: u64, payment_id: &str) -> String {
    format!("{task_id}|{amount}|{payment_id}")
}

#[derive(Debug, Default, Clone)]
pub struct IdempotencyLedger {
    entries: HashMap<String, LedgerEntry>,
}

/// Outcome of consulting the ledger before running a settlement event.
#[derive(Debug, PartialEq)]
pub enum LedgerLookup {
    /// Key unseen; the caller may compute and then record.
    Absent,
    /// Key seen with the same fingerprint; replay this response verbatim.
    Replay(Value),
}

impl IdempotencyLedger {
    /// Check a key against its fingerprint without mutating anything.
    ///
    /// Returns `Err(Conflict)` when the key exists with a different
    /// fingerprint. Used both as the fast path before verification and as
    /// the re-check guarding the post-verification mutation.
    pub fn lookup(&self, key: &str, fingerprint: &str) -> Result<LedgerLookup, ServiceError> {
        match self.entries.get(key) {
            None => Ok(LedgerLookup::Absent),
            Some(entry) if entry.fingerprint == fingerprint => {
                Ok(LedgerLookup::Replay(entry.response.clone()))
            }
            Some(_) => Err(ServiceError::conflict(
                codes::IDEMPOTENCY_KEY_REUSED,
                "idempotency key already used for a different payment event",
            )),
        }
    }

    /// Record the outcome for an absent key. The caller must have observed
    /// `LedgerLookup::Absent` within the same critical section.
    pub fn record(&mut self, key: String, fingerprint: String, response: Value) {
        self.entries.insert(
            key,
            LedgerEntry {
                fingerprint,
                response,
            },
        );
    }

    /// Check-then-act as one unit: replay, conflict, or compute-and-record.
    ///
    /// `compute` runs only when the key is absent; its response is stored
    /// under the key before being returned. The boolean marks a replay.
    pub fn record_or_replay<S, F>(
        &mut self,
        key: &str,
        fingerprint: &str,
        scope: &mut S,
        compute: F,
    ) -> Result<(Value, bool), ServiceError>
    where
        F: FnOnce(&mut S) -> Result<Value, ServiceError>,
    {
        match self.lookup(key, fingerprint)? {
            LedgerLookup::Replay(response) => Ok((response, true)),
            LedgerLookup::Absent => {
                let response = compute(scope)?;
                self.record(key.to_string(), fingerprint.to_string(), response.clone());
                Ok((response, false))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LedgerEntry)> {
        self.entries.iter()
    }

    /// Rebuild from persisted entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, LedgerEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}
