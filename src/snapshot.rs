//! # Snapshot Contract
//!
//! Schema and recovery rules for persisted state. Everything the service
//! owns is written: tasks, readings, the recent-content ring, aggregate
//! totals, the full idempotency ledger, receipts, and counters. Load
//! tolerates a missing file (cold start), an unparsable file (log, start
//! empty), and a legacy snapshot lacking totals (fold the receipts).
//!
//! Saves are atomic from the reader's perspective: the payload is written
//! to a side location and published by a single rename, so a crash during
//! write never leaves a half-written file observable to the next load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::ledger::{IdempotencyLedger, LedgerEntry};
use crate::metrics::Metrics;
use crate::models::{Reading, Receipt, RecentEntry, Task, Totals};
use crate::store::ServiceState;

/// Persisted form of one idempotency-ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedEvent {
    pub idempotency_key: String,
    pub fingerprint: String,
    pub response: serde_json::Value,
}

/// On-disk snapshot payload. Empty collections are omitted.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub readings: Vec<Reading>,
    #[serde(default)]
    pub recent: Vec<RecentEntry>,
    /// Absent in legacy snapshots; recomputed from receipts on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,
    #[serde(default)]
    pub receipts: Vec<Receipt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_events: Vec<PersistedEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

impl Snapshot {
    /// Capture the current service state.
    pub fn capture(state: &ServiceState) -> Self {
        Self {
            saved_at: Some(Utc::now()),
            tasks: state.tasks.iter().cloned().collect(),
            readings: state.readings.values().cloned().collect(),
            recent: state.recent.iter().cloned().collect(),
            totals: Some(state.totals),
            receipts: state.receipts.iter().cloned().collect(),
            payment_events: state
                .ledger
                .iter()
                .map(|(key, entry)| PersistedEvent {
                    idempotency_key: key.clone(),
                    fingerprint: entry.fingerprint.clone(),
                    response: entry.response.clone(),
                })
                .collect(),
            metrics: (!state.metrics.is_empty()).then_some(state.metrics),
        }
    }

    /// Rebuild service state, applying the recovery rules.
    pub fn restore(self) -> ServiceState {
        let mut state = ServiceState::new();
        for task in self.tasks {
            state.tasks.insert(task);
        }
        for reading in self.readings {
            state.readings.insert(reading.id, reading);
        }
        state.next_seq = self.recent.iter().map(|e| e.seq).max().unwrap_or(0) + 1;
        state.recent = self.recent.into();
        state.receipts = self.receipts.into();
        state.totals = match self.totals {
            Some(totals) => totals,
            None => Totals::from_receipts(state.receipts.iter()),
        };
        state.ledger = IdempotencyLedger::from_entries(self.payment_events.into_iter().map(
            |event| {
                (
                    event.idempotency_key,
                    LedgerEntry {
                        fingerprint: event.fingerprint,
                        response: event.response,
                    },
                )
            },
        ));
        state.metrics = self.metrics.unwrap_or_default();
        state
    }
}

/// Handle on the snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write-then-rename save. Callers treat success as durable-committed.
    pub fn save(&self, state: &ServiceState) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let snapshot = Snapshot::capture(state);
        let payload = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Tolerant load: missing or unparsable files yield a fresh state.
    pub fn load(&self) -> ServiceState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no snapshot found, starting fresh");
                return ServiceState::new();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "snapshot unreadable, starting fresh");
                return ServiceState::new();
            }
        };
        if raw.trim().is_empty() {
            return ServiceState::new();
        }
        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => snapshot.restore(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "snapshot unparsable, starting fresh");
                ServiceState::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Payment, Style, RECEIPT_KIND_ORACLE_RECEIVE};
    use uuid::Uuid;

    fn populated_state() -> ServiceState {
        let mut state = ServiceState::new();
        state
            .tasks
            .create("summarize".to_string(), 100, Payment::inline());
        state.ledger.record(
            "key-1".to_string(),
            "t|100|p".to_string(),
            serde_json::json!({"ok": true}),
        );
        state.push_receipt(
            Receipt {
                id: Uuid::new_v4(),
                ts: Utc::now(),
                kind: RECEIPT_KIND_ORACLE_RECEIVE.to_string(),
                reading_id: Uuid::new_v4(),
                amount: 42,
                raw: "Received 42".to_string(),
            },
            500,
        );
        state.totals = Totals {
            paid_count: 1,
            amount_received: 42,
        };
        state.push_recent(
            RecentEntry {
                seq: 0,
                reading_id: Uuid::new_v4(),
                question: "q".to_string(),
                style: Style::Funny,
                fortune: "The claw stirs: a b. c".to_string(),
                lucky_number: 7,
                created_at: Utc::now(),
                paid_at: Utc::now(),
            },
            500,
        );
        state.metrics.payments_received_total = 1;
        state
    }

    #[test]
    fn round_trip_reproduces_observable_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));
        let state = populated_state();
        store.save(&state).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.tasks.len(), state.tasks.len());
        assert_eq!(loaded.ledger.len(), 1);
        assert_eq!(loaded.totals, state.totals);
        assert_eq!(loaded.recent, state.recent);
        assert_eq!(loaded.receipts, state.receipts);
        assert_eq!(loaded.metrics, state.metrics);
        // seq counter resumes past the highest persisted entry
        assert_eq!(loaded.next_seq, state.next_seq);
    }

    #[test]
    fn missing_file_is_a_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent.json"));
        let state = store.load();
        assert!(state.tasks.is_empty());
        assert_eq!(state.next_seq, 1);
    }

    #[test]
    fn unparsable_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        let state = SnapshotStore::new(&path).load();
        assert!(state.tasks.is_empty());
        assert!(state.ledger.is_empty());
    }

    #[test]
    fn legacy_snapshot_without_totals_folds_receipts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let legacy = serde_json::json!({
            "saved_at": Utc::now(),
            "receipts": [
                {
                    "id": Uuid::new_v4(),
                    "ts": Utc::now(),
                    "kind": RECEIPT_KIND_ORACLE_RECEIVE,
                    "reading_id": Uuid::new_v4(),
                    "amount": 42,
                    "raw": ""
                },
                {
                    "id": Uuid::new_v4(),
                    "ts": Utc::now(),
                    "kind": RECEIPT_KIND_ORACLE_RECEIVE,
                    "reading_id": Uuid::new_v4(),
                    "amount": 58,
                    "raw": ""
                }
            ]
        });
        fs::write(&path, serde_json::to_vec(&legacy).unwrap()).unwrap();
        let state = SnapshotStore::new(&path).load();
        assert_eq!(state.totals.paid_count, 2);
        assert_eq!(state.totals.amount_received, 100);
    }

    #[test]
    fn no_stray_tmp_file_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = SnapshotStore::new(&path);
        store.save(&populated_state()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
