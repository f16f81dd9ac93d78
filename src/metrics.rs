//! # Running Counters
//!
//! Monotonic counters for the pipeline, persisted in the snapshot and
//! rendered as plaintext `name value` lines for the metrics endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub tasks_created_total: u64,
    pub payments_received_total: u64,
    pub payment_replays_total: u64,
    pub tasks_completed_total: u64,
    pub tasks_failed_total: u64,
    pub worker_runs_total: u64,
    pub quote_refresh_attempts_total: u64,
    pub quote_refresh_skipped_total: u64,
    pub quote_refresh_errors_total: u64,
}

impl Metrics {
    /// All counters still at zero; such a snapshot omits the block entirely.
    pub fn is_empty(&self) -> bool {
        *self == Metrics::default()
    }

    /// Plaintext exposition: one `name value` line per counter.
    pub fn render(&self) -> String {
        let pairs = [
            ("tasks_created_total", self.tasks_created_total),
            ("payments_received_total", self.payments_received_total),
            ("payment_replays_total", self.payment_replays_total),
            ("tasks_completed_total", self.tasks_completed_total),
            ("tasks_failed_total", self.tasks_failed_total),
            ("worker_runs_total", self.worker_runs_total),
            (
                "quote_refresh_attempts_total",
                self.quote_refresh_attempts_total,
            ),
            (
                "quote_refresh_skipped_total",
                self.quote_refresh_skipped_total,
            ),
            (
                "quote_refresh_errors_total",
                self.quote_refresh_errors_total,
            ),
        ];
        let mut out = String::new();
        for (name, value) in pairs {
            out.push_str(name);
            out.push(' ');
            out.push_str(&value.to_string());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_detection() {
        let mut metrics = Metrics::default();
        assert!(metrics.is_empty());
        metrics.tasks_created_total = 1;
        assert!(!metrics.is_empty());
    }

    #[test]
    fn render_emits_one_line_per_counter() {
        let metrics = Metrics {
            payments_received_total: 3,
            ..Default::default()
        };
        let body = metrics.render();
        assert_eq!(body.lines().count(), 9);
        assert!(body.contains("payments_received_total 3"));
    }

    #[test]
    fn partial_snapshot_deserializes_with_defaults() {
        let metrics: Metrics =
            serde_json::from_str(r#"{"tasks_created_total": 7}"#).unwrap();
        assert_eq!(metrics.tasks_created_total, 7);
        assert_eq!(metrics.worker_runs_total, 0);
    }
}
