//! # Service Configuration
//!
//! Environment-driven configuration with explicit validation and no silent
//! fallbacks past the documented defaults. Every tunable of the pipeline —
//! prices, poll cadence, staleness floor, batch size, snapshot path, and the
//! endpoints of the external collaborators — lives here.

pub mod error;

use std::env;
use std::path::PathBuf;

pub use error::{ConfigResult, ConfigurationError};

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Detected environment name (development/test/production).
    pub environment: String,
    /// Bind address for the HTTP surface.
    pub bind_address: String,
    pub port: u16,

    /// Quoted price for a queued task.
    pub task_price: u64,
    /// Price of one synchronous oracle reading.
    pub oracle_price: u64,

    /// Interval driving both the settlement poller and the dispatcher
    /// re-trigger, in milliseconds.
    pub worker_poll_ms: u64,
    /// Staleness floor: minimum age of a quote check before re-query.
    pub quote_refresh_min_age_ms: i64,
    /// Maximum quotes re-queried per poller tick.
    pub quote_refresh_batch_size: usize,

    /// Snapshot file location.
    pub data_file: PathBuf,

    /// External verifier endpoint; empty disables the strategy.
    pub verifier_url: Option<String>,
    pub verifier_token: Option<String>,

    /// Settlement authority base URL and amount unit.
    pub settlement_base_url: String,
    pub settlement_unit: String,
    /// Timeout for outbound settlement/verifier calls, in milliseconds.
    pub upstream_timeout_ms: u64,

    /// Wallet CLI used to redeem inline payment proofs into balance.
    pub wallet_command: Option<String>,
    /// Timeout for wallet subprocess invocations, in milliseconds.
    pub wallet_timeout_ms: u64,

    /// Recent-content ring and receipt ledger caps.
    pub recent_max: usize,
    pub receipt_max: usize,

    /// Token granting `/metrics` access from non-loopback addresses.
    pub metrics_token: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            environment: detect_environment(),
            bind_address: env_or("BIND_ADDRESS", "127.0.0.1"),
            port: parse_env("PORT", 3000)?,
            task_price: parse_env("TASK_PRICE", 100)?,
            oracle_price: parse_env("ORACLE_PRICE", 42)?,
            worker_poll_ms: parse_env("WORKER_POLL_MS", 3000)?,
            quote_refresh_min_age_ms: parse_env("QUOTE_REFRESH_MIN_AGE_MS", 15_000)?,
            quote_refresh_batch_size: parse_env("QUOTE_REFRESH_BATCH_SIZE", 2)?,
            data_file: PathBuf::from(env_or("DATA_FILE", "data/state.json")),
            verifier_url: env_opt("PAYMENT_VERIFIER_URL"),
            verifier_token: env_opt("PAYMENT_VERIFIER_TOKEN"),
            settlement_base_url: env_or("SETTLEMENT_BASE_URL", "https://mint.minibits.cash/Bitcoin"),
            settlement_unit: env_or("SETTLEMENT_UNIT", "sat"),
            upstream_timeout_ms: parse_env("UPSTREAM_TIMEOUT_MS", 10_000)?,
            wallet_command: env_opt("WALLET_COMMAND"),
            wallet_timeout_ms: parse_env("WALLET_TIMEOUT_MS", 20_000)?,
            recent_max: parse_env("RECENT_MAX", 500)?,
            receipt_max: parse_env("RECEIPT_MAX", 500)?,
            metrics_token: env_opt("METRICS_TOKEN"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants that would otherwise fail far from their cause.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.task_price == 0 || self.oracle_price == 0 {
            return Err(ConfigurationError::Invalid(
                "prices must be positive".to_string(),
            ));
        }
        if self.quote_refresh_batch_size == 0 {
            return Err(ConfigurationError::Invalid(
                "quote_refresh_batch_size must be at least 1".to_string(),
            ));
        }
        if self.worker_poll_ms == 0 {
            return Err(ConfigurationError::Invalid(
                "worker_poll_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Configuration suitable for tests: tight timings, throwaway paths.
    pub fn for_testing(data_file: PathBuf) -> Self {
        Self {
            environment: "test".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            task_price: 100,
            oracle_price: 42,
            worker_poll_ms: 50,
            quote_refresh_min_age_ms: 15_000,
            quote_refresh_batch_size: 2,
            data_file,
            verifier_url: None,
            verifier_token: None,
            settlement_base_url: "http://127.0.0.1:0".to_string(),
            settlement_unit: "sat".to_string(),
            upstream_timeout_ms: 1_000,
            wallet_command: None,
            wallet_timeout_ms: 1_000,
            recent_max: 500,
            receipt_max: 500,
            metrics_token: None,
        }
    }
}

/// Detect the runtime environment from conventional variables.
pub fn detect_environment() -> String {
    env::var("PAYGATE_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            ConfigurationError::Invalid(format!("{key} is not a valid value: {raw}"))
        }),
        Err(_) => Ok(default),
    }
}
