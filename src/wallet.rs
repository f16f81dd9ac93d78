//! # Wallet Redemption Process
//!
//! The external wallet that redeems a payment proof into balance, consumed
//! as an interface returning a redeemed amount or a failure reason. The
//! default implementation shells out to a configured wallet CLI with a
//! bounded timeout.

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Outcome of redeeming a proof: an amount, or a reason it failed.
pub type RedeemResult = Result<RedeemedPayment, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct RedeemedPayment {
    pub amount: u64,
    /// Raw wallet output, retained for the receipt ledger.
    pub raw: String,
}

#[async_trait]
pub trait WalletRedeemer: Send + Sync {
    /// Redeem a serialized payment proof into the service wallet.
    async fn redeem(&self, proof: &str) -> RedeemResult;
}

/// Wallet CLI wrapper: `<command> receive <proof>` prints `Received <n>`.
pub struct CliWalletRedeemer {
    command: String,
    timeout: Duration,
}

impl CliWalletRedeemer {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, String> {
        let mut cmd = Command::new(&self.command);
        cmd.args(args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| "wallet command timed out".to_string())?
            .map_err(|err| format!("wallet command failed to start: {err}"))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if !stderr.is_empty() {
                stderr
            } else if !stdout.is_empty() {
                stdout
            } else {
                "receive failed".to_string()
            };
            return Err(reason);
        }
        Ok(stdout)
    }
}

/// Extract the redeemed amount from wallet output of the form `Received <n>`.
pub fn parse_received_amount(output: &str) -> Option<u64> {
    static RECEIVED: OnceLock<Regex> = OnceLock::new();
    let re = RECEIVED.get_or_init(|| Regex::new(r"(?i)received\s+(\d+)").expect("static regex"));
    re.captures(output)?.get(1)?.as_str().parse().ok()
}

/// Stand-in when no wallet command is configured; every redemption fails
/// with a stable reason.
pub struct NoWallet;

#[async_trait]
impl WalletRedeemer for NoWallet {
    async fn redeem(&self, _proof: &str) -> RedeemResult {
        Err("wallet redemption is not configured".to_string())
    }
}

#[async_trait]
impl WalletRedeemer for CliWalletRedeemer {
    async fn redeem(&self, proof: &str) -> RedeemResult {
        let out = self.run(&["receive", proof]).await?;
        debug!(output = %out, "wallet receive completed");
        match parse_received_amount(&out) {
            Some(amount) => Ok(RedeemedPayment { amount, raw: out }),
            None => Err("wallet output did not report a received amount".to_string()),
        }
    }
}
