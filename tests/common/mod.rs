//! Shared fixtures: a scripted settlement gateway and wallet, and a core
//! wired against throwaway storage.

// not every test binary uses every fixture
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::Value;

use paygate_core::config::ServiceConfig;
use paygate_core::error::{Result, ServiceError};
use paygate_core::service::ServiceCore;
use paygate_core::settlement::{QuoteResponse, QuoteState, SettlementGateway};
use paygate_core::store::ServiceState;
use paygate_core::wallet::{RedeemResult, RedeemedPayment, WalletRedeemer};

/// Gateway whose quote states are scripted per quote id.
#[derive(Default)]
pub struct ScriptedGateway {
    counter: AtomicU64,
    pub states: Mutex<HashMap<String, String>>,
    pub checked: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn set_state(&self, quote_id: &str, state: &str) {
        self.states
            .lock()
            .insert(quote_id.to_string(), state.to_string());
    }

    pub fn checked_quotes(&self) -> Vec<String> {
        self.checked.lock().clone()
    }
}

#[async_trait]
impl SettlementGateway for ScriptedGateway {
    async fn create_quote(&self, amount: u64, _memo: &str) -> Result<QuoteResponse> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let quote_id = format!("q-{n}");
        self.set_state(&quote_id, "UNPAID");
        Ok(QuoteResponse {
            quote_id: quote_id.clone(),
            request: format!("lnbc-{quote_id}"),
            amount,
            unit: "sat".to_string(),
            state: "UNPAID".to_string(),
            expiry: None,
        })
    }

    async fn check_quote(&self, quote_id: &str) -> Result<QuoteState> {
        self.checked.lock().push(quote_id.to_string());
        match self.states.lock().get(quote_id) {
            Some(state) => Ok(QuoteState {
                state: state.clone(),
            }),
            None => Err(ServiceError::upstream("unknown quote")),
        }
    }
}

/// Wallet that returns a fixed outcome.
pub struct ScriptedWallet(pub RedeemResult);

#[async_trait]
impl WalletRedeemer for ScriptedWallet {
    async fn redeem(&self, _proof: &str) -> RedeemResult {
        self.0.clone()
    }
}

pub fn redeems(amount: u64) -> ScriptedWallet {
    ScriptedWallet(Ok(RedeemedPayment {
        amount,
        raw: format!("Received {amount} sat"),
    }))
}

pub struct TestHarness {
    pub core: Arc<ServiceCore>,
    pub gateway: Arc<ScriptedGateway>,
    // held so the snapshot directory outlives the core
    pub dir: tempfile::TempDir,
}

pub fn harness_with_wallet(wallet: ScriptedWallet) -> TestHarness {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig::for_testing(dir.path().join("state.json"));
    let gateway = Arc::new(ScriptedGateway::default());
    let core = ServiceCore::new(
        config,
        ServiceState::new(),
        gateway.clone(),
        Arc::new(wallet),
    );
    TestHarness { core, gateway, dir }
}

pub fn harness() -> TestHarness {
    harness_with_wallet(redeems(42))
}

/// Serialized token whose decoded proofs sum to the given amounts.
pub fn proof_token(amounts: &[u64]) -> String {
    let proofs: Vec<Value> = amounts
        .iter()
        .map(|a| serde_json::json!({"amount": a}))
        .collect();
    let body = serde_json::to_vec(&serde_json::json!({"proofs": proofs})).unwrap();
    format!("cashuA{}", STANDARD.encode(body))
}
