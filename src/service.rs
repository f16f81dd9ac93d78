//! # Service Core
//!
//! Owns the single state aggregate and the external collaborators. Every
//! operation receives the core explicitly; there is no ambient global
//! state. The state mutex is never held across an await: outbound calls
//! happen between lock acquisitions, and each check-then-act completes
//! within one critical section.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::error;

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::events::EventPublisher;
use crate::settlement::SettlementGateway;
use crate::snapshot::SnapshotStore;
use crate::store::ServiceState;
use crate::verification::VerificationPipeline;
use crate::wallet::WalletRedeemer;

pub struct ServiceCore {
    pub config: ServiceConfig,
    pub state: Mutex<ServiceState>,
    pub snapshot: SnapshotStore,
    pub events: EventPublisher,
    pub verification: VerificationPipeline,
    pub gateway: Arc<dyn SettlementGateway>,
    pub wallet: Arc<dyn WalletRedeemer>,
}

impl ServiceCore {
    /// Assemble the core around an already-loaded state.
    pub fn new(
        config: ServiceConfig,
        state: ServiceState,
        gateway: Arc<dyn SettlementGateway>,
        wallet: Arc<dyn WalletRedeemer>,
    ) -> Arc<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.upstream_timeout_ms))
            .build()
            .unwrap_or_default();
        let verification = VerificationPipeline::new(
            http,
            config.verifier_url.clone(),
            config.verifier_token.clone(),
        );
        let snapshot = SnapshotStore::new(config.data_file.clone());
        Arc::new(Self {
            config,
            state: Mutex::new(state),
            snapshot,
            events: EventPublisher::default(),
            verification,
            gateway,
            wallet,
        })
    }

    /// Persist in a request path: failure means the operation cannot be
    /// acknowledged as durable-committed.
    pub fn persist(&self, state: &ServiceState) -> Result<()> {
        self.snapshot.save(state).map_err(|err| {
            error!(error = %err, "snapshot save failed");
            ServiceError::Internal
        })
    }

    /// Persist in a background path: log and continue, the next successful
    /// save catches up.
    pub fn persist_logged(&self, state: &ServiceState) {
        if let Err(err) = self.snapshot.save(state) {
            error!(error = %err, "snapshot save failed");
        }
    }
}
