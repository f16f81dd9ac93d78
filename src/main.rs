//! Service entry point: configuration, logging, snapshot recovery, the two
//! background loops (quote poller, dispatcher re-trigger), and the HTTP
//! listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info};

use paygate_core::config::ServiceConfig;
use paygate_core::logging::init_structured_logging;
use paygate_core::orchestration::WorkerDispatcher;
use paygate_core::service::ServiceCore;
use paygate_core::settlement::{HttpSettlementGateway, QuotePoller};
use paygate_core::snapshot::SnapshotStore;
use paygate_core::wallet::{CliWalletRedeemer, NoWallet, WalletRedeemer};
use paygate_core::web::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("configuration")?;
    init_structured_logging(&config.environment);

    let state = SnapshotStore::new(config.data_file.clone()).load();
    info!(
        tasks = state.tasks.len(),
        readings = state.readings.len(),
        "state loaded"
    );

    let gateway = Arc::new(HttpSettlementGateway::new(
        reqwest::Client::builder()
            .timeout(Duration::from_millis(config.upstream_timeout_ms))
            .build()
            .context("http client")?,
        config.settlement_base_url.clone(),
        config.settlement_unit.clone(),
    ));
    let wallet: Arc<dyn WalletRedeemer> = match &config.wallet_command {
        Some(command) => Arc::new(CliWalletRedeemer::new(
            command.clone(),
            Duration::from_millis(config.wallet_timeout_ms),
        )),
        None => Arc::new(NoWallet),
    };

    let bind = format!("{}:{}", config.bind_address, config.port);
    let poll_interval = Duration::from_millis(config.worker_poll_ms);
    let core = ServiceCore::new(config, state, gateway, wallet);

    let poller = QuotePoller::new(core.clone());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let summary = poller.tick().await;
            if summary.attempted > 0 {
                debug!(?summary, "poller tick");
            }
        }
    });

    // the dispatcher is also triggered inline after settlements; this loop
    // catches tasks paid while a previous run was in flight
    let dispatcher = WorkerDispatcher::new(core.clone());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let dispatcher = dispatcher.clone();
            let _ = tokio::task::spawn_blocking(move || dispatcher.trigger()).await;
        }
    });

    let app = build_router(core);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!(address = %bind, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server")?;
    Ok(())
}
