//! soroban-connect-watch: connects the configured wallet and logs every
//! connection state change until interrupted. A wallet on a network outside
//! the configured list is reported and watching continues.

use std::sync::Arc;

use eyre::{eyre, Result, WrapErr};
use tracing::{error, info, warn};

use soroban_connect_adapters::{
    ConnectConfig, HttpServerFactory, SorobanRpcClient, WalletKitAdapterFactory,
};
use soroban_connect_core::{
    ConnectionState, DriftPollers, NetworkDetails, ServerFactory, WalletKitFactory,
    WalletSessionManager,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ConnectConfig::from_env();
    info!(
        network = %config.active_network,
        wallet = %config.default_wallet,
        profile = ?config.runtime_profile,
        "Starting soroban-connect-watch"
    );

    for details in &config.networks {
        check_health(details, &config).await;
    }

    let session = Arc::new(
        WalletSessionManager::new(
            config.networks.clone(),
            config.active_network,
            Arc::new(WalletKitAdapterFactory::new(config.clone())) as Arc<dyn WalletKitFactory>,
            Arc::new(HttpServerFactory::with_config(&config)) as Arc<dyn ServerFactory>,
        )
        .wrap_err("invalid network configuration")?,
    );

    session
        .set_active_wallet_and_connect(config.default_wallet.clone())
        .await
        .wrap_err_with(|| format!("failed to connect wallet {}", config.default_wallet))?;

    let mut pollers = DriftPollers::spawn(Arc::clone(&session), config.poller_config());
    let mut changes = session.subscribe();
    log_state(&changes.borrow_and_update());

    let outcome = loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                log_state(&changes.borrow_and_update());
            }
            failure = pollers.network_failure() => {
                match failure {
                    Some(e) => error!(error = %e, "wallet network is not configured, waiting for a connection change"),
                    None => break Err(eyre!("network poller stopped")),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break Ok(());
            }
        }
    };

    pollers.shutdown();
    session.disconnect().await;
    outcome
}

async fn check_health(details: &NetworkDetails, config: &ConnectConfig) {
    let rpc = match SorobanRpcClient::new(details.soroban_rpc_url.clone(), config.request_timeout())
    {
        Ok(rpc) => rpc,
        Err(e) => {
            warn!(network = %details.network, error = %e, "failed to build rpc client");
            return;
        }
    };
    match rpc.get_health().await {
        Ok(status) => info!(network = %details.network, %status, "soroban rpc reachable"),
        Err(e) => warn!(network = %details.network, error = %e, "soroban rpc health check failed"),
    }
}

fn log_state(state: &ConnectionState) {
    info!(
        status = ?state.status(),
        network = %state.active_network(),
        wallet = ?state.selected_module_id().map(|w| w.as_str()),
        address = ?state.address(),
        "connection state"
    );
}
