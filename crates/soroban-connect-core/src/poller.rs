use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::Network;
use crate::ports::WalletAdapter;
use crate::session::{resolve_wallet_network, ConnectionError, WalletSessionManager};
use crate::state::ConnectionState;
use crate::state_machine::ConnectionStatus;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Outcome of one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    /// No connected wallet that can be introspected.
    Inactive,
    Unchanged,
    AddressChanged { from: Option<String>, to: String },
    NetworkChanged { from: Network, to: Network },
    PermissionRevoked,
}

/// Handles to the address and network polling tasks. Dropping it stops
/// both loops.
pub struct DriftPollers {
    address: JoinHandle<()>,
    network: JoinHandle<()>,
    failure: watch::Receiver<Option<ConnectionError>>,
}

impl DriftPollers {
    pub fn spawn(session: Arc<WalletSessionManager>, config: PollerConfig) -> Self {
        let (failure_tx, failure) = watch::channel(None);
        let address = tokio::spawn(run_address_loop(Arc::clone(&session), config.interval));
        let network = tokio::spawn(run_network_loop(session, config.interval, failure_tx));
        info!(interval = ?config.interval, "drift pollers started");
        Self {
            address,
            network,
            failure,
        }
    }

    /// Resolves with the next unsupported network the wallet reports.
    /// Returns `None` once the network poller has been shut down.
    pub async fn network_failure(&mut self) -> Option<ConnectionError> {
        loop {
            if self.failure.changed().await.is_err() {
                return None;
            }
            if let Some(failure) = self.failure.borrow_and_update().clone() {
                return Some(failure);
            }
        }
    }

    /// The failure that currently holds network polling, if any. Polling
    /// resumes on the next connection state change.
    pub fn network_suspended(&self) -> Option<ConnectionError> {
        self.failure.borrow().clone()
    }

    /// Stops both loops; same as dropping the handle.
    pub fn shutdown(self) {}
}

impl Drop for DriftPollers {
    fn drop(&mut self) {
        self.address.abort();
        self.network.abort();
    }
}

/// Checks permission and address once. Errors are returned to the caller;
/// the polling loop logs and drops them.
pub async fn address_cycle(session: &WalletSessionManager) -> Result<Drift, ConnectionError> {
    let state = session.state();
    let Some(kit) = introspectable_kit(&state) else {
        return Ok(Drift::Inactive);
    };

    if !kit.is_allowed().await? {
        warn!("wallet permission revoked, disconnecting");
        session.disconnect().await;
        return Ok(Drift::PermissionRevoked);
    }

    let current = kit.get_address().await?;
    let previous = state.address().map(str::to_owned);
    if previous.as_deref() == Some(current.as_str()) {
        return Ok(Drift::Unchanged);
    }

    info!(from = ?previous, to = %current, "wallet address changed");
    session.store().update(|s| s.with_address(current.clone()));
    Ok(Drift::AddressChanged {
        from: previous,
        to: current,
    })
}

/// Checks the wallet's network once. A network outside the configured list
/// is returned as [`ConnectionError::UnsupportedNetwork`] without touching
/// the store.
pub async fn network_cycle(session: &WalletSessionManager) -> Result<Drift, ConnectionError> {
    let state = session.state();
    let Some(kit) = introspectable_kit(&state) else {
        return Ok(Drift::Inactive);
    };

    let reported = kit.get_network().await?;
    let current = state.active_network();
    if reported.trim().is_empty() || reported.parse::<Network>().ok() == Some(current) {
        return Ok(Drift::Unchanged);
    }

    let details = resolve_wallet_network(&state, &reported)?;
    session.rebind(&details)?;
    Ok(Drift::NetworkChanged {
        from: current,
        to: details.network,
    })
}

fn introspectable_kit(state: &ConnectionState) -> Option<Arc<dyn WalletAdapter>> {
    if state.status() != ConnectionStatus::Connected {
        return None;
    }
    state
        .kit()
        .filter(|kit| kit.supports_network_introspection())
        .cloned()
}

async fn run_address_loop(session: Arc<WalletSessionManager>, interval: Duration) {
    let mut changes = session.subscribe();
    loop {
        changes.borrow_and_update();
        match address_cycle(&session).await {
            Ok(Drift::Inactive | Drift::Unchanged) => {}
            Ok(drift) => debug!(?drift, "address poll cycle"),
            Err(e) => warn!(error = %e, "address poll failed"),
        }
        wait_next_cycle(&mut changes, interval).await;
    }
}

async fn run_network_loop(
    session: Arc<WalletSessionManager>,
    interval: Duration,
    failure: watch::Sender<Option<ConnectionError>>,
) {
    let mut changes = session.subscribe();
    loop {
        changes.borrow_and_update();
        match network_cycle(&session).await {
            Ok(Drift::Inactive | Drift::Unchanged) => {}
            Ok(drift) => debug!(?drift, "network poll cycle"),
            Err(e @ ConnectionError::UnsupportedNetwork(_)) => {
                error!(error = %e, "wallet switched to an unsupported network, network polling suspended");
                failure.send_replace(Some(e));
                if changes.changed().await.is_err() {
                    return;
                }
                failure.send_replace(None);
                debug!("connection state changed, network polling resumed");
                continue;
            }
            Err(e) => warn!(error = %e, "network poll failed"),
        }
        wait_next_cycle(&mut changes, interval).await;
    }
}

/// Sleeps for `interval`, or returns early when the connection state is
/// replaced so the next cycle sees it immediately.
async fn wait_next_cycle(changes: &mut watch::Receiver<Arc<ConnectionState>>, interval: Duration) {
    tokio::select! {
        _ = tokio::time::sleep(interval) => {}
        changed = changes.changed() => {
            if changed.is_err() {
                tokio::time::sleep(interval).await;
            }
        }
    }
}
