use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::domain::{Network, NetworkDetails, WalletId};
use crate::ports::{PortError, ServerFactory, WalletAdapter, WalletKitFactory};
use crate::state::{ConnectionState, ConnectionStore, NetworkBinding, WalletSession};
use crate::state_machine::ConnectionStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("network {0} is not in the configured network list")]
    UnknownNetwork(Network),
    #[error("wallet is on unsupported network: {0}")]
    UnsupportedNetwork(String),
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Owns the connection state and every operation that changes the wallet or
/// network. Share it as `Arc<WalletSessionManager>`; readers take snapshots
/// through [`WalletSessionManager::state`] or [`WalletSessionManager::subscribe`].
pub struct WalletSessionManager {
    store: ConnectionStore,
    kits: Arc<dyn WalletKitFactory>,
    servers: Arc<dyn ServerFactory>,
    kit: Mutex<Option<CachedKit>>,
}

/// A kit is bound to the network it was built for.
struct CachedKit {
    network: Network,
    kit: Arc<dyn WalletAdapter>,
}

impl WalletSessionManager {
    pub fn new(
        allowed: Vec<NetworkDetails>,
        active: Network,
        kits: Arc<dyn WalletKitFactory>,
        servers: Arc<dyn ServerFactory>,
    ) -> Result<Self, ConnectionError> {
        let allowed: Arc<[NetworkDetails]> = allowed.into();
        let details = allowed
            .iter()
            .find(|d| d.network == active)
            .ok_or(ConnectionError::UnknownNetwork(active))?;
        let binding = NetworkBinding::connect(details, servers.as_ref())?;
        let store = ConnectionStore::new(ConnectionState::new(binding, Arc::clone(&allowed)));

        Ok(Self {
            store,
            kits,
            servers,
            kit: Mutex::new(None),
        })
    }

    pub fn store(&self) -> &ConnectionStore {
        &self.store
    }

    pub fn state(&self) -> Arc<ConnectionState> {
        self.store.get()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.store.get().status()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ConnectionState>> {
        self.store.subscribe()
    }

    /// Opens the wallet selection for the active network and binds whatever
    /// the user picks.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        let kit = self.ensure_kit().await?;
        let wallet = kit.open_selection_modal().await?;
        info!(wallet = %wallet, "wallet selected");

        kit.set_wallet(&wallet).await?;
        self.store.update(|s| {
            s.with_wallet(WalletSession {
                module_id: wallet.clone(),
                kit: Arc::clone(&kit),
                address: None,
            })
        });

        if let Err(e) = self.complete_handshake(kit.as_ref()).await {
            warn!(wallet = %wallet, error = %e, "wallet connection aborted");
            self.store.update(|s| s.without_wallet());
            return Err(e);
        }
        Ok(())
    }

    async fn complete_handshake(&self, kit: &dyn WalletAdapter) -> Result<(), ConnectionError> {
        let address = kit.get_address().await?;

        if kit.supports_network_introspection() {
            let reported = kit.get_network().await?;
            if !reported.trim().is_empty() {
                let details = resolve_wallet_network(&self.store.get(), &reported)?;
                if details.network != self.store.get().active_network() {
                    self.rebind(&details)?;
                }
            }
        }

        info!(%address, "wallet connected");
        self.store.update(|s| s.with_address(address));
        Ok(())
    }

    /// Clears wallet, address and kit. Safe to call when already
    /// disconnected.
    pub async fn disconnect(&self) {
        self.kit.lock().await.take();
        let previous = self.store.get();
        self.store.update(|s| s.without_wallet());
        if previous.wallet().is_some() {
            info!("wallet disconnected");
        }
    }

    pub fn set_active_network(&self, network: Network) -> Result<(), ConnectionError> {
        let details = self
            .store
            .get()
            .find_network(network)
            .cloned()
            .ok_or(ConnectionError::UnknownNetwork(network))?;
        self.rebind(&details)
    }

    /// Binds `wallet` directly, skipping the selection step of
    /// [`WalletSessionManager::connect`].
    pub async fn set_active_wallet_and_connect(
        &self,
        wallet: WalletId,
    ) -> Result<(), ConnectionError> {
        let kit = self.ensure_kit().await?;
        kit.set_wallet(&wallet).await?;
        let address = kit.get_address().await?;

        info!(wallet = %wallet, %address, "wallet connected");
        self.store.update(|s| {
            s.with_wallet(WalletSession {
                module_id: wallet,
                kit,
                address: Some(address),
            })
        });
        Ok(())
    }

    pub(crate) fn rebind(&self, details: &NetworkDetails) -> Result<(), ConnectionError> {
        let binding = NetworkBinding::connect(details, self.servers.as_ref())?;
        let previous = self.store.get().active_network();
        self.store.update(|s| s.with_binding(binding));
        info!(from = %previous, to = %details.network, "active network switched");
        Ok(())
    }

    /// Returns the cached kit, building a new one when none exists or the
    /// active network has moved since it was built.
    async fn ensure_kit(&self) -> Result<Arc<dyn WalletAdapter>, ConnectionError> {
        let mut guard = self.kit.lock().await;
        let network = self.store.get().active_network();
        if let Some(cached) = guard.as_ref().filter(|c| c.network == network) {
            return Ok(Arc::clone(&cached.kit));
        }
        let kit = self.kits.create(network)?;
        debug!(%network, "wallet kit constructed");
        *guard = Some(CachedKit {
            network,
            kit: Arc::clone(&kit),
        });
        Ok(kit)
    }
}

/// Maps a wallet-reported network onto the configured list.
pub(crate) fn resolve_wallet_network(
    state: &ConnectionState,
    reported: &str,
) -> Result<NetworkDetails, ConnectionError> {
    reported
        .parse::<Network>()
        .ok()
        .and_then(|network| state.find_network(network).cloned())
        .ok_or_else(|| ConnectionError::UnsupportedNetwork(reported.trim().to_owned()))
}
