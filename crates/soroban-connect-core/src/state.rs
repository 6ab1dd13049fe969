use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{Network, NetworkDetails, WalletId};
use crate::ports::{HorizonServer, PortError, ServerFactory, SorobanServer, WalletAdapter};
use crate::state_machine::{derive_status, ConnectionStatus};

/// The active network together with the server handles built for it.
/// Replaced as a unit so readers never see a network paired with another
/// network's endpoints.
#[derive(Clone)]
pub struct NetworkBinding {
    details: NetworkDetails,
    soroban: Arc<dyn SorobanServer>,
    horizon: Arc<dyn HorizonServer>,
}

impl NetworkBinding {
    pub fn new(
        details: NetworkDetails,
        soroban: Arc<dyn SorobanServer>,
        horizon: Arc<dyn HorizonServer>,
    ) -> Self {
        Self {
            details,
            soroban,
            horizon,
        }
    }

    pub fn connect(details: &NetworkDetails, factory: &dyn ServerFactory) -> Result<Self, PortError> {
        Ok(Self::new(
            details.clone(),
            factory.soroban(details)?,
            factory.horizon(details)?,
        ))
    }

    pub fn network(&self) -> Network {
        self.details.network
    }

    pub fn details(&self) -> &NetworkDetails {
        &self.details
    }

    pub fn soroban(&self) -> &Arc<dyn SorobanServer> {
        &self.soroban
    }

    pub fn horizon(&self) -> &Arc<dyn HorizonServer> {
        &self.horizon
    }
}

impl fmt::Debug for NetworkBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkBinding")
            .field("network", &self.details.network)
            .field("soroban", &self.soroban.url())
            .field("horizon", &self.horizon.url())
            .finish()
    }
}

#[derive(Clone)]
pub struct WalletSession {
    pub module_id: WalletId,
    pub kit: Arc<dyn WalletAdapter>,
    pub address: Option<String>,
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("module_id", &self.module_id)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Immutable snapshot of the connection. Every transition builds a new
/// value from the previous one.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    binding: NetworkBinding,
    allowed: Arc<[NetworkDetails]>,
    wallet: Option<WalletSession>,
}

impl ConnectionState {
    pub fn new(binding: NetworkBinding, allowed: Arc<[NetworkDetails]>) -> Self {
        Self {
            binding,
            allowed,
            wallet: None,
        }
    }

    pub fn active_network(&self) -> Network {
        self.binding.network()
    }

    pub fn binding(&self) -> &NetworkBinding {
        &self.binding
    }

    pub fn soroban_server(&self) -> &Arc<dyn SorobanServer> {
        self.binding.soroban()
    }

    pub fn horizon_server(&self) -> &Arc<dyn HorizonServer> {
        self.binding.horizon()
    }

    pub fn allowed_network_details(&self) -> &[NetworkDetails] {
        &self.allowed
    }

    pub fn find_network(&self, network: Network) -> Option<&NetworkDetails> {
        self.allowed.iter().find(|d| d.network == network)
    }

    pub fn wallet(&self) -> Option<&WalletSession> {
        self.wallet.as_ref()
    }

    pub fn selected_module_id(&self) -> Option<&WalletId> {
        self.wallet.as_ref().map(|w| &w.module_id)
    }

    pub fn address(&self) -> Option<&str> {
        self.wallet.as_ref().and_then(|w| w.address.as_deref())
    }

    pub fn kit(&self) -> Option<&Arc<dyn WalletAdapter>> {
        self.wallet.as_ref().map(|w| &w.kit)
    }

    pub fn status(&self) -> ConnectionStatus {
        derive_status(self.wallet.as_ref())
    }

    /// True when both snapshots hold the same binding, network list and
    /// wallet session. Server handles and kits compare by identity.
    pub fn same_connection(&self, other: &ConnectionState) -> bool {
        let same_binding = self.binding.details == other.binding.details
            && Arc::ptr_eq(&self.binding.soroban, &other.binding.soroban)
            && Arc::ptr_eq(&self.binding.horizon, &other.binding.horizon);
        let same_wallet = match (&self.wallet, &other.wallet) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.module_id == b.module_id && a.address == b.address && Arc::ptr_eq(&a.kit, &b.kit)
            }
            _ => false,
        };
        same_binding && same_wallet && Arc::ptr_eq(&self.allowed, &other.allowed)
    }

    pub fn with_binding(&self, binding: NetworkBinding) -> Self {
        Self {
            binding,
            ..self.clone()
        }
    }

    pub fn with_wallet(&self, wallet: WalletSession) -> Self {
        Self {
            wallet: Some(wallet),
            ..self.clone()
        }
    }

    /// No-op while disconnected: an address never outlives its wallet.
    pub fn with_address(&self, address: String) -> Self {
        let mut next = self.clone();
        if let Some(wallet) = next.wallet.as_mut() {
            wallet.address = Some(address);
        }
        next
    }

    pub fn without_wallet(&self) -> Self {
        Self {
            wallet: None,
            ..self.clone()
        }
    }
}

/// Single-writer container for [`ConnectionState`]. Updates swap the whole
/// snapshot and notify subscribers; an update that leaves the connection
/// unchanged keeps the current snapshot and notifies no one.
#[derive(Clone)]
pub struct ConnectionStore {
    tx: Arc<watch::Sender<Arc<ConnectionState>>>,
}

impl ConnectionStore {
    pub fn new(initial: ConnectionState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> Arc<ConnectionState> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ConnectionState>> {
        self.tx.subscribe()
    }

    pub fn update(
        &self,
        f: impl FnOnce(&ConnectionState) -> ConnectionState,
    ) -> Arc<ConnectionState> {
        match self.try_update(|state| Ok::<_, Infallible>(f(state))) {
            Ok(next) => next,
            Err(never) => match never {},
        }
    }

    /// Like [`ConnectionStore::update`], but leaves the store untouched when
    /// `f` fails.
    pub fn try_update<E>(
        &self,
        f: impl FnOnce(&ConnectionState) -> Result<ConnectionState, E>,
    ) -> Result<Arc<ConnectionState>, E> {
        let mut outcome = Ok(self.get());
        self.tx.send_if_modified(|current| match f(current) {
            Ok(next) if next.same_connection(current) => {
                outcome = Ok(Arc::clone(current));
                false
            }
            Ok(next) => {
                let next = Arc::new(next);
                *current = Arc::clone(&next);
                outcome = Ok(next);
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }
}
