use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use soroban_connect_core::{
    Network, PortError, WalletAdapter, WalletId, WalletKitFactory,
};

use crate::{jsonrpc, ConnectConfig};

/// Address reported by the deterministic runtime until a test injects another.
pub const DETERMINISTIC_ADDRESS: &str = "GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR";

/// Wallet kit runtime. Talks to a wallet bridge over JSON-RPC when a proxy
/// URL is configured, otherwise answers from in-memory state.
#[derive(Debug, Clone)]
pub struct WalletKitAdapter {
    mode: KitMode,
    state: Arc<Mutex<KitState>>,
}

#[derive(Debug, Clone)]
enum KitMode {
    Disabled(String),
    Deterministic,
    Proxy(ProxyRuntime),
}

#[derive(Debug, Clone)]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone)]
struct KitState {
    network: Network,
    address: String,
    reported_network: String,
    allowed: bool,
    selection: WalletId,
    selected: Option<WalletId>,
    introspecting_wallets: BTreeSet<String>,
    introspection: bool,
}

impl KitState {
    fn new(network: Network, selection: WalletId) -> Self {
        Self {
            network,
            address: DETERMINISTIC_ADDRESS.to_owned(),
            reported_network: network.as_str().to_owned(),
            allowed: true,
            selection,
            selected: None,
            introspecting_wallets: BTreeSet::from(["freighter".to_owned()]),
            introspection: false,
        }
    }
}

impl WalletKitAdapter {
    pub fn with_config(config: &ConnectConfig, network: Network) -> Self {
        let mode = if let Some(ref base_url) = config.wallet_proxy_url {
            match jsonrpc::client(config.request_timeout()) {
                Ok(client) => KitMode::Proxy(ProxyRuntime {
                    base_url: base_url.clone(),
                    client,
                }),
                Err(e) if config.strict_runtime_required() => KitMode::Disabled(format!(
                    "failed to initialize wallet proxy client in production profile: {e}"
                )),
                Err(_) => KitMode::Deterministic,
            }
        } else if config.strict_runtime_required() {
            KitMode::Disabled(
                "wallet proxy URL not configured in production runtime profile".to_owned(),
            )
        } else {
            KitMode::Deterministic
        };

        Self {
            mode,
            state: Arc::new(Mutex::new(KitState::new(
                network,
                config.default_wallet.clone(),
            ))),
        }
    }

    pub fn network(&self) -> Result<Network, PortError> {
        Ok(self.lock()?.network)
    }

    pub fn selected_wallet(&self) -> Result<Option<WalletId>, PortError> {
        Ok(self.lock()?.selected.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, KitState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("wallet kit lock poisoned: {e}")))
    }

    fn check_mode(&self) -> Result<(), PortError> {
        if let KitMode::Disabled(reason) = &self.mode {
            return Err(PortError::Policy(reason.clone()));
        }
        Ok(())
    }

    async fn proxy_call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let proxy = match &self.mode {
            KitMode::Proxy(proxy) => proxy,
            KitMode::Disabled(reason) => return Err(PortError::Policy(reason.clone())),
            KitMode::Deterministic => {
                return Err(PortError::NotImplemented("wallet proxy runtime not enabled"))
            }
        };
        jsonrpc::call(&proxy.client, &proxy.base_url, method, params).await
    }

    fn is_proxy(&self) -> bool {
        matches!(self.mode, KitMode::Proxy(_))
    }

    pub fn debug_inject_address_changed(&self, address: &str) -> Result<(), PortError> {
        self.lock()?.address = address.to_owned();
        Ok(())
    }

    /// `network` is whatever the wallet would report: a name, a passphrase or
    /// an empty string.
    pub fn debug_inject_network_changed(&self, network: &str) -> Result<(), PortError> {
        self.lock()?.reported_network = network.to_owned();
        Ok(())
    }

    pub fn debug_revoke_permission(&self) -> Result<(), PortError> {
        self.lock()?.allowed = false;
        Ok(())
    }

    pub fn debug_set_selection(&self, wallet: WalletId) -> Result<(), PortError> {
        self.lock()?.selection = wallet;
        Ok(())
    }
}

fn expect_str(value: Value, method: &str) -> Result<String, PortError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| PortError::Transport(format!("{method} result must be a string")))
}

#[async_trait]
impl WalletAdapter for WalletKitAdapter {
    fn supports_network_introspection(&self) -> bool {
        self.check_mode().is_ok() && self.lock().map(|g| g.introspection).unwrap_or(false)
    }

    async fn get_address(&self) -> Result<String, PortError> {
        self.check_mode()?;
        if self.is_proxy() {
            let result = self.proxy_call("getAddress", serde_json::json!([])).await?;
            return expect_str(result, "getAddress");
        }
        Ok(self.lock()?.address.clone())
    }

    async fn get_network(&self) -> Result<String, PortError> {
        self.check_mode()?;
        if self.is_proxy() {
            let result = self.proxy_call("getNetwork", serde_json::json!([])).await?;
            return expect_str(result, "getNetwork");
        }
        Ok(self.lock()?.reported_network.clone())
    }

    async fn is_allowed(&self) -> Result<bool, PortError> {
        self.check_mode()?;
        if self.is_proxy() {
            let result = self.proxy_call("isAllowed", serde_json::json!([])).await?;
            return result
                .as_bool()
                .ok_or_else(|| PortError::Transport("isAllowed result must be a bool".to_owned()));
        }
        Ok(self.lock()?.allowed)
    }

    async fn set_wallet(&self, wallet: &WalletId) -> Result<(), PortError> {
        self.check_mode()?;
        let introspection = if self.is_proxy() {
            let network = self.lock()?.network;
            let result = self
                .proxy_call(
                    "setWallet",
                    serde_json::json!({ "wallet": wallet.as_str(), "network": network.as_str() }),
                )
                .await?;
            result
                .get("networkIntrospection")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        } else {
            let g = self.lock()?;
            g.introspecting_wallets.contains(wallet.as_str())
        };

        let mut g = self.lock()?;
        g.selected = Some(wallet.clone());
        g.introspection = introspection;
        debug!(wallet = %wallet, introspection, "wallet module selected");
        Ok(())
    }

    async fn open_selection_modal(&self) -> Result<WalletId, PortError> {
        self.check_mode()?;
        if self.is_proxy() {
            let result = self.proxy_call("selectWallet", serde_json::json!([])).await?;
            return expect_str(result, "selectWallet").map(WalletId::new);
        }
        Ok(self.lock()?.selection.clone())
    }
}

/// Builds one [`WalletKitAdapter`] per session, bound to the active network.
#[derive(Debug, Clone)]
pub struct WalletKitAdapterFactory {
    config: ConnectConfig,
}

impl WalletKitAdapterFactory {
    pub fn new(config: ConnectConfig) -> Self {
        Self { config }
    }
}

impl WalletKitFactory for WalletKitAdapterFactory {
    fn create(&self, network: Network) -> Result<Arc<dyn WalletAdapter>, PortError> {
        Ok(Arc::new(WalletKitAdapter::with_config(&self.config, network)))
    }
}
