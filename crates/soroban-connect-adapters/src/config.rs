use std::time::Duration;

use soroban_connect_core::{Network, NetworkDetails, PollerConfig, RetryPolicy, WalletId};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeProfile {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ConnectConfig {
    pub runtime_profile: RuntimeProfile,
    pub networks: Vec<NetworkDetails>,
    pub active_network: Network,
    pub simulate_max_retries: u32,
    pub simulate_retry_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub wallet_proxy_url: Option<String>,
    pub default_wallet: WalletId,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            networks: vec![default_details(Network::Testnet)],
            active_network: Network::Testnet,
            simulate_max_retries: 3,
            simulate_retry_delay_ms: 1_000,
            poll_interval_ms: 200,
            request_timeout_ms: 15_000,
            wallet_proxy_url: None,
            default_wallet: WalletId::new("freighter"),
        }
    }
}

impl ConnectConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key/value source; unset or unparsable keys
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let runtime_profile = match var("SOROBAN_CONNECT_RUNTIME_PROFILE").as_deref() {
            Some(p) if p.eq_ignore_ascii_case("production") => RuntimeProfile::Production,
            _ => RuntimeProfile::Development,
        };

        let network_list = var("SOROBAN_CONNECT_NETWORKS")
            .map(|raw| {
                raw.split(',')
                    .filter(|n| !n.trim().is_empty())
                    .filter_map(|n| match n.parse::<Network>() {
                        Ok(network) => Some(network),
                        Err(e) => {
                            warn!(error = %e, "ignoring configured network");
                            None
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| vec![Network::Testnet]);

        let networks: Vec<NetworkDetails> = network_list
            .into_iter()
            .map(|network| {
                let fallback = default_details(network);
                NetworkDetails {
                    network,
                    soroban_rpc_url: var(&format!("SOROBAN_CONNECT_{}_RPC_URL", network.as_str()))
                        .unwrap_or(fallback.soroban_rpc_url),
                    horizon_url: var(&format!("SOROBAN_CONNECT_{}_HORIZON_URL", network.as_str()))
                        .unwrap_or(fallback.horizon_url),
                }
            })
            .collect();

        let first = networks[0].network;
        let active_network = match var("SOROBAN_CONNECT_NETWORK").map(|n| n.parse::<Network>()) {
            Some(Ok(network)) if networks.iter().any(|d| d.network == network) => network,
            Some(_) => {
                warn!(fallback = %first, "active network not in configured list");
                first
            }
            None => first,
        };

        Self {
            runtime_profile,
            networks,
            active_network,
            simulate_max_retries: parse_or(
                var("SOROBAN_CONNECT_SIMULATE_RETRIES"),
                defaults.simulate_max_retries,
            ),
            simulate_retry_delay_ms: parse_or(
                var("SOROBAN_CONNECT_SIMULATE_DELAY_MS"),
                defaults.simulate_retry_delay_ms,
            ),
            poll_interval_ms: parse_or(
                var("SOROBAN_CONNECT_POLL_INTERVAL_MS"),
                defaults.poll_interval_ms,
            ),
            request_timeout_ms: parse_or(
                var("SOROBAN_CONNECT_REQUEST_TIMEOUT_MS"),
                defaults.request_timeout_ms,
            ),
            wallet_proxy_url: var("SOROBAN_CONNECT_WALLET_PROXY_URL"),
            default_wallet: var("SOROBAN_CONNECT_WALLET")
                .map(WalletId::new)
                .unwrap_or(defaults.default_wallet),
        }
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.simulate_max_retries,
            delay: Duration::from_millis(self.simulate_retry_delay_ms),
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "unparsable config value, using default");
            default
        }),
        None => default,
    }
}

pub fn default_details(network: Network) -> NetworkDetails {
    let (rpc, horizon) = match network {
        Network::Public => (
            "https://mainnet.sorobanrpc.com",
            "https://horizon.stellar.org",
        ),
        Network::Testnet => (
            "https://soroban-testnet.stellar.org",
            "https://horizon-testnet.stellar.org",
        ),
        Network::Futurenet => (
            "https://rpc-futurenet.stellar.org",
            "https://horizon-futurenet.stellar.org",
        ),
        Network::Sandbox | Network::Standalone => {
            ("http://localhost:8000/soroban/rpc", "http://localhost:8000")
        }
    };
    NetworkDetails {
        network,
        soroban_rpc_url: rpc.to_owned(),
        horizon_url: horizon.to_owned(),
    }
}
