use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    Network, NetworkDetails, ScArg, SecretKey, SimulationResult, SourceAccount, SubmissionResult,
    UnsignedTransaction, WalletId,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Soroban RPC node bound to one network.
#[async_trait]
pub trait SorobanServer: Send + Sync {
    fn url(&self) -> &str;
    async fn simulate_transaction(
        &self,
        tx: &UnsignedTransaction,
    ) -> Result<SimulationResult, PortError>;
    async fn get_account(&self, account_id: &str) -> Result<SourceAccount, PortError>;
}

/// Horizon REST endpoint bound to one network.
#[async_trait]
pub trait HorizonServer: Send + Sync {
    fn url(&self) -> &str;
    async fn load_account(&self, account_id: &str) -> Result<SourceAccount, PortError>;
}

pub trait ServerFactory: Send + Sync {
    fn soroban(&self, details: &NetworkDetails) -> Result<Arc<dyn SorobanServer>, PortError>;
    fn horizon(&self, details: &NetworkDetails) -> Result<Arc<dyn HorizonServer>, PortError>;
}

pub trait TransactionBuilder: Send + Sync {
    fn build(
        &self,
        source: &SourceAccount,
        network: Network,
        contract_address: &str,
        method: &str,
        args: &[ScArg],
        fee: u32,
    ) -> Result<UnsignedTransaction, PortError>;
}

#[derive(Clone)]
pub enum Signer {
    SecretKey(SecretKey),
    Wallet {
        address: String,
        kit: Arc<dyn WalletAdapter>,
    },
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signer::SecretKey(key) => f.debug_tuple("SecretKey").field(key).finish(),
            Signer::Wallet { address, .. } => f
                .debug_struct("Wallet")
                .field("address", address)
                .finish_non_exhaustive(),
        }
    }
}

#[async_trait]
pub trait SignAndSubmit: Send + Sync {
    async fn submit(
        &self,
        tx: &UnsignedTransaction,
        signer: &Signer,
        soroban: &dyn SorobanServer,
        timeout_seconds: u64,
    ) -> Result<SubmissionResult, PortError>;
}

/// A connected wallet integration. Only some wallets can report their
/// network or permission state; callers check
/// [`WalletAdapter::supports_network_introspection`] first.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    fn supports_network_introspection(&self) -> bool;
    async fn get_address(&self) -> Result<String, PortError>;
    async fn get_network(&self) -> Result<String, PortError>;
    async fn is_allowed(&self) -> Result<bool, PortError>;
    async fn set_wallet(&self, wallet: &WalletId) -> Result<(), PortError>;
    async fn open_selection_modal(&self) -> Result<WalletId, PortError>;
}

pub trait WalletKitFactory: Send + Sync {
    fn create(&self, network: Network) -> Result<Arc<dyn WalletAdapter>, PortError>;
}
