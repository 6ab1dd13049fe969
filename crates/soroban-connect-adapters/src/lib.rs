pub mod config;
pub mod horizon;
mod jsonrpc;
pub mod rpc;
pub mod servers;
pub mod wallet;

pub use config::{default_details, ConnectConfig, RuntimeProfile};
pub use horizon::HorizonClient;
pub use rpc::{account_ledger_key, account_sequence, SorobanRpcClient};
pub use servers::HttpServerFactory;
pub use wallet::{WalletKitAdapter, WalletKitAdapterFactory, DETERMINISTIC_ADDRESS};
