pub mod domain;
pub mod keys;
pub mod orchestrator;
pub mod poller;
pub mod ports;
pub mod retry;
pub mod session;
pub mod state;
pub mod state_machine;

pub use domain::{
    InvokeArgs, InvokeOutcome, Network, NetworkDetails, ScArg, SecretKey, SimulatedValue,
    SimulationResult, SourceAccount, SubmissionResult, SubmissionStatus, UnsignedTransaction,
    UnrecognizedNetwork, WalletId, PLACEHOLDER_ACCOUNT_ID,
};
pub use keys::{decode_account_id, public_key_from_secret, KeyError};
pub use orchestrator::{InvokeError, Invoker};
pub use poller::{address_cycle, network_cycle, Drift, DriftPollers, PollerConfig};
pub use ports::{
    HorizonServer, PortError, ServerFactory, SignAndSubmit, Signer, SorobanServer,
    TransactionBuilder, WalletAdapter, WalletKitFactory,
};
pub use retry::{simulate_with_retry, RetryExhausted, RetryPolicy};
pub use session::{ConnectionError, WalletSessionManager};
pub use state::{ConnectionState, ConnectionStore, NetworkBinding, WalletSession};
pub use state_machine::{derive_status, ConnectionStatus};
