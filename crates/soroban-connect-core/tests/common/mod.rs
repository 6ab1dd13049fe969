#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::B256;
use async_trait::async_trait;

use soroban_connect_core::{
    HorizonServer, Invoker, Network, NetworkDetails, PortError, RetryPolicy, ScArg, ServerFactory,
    SignAndSubmit, SimulatedValue, SimulationResult, Signer, SorobanServer, SourceAccount,
    SubmissionResult, SubmissionStatus, TransactionBuilder, UnsignedTransaction, WalletAdapter,
    WalletId, WalletKitFactory, WalletSessionManager,
};

pub const WALLET_ADDRESS: &str = "GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR";
pub const SECRET_SEED: &str = "SAAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQC5MY";

pub fn testnet() -> NetworkDetails {
    NetworkDetails {
        network: Network::Testnet,
        soroban_rpc_url: "https://soroban-testnet.example".to_owned(),
        horizon_url: "https://horizon-testnet.example".to_owned(),
    }
}

pub fn futurenet() -> NetworkDetails {
    NetworkDetails {
        network: Network::Futurenet,
        soroban_rpc_url: "https://rpc-futurenet.example".to_owned(),
        horizon_url: "https://horizon-futurenet.example".to_owned(),
    }
}

pub fn simulated(retval: &str) -> SimulationResult {
    SimulationResult {
        error: None,
        result: Some(SimulatedValue {
            retval_xdr: retval.to_owned(),
            auth: vec![],
        }),
        latest_ledger: 1_000,
        min_resource_fee: Some("100".to_owned()),
        transaction_data: None,
    }
}

/// Simulation responses shared by every server the factory builds.
#[derive(Default)]
pub struct SorobanScript {
    simulations: Mutex<VecDeque<Result<SimulationResult, PortError>>>,
    pub simulate_calls: AtomicUsize,
    accounts: Mutex<HashMap<String, i64>>,
    pub account_calls: AtomicUsize,
}

impl SorobanScript {
    pub fn push_simulation(&self, response: Result<SimulationResult, PortError>) {
        self.simulations
            .lock()
            .expect("script lock")
            .push_back(response);
    }

    pub fn insert_account(&self, account_id: &str, sequence: i64) {
        self.accounts
            .lock()
            .expect("script lock")
            .insert(account_id.to_owned(), sequence);
    }

    pub fn simulate_calls(&self) -> usize {
        self.simulate_calls.load(Ordering::SeqCst)
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }
}

pub struct MockSoroban {
    url: String,
    script: Arc<SorobanScript>,
}

impl MockSoroban {
    pub fn new(url: &str, script: Arc<SorobanScript>) -> Self {
        Self {
            url: url.to_owned(),
            script,
        }
    }
}

#[async_trait]
impl SorobanServer for MockSoroban {
    fn url(&self) -> &str {
        &self.url
    }

    async fn simulate_transaction(
        &self,
        _tx: &UnsignedTransaction,
    ) -> Result<SimulationResult, PortError> {
        self.script.simulate_calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .simulations
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Ok(simulated("AAAAAQ==")))
    }

    async fn get_account(&self, account_id: &str) -> Result<SourceAccount, PortError> {
        self.script.account_calls.fetch_add(1, Ordering::SeqCst);
        let accounts = self.script.accounts.lock().expect("script lock");
        accounts
            .get(account_id)
            .map(|sequence| SourceAccount {
                account_id: account_id.to_owned(),
                sequence: *sequence,
            })
            .ok_or_else(|| PortError::NotFound(format!("account {account_id}")))
    }
}

pub struct MockHorizon {
    url: String,
}

#[async_trait]
impl HorizonServer for MockHorizon {
    fn url(&self) -> &str {
        &self.url
    }

    async fn load_account(&self, account_id: &str) -> Result<SourceAccount, PortError> {
        Err(PortError::NotFound(format!("account {account_id}")))
    }
}

#[derive(Default)]
pub struct MockServerFactory {
    pub script: Arc<SorobanScript>,
    pub built: Mutex<Vec<Network>>,
}

impl ServerFactory for MockServerFactory {
    fn soroban(&self, details: &NetworkDetails) -> Result<Arc<dyn SorobanServer>, PortError> {
        self.built.lock().expect("built lock").push(details.network);
        Ok(Arc::new(MockSoroban::new(
            &details.soroban_rpc_url,
            Arc::clone(&self.script),
        )))
    }

    fn horizon(&self, details: &NetworkDetails) -> Result<Arc<dyn HorizonServer>, PortError> {
        Ok(Arc::new(MockHorizon {
            url: details.horizon_url.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct WalletState {
    pub address: Result<String, PortError>,
    pub network: Result<String, PortError>,
    pub allowed: bool,
    pub introspection: bool,
    pub selection: Result<WalletId, PortError>,
    pub selected: Option<WalletId>,
}

#[derive(Debug)]
pub struct MockWallet {
    pub state: Mutex<WalletState>,
    pub address_calls: AtomicUsize,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            state: Mutex::new(WalletState {
                address: Ok(WALLET_ADDRESS.to_owned()),
                network: Ok("TESTNET".to_owned()),
                allowed: true,
                introspection: true,
                selection: Ok(WalletId::new("freighter")),
                selected: None,
            }),
            address_calls: AtomicUsize::new(0),
        }
    }
}

impl MockWallet {
    pub fn set_address(&self, address: &str) {
        self.state.lock().expect("wallet lock").address = Ok(address.to_owned());
    }

    pub fn fail_address(&self, error: PortError) {
        self.state.lock().expect("wallet lock").address = Err(error);
    }

    pub fn set_network(&self, network: &str) {
        self.state.lock().expect("wallet lock").network = Ok(network.to_owned());
    }

    pub fn set_allowed(&self, allowed: bool) {
        self.state.lock().expect("wallet lock").allowed = allowed;
    }

    pub fn fail_selection(&self, error: PortError) {
        self.state.lock().expect("wallet lock").selection = Err(error);
    }

    pub fn set_introspection(&self, introspection: bool) {
        self.state.lock().expect("wallet lock").introspection = introspection;
    }

    pub fn selected(&self) -> Option<WalletId> {
        self.state.lock().expect("wallet lock").selected.clone()
    }
}

#[async_trait]
impl WalletAdapter for MockWallet {
    fn supports_network_introspection(&self) -> bool {
        self.state.lock().expect("wallet lock").introspection
    }

    async fn get_address(&self) -> Result<String, PortError> {
        self.address_calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().expect("wallet lock").address.clone()
    }

    async fn get_network(&self) -> Result<String, PortError> {
        self.state.lock().expect("wallet lock").network.clone()
    }

    async fn is_allowed(&self) -> Result<bool, PortError> {
        Ok(self.state.lock().expect("wallet lock").allowed)
    }

    async fn set_wallet(&self, wallet: &WalletId) -> Result<(), PortError> {
        self.state.lock().expect("wallet lock").selected = Some(wallet.clone());
        Ok(())
    }

    async fn open_selection_modal(&self) -> Result<WalletId, PortError> {
        self.state.lock().expect("wallet lock").selection.clone()
    }
}

pub struct MockKitFactory {
    pub wallet: Arc<MockWallet>,
    pub created: AtomicUsize,
}

impl WalletKitFactory for MockKitFactory {
    fn create(&self, _network: Network) -> Result<Arc<dyn WalletAdapter>, PortError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.wallet) as Arc<dyn WalletAdapter>)
    }
}

#[derive(Default)]
pub struct MockBuilder {
    pub calls: AtomicUsize,
    pub last_source: Mutex<Option<SourceAccount>>,
}

impl TransactionBuilder for MockBuilder {
    fn build(
        &self,
        source: &SourceAccount,
        network: Network,
        contract_address: &str,
        method: &str,
        _args: &[ScArg],
        fee: u32,
    ) -> Result<UnsignedTransaction, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_source.lock().expect("builder lock") = Some(source.clone());
        Ok(UnsignedTransaction {
            source: source.clone(),
            network,
            fee,
            envelope_xdr: format!("{contract_address}:{method}"),
        })
    }
}

#[derive(Default)]
pub struct MockSubmitter {
    pub calls: AtomicUsize,
    pub last_signer: Mutex<Option<String>>,
    pub failure: Mutex<Option<PortError>>,
}

impl MockSubmitter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, error: PortError) {
        *self.failure.lock().expect("submitter lock") = Some(error);
    }
}

#[async_trait]
impl SignAndSubmit for MockSubmitter {
    async fn submit(
        &self,
        _tx: &UnsignedTransaction,
        signer: &Signer,
        _soroban: &dyn SorobanServer,
        _timeout_seconds: u64,
    ) -> Result<SubmissionResult, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let label = match signer {
            Signer::SecretKey(_) => "secret".to_owned(),
            Signer::Wallet { address, .. } => address.clone(),
        };
        *self.last_signer.lock().expect("submitter lock") = Some(label);
        if let Some(error) = self.failure.lock().expect("submitter lock").clone() {
            return Err(error);
        }
        Ok(SubmissionResult {
            hash: B256::repeat_byte(0xab),
            status: SubmissionStatus::Success,
            ledger: Some(1_001),
            return_value_xdr: Some("AAAAAQ==".to_owned()),
        })
    }
}

pub struct Harness {
    pub session: Arc<WalletSessionManager>,
    pub servers: Arc<MockServerFactory>,
    pub kits: Arc<MockKitFactory>,
    pub wallet: Arc<MockWallet>,
    pub builder: Arc<MockBuilder>,
    pub submitter: Arc<MockSubmitter>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_networks(vec![testnet(), futurenet()], Network::Testnet)
    }

    pub fn with_networks(networks: Vec<NetworkDetails>, active: Network) -> Self {
        let servers = Arc::new(MockServerFactory::default());
        let wallet = Arc::new(MockWallet::default());
        let kits = Arc::new(MockKitFactory {
            wallet: Arc::clone(&wallet),
            created: AtomicUsize::new(0),
        });
        let session = WalletSessionManager::new(
            networks,
            active,
            Arc::clone(&kits) as Arc<dyn WalletKitFactory>,
            Arc::clone(&servers) as Arc<dyn ServerFactory>,
        )
        .expect("session manager");

        Self {
            session: Arc::new(session),
            servers,
            kits,
            wallet,
            builder: Arc::new(MockBuilder::default()),
            submitter: Arc::new(MockSubmitter::default()),
        }
    }

    pub fn script(&self) -> &SorobanScript {
        &self.servers.script
    }

    pub fn invoker(&self) -> Invoker {
        Invoker::new(
            Arc::clone(&self.session),
            Arc::clone(&self.builder) as Arc<dyn TransactionBuilder>,
            Arc::clone(&self.submitter) as Arc<dyn SignAndSubmit>,
        )
        .with_retry_policy(RetryPolicy::default())
    }

    pub fn builder_calls(&self) -> usize {
        self.builder.calls.load(Ordering::SeqCst)
    }

    pub async fn connected(self) -> Self {
        self.session
            .set_active_wallet_and_connect(WalletId::new("freighter"))
            .await
            .expect("connect wallet");
        self
    }
}
