use std::fmt;
use std::str::FromStr;

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    Public,
    Testnet,
    Futurenet,
    Sandbox,
    Standalone,
}

impl Network {
    pub const ALL: [Network; 5] = [
        Network::Public,
        Network::Testnet,
        Network::Futurenet,
        Network::Sandbox,
        Network::Standalone,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Public => "PUBLIC",
            Network::Testnet => "TESTNET",
            Network::Futurenet => "FUTURENET",
            Network::Sandbox => "SANDBOX",
            Network::Standalone => "STANDALONE",
        }
    }

    pub fn passphrase(self) -> &'static str {
        match self {
            Network::Public => "Public Global Stellar Network ; September 2015",
            Network::Testnet => "Test SDF Network ; September 2015",
            Network::Futurenet => "Test SDF Future Network ; October 2022",
            Network::Sandbox => "Local Sandbox Stellar Network ; September 2022",
            Network::Standalone => "Standalone Network ; February 2017",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized network: {0}")]
pub struct UnrecognizedNetwork(pub String);

/// Wallets report either the short network name or its passphrase.
impl FromStr for Network {
    type Err = UnrecognizedNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Network::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(trimmed) || n.passphrase() == trimmed)
            .ok_or_else(|| UnrecognizedNetwork(trimmed.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDetails {
    pub network: Network,
    pub soroban_rpc_url: String,
    pub horizon_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletId(pub String);

impl WalletId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strkey-encoded ed25519 secret seed (`S...`).
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Contract call argument, passed verbatim to the transaction builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ScArg {
    Address(String),
    Symbol(String),
    String(String),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    I128(String),
    Bool(bool),
    Bytes(Vec<u8>),
    Void,
}

pub const PLACEHOLDER_ACCOUNT_ID: &str =
    "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAccount {
    pub account_id: String,
    pub sequence: i64,
}

impl SourceAccount {
    /// All-zero key at sequence 0. Only valid for simulation, never broadcast.
    pub fn placeholder() -> Self {
        Self {
            account_id: PLACEHOLDER_ACCOUNT_ID.to_owned(),
            sequence: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub source: SourceAccount,
    pub network: Network,
    pub fee: u32,
    pub envelope_xdr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedValue {
    pub retval_xdr: String,
    #[serde(default)]
    pub auth: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub error: Option<String>,
    pub result: Option<SimulatedValue>,
    pub latest_ledger: u32,
    pub min_resource_fee: Option<String>,
    pub transaction_data: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Success,
    Failed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub hash: B256,
    pub status: SubmissionStatus,
    pub ledger: Option<u32>,
    pub return_value_xdr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    Simulated(SimulatedValue),
    Submitted(SubmissionResult),
}

pub const DEFAULT_FEE: u32 = 100;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

#[derive(Debug, Clone)]
pub struct InvokeArgs {
    pub contract_address: String,
    pub method: String,
    pub args: Vec<ScArg>,
    pub sign_and_send: bool,
    pub fee: u32,
    pub secret_key: Option<SecretKey>,
    pub reconnect_after_tx: bool,
    pub timeout_seconds: u64,
}

impl InvokeArgs {
    pub fn new(contract_address: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            method: method.into(),
            args: Vec::new(),
            sign_and_send: false,
            fee: DEFAULT_FEE,
            secret_key: None,
            reconnect_after_tx: true,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    pub fn with_args(mut self, args: Vec<ScArg>) -> Self {
        self.args = args;
        self
    }

    pub fn sign_and_send(mut self) -> Self {
        self.sign_and_send = true;
        self
    }

    pub fn with_secret_key(mut self, secret_key: SecretKey) -> Self {
        self.secret_key = Some(secret_key);
        self
    }

    pub fn with_fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn without_reconnect(mut self) -> Self {
        self.reconnect_after_tx = false;
        self
    }
}
