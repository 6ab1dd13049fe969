use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use soroban_connect_core::{
    decode_account_id, PortError, SimulatedValue, SimulationResult, SorobanServer, SourceAccount,
    UnsignedTransaction,
};

use crate::jsonrpc;

/// Soroban JSON-RPC client.
#[derive(Debug, Clone)]
pub struct SorobanRpcClient {
    url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSimulation {
    error: Option<String>,
    #[serde(default)]
    results: Vec<RawHostResult>,
    #[serde(default)]
    latest_ledger: u32,
    min_resource_fee: Option<String>,
    transaction_data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHostResult {
    xdr: String,
    #[serde(default)]
    auth: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawLedgerEntries {
    #[serde(default)]
    entries: Option<Vec<RawLedgerEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawLedgerEntry {
    xdr: String,
}

impl SorobanRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PortError> {
        Ok(Self {
            url: url.into(),
            client: jsonrpc::client(timeout)?,
        })
    }

    pub async fn get_health(&self) -> Result<String, PortError> {
        let result = jsonrpc::call(&self.client, &self.url, "getHealth", Value::Null).await?;
        result
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| PortError::Validation("getHealth missing status".to_owned()))
    }
}

#[async_trait]
impl SorobanServer for SorobanRpcClient {
    fn url(&self) -> &str {
        &self.url
    }

    async fn simulate_transaction(
        &self,
        tx: &UnsignedTransaction,
    ) -> Result<SimulationResult, PortError> {
        let result = jsonrpc::call(
            &self.client,
            &self.url,
            "simulateTransaction",
            serde_json::json!({ "transaction": tx.envelope_xdr }),
        )
        .await?;
        let raw: RawSimulation = serde_json::from_value(result)
            .map_err(|e| PortError::Validation(format!("invalid simulation response: {e}")))?;
        debug!(latest_ledger = raw.latest_ledger, "simulation response received");

        Ok(SimulationResult {
            error: raw.error,
            result: raw.results.into_iter().next().map(|r| SimulatedValue {
                retval_xdr: r.xdr,
                auth: r.auth,
            }),
            latest_ledger: raw.latest_ledger,
            min_resource_fee: raw.min_resource_fee,
            transaction_data: raw.transaction_data,
        })
    }

    async fn get_account(&self, account_id: &str) -> Result<SourceAccount, PortError> {
        let key = account_ledger_key(account_id)?;
        let result = jsonrpc::call(
            &self.client,
            &self.url,
            "getLedgerEntries",
            serde_json::json!({ "keys": [key] }),
        )
        .await?;
        let raw: RawLedgerEntries = serde_json::from_value(result)
            .map_err(|e| PortError::Validation(format!("invalid ledger entries response: {e}")))?;
        let entry = raw
            .entries
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| PortError::NotFound(format!("account not found: {account_id}")))?;

        Ok(SourceAccount {
            account_id: account_id.to_owned(),
            sequence: account_sequence(&entry.xdr)?,
        })
    }
}

const LEDGER_ENTRY_TYPE_ACCOUNT: [u8; 4] = [0, 0, 0, 0];
const PUBLIC_KEY_TYPE_ED25519: [u8; 4] = [0, 0, 0, 0];

/// Base64 XDR `LedgerKey::Account` for a `G...` account id.
pub fn account_ledger_key(account_id: &str) -> Result<String, PortError> {
    let key = decode_account_id(account_id).map_err(|e| PortError::Validation(e.to_string()))?;
    let mut bytes = Vec::with_capacity(40);
    bytes.extend_from_slice(&LEDGER_ENTRY_TYPE_ACCOUNT);
    bytes.extend_from_slice(&PUBLIC_KEY_TYPE_ED25519);
    bytes.extend_from_slice(&key);
    Ok(STANDARD.encode(bytes))
}

/// Reads `seqNum` out of a base64 XDR `LedgerEntryData::Account`.
pub fn account_sequence(entry_xdr: &str) -> Result<i64, PortError> {
    // type(4) | account id(4 + 32) | balance(8) | seqNum(8)
    const SEQ_OFFSET: usize = 4 + 36 + 8;

    let bytes = STANDARD
        .decode(entry_xdr)
        .map_err(|e| PortError::Validation(format!("invalid ledger entry xdr: {e}")))?;
    if bytes.get(..4) != Some(&LEDGER_ENTRY_TYPE_ACCOUNT[..]) {
        return Err(PortError::Validation(
            "ledger entry is not an account".to_owned(),
        ));
    }
    let seq: [u8; 8] = bytes
        .get(SEQ_OFFSET..SEQ_OFFSET + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| PortError::Validation("account entry truncated".to_owned()))?;
    Ok(i64::from_be_bytes(seq))
}
