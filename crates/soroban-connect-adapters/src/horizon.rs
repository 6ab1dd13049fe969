use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use soroban_connect_core::{HorizonServer, PortError, SourceAccount};

use crate::jsonrpc;

#[derive(Debug, Clone)]
pub struct HorizonClient {
    url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    id: String,
    sequence: String,
}

impl HorizonClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PortError> {
        Ok(Self {
            url: url.into().trim_end_matches('/').to_owned(),
            client: jsonrpc::client(timeout)?,
        })
    }
}

#[async_trait]
impl HorizonServer for HorizonClient {
    fn url(&self) -> &str {
        &self.url
    }

    async fn load_account(&self, account_id: &str) -> Result<SourceAccount, PortError> {
        let response = self
            .client
            .get(format!("{}/accounts/{account_id}", self.url))
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("horizon request failed: {e}")))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(format!("account not found: {account_id}")));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!("horizon status {status}")));
        }
        let raw: RawAccount = response
            .json()
            .await
            .map_err(|e| PortError::Transport(format!("horizon json decode failed: {e}")))?;
        let sequence = raw
            .sequence
            .parse()
            .map_err(|e| PortError::Validation(format!("invalid sequence {}: {e}", raw.sequence)))?;

        Ok(SourceAccount {
            account_id: raw.id,
            sequence,
        })
    }
}
