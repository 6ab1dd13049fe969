use ed25519_dalek::SigningKey;
use stellar_strkey::ed25519::{PrivateKey, PublicKey};
use thiserror::Error;

use crate::domain::SecretKey;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),
    #[error("invalid account id {account}: {reason}")]
    InvalidAccountId { account: String, reason: String },
}

/// Derives the `G...` account id for a strkey secret seed.
pub fn public_key_from_secret(secret: &SecretKey) -> Result<String, KeyError> {
    let seed = PrivateKey::from_string(secret.expose())
        .map_err(|e| KeyError::InvalidSecretKey(e.to_string()))?;
    let signing = SigningKey::from_bytes(&seed.0);
    Ok(PublicKey(signing.verifying_key().to_bytes()).to_string())
}

pub fn decode_account_id(account: &str) -> Result<[u8; 32], KeyError> {
    PublicKey::from_string(account)
        .map(|pk| pk.0)
        .map_err(|e| KeyError::InvalidAccountId {
            account: account.to_owned(),
            reason: e.to_string(),
        })
}
