use crate::state::WalletSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// A bound wallet without an address is still in the connect handshake.
pub fn derive_status(wallet: Option<&WalletSession>) -> ConnectionStatus {
    match wallet {
        None => ConnectionStatus::Disconnected,
        Some(session) if session.address.is_none() => ConnectionStatus::Connecting,
        Some(_) => ConnectionStatus::Connected,
    }
}
