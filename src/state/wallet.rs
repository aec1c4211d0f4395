use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::StateError;

/// Browser wallet connectors the dashboard offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletConnector {
    #[serde(rename = "metaMask")]
    MetaMask,
    #[serde(rename = "coinbaseWallet")]
    Coinbase,
    #[serde(rename = "walletConnect")]
    WalletConnect,
}

impl WalletConnector {
    pub const ALL: [WalletConnector; 3] = [
        WalletConnector::MetaMask,
        WalletConnector::Coinbase,
        WalletConnector::WalletConnect,
    ];

    /// Identifier persisted between sessions
    pub fn id(&self) -> &'static str {
        match self {
            WalletConnector::MetaMask => "metaMask",
            WalletConnector::Coinbase => "coinbaseWallet",
            WalletConnector::WalletConnect => "walletConnect",
        }
    }

    /// Connectors backed by an injected EIP-1193 provider
    pub fn is_injected(&self) -> bool {
        matches!(self, WalletConnector::MetaMask | WalletConnector::Coinbase)
    }
}

impl fmt::Display for WalletConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletConnector::MetaMask => write!(f, "MetaMask"),
            WalletConnector::Coinbase => write!(f, "Coinbase Wallet"),
            WalletConnector::WalletConnect => write!(f, "WalletConnect"),
        }
    }
}

impl FromStr for WalletConnector {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WalletConnector::ALL
            .iter()
            .copied()
            .find(|c| c.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| StateError::UnknownConnector(s.to_string()))
    }
}
