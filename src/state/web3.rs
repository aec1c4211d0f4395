use log::{debug, warn};
use serde::Serialize;

use super::wallet::WalletConnector;
use super::StateError;
use crate::registry::networks::{self, Network};
use crate::registry::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Wallet connection state
///
/// Transitions mirror the events a wallet provider emits: connect,
/// `accountsChanged` and `chainChanged`. Failures are recorded in
/// `last_error` rather than thrown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Web3State {
    pub status: ConnectionStatus,
    pub connector: Option<WalletConnector>,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub last_error: Option<String>,
}

impl Web3State {
    pub fn begin_connect(&mut self, connector: WalletConnector) {
        debug!("Connecting via {}", connector);
        self.status = ConnectionStatus::Connecting;
        self.connector = Some(connector);
        self.last_error = None;
    }

    pub fn connected(&mut self, connector: WalletConnector, chain_id: u64, account: Address) {
        self.status = ConnectionStatus::Connected;
        self.connector = Some(connector);
        self.account = Some(account);
        self.chain_id = Some(chain_id);
        self.last_error = None;
        if !networks::is_supported_chain(chain_id) {
            warn!("Connected to unsupported chain {}", chain_id);
            self.last_error = Some(StateError::UnsupportedNetwork(chain_id).to_string());
        }
    }

    pub fn connection_failed(&mut self, error: impl Into<String>) {
        let error = error.into();
        warn!("Wallet connection failed: {}", error);
        self.status = ConnectionStatus::Error;
        self.account = None;
        self.last_error = Some(error);
    }

    /// Select a network; unsupported chains are refused and recorded
    pub fn switch_network(&mut self, chain_id: u64) -> Result<(), StateError> {
        if !networks::is_supported_chain(chain_id) {
            let err = StateError::UnsupportedNetwork(chain_id);
            self.last_error = Some(err.to_string());
            return Err(err);
        }
        self.chain_id = Some(chain_id);
        self.last_error = None;
        Ok(())
    }

    /// Provider reported a new account list; an empty list means disconnected
    pub fn set_account(&mut self, account: Option<Address>) {
        match account {
            Some(account) => {
                self.account = Some(account);
                if self.status != ConnectionStatus::Connected && self.connector.is_some() {
                    self.status = ConnectionStatus::Connected;
                }
            }
            None => self.disconnect(),
        }
    }

    pub fn disconnect(&mut self) {
        *self = Web3State {
            chain_id: self.chain_id,
            ..Default::default()
        };
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected && self.account.is_some()
    }

    pub fn is_supported_network(&self) -> bool {
        self.chain_id.is_some_and(networks::is_supported_chain)
    }

    pub fn network(&self) -> Option<&'static Network> {
        self.chain_id.and_then(networks::network)
    }

    pub fn require_account(&self) -> Result<Address, StateError> {
        match self.account {
            Some(account) if self.is_connected() => Ok(account),
            _ => Err(StateError::NotConnected),
        }
    }
}
