//! Application state for a governance session
//!
//! Wallet connection, network selection and persisted user settings are
//! held in explicit values that callers own and pass around.

pub mod settings;
pub mod wallet;
pub mod web3;

use log::info;
use thiserror::Error;

use crate::registry::{Address, ContractRegistry};

pub use settings::{SettingsStore, UserSettings};
pub use wallet::WalletConnector;
pub use web3::{ConnectionStatus, Web3State};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Unsupported network: chain id {0}")]
    UnsupportedNetwork(u64),

    #[error("No governance contract deployed on chain {0}")]
    NoDeployment(u64),

    #[error("Unknown wallet connector: {0}")]
    UnknownConnector(String),

    #[error("Settings storage error: {0}")]
    Storage(String),
}

/// Everything a session needs, owned in one place
pub struct AppState {
    pub web3: Web3State,
    pub settings: SettingsStore,
    pub registry: ContractRegistry,
}

impl AppState {
    pub fn new(settings: SettingsStore, registry: ContractRegistry) -> Self {
        Self {
            web3: Web3State::default(),
            settings,
            registry,
        }
    }

    /// Connector to reconnect with automatically, if one was cached
    pub fn restore_session(&self) -> Option<WalletConnector> {
        self.settings.cached_connector()
    }

    pub fn on_connected(
        &mut self,
        connector: WalletConnector,
        chain_id: u64,
        account: Address,
    ) -> Result<(), StateError> {
        self.web3.connected(connector, chain_id, account);
        self.settings.set_cached_connector(Some(connector))?;
        info!("Connected {} on chain {} via {}", account, chain_id, connector);
        Ok(())
    }

    pub fn on_disconnected(&mut self) -> Result<(), StateError> {
        self.web3.disconnect();
        self.settings.set_cached_connector(None)
    }

    /// Diamond address for the currently selected network
    pub fn diamond_address(&self) -> Result<Address, StateError> {
        let chain_id = self.web3.chain_id.ok_or(StateError::NotConnected)?;
        if !self.web3.is_supported_network() {
            return Err(StateError::UnsupportedNetwork(chain_id));
        }
        self.registry
            .diamond_address(chain_id)
            .ok_or(StateError::NoDeployment(chain_id))
    }

    /// Settings for the connected account, defaults when none are stored
    pub fn current_user_settings(&self) -> Option<UserSettings> {
        self.web3.account.map(|account| self.settings.user_settings(&account))
    }
}
