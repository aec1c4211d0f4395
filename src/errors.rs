use std::io;

use thiserror::Error;

use crate::config::ConfigValidationError;
use crate::governance::contract::ContractError;
use crate::ipfs::IpfsError;
use crate::registry::abi::AbiError;
use crate::state::StateError;

/// Top-level error for the governance client.
///
/// Module errors stay specific; this enum is what crosses the
/// library boundary and what the CLI reports.
#[derive(Debug, Error)]
pub enum DaoError {
    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("IPFS error: {0}")]
    Ipfs(#[from] IpfsError),

    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    ConfigValidation(#[from] ConfigValidationError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Unsupported network: chain id {0}")]
    UnsupportedNetwork(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<config::ConfigError> for DaoError {
    fn from(err: config::ConfigError) -> Self {
        DaoError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DaoError>;
