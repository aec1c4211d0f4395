// Configuration for the gnusdao client
// Layers built-in defaults, an optional TOML file and GNUSDAO_* environment variables

pub mod validation;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::{DaoError, Result};
use crate::governance::ServicePolicy;
use crate::ipfs::IpfsConfig;
use crate::registry::networks::{self, HARDHAT_CHAIN_ID};
use crate::registry::ContractRegistry;

pub use validation::{ConfigValidationError, ConfigValidator, ValidationResult, ValidationRule};

pub const DEFAULT_CONFIG_FILE: &str = "gnusdao.toml";
pub const ENV_PREFIX: &str = "GNUSDAO";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Chain the client talks to
    pub chain_id: u64,

    /// Overrides the RPC endpoint of the selected network
    pub rpc_url: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: HARDHAT_CHAIN_ID,
            rpc_url: None,
        }
    }
}

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,

    /// File backing wallet and user settings
    pub settings_path: PathBuf,

    pub network: NetworkConfig,

    /// Governance policy for the deployed contract version
    pub governance: ServicePolicy,

    pub ipfs: IpfsConfig,

    /// Diamond address overrides keyed by chain id
    pub contracts: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            settings_path: PathBuf::from("gnusdao-settings.json"),
            network: NetworkConfig::default(),
            governance: ServicePolicy::default(),
            ipfs: IpfsConfig::default(),
            contracts: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// An explicit `path` must exist; otherwise `gnusdao.toml` in the working
    /// directory is used when present. Environment variables take precedence,
    /// e.g. `GNUSDAO_NETWORK__CHAIN_ID=137` or `GNUSDAO_IPFS__PINATA_JWT=...`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("ipfs.backup_gateways")
                    .with_list_parse_key("ipfs.allowed_file_types"),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        info!("Configuration loaded for chain {}", config.network.chain_id);
        debug!("{:?}", config);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DaoError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Write the configuration as TOML, refusing to clobber an existing file
    pub fn write_new(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(DaoError::Config(format!("{} already exists", path.display())));
        }
        std::fs::write(path, self.to_toml()?)?;
        info!("Wrote configuration to {}", path.display());
        Ok(())
    }

    /// RPC endpoint: the override, else the selected network's default
    pub fn rpc_url(&self) -> Result<String> {
        if let Some(url) = self.network.rpc_url.as_ref().filter(|u| !u.is_empty()) {
            return Ok(url.clone());
        }
        networks::network(self.network.chain_id)
            .map(|n| n.rpc_url.to_string())
            .ok_or(DaoError::UnsupportedNetwork(self.network.chain_id))
    }

    /// Contract overrides with parsed chain ids
    pub fn contract_overrides(&self) -> Result<HashMap<u64, String>> {
        self.contracts
            .iter()
            .map(|(chain, address)| {
                chain
                    .trim()
                    .parse::<u64>()
                    .map(|id| (id, address.clone()))
                    .map_err(|_| DaoError::Config(format!("Invalid chain id in [contracts]: {}", chain)))
            })
            .collect()
    }

    pub fn registry(&self) -> Result<ContractRegistry> {
        Ok(ContractRegistry::with_overrides(&self.contract_overrides()?)?)
    }

    pub fn validate(&self) -> ValidationResult {
        ConfigValidator::new().validate(self)
    }
}

#[cfg(test)]
mod tests;
