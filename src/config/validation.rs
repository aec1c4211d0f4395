use std::collections::HashMap;

use log::{debug, error};
use thiserror::Error;

use crate::config::AppConfig;
use crate::governance::SupportEncoding;
use crate::ipfs::IpfsProvider;
use crate::registry::networks::{self, HARDHAT_CHAIN_ID};
use crate::registry::Address;

/// Largest upload limit accepted in configuration (100 MB)
pub const MAX_UPLOAD_LIMIT: u64 = 100 * 1024 * 1024;
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 120_000;
pub const MAX_RETRIES: u32 = 10;

/// Error type for configuration validation issues
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required setting for: {0}")]
    MissingRequiredSetting(String),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(u64),
}

/// Result of configuration validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub is_valid: bool,

    /// List of errors found during validation
    pub errors: Vec<ConfigValidationError>,

    /// List of warnings (valid but not recommended)
    pub warnings: Vec<String>,

    /// Suggested fixes for validation issues
    pub suggested_fixes: HashMap<String, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    pub fn add_error(&mut self, error: ConfigValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn add_suggested_fix(&mut self, setting: &str, suggestion: String) {
        self.suggested_fixes.insert(setting.to_string(), suggestion);
    }

    /// First error, for callers that only need pass/fail
    pub fn into_result(mut self) -> Result<Vec<String>, ConfigValidationError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(self.errors.remove(0))
        }
    }

    /// Return a summary of validation issues
    pub fn get_summary(&self) -> String {
        if self.is_valid && self.warnings.is_empty() {
            return "Configuration is valid with no warnings.".to_string();
        }

        let mut result = String::new();

        if !self.is_valid {
            result.push_str(&format!("Configuration has {} errors:\n", self.errors.len()));
            for (i, error) in self.errors.iter().enumerate() {
                result.push_str(&format!("  {}. {}\n", i + 1, error));
            }
        } else {
            result.push_str("Configuration is valid but has warnings.\n");
        }

        if !self.warnings.is_empty() {
            result.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for (i, warning) in self.warnings.iter().enumerate() {
                result.push_str(&format!("  {}. {}\n", i + 1, warning));
            }
        }

        if !self.suggested_fixes.is_empty() {
            let mut fixes: Vec<_> = self.suggested_fixes.iter().collect();
            fixes.sort();
            result.push_str("\nSuggested fixes:\n");
            for (setting, suggestion) in fixes {
                result.push_str(&format!("  - {}: {}\n", setting, suggestion));
            }
        }

        result
    }
}

/// Configuration validation rule
pub trait ValidationRule {
    fn name(&self) -> &str;

    fn validate(&self, config: &AppConfig) -> Result<(), ConfigValidationError>;

    fn description(&self) -> &str;

    fn suggest_fix(&self, config: &AppConfig) -> Option<HashMap<String, String>>;
}

/// Applies a set of rules to an `AppConfig`
pub struct ConfigValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new configuration validator with default rules
    pub fn new() -> Self {
        let mut validator = Self { rules: Vec::new() };

        validator.add_rule(Box::new(SupportedNetworkRule));
        validator.add_rule(Box::new(RpcUrlRule));
        validator.add_rule(Box::new(ContractOverridesRule));
        validator.add_rule(Box::new(GatewayRule));
        validator.add_rule(Box::new(RetryPolicyRule));
        validator.add_rule(Box::new(UploadLimitsRule));
        validator.add_rule(Box::new(NodeProviderRule));

        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn ValidationRule>] {
        &self.rules
    }

    pub fn validate(&self, config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        for rule in &self.rules {
            match rule.validate(config) {
                Ok(()) => {
                    debug!("Validation rule '{}' passed", rule.name());
                }
                Err(err) => {
                    error!("Validation rule '{}' failed: {}", rule.name(), err);
                    result.add_error(err);

                    if let Some(fixes) = rule.suggest_fix(config) {
                        for (setting, suggestion) in fixes {
                            result.add_suggested_fix(&setting, suggestion);
                        }
                    }
                }
            }
        }

        if config.ipfs.provider == IpfsProvider::Pinata && !config.ipfs.has_pinata_credentials() {
            result.add_warning("Pinata credentials are not set; uploads will fail.".to_string());
            result.add_suggested_fix(
                "ipfs.pinata_jwt",
                "Set GNUSDAO_IPFS__PINATA_JWT or switch ipfs.provider to \"node\"".to_string(),
            );
        }

        if config.network.chain_id == HARDHAT_CHAIN_ID {
            result.add_warning("Using the local Hardhat network.".to_string());
        }

        if config.governance.support_encoding == SupportEncoding::Boolean {
            result.add_warning("Boolean vote encoding cannot express abstentions.".to_string());
        }

        result
    }
}

fn single_fix(setting: &str, suggestion: impl Into<String>) -> Option<HashMap<String, String>> {
    let mut fixes = HashMap::new();
    fixes.insert(setting.to_string(), suggestion.into());
    Some(fixes)
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

struct SupportedNetworkRule;

impl ValidationRule for SupportedNetworkRule {
    fn name(&self) -> &str {
        "SupportedNetwork"
    }

    fn validate(&self, config: &AppConfig) -> Result<(), ConfigValidationError> {
        if !networks::is_supported_chain(config.network.chain_id) {
            return Err(ConfigValidationError::UnsupportedNetwork(config.network.chain_id));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates that the selected chain is a known network"
    }

    fn suggest_fix(&self, _config: &AppConfig) -> Option<HashMap<String, String>> {
        let ids: Vec<String> = networks::supported_networks()
            .iter()
            .map(|n| n.chain_id.to_string())
            .collect();
        single_fix("network.chain_id", format!("Use one of: {}", ids.join(", ")))
    }
}

struct RpcUrlRule;

impl ValidationRule for RpcUrlRule {
    fn name(&self) -> &str {
        "RpcUrl"
    }

    fn validate(&self, config: &AppConfig) -> Result<(), ConfigValidationError> {
        match config.network.rpc_url.as_deref() {
            Some(url) if !url.is_empty() && !is_http_url(url) && !url.starts_with("ws") => Err(
                ConfigValidationError::InvalidValue(format!("RPC URL must be http(s) or ws(s): {}", url)),
            ),
            _ => Ok(()),
        }
    }

    fn description(&self) -> &str {
        "Validates the RPC endpoint override"
    }

    fn suggest_fix(&self, _config: &AppConfig) -> Option<HashMap<String, String>> {
        single_fix("network.rpc_url", "Remove the override to use the network default")
    }
}

struct ContractOverridesRule;

impl ValidationRule for ContractOverridesRule {
    fn name(&self) -> &str {
        "ContractOverrides"
    }

    fn validate(&self, config: &AppConfig) -> Result<(), ConfigValidationError> {
        for (chain, address) in &config.contracts {
            if chain.trim().parse::<u64>().is_err() {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "Contract override key is not a chain id: {}",
                    chain
                )));
            }
            let parsed: Address = address.parse().map_err(|_| {
                ConfigValidationError::InvalidValue(format!("Invalid contract address for chain {}: {}", chain, address))
            })?;
            if parsed.is_zero() {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "Contract address for chain {} is the zero address",
                    chain
                )));
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates Diamond address overrides"
    }

    fn suggest_fix(&self, _config: &AppConfig) -> Option<HashMap<String, String>> {
        single_fix("contracts", "Use entries like \"137\" = \"0x...\" with 40 hex digits")
    }
}

struct GatewayRule;

impl ValidationRule for GatewayRule {
    fn name(&self) -> &str {
        "Gateways"
    }

    fn validate(&self, config: &AppConfig) -> Result<(), ConfigValidationError> {
        let gateways = config.ipfs.gateways();
        if gateways.is_empty() {
            return Err(ConfigValidationError::MissingRequiredSetting("ipfs.gateway_url".to_string()));
        }
        if let Some(bad) = gateways.iter().find(|g| !is_http_url(g)) {
            return Err(ConfigValidationError::InvalidValue(format!("Gateway is not an http(s) URL: {}", bad)));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates that at least one usable IPFS gateway is configured"
    }

    fn suggest_fix(&self, _config: &AppConfig) -> Option<HashMap<String, String>> {
        single_fix("ipfs.gateway_url", "Set to a gateway such as https://ipfs.io/ipfs/")
    }
}

struct RetryPolicyRule;

impl ValidationRule for RetryPolicyRule {
    fn name(&self) -> &str {
        "RetryPolicy"
    }

    fn validate(&self, config: &AppConfig) -> Result<(), ConfigValidationError> {
        let ipfs = &config.ipfs;
        if ipfs.request_timeout_ms == 0 || ipfs.request_timeout_ms > MAX_REQUEST_TIMEOUT_MS {
            return Err(ConfigValidationError::ValueOutOfRange(format!(
                "ipfs.request_timeout_ms must be between 1 and {}",
                MAX_REQUEST_TIMEOUT_MS
            )));
        }
        if ipfs.max_retries == 0 || ipfs.max_retries > MAX_RETRIES {
            return Err(ConfigValidationError::ValueOutOfRange(format!(
                "ipfs.max_retries must be between 1 and {}",
                MAX_RETRIES
            )));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates gateway timeout and retry bounds"
    }

    fn suggest_fix(&self, config: &AppConfig) -> Option<HashMap<String, String>> {
        let mut fixes = HashMap::new();
        if config.ipfs.request_timeout_ms == 0 || config.ipfs.request_timeout_ms > MAX_REQUEST_TIMEOUT_MS {
            fixes.insert("ipfs.request_timeout_ms".to_string(), "Use 30000".to_string());
        }
        if config.ipfs.max_retries == 0 || config.ipfs.max_retries > MAX_RETRIES {
            fixes.insert("ipfs.max_retries".to_string(), "Use 3".to_string());
        }
        if fixes.is_empty() {
            None
        } else {
            Some(fixes)
        }
    }
}

struct UploadLimitsRule;

impl ValidationRule for UploadLimitsRule {
    fn name(&self) -> &str {
        "UploadLimits"
    }

    fn validate(&self, config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.ipfs.max_file_size == 0 || config.ipfs.max_file_size > MAX_UPLOAD_LIMIT {
            return Err(ConfigValidationError::ValueOutOfRange(format!(
                "ipfs.max_file_size must be between 1 and {} bytes",
                MAX_UPLOAD_LIMIT
            )));
        }
        if config.ipfs.allowed_file_types.is_empty() {
            return Err(ConfigValidationError::MissingRequiredSetting(
                "ipfs.allowed_file_types".to_string(),
            ));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates upload size and type limits"
    }

    fn suggest_fix(&self, _config: &AppConfig) -> Option<HashMap<String, String>> {
        single_fix("ipfs.max_file_size", "Use 10485760 (10 MB) and keep at least one allowed type")
    }
}

struct NodeProviderRule;

impl ValidationRule for NodeProviderRule {
    fn name(&self) -> &str {
        "NodeProvider"
    }

    fn validate(&self, config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.ipfs.provider == IpfsProvider::Node && !is_http_url(&config.ipfs.node_api_url) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "IPFS node API URL must be http(s): {}",
                config.ipfs.node_api_url
            )));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates the IPFS node endpoint when the node provider is selected"
    }

    fn suggest_fix(&self, _config: &AppConfig) -> Option<HashMap<String, String>> {
        single_fix("ipfs.node_api_url", "Use http://127.0.0.1:5001")
    }
}
