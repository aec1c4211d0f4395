use std::path::Path;

use crate::config::AppConfig;
use crate::errors::DaoError;
use crate::governance::SupportEncoding;
use crate::ipfs::IpfsProvider;
use crate::registry::networks::{HARDHAT_CHAIN_ID, POLYGON_CHAIN_ID};
use crate::registry::LOCAL_DIAMOND;

const SAMPLE: &str = r#"
log_level = "debug"

[network]
chain_id = 137
rpc_url = "https://polygon.example.org"

[governance]
allow_self_delegation = false
support_encoding = "boolean"

[ipfs]
provider = "node"
gateway_url = "https://ipfs.io/ipfs/"
backup_gateways = []

[contracts]
"137" = "0x1234567890123456789012345678901234567890"
"#;

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.network.chain_id, HARDHAT_CHAIN_ID);
    assert!(config.governance.allow_self_delegation);
    assert_eq!(config.governance.support_encoding, SupportEncoding::Ternary);
    assert_eq!(config.rpc_url().unwrap(), "http://127.0.0.1:8545");

    let registry = config.registry().unwrap();
    assert_eq!(
        registry.diamond_address(HARDHAT_CHAIN_ID).map(|a| a.to_string()),
        Some(LOCAL_DIAMOND.to_lowercase())
    );
}

#[test]
fn test_parse_toml() {
    let config = AppConfig::from_toml_str(SAMPLE).unwrap();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.network.chain_id, POLYGON_CHAIN_ID);
    assert_eq!(config.rpc_url().unwrap(), "https://polygon.example.org");
    assert!(!config.governance.allow_self_delegation);
    assert_eq!(config.governance.support_encoding, SupportEncoding::Boolean);
    assert_eq!(config.ipfs.provider, IpfsProvider::Node);
    assert_eq!(config.ipfs.gateways(), vec!["https://ipfs.io/ipfs/"]);
    // untouched sections keep their defaults
    assert_eq!(config.ipfs.request_timeout_ms, 30_000);

    let registry = config.registry().unwrap();
    assert!(registry.diamond_address(POLYGON_CHAIN_ID).is_some());
}

#[test]
fn test_toml_roundtrip() {
    let config = AppConfig::from_toml_str(SAMPLE).unwrap();
    let rendered = config.to_toml().unwrap();
    assert_eq!(AppConfig::from_toml_str(&rendered).unwrap(), config);
}

#[test]
fn test_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.network.chain_id, POLYGON_CHAIN_ID);
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let err = AppConfig::load(Some(Path::new("/nonexistent/gnusdao.toml"))).unwrap_err();
    assert!(matches!(err, DaoError::Config(_)));
}

#[test]
fn test_environment_overrides() {
    std::env::set_var("GNUSDAO_IPFS__MAX_RETRIES", "7");
    let config = AppConfig::load(None);
    std::env::remove_var("GNUSDAO_IPFS__MAX_RETRIES");

    assert_eq!(config.unwrap().ipfs.max_retries, 7);
}

#[test]
fn test_write_new_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gnusdao.toml");

    AppConfig::default().write_new(&path).unwrap();
    assert_eq!(AppConfig::load(Some(&path)).unwrap().network.chain_id, HARDHAT_CHAIN_ID);
    assert!(AppConfig::default().write_new(&path).is_err());
}

#[test]
fn test_bad_contract_key() {
    let mut config = AppConfig::default();
    config.contracts.insert("polygon".to_string(), "0x1234567890123456789012345678901234567890".to_string());
    assert!(matches!(config.registry(), Err(DaoError::Config(_))));

    let mut config = AppConfig::default();
    config.contracts.insert("137".to_string(), "0x1234".to_string());
    assert!(matches!(config.registry(), Err(DaoError::Abi(_))));
}
