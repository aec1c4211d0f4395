//! Contract address and ABI registry
//!
//! Static data describing where the governance Diamond lives on each
//! supported chain and which functions it exposes.

pub mod abi;
pub mod address;
pub mod networks;

use std::collections::HashMap;

use log::debug;

pub use abi::{encode_call, function, function_by_signature, parse_args, selector, AbiError, AbiFunction, CallKind, Token, GOVERNANCE_ABI};
pub use address::Address;
pub use networks::{is_supported_chain, network, supported_networks, Network};

/// Hardhat/Anvil deterministic address of the first contract deployed by
/// the default dev account; where the local Diamond lands.
pub const LOCAL_DIAMOND: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// Per-chain Diamond addresses
///
/// Starts with the built-in table and accepts overrides from configuration.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    diamonds: HashMap<u64, Address>,
}

impl Default for ContractRegistry {
    fn default() -> Self {
        let mut diamonds = HashMap::new();
        if let Ok(local) = LOCAL_DIAMOND.parse() {
            diamonds.insert(networks::HARDHAT_CHAIN_ID, local);
        }
        Self { diamonds }
    }
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `chain id -> address` overrides
    pub fn with_overrides(overrides: &HashMap<u64, String>) -> Result<Self, AbiError> {
        let mut registry = Self::default();
        for (chain_id, address) in overrides {
            let parsed: Address = address.parse()?;
            debug!("Diamond override for chain {}: {}", chain_id, parsed);
            registry.diamonds.insert(*chain_id, parsed);
        }
        Ok(registry)
    }

    /// Register or replace the Diamond address for a chain
    pub fn set_diamond(&mut self, chain_id: u64, address: Address) {
        self.diamonds.insert(chain_id, address);
    }

    /// Diamond address for a chain, if one is deployed there
    pub fn diamond_address(&self, chain_id: u64) -> Option<Address> {
        self.diamonds.get(&chain_id).copied()
    }

    /// Chains that have both network metadata and a Diamond deployment
    pub fn deployed_chains(&self) -> Vec<u64> {
        let mut chains: Vec<u64> = self
            .diamonds
            .keys()
            .copied()
            .filter(|id| is_supported_chain(*id))
            .collect();
        chains.sort_unstable();
        chains
    }
}

/// Block explorer link for a transaction
pub fn explorer_tx_url(chain_id: u64, tx_hash: &str) -> Option<String> {
    network(chain_id)
        .filter(|n| !n.explorer_url.is_empty())
        .map(|n| format!("{}/tx/{}", n.explorer_url.trim_end_matches('/'), tx_hash))
}

/// Block explorer link for an address
pub fn explorer_address_url(chain_id: u64, address: &Address) -> Option<String> {
    network(chain_id)
        .filter(|n| !n.explorer_url.is_empty())
        .map(|n| format!("{}/address/{}", n.explorer_url.trim_end_matches('/'), address))
}
