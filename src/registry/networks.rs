use once_cell::sync::Lazy;
use serde::Serialize;

pub const ETHEREUM_CHAIN_ID: u64 = 1;
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;
pub const POLYGON_CHAIN_ID: u64 = 137;
pub const POLYGON_AMOY_CHAIN_ID: u64 = 80_002;
pub const BSC_CHAIN_ID: u64 = 56;
pub const BSC_TESTNET_CHAIN_ID: u64 = 97;
pub const BASE_CHAIN_ID: u64 = 8453;
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84_532;
pub const HARDHAT_CHAIN_ID: u64 = 31_337;

/// Chain metadata used for wallet network switching and explorer links
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Network {
    pub chain_id: u64,
    pub name: &'static str,
    pub currency_symbol: &'static str,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub testnet: bool,
}

impl Network {
    /// Chain id in the `0x`-hex form wallets expect for `wallet_switchEthereumChain`
    pub fn hex_chain_id(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

static NETWORKS: Lazy<Vec<Network>> = Lazy::new(|| {
    vec![
        Network {
            chain_id: ETHEREUM_CHAIN_ID,
            name: "Ethereum",
            currency_symbol: "ETH",
            rpc_url: "https://eth.llamarpc.com",
            explorer_url: "https://etherscan.io",
            testnet: false,
        },
        Network {
            chain_id: SEPOLIA_CHAIN_ID,
            name: "Sepolia",
            currency_symbol: "ETH",
            rpc_url: "https://rpc.sepolia.org",
            explorer_url: "https://sepolia.etherscan.io",
            testnet: true,
        },
        Network {
            chain_id: POLYGON_CHAIN_ID,
            name: "Polygon",
            currency_symbol: "POL",
            rpc_url: "https://polygon-rpc.com",
            explorer_url: "https://polygonscan.com",
            testnet: false,
        },
        Network {
            chain_id: POLYGON_AMOY_CHAIN_ID,
            name: "Polygon Amoy",
            currency_symbol: "POL",
            rpc_url: "https://rpc-amoy.polygon.technology",
            explorer_url: "https://amoy.polygonscan.com",
            testnet: true,
        },
        Network {
            chain_id: BSC_CHAIN_ID,
            name: "BNB Smart Chain",
            currency_symbol: "BNB",
            rpc_url: "https://bsc-dataseed.binance.org",
            explorer_url: "https://bscscan.com",
            testnet: false,
        },
        Network {
            chain_id: BSC_TESTNET_CHAIN_ID,
            name: "BNB Testnet",
            currency_symbol: "tBNB",
            rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
            explorer_url: "https://testnet.bscscan.com",
            testnet: true,
        },
        Network {
            chain_id: BASE_CHAIN_ID,
            name: "Base",
            currency_symbol: "ETH",
            rpc_url: "https://mainnet.base.org",
            explorer_url: "https://basescan.org",
            testnet: false,
        },
        Network {
            chain_id: BASE_SEPOLIA_CHAIN_ID,
            name: "Base Sepolia",
            currency_symbol: "ETH",
            rpc_url: "https://sepolia.base.org",
            explorer_url: "https://sepolia.basescan.org",
            testnet: true,
        },
        Network {
            chain_id: HARDHAT_CHAIN_ID,
            name: "Hardhat",
            currency_symbol: "ETH",
            rpc_url: "http://127.0.0.1:8545",
            explorer_url: "",
            testnet: true,
        },
    ]
});

/// Look up a supported network by chain id
pub fn network(chain_id: u64) -> Option<&'static Network> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

pub fn supported_networks() -> &'static [Network] {
    &NETWORKS
}

pub fn is_supported_chain(chain_id: u64) -> bool {
    network(chain_id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(network(ETHEREUM_CHAIN_ID).unwrap().name, "Ethereum");
        assert!(network(SEPOLIA_CHAIN_ID).unwrap().testnet);
        assert!(!is_supported_chain(42));
    }

    #[test]
    fn test_chain_ids_unique() {
        let mut ids: Vec<u64> = supported_networks().iter().map(|n| n.chain_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), supported_networks().len());
    }

    #[test]
    fn test_hex_chain_id() {
        assert_eq!(network(POLYGON_CHAIN_ID).unwrap().hex_chain_id(), "0x89");
        assert_eq!(network(HARDHAT_CHAIN_ID).unwrap().hex_chain_id(), "0x7a69");
    }
}
