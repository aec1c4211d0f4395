use serde::{Deserialize, Serialize};

/// Where uploads are pinned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpfsProvider {
    /// Pinata pinning API
    Pinata,
    /// A directly reachable IPFS node HTTP API (`/api/v0`)
    Node,
}

/// IPFS upload and retrieval settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpfsConfig {
    pub provider: IpfsProvider,

    /// Pinata API base URL
    pub pinata_api_url: String,

    /// Pinata JWT; preferred over the key pair when both are set
    pub pinata_jwt: Option<String>,
    pub pinata_api_key: Option<String>,
    pub pinata_secret_key: Option<String>,

    /// IPFS node API base URL (used with `IpfsProvider::Node`)
    pub node_api_url: String,

    /// Primary retrieval gateway, e.g. `https://gateway.pinata.cloud/ipfs/`
    pub gateway_url: String,

    /// Tried in order after the primary gateway
    pub backup_gateways: Vec<String>,

    /// Per-attempt timeout
    pub request_timeout_ms: u64,

    /// Full passes over the gateway list before giving up
    pub max_retries: u32,

    /// Delay before the second pass; doubles on each further pass
    pub retry_base_delay_ms: u64,

    /// Largest accepted upload in bytes
    pub max_file_size: u64,

    /// Accepted MIME types for uploads
    pub allowed_file_types: Vec<String>,
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            provider: IpfsProvider::Pinata,
            pinata_api_url: "https://api.pinata.cloud".to_string(),
            pinata_jwt: None,
            pinata_api_key: None,
            pinata_secret_key: None,
            node_api_url: "http://127.0.0.1:5001".to_string(),
            gateway_url: "https://gateway.pinata.cloud/ipfs/".to_string(),
            backup_gateways: vec![
                "https://ipfs.io/ipfs/".to_string(),
                "https://cloudflare-ipfs.com/ipfs/".to_string(),
                "https://dweb.link/ipfs/".to_string(),
            ],
            request_timeout_ms: 30_000,
            max_retries: 3,
            retry_base_delay_ms: 1_000,
            max_file_size: 10 * 1024 * 1024,  // 10 MB
            allowed_file_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
                "application/pdf".to_string(),
                "text/plain".to_string(),
                "text/markdown".to_string(),
                "application/json".to_string(),
            ],
        }
    }
}

impl IpfsConfig {
    /// Primary gateway followed by backups, without duplicates
    pub fn gateways(&self) -> Vec<&str> {
        let mut gateways: Vec<&str> = Vec::with_capacity(1 + self.backup_gateways.len());
        for gateway in std::iter::once(&self.gateway_url).chain(self.backup_gateways.iter()) {
            let gateway = gateway.as_str();
            if gateway.trim().is_empty() {
                continue;
            }
            let key = gateway.trim_end_matches('/');
            if !gateways.iter().any(|g| g.trim_end_matches('/') == key) {
                gateways.push(gateway);
            }
        }
        gateways
    }

    pub fn has_pinata_credentials(&self) -> bool {
        self.pinata_jwt.as_deref().map_or(false, |j| !j.is_empty())
            || (self.pinata_api_key.as_deref().map_or(false, |k| !k.is_empty())
                && self.pinata_secret_key.as_deref().map_or(false, |s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateways_dedup_and_order() {
        let config = IpfsConfig {
            gateway_url: "https://ipfs.io/ipfs/".to_string(),
            backup_gateways: vec![
                "https://ipfs.io/ipfs".to_string(),
                "".to_string(),
                "https://dweb.link/ipfs/".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(config.gateways(), vec!["https://ipfs.io/ipfs/", "https://dweb.link/ipfs/"]);
    }

    #[test]
    fn test_pinata_credentials() {
        let mut config = IpfsConfig::default();
        assert!(!config.has_pinata_credentials());
        config.pinata_api_key = Some("key".to_string());
        assert!(!config.has_pinata_credentials());
        config.pinata_secret_key = Some("secret".to_string());
        assert!(config.has_pinata_credentials());

        let jwt_only = IpfsConfig {
            pinata_jwt: Some("token".to_string()),
            ..Default::default()
        };
        assert!(jwt_only.has_pinata_credentials());
    }
}
