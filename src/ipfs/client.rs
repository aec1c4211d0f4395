use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::config::{IpfsConfig, IpfsProvider};
use super::metadata::ProposalMetadata;
use super::validation::{get_ipfs_url, is_valid_ipfs_hash, normalize_hash, validate_file};
use super::IpfsError;

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub hash: String,
    pub url: String,
    pub size: u64,
}

/// `pinFileToIPFS` / `pinJSONToIPFS` response
#[derive(Debug, Deserialize)]
struct PinataPinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
    #[serde(rename = "PinSize", default)]
    pin_size: u64,
}

/// `/api/v0/add` response; `Size` arrives as a string
#[derive(Debug, Deserialize)]
struct NodeAddResponse {
    #[serde(rename = "Hash")]
    hash: String,
    #[serde(rename = "Size", default)]
    size: String,
}

/// Client for pinning content and reading it back through gateways
pub struct IpfsClient {
    config: IpfsConfig,
    client: Client,
}

impl IpfsClient {
    pub fn new(config: IpfsConfig) -> Result<Self, IpfsError> {
        let client = Client::builder()
            .user_agent(concat!("gnusdao/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IpfsError::Configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &IpfsConfig {
        &self.config
    }

    /// Public URL of `hash` on the primary gateway
    pub fn url_for(&self, hash: &str) -> String {
        get_ipfs_url(hash, &self.config.gateway_url)
    }

    fn pinata_auth(&self, request: RequestBuilder) -> Result<RequestBuilder, IpfsError> {
        if let Some(jwt) = self.config.pinata_jwt.as_deref().filter(|j| !j.is_empty()) {
            return Ok(request.bearer_auth(jwt));
        }
        match (&self.config.pinata_api_key, &self.config.pinata_secret_key) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => Ok(request
                .header("pinata_api_key", key)
                .header("pinata_secret_api_key", secret)),
            _ => Err(IpfsError::Configuration(
                "Pinata credentials are not configured".to_string(),
            )),
        }
    }

    fn pinata_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.pinata_api_url.trim_end_matches('/'), path)
    }

    fn node_endpoint(&self, path: &str) -> String {
        format!("{}/api/v0/{}", self.config.node_api_url.trim_end_matches('/'), path)
    }

    /// Validate and pin a file
    pub async fn upload_file(&self, name: &str, bytes: Vec<u8>) -> Result<UploadResult, IpfsError> {
        let mime = validate_file(name, &bytes, &self.config)?;
        let size = bytes.len() as u64;
        info!("Uploading {} ({} bytes) via {:?}", name, size, self.config.provider);

        let part = multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(&mime)
            .map_err(|e| IpfsError::UploadFailed(format!("Invalid MIME type {}: {}", mime, e)))?;

        match self.config.provider {
            IpfsProvider::Pinata => {
                let form = multipart::Form::new()
                    .part("file", part)
                    .text("pinataMetadata", json!({ "name": name }).to_string());
                let request = self
                    .client
                    .post(self.pinata_endpoint("pinning/pinFileToIPFS"))
                    .multipart(form);
                self.send_pinata(request, size).await
            }
            IpfsProvider::Node => {
                let form = multipart::Form::new().part("file", part);
                let request = self
                    .client
                    .post(self.node_endpoint("add?pin=true"))
                    .multipart(form);
                self.send_node_add(request, size).await
            }
        }
    }

    /// Serialize `value` as JSON and pin it
    pub async fn upload_json<T: Serialize + ?Sized>(&self, value: &T, name: &str) -> Result<UploadResult, IpfsError> {
        let body = serde_json::to_vec(value)
            .map_err(|e| IpfsError::UploadFailed(format!("Failed to serialize {}: {}", name, e)))?;
        let size = body.len() as u64;
        if size > self.config.max_file_size {
            return Err(IpfsError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }

        match self.config.provider {
            IpfsProvider::Pinata => {
                let content = serde_json::to_value(value)
                    .map_err(|e| IpfsError::UploadFailed(format!("Failed to serialize {}: {}", name, e)))?;
                let payload = json!({
                    "pinataContent": content,
                    "pinataMetadata": { "name": name },
                });
                let request = self
                    .client
                    .post(self.pinata_endpoint("pinning/pinJSONToIPFS"))
                    .json(&payload);
                self.send_pinata(request, size).await
            }
            IpfsProvider::Node => {
                let part = multipart::Part::bytes(body)
                    .file_name(format!("{}.json", name))
                    .mime_str("application/json")
                    .map_err(|e| IpfsError::UploadFailed(e.to_string()))?;
                let request = self
                    .client
                    .post(self.node_endpoint("add?pin=true"))
                    .multipart(multipart::Form::new().part("file", part));
                self.send_node_add(request, size).await
            }
        }
    }

    async fn send_pinata(&self, request: RequestBuilder, size: u64) -> Result<UploadResult, IpfsError> {
        let response = self.pinata_auth(request)?.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IpfsError::UploadFailed(format!("Pinata returned {}: {}", status, body)));
        }
        let pinned: PinataPinResponse = response
            .json()
            .await
            .map_err(|e| IpfsError::InvalidResponse(format!("Unexpected Pinata response: {}", e)))?;
        self.upload_result(pinned.ipfs_hash, if pinned.pin_size > 0 { pinned.pin_size } else { size })
    }

    async fn send_node_add(&self, request: RequestBuilder, size: u64) -> Result<UploadResult, IpfsError> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(IpfsError::UploadFailed(format!(
                "IPFS node returned {}",
                response.status()
            )));
        }
        let added: NodeAddResponse = response
            .json()
            .await
            .map_err(|e| IpfsError::InvalidResponse(format!("Unexpected IPFS node response: {}", e)))?;
        let reported = added.size.parse().unwrap_or(size);
        self.upload_result(added.hash, reported)
    }

    fn upload_result(&self, hash: String, size: u64) -> Result<UploadResult, IpfsError> {
        if !is_valid_ipfs_hash(&hash) {
            return Err(IpfsError::InvalidResponse(format!("Service returned invalid hash {}", hash)));
        }
        let url = self.url_for(&hash);
        info!("Pinned {} ({} bytes)", hash, size);
        Ok(UploadResult { hash, url, size })
    }

    /// Pin content that already exists on the network
    pub async fn pin_by_hash(&self, hash: &str) -> Result<(), IpfsError> {
        let hash = normalize_hash(hash);
        if !is_valid_ipfs_hash(hash) {
            return Err(IpfsError::InvalidHash(hash.to_string()));
        }

        let request = match self.config.provider {
            IpfsProvider::Pinata => self.pinata_auth(
                self.client
                    .post(self.pinata_endpoint("pinning/pinByHash"))
                    .json(&json!({ "hashToPin": hash })),
            )?,
            IpfsProvider::Node => self.client.post(self.node_endpoint(&format!("pin/add?arg={}", hash))),
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(IpfsError::UploadFailed(format!(
                "Pin request for {} returned {}",
                hash,
                response.status()
            )));
        }
        info!("Pinned existing content {}", hash);
        Ok(())
    }

    /// Retrieve content, walking the gateway list with per-attempt timeouts
    ///
    /// Each pass tries the primary gateway and then every backup in order.
    /// Between passes the delay doubles, starting at `retry_base_delay_ms`.
    pub async fn fetch(&self, hash: &str) -> Result<Vec<u8>, IpfsError> {
        let hash = normalize_hash(hash);
        if !is_valid_ipfs_hash(hash) {
            return Err(IpfsError::InvalidHash(hash.to_string()));
        }

        let gateways = self.config.gateways();
        if gateways.is_empty() {
            return Err(IpfsError::Configuration("No IPFS gateways configured".to_string()));
        }

        let passes = self.config.max_retries.max(1);
        let mut attempts = Vec::new();

        for pass in 0..passes {
            if pass > 0 {
                let delay = self
                    .config
                    .retry_base_delay_ms
                    .saturating_mul(1u64 << (pass - 1).min(16));
                debug!("Retrying {} in {}ms (pass {}/{})", hash, delay, pass + 1, passes);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            for gateway in &gateways {
                match self.fetch_from(gateway, hash).await {
                    Ok(bytes) => {
                        debug!("Fetched {} from {} ({} bytes)", hash, gateway, bytes.len());
                        return Ok(bytes);
                    }
                    Err(e) => {
                        warn!("Gateway {} failed for {}: {}", gateway, hash, e);
                        attempts.push(format!("{}: {}", gateway, e));
                    }
                }
            }
        }

        Err(IpfsError::AllGatewaysFailed {
            hash: hash.to_string(),
            attempts,
        })
    }

    async fn fetch_from(&self, gateway: &str, hash: &str) -> Result<Vec<u8>, IpfsError> {
        let url = get_ipfs_url(hash, gateway);
        let timeout_ms = self.config.request_timeout_ms;

        let attempt = async {
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(IpfsError::RequestFailed(format!("HTTP {}", response.status())));
            }
            Ok::<Vec<u8>, IpfsError>(response.bytes().await?.to_vec())
        };

        match tokio::time::timeout(Duration::from_millis(timeout_ms), attempt).await {
            Ok(result) => result,
            Err(_) => Err(IpfsError::Timeout {
                gateway: gateway.to_string(),
                timeout_ms,
            }),
        }
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, hash: &str) -> Result<T, IpfsError> {
        let bytes = self.fetch(hash).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| IpfsError::InvalidResponse(format!("Content of {} is not the expected JSON: {}", hash, e)))
    }

    /// Retrieve and validate a proposal metadata document
    pub async fn fetch_metadata(&self, hash: &str) -> Result<ProposalMetadata, IpfsError> {
        let metadata: ProposalMetadata = self.fetch_json(hash).await?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Validate and pin a proposal metadata document
    pub async fn upload_metadata(&self, metadata: &ProposalMetadata) -> Result<UploadResult, IpfsError> {
        metadata.validate()?;
        let name = format!("proposal-{}", metadata.created_at);
        self.upload_json(metadata, &name).await
    }
}
