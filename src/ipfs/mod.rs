//! IPFS pinning and retrieval for proposal metadata and attachments

pub mod client;
pub mod config;
pub mod metadata;
pub mod validation;

use thiserror::Error;

pub use client::{IpfsClient, UploadResult};
pub use config::{IpfsConfig, IpfsProvider};
pub use metadata::{Attachment, ProposalMetadata};
pub use validation::{detect_mime_type, get_ipfs_url, is_valid_ipfs_hash, normalize_hash, validate_file};

/// Error types for IPFS operations
#[derive(Error, Debug)]
pub enum IpfsError {
    #[error("File too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: u64, max: u64 },

    #[error("File type not allowed: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid IPFS hash: {0}")]
    InvalidHash(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Gateway {gateway} timed out after {timeout_ms}ms")]
    Timeout { gateway: String, timeout_ms: u64 },

    #[error("Could not retrieve {hash} from any gateway: {}", attempts.join("; "))]
    AllGatewaysFailed { hash: String, attempts: Vec<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IPFS configuration error: {0}")]
    Configuration(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),
}

impl From<reqwest::Error> for IpfsError {
    fn from(err: reqwest::Error) -> Self {
        IpfsError::RequestFailed(err.to_string())
    }
}
