use serde::{Deserialize, Serialize};

use super::validation::is_valid_ipfs_hash;
use super::IpfsError;

pub const METADATA_VERSION: &str = "1.0";
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 50_000;

/// File referenced from a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub hash: String,
    pub mime_type: String,
    pub size: u64,
}

/// Off-chain proposal document; the contract stores only its hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalMetadata {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: u64,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    METADATA_VERSION.to_string()
}

impl ProposalMetadata {
    pub fn new(title: &str, description: &str, created_at: u64) -> Self {
        Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            category: None,
            author: None,
            created_at,
            attachments: Vec::new(),
            version: default_version(),
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn validate(&self) -> Result<(), IpfsError> {
        if self.title.trim().is_empty() {
            return Err(IpfsError::InvalidMetadata("title is empty".to_string()));
        }
        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(IpfsError::InvalidMetadata(format!(
                "title exceeds {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        if self.description.trim().is_empty() {
            return Err(IpfsError::InvalidMetadata("description is empty".to_string()));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(IpfsError::InvalidMetadata(format!(
                "description exceeds {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
        for attachment in &self.attachments {
            if !is_valid_ipfs_hash(&attachment.hash) {
                return Err(IpfsError::InvalidMetadata(format!(
                    "attachment {} has invalid hash {}",
                    attachment.name, attachment.hash
                )));
            }
        }
        Ok(())
    }
}
