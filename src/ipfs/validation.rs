use std::path::Path;

use log::debug;

use super::config::IpfsConfig;
use super::IpfsError;
use crate::utils::format_file_size;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Strip `ipfs://` and `/ipfs/` prefixes that show up in stored links
pub fn normalize_hash(hash: &str) -> &str {
    let hash = hash.trim();
    let hash = hash.strip_prefix("ipfs://").unwrap_or(hash);
    let hash = hash.strip_prefix("/ipfs/").unwrap_or(hash);
    hash.trim_start_matches('/')
}

/// Accepts CIDv0 (`Qm…`, base58btc, 46 chars) and base32 CIDv1 (`b…`)
pub fn is_valid_ipfs_hash(hash: &str) -> bool {
    if hash.starts_with("Qm") {
        return hash.len() == 46 && hash.chars().all(|c| BASE58_ALPHABET.contains(c));
    }
    if let Some(body) = hash.strip_prefix('b') {
        return body.len() >= 58 && body.chars().all(|c| matches!(c, 'a'..='z' | '2'..='7'));
    }
    false
}

/// Gateway URL for a hash; tolerant of trailing slashes and a missing `/ipfs` path
pub fn get_ipfs_url(hash: &str, gateway: &str) -> String {
    let base = gateway.trim().trim_end_matches('/');
    let hash = normalize_hash(hash);
    if base.ends_with("/ipfs") {
        format!("{}/{}", base, hash)
    } else {
        format!("{}/ipfs/{}", base, hash)
    }
}

fn mime_from_extension(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "json" => "application/json",
        "csv" => "text/csv",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

/// MIME type from content magic bytes, then the file extension
pub fn detect_mime_type(name: &str, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    mime_from_extension(name)
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Check size and type against the configured limits; returns the MIME type
pub fn validate_file(name: &str, bytes: &[u8], config: &IpfsConfig) -> Result<String, IpfsError> {
    let size = bytes.len() as u64;
    if size > config.max_file_size {
        return Err(IpfsError::FileTooLarge {
            size,
            max: config.max_file_size,
        });
    }

    let mime = detect_mime_type(name, bytes);
    if !config.allowed_file_types.iter().any(|t| t.eq_ignore_ascii_case(&mime)) {
        return Err(IpfsError::UnsupportedFileType(format!("{} ({})", mime, name)));
    }

    debug!("Validated {} ({}, {})", name, mime, format_file_size(size));
    Ok(mime)
}
