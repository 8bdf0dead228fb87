//! Object URL registry.
//!
//! Mirrors the browser's `URL.createObjectURL` / `URL.revokeObjectURL` pair:
//! an in-memory payload is exposed under a URL the audio output can load, and
//! the URL keeps the payload alive until it is revoked.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// URL minted for an in-memory payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobUrl(String);

impl BlobUrl {
    /// Mint a fresh, unique URL.
    pub fn generate() -> Self {
        Self(format!("blob:surr/{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlobUrl {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlobUrl {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live object URLs.
pub trait BlobStore: Send + Sync {
    /// Expose `data` under a new URL.
    fn create_url(&self, data: Bytes) -> BlobUrl;

    /// Release the URL. Returns `false` if it was not live.
    fn revoke_url(&self, url: &BlobUrl) -> bool;

    /// Payload behind a live URL.
    fn resolve(&self, url: &BlobUrl) -> Option<Bytes>;

    /// Number of URLs not yet revoked.
    fn live_count(&self) -> usize;
}
