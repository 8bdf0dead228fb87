//! In-process object URL registry.

use bridge_traits::blob::{BlobStore, BlobUrl};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// `HashMap`-backed [`BlobStore`].
///
/// Payloads are reference-counted `Bytes`, so minting a URL over a cached
/// payload does not copy it.
#[derive(Default)]
pub struct InMemoryBlobStore {
    urls: Mutex<HashMap<BlobUrl, Bytes>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn create_url(&self, data: Bytes) -> BlobUrl {
        let url = BlobUrl::generate();
        debug!(url = %url, size = data.len(), "Created object URL");
        self.urls.lock().insert(url.clone(), data);
        url
    }

    fn revoke_url(&self, url: &BlobUrl) -> bool {
        let removed = self.urls.lock().remove(url).is_some();
        if removed {
            debug!(url = %url, "Revoked object URL");
        }
        removed
    }

    fn resolve(&self, url: &BlobUrl) -> Option<Bytes> {
        self.urls.lock().get(url).cloned()
    }

    fn live_count(&self) -> usize {
        self.urls.lock().len()
    }
}
