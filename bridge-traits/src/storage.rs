//! Save-as abstraction for user downloads.

use async_trait::async_trait;
use bytes::Bytes;

use crate::blob::BlobUrl;
use crate::error::Result;

/// A single file handed to the host for saving.
///
/// Browser hosts follow `url` with a transient anchor; native hosts write
/// `data` directly.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub file_name: String,
    pub url: BlobUrl,
    pub data: Bytes,
}

/// Host-side "save as" target.
///
/// `save` returns once the download has been dispatched. The caller revokes
/// the URL right after, so implementations must not keep it.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::{SaveRequest, SaveTarget};
///
/// async fn export(target: &dyn SaveTarget, request: SaveRequest) -> Result<()> {
///     target.save(request).await
/// }
/// ```
#[async_trait]
pub trait SaveTarget: Send + Sync {
    async fn save(&self, request: SaveRequest) -> Result<()>;
}
