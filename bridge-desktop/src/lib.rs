//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `BlobStore` as an in-process URL registry
//! - `SaveTarget` writing into the user's download directory with `tokio::fs`
//!
//! `AudioOutput` has no desktop default; the application supplies the sink it
//! renders audio with.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DirectorySaveTarget, InMemoryBlobStore, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bridge_traits::BridgeError> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let blobs = InMemoryBlobStore::new();
//!     let downloads = DirectorySaveTarget::new();
//!
//!     // Use in core configuration
//!     Ok(())
//! }
//! ```

mod blob;
mod filesystem;
mod http;

pub use blob::InMemoryBlobStore;
pub use filesystem::DirectorySaveTarget;
pub use http::ReqwestHttpClient;
