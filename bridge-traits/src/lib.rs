//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the host it
//! runs in. Each trait represents a capability the core requires but that is
//! implemented differently per platform (browser shell, desktop).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations, JSON and multipart bodies
//!
//! ### Audio
//! - [`AudioOutput`](playback::AudioOutput) - The element that actually plays sound
//! - [`BlobStore`](blob::BlobStore) - Object URLs over in-memory payloads
//!
//! ### Files
//! - [`SaveTarget`](storage::SaveTarget) - "Save as" for user downloads
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Notes |
//! |----------|---------------------|-------|
//! | Desktop  | `bridge-desktop`    | `AudioOutput` supplied by the app |
//! | Web      | host shell          | all four traits |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors and keep the message actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single handle can be shared
//! across async tasks.

pub mod blob;
pub mod error;
pub mod http;
pub mod playback;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use blob::{BlobStore, BlobUrl};
pub use http::{HttpBody, HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartPart};
pub use playback::{AudioOutput, PlayableSource, PreloadHint, ReadyState};
pub use storage::{SaveRequest, SaveTarget};
