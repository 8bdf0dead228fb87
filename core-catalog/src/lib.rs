//! # Catalog Module
//!
//! Songs and playlists served by the Surr backend.
//!
//! ## Overview
//!
//! This module manages:
//! - Song and playlist models matching the API's JSON
//! - `CatalogApi`, a typed client for the catalog endpoints and audio stream
//! - `CatalogStore`, the in-memory snapshot the player navigates
//! - Case-insensitive search and `M:SS` duration formatting

pub mod api;
pub mod error;
pub mod format;
pub mod models;
pub mod search;
pub mod store;

pub use api::CatalogApi;
pub use error::{CatalogError, Result};
pub use format::format_duration;
pub use models::{Playlist, PlaylistId, Song, SongId, LYRICS_PLACEHOLDER};
pub use search::{search_songs, MIN_QUERY_LEN};
pub use store::CatalogStore;
