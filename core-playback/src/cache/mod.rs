//! # Playback Cache Module
//!
//! Session-lifetime cache of fully downloaded song payloads.
//!
//! ## Overview
//!
//! Playing from a complete local copy is what makes seeking reliable, so a
//! song is downloaded once and every later play or download reuses it.
//! - Keyed by song id, one immutable entry per id
//! - No TTL or invalidation; the cache lives as long as the client
//! - Optional byte budget with LRU eviction, off by default
//!
//! ## Usage
//!
//! ```rust
//! use bytes::Bytes;
//! use core_catalog::SongId;
//! use core_playback::cache::{CacheConfig, PlaybackCache};
//!
//! let cache = PlaybackCache::new(CacheConfig::new().with_max_bytes(512 * 1024 * 1024));
//! cache.put(SongId::from("2"), "B", Bytes::from_static(b"..."));
//! assert!(cache.has(&SongId::from("2")));
//! ```

pub mod config;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use config::CacheConfig;
pub use stats::CacheStats;
pub use store::{CacheEntry, PlaybackCache};
