//! # Playback Module
//!
//! Turns catalog songs into sound on the host's audio output.
//!
//! ## Overview
//!
//! This module handles:
//! - An in-memory cache of full song payloads for the session
//! - Single-flight materialization: one download per uncached song, shared
//!   by every concurrent request for it
//! - The player transport state machine (play, pause, next, previous,
//!   shuffle, repeat, seek, volume, mute)
//! - User downloads that reuse the cache
//!
//! Payloads reach the output as blob URLs minted through the host's
//! [`BlobStore`](bridge_traits::BlobStore). When a download fails the player
//! falls back to the direct stream URL.

pub mod cache;
pub mod download;
pub mod error;
pub mod materialize;
pub mod player;

pub use cache::{CacheConfig, CacheEntry, CacheStats, PlaybackCache};
pub use download::{sanitize_file_name, DownloadSettings, Downloader};
pub use error::{PlaybackError, Result};
pub use materialize::{Materialized, SongMaterializer};
pub use player::{
    PlayOutcome, PlaybackProgress, Player, PlayerSettings, PlayerSnapshot, SourceKind,
    TransportState,
};
