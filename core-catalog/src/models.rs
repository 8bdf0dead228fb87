//! Domain models for the remote catalog
//!
//! Field names follow the catalog API's JSON (`albumArt`, `songId`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::format_duration;

/// Shown in the lyrics panel when a song has none.
pub const LYRICS_PLACEHOLDER: &str = "Lyrics not found for this track.";

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a song, assigned by the catalog API
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(String);

impl SongId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SongId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SongId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for a playlist
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaylistId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlaylistId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A song in the catalog. Immutable for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    /// Cover image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    /// Length in seconds as reported by the catalog.
    ///
    /// Display hint only; the decoded duration from the audio device wins
    /// once metadata has loaded.
    #[serde(default)]
    pub duration: f64,
}

impl Song {
    pub fn lyrics_or_placeholder(&self) -> &str {
        match self.lyrics.as_deref() {
            Some(lyrics) if !lyrics.trim().is_empty() => lyrics,
            _ => LYRICS_PLACEHOLDER,
        }
    }

    /// Catalog duration as `M:SS`.
    pub fn display_duration(&self) -> String {
        format_duration(self.duration)
    }
}

/// A named, ordered list of song ids. Order is playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default)]
    pub songs: Vec<SongId>,
}

impl Playlist {
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn contains(&self, song_id: &SongId) -> bool {
        self.songs.contains(song_id)
    }
}

// =============================================================================
// Request / Response Bodies
// =============================================================================

/// Body of `POST /playlist`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreatePlaylistBody<'a> {
    pub name: &'a str,
}

/// Body of `POST /playlist/{id}/songs`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddSongBody<'a> {
    pub song_id: &'a SongId,
}

/// `{ "error": "..." }` returned by the API on failure
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}
