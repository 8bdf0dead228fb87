//! Audio output bridge.
//!
//! The host owns the actual audio element (an `<audio>` tag in a browser, a
//! native sink on desktop). The core drives it through [`AudioOutput`] and
//! never decodes audio itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::blob::BlobUrl;
use crate::error::Result;

/// Source handed to the audio output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayableSource {
    /// Locally minted URL over a fully buffered payload. Must be revoked by
    /// whoever minted it once it is replaced.
    Blob(BlobUrl),
    /// Direct remote stream; seeking depends on server range support.
    Stream(String),
}

impl PlayableSource {
    pub fn url(&self) -> &str {
        match self {
            PlayableSource::Blob(url) => url.as_str(),
            PlayableSource::Stream(url) => url,
        }
    }

    pub fn blob_url(&self) -> Option<&BlobUrl> {
        match self {
            PlayableSource::Blob(url) => Some(url),
            PlayableSource::Stream(_) => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, PlayableSource::Blob(_))
    }
}

/// How much of the source the output should fetch ahead of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreloadHint {
    /// Buffer the whole source.
    Auto,
    /// Only fetch enough to learn duration and format.
    Metadata,
}

/// Readiness levels reported by the output, ordered from least to most ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

impl ReadyState {
    /// Duration and seekable range are known.
    pub fn has_metadata(self) -> bool {
        self >= ReadyState::HaveMetadata
    }
}

/// Host audio output device.
///
/// Times are in seconds. `duration` returns `f64::NAN` until metadata is
/// loaded. Volume is linear in `[0.0, 1.0]`.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Replace the current source. Does not start playback.
    fn set_source(&self, source: PlayableSource, preload: PreloadHint);

    /// Currently assigned source, if any.
    fn source(&self) -> Option<PlayableSource>;

    /// Start or resume playback of the assigned source.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Rejected`](crate::BridgeError::Rejected) when the
    /// output refuses to start (unsupported format, autoplay policy, no source).
    async fn play(&self) -> Result<()>;

    fn pause(&self);

    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&self, seconds: f64);

    fn duration(&self) -> f64;

    fn ready_state(&self) -> ReadyState;

    /// Native loop flag. When set the output restarts the source itself and
    /// never reports end of track.
    fn set_looping(&self, looping: bool);

    fn is_looping(&self) -> bool;

    fn set_volume(&self, volume: f64);

    fn volume(&self) -> f64;

    fn set_muted(&self, muted: bool);

    fn is_muted(&self) -> bool;
}
