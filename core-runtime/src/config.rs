//! # Client Configuration Module
//!
//! Provides configuration management for the Surr playback client.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `ClientConfig` holding every host bridge and tunable the client needs.
//! Validation is fail-fast: `build()` refuses to produce a config with a
//! missing capability or an out-of-range setting.
//!
//! ## Required Dependencies
//!
//! - `AudioOutput` - The device that renders audio. No platform default exists.
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - Catalog API and stream fetches (desktop default: reqwest)
//! - `BlobStore` - Object URLs over cached payloads (desktop default: in-memory)
//! - `SaveTarget` - User downloads (desktop default: the download directory)
//!
//! Desktop defaults are only injected when the `desktop-shims` feature is
//! enabled.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::ClientConfig;
//! use std::sync::Arc;
//!
//! let config = ClientConfig::builder()
//!     .api_base_url("https://surr-back.onrender.com")
//!     .audio_output(Arc::new(MyAudioElement::new()))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{AudioOutput, BlobStore, HttpClient, SaveTarget};
use std::sync::Arc;
use std::time::Duration;

/// Production catalog API.
pub const DEFAULT_API_BASE_URL: &str = "https://surr-back.onrender.com";

/// Delay before a status message clears itself.
pub const DEFAULT_STATUS_CLEAR_DELAY: Duration = Duration::from_secs(5);

/// Position beyond which "previous" restarts the current track.
pub const DEFAULT_SKIP_BACK_THRESHOLD: Duration = Duration::from_secs(3);

pub const DEFAULT_VOLUME: f64 = 0.7;

pub const DEFAULT_DOWNLOAD_SUFFIX: &str = "_-_Surr";

pub const DEFAULT_DOWNLOAD_EXTENSION: &str = "mp3";

/// Client configuration.
///
/// Use [`ClientConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct ClientConfig {
    /// Catalog API base URL, without a trailing slash
    pub api_base_url: String,

    pub http_client: Arc<dyn HttpClient>,

    pub audio_output: Arc<dyn AudioOutput>,

    pub blob_store: Arc<dyn BlobStore>,

    pub save_target: Arc<dyn SaveTarget>,

    /// Player and download tunables
    pub playback: PlaybackSettings,

    /// Capacity of the event broadcast channel
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("http_client", &"HttpClient { ... }")
            .field("audio_output", &"AudioOutput { ... }")
            .field("blob_store", &"BlobStore { ... }")
            .field("save_target", &"SaveTarget { ... }")
            .field("playback", &self.playback)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

/// Player, status and download tunables.
///
/// # Example
///
/// ```
/// use core_runtime::config::PlaybackSettings;
/// use std::time::Duration;
///
/// let settings = PlaybackSettings::new()
///     .with_default_volume(0.5)
///     .with_status_clear_delay(Duration::from_secs(3))
///     .with_cache_max_bytes(256 * 1024 * 1024);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    /// How long a status message stays visible
    pub status_clear_delay: Duration,

    /// "Previous" restarts the current track when the position exceeds this
    pub skip_back_threshold: Duration,

    /// Volume applied to the device when the player is created
    pub default_volume: f64,

    /// Appended to the song title when naming a download
    pub download_suffix: String,

    /// Download file extension, without the dot
    pub download_extension: String,

    /// Byte budget for cached payloads. `None` keeps every payload.
    pub cache_max_bytes: Option<usize>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSettings {
    pub fn new() -> Self {
        Self {
            status_clear_delay: DEFAULT_STATUS_CLEAR_DELAY,
            skip_back_threshold: DEFAULT_SKIP_BACK_THRESHOLD,
            default_volume: DEFAULT_VOLUME,
            download_suffix: DEFAULT_DOWNLOAD_SUFFIX.to_string(),
            download_extension: DEFAULT_DOWNLOAD_EXTENSION.to_string(),
            cache_max_bytes: None,
        }
    }

    pub fn with_status_clear_delay(mut self, delay: Duration) -> Self {
        self.status_clear_delay = delay;
        self
    }

    pub fn with_skip_back_threshold(mut self, threshold: Duration) -> Self {
        self.skip_back_threshold = threshold;
        self
    }

    pub fn with_default_volume(mut self, volume: f64) -> Self {
        self.default_volume = volume;
        self
    }

    pub fn with_download_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.download_suffix = suffix.into();
        self
    }

    pub fn with_download_extension(mut self, extension: impl Into<String>) -> Self {
        self.download_extension = extension.into();
        self
    }

    pub fn with_cache_max_bytes(mut self, max_bytes: usize) -> Self {
        self.cache_max_bytes = Some(max_bytes);
        self
    }

    /// Validates the settings
    pub fn validate(&self) -> Result<()> {
        if self.status_clear_delay.is_zero() {
            return Err(Error::Config(
                "Status clear delay must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(Error::Config(format!(
                "Default volume must be within 0.0..=1.0, got {}",
                self.default_volume
            )));
        }

        let extension = self.download_extension.trim();
        if extension.is_empty() || extension.contains('.') || extension.contains('/') {
            return Err(Error::Config(format!(
                "Download extension must be a bare extension such as \"mp3\", got {:?}",
                self.download_extension
            )));
        }

        if self.cache_max_bytes == Some(0) {
            return Err(Error::Config(
                "Cache byte budget must be greater than 0. Leave it unset to disable eviction."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The API base URL is an absolute http(s) URL
    /// - The event buffer can hold at least one event
    /// - The playback settings are in range
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }

        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "API base URL must start with http:// or https://, got {:?}",
                self.api_base_url
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        self.playback.validate()
    }

    /// Absolute URL for an API path such as `/songs`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn audio_output_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "AudioOutput".to_string(),
        message: "AudioOutput implementation is required to play songs. \
                 Web: wrap the page's audio element. \
                 Desktop: inject the application's audio sink; no default is provided."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new()
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for catalog and stream requests. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Web: inject a fetch-based client."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_blob_store() -> Result<Arc<dyn BlobStore>> {
    Ok(Arc::new(bridge_desktop::InMemoryBlobStore::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_blob_store() -> Result<Arc<dyn BlobStore>> {
    Err(Error::CapabilityMissing {
        capability: "BlobStore".to_string(),
        message: "BlobStore implementation is required to play cached songs. \
                 Desktop: enable the 'desktop-shims' feature to use InMemoryBlobStore. \
                 Web: inject a URL.createObjectURL wrapper."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_save_target() -> Result<Arc<dyn SaveTarget>> {
    Ok(Arc::new(bridge_desktop::DirectorySaveTarget::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_save_target() -> Result<Arc<dyn SaveTarget>> {
    Err(Error::CapabilityMissing {
        capability: "SaveTarget".to_string(),
        message: "SaveTarget implementation is required for downloads. \
                 Desktop: enable the 'desktop-shims' feature to use DirectorySaveTarget. \
                 Web: inject an anchor-click download trigger."
            .to_string(),
    })
}

/// Builder for constructing [`ClientConfig`] instances.
#[derive(Default)]
pub struct ClientConfigBuilder {
    api_base_url: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    audio_output: Option<Arc<dyn AudioOutput>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    save_target: Option<Arc<dyn SaveTarget>>,
    playback: Option<PlaybackSettings>,
    event_buffer_size: Option<usize>,
}

impl ClientConfigBuilder {
    /// Sets the catalog API base URL.
    ///
    /// Default: [`DEFAULT_API_BASE_URL`]. A trailing slash is dropped.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the HTTP client.
    ///
    /// Optional when the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the audio output device. Required.
    pub fn audio_output(mut self, output: Arc<dyn AudioOutput>) -> Self {
        self.audio_output = Some(output);
        self
    }

    pub fn blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    pub fn save_target(mut self, target: Arc<dyn SaveTarget>) -> Self {
        self.save_target = Some(target);
        self
    }

    /// Replaces all playback settings at once.
    pub fn playback(mut self, settings: PlaybackSettings) -> Self {
        self.playback = Some(settings);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `ClientConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns an error if:
    /// - `AudioOutput` was not provided
    /// - Another bridge is missing and `desktop-shims` is disabled
    /// - Any setting is out of range
    pub fn build(self) -> Result<ClientConfig> {
        let audio_output = self.audio_output.ok_or_else(audio_output_missing_error)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let blob_store = match self.blob_store {
            Some(store) => store,
            None => provide_default_blob_store()?,
        };

        let save_target = match self.save_target {
            Some(target) => target,
            None => provide_default_save_target()?,
        };

        let api_base_url = self
            .api_base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let config = ClientConfig {
            api_base_url,
            http_client,
            audio_output,
            blob_store,
            save_target,
            playback: self.playback.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
