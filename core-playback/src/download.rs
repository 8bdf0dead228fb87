//! User downloads of catalog songs.
//!
//! Reuses the playback cache: a song that was already played is saved
//! without another request, and a song downloaded here plays without one.

use bridge_traits::{BlobStore, SaveRequest, SaveTarget};
use core_catalog::SongId;
use core_runtime::config::{DEFAULT_DOWNLOAD_EXTENSION, DEFAULT_DOWNLOAD_SUFFIX};
use core_runtime::status::{StatusBoard, StatusSlot};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{PlaybackError, Result};
use crate::materialize::SongMaterializer;

/// File naming for saved songs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Appended verbatim after the sanitized title.
    pub suffix: String,
    /// Extension without the dot.
    pub extension: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_DOWNLOAD_SUFFIX.to_string(),
            extension: DEFAULT_DOWNLOAD_EXTENSION.to_string(),
        }
    }
}

impl DownloadSettings {
    pub fn file_name_for(&self, title: &str) -> String {
        format!(
            "{}{}.{}",
            sanitize_file_name(title),
            self.suffix,
            self.extension
        )
    }
}

/// Replace every character that is not an ASCII letter or digit with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub struct Downloader {
    materializer: Arc<SongMaterializer>,
    blobs: Arc<dyn BlobStore>,
    save_target: Arc<dyn SaveTarget>,
    status: StatusBoard,
    settings: DownloadSettings,
}

impl Downloader {
    pub fn new(
        materializer: Arc<SongMaterializer>,
        blobs: Arc<dyn BlobStore>,
        save_target: Arc<dyn SaveTarget>,
        status: StatusBoard,
        settings: DownloadSettings,
    ) -> Self {
        Self {
            materializer,
            blobs,
            save_target,
            status,
            settings,
        }
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    /// Save a song through the host. Does not touch the player.
    ///
    /// Returns the file name the song was saved under.
    #[instrument(skip(self))]
    pub async fn download(&self, song_id: &SongId, title: &str) -> Result<String> {
        let payload = match self.materializer.cache().get(song_id) {
            Some(entry) => entry.payload,
            None => {
                self.status.success(
                    StatusSlot::Playback,
                    format!("Preparing to download {}...", title),
                );
                match self.materializer.fetch(song_id, title).await {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(error = %e, "Download fetch failed");
                        self.status.error(
                            StatusSlot::Playback,
                            format!("Failed to download {}.", title),
                        );
                        return Err(e.into());
                    }
                }
            }
        };

        let file_name = self.settings.file_name_for(title);
        let url = self.blobs.create_url(payload.clone());

        let saved = self
            .save_target
            .save(SaveRequest {
                file_name: file_name.clone(),
                url: url.clone(),
                data: payload,
            })
            .await;
        self.blobs.revoke_url(&url);

        if let Err(e) = saved {
            warn!(file_name = %file_name, error = %e, "Host could not save download");
            self.status.error(
                StatusSlot::Playback,
                format!("Failed to download {}.", title),
            );
            return Err(PlaybackError::SaveFailed(e.to_string()));
        }

        info!(file_name = %file_name, "Download dispatched");
        self.status.success(
            StatusSlot::Playback,
            format!("{} download started!", title),
        );
        Ok(file_name)
    }
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("settings", &self.settings)
            .finish()
    }
}
