//! The client session: catalog, player and downloads over one set of bridges.

use bytes::Bytes;
use core_catalog::{CatalogApi, CatalogError, CatalogStore, Playlist, PlaylistId, Song, SongId};
use core_playback::{
    CacheConfig, DownloadSettings, Downloader, PlaybackCache, Player, PlayerSettings,
    SongMaterializer,
};
use core_runtime::config::ClientConfig;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus, EventStream};
use core_runtime::status::{StatusBoard, StatusMessage, StatusSlot};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;

/// Primary façade exposed to host applications.
///
/// Cloning is cheap; clones share the same session.
#[derive(Clone)]
pub struct SurrService {
    events: EventBus,
    status: StatusBoard,
    catalog: Arc<CatalogStore>,
    api: CatalogApi,
    cache: Arc<PlaybackCache>,
    player: Arc<Player>,
    downloader: Arc<Downloader>,
}

impl SurrService {
    /// Wire a session from a validated configuration.
    ///
    /// The catalog starts empty; call [`refresh`](Self::refresh) to load it.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let settings = &config.playback;
        let events = EventBus::new(config.event_buffer_size);
        let status = StatusBoard::new(events.clone(), settings.status_clear_delay);

        let catalog = Arc::new(CatalogStore::new());
        let api = CatalogApi::new(Arc::clone(&config.http_client), config.api_base_url.clone());

        let cache_config = match settings.cache_max_bytes {
            Some(max_bytes) => CacheConfig::new().with_max_bytes(max_bytes),
            None => CacheConfig::new(),
        };
        let cache = Arc::new(PlaybackCache::new(cache_config));

        let materializer = Arc::new(SongMaterializer::new(
            api.clone(),
            Arc::clone(&cache),
            status.clone(),
        ));

        let player = Arc::new(Player::new(
            Arc::clone(&catalog),
            Arc::clone(&materializer),
            Arc::clone(&config.audio_output),
            Arc::clone(&config.blob_store),
            status.clone(),
            events.clone(),
            PlayerSettings {
                skip_back_threshold: settings.skip_back_threshold,
                default_volume: settings.default_volume,
            },
        ));

        let downloader = Arc::new(Downloader::new(
            materializer,
            Arc::clone(&config.blob_store),
            Arc::clone(&config.save_target),
            status.clone(),
            DownloadSettings {
                suffix: settings.download_suffix.clone(),
                extension: settings.download_extension.clone(),
            },
        ));

        info!(api_base_url = %config.api_base_url, "Client session created");

        Ok(Self {
            events,
            status,
            catalog,
            api,
            cache,
            player,
            downloader,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub fn cache(&self) -> &Arc<PlaybackCache> {
        &self.cache
    }

    pub fn songs(&self) -> Arc<Vec<Song>> {
        self.catalog.songs()
    }

    pub fn playlists(&self) -> Arc<Vec<Playlist>> {
        self.catalog.playlists()
    }

    /// Case-insensitive search over title, artist and album.
    pub fn search(&self, query: &str) -> Vec<Song> {
        self.catalog.search(query)
    }

    /// Subscribe to catalog, playback and status events.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    pub fn status(&self, slot: StatusSlot) -> Option<StatusMessage> {
        self.status.current(slot)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Reload songs and playlists. Both requests are attempted; the first
    /// failure is returned.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        let (songs, playlists) =
            futures::future::join(self.refresh_songs(), self.refresh_playlists()).await;
        songs?;
        playlists?;
        Ok(())
    }

    /// Reload the song list. On failure the previous list is kept.
    #[instrument(skip(self))]
    pub async fn refresh_songs(&self) -> Result<usize> {
        let songs = self.api.fetch_songs().await.map_err(|e| {
            warn!(error = %e, "Could not load songs");
            e
        })?;

        let count = songs.len();
        self.catalog.replace_songs(songs);
        self.emit(CatalogEvent::SongsLoaded { count });
        Ok(count)
    }

    /// Reload the playlist list. On failure the previous list is kept.
    #[instrument(skip(self))]
    pub async fn refresh_playlists(&self) -> Result<usize> {
        let playlists = self.api.fetch_playlists().await.map_err(|e| {
            warn!(error = %e, "Could not load playlists");
            e
        })?;

        let count = playlists.len();
        self.catalog.replace_playlists(playlists);
        self.emit(CatalogEvent::PlaylistsLoaded { count });
        Ok(count)
    }

    /// Make a playlist the list next/previous walk through.
    ///
    /// Returns its songs in playlist order, or `None` for an unknown id.
    #[instrument(skip(self))]
    pub fn view_playlist(&self, playlist_id: &PlaylistId) -> Option<Vec<Song>> {
        let playlist = self.catalog.find_playlist(playlist_id)?;
        let songs = self.catalog.playlist_songs(playlist_id)?;

        self.player.set_queue(songs.clone());
        self.emit(CatalogEvent::PlaylistOpened {
            playlist_id: playlist.id.to_string(),
            name: playlist.name,
            song_count: songs.len(),
        });
        Some(songs)
    }

    #[instrument(skip(self))]
    pub async fn create_playlist(&self, name: &str) -> Result<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            self.status
                .error(StatusSlot::Playlist, "Playlist name required");
            return Err(CatalogError::Validation("Playlist name required".to_string()).into());
        }

        match self.api.create_playlist(name).await {
            Ok(playlist) => {
                self.status
                    .success(StatusSlot::Playlist, format!("Created: {}", playlist.name));
                self.emit(CatalogEvent::PlaylistCreated {
                    playlist_id: playlist.id.to_string(),
                    name: playlist.name.clone(),
                });
                self.refresh_playlists_quietly().await;
                Ok(playlist)
            }
            Err(e) => {
                self.status.error(
                    StatusSlot::Playlist,
                    failure_message(&e, "Failed to create playlist", "Failed to create playlist"),
                );
                Err(e.into())
            }
        }
    }

    /// Append a song to a playlist.
    ///
    /// Returns `Ok(false)` without a request when the song is not in the
    /// catalog.
    #[instrument(skip(self))]
    pub async fn add_song_to_playlist(
        &self,
        song_id: &SongId,
        playlist_id: &PlaylistId,
    ) -> Result<bool> {
        let song = match self.catalog.find_song(song_id) {
            Some(song) => song,
            None => {
                debug!("Song not in catalog");
                return Ok(false);
            }
        };

        match self.api.add_song_to_playlist(playlist_id, song_id).await {
            Ok(()) => {
                self.status.success(
                    StatusSlot::AddToPlaylist,
                    format!("Added {} to playlist!", song.title),
                );
                self.emit(CatalogEvent::SongAddedToPlaylist {
                    playlist_id: playlist_id.to_string(),
                    song_id: song_id.to_string(),
                });
                self.refresh_playlists_quietly().await;
                Ok(true)
            }
            Err(e) => {
                self.status.error(
                    StatusSlot::AddToPlaylist,
                    failure_message(&e, "Failed to add song.", "Failed to add song to playlist."),
                );
                Err(e.into())
            }
        }
    }

    /// Upload an audio file. The server extracts its tags.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn upload_song(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<Song> {
        if data.is_empty() {
            self.status.error(StatusSlot::Upload, "No file selected");
            return Err(CatalogError::Validation("No file selected".to_string()).into());
        }

        self.status.success(
            StatusSlot::Upload,
            "Uploading and processing, please wait...",
        );

        match self.api.upload_song(file_name, content_type, data).await {
            Ok(song) => {
                self.status.success(
                    StatusSlot::Upload,
                    format!("Successfully uploaded: {} by {}", song.title, song.artist),
                );
                self.emit(CatalogEvent::SongUploaded {
                    song_id: song.id.to_string(),
                    title: song.title.clone(),
                    artist: song.artist.clone(),
                });
                if let Err(e) = self.refresh_songs().await {
                    warn!(error = %e, "Song list not refreshed after upload");
                }
                Ok(song)
            }
            Err(e) => {
                self.status.error(
                    StatusSlot::Upload,
                    failure_message(
                        &e,
                        "Upload failed due to a server error.",
                        "Upload failed: Could not connect to the server or a network error occurred.",
                    ),
                );
                Err(e.into())
            }
        }
    }

    // ========================================================================
    // Downloads
    // ========================================================================

    /// Save a song through the host's save target. The player is untouched.
    ///
    /// Returns the file name used.
    pub async fn download(&self, song_id: &SongId, title: &str) -> Result<String> {
        Ok(self.downloader.download(song_id, title).await?)
    }

    async fn refresh_playlists_quietly(&self) {
        if let Err(e) = self.refresh_playlists().await {
            warn!(error = %e, "Playlists not refreshed");
        }
    }

    fn emit(&self, event: CatalogEvent) {
        self.events.emit(CoreEvent::Catalog(event)).ok();
    }
}

impl std::fmt::Debug for SurrService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrService")
            .field("base_url", &self.api.base_url())
            .field("songs", &self.catalog.song_count())
            .field("cache", &self.cache)
            .finish()
    }
}

/// Status text for a failed catalog mutation: the server's own message when
/// it sent one, otherwise the fallback for the failure kind.
fn failure_message(err: &CatalogError, server_fallback: &str, network_fallback: &str) -> String {
    match err {
        CatalogError::ServerError { message, .. } => message
            .clone()
            .unwrap_or_else(|| server_fallback.to_string()),
        _ => network_fallback.to_string(),
    }
}
