//! # Player
//!
//! Transport state machine between the catalog, the playback cache and the
//! host's audio output.
//!
//! ## State
//!
//! The player owns the song that is playing, the ordered list next/previous
//! walk through (the whole catalog or an opened playlist) and the position in
//! that list. Looping, volume and mute live on the output device and are read
//! back from it.
//!
//! ## Concurrency
//!
//! Operations take `&self` and may run concurrently. Every play bumps a
//! generation counter; after awaiting the payload, a play only touches the
//! device if no newer play has started since. A superseded fetch still fills
//! the cache.

use bridge_traits::{AudioOutput, BlobStore, BlobUrl, PlayableSource, PreloadHint};
use core_catalog::{format_duration, CatalogStore, Song, SongId};
use core_runtime::config::{DEFAULT_SKIP_BACK_THRESHOLD, DEFAULT_VOLUME};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, VolumeIcon};
use core_runtime::status::{StatusBoard, StatusSlot};
use parking_lot::Mutex;
use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::PlaybackError;
use crate::materialize::{Materialized, SongMaterializer};

// ============================================================================
// Public Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    Idle,
    Loading,
    Playing,
    Paused,
}

/// Where the device is reading the current song from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A blob URL over the cached payload. Seeking is reliable.
    Local,
    /// The direct stream URL, used when the download failed.
    Stream,
}

/// Result of a transport operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    /// A song started playing.
    Started { song_id: SongId, source: SourceKind },
    Resumed,
    Paused,
    /// Previous restarted the current song instead of changing track.
    Restarted,
    /// The requested song is not in the catalog.
    NotFound,
    /// Nothing to play: empty catalog or empty list.
    NothingToPlay,
    /// A newer play started while this one was loading.
    Superseded,
    /// The output refused to play.
    Rejected(PlaybackError),
}

/// Player tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    pub skip_back_threshold: Duration,
    pub default_volume: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            skip_back_threshold: DEFAULT_SKIP_BACK_THRESHOLD,
            default_volume: DEFAULT_VOLUME,
        }
    }
}

/// Progress-bar snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackProgress {
    pub position_secs: f64,
    /// `None` until the device knows the duration.
    pub duration_secs: Option<f64>,
    /// Position as a fraction of the duration, `0.0` when unknown.
    pub fraction: f64,
    pub position_display: String,
    pub duration_display: String,
}

/// Read-only view of the player for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub transport: TransportState,
    pub now_playing: Option<Song>,
    pub current_index: Option<usize>,
    pub queue_len: usize,
    pub shuffling: bool,
    pub looping: bool,
    pub volume: f64,
    pub muted: bool,
}

// ============================================================================
// Player
// ============================================================================

/// Where the current list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueueOrigin {
    Catalog,
    Playlist,
}

struct PlayerState {
    transport: TransportState,
    now_playing: Option<Song>,
    queue: Arc<Vec<Song>>,
    queue_origin: QueueOrigin,
    current_index: Option<usize>,
    shuffling: bool,
    /// Blob URL currently assigned to the device, if it was minted here.
    current_blob: Option<BlobUrl>,
}

pub struct Player {
    catalog: Arc<CatalogStore>,
    materializer: Arc<SongMaterializer>,
    output: Arc<dyn AudioOutput>,
    blobs: Arc<dyn BlobStore>,
    status: StatusBoard,
    events: EventBus,
    settings: PlayerSettings,
    state: Mutex<PlayerState>,
    generation: AtomicU64,
}

impl Player {
    /// Create a player and apply the default volume to the device.
    pub fn new(
        catalog: Arc<CatalogStore>,
        materializer: Arc<SongMaterializer>,
        output: Arc<dyn AudioOutput>,
        blobs: Arc<dyn BlobStore>,
        status: StatusBoard,
        events: EventBus,
        settings: PlayerSettings,
    ) -> Self {
        output.set_volume(settings.default_volume.clamp(0.0, 1.0));

        Self {
            catalog,
            materializer,
            output,
            blobs,
            status,
            events,
            settings,
            state: Mutex::new(PlayerState {
                transport: TransportState::Idle,
                now_playing: None,
                queue: Arc::new(Vec::new()),
                queue_origin: QueueOrigin::Catalog,
                current_index: None,
                shuffling: false,
                current_blob: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn transport_state(&self) -> TransportState {
        self.state.lock().transport
    }

    pub fn now_playing(&self) -> Option<Song> {
        self.state.lock().now_playing.clone()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.lock().current_index
    }

    /// The list next/previous walk through.
    pub fn queue(&self) -> Arc<Vec<Song>> {
        Arc::clone(&self.state.lock().queue)
    }

    pub fn is_shuffling(&self) -> bool {
        self.state.lock().shuffling
    }

    pub fn is_looping(&self) -> bool {
        self.output.is_looping()
    }

    pub fn volume(&self) -> f64 {
        self.output.volume()
    }

    pub fn is_muted(&self) -> bool {
        self.output.is_muted()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let state = self.state.lock();
        PlayerSnapshot {
            transport: state.transport,
            now_playing: state.now_playing.clone(),
            current_index: state.current_index,
            queue_len: state.queue.len(),
            shuffling: state.shuffling,
            looping: self.output.is_looping(),
            volume: self.output.volume(),
            muted: self.output.is_muted(),
        }
    }

    /// Replace the list next/previous walk through, e.g. when a playlist is
    /// opened. The current index is unset until a song from it is played.
    pub fn set_queue(&self, songs: Vec<Song>) {
        let mut state = self.state.lock();
        debug!(len = songs.len(), "Queue replaced");
        state.queue = Arc::new(songs);
        state.queue_origin = QueueOrigin::Playlist;
        state.current_index = None;
    }

    // ------------------------------------------------------------------------
    // Track changes
    // ------------------------------------------------------------------------

    /// Play a catalog song.
    ///
    /// An opened playlist is kept when it contains the song. Otherwise the
    /// list becomes the current catalog, so a refreshed catalog always
    /// replaces an older copy of it.
    #[instrument(skip(self, song_id), fields(song_id = %song_id))]
    pub async fn play(&self, song_id: &SongId) -> PlayOutcome {
        let catalog_songs = self.catalog.songs();
        let song = match catalog_songs.iter().find(|s| &s.id == song_id) {
            Some(song) => song.clone(),
            None => {
                debug!("Song not in catalog");
                return PlayOutcome::NotFound;
            }
        };

        let generation = {
            let mut state = self.state.lock();
            let kept = match state.queue_origin {
                QueueOrigin::Playlist => state.queue.iter().position(|s| &s.id == song_id),
                QueueOrigin::Catalog if Arc::ptr_eq(&state.queue, &catalog_songs) => {
                    state.queue.iter().position(|s| &s.id == song_id)
                }
                QueueOrigin::Catalog => None,
            };
            let index = match kept {
                Some(index) => index,
                None => {
                    debug!(len = catalog_songs.len(), "Queue reset to catalog");
                    let index = catalog_songs.iter().position(|s| &s.id == song_id);
                    state.queue = catalog_songs;
                    state.queue_origin = QueueOrigin::Catalog;
                    match index {
                        Some(index) => index,
                        None => return PlayOutcome::NotFound,
                    }
                }
            };
            self.begin_loading(&mut state, song.clone(), index)
        };

        self.load_and_start(song, generation).await
    }

    /// Advance to the next song, or a random other song while shuffling.
    #[instrument(skip(self))]
    pub async fn skip_next(&self) -> PlayOutcome {
        let (song, generation) = {
            let mut state = self.state.lock();
            let len = state.queue.len();
            if len == 0 {
                return PlayOutcome::NothingToPlay;
            }

            let index = if state.shuffling {
                let mut rng = rand::thread_rng();
                loop {
                    let candidate = rng.gen_range(0..len);
                    if len == 1 || Some(candidate) != state.current_index {
                        break candidate;
                    }
                }
            } else {
                state.current_index.map_or(0, |i| (i + 1) % len)
            };

            let song = state.queue[index].clone();
            let generation = self.begin_loading(&mut state, song.clone(), index);
            (song, generation)
        };

        self.load_and_start(song, generation).await
    }

    /// Restart the song when past the threshold, else go to the previous one.
    ///
    /// With no current index, previous wraps to the last song.
    #[instrument(skip(self))]
    pub async fn skip_back(&self) -> PlayOutcome {
        let (song, generation) = {
            let mut state = self.state.lock();
            let len = state.queue.len();
            if len == 0 {
                return PlayOutcome::NothingToPlay;
            }

            if self.output.current_time() > self.settings.skip_back_threshold.as_secs_f64() {
                drop(state);
                self.output.set_current_time(0.0);
                self.emit(PlaybackEvent::Seeked { position_secs: 0.0 });
                return PlayOutcome::Restarted;
            }

            let index = match state.current_index {
                Some(i) => (i + len - 1) % len,
                None => len - 1,
            };

            let song = state.queue[index].clone();
            let generation = self.begin_loading(&mut state, song.clone(), index);
            (song, generation)
        };

        self.load_and_start(song, generation).await
    }

    /// Pause or resume. Starts the first catalog song when nothing is loaded.
    #[instrument(skip(self))]
    pub async fn toggle_play_pause(&self) -> PlayOutcome {
        let now_playing = self.state.lock().now_playing.clone();
        let song = match now_playing {
            Some(song) if self.output.source().is_some() => song,
            _ => {
                return match self.catalog.first_song() {
                    Some(first) => self.play(&first.id).await,
                    None => PlayOutcome::NothingToPlay,
                };
            }
        };

        if !self.output.is_paused() {
            self.output.pause();
            self.set_transport(TransportState::Paused);
            self.emit(PlaybackEvent::Paused {
                song_id: song.id.to_string(),
                position_secs: self.output.current_time(),
            });
            return PlayOutcome::Paused;
        }

        match self.output.play().await {
            Ok(()) => {
                self.set_transport(TransportState::Playing);
                self.emit(PlaybackEvent::Resumed {
                    song_id: song.id.to_string(),
                    position_secs: self.output.current_time(),
                });
                PlayOutcome::Resumed
            }
            Err(e) => {
                warn!(song_id = %song.id, error = %e, "Resume rejected");
                let error = PlaybackError::PlaybackRejected(e.to_string());
                self.emit(PlaybackEvent::Error {
                    song_id: Some(song.id.to_string()),
                    message: error.to_string(),
                });
                PlayOutcome::Rejected(error)
            }
        }
    }

    /// Record the new current song and return this play's generation.
    fn begin_loading(&self, state: &mut PlayerState, song: Song, index: usize) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.emit(PlaybackEvent::Loading {
            song_id: song.id.to_string(),
            title: song.title.clone(),
        });

        state.now_playing = Some(song);
        state.current_index = Some(index);
        state.transport = TransportState::Loading;
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn load_and_start(&self, song: Song, generation: u64) -> PlayOutcome {
        let materialized = self.materializer.materialize(&song).await;

        if !self.is_current(generation) {
            debug!(song_id = %song.id, "Play superseded while loading");
            return PlayOutcome::Superseded;
        }

        let source_kind = {
            let mut state = self.state.lock();
            if let Some(previous) = state.current_blob.take() {
                self.blobs.revoke_url(&previous);
            }

            match materialized {
                Materialized::Ready(payload) => {
                    let url = self.blobs.create_url(payload);
                    state.current_blob = Some(url.clone());
                    self.output
                        .set_source(PlayableSource::Blob(url), PreloadHint::Auto);
                    SourceKind::Local
                }
                Materialized::Unavailable(_) => {
                    let url = self.materializer.api().stream_url(&song.id);
                    self.output
                        .set_source(PlayableSource::Stream(url), PreloadHint::Metadata);
                    SourceKind::Stream
                }
            }
        };

        let result = self.output.play().await;

        if !self.is_current(generation) {
            debug!(song_id = %song.id, "Play superseded while starting");
            return PlayOutcome::Superseded;
        }

        match result {
            Ok(()) => {
                self.set_transport(TransportState::Playing);
                info!(song_id = %song.id, title = %song.title, source = ?source_kind, "Playback started");
                self.emit(PlaybackEvent::Started {
                    song_id: song.id.to_string(),
                    title: song.title.clone(),
                    artist: song.artist.clone(),
                    album_art: song.album_art.clone(),
                    duration_display: song.display_duration(),
                    seekable: source_kind == SourceKind::Local,
                });
                PlayOutcome::Started {
                    song_id: song.id,
                    source: source_kind,
                }
            }
            Err(e) => {
                warn!(song_id = %song.id, error = %e, "Output rejected playback");
                self.set_transport(TransportState::Idle);
                self.status.error(
                    StatusSlot::Playback,
                    format!("Could not play {}. Playback failed.", song.title),
                );
                let error = PlaybackError::PlaybackRejected(e.to_string());
                self.emit(PlaybackEvent::Error {
                    song_id: Some(song.id.to_string()),
                    message: error.to_string(),
                });
                PlayOutcome::Rejected(error)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Modes, position and volume
    // ------------------------------------------------------------------------

    pub fn toggle_shuffle(&self) -> bool {
        let enabled = {
            let mut state = self.state.lock();
            state.shuffling = !state.shuffling;
            state.shuffling
        };
        self.emit(PlaybackEvent::ShuffleChanged { enabled });
        enabled
    }

    /// Flip the device's native loop flag.
    pub fn toggle_repeat(&self) -> bool {
        let enabled = !self.output.is_looping();
        self.output.set_looping(enabled);
        self.emit(PlaybackEvent::RepeatChanged { enabled });
        enabled
    }

    /// Seek to a fraction of the decoded duration.
    ///
    /// The fraction is clamped to `[0, 1]`. Nothing happens before the device
    /// has metadata or while the duration is unknown. Returns the new
    /// position in seconds when applied.
    pub fn seek_to(&self, fraction: f64) -> Option<f64> {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let position = fraction * self.output.duration();

        if !position.is_finite() || !self.output.ready_state().has_metadata() {
            debug!(fraction, "Seek ignored until metadata is available");
            return None;
        }

        self.output.set_current_time(position);
        self.emit(PlaybackEvent::Seeked {
            position_secs: position,
        });
        Some(position)
    }

    /// Set the device volume, clamped to `[0, 1]`. Returns the applied value.
    pub fn set_volume(&self, fraction: f64) -> f64 {
        let volume = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };

        self.output.set_volume(volume);
        self.emit(PlaybackEvent::VolumeChanged {
            volume,
            icon: VolumeIcon::for_volume(volume),
        });
        volume
    }

    pub fn toggle_mute(&self) -> bool {
        let muted = !self.output.is_muted();
        self.output.set_muted(muted);

        let icon = if muted {
            VolumeIcon::Muted
        } else {
            VolumeIcon::for_volume(self.output.volume())
        };
        self.emit(PlaybackEvent::MuteChanged { muted, icon });
        muted
    }

    // ------------------------------------------------------------------------
    // Device callbacks
    // ------------------------------------------------------------------------

    /// The device finished the song. Advances unless the device is looping,
    /// in which case it restarts on its own and `None` is returned.
    pub async fn on_track_ended(&self) -> Option<PlayOutcome> {
        if self.output.is_looping() {
            return None;
        }
        Some(self.skip_next().await)
    }

    /// The device decoded the song's metadata. Returns the real duration.
    pub fn on_metadata_loaded(&self) -> Option<f64> {
        let duration = self.output.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return None;
        }

        let song_id = self.state.lock().now_playing.as_ref()?.id.to_string();
        self.emit(PlaybackEvent::DurationResolved {
            song_id,
            duration_secs: duration,
            duration_display: format_duration(duration),
        });
        Some(duration)
    }

    pub fn progress(&self) -> PlaybackProgress {
        let position = self.output.current_time();
        let duration = self.output.duration();

        if duration.is_finite() && duration > 0.0 {
            PlaybackProgress {
                position_secs: position,
                duration_secs: Some(duration),
                fraction: (position / duration).clamp(0.0, 1.0),
                position_display: format_duration(position),
                duration_display: format_duration(duration),
            }
        } else {
            PlaybackProgress {
                position_secs: position,
                duration_secs: None,
                fraction: 0.0,
                position_display: format_duration(position),
                duration_display: format_duration(f64::NAN),
            }
        }
    }

    fn set_transport(&self, transport: TransportState) {
        self.state.lock().transport = transport;
    }

    fn emit(&self, event: PlaybackEvent) {
        self.events.emit(CoreEvent::Playback(event)).ok();
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Some(url) = self.state.get_mut().current_blob.take() {
            self.blobs.revoke_url(&url);
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("snapshot", &self.snapshot())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}
