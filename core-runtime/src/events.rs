//! # Event Bus System
//!
//! Broadcasts state changes from the catalog, the player and the status board
//! to whatever renders them, using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: one enum per domain, wrapped by [`CoreEvent`]
//! - **EventBus**: central broadcast channel for publishing events
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ```text
//! ┌──────────────┐    emit    ┌──────────┐   subscribe   ┌────────────┐
//! │ CatalogStore ├───────────>│          ├──────────────>│ UI binding │
//! └──────────────┘            │          │               └────────────┘
//! ┌──────────────┐    emit    │ EventBus │
//! │ Player       ├───────────>│          │   subscribe   ┌────────────┐
//! └──────────────┘            │          ├──────────────>│ Logger     │
//! ┌──────────────┐    emit    │          │               └────────────┘
//! │ StatusBoard  ├───────────>│          │
//! └──────────────┘            └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::ShuffleChanged { enabled: true }))
//!     .ok();
//!
//! let event = rx.recv().await.unwrap();
//! assert_eq!(event.description(), "Shuffle toggled");
//! # }
//! ```
//!
//! Emitting with no subscribers returns an error; producers treat that as a
//! no-op and call `.ok()`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, SendError},
};

use crate::status::{StatusKind, StatusSlot};

pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Catalog and playlist data changes
    Catalog(CatalogEvent),
    /// Transport state changes
    Playback(PlaybackEvent),
    /// Status slot updates
    Status(StatusEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Catalog(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Status(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Status(StatusEvent::Shown {
                kind: StatusKind::Error,
                ..
            }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::Started { .. })
            | CoreEvent::Catalog(CatalogEvent::SongUploaded { .. })
            | CoreEvent::Catalog(CatalogEvent::PlaylistCreated { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Events related to the song catalog and playlists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// Song list replaced after a fetch.
    SongsLoaded { count: usize },
    /// Playlist list replaced after a fetch.
    PlaylistsLoaded { count: usize },
    /// A playlist became the traversal scope for next/previous.
    PlaylistOpened {
        playlist_id: String,
        name: String,
        song_count: usize,
    },
    PlaylistCreated { playlist_id: String, name: String },
    SongAddedToPlaylist { playlist_id: String, song_id: String },
    SongUploaded {
        song_id: String,
        title: String,
        artist: String,
    },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::SongsLoaded { .. } => "Songs loaded",
            CatalogEvent::PlaylistsLoaded { .. } => "Playlists loaded",
            CatalogEvent::PlaylistOpened { .. } => "Playlist opened",
            CatalogEvent::PlaylistCreated { .. } => "Playlist created",
            CatalogEvent::SongAddedToPlaylist { .. } => "Song added to playlist",
            CatalogEvent::SongUploaded { .. } => "Song uploaded",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Volume glyph tier shown next to the volume bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeIcon {
    Off,
    Low,
    High,
    Muted,
}

impl VolumeIcon {
    /// Tier for an unmuted volume: `Off` at 0, `Low` below 0.5, `High` otherwise.
    pub fn for_volume(volume: f64) -> Self {
        if volume <= 0.0 {
            VolumeIcon::Off
        } else if volume < 0.5 {
            VolumeIcon::Low
        } else {
            VolumeIcon::High
        }
    }
}

/// Events related to audio playback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A song became current and its payload is being prepared.
    Loading { song_id: String, title: String },
    /// The output accepted the source and started playing.
    Started {
        song_id: String,
        title: String,
        artist: String,
        album_art: Option<String>,
        /// Catalog duration, `M:SS`. Replaced by `DurationResolved` later.
        duration_display: String,
        /// `false` when playing from the direct stream fallback.
        seekable: bool,
    },
    Paused { song_id: String, position_secs: f64 },
    Resumed { song_id: String, position_secs: f64 },
    /// Output metadata arrived with the decoded duration.
    DurationResolved {
        song_id: String,
        duration_secs: f64,
        duration_display: String,
    },
    Seeked { position_secs: f64 },
    VolumeChanged { volume: f64, icon: VolumeIcon },
    MuteChanged { muted: bool, icon: VolumeIcon },
    ShuffleChanged { enabled: bool },
    RepeatChanged { enabled: bool },
    /// Playback could not start; transport is back to idle.
    Error {
        song_id: Option<String>,
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Loading { .. } => "Loading track",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::DurationResolved { .. } => "Duration resolved",
            PlaybackEvent::Seeked { .. } => "Playback position changed",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::MuteChanged { .. } => "Mute toggled",
            PlaybackEvent::ShuffleChanged { .. } => "Shuffle toggled",
            PlaybackEvent::RepeatChanged { .. } => "Repeat toggled",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Status Events
// ============================================================================

/// Status slot updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum StatusEvent {
    Shown {
        slot: StatusSlot,
        message: String,
        kind: StatusKind,
    },
    Cleared { slot: StatusSlot },
}

impl StatusEvent {
    fn description(&self) -> &str {
        match self {
            StatusEvent::Shown { .. } => "Status shown",
            StatusEvent::Cleared { .. } => "Status cleared",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus clones the sender; all clones feed the same subscribers.
/// Slow subscribers receive `RecvError::Lagged` rather than blocking producers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified per-subscriber buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::default();
/// let playback_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv` and `try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next matching event.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once every sender is dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv). `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
