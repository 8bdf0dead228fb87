//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, audio output,
//! blob URLs, save target) into the shared Rust core. Desktop apps typically
//! enable the `desktop-shims` feature (which depends on `bridge-desktop`) and
//! only inject their audio sink.
//!
//! ```ignore
//! use core_service::{ClientConfig, SurrService};
//!
//! let config = ClientConfig::builder()
//!     .audio_output(audio_sink)
//!     .build()?;
//! let service = SurrService::new(config)?;
//! service.refresh().await?;
//! service.player().play(&"2".into()).await;
//! ```

pub mod error;
pub mod service;

pub use error::{Result, ServiceError};
pub use service::SurrService;

pub use core_catalog::{Playlist, PlaylistId, Song, SongId};
pub use core_playback::{PlayOutcome, PlaybackProgress, PlayerSnapshot, TransportState};
pub use core_runtime::config::{ClientConfig, PlaybackSettings};
pub use core_runtime::events::{CoreEvent, EventStream};
pub use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
pub use core_runtime::status::{StatusKind, StatusMessage, StatusSlot};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use bridge_desktop;
