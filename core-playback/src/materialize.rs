//! Song materialization: cache-or-fetch with per-song single flight.
//!
//! Concurrent requests for the same uncached song share one `GET
//! /stream/{id}`. The fetch runs as its own task, so it completes and
//! populates the cache even if every caller stops waiting for it.

use bytes::Bytes;
use core_catalog::{CatalogApi, CatalogError, Song, SongId};
use core_runtime::status::{StatusBoard, StatusSlot};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cache::PlaybackCache;
use crate::error::PlaybackError;

type SharedFetch = Shared<BoxFuture<'static, Result<Bytes, CatalogError>>>;

/// Result of preparing a song for playback.
#[derive(Debug, Clone, PartialEq)]
pub enum Materialized {
    /// The full payload, from the cache or a fresh download.
    Ready(Bytes),
    /// The payload could not be fetched. The caller falls back to streaming.
    Unavailable(PlaybackError),
}

impl Materialized {
    pub fn is_ready(&self) -> bool {
        matches!(self, Materialized::Ready(_))
    }
}

pub struct SongMaterializer {
    api: CatalogApi,
    cache: Arc<PlaybackCache>,
    status: StatusBoard,
    in_flight: Arc<Mutex<HashMap<SongId, SharedFetch>>>,
}

impl SongMaterializer {
    pub fn new(api: CatalogApi, cache: Arc<PlaybackCache>, status: StatusBoard) -> Self {
        Self {
            api,
            cache,
            status,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn cache(&self) -> &Arc<PlaybackCache> {
        &self.cache
    }

    pub fn api(&self) -> &CatalogApi {
        &self.api
    }

    /// Number of stream fetches currently running.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Return the song's payload, downloading it on a cache miss.
    ///
    /// Never fails: a failed download yields [`Materialized::Unavailable`]
    /// and leaves the cache untouched. Progress is reported on the playback
    /// status slot.
    #[instrument(skip(self, song), fields(song_id = %song.id))]
    pub async fn materialize(&self, song: &Song) -> Materialized {
        if let Some(entry) = self.cache.get(&song.id) {
            debug!("Cache hit");
            return Materialized::Ready(entry.payload);
        }

        self.status.success(
            StatusSlot::Playback,
            format!("Downloading {} for reliable playback...", song.title),
        );

        match self.fetch(&song.id, &song.title).await {
            Ok(payload) => {
                self.status
                    .success(StatusSlot::Playback, format!("{} ready to play!", song.title));
                Materialized::Ready(payload)
            }
            Err(e) => {
                warn!(error = %e, "Falling back to direct stream");
                self.status.error(
                    StatusSlot::Playback,
                    format!(
                        "Failed to download {}. Cannot guarantee seeking.",
                        song.title
                    ),
                );
                Materialized::Unavailable(e.into())
            }
        }
    }

    /// Cached payload or a single-flight download, without status messages.
    ///
    /// A successful download is stored in the cache before this returns.
    pub async fn fetch(&self, song_id: &SongId, title: &str) -> Result<Bytes, CatalogError> {
        let fetch = {
            let mut in_flight = self.in_flight.lock();

            // Re-check under the lock: a fetch that just finished has already
            // cached its payload and left the map.
            if let Some(entry) = self.cache.peek(song_id) {
                return Ok(entry.payload);
            }

            match in_flight.get(song_id) {
                Some(existing) => {
                    debug!(song_id = %song_id, "Joining in-flight fetch");
                    existing.clone()
                }
                None => {
                    let fetch = self.start_fetch(song_id.clone(), title.to_string());
                    in_flight.insert(song_id.clone(), fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    fn start_fetch(&self, song_id: SongId, title: String) -> SharedFetch {
        let api = self.api.clone();
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);

        info!(song_id = %song_id, "Fetching song payload");
        let task = tokio::spawn(async move {
            let result = api.fetch_stream(&song_id).await;
            if let Ok(payload) = &result {
                cache.put(song_id.clone(), title, payload.clone());
            }
            in_flight.lock().remove(&song_id);
            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(CatalogError::NetworkFailure(format!(
                    "Fetch task ended unexpectedly: {}",
                    e
                )))
            })
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for SongMaterializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SongMaterializer")
            .field("base_url", &self.api.base_url())
            .field("in_flight", &self.in_flight_count())
            .finish()
    }
}
