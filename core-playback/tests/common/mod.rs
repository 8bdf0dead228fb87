//! Fakes for the host bridges and a fully wired player.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    AudioOutput, BlobStore, BlobUrl, HttpClient, HttpRequest, HttpResponse, PlayableSource,
    PreloadHint, ReadyState, SaveRequest, SaveTarget,
};
use bytes::Bytes;
use core_catalog::{CatalogApi, CatalogStore, Song, SongId};
use core_playback::{
    CacheConfig, DownloadSettings, Downloader, PlaybackCache, Player, PlayerSettings,
    SongMaterializer,
};
use core_runtime::events::EventBus;
use core_runtime::status::StatusBoard;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const BASE: &str = "https://api.test";

pub fn song(id: &str, title: &str) -> Song {
    Song {
        id: SongId::from(id),
        title: title.to_string(),
        artist: "Artist".to_string(),
        album: "Album".to_string(),
        album_art: None,
        lyrics: None,
        duration: 180.0,
    }
}

/// Songs "1".."n" titled "A", "B", "C", ...
pub fn songs(n: usize) -> Vec<Song> {
    (0..n)
        .map(|i| {
            let title = ((b'A' + i as u8) as char).to_string();
            song(&(i + 1).to_string(), &title)
        })
        .collect()
}

// ============================================================================
// HTTP
// ============================================================================

/// Serves `/stream/{id}` with a payload derived from the id. Unknown ids
/// answer 404 and ids marked as failing return a transport error.
#[derive(Default)]
pub struct FakeHttp {
    requests: Mutex<Vec<String>>,
    missing: Mutex<Vec<String>>,
    broken: Mutex<Vec<String>>,
    latency: Mutex<Option<Duration>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_404(&self, id: &str) {
        self.missing.lock().push(format!("{}/stream/{}", BASE, id));
    }

    pub fn fail_transport(&self, id: &str) {
        self.broken.lock().push(format!("{}/stream/{}", BASE, id));
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.as_str() == url).count()
    }

    pub fn payload_for(id: &str) -> Bytes {
        Bytes::from(format!("audio-{}", id))
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.requests.lock().push(request.url.clone());

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.broken.lock().contains(&request.url) {
            return Err(BridgeError::OperationFailed("connection reset".to_string()));
        }
        if self.missing.lock().contains(&request.url) {
            return Ok(HttpResponse::new(404, r#"{"error":"Song not found"}"#));
        }

        match request.url.strip_prefix(&format!("{}/stream/", BASE)) {
            Some(id) => Ok(HttpResponse::new(200, Self::payload_for(id))),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}

// ============================================================================
// Audio output
// ============================================================================

pub struct OutputState {
    pub source: Option<PlayableSource>,
    pub preload: Option<PreloadHint>,
    pub paused: bool,
    pub time: f64,
    pub duration: f64,
    pub ready: ReadyState,
    pub looping: bool,
    pub volume: f64,
    pub muted: bool,
    pub reject_play: bool,
    pub play_calls: usize,
}

pub struct FakeOutput {
    pub state: Mutex<OutputState>,
}

impl FakeOutput {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(OutputState {
                source: None,
                preload: None,
                paused: true,
                time: 0.0,
                duration: f64::NAN,
                ready: ReadyState::HaveNothing,
                looping: false,
                volume: 1.0,
                muted: false,
                reject_play: false,
                play_calls: 0,
            }),
        }
    }

    /// Simulate the device decoding metadata.
    pub fn load_metadata(&self, duration: f64) {
        let mut state = self.state.lock();
        state.duration = duration;
        state.ready = ReadyState::HaveEnoughData;
    }

    pub fn set_time(&self, time: f64) {
        self.state.lock().time = time;
    }

    pub fn reject_play(&self, reject: bool) {
        self.state.lock().reject_play = reject;
    }

    pub fn preload(&self) -> Option<PreloadHint> {
        self.state.lock().preload
    }

    pub fn play_calls(&self) -> usize {
        self.state.lock().play_calls
    }
}

#[async_trait]
impl AudioOutput for FakeOutput {
    fn set_source(&self, source: PlayableSource, preload: PreloadHint) {
        let mut state = self.state.lock();
        state.source = Some(source);
        state.preload = Some(preload);
        state.paused = true;
        state.time = 0.0;
        state.duration = f64::NAN;
        state.ready = ReadyState::HaveNothing;
    }

    fn source(&self) -> Option<PlayableSource> {
        self.state.lock().source.clone()
    }

    async fn play(&self) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.play_calls += 1;
        if state.reject_play || state.source.is_none() {
            return Err(BridgeError::Rejected("NotSupportedError".to_string()));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn current_time(&self) -> f64 {
        self.state.lock().time
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.lock().time = seconds;
    }

    fn duration(&self) -> f64 {
        self.state.lock().duration
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready
    }

    fn set_looping(&self, looping: bool) {
        self.state.lock().looping = looping;
    }

    fn is_looping(&self) -> bool {
        self.state.lock().looping
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().volume = volume;
    }

    fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    fn set_muted(&self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.state.lock().muted
    }
}

// ============================================================================
// Blobs and saves
// ============================================================================

#[derive(Default)]
pub struct FakeBlobs {
    live: Mutex<HashMap<BlobUrl, Bytes>>,
    created: Mutex<usize>,
}

impl FakeBlobs {
    pub fn created(&self) -> usize {
        *self.created.lock()
    }
}

impl BlobStore for FakeBlobs {
    fn create_url(&self, data: Bytes) -> BlobUrl {
        let url = BlobUrl::generate();
        *self.created.lock() += 1;
        self.live.lock().insert(url.clone(), data);
        url
    }

    fn revoke_url(&self, url: &BlobUrl) -> bool {
        self.live.lock().remove(url).is_some()
    }

    fn resolve(&self, url: &BlobUrl) -> Option<Bytes> {
        self.live.lock().get(url).cloned()
    }

    fn live_count(&self) -> usize {
        self.live.lock().len()
    }
}

#[derive(Default)]
pub struct FakeSaves {
    pub saved: Mutex<Vec<(String, Bytes)>>,
    pub fail: Mutex<bool>,
}

#[async_trait]
impl SaveTarget for FakeSaves {
    async fn save(&self, request: SaveRequest) -> BridgeResult<()> {
        if *self.fail.lock() {
            return Err(BridgeError::NotAvailable("disk full".to_string()));
        }
        self.saved.lock().push((request.file_name, request.data));
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub http: Arc<FakeHttp>,
    pub output: Arc<FakeOutput>,
    pub blobs: Arc<FakeBlobs>,
    pub saves: Arc<FakeSaves>,
    pub catalog: Arc<CatalogStore>,
    pub cache: Arc<PlaybackCache>,
    pub events: EventBus,
    pub status: StatusBoard,
    pub materializer: Arc<SongMaterializer>,
    pub player: Player,
    pub downloader: Downloader,
}

impl Harness {
    pub fn new(catalog: Vec<Song>) -> Self {
        let http = Arc::new(FakeHttp::new());
        let output = Arc::new(FakeOutput::new());
        let blobs = Arc::new(FakeBlobs::default());
        let saves = Arc::new(FakeSaves::default());

        let catalog = Arc::new(CatalogStore::with_songs(catalog));
        let cache = Arc::new(PlaybackCache::new(CacheConfig::default()));
        let events = EventBus::new(256);
        let status = StatusBoard::new(events.clone(), Duration::from_secs(5));

        let api = CatalogApi::new(http.clone(), BASE);
        let materializer = Arc::new(SongMaterializer::new(api, cache.clone(), status.clone()));

        let player = Player::new(
            catalog.clone(),
            materializer.clone(),
            output.clone(),
            blobs.clone(),
            status.clone(),
            events.clone(),
            PlayerSettings::default(),
        );
        let downloader = Downloader::new(
            materializer.clone(),
            blobs.clone(),
            saves.clone(),
            status.clone(),
            DownloadSettings::default(),
        );

        Self {
            http,
            output,
            blobs,
            saves,
            catalog,
            cache,
            events,
            status,
            materializer,
            player,
            downloader,
        }
    }

    pub fn stream_url(id: &str) -> String {
        format!("{}/stream/{}", BASE, id)
    }
}
