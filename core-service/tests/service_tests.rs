//! End-to-end service tests against a mock catalog backend.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bridge_desktop::{DirectorySaveTarget, InMemoryBlobStore, ReqwestHttpClient};
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::{AudioOutput, BlobStore, PlayableSource, PreloadHint, ReadyState};
    use bytes::Bytes;
    use core_service::{
        ClientConfig, CoreEvent, PlayOutcome, PlaylistId, ServiceError, SongId, StatusKind,
        StatusSlot, SurrService, TransportState,
    };
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ========================================================================
    // Fixtures
    // ========================================================================

    #[derive(Default)]
    struct Device {
        source: Mutex<Option<PlayableSource>>,
        paused: Mutex<bool>,
        time: Mutex<f64>,
        looping: Mutex<bool>,
        volume: Mutex<f64>,
        muted: Mutex<bool>,
    }

    #[async_trait]
    impl AudioOutput for Device {
        fn set_source(&self, source: PlayableSource, _preload: PreloadHint) {
            *self.source.lock() = Some(source);
            *self.time.lock() = 0.0;
        }

        fn source(&self) -> Option<PlayableSource> {
            self.source.lock().clone()
        }

        async fn play(&self) -> BridgeResult<()> {
            if self.source.lock().is_none() {
                return Err(BridgeError::Rejected("no source".to_string()));
            }
            *self.paused.lock() = false;
            Ok(())
        }

        fn pause(&self) {
            *self.paused.lock() = true;
        }

        fn is_paused(&self) -> bool {
            *self.paused.lock()
        }

        fn current_time(&self) -> f64 {
            *self.time.lock()
        }

        fn set_current_time(&self, seconds: f64) {
            *self.time.lock() = seconds;
        }

        fn duration(&self) -> f64 {
            f64::NAN
        }

        fn ready_state(&self) -> ReadyState {
            ReadyState::HaveNothing
        }

        fn set_looping(&self, looping: bool) {
            *self.looping.lock() = looping;
        }

        fn is_looping(&self) -> bool {
            *self.looping.lock()
        }

        fn set_volume(&self, volume: f64) {
            *self.volume.lock() = volume;
        }

        fn volume(&self) -> f64 {
            *self.volume.lock()
        }

        fn set_muted(&self, muted: bool) {
            *self.muted.lock() = muted;
        }

        fn is_muted(&self) -> bool {
            *self.muted.lock()
        }
    }

    struct Session {
        server: MockServer,
        service: SurrService,
        device: Arc<Device>,
        blobs: Arc<InMemoryBlobStore>,
        downloads: TempDir,
    }

    fn catalog_json() -> serde_json::Value {
        json!([
            {"id": "1", "title": "A", "artist": "X", "album": "L", "duration": 120},
            {"id": "2", "title": "B", "artist": "Y", "album": "M", "duration": 95.5},
            {"id": "3", "title": "C", "artist": "Z", "album": "N"}
        ])
    }

    fn playlists_json() -> serde_json::Value {
        json!([{"id": "p1", "name": "Evening", "songs": ["3", "1"]}])
    }

    async fn session() -> Session {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/playlist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(playlists_json()))
            .mount(&server)
            .await;

        let device = Arc::new(Device::default());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let downloads = TempDir::new().unwrap();

        let config = ClientConfig::builder()
            .api_base_url(server.uri())
            .http_client(Arc::new(ReqwestHttpClient::new().unwrap()))
            .audio_output(device.clone())
            .blob_store(blobs.clone())
            .save_target(Arc::new(DirectorySaveTarget::with_directory(
                downloads.path(),
            )))
            .build()
            .unwrap();

        let service = SurrService::new(config).unwrap();
        Session {
            server,
            service,
            device,
            blobs,
            downloads,
        }
    }

    async fn mount_stream(server: &MockServer, id: &str, body: &'static [u8]) {
        Mock::given(method("GET"))
            .and(path(format!("/stream/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(server)
            .await;
    }

    async fn stream_requests(server: &MockServer, id: &str) -> usize {
        let target = format!("/stream/{}", id);
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == target)
            .count()
    }

    fn status_text(service: &SurrService, slot: StatusSlot) -> Option<(String, StatusKind)> {
        service.status(slot).map(|m| (m.text, m.kind))
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    #[tokio::test]
    async fn test_refresh_loads_catalog() {
        let s = session().await;
        let mut events = s.service.subscribe();

        s.service.refresh().await.unwrap();

        assert_eq!(s.service.songs().len(), 3);
        assert_eq!(s.service.playlists().len(), 1);
        assert_eq!(s.service.search("b").len(), 3);
        assert!(s.service.search("nothing like it").is_empty());

        let mut loaded = 0;
        while let Some(Ok(event)) = events.try_recv() {
            if matches!(event, CoreEvent::Catalog(_)) {
                loaded += 1;
            }
        }
        assert_eq!(loaded, 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_catalog() {
        let s = session().await;
        s.service.refresh().await.unwrap();

        s.server.reset().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&s.server)
            .await;

        let err = s.service.refresh_songs().await.unwrap_err();
        assert!(matches!(err, ServiceError::Catalog(_)));
        assert_eq!(s.service.songs().len(), 3);
    }

    #[tokio::test]
    async fn test_view_playlist_scopes_next() {
        let s = session().await;
        s.service.refresh().await.unwrap();
        mount_stream(&s.server, "1", b"one").await;
        mount_stream(&s.server, "3", b"three").await;

        let songs = s.service.view_playlist(&PlaylistId::from("p1")).unwrap();
        let titles: Vec<_> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);

        let player = s.service.player();
        player.play(&SongId::from("3")).await;
        player.skip_next().await;
        assert_eq!(player.now_playing().unwrap().title, "A");
        player.skip_next().await;
        assert_eq!(player.now_playing().unwrap().title, "C");

        assert!(s.service.view_playlist(&PlaylistId::from("nope")).is_none());
    }

    #[tokio::test]
    async fn test_create_playlist() {
        let s = session().await;
        Mock::given(method("POST"))
            .and(path("/playlist"))
            .and(body_json(json!({"name": "Focus"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": "p2", "name": "Focus"})),
            )
            .expect(1)
            .mount(&s.server)
            .await;

        let playlist = s.service.create_playlist("  Focus  ").await.unwrap();

        assert_eq!(playlist.id, PlaylistId::from("p2"));
        assert_eq!(
            status_text(&s.service, StatusSlot::Playlist),
            Some(("Created: Focus".to_string(), StatusKind::Success))
        );
        // Playlists were refreshed after creation.
        assert_eq!(s.service.playlists().len(), 1);
    }

    #[tokio::test]
    async fn test_create_playlist_requires_name() {
        let s = session().await;

        let err = s.service.create_playlist("   ").await.unwrap_err();

        assert!(matches!(err, ServiceError::Catalog(_)));
        assert_eq!(
            status_text(&s.service, StatusSlot::Playlist),
            Some(("Playlist name required".to_string(), StatusKind::Error))
        );
        let requests = s.server.received_requests().await.unwrap_or_default();
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn test_create_playlist_server_message() {
        let s = session().await;
        Mock::given(method("POST"))
            .and(path("/playlist"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Name already taken"})),
            )
            .mount(&s.server)
            .await;

        s.service.create_playlist("Evening").await.unwrap_err();

        assert_eq!(
            status_text(&s.service, StatusSlot::Playlist),
            Some(("Name already taken".to_string(), StatusKind::Error))
        );
    }

    #[tokio::test]
    async fn test_add_song_to_playlist() {
        let s = session().await;
        s.service.refresh().await.unwrap();
        Mock::given(method("POST"))
            .and(path("/playlist/p1/songs"))
            .and(body_json(json!({"songId": "2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&s.server)
            .await;

        let added = s
            .service
            .add_song_to_playlist(&SongId::from("2"), &PlaylistId::from("p1"))
            .await
            .unwrap();

        assert!(added);
        assert_eq!(
            status_text(&s.service, StatusSlot::AddToPlaylist),
            Some(("Added B to playlist!".to_string(), StatusKind::Success))
        );
    }

    #[tokio::test]
    async fn test_add_unknown_song_is_silent() {
        let s = session().await;
        s.service.refresh().await.unwrap();

        let added = s
            .service
            .add_song_to_playlist(&SongId::from("99"), &PlaylistId::from("p1"))
            .await
            .unwrap();

        assert!(!added);
        assert!(s.service.status(StatusSlot::AddToPlaylist).is_none());
    }

    #[tokio::test]
    async fn test_add_song_generic_failure() {
        let s = session().await;
        s.service.refresh().await.unwrap();
        Mock::given(method("POST"))
            .and(path("/playlist/p1/songs"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
            .mount(&s.server)
            .await;

        s.service
            .add_song_to_playlist(&SongId::from("2"), &PlaylistId::from("p1"))
            .await
            .unwrap_err();

        assert_eq!(
            status_text(&s.service, StatusSlot::AddToPlaylist),
            Some(("Failed to add song.".to_string(), StatusKind::Error))
        );
    }

    #[tokio::test]
    async fn test_upload_song() {
        let s = session().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"id": "4", "title": "D", "artist": "W", "album": "O", "duration": 30}),
            ))
            .expect(1)
            .mount(&s.server)
            .await;

        let song = s
            .service
            .upload_song("d.mp3", Some("audio/mpeg"), Bytes::from_static(b"ID3"))
            .await
            .unwrap();

        assert_eq!(song.id, SongId::from("4"));
        assert_eq!(
            status_text(&s.service, StatusSlot::Upload),
            Some(("Successfully uploaded: D by W".to_string(), StatusKind::Success))
        );
        // The song list was refreshed from the server.
        assert_eq!(s.service.songs().len(), 3);
    }

    #[tokio::test]
    async fn test_uploaded_song_reachable_by_next() {
        let s = session().await;
        s.service.refresh().await.unwrap();
        mount_stream(&s.server, "3", b"sea").await;
        s.service.player().play(&SongId::from("3")).await;
        assert_eq!(s.service.player().queue().len(), 3);

        // The backend now lists the uploaded song.
        s.server.reset().await;
        let mut songs = catalog_json();
        songs
            .as_array_mut()
            .unwrap()
            .push(json!({"id": "4", "title": "D", "artist": "W", "album": "O", "duration": 30}));
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(songs))
            .mount(&s.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"id": "4", "title": "D", "artist": "W", "album": "O", "duration": 30}),
            ))
            .mount(&s.server)
            .await;
        mount_stream(&s.server, "4", b"dee").await;

        s.service
            .upload_song("d.mp3", Some("audio/mpeg"), Bytes::from_static(b"ID3"))
            .await
            .unwrap();
        assert_eq!(s.service.songs().len(), 4);

        let player = s.service.player();
        player.play(&SongId::from("3")).await;
        let outcome = player.skip_next().await;

        assert!(matches!(
            outcome,
            PlayOutcome::Started { ref song_id, .. } if song_id == &SongId::from("4")
        ));
        assert_eq!(player.now_playing().map(|s| s.title).as_deref(), Some("D"));
    }

    #[tokio::test]
    async fn test_upload_requires_file() {
        let s = session().await;

        s.service
            .upload_song("d.mp3", None, Bytes::new())
            .await
            .unwrap_err();

        assert_eq!(
            status_text(&s.service, StatusSlot::Upload),
            Some(("No file selected".to_string(), StatusKind::Error))
        );
    }

    #[tokio::test]
    async fn test_upload_server_failure_without_message() {
        let s = session().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(500).set_body_string("crash"))
            .mount(&s.server)
            .await;

        s.service
            .upload_song("d.mp3", None, Bytes::from_static(b"ID3"))
            .await
            .unwrap_err();

        assert_eq!(
            status_text(&s.service, StatusSlot::Upload),
            Some((
                "Upload failed due to a server error.".to_string(),
                StatusKind::Error
            ))
        );
    }

    // ========================================================================
    // Playback and downloads
    // ========================================================================

    #[tokio::test]
    async fn test_play_fetches_once_and_plays_blob() {
        let s = session().await;
        s.service.refresh().await.unwrap();
        mount_stream(&s.server, "2", b"bee").await;

        let player = s.service.player();
        let outcome = player.play(&SongId::from("2")).await;
        assert!(matches!(outcome, PlayOutcome::Started { .. }));
        assert_eq!(player.transport_state(), TransportState::Playing);

        let source = s.device.source().unwrap();
        let url = source.blob_url().unwrap();
        assert_eq!(s.blobs.resolve(url), Some(Bytes::from_static(b"bee")));

        player.play(&SongId::from("2")).await;
        assert_eq!(stream_requests(&s.server, "2").await, 1);
        assert_eq!(s.blobs.live_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_stream_falls_back_to_url() {
        let s = session().await;
        s.service.refresh().await.unwrap();
        Mock::given(method("GET"))
            .and(path("/stream/3"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "gone"})))
            .mount(&s.server)
            .await;

        s.service.player().play(&SongId::from("3")).await;

        assert_eq!(
            s.device.source(),
            Some(PlayableSource::Stream(format!("{}/stream/3", s.server.uri())))
        );
        assert!(!s.service.cache().has(&SongId::from("3")));
    }

    #[tokio::test]
    async fn test_default_volume_applied() {
        let s = session().await;
        assert_eq!(s.device.volume(), 0.7);
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let s = session().await;
        s.service.refresh().await.unwrap();
        mount_stream(&s.server, "2", b"bee").await;

        let file_name = s
            .service
            .download(&SongId::from("2"), "B")
            .await
            .unwrap();

        assert_eq!(file_name, "B_-_Surr.mp3");
        let written = std::fs::read(s.downloads.path().join(&file_name)).unwrap();
        assert_eq!(written, b"bee");
        assert!(s.service.cache().has(&SongId::from("2")));
        assert_eq!(s.blobs.live_count(), 0);
        assert!(s.service.player().now_playing().is_none());

        // Playing afterwards reuses the downloaded payload.
        s.service.player().play(&SongId::from("2")).await;
        assert_eq!(stream_requests(&s.server, "2").await, 1);
    }
}
