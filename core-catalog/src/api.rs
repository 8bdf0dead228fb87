//! Catalog API client
//!
//! Typed access to the Surr backend over the host's `HttpClient`.

use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, MultipartPart};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{CatalogError, Result};
use crate::models::{AddSongBody, CreatePlaylistBody, ErrorBody, Playlist, PlaylistId, Song, SongId};

/// Timeout for JSON endpoints
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole-file transfers (stream download, upload with server-side processing)
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

/// Multipart field the upload endpoint reads the file from
const UPLOAD_FIELD: &str = "song";

/// Catalog API connector
///
/// One request per call; failures are returned to the caller, never retried.
///
/// # Example
///
/// ```ignore
/// use core_catalog::CatalogApi;
///
/// let api = CatalogApi::new(http_client, "https://surr-back.onrender.com");
/// let songs = api.fetch_songs().await?;
/// ```
#[derive(Clone)]
pub struct CatalogApi {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

impl CatalogApi {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Direct streaming URL for a song. The device can play it without a
    /// local copy, at the cost of unreliable seeking.
    pub fn stream_url(&self, song_id: &SongId) -> String {
        format!(
            "{}/stream/{}",
            self.base_url,
            urlencoding::encode(song_id.as_str())
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[instrument(skip(self))]
    pub async fn fetch_songs(&self) -> Result<Vec<Song>> {
        let response = self.send(HttpRequest::get(self.url("/songs"))).await?;
        let songs: Vec<Song> = parse_json(&response)?;
        info!(count = songs.len(), "Fetched songs");
        Ok(songs)
    }

    #[instrument(skip(self))]
    pub async fn fetch_playlists(&self) -> Result<Vec<Playlist>> {
        let response = self.send(HttpRequest::get(self.url("/playlist"))).await?;
        let playlists: Vec<Playlist> = parse_json(&response)?;
        info!(count = playlists.len(), "Fetched playlists");
        Ok(playlists)
    }

    /// Create a playlist. The name is trimmed and must not be empty.
    #[instrument(skip(self))]
    pub async fn create_playlist(&self, name: &str) -> Result<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "Playlist name required".to_string(),
            ));
        }

        let request = HttpRequest::post(self.url("/playlist")).json(&CreatePlaylistBody { name })?;
        let response = self.send(request).await?;
        let playlist: Playlist = parse_json(&response)?;

        info!(playlist_id = %playlist.id, name = %playlist.name, "Created playlist");
        Ok(playlist)
    }

    /// Append a song to a playlist. The acknowledgement body is ignored.
    #[instrument(skip(self))]
    pub async fn add_song_to_playlist(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
    ) -> Result<()> {
        let path = format!(
            "/playlist/{}/songs",
            urlencoding::encode(playlist_id.as_str())
        );
        let request = HttpRequest::post(self.url(&path)).json(&AddSongBody { song_id })?;
        self.send(request).await?;

        info!(playlist_id = %playlist_id, song_id = %song_id, "Added song to playlist");
        Ok(())
    }

    /// Upload an audio file. The server extracts tags and returns the new song.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn upload_song(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<Song> {
        if data.is_empty() {
            return Err(CatalogError::Validation("No file selected".to_string()));
        }

        let mut part = MultipartPart::new(UPLOAD_FIELD, data).file_name(file_name);
        if let Some(content_type) = content_type {
            part = part.content_type(content_type);
        }

        let request = HttpRequest::post(self.url("/upload"))
            .multipart(vec![part])
            .timeout(TRANSFER_TIMEOUT);
        let response = self.send(request).await?;
        let song: Song = parse_json(&response)?;

        info!(song_id = %song.id, title = %song.title, "Uploaded song");
        Ok(song)
    }

    /// Download a song's full audio payload.
    #[instrument(skip(self))]
    pub async fn fetch_stream(&self, song_id: &SongId) -> Result<Bytes> {
        let request = HttpRequest::get(self.stream_url(song_id)).timeout(TRANSFER_TIMEOUT);
        let response = self.send(request).await?;

        debug!(song_id = %song_id, size = response.body.len(), "Fetched audio payload");
        Ok(response.body)
    }

    /// Execute a request and turn a non-success status into `ServerError`.
    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        if request.timeout.is_none() {
            request = request.timeout(API_TIMEOUT);
        }
        let url = request.url.clone();

        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(url = %url, error = %e, "Catalog request failed");
            CatalogError::from(e)
        })?;

        if response.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|body| body.error)
            .filter(|message| !message.trim().is_empty());

        warn!(url = %url, status = response.status, error = ?message, "Catalog request rejected");
        Err(CatalogError::ServerError {
            status: response.status,
            message,
        })
    }
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body)
        .map_err(|e| CatalogError::InvalidResponse(format!("Unexpected response body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpBody, HttpMethod};
    use mockall::mock;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    const BASE: &str = "https://api.test";

    fn api(mock: MockHttpClient) -> CatalogApi {
        CatalogApi::new(Arc::new(mock), BASE)
    }

    #[tokio::test]
    async fn test_fetch_songs() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Get && req.url == "https://api.test/songs")
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"[{"id":"1","title":"A","artist":"X","album":"Y","duration":61}]"#,
                ))
            });

        let songs = api(mock).fetch_songs().await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "A");
    }

    #[tokio::test]
    async fn test_fetch_playlists_invalid_body() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "<html>oops</html>")));

        let err = api(mock).fetch_playlists().await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_create_playlist_trims_name() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| match &req.body {
                HttpBody::Bytes(body) => {
                    req.url == "https://api.test/playlist"
                        && serde_json::from_slice::<serde_json::Value>(body).unwrap()
                            == serde_json::json!({ "name": "Focus" })
                }
                _ => false,
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(201, r#"{"id":"p9","name":"Focus","songs":[]}"#)));

        let playlist = api(mock).create_playlist("  Focus ").await.unwrap();
        assert_eq!(playlist.id, PlaylistId::from("p9"));
    }

    #[tokio::test]
    async fn test_create_playlist_empty_name_skips_request() {
        let mock = MockHttpClient::new();
        let err = api(mock).create_playlist("   ").await.unwrap_err();
        assert_eq!(err, CatalogError::Validation("Playlist name required".to_string()));
    }

    #[tokio::test]
    async fn test_server_error_message_verbatim() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(409, r#"{"error":"Song already in playlist"}"#)));

        let err = api(mock)
            .add_song_to_playlist(&PlaylistId::from("p1"), &SongId::from("2"))
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Song already in playlist"));
    }

    #[tokio::test]
    async fn test_server_error_without_payload() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(500, "Internal Server Error")));

        let err = api(mock).fetch_songs().await.unwrap_err();
        assert_eq!(
            err,
            CatalogError::ServerError {
                status: 500,
                message: None
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("connection reset".into())));

        let err = api(mock).fetch_stream(&SongId::from("2")).await.unwrap_err();
        assert!(err.is_network_error());
    }

    #[tokio::test]
    async fn test_fetch_stream_returns_body() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| req.url == "https://api.test/stream/2" && req.timeout == Some(TRANSFER_TIMEOUT))
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Bytes::from_static(b"ID3audio"))));

        let bytes = api(mock).fetch_stream(&SongId::from("2")).await.unwrap();
        assert_eq!(&bytes[..], b"ID3audio");
    }

    #[test]
    fn test_ids_are_encoded_in_paths() {
        let api = api(MockHttpClient::new());
        assert_eq!(
            api.stream_url(&SongId::from("a/b?c#d")),
            "https://api.test/stream/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            api.stream_url(&SongId::from("65f1c0de")),
            "https://api.test/stream/65f1c0de"
        );
    }

    #[tokio::test]
    async fn test_add_song_encodes_playlist_id() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| req.url == "https://api.test/playlist/p%201/songs")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Bytes::from_static(b"{}"))));

        api(mock)
            .add_song_to_playlist(&PlaylistId::from("p 1"), &SongId::from("2"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_uses_song_field() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| match &req.body {
                HttpBody::Multipart(parts) => {
                    parts.len() == 1
                        && parts[0].name == "song"
                        && parts[0].file_name.as_deref() == Some("b.mp3")
                        && parts[0].content_type.as_deref() == Some("audio/mpeg")
                }
                _ => false,
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"id":"7","title":"B","artist":"X"}"#)));

        let song = api(mock)
            .upload_song("b.mp3", Some("audio/mpeg"), Bytes::from_static(b"data"))
            .await
            .unwrap();
        assert_eq!(song.id, SongId::from("7"));
    }

    #[tokio::test]
    async fn test_upload_empty_payload_rejected() {
        let mock = MockHttpClient::new();
        let err = api(mock)
            .upload_song("b.mp3", None, Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::Validation("No file selected".to_string()));
    }

    #[test]
    fn test_stream_url() {
        let api = CatalogApi::new(Arc::new(MockHttpClient::new()), "http://localhost:3000/");
        assert_eq!(api.stream_url(&SongId::from("2")), "http://localhost:3000/stream/2");
    }
}
