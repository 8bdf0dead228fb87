//! In-memory catalog snapshot.
//!
//! The store holds the last successful `GET /songs` and `GET /playlist`
//! results. Readers get cheap `Arc` snapshots; a refresh swaps the whole list
//! so a reader never observes a half-updated catalog.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::models::{Playlist, PlaylistId, Song, SongId};
use crate::search::search_songs;

#[derive(Debug, Default)]
pub struct CatalogStore {
    songs: RwLock<Arc<Vec<Song>>>,
    playlists: RwLock<Arc<Vec<Playlist>>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with songs, mostly for tests and offline demos.
    pub fn with_songs(songs: Vec<Song>) -> Self {
        let store = Self::new();
        store.replace_songs(songs);
        store
    }

    pub fn replace_songs(&self, songs: Vec<Song>) {
        debug!(count = songs.len(), "Replacing catalog songs");
        *self.songs.write() = Arc::new(songs);
    }

    pub fn replace_playlists(&self, playlists: Vec<Playlist>) {
        debug!(count = playlists.len(), "Replacing catalog playlists");
        *self.playlists.write() = Arc::new(playlists);
    }

    /// Snapshot of the full catalog in API order.
    pub fn songs(&self) -> Arc<Vec<Song>> {
        Arc::clone(&self.songs.read())
    }

    pub fn playlists(&self) -> Arc<Vec<Playlist>> {
        Arc::clone(&self.playlists.read())
    }

    pub fn song_count(&self) -> usize {
        self.songs.read().len()
    }

    pub fn find_song(&self, id: &SongId) -> Option<Song> {
        self.songs.read().iter().find(|song| &song.id == id).cloned()
    }

    pub fn find_playlist(&self, id: &PlaylistId) -> Option<Playlist> {
        self.playlists
            .read()
            .iter()
            .find(|playlist| &playlist.id == id)
            .cloned()
    }

    pub fn first_song(&self) -> Option<Song> {
        self.songs.read().first().cloned()
    }

    /// Resolve a playlist's song ids against the catalog.
    ///
    /// Ids missing from the catalog are skipped. Returns `None` for an
    /// unknown playlist.
    pub fn playlist_songs(&self, id: &PlaylistId) -> Option<Vec<Song>> {
        let playlist = self.find_playlist(id)?;
        let songs = self.songs();

        Some(
            playlist
                .songs
                .iter()
                .filter_map(|song_id| songs.iter().find(|song| &song.id == song_id).cloned())
                .collect(),
        )
    }

    pub fn search(&self, query: &str) -> Vec<Song> {
        let songs = self.songs();
        search_songs(&songs, query).into_iter().cloned().collect()
    }
}
