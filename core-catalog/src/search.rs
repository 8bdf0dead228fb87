//! In-memory song search

use crate::models::Song;

/// Queries shorter than this (after trimming) match everything.
pub const MIN_QUERY_LEN: usize = 2;

/// Case-insensitive substring match over title, artist and album.
///
/// Catalog order is preserved. A query shorter than [`MIN_QUERY_LEN`]
/// characters returns every song.
pub fn search_songs<'a>(songs: &'a [Song], query: &str) -> Vec<&'a Song> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return songs.iter().collect();
    }

    let needle = query.to_lowercase();
    songs
        .iter()
        .filter(|song| {
            song.title.to_lowercase().contains(&needle)
                || song.artist.to_lowercase().contains(&needle)
                || song.album.to_lowercase().contains(&needle)
        })
        .collect()
}
