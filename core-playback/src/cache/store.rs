//! In-memory song payload cache

use bytes::Bytes;
use chrono::{DateTime, Utc};
use core_catalog::SongId;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::config::CacheConfig;
use super::stats::CacheStats;

/// A fully downloaded song.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub title: String,
    pub payload: Bytes,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

struct CacheState {
    entries: LruCache<SongId, CacheEntry>,
    total_bytes: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Maps song ids to full audio payloads for the lifetime of the session.
///
/// At most one entry exists per id and a stored entry is never replaced.
/// Without a byte budget nothing is ever evicted. With one, the least
/// recently used entries are dropped until the total fits again; the entry
/// just stored is always kept.
pub struct PlaybackCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl PlaybackCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                total_bytes: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a payload and mark it recently used.
    pub fn get(&self, song_id: &SongId) -> Option<CacheEntry> {
        let mut state = self.state.lock();
        match state.entries.get(song_id).cloned() {
            Some(entry) => {
                state.hits += 1;
                Some(entry)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Look up a payload without touching recency or hit counters.
    pub fn peek(&self, song_id: &SongId) -> Option<CacheEntry> {
        self.state.lock().entries.peek(song_id).cloned()
    }

    pub fn has(&self, song_id: &SongId) -> bool {
        self.state.lock().entries.contains(song_id)
    }

    /// Store a payload. Returns `false` if the id was already cached, in
    /// which case the existing entry is left untouched.
    pub fn put(&self, song_id: SongId, title: impl Into<String>, payload: Bytes) -> bool {
        let mut state = self.state.lock();
        if state.entries.contains(&song_id) {
            return false;
        }

        let entry = CacheEntry {
            title: title.into(),
            payload,
            cached_at: Utc::now(),
        };
        let size = entry.size();
        debug!(song_id = %song_id, size, "Caching song payload");

        state.total_bytes += size;
        state.entries.put(song_id, entry);

        if let Some(max_bytes) = self.config.max_bytes {
            while state.total_bytes > max_bytes && state.entries.len() > 1 {
                match state.entries.pop_lru() {
                    Some((evicted_id, evicted)) => {
                        state.total_bytes -= evicted.size();
                        state.evictions += 1;
                        info!(
                            song_id = %evicted_id,
                            size = evicted.size(),
                            "Evicted song payload to stay within cache budget"
                        );
                    }
                    None => break,
                }
            }
        }

        true
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_bytes(&self) -> usize {
        self.state.lock().total_bytes
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            total_bytes: state.total_bytes,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
        }
    }
}

impl Default for PlaybackCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for PlaybackCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
