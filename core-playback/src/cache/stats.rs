//! Cache statistics and monitoring

use serde::{Deserialize, Serialize};

/// Statistics about the playback cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of songs in cache
    pub entries: usize,

    /// Total bytes of audio held
    pub total_bytes: usize,

    /// Lookups that found a payload
    pub hits: u64,

    /// Lookups that found nothing
    pub misses: u64,

    /// Entries dropped to stay within the byte budget
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate cache usage as a percentage of max size.
    pub fn usage_percentage(&self, max_size: usize) -> f64 {
        if max_size == 0 {
            return 0.0;
        }

        (self.total_bytes as f64 / max_size as f64) * 100.0
    }

    /// Returns true if the cache is near capacity (>90%).
    pub fn is_near_capacity(&self, max_size: usize) -> bool {
        self.usage_percentage(max_size) > 90.0
    }

    /// Returns average bytes per song.
    pub fn average_entry_size(&self) -> usize {
        if self.entries == 0 {
            0
        } else {
            self.total_bytes / self.entries
        }
    }

    /// Returns hit rate percentage (hits / lookups).
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }

        (self.hits as f64 / lookups as f64) * 100.0
    }

    /// Human-readable size of the cached audio.
    pub fn size_string(&self) -> String {
        format_bytes(self.total_bytes)
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
