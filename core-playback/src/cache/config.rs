//! Cache configuration and policies

/// Configuration for the in-memory playback cache.
///
/// The cache keeps every payload by default. Setting a byte budget turns on
/// least-recently-used eviction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum bytes of audio held at once (default: unlimited)
    pub max_bytes: Option<usize>,
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the byte budget and enable LRU eviction.
    pub fn with_max_bytes(mut self, bytes: usize) -> Self {
        self.max_bytes = Some(bytes);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_bytes.is_some()
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_bytes == Some(0) {
            return Err("max_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}
