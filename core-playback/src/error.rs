//! # Playback Error Types
//!
//! Failures of materialization, playback and download.

use core_catalog::CatalogError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Song id is not in the catalog.
    #[error("Song not found: {0}")]
    NotFound(String),

    /// The stream fetch failed in transport or returned an unreadable body.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The stream endpoint answered with a non-success status.
    #[error("Server returned status {status}")]
    ServerError {
        status: u16,
        message: Option<String>,
    },

    // ========================================================================
    // Output Errors
    // ========================================================================
    /// The audio output refused to start the assigned source.
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// The host could not save a download.
    #[error("Save failed: {0}")]
    SaveFailed(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        matches!(self, PlaybackError::NetworkFailure(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PlaybackError::NotFound(_))
    }

    /// Returns `true` if re-triggering the action may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PlaybackError::NetworkFailure(_) => true,
            PlaybackError::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<CatalogError> for PlaybackError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound { id, .. } => PlaybackError::NotFound(id),
            CatalogError::NetworkFailure(message) | CatalogError::InvalidResponse(message) => {
                PlaybackError::NetworkFailure(message)
            }
            CatalogError::ServerError { status, message } => {
                PlaybackError::ServerError { status, message }
            }
            CatalogError::Validation(message) => PlaybackError::Internal(message),
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
