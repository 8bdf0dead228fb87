use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Client initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] core_catalog::CatalogError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),
}

impl ServiceError {
    /// Returns `true` if the failure came from the network or the server.
    pub fn is_network_error(&self) -> bool {
        match self {
            ServiceError::Catalog(err) => err.is_network_error(),
            ServiceError::Playback(err) => err.is_network_error(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
