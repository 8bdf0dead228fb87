use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Catalog API and lookup failures.
///
/// `Clone` so a single fetch result can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Server returned status {status}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    ServerError {
        status: u16,
        /// The API's `{error}` message when it sent one
        message: Option<String>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl CatalogError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }

    /// Server-provided error text, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ServerError { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Transport failures from the HTTP bridge.
impl From<BridgeError> for CatalogError {
    fn from(error: BridgeError) -> Self {
        CatalogError::NetworkFailure(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
