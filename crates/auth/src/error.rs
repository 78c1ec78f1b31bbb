use trafficeye_core::error::CoreError;

use crate::storage::StorageError;

/// Errors surfaced by the auth gateway.
///
/// `Display` is what the user sees: provider messages pass through
/// verbatim.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid credential")]
    InvalidCredential,

    /// Error returned by the identity service, message kept verbatim.
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Network request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Profile not found")]
    ProfileNotFound { user_id: String },
}

impl AuthError {
    /// Whether the caller's input was rejected before reaching the service.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AuthError::Core(CoreError::Validation(_) | CoreError::MissingField { .. })
        )
    }
}
