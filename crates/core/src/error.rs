#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    /// A required field was blank when an action needed it.
    #[error("{message}")]
    MissingField {
        field: &'static str,
        message: &'static str,
    },

    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Permission required: {0}")]
    PermissionDenied(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Message reported by an external provider, kept verbatim.
    #[error("{0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
