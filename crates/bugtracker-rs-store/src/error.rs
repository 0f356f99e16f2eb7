//! Error types for store operations.

/// Errors returned by record stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with the given id.
    #[error("bug not found: {0}")]
    NotFound(String),
    /// The id is not a 24-character hex identifier.
    #[error("invalid bug id: {0}")]
    InvalidId(String),
    /// Database driver error.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    /// A stored document could not be converted to a record.
    #[error("serialization error: {0}")]
    Serialization(String),
}
