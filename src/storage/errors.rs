//! # Storage Errors

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence faults. None of these are retried; they propagate to the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored value under '{key}' is malformed: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// HTTP status code the API layer reports for this fault
    pub fn status_code(&self) -> u16 {
        match self {
            StorageError::Unavailable(_) => 503,
            StorageError::Database(_) => 503,
            StorageError::Corrupt { .. } => 500,
            StorageError::Encode { .. } => 500,
        }
    }
}
