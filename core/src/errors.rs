use thiserror::Error;

/// Persistence related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Unsupported snapshot version: {found:?}, expected {expected}")]
    UnsupportedVersion { found: Option<String>, expected: String },

    #[error("Database error: {details}")]
    Database { details: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn database(details: impl Into<String>) -> Self {
        StorageError::Database { details: details.into() }
    }
}

/// General system errors
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Configuration error: {details}")]
    Configuration { details: String },

    #[error("IO error: {source}")]
    IO {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Main error type for the bookmark hub
#[derive(Debug, Error)]
pub enum BookmarkHubError {
    #[error("Storage failed: {source}")]
    Storage {
        #[from]
        source: StorageError,
    },

    #[error("System error: {source}")]
    System {
        #[from]
        source: SystemError,
    },
}

impl BookmarkHubError {
    /// True when the failure came from the persistence layer
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, BookmarkHubError::Storage { .. })
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BookmarkHubError>;
