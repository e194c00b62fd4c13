/// Unified error handler for centralized error management

use bookmark_hub_core::{BookmarkHubError, StorageError, SystemError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, warn};

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Stored data may be unreadable
    Critical,
    /// An operation failed and nothing was changed
    Error,
    /// Input was rejected
    Warning,
}

/// Error entry for tracking
#[derive(Debug, Clone)]
pub struct ErrorEntry {
    pub error: String,
    pub severity: ErrorSeverity,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub context: String,
}

/// Unified error handler
pub struct UnifiedErrorHandler {
    /// Recent errors for reporting
    recent_errors: Arc<RwLock<Vec<ErrorEntry>>>,
    /// Maximum number of errors to keep
    max_errors: usize,
}

impl UnifiedErrorHandler {
    /// Create a new error handler
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Create a handler keeping at most `max_errors` entries
    pub fn with_capacity(max_errors: usize) -> Self {
        Self {
            recent_errors: Arc::new(RwLock::new(Vec::new())),
            max_errors,
        }
    }

    /// Handle an error with automatic logging
    pub async fn handle_error(&self, error: &BookmarkHubError, context: &str) -> ErrorSeverity {
        let severity = Self::classify_error(error);

        match severity {
            ErrorSeverity::Critical => error!("CRITICAL ERROR in {}: {}", context, error),
            ErrorSeverity::Error => error!("ERROR in {}: {}", context, error),
            ErrorSeverity::Warning => warn!("WARNING in {}: {}", context, error),
        }

        let entry = ErrorEntry {
            error: error.to_string(),
            severity,
            timestamp: chrono::Utc::now(),
            context: context.to_string(),
        };

        self.add_error_entry(entry).await;
        severity
    }

    /// Classify error severity
    pub fn classify_error(error: &BookmarkHubError) -> ErrorSeverity {
        match error {
            BookmarkHubError::Storage { source } => match source {
                StorageError::InvalidRecord { .. } | StorageError::UnsupportedVersion { .. } => {
                    ErrorSeverity::Warning
                }
                StorageError::Serialization { .. } => ErrorSeverity::Error,
                StorageError::Database { .. } => ErrorSeverity::Critical,
            },
            BookmarkHubError::System { source } => match source {
                SystemError::Configuration { .. } => ErrorSeverity::Critical,
                SystemError::IO { .. } | SystemError::Serialization { .. } => ErrorSeverity::Error,
            },
        }
    }

    /// Add an error entry to the history
    async fn add_error_entry(&self, entry: ErrorEntry) {
        let mut errors = self.recent_errors.write().await;
        errors.push(entry);

        // Keep only recent errors
        if errors.len() > self.max_errors {
            let excess = errors.len() - self.max_errors;
            errors.drain(0..excess);
        }
    }

    /// Get recent errors
    pub async fn get_recent_errors(&self) -> Vec<ErrorEntry> {
        self.recent_errors.read().await.clone()
    }

    /// Get error statistics
    pub async fn get_error_stats(&self) -> ErrorStatistics {
        let errors = self.recent_errors.read().await;

        let mut stats = ErrorStatistics {
            total: errors.len(),
            ..ErrorStatistics::default()
        };

        for error in errors.iter() {
            match error.severity {
                ErrorSeverity::Critical => stats.critical += 1,
                ErrorSeverity::Error => stats.errors += 1,
                ErrorSeverity::Warning => stats.warnings += 1,
            }
        }

        stats
    }

    /// Clear error history
    pub async fn clear_errors(&self) {
        self.recent_errors.write().await.clear();
    }
}

impl Default for UnifiedErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Error statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorStatistics {
    pub total: usize,
    pub critical: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_record() -> BookmarkHubError {
        StorageError::InvalidRecord {
            index: 0,
            reason: "bookmark url is empty".to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_error_handler_creation() {
        let handler = UnifiedErrorHandler::new();
        let stats = handler.get_error_stats().await;
        assert_eq!(stats.total, 0);
    }

    #[tokio::test]
    async fn test_handle_error() {
        let handler = UnifiedErrorHandler::new();
        let severity = handler.handle_error(&invalid_record(), "import_markup").await;
        assert_eq!(severity, ErrorSeverity::Warning);

        let errors = handler.get_recent_errors().await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].context, "import_markup");
    }

    #[test]
    fn test_classification() {
        let database: BookmarkHubError = StorageError::database("locked").into();
        assert_eq!(UnifiedErrorHandler::classify_error(&database), ErrorSeverity::Critical);

        let io: BookmarkHubError = SystemError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).into();
        assert_eq!(UnifiedErrorHandler::classify_error(&io), ErrorSeverity::Error);
    }

    #[tokio::test]
    async fn test_stats_count_every_severity() {
        let handler = UnifiedErrorHandler::new();
        handler.handle_error(&invalid_record(), "import_markup").await;
        handler.handle_error(&StorageError::database("locked").into(), "collection").await;
        handler
            .handle_error(&SystemError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).into(), "import_file")
            .await;

        let stats = handler.get_error_stats().await;
        assert_eq!(
            stats,
            ErrorStatistics {
                total: 3,
                critical: 1,
                errors: 1,
                warnings: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let handler = UnifiedErrorHandler::with_capacity(3);
        for _ in 0..5 {
            handler.handle_error(&invalid_record(), "restore_snapshot").await;
        }

        let stats = handler.get_error_stats().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.warnings, 3);

        handler.clear_errors().await;
        assert!(handler.get_recent_errors().await.is_empty());
    }
}
