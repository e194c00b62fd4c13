/// Integration layer for the bookmark hub
///
/// Wires the importer to persistent storage: configuration loading, logging
/// setup, centralized error handling and the "import more bookmarks" flow.

use bookmark_hub_core::errors::{Result, SystemError};
use bookmark_importer::{BookmarkImporter, ImportConfig};
use data_access::DatabaseManager;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub mod application;
pub mod error_handler;
pub mod logger;

pub use application::{Application, CategoryStat, CollectionStats, ImportReport};
pub use error_handler::{ErrorEntry, ErrorSeverity, ErrorStatistics, UnifiedErrorHandler};
pub use logger::{LoggerConfig, UnifiedLogger};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database path; in-memory when absent
    pub database_path: Option<PathBuf>,

    /// Log level
    pub log_level: String,

    /// Importer settings
    pub import: ImportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".to_string(),
            import: ImportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(SystemError::from)?;
        let config = serde_json::from_str(&raw).map_err(SystemError::from)?;
        Ok(config)
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig::with_level(self.log_level.clone())
    }
}

/// Application context that holds all initialized components
pub struct AppContext {
    /// Database manager for data persistence
    pub database: Arc<DatabaseManager>,

    /// Bookmark export importer
    pub importer: Arc<BookmarkImporter>,

    /// Unified error handler
    pub error_handler: Arc<UnifiedErrorHandler>,

    /// Application configuration
    pub config: Arc<RwLock<AppConfig>>,
}

impl AppContext {
    /// Create a new application context with all components initialized
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing application context");

        let database = match &config.database_path {
            Some(path) => Arc::new(DatabaseManager::new(path).await?),
            None => Arc::new(DatabaseManager::in_memory().await?),
        };
        info!("Database initialized");

        let importer = Arc::new(BookmarkImporter::with_config(config.import.clone()));
        let error_handler = Arc::new(UnifiedErrorHandler::new());
        let config = Arc::new(RwLock::new(config));

        info!("Application context initialized successfully");

        Ok(Self {
            database,
            importer,
            error_handler,
            config,
        })
    }

    /// Shutdown all components gracefully
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down application context");

        let stats = self.error_handler.get_error_stats().await;
        if stats.total > 0 {
            info!(
                "Session errors: {} critical, {} errors, {} warnings",
                stats.critical, stats.errors, stats.warnings
            );
        }

        info!("Application context shutdown complete");
        Ok(())
    }
}
