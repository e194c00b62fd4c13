/// Unified logger for centralized logging configuration

use bookmark_hub_core::SystemError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Include thread IDs
    pub include_thread_ids: bool,

    /// Include target module paths
    pub include_targets: bool,

    /// Colored output
    pub ansi: bool,
}

impl LoggerConfig {
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            include_thread_ids: false,
            include_targets: true,
            ansi: true,
        }
    }
}

/// Unified logger
pub struct UnifiedLogger;

impl UnifiedLogger {
    /// Build the filter: `RUST_LOG` wins over the configured level
    pub fn filter(config: &LoggerConfig) -> Result<EnvFilter, SystemError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .map_err(|e| SystemError::Configuration {
                details: format!("Invalid log level '{}': {}", config.level, e),
            })
    }

    /// Initialize the global logger
    ///
    /// Fails when the level is invalid or a global subscriber is already set.
    pub fn init(config: LoggerConfig) -> Result<(), SystemError> {
        let filter = Self::filter(&config)?;

        let console_layer = fmt::layer()
            .with_target(config.include_targets)
            .with_thread_ids(config.include_thread_ids)
            .with_ansi(config.ansi);

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .try_init()
            .map_err(|e| SystemError::Configuration {
                details: format!("Failed to install logger: {}", e),
            })?;

        tracing::info!("Logging initialized with level: {}", config.level);
        Ok(())
    }

    /// Initialize with default configuration
    pub fn init_default() -> Result<(), SystemError> {
        Self::init(LoggerConfig::default())
    }
}
