//! Logging setup.
//!
//! Installs a global `tracing` subscriber: formatted output on stderr and,
//! when a log directory is configured, a plain-text log file written through a
//! non-blocking appender.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the configured
//! level (or `debug` in verbose mode).
//!
//! # Example
//!
//! ```ignore
//! let config = ConfigFile::load()?;
//! let _guard = logging::init_logging(&config.logging, false)?;
//! tracing::info!("ready");
//! ```

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Log file name inside the configured directory.
pub const LOG_FILE_NAME: &str = "entitymap.log";

/// Errors from installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("Failed to create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured level is not a valid filter directive.
    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),

    /// A global subscriber is already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Keeps the file writer alive; dropping it flushes pending log lines.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Filter directive for the given settings when `RUST_LOG` is unset.
pub fn default_directive(config: &LoggingConfig, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else {
        &config.level
    }
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<LoggingGuard, LoggingError> {
    let directive = default_directive(config, verbose);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive)
            .map_err(|_| LoggingError::InvalidFilter(directive.to_string()))?,
    };

    let (file_layer, file_guard) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::Directory {
                path: dir.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(LocalTime::rfc_3339()),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        directive,
        file = config.directory.is_some(),
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_uses_config_level() {
        let config = LoggingConfig {
            level: "entitymap=trace".to_string(),
            directory: None,
        };
        assert_eq!(default_directive(&config, false), "entitymap=trace");
    }

    #[test]
    fn test_verbose_overrides_level() {
        let config = LoggingConfig::default();
        assert_eq!(default_directive(&config, true), "debug");
    }
}
