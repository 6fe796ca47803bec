//! CLI error types.

use std::fmt;

use entitymap::{ConfigError, EntityLoadError, LoggingError};

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, parsed, or saved.
    Config(String),

    /// The entity file could not be loaded.
    Entities(EntityLoadError),

    /// Logging could not be initialized.
    Logging(LoggingError),

    /// Arguments are inconsistent with the loaded data.
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Entities(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Entities(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Config(_) | CliError::Usage(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<EntityLoadError> for CliError {
    fn from(e: EntityLoadError) -> Self {
        CliError::Entities(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}
