//! Error types for Chat Markdown
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category for clear error handling and user-friendly messages.
//!
//! The public render functions never return errors: malformed markdown and
//! unsafe content degrade to safer output instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// Markdown toggle errors
    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rendering errors
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Generic I/O error (reading input, writing output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the markdown toggle engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkdownError {
    /// The requested markdown mode is not one of the supported toggles.
    ///
    /// This is a caller bug and is never recovered internally.
    #[error("Unsupported markdown mode: {0}")]
    UnsupportedMode(String),

    /// Selection bounds do not fit the text
    #[error("Invalid selection range: {start} to {end} (text length {len})")]
    InvalidSelection { start: usize, end: usize, len: usize },
}

/// Errors raised while walking a parsed message.
///
/// The public render functions turn these into fixed fallback text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Containers nest deeper than the walker allows
    #[error("Message nested more than {limit} levels deep")]
    TooDeeplyNested { limit: usize },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {path}")]
    LoadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error saving configuration
    #[error("Could not save configuration: {path}")]
    SaveError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for markdown toggle operations
pub type MarkdownResult<T> = Result<T, MarkdownError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl MarkdownError {
    /// Create a user-friendly error message suitable for a status line
    pub fn user_message(&self) -> String {
        match self {
            MarkdownError::UnsupportedMode(mode) => {
                format!("The formatting shortcut \"{}\" is not available.", mode)
            }
            MarkdownError::InvalidSelection { .. } => {
                "The current selection could not be formatted.".to_string()
            }
        }
    }
}

impl ConfigError {
    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::LoadError { .. } | ConfigError::ParseError(_) => {
                "Could not read the settings file. Default settings will be used.".to_string()
            }
            ConfigError::SaveError { .. } => {
                "Could not save settings. Check disk space and permissions.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_mode_display() {
        let err = MarkdownError::UnsupportedMode("underline".to_string());
        assert_eq!(err.to_string(), "Unsupported markdown mode: underline");
    }

    #[test]
    fn test_markdown_error_user_message() {
        let err = MarkdownError::UnsupportedMode("underline".to_string());
        assert!(err.user_message().contains("underline"));
    }

    #[test]
    fn test_app_error_from_markdown_error() {
        let err: AppError = MarkdownError::UnsupportedMode("x".to_string()).into();
        assert!(matches!(err, AppError::Markdown(_)));
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.user_message().contains("Default settings"));
    }
}
