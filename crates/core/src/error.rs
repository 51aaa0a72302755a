//! Shared error type for Playrank crates

use thiserror::Error;

/// Errors raised by the shared infrastructure layer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A configuration value was missing, unparseable or out of range
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        /// Environment variable (or field) that caused the failure
        key: Option<String>,
    },
}

impl CoreError {
    /// Build a configuration error tied to a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Key associated with the error, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::ConfigurationError { key, .. } => key.as_deref(),
        }
    }
}
