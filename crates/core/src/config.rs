//! Shared configuration loading for Playrank crates
//!
//! Configuration is read from environment variables with the `PLAYRANK_` prefix.
//! Values fall back to typed defaults when unset, and every loader validates its
//! result before use.
//!
//! Override hierarchy: defaults < .env < environment
//!
//! # Example
//!
//! ```no_run
//! use playrank_core::config::{load_dotenv, parse_env_var};
//!
//! load_dotenv();
//! let epochs: usize = parse_env_var("PLAYRANK_EPOCHS", 20).unwrap();
//! assert!(epochs > 0);
//! ```

use crate::error::CoreError;

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// Missing optional variables fall back to the type's defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a variable is present but cannot be parsed.
    fn from_env() -> Result<Self, CoreError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any validation check fails.
    fn validate(&self) -> Result<(), CoreError>;
}

/// Parse an environment variable into `T`, returning `default` when unset
pub fn parse_env_var<T>(key: &str, default: T) -> Result<T, CoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| CoreError::config(format!("Failed to parse {}: {}", key, e), key))
        })
        .unwrap_or(Ok(default))
}

/// Parse a boolean flag, accepting `true`/`false`/`1`/`0`/`yes`/`no`
pub fn parse_bool_env(key: &str, default: bool) -> Result<bool, CoreError> {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(CoreError::config(
                format!("Failed to parse {}: '{}' is not a boolean", key, other),
                key,
            )),
        },
        Err(_) => Ok(default),
    }
}

/// Load .env file if present
///
/// Does not fail when the file is missing.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "Failed to load .env file");
        }
    }
}
