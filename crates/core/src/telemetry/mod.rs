//! Structured logging for Playrank crates
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! human-readable or JSON formatting layer.
//!
//! # Example
//!
//! ```rust,no_run
//! use playrank_core::telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig {
//!     level: "debug".to_string(),
//!     format: LogFormat::Json,
//! };
//! init_logging(config).unwrap();
//! ```

pub mod tracing;

pub use self::tracing::{init_logging, LogConfig, LogFormat, TelemetryError};
