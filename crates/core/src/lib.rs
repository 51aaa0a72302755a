//! # Playrank Core
//!
//! Shared infrastructure for the Playrank workspace.
//!
//! ## Modules
//!
//! - `config`: Configuration loading from environment variables and `.env` files
//! - `error`: Shared error type
//! - `telemetry`: Structured logging initialization

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{load_dotenv, parse_bool_env, parse_env_var, ConfigLoader};
pub use error::CoreError;
pub use telemetry::{init_logging, LogConfig, LogFormat, TelemetryError};
