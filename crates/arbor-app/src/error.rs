//! Application-level errors for bootstrap and the CLI edge.
//!
//! Library crates (`arbor-model`, `arbor-router`, ...) each carry their own
//! `thiserror` enum; this one centralizes the handful of ways wiring them
//! together at the binary boundary can fail.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings could not be loaded from disk.
    #[error("failed to load configuration from {path}")]
    Config {
        /// Path the settings file was read from.
        path: String,
        /// Underlying configuration error.
        #[source]
        source: arbor_config::ConfigError,
    },
    /// The service registry built at startup failed validation.
    #[error("service registry is not valid: {source}")]
    InvalidRegistry {
        /// Underlying runtime error.
        #[source]
        source: arbor_runtime::RuntimeError,
    },
    /// Metrics registry construction failed.
    #[error("failed to initialize metrics")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: anyhow::Error,
    },
    /// The `add` subcommand was given item JSON that could not be parsed.
    #[error("could not parse item JSON")]
    InvalidItemJson {
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}
