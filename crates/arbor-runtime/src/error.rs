//! Errors surfaced by runtime construction, as distinct from the
//! per-event errors the router already reports (those never escape
//! [`crate::Dispatcher::handle_event`]; they're logged and dropped).

use thiserror::Error;

/// Errors that can occur while building or starting the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The service registry passed to the runtime failed validation.
    #[error("service registry is not valid: {reason}")]
    InvalidRegistry {
        /// Why `arbor_services::ServiceRegistry::validate` rejected it.
        reason: String,
    },
}

/// Convenience alias for fallible runtime construction.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
