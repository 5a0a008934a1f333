//! Error types for service execution.

use std::error::Error;

use thiserror::Error;
use uuid::Uuid;

/// Primary error type for service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The operation is not supported by this service, e.g. `can_we_scrape`
    /// called on a service that never overrides its default.
    #[error("service operation not supported")]
    Unsupported {
        /// Operation identifier.
        operation: &'static str,
    },
    /// The service's `run` call failed.
    #[error("service run failed")]
    RunFailed {
        /// Name of the service that failed.
        service: &'static str,
        /// Item id being processed, when the failure was item-scoped.
        item_id: Option<Uuid>,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The registry failed its startup validity check.
    #[error("service registry is not valid: {reason}")]
    InvalidRegistry {
        /// Human-readable reason the registry failed validation.
        reason: String,
    },
}

/// Convenience alias for service operation results.
pub type ServiceResult<T> = Result<T, ServiceError>;
