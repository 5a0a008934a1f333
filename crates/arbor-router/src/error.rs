//! Error types for the event router.

use arbor_model::ItemKind;
use thiserror::Error;

/// Errors the router raises for genuinely exceptional misuse. Ordinary
/// "not eligible yet" outcomes are never errors; they are expressed as
/// `next_service: None` in [`crate::RouterOutcome`].
#[derive(Debug, Error)]
pub enum RouterError {
    /// The existing tracked item and the incoming event disagree on kind
    /// (e.g. an `Episode` event arriving for an id tracked as a `Movie`).
    #[error("existing item kind {existing:?} does not match incoming kind {incoming:?}")]
    KindMismatch {
        /// Kind of the previously tracked item.
        existing: ItemKind,
        /// Kind of the incoming item.
        incoming: ItemKind,
    },
}

/// Convenience alias for router results.
pub type RouterResult<T> = Result<T, RouterError>;
