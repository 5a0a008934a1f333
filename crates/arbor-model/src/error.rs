//! Error types for the media item domain.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced while constructing or navigating the item tree.
#[derive(Debug, Error)]
pub enum ItemError {
    /// A `Season`/`Episode` referenced a parent id that does not resolve
    /// within the same item tree.
    #[error("dangling parent reference")]
    DanglingParent {
        /// The child whose parent could not be resolved.
        child_id: Uuid,
        /// The parent id that failed to resolve.
        parent_id: Uuid,
    },
    /// An operation expected a container (`Show`/`Season`) but received a
    /// leaf item.
    #[error("expected a container item")]
    NotAContainer {
        /// The item id that was not a container.
        item_id: Uuid,
    },
}

/// Convenience alias for item domain results.
pub type ItemResult<T> = Result<T, ItemError>;
