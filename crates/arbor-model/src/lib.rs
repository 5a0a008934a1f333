#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Media item domain types and the pure state classifier.
//!
//! # Design
//! - `MediaItem` is a closed, tagged-variant tree (Movie/Show/Season/Episode)
//!   sharing a common [`ItemHeader`].
//! - Children are owned hierarchically (`Show` owns its `Season`s, `Season`
//!   owns its `Episode`s); parents are referenced only by id, never owned.
//! - [`classify_state`] is a pure function: it reads a `MediaItem` and
//!   produces a [`State`], never mutating anything.

mod classify;
mod error;
mod item;

pub use classify::classify_state;
pub use error::{ItemError, ItemResult};
pub use item::{Episode, ItemHeader, ItemKind, MediaItem, Movie, Season, Show};

use serde::{Deserialize, Serialize};

/// The closed set of states a [`MediaItem`] can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// Not yet indexed by any source.
    Unknown,
    /// Indexed but no release has been scraped for it.
    Indexed,
    /// A release candidate has been scraped but not downloaded.
    Scraped,
    /// Files have been downloaded but not symlinked into the library.
    Downloaded,
    /// Symlinked into the library but not yet confirmed by the media server.
    Symlinked,
    /// Fully processed; terminal state.
    Completed,
    /// A container (`Show`/`Season`) whose children are a mix of complete
    /// and incomplete states.
    PartiallyCompleted,
}

impl State {
    /// Whether this state requires no further action by the pipeline.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}
