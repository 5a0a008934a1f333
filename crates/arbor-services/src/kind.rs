//! Closed service-role tags.
//!
//! The original implementation distinguishes services by Python class
//! identity (`emitted_by == TraktIndexer`). That has no idiomatic Rust
//! analogue without dynamic downcasting, so the router and dispatcher key
//! off this closed enum instead, per the design note in `spec.md` §9.

use serde::{Deserialize, Serialize};

/// A source of new media items (e.g. a watchlist or list provider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// A personal watchlist integration.
    Watchlist,
    /// A curated list integration.
    List,
}

/// The role a registered [`crate::Service`] plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    /// Emits brand-new items into the graph.
    Source(SourceKind),
    /// Resolves metadata and expands containers into their children.
    Indexer,
    /// Finds a downloadable release for an item.
    Scraper,
    /// Retrieves the bytes for a scraped release.
    Downloader,
    /// Places downloaded files into the library via symlinks.
    Symlinker,
    /// Notifies the media server that a library path has changed.
    LibraryNotifier,
}

impl ServiceKind {
    /// Whether this role is driven purely by scheduled ticks rather than
    /// routed events (sources and the library notifier).
    #[must_use]
    pub const fn is_polled(self) -> bool {
        matches!(self, Self::Source(_) | Self::LibraryNotifier)
    }
}
