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

//! In-memory item graph: the single owner of the media item tree.
//!
//! # Design
//!
//! Grounded on `revaer-app::orchestrator::TorrentCatalog`: all state lives
//! behind one [`tokio::sync::RwLock`], mutated only by whichever task holds
//! the write half (the Dispatcher, by convention), while every other reader
//! takes a synchronized snapshot through the read half. `Movie` and `Show`
//! items are roots; `Season`/`Episode` items are merged into their owning
//! root by walking a flat id-to-root index, so a single out-of-order
//! `Episode` upsert never needs its whole ancestor chain re-sent.

mod merge;

use std::collections::HashMap;

use arbor_model::{MediaItem, State, classify_state};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

/// The in-memory item graph (component C1).
#[derive(Debug, Default)]
pub struct ItemGraph {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    roots: HashMap<Uuid, MediaItem>,
    /// Maps every item id (root, season, or episode) to its owning root id.
    locations: HashMap<Uuid, Uuid>,
}

impl ItemGraph {
    /// Construct an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load items at startup, e.g. from a library bootstrap scan.
    ///
    /// Each item is upserted in turn; later items may merge into earlier
    /// ones (a `Show` followed by its `Season`s), so order does not matter
    /// for `Movie`/`Show` roots, but a `Season`/`Episode` whose parent has
    /// not yet appeared is dropped with a warning, matching [`Self::upsert`].
    pub async fn seed(&self, items: Vec<MediaItem>) {
        for item in items {
            self.upsert(item).await;
        }
    }

    /// Insert or merge `item` into the graph, returning the fully merged
    /// item as it now stands in the graph.
    ///
    /// `Movie`/`Show` items are merged by `item_id` at the root. `Season`/
    /// `Episode` items are merged into the root resolved from their
    /// `parent_id`; if that root cannot be resolved (the parent has not
    /// been indexed yet), the item is dropped with a warning and `None` is
    /// returned, mirroring the Worker Pool's "drop non-actionable yields"
    /// contract.
    pub async fn upsert(&self, item: MediaItem) -> Option<MediaItem> {
        let mut inner = self.inner.write().await;
        merge::upsert(&mut inner.roots, &mut inner.locations, item)
    }

    /// Snapshot a single item by id, if present.
    pub async fn get(&self, item_id: Uuid) -> Option<MediaItem> {
        let inner = self.inner.read().await;
        let root_id = inner.locations.get(&item_id).copied()?;
        let root = inner.roots.get(&root_id)?;
        merge::find(root, item_id).cloned()
    }

    /// Snapshot every item in the graph whose classified state is not
    /// [`State::Completed`], flattened to one entry per distinct item
    /// (roots, seasons, and episodes each appear once).
    pub async fn get_incomplete_items(&self) -> Vec<MediaItem> {
        let inner = self.inner.read().await;
        inner
            .roots
            .values()
            .flat_map(merge::flatten)
            .filter(|item| classify_state(item) != State::Completed)
            .collect()
    }

    /// Number of distinct items tracked by the graph (roots, seasons, and
    /// episodes all counted).
    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.locations.len()
    }

    /// Whether the graph holds no items at all.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

pub(crate) fn warn_dangling_parent(child_id: Uuid, parent_id: Uuid) {
    warn!(%child_id, %parent_id, "dropping upsert: parent not yet present in item graph");
}
