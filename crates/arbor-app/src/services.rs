//! In-memory reference implementations of the external services.
//!
//! These stand in for the real content provider, indexer, scraper, debrid
//! client, symlink writer, and media-server notifier, which are out of
//! scope for the core (`spec.md` §1 Non-goals). They exist so the binary
//! can run end-to-end locally and so integration tests can drive the full
//! state machine without a network.
//!
//! Grounded on `revaer-app::orchestrator`'s `RecordingEngine`/`StubEngine`
//! test doubles, generalized from test-only stubs into runnable (if
//! trivial) services: each one mutates only the header fields its role is
//! responsible for, advancing the item exactly one state per `run` call.

use std::collections::VecDeque;
use std::sync::Mutex;

use arbor_model::{ItemKind, MediaItem};
use arbor_services::Service;
use async_trait::async_trait;
use chrono::Utc;

/// A source service backed by an in-process queue. Items are pushed by
/// [`WatchlistSource::push`] (the CLI's `add` subcommand and
/// `--seed-library` flag) and drained on the next scheduled tick.
pub struct WatchlistSource {
    name: &'static str,
    update_interval_secs: u64,
    pending: Mutex<VecDeque<MediaItem>>,
}

impl WatchlistSource {
    /// Construct a source polled every `update_interval_secs` seconds.
    #[must_use]
    pub const fn new(name: &'static str, update_interval_secs: u64) -> Self {
        Self {
            name,
            update_interval_secs,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue `item` for the next poll. Used by the CLI to inject items
    /// without waiting on the scheduler's interval (pair with
    /// [`arbor_runtime::SchedulerHandle::trigger_now`] for an immediate
    /// run).
    pub fn push(&self, item: MediaItem) {
        self.pending.lock().expect("pending lock").push_back(item);
    }
}

#[async_trait]
impl Service for WatchlistSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self, _item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
        let mut pending = self.pending.lock().expect("pending lock");
        Ok(pending.drain(..).collect())
    }

    fn update_interval(&self) -> Option<u64> {
        Some(self.update_interval_secs)
    }
}

/// Resolves metadata for a freshly-sourced item. The reference
/// implementation only stamps `indexed_at`; a real indexer additionally
/// expands a `Show` into its `Season`/`Episode` children (out of scope
/// here, see `spec.md` §1).
pub struct DemoIndexer;

#[async_trait]
impl Service for DemoIndexer {
    fn name(&self) -> &'static str {
        "demo-indexer"
    }

    async fn run(&self, item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
        let Some(mut item) = item else {
            return Ok(Vec::new());
        };
        item.header_mut().indexed_at.get_or_insert(Utc::now());
        Ok(vec![item])
    }
}

/// Looks up a downloadable release. Leaf items (`Movie`/`Episode`) are
/// marked found; a whole `Season`/`Show` submission (before the
/// scrape-expansion cutoff) is echoed back unchanged, simulating "no
/// whole-season hits", matching `spec.md` §8 scenario 2.
pub struct DemoScraper;

#[async_trait]
impl Service for DemoScraper {
    fn name(&self) -> &'static str {
        "demo-scraper"
    }

    async fn run(&self, item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
        let Some(mut item) = item else {
            return Ok(Vec::new());
        };
        if matches!(item.kind(), ItemKind::Movie | ItemKind::Episode) {
            let title = item.header().title.clone();
            item.header_mut().file.get_or_insert(format!("{title}.mkv"));
        }
        Ok(vec![item])
    }
}

/// Retrieves the bytes for a scraped release. Only acts on leaf items,
/// mirroring the scraper.
pub struct DemoDownloader;

#[async_trait]
impl Service for DemoDownloader {
    fn name(&self) -> &'static str {
        "demo-downloader"
    }

    async fn run(&self, item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
        let Some(mut item) = item else {
            return Ok(Vec::new());
        };
        if matches!(item.kind(), ItemKind::Movie | ItemKind::Episode) {
            let title = item.header().title.clone();
            item.header_mut()
                .folder
                .get_or_insert(format!("/downloads/{title}"));
        }
        Ok(vec![item])
    }
}

/// Places a downloaded leaf item's file into the library via a symlink.
/// Declines items with no resolved download folder yet.
pub struct DemoSymlinker;

#[async_trait]
impl Service for DemoSymlinker {
    fn name(&self) -> &'static str {
        "demo-symlinker"
    }

    async fn run(&self, item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
        let Some(mut item) = item else {
            return Ok(Vec::new());
        };
        item.header_mut().symlinked = true;
        Ok(vec![item])
    }

    fn should_submit(&self, item: &MediaItem) -> bool {
        item.header().folder.is_some()
    }
}

/// Notifies the media server that a library path has changed. Also polled
/// on an interval by the scheduler for a periodic full-library rescan; the
/// reference implementation treats that tick as a no-op.
pub struct DemoLibraryNotifier {
    update_interval_secs: u64,
}

impl DemoLibraryNotifier {
    /// Construct a notifier polled every `update_interval_secs` seconds.
    #[must_use]
    pub const fn new(update_interval_secs: u64) -> Self {
        Self {
            update_interval_secs,
        }
    }
}

#[async_trait]
impl Service for DemoLibraryNotifier {
    fn name(&self) -> &'static str {
        "demo-library-notifier"
    }

    async fn run(&self, item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
        let Some(mut item) = item else {
            return Ok(Vec::new());
        };
        let title = item.header().title.clone();
        item.header_mut()
            .update_folder
            .get_or_insert(format!("/library/{title}"));
        Ok(vec![item])
    }

    fn update_interval(&self) -> Option<u64> {
        Some(self.update_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_model::{ItemHeader, Movie};
    use uuid::Uuid;

    fn movie(title: &str) -> MediaItem {
        MediaItem::Movie(Movie {
            header: ItemHeader::new(Uuid::new_v4(), title),
        })
    }

    #[tokio::test]
    async fn watchlist_source_drains_pending_items() {
        let source = WatchlistSource::new("watchlist", 60);
        source.push(movie("Dune"));
        source.push(movie("Arrival"));
        let yielded = source.run(None).await.expect("run");
        assert_eq!(yielded.len(), 2);
        assert!(source.run(None).await.expect("run").is_empty());
    }

    #[tokio::test]
    async fn indexer_stamps_indexed_at_once() {
        let mut item = movie("Dune");
        item = DemoIndexer.run(Some(item)).await.expect("run").remove(0);
        let first = item.header().indexed_at;
        assert!(first.is_some());
        item = DemoIndexer.run(Some(item)).await.expect("run").remove(0);
        assert_eq!(item.header().indexed_at, first);
    }

    #[tokio::test]
    async fn symlinker_declines_items_with_no_folder() {
        let item = movie("Dune");
        assert!(!DemoSymlinker.should_submit(&item));
        let mut with_folder = item;
        with_folder.header_mut().folder = Some("/downloads/dune".into());
        assert!(DemoSymlinker.should_submit(&with_folder));
    }

    #[tokio::test]
    async fn pipeline_of_stub_services_drives_a_movie_to_completion() {
        let mut item = movie("Dune");
        item = DemoIndexer.run(Some(item)).await.expect("run").remove(0);
        item = DemoScraper.run(Some(item)).await.expect("run").remove(0);
        item = DemoDownloader.run(Some(item)).await.expect("run").remove(0);
        item = DemoSymlinker.run(Some(item)).await.expect("run").remove(0);
        item = DemoLibraryNotifier
            .run(Some(item))
            .await
            .expect("run")
            .remove(0);
        let header = item.header();
        assert!(header.indexed_at.is_some());
        assert!(header.file.is_some());
        assert!(header.folder.is_some());
        assert!(header.symlinked);
        assert!(header.update_folder.is_some());
    }
}
