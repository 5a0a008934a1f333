//! The `Service` trait implemented by every external collaborator.

use arbor_model::MediaItem;
use async_trait::async_trait;

use crate::ServiceResult;

/// A pipeline collaborator (source, indexer, scraper, downloader,
/// symlinker, or library notifier).
///
/// Grounded on `revaer-torrent-core::service::{TorrentEngine, TorrentWorkflow}`:
/// a single required method (`run`) plus a handful of optional hooks with
/// default bodies, so a concrete service only implements what its role
/// actually uses rather than a monolithic interface.
#[async_trait]
pub trait Service: Send + Sync {
    /// Stable name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Process `item` (or, for source/indexer services with no upstream
    /// input, `None`) and return zero or more items to merge back into the
    /// item graph. A service that raises should be treated by the Worker
    /// Pool as producing no items, never propagated further.
    async fn run(&self, item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>>;

    /// Whether the dispatcher should submit `item` to this service at all.
    /// Symlinker overrides this to gate on having a resolvable file path;
    /// most services accept every item routed to them.
    fn should_submit(&self, _item: &MediaItem) -> bool {
        true
    }

    /// Whether a scraper-role service is willing to scrape `item` again,
    /// e.g. because it has not exceeded its own retry budget. Only
    /// scraper-role services override this default.
    fn can_we_scrape(&self, _item: &MediaItem) -> ServiceResult<bool> {
        Err(crate::ServiceError::Unsupported {
            operation: "can_we_scrape",
        })
    }

    /// Seconds between scheduled ticks for this service, if it is polled
    /// on an interval (sources and the library notifier). `None` means the
    /// service is only invoked in response to routed events.
    fn update_interval(&self) -> Option<u64> {
        None
    }

    /// Whether the service has completed its own startup and is ready to
    /// receive work. The registry's validity rule consults this.
    fn initialized(&self) -> bool {
        true
    }
}
