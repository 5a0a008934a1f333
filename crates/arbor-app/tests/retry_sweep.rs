//! Scenario 5 (spec.md §8): a scraper that raises once and succeeds on
//! retry is picked back up by the retry-incomplete sweep, not lost.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use arbor_graph::ItemGraph;
use arbor_model::{ItemHeader, MediaItem, Movie};
use arbor_runtime::{Dispatcher, DispatcherConfig, Scheduler, WorkerPool};
use arbor_services::{Service, ServiceRegistry, SourceKind};
use arbor_telemetry::Metrics;
use async_trait::async_trait;
use uuid::Uuid;

struct FlakyScraper {
    attempts: AtomicU32,
}

#[async_trait]
impl Service for FlakyScraper {
    fn name(&self) -> &'static str {
        "flaky-scraper"
    }

    async fn run(&self, item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == 1 {
            anyhow::bail!("upstream scrape provider timed out");
        }
        let mut item = item.expect("scraper always receives an item");
        item.header_mut().file = Some(format!("{}.mkv", item.header().title));
        Ok(vec![item])
    }
}

struct NoOp(&'static str);

#[async_trait]
impl Service for NoOp {
    fn name(&self) -> &'static str {
        self.0
    }

    async fn run(&self, _item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
        Ok(Vec::new())
    }
}

/// An indexer that always re-emits whatever it receives unchanged, the
/// way a real indexer does once an item is already indexed: it has
/// nothing left to fill in, but still yields the item so the cycle keeps
/// moving on to the scraper.
struct PassThroughIndexer;

#[async_trait]
impl Service for PassThroughIndexer {
    fn name(&self) -> &'static str {
        "indexer"
    }

    async fn run(&self, item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
        Ok(item.into_iter().collect())
    }
}

/// A worker pool failure (panic or `Err` return) never reaches the
/// dispatcher directly; the item only advances again once the retry sweep
/// re-enqueues it as `Emitter::SelfRequeue`. This test uses a one-second
/// sweep interval and forces it via `SchedulerHandle::trigger_now` instead
/// of waiting out the real interval.
#[tokio::test]
async fn flaky_scraper_recovers_on_the_next_retry_sweep() {
    let graph = Arc::new(ItemGraph::new());
    let scraper = Arc::new(FlakyScraper {
        attempts: AtomicU32::new(0),
    });
    let registry = Arc::new(
        ServiceRegistry::new()
            .with_source(SourceKind::Watchlist, Arc::new(NoOp("source")))
            .with_indexer(Arc::new(PassThroughIndexer))
            .with_scraper(Arc::clone(&scraper) as Arc<dyn Service>)
            .with_downloader(Arc::new(NoOp("downloader")))
            .with_symlinker(Arc::new(NoOp("symlinker")))
            .with_library_notifier(Arc::new(NoOp("library"))),
    );

    let metrics = Metrics::new().expect("metrics");
    let (dispatcher, queue) = Dispatcher::new(DispatcherConfig {
        graph: Arc::clone(&graph),
        registry: Arc::clone(&registry),
        metrics: metrics.clone(),
        router_thresholds: arbor_router::Thresholds::default(),
        season_scraper_drop_at: 3,
        worker_concurrency: 4,
    })
    .expect("registry is fully wired");
    let dispatcher_task = dispatcher.spawn();

    let pool = WorkerPool::new(4, queue.clone(), metrics);
    let scheduler = Scheduler::new(Arc::clone(&registry), Arc::clone(&graph), pool, queue.clone(), 3600);
    let (_scheduler_tasks, scheduler_handle) = scheduler.spawn();

    let item_id = Uuid::new_v4();
    let mut header = ItemHeader::new(item_id, "Arrival");
    header.indexed_at = Some(chrono::Utc::now());
    queue.enqueue(arbor_router::Emitter::source(SourceKind::Watchlist), MediaItem::Movie(Movie { header }));

    // First pass: indexer intake, then routed to the scraper, which fails.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(scraper.attempts.load(Ordering::SeqCst), 1);
    let stored = graph.get(item_id).await.expect("item tracked after intake");
    assert!(stored.header().file.is_none());

    // Force the retry sweep instead of waiting out its real interval.
    assert!(scheduler_handle.trigger_now("retry-incomplete-sweep"));
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(scraper.attempts.load(Ordering::SeqCst), 2);
    let stored = graph.get(item_id).await.expect("item tracked after retry");
    assert_eq!(stored.header().file.as_deref(), Some("Arrival.mkv"));

    drop(queue);
    let _ = tokio::time::timeout(Duration::from_millis(200), dispatcher_task).await;
}
