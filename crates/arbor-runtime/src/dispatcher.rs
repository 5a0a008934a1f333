//! Dispatcher (component C4): the single event loop thread that owns all
//! mutation of the Item Graph.

use std::sync::Arc;

use arbor_graph::ItemGraph;
use arbor_model::{MediaItem, State, classify_state};
use arbor_router::{Emitter, RouterOutcome, Thresholds as RouterThresholds, process_event};
use arbor_services::{Service, ServiceKind, ServiceRegistry};
use arbor_telemetry::Metrics;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{RuntimeError, RuntimeResult};
use crate::event::{Event, EventQueueHandle, channel};
use crate::worker_pool::WorkerPool;

/// The Dispatcher (component C4).
///
/// Grounded on `revaer-app::orchestrator::spawn_post_processing`'s single
/// `tokio::spawn`ed consumer loop draining an event stream and calling
/// into the graph on every iteration; generalized here from one
/// post-processing hook to the full router-driven state machine.
pub struct Dispatcher {
    graph: Arc<ItemGraph>,
    registry: Arc<ServiceRegistry>,
    pool: WorkerPool,
    metrics: Metrics,
    router_thresholds: RouterThresholds,
    /// Dispatcher-level cutoff: once a season has been submitted to the
    /// scraper this many times, further submissions are dropped here,
    /// independent of the router's own (distinct) fan-out cutoff.
    season_scraper_drop_at: u32,
    queue_rx: UnboundedReceiver<Event>,
}

/// Construction arguments for [`Dispatcher::new`], grouped to avoid an
/// unwieldy positional constructor.
pub struct DispatcherConfig {
    /// The shared item graph this dispatcher owns mutation of.
    pub graph: Arc<ItemGraph>,
    /// The validated service registry.
    pub registry: Arc<ServiceRegistry>,
    /// Process metrics handle.
    pub metrics: Metrics,
    /// Router-level season cutoff.
    pub router_thresholds: RouterThresholds,
    /// Dispatcher-level season cutoff (see [`Dispatcher::season_scraper_drop_at`]).
    pub season_scraper_drop_at: u32,
    /// Maximum concurrent `service.run()` calls.
    pub worker_concurrency: usize,
}

impl Dispatcher {
    /// Construct a dispatcher and the [`EventQueueHandle`] used to feed it.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidRegistry`] if `config.registry` fails
    /// [`arbor_services::ServiceRegistry::validate`] (missing source,
    /// indexer, or an uninitialized processing service).
    pub fn new(config: DispatcherConfig) -> RuntimeResult<(Self, EventQueueHandle)> {
        config
            .registry
            .validate()
            .map_err(|error| RuntimeError::InvalidRegistry {
                reason: error.to_string(),
            })?;

        let (handle, queue_rx) = channel();
        let pool = WorkerPool::new(config.worker_concurrency, handle.clone(), config.metrics.clone());
        Ok((
            Self {
                graph: config.graph,
                registry: config.registry,
                pool,
                metrics: config.metrics,
                router_thresholds: config.router_thresholds,
                season_scraper_drop_at: config.season_scraper_drop_at,
                queue_rx,
            },
            handle,
        ))
    }

    /// Spawn the dispatcher's event loop on a new task. The loop runs
    /// until every [`EventQueueHandle`] clone is dropped and the queue
    /// drains, at which point it returns.
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = self.queue_rx.recv().await {
                self.handle_event(event).await;
            }
            info!("dispatcher event queue drained; shutting down");
        })
    }

    async fn handle_event(&self, event: Event) {
        self.metrics.record_event_processed();
        let item_id = event.item.item_id();
        let existing = self.graph.get(item_id).await;

        let outcome = match process_event(
            existing.as_ref(),
            event.emitter,
            event.item,
            self.router_thresholds,
        ) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(%item_id, %error, "router rejected event");
                return;
            }
        };

        if let Some(merged) = outcome.merged.clone() {
            self.graph.upsert(merged).await;
        }

        self.dispatch_submissions(outcome).await;
    }

    async fn dispatch_submissions(&self, outcome: RouterOutcome) {
        let Some(next_service) = outcome.next_service else {
            return;
        };
        let Some(service) = self.registry.resolve(next_service) else {
            warn!(?next_service, "no service registered to handle next_service");
            return;
        };

        for submission in outcome.submissions {
            if self.is_dropped_by_season_cutoff(next_service, &submission) {
                self.metrics.record_season_cutoff_drop();
                warn!(
                    item_id = %submission.item_id(),
                    "dropping season scraper submission past the dispatcher cutoff"
                );
                continue;
            }
            if !service.should_submit(&submission) {
                continue;
            }
            if next_service == ServiceKind::Scraper && !self.can_we_scrape(&service, &submission) {
                continue;
            }
            self.metrics.record_submission(service.name());
            self.pool.submit(next_service, Arc::clone(&service), Some(submission));
        }
    }

    /// Gate every scrape-expansion candidate through the scraper's own
    /// `can_we_scrape` capability probe (spec §4.3). The router proposes
    /// candidates by state alone and has no service access to ask this
    /// itself, so the Dispatcher applies it uniformly here, the same way
    /// it already applies `should_submit` for every submission. A service
    /// that does not override `can_we_scrape` (returns `Unsupported`) is
    /// treated as always willing.
    fn can_we_scrape(&self, service: &Arc<dyn Service>, item: &MediaItem) -> bool {
        match service.can_we_scrape(item) {
            Ok(allowed) => allowed,
            Err(arbor_services::ServiceError::Unsupported { .. }) => true,
            Err(error) => {
                warn!(item_id = %item.item_id(), %error, "can_we_scrape failed; dropping submission");
                false
            }
        }
    }

    /// The dispatcher's own season cutoff, distinct from the router's: a
    /// season submitted to the scraper `season_scraper_drop_at` times or
    /// more is never submitted again as a whole, even if the router still
    /// proposed it. See `DESIGN.md`'s Open Question resolution.
    fn is_dropped_by_season_cutoff(&self, next_service: ServiceKind, item: &MediaItem) -> bool {
        next_service == ServiceKind::Scraper
            && matches!(item, MediaItem::Season(_))
            && item.header().scraped_times >= self.season_scraper_drop_at
            && classify_state(item) != State::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_model::{ItemHeader, Movie};
    use arbor_services::SourceKind;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct RecordingService {
        name: &'static str,
        received: Mutex<Vec<Option<MediaItem>>>,
    }

    #[async_trait]
    impl Service for RecordingService {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(&self, item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
            self.received.lock().expect("lock").push(item);
            // Deliberately yields nothing further, so this stub never
            // feeds the loop back into itself; real services advance the
            // item's header (e.g. setting `indexed_at`) before re-emitting.
            Ok(Vec::new())
        }
    }

    fn stub(name: &'static str) -> Arc<RecordingService> {
        Arc::new(RecordingService {
            name,
            received: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn new_movie_event_routes_to_indexer() {
        let graph = Arc::new(ItemGraph::new());
        let indexer = stub("indexer");
        let registry = Arc::new(
            ServiceRegistry::new()
                .with_source(SourceKind::Watchlist, stub("source"))
                .with_indexer(indexer.clone())
                .with_scraper(stub("scraper"))
                .with_downloader(stub("downloader"))
                .with_symlinker(stub("symlinker"))
                .with_library_notifier(stub("library")),
        );
        let metrics = Metrics::new().expect("metrics");
        let (dispatcher, handle) = Dispatcher::new(DispatcherConfig {
            graph: Arc::clone(&graph),
            registry,
            metrics,
            router_thresholds: RouterThresholds::default(),
            season_scraper_drop_at: 3,
            worker_concurrency: 4,
        })
        .expect("registry is fully wired");
        let join = dispatcher.spawn();

        let movie = MediaItem::Movie(Movie {
            header: ItemHeader::new(Uuid::new_v4(), "Dune"),
        });
        handle.enqueue(Emitter::source(SourceKind::Watchlist), movie);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        drop(handle);
        let _ = tokio::time::timeout(std::time::Duration::from_millis(200), join).await;

        assert_eq!(indexer.received.lock().expect("lock").len(), 1);
        assert_eq!(graph.len().await, 1);
    }
}
