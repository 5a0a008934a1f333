//! Wires configuration, telemetry, the service registry, the item graph,
//! the dispatcher, and the scheduler into a running [`Program`].
//!
//! Grounded on `revaer-app::bootstrap`'s `BootstrapDependencies::from_env`
//! / `run_app` / `run_app_with` split: dependency construction is kept
//! separate from the boot sequence so tests can inject a [`Settings`]
//! value instead of reading the environment.

use std::path::Path;
use std::sync::Arc;

use arbor_config::Settings;
use arbor_graph::ItemGraph;
use arbor_router::Emitter;
use arbor_runtime::{Dispatcher, DispatcherConfig, EventQueueHandle, Scheduler, SchedulerHandle};
use arbor_services::{ServiceRegistry, SourceKind};
use arbor_telemetry::{LoggingConfig, Metrics, init_logging};
use arbor_model::MediaItem;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::services::{DemoDownloader, DemoIndexer, DemoLibraryNotifier, DemoScraper, DemoSymlinker, WatchlistSource};

/// Default seconds between scheduler polls of the library notifier, when
/// not otherwise configured. The distilled settings model has no
/// per-service interval for singleton processing services, only sources,
/// so this one constant covers the notifier's own poll.
const DEFAULT_LIBRARY_NOTIFIER_INTERVAL_SECS: u64 = 300;

/// A running pipeline: the item graph, the event queue, and every
/// background task the dispatcher and scheduler spawned.
pub struct Program {
    graph: Arc<ItemGraph>,
    queue: EventQueueHandle,
    scheduler_handle: SchedulerHandle,
    sources: Vec<Arc<WatchlistSource>>,
    dispatcher_task: JoinHandle<()>,
    scheduler_tasks: Vec<JoinHandle<()>>,
}

impl Program {
    /// Build and start a pipeline from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRegistry`] if the wired registry fails
    /// [`arbor_services::ServiceRegistry::validate`] (e.g. no sources
    /// configured), or [`AppError::Telemetry`] if the metrics registry
    /// cannot be constructed.
    pub fn start(settings: &Settings) -> AppResult<Self> {
        let metrics = Metrics::new().map_err(|source| AppError::Telemetry { source })?;

        let library_notifier = Arc::new(DemoLibraryNotifier::new(
            DEFAULT_LIBRARY_NOTIFIER_INTERVAL_SECS,
        ));

        let mut sources = Vec::new();
        let mut registry = ServiceRegistry::new()
            .with_indexer(Arc::new(DemoIndexer))
            .with_scraper(Arc::new(DemoScraper))
            .with_downloader(Arc::new(DemoDownloader))
            .with_symlinker(Arc::new(DemoSymlinker))
            .with_library_notifier(library_notifier);

        for source in &settings.sources {
            if !source.enabled {
                continue;
            }
            // The reference app has only one kind of in-memory source; a
            // real deployment would map `source.name` to a concrete
            // watchlist/list integration here.
            let watchlist = Arc::new(WatchlistSource::new(
                Box::leak(source.name.clone().into_boxed_str()),
                source.update_interval_secs,
            ));
            sources.push(Arc::clone(&watchlist));
            registry = registry.with_source(SourceKind::Watchlist, watchlist);
        }

        let registry = Arc::new(registry);
        let graph = Arc::new(ItemGraph::new());

        let (dispatcher, queue) = Dispatcher::new(DispatcherConfig {
            graph: Arc::clone(&graph),
            registry: Arc::clone(&registry),
            metrics: metrics.clone(),
            router_thresholds: settings.router_thresholds(),
            season_scraper_drop_at: settings.thresholds.season_scraper_drop_at,
            worker_concurrency: settings
                .worker_threads
                .unwrap_or_else(|| std::thread::available_parallelism().map_or(4, |n| n.get())),
        })
        .map_err(|source| AppError::InvalidRegistry { source })?;

        let dispatcher_task = dispatcher.spawn();

        let pool = arbor_runtime::WorkerPool::new(
            settings
                .worker_threads
                .unwrap_or_else(|| std::thread::available_parallelism().map_or(4, |n| n.get())),
            queue.clone(),
            metrics,
        );
        let scheduler = Scheduler::new(
            registry,
            Arc::clone(&graph),
            pool,
            queue.clone(),
            settings.retry_sweep_secs,
        );
        let (scheduler_tasks, scheduler_handle) = scheduler.spawn();

        info!(sources = sources.len(), "arbor pipeline started");

        Ok(Self {
            graph,
            queue,
            scheduler_handle,
            sources,
            dispatcher_task,
            scheduler_tasks,
        })
    }

    /// The item graph driving this pipeline, for inspection (the CLI's
    /// `dump` of incomplete items) or tests.
    #[must_use]
    pub fn graph(&self) -> &Arc<ItemGraph> {
        &self.graph
    }

    /// Enqueue `item` as if no originating service could be identified,
    /// e.g. a startup library-seed scan.
    pub fn seed_item(&self, item: MediaItem) {
        self.queue.enqueue(Emitter::Unknown, item);
    }

    /// Queue `item` on the first registered watchlist source, to be
    /// picked up on its next scheduled poll (or immediately, if paired
    /// with [`Self::trigger_source_now`]).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRegistry`] if no source is registered.
    pub fn add_to_queue(&self, item: MediaItem) -> AppResult<()> {
        let Some(source) = self.sources.first() else {
            return Err(AppError::InvalidRegistry {
                source: arbor_runtime::RuntimeError::InvalidRegistry {
                    reason: "no source service registered to accept queued items".to_string(),
                },
            });
        };
        source.push(item);
        Ok(())
    }

    /// Force an immediate poll of `job_id` (a source's name, or
    /// `"retry-incomplete-sweep"`) without waiting for its interval.
    #[must_use]
    pub fn trigger_source_now(&self, job_id: &str) -> bool {
        self.scheduler_handle.trigger_now(job_id)
    }

    /// Wait for every background task to finish. Only returns once the
    /// event queue has drained and every scheduled job loop has ended;
    /// under normal operation this runs until the process is killed.
    pub async fn join(self) {
        let _ = self.dispatcher_task.await;
        for task in self.scheduler_tasks {
            let _ = task.await;
        }
    }
}

/// Load settings from `config_path`, initialize logging, and start the
/// pipeline. This is the binary's entry point.
///
/// # Errors
///
/// Returns [`AppError::Config`] if settings cannot be loaded, or any
/// error [`Program::start`] can return.
pub async fn run_app(config_path: &Path) -> AppResult<()> {
    let settings = Settings::load(config_path).map_err(|source| AppError::Config {
        path: config_path.display().to_string(),
        source,
    })?;
    init_logging(&LoggingConfig::default()).map_err(|source| AppError::Telemetry { source })?;
    let program = Program::start(&settings)?;
    program.join().await;
    Ok(())
}
