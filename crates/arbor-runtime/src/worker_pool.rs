//! Worker Pool (component C6): bounded-concurrency execution of service
//! `run()` calls, feeding their yields back into the event queue.

use std::sync::Arc;

use arbor_model::MediaItem;
use arbor_router::Emitter;
use arbor_services::{Service, ServiceKind};
use arbor_telemetry::Metrics;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::event::EventQueueHandle;

/// Bounded-concurrency executor for [`Service::run`] calls.
///
/// Grounded on `revaer-app::orchestrator::spawn_post_processing`'s
/// `tokio::spawn` + error-logging loop, generalized from one
/// post-processing task to an arbitrary number of concurrent submissions
/// capped by a semaphore.
#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    queue: EventQueueHandle,
    metrics: Metrics,
}

impl WorkerPool {
    /// Construct a pool allowing up to `max_concurrency` in-flight
    /// `service.run()` calls at once.
    #[must_use]
    pub fn new(max_concurrency: usize, queue: EventQueueHandle, metrics: Metrics) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            queue,
            metrics,
        }
    }

    /// Submit `item` (or `None`, for a polled source/library tick) to
    /// `service`. Runs on a spawned task so the caller never blocks past
    /// acquiring a concurrency permit.
    ///
    /// Every yielded item is wrapped as an [`crate::Event`] with
    /// `emitter` set to `kind` and pushed onto the queue. A failed or
    /// panicking run produces no events; it is logged and counted, never
    /// propagated.
    pub fn submit(&self, kind: ServiceKind, service: Arc<dyn Service>, item: Option<MediaItem>) {
        let semaphore = Arc::clone(&self.semaphore);
        let queue = self.queue.clone();
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            let service_name = service.name();
            match tokio::spawn(async move { service.run(item).await }).await {
                Ok(Ok(items)) => {
                    for item in items {
                        queue.enqueue(Emitter::Known(kind), item);
                    }
                }
                Ok(Err(error)) => {
                    warn!(service = service_name, %error, "service run() returned an error");
                    metrics.record_service_failure(service_name);
                }
                Err(join_error) => {
                    warn!(
                        service = service_name,
                        %join_error,
                        "service run() panicked; dropping its yields"
                    );
                    metrics.record_service_failure(service_name);
                }
            }
            debug!(service = service_name, "worker pool task finished");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_model::{ItemHeader, Movie};
    use arbor_services::SourceKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct FlakyService {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Service for FlakyService {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn run(&self, _item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("boom")
        }
    }

    struct YieldingService;

    #[async_trait]
    impl Service for YieldingService {
        fn name(&self) -> &'static str {
            "yielding"
        }

        async fn run(&self, _item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
            Ok(vec![MediaItem::Movie(Movie {
                header: ItemHeader::new(Uuid::new_v4(), "Yielded"),
            })])
        }
    }

    #[tokio::test]
    async fn failed_run_produces_no_events() {
        let (handle, mut rx) = crate::event::channel();
        let metrics = Metrics::new().expect("metrics");
        let pool = WorkerPool::new(2, handle, metrics);
        let calls = Arc::new(AtomicUsize::new(0));
        pool.submit(
            ServiceKind::Source(SourceKind::Watchlist),
            Arc::new(FlakyService {
                calls: Arc::clone(&calls),
            }),
            None,
        );
        // Give the spawned task a chance to run.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn successful_run_enqueues_its_yields() {
        let (handle, mut rx) = crate::event::channel();
        let metrics = Metrics::new().expect("metrics");
        let pool = WorkerPool::new(2, handle, metrics);
        pool.submit(
            ServiceKind::Indexer,
            Arc::new(YieldingService),
            None,
        );
        let event = tokio::time::timeout(std::time::Duration::from_millis(200), rx.recv())
            .await
            .expect("event arrives")
            .expect("channel open");
        assert_eq!(event.item.header().title, "Yielded");
    }
}
