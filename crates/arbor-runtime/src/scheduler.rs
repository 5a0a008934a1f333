//! Scheduler (component C5): periodic ticks per polled service, plus the
//! retry-incomplete-items sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arbor_graph::ItemGraph;
use arbor_router::Emitter;
use arbor_services::{Service, ServiceKind, ServiceRegistry};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::event::EventQueueHandle;
use crate::worker_pool::WorkerPool;

/// Default period, in seconds, between sweeps that resubmit every
/// incomplete item in the graph.
pub const DEFAULT_RETRY_SWEEP_SECS: u64 = 600;

/// The Scheduler (component C5).
///
/// Grounded on `original_source/backend/program/program.py`'s
/// `_schedule_services`/`_schedule_functions`/`_submit_job`: one
/// `max_instances=1, replace_existing=true` job per polled service plus a
/// periodic retry sweep. APScheduler has no direct Rust equivalent, so
/// each job is a `tokio::time::interval` loop with an in-flight guard
/// standing in for `max_instances=1`.
pub struct Scheduler {
    registry: Arc<ServiceRegistry>,
    graph: Arc<ItemGraph>,
    pool: WorkerPool,
    queue: EventQueueHandle,
    retry_sweep_secs: u64,
    triggers: HashMap<String, mpsc::UnboundedSender<()>>,
}

impl Scheduler {
    /// Construct a scheduler over every polled service in `registry`.
    #[must_use]
    pub fn new(
        registry: Arc<ServiceRegistry>,
        graph: Arc<ItemGraph>,
        pool: WorkerPool,
        queue: EventQueueHandle,
        retry_sweep_secs: u64,
    ) -> Self {
        Self {
            registry,
            graph,
            pool,
            queue,
            retry_sweep_secs,
            triggers: HashMap::new(),
        }
    }

    /// Spawn one task per polled service plus the retry sweep, returning
    /// their join handles. `self` is consumed: job ids are resolved once,
    /// at spawn time, since the registry does not change afterward.
    pub fn spawn(mut self) -> (Vec<JoinHandle<()>>, SchedulerHandle) {
        let mut handles = Vec::new();
        for (kind, service) in self.registry.polled_services() {
            let Some(interval_secs) = service.update_interval() else {
                warn!(service = service.name(), "polled service has no update_interval; skipping");
                continue;
            };
            let job_id = service.name().to_string();
            let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
            self.triggers.insert(job_id.clone(), trigger_tx);
            handles.push(spawn_job(job_id, interval_secs, trigger_rx, {
                let pool = self.pool.clone();
                move || {
                    pool.submit(kind, Arc::clone(&service), None);
                }
            }));
        }

        let retry_job_id = "retry-incomplete-sweep".to_string();
        let (retry_tx, retry_rx) = mpsc::unbounded_channel();
        self.triggers.insert(retry_job_id.clone(), retry_tx);
        handles.push(spawn_retry_sweep(
            retry_job_id,
            self.retry_sweep_secs,
            retry_rx,
            Arc::clone(&self.graph),
            self.queue.clone(),
        ));

        (handles, SchedulerHandle { triggers: self.triggers })
    }
}

/// A handle allowing external callers (tests, a CLI, an admin endpoint) to
/// force an immediate run of a named scheduled job without waiting for its
/// interval to elapse. Not present in the original, which exposes no such
/// hook; added because `arbor-app`'s CLI needs an actionable "run now".
#[derive(Clone)]
pub struct SchedulerHandle {
    triggers: HashMap<String, mpsc::UnboundedSender<()>>,
}

impl SchedulerHandle {
    /// Trigger `job_id` immediately, if it exists. Returns `false` if no
    /// job with that id was registered.
    pub fn trigger_now(&self, job_id: &str) -> bool {
        self.triggers
            .get(job_id)
            .is_some_and(|sender| sender.send(()).is_ok())
    }
}

fn spawn_job(
    job_id: String,
    interval_secs: u64,
    mut trigger_rx: mpsc::UnboundedReceiver<()>,
    run: impl Fn() + Send + 'static,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let in_flight = Arc::new(AtomicBool::new(false));
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                maybe = trigger_rx.recv() => {
                    if maybe.is_none() {
                        break;
                    }
                }
            }
            // max_instances=1: skip this tick if the previous run (the
            // spawned service task itself) has not finished yet.
            if in_flight.swap(true, Ordering::SeqCst) {
                debug!(job = %job_id, "skipping tick: previous run still in flight");
                continue;
            }
            debug!(job = %job_id, "running scheduled job");
            run();
            in_flight.store(false, Ordering::SeqCst);
        }
        info!(job = %job_id, "scheduled job loop ended");
    })
}

fn spawn_retry_sweep(
    job_id: String,
    interval_secs: u64,
    mut trigger_rx: mpsc::UnboundedReceiver<()>,
    graph: Arc<ItemGraph>,
    queue: EventQueueHandle,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                maybe = trigger_rx.recv() => {
                    if maybe.is_none() {
                        break;
                    }
                }
            }
            let incomplete = graph.get_incomplete_items().await;
            debug!(job = %job_id, count = incomplete.len(), "retry sweep");
            for item in incomplete {
                queue.enqueue(Emitter::SelfRequeue, item);
            }
        }
        info!(job = %job_id, "retry sweep loop ended");
    })
}
