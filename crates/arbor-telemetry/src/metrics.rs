//! Metrics registry, scoped to the dispatcher/scheduler/pool counters the
//! core actually produces (see `revaer-telemetry::metrics` for the
//! teacher's much larger HTTP/config-watch surface, not needed here).

use anyhow::Result;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

struct MetricsInner {
    registry: Registry,
    events_processed_total: IntCounter,
    submissions_total: IntCounterVec,
    season_cutoff_drops_total: IntCounter,
    service_run_failures_total: IntCounterVec,
    retry_sweep_size: IntGauge,
    queue_depth: IntGauge,
}

/// Handle to the process's metrics registry.
#[derive(Clone)]
pub struct Metrics {
    inner: std::sync::Arc<MetricsInner>,
}

impl Metrics {
    /// Construct and register every collector.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector cannot be registered, e.g. a name
    /// collision (should not happen outside of tests constructing more
    /// than one `Metrics` against the same process-global registry).
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let events_processed_total = IntCounter::with_opts(Opts::new(
            "arbor_events_processed_total",
            "Total events processed by the dispatcher loop.",
        ))?;
        let submissions_total = IntCounterVec::new(
            Opts::new(
                "arbor_submissions_total",
                "Submissions made to a given next service.",
            ),
            &["service"],
        )?;
        let season_cutoff_drops_total = IntCounter::with_opts(Opts::new(
            "arbor_season_cutoff_drops_total",
            "Season submissions dropped by the dispatcher's scrape cutoff guard.",
        ))?;
        let service_run_failures_total = IntCounterVec::new(
            Opts::new(
                "arbor_service_run_failures_total",
                "Service run() calls that returned an error.",
            ),
            &["service"],
        )?;
        let retry_sweep_size = IntGauge::with_opts(Opts::new(
            "arbor_retry_sweep_size",
            "Number of incomplete items picked up by the most recent retry sweep.",
        ))?;
        let queue_depth = IntGauge::with_opts(Opts::new(
            "arbor_queue_depth",
            "Current depth of the dispatcher's event queue.",
        ))?;

        registry.register(Box::new(events_processed_total.clone()))?;
        registry.register(Box::new(submissions_total.clone()))?;
        registry.register(Box::new(season_cutoff_drops_total.clone()))?;
        registry.register(Box::new(service_run_failures_total.clone()))?;
        registry.register(Box::new(retry_sweep_size.clone()))?;
        registry.register(Box::new(queue_depth.clone()))?;

        Ok(Self {
            inner: std::sync::Arc::new(MetricsInner {
                registry,
                events_processed_total,
                submissions_total,
                season_cutoff_drops_total,
                service_run_failures_total,
                retry_sweep_size,
                queue_depth,
            }),
        })
    }

    /// The underlying Prometheus registry, for exposition.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Record one processed event.
    pub fn record_event_processed(&self) {
        self.inner.events_processed_total.inc();
    }

    /// Record a submission made to `service`.
    pub fn record_submission(&self, service: &str) {
        self.inner.submissions_total.with_label_values(&[service]).inc();
    }

    /// Record the dispatcher's scrape cutoff guard dropping a submission.
    pub fn record_season_cutoff_drop(&self) {
        self.inner.season_cutoff_drops_total.inc();
    }

    /// Record a failed `service.run()` call.
    pub fn record_service_failure(&self, service: &str) {
        self.inner
            .service_run_failures_total
            .with_label_values(&[service])
            .inc();
    }

    /// Set the size of the most recent retry sweep.
    pub fn set_retry_sweep_size(&self, size: i64) {
        self.inner.retry_sweep_size.set(size);
    }

    /// Set the current event queue depth.
    pub fn set_queue_depth(&self, depth: i64) {
        self.inner.queue_depth.set(depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_register_without_collision() {
        let metrics = Metrics::new().expect("construct metrics");
        metrics.record_event_processed();
        metrics.record_submission("indexer");
        metrics.set_queue_depth(3);
        assert!(!metrics.registry().gather().is_empty());
    }
}
