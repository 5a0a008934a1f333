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

//! The executor: Dispatcher (C4), Scheduler (C5), and Worker Pool (C6),
//! wired together over a shared [`arbor_graph::ItemGraph`] and
//! [`arbor_services::ServiceRegistry`].
//!
//! # Concurrency model
//!
//! The item graph is mutated only by the Dispatcher's own task; the
//! Scheduler and Worker Pool only ever enqueue events through an
//! [`EventQueueHandle`] and read synchronized snapshots back out of the
//! graph. This mirrors `spec.md` §5 exactly.

mod dispatcher;
mod error;
mod event;
mod scheduler;
mod worker_pool;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use event::{Event, EventQueueHandle};
pub use scheduler::{DEFAULT_RETRY_SWEEP_SECS, Scheduler, SchedulerHandle};
pub use worker_pool::WorkerPool;
