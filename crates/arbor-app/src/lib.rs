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

//! Binary entry point wiring configuration, telemetry, the service
//! registry, the item graph, the dispatcher, and the scheduler into a
//! running pipeline, plus in-memory reference services and a CLI surface
//! used for local runs and integration tests.

/// Application bootstrap and the running [`Program`] handle.
pub mod bootstrap;
/// Command-line argument parsing.
pub mod cli;
/// Application-level error type.
pub mod error;
/// In-memory reference implementations of the external services.
pub mod services;

pub use bootstrap::Program;
pub use error::{AppError, AppResult};
