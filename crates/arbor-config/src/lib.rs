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

//! Static, file-loaded settings for an `arbor` pipeline instance.
//!
//! Scaled down from `revaer-config`'s Postgres-backed, hot-reloadable
//! settings service: this core has no multi-tenant HTTP API to serve
//! live config changes to, so a validated TOML file loaded once at
//! startup is enough (see `DESIGN.md` for the dropped dependencies).

mod error;
mod model;

pub use error::{ConfigError, ConfigResult};
pub use model::{
    DEFAULT_RETRY_SWEEP_SECS, DEFAULT_SEASON_SCRAPER_DROP_AT, Settings, SourceSettings, Thresholds,
};
