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

//! The `Service` trait, the closed service-role tags, and the service
//! registry (component C7).

mod error;
mod kind;
mod registry;
mod service;

pub use error::{ServiceError, ServiceResult};
pub use kind::{ServiceKind, SourceKind};
pub use registry::ServiceRegistry;
pub use service::Service;
