//! Service registry: holds every collaborator and enforces the pipeline's
//! startup validity rule.

use std::sync::Arc;

use crate::{Service, ServiceError, ServiceKind, ServiceResult, SourceKind};

/// Groups every registered [`Service`] by role and validates that the
/// pipeline has enough collaborators wired in to actually run.
///
/// Grounded on `revaer-app::orchestrator::spawn_libtorrent_orchestrator`'s
/// construction-then-validate sequencing, generalized from a single engine
/// to the closed set of pipeline roles.
pub struct ServiceRegistry {
    sources: Vec<(SourceKind, Arc<dyn Service>)>,
    indexer: Option<Arc<dyn Service>>,
    scraper: Option<Arc<dyn Service>>,
    downloader: Option<Arc<dyn Service>>,
    symlinker: Option<Arc<dyn Service>>,
    library_notifier: Option<Arc<dyn Service>>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistry {
    /// Construct an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Vec::new(),
            indexer: None,
            scraper: None,
            downloader: None,
            symlinker: None,
            library_notifier: None,
        }
    }

    /// Register a source under `kind`.
    pub fn with_source(mut self, kind: SourceKind, service: Arc<dyn Service>) -> Self {
        self.sources.push((kind, service));
        self
    }

    /// Register the (singleton) indexer.
    #[must_use]
    pub fn with_indexer(mut self, service: Arc<dyn Service>) -> Self {
        self.indexer = Some(service);
        self
    }

    /// Register the (singleton) scraper.
    #[must_use]
    pub fn with_scraper(mut self, service: Arc<dyn Service>) -> Self {
        self.scraper = Some(service);
        self
    }

    /// Register the (singleton) downloader.
    #[must_use]
    pub fn with_downloader(mut self, service: Arc<dyn Service>) -> Self {
        self.downloader = Some(service);
        self
    }

    /// Register the (singleton) symlinker.
    #[must_use]
    pub fn with_symlinker(mut self, service: Arc<dyn Service>) -> Self {
        self.symlinker = Some(service);
        self
    }

    /// Register the (singleton) library notifier.
    #[must_use]
    pub fn with_library_notifier(mut self, service: Arc<dyn Service>) -> Self {
        self.library_notifier = Some(service);
        self
    }

    /// Resolve the singleton service registered for `kind`, if any. Source
    /// services are not resolved this way; iterate [`Self::sources`]
    /// instead, since there may be more than one.
    #[must_use]
    pub fn resolve(&self, kind: ServiceKind) -> Option<Arc<dyn Service>> {
        match kind {
            ServiceKind::Indexer => self.indexer.clone(),
            ServiceKind::Scraper => self.scraper.clone(),
            ServiceKind::Downloader => self.downloader.clone(),
            ServiceKind::Symlinker => self.symlinker.clone(),
            ServiceKind::LibraryNotifier => self.library_notifier.clone(),
            ServiceKind::Source(_) => None,
        }
    }

    /// Every registered source, with its kind tag.
    #[must_use]
    pub fn sources(&self) -> &[(SourceKind, Arc<dyn Service>)] {
        &self.sources
    }

    /// Every service registered for polling by the Scheduler: sources and
    /// the library notifier.
    #[must_use]
    pub fn polled_services(&self) -> Vec<(ServiceKind, Arc<dyn Service>)> {
        let mut polled: Vec<(ServiceKind, Arc<dyn Service>)> = self
            .sources
            .iter()
            .map(|(kind, service)| (ServiceKind::Source(*kind), Arc::clone(service)))
            .collect();
        if let Some(notifier) = &self.library_notifier {
            polled.push((ServiceKind::LibraryNotifier, Arc::clone(notifier)));
        }
        polled
    }

    /// Validate the startup rule: at least one source, at least one
    /// library notifier, an initialized indexer, and every processing
    /// service (scraper, downloader, symlinker) present and initialized.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRegistry`] describing the first
    /// requirement that is not met.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.sources.is_empty() {
            return Err(invalid("at least one source service is required"));
        }
        if self.library_notifier.is_none() {
            return Err(invalid("a library notifier service is required"));
        }
        let Some(indexer) = &self.indexer else {
            return Err(invalid("an indexer service is required"));
        };
        if !indexer.initialized() {
            return Err(invalid("the indexer service is not initialized"));
        }
        for (label, service) in [
            ("scraper", &self.scraper),
            ("downloader", &self.downloader),
            ("symlinker", &self.symlinker),
        ] {
            let Some(service) = service else {
                return Err(invalid(format!("a {label} service is required")));
            };
            if !service.initialized() {
                return Err(invalid(format!("the {label} service is not initialized")));
            }
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ServiceError {
    ServiceError::InvalidRegistry {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_model::MediaItem;
    use async_trait::async_trait;

    struct Stub {
        name: &'static str,
        initialized: bool,
    }

    #[async_trait]
    impl Service for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(&self, _item: Option<MediaItem>) -> anyhow::Result<Vec<MediaItem>> {
            Ok(Vec::new())
        }

        fn initialized(&self) -> bool {
            self.initialized
        }
    }

    fn stub(name: &'static str) -> Arc<dyn Service> {
        Arc::new(Stub {
            name,
            initialized: true,
        })
    }

    #[test]
    fn empty_registry_is_invalid() {
        let registry = ServiceRegistry::new();
        assert!(registry.validate().is_err());
    }

    #[test]
    fn fully_wired_registry_is_valid() {
        let registry = ServiceRegistry::new()
            .with_source(SourceKind::Watchlist, stub("plex-watchlist"))
            .with_indexer(stub("trakt-indexer"))
            .with_scraper(stub("scraper"))
            .with_downloader(stub("downloader"))
            .with_symlinker(stub("symlinker"))
            .with_library_notifier(stub("plex"));
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn uninitialized_indexer_fails_validation() {
        let registry = ServiceRegistry::new()
            .with_source(SourceKind::Watchlist, stub("plex-watchlist"))
            .with_indexer(Arc::new(Stub {
                name: "trakt-indexer",
                initialized: false,
            }))
            .with_scraper(stub("scraper"))
            .with_downloader(stub("downloader"))
            .with_symlinker(stub("symlinker"))
            .with_library_notifier(stub("plex"));
        assert!(registry.validate().is_err());
    }
}
