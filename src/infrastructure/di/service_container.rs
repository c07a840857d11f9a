//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::ImportService;
use crate::config::Settings;
use crate::domain::UnresolvedMembers;
use crate::infrastructure::document::TomlDocumentStore;
use crate::infrastructure::traits::{DocumentStore, Selector, SkimSelector};

/// Container holding settings and the boundary implementations.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Document store abstraction
    pub store: Arc<dyn DocumentStore>,

    /// Interactive picker abstraction
    pub selector: Arc<dyn Selector>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(TomlDocumentStore),
            Arc::new(SkimSelector),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        store: Arc<dyn DocumentStore>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            store,
            selector,
        }
    }

    /// Build an import service, optionally overriding the configured
    /// unresolved-member policy.
    pub fn import_service(&self, policy: Option<UnresolvedMembers>) -> ImportService {
        ImportService::new(
            self.store.clone(),
            policy.unwrap_or(self.settings.on_unresolved),
        )
    }
}
