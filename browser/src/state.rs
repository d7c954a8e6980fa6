use ontobrowse_config::{BrowserConfig, ResourceRegistry};
use ontobrowse_models::Resource;
use std::sync::Arc;

use crate::errors::{BrowserError, BrowserResult};
use crate::services::{DatabaseLocator, SqliteExporter, TemplateRenderer, TermExporter};

/// Built once at start-up and shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BrowserConfig>,
    pub databases: DatabaseLocator,
    pub exporter: Arc<dyn TermExporter>,
    pub templates: Arc<TemplateRenderer>,
}

impl AppState {
    pub fn new(config: BrowserConfig) -> Self {
        Self::with_exporter(config, Arc::new(SqliteExporter::new()))
    }

    pub fn with_exporter(config: BrowserConfig, exporter: Arc<dyn TermExporter>) -> Self {
        Self {
            databases: DatabaseLocator::new(&config),
            templates: Arc::new(TemplateRenderer::new(config.templates_dir.clone())),
            exporter,
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.config.registry
    }

    /// Looks up a resource code, rejecting unknown codes before any database access.
    pub fn resource(&self, code: &str) -> BrowserResult<&Resource> {
        self.registry()
            .lookup(code)
            .ok_or_else(|| BrowserError::NotFound(format!("Unknown resource: {code}")))
    }

    /// Resource served under `/ontology`.
    pub fn default_resource(&self) -> BrowserResult<&Resource> {
        self.resource(&self.config.default_resource)
    }
}
