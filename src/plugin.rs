use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::catalog::{GraphSpec, MetricCatalog};
use crate::config::PluginConfig;
use crate::models::{Dimension, FetchResult, MetricQuery};
use crate::orchestrator::FetchOrchestrator;
use crate::transport::HttpTransport;
use crate::Result;

/// What the host monitoring agent talks to: the catalog plus one fetch per
/// polling cycle.
pub struct NasPlugin {
    catalog: Arc<MetricCatalog>,
    orchestrator: FetchOrchestrator,
    dimension: Dimension,
}

impl NasPlugin {
    pub fn new(
        catalog: Arc<MetricCatalog>,
        orchestrator: FetchOrchestrator,
        dimension: Dimension,
    ) -> Self {
        Self {
            catalog,
            orchestrator,
            dimension,
        }
    }

    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        info!(
            region = %config.region,
            endpoint = %transport.endpoint(),
            identifier = %config.identifier,
            "configured NAS metrics plugin"
        );

        Ok(Self::new(
            Arc::new(MetricCatalog::nas(&config.key_prefix, &config.label_prefix)),
            FetchOrchestrator::new(Arc::new(transport), config.timeout),
            Dimension::nas_instance(config.identifier.clone()),
        ))
    }

    /// One polling cycle: every catalog metric fetched once, failures dropped.
    pub async fn fetch_metrics(&self) -> FetchResult {
        let now = Utc::now();
        let queries = self
            .catalog
            .metric_names()
            .into_iter()
            .map(|name| MetricQuery::latest(name, self.dimension.clone(), now))
            .collect();

        let mut result = self.orchestrator.fetch_all(queries).await;
        result.retain(|name, _| self.catalog.contains(name));
        info!(
            fetched = result.len(),
            expected = self.catalog.metric_names().len(),
            "polling cycle finished"
        );
        result
    }

    pub fn graph_definition(&self) -> &[GraphSpec] {
        self.catalog.graphs()
    }

    pub fn metric_key_prefix(&self) -> &str {
        self.catalog.key_prefix()
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }
}
