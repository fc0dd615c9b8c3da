pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod plugin;
pub mod reducer;
pub mod report;
pub mod transport;

pub use catalog::{GraphSpec, MetricCatalog, MetricSpec};
pub use config::{PluginConfig, PluginOptions, Region};
pub use error::{NasMetricsError, Result};
pub use models::{FetchResult, MetricQuery, MetricSeries, ReducedValue};
pub use orchestrator::FetchOrchestrator;
pub use plugin::NasPlugin;
pub use transport::{HttpTransport, MetricsTransport};
