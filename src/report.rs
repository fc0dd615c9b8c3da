//! Text emitted for the host agent: value lines and graph definitions.

use serde_json::{json, Map, Value};

use crate::catalog::MetricCatalog;
use crate::models::FetchResult;

/// Environment variable the host sets when it wants graph definitions.
pub const META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

/// `<graph key>.<metric>\t<value>\t<epoch>` for every fetched metric, in
/// catalog order.
pub fn value_lines(catalog: &MetricCatalog, result: &FetchResult, epoch: i64) -> Vec<String> {
    catalog
        .graphs()
        .iter()
        .flat_map(|graph| {
            graph.metrics.iter().filter_map(move |metric| {
                result
                    .get(&metric.name)
                    .map(|value| format!("{}.{}\t{}\t{}", graph.key, metric.name, value, epoch))
            })
        })
        .collect()
}

pub fn graph_definition_json(catalog: &MetricCatalog) -> Value {
    let graphs: Map<String, Value> = catalog
        .graphs()
        .iter()
        .map(|graph| (graph.key.clone(), json!(graph)))
        .collect();
    json!({ "graphs": graphs })
}
