//! Static description of the metrics the plugin fetches and how they are
//! grouped into graphs.

use std::collections::HashSet;

use serde::Serialize;

pub const DEFAULT_KEY_PREFIX: &str = "nas";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSpec {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSpec {
    #[serde(skip)]
    pub key: String,
    pub label: String,
    pub unit: String,
    pub metrics: Vec<MetricSpec>,
}

#[derive(Debug, Clone)]
pub struct MetricCatalog {
    key_prefix: String,
    graphs: Vec<GraphSpec>,
}

impl MetricCatalog {
    pub fn new(key_prefix: impl Into<String>, graphs: Vec<GraphSpec>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            graphs,
        }
    }

    /// Graphs for a NAS instance. Graph keys are `<key_prefix>.<Graph>` and
    /// labels are `<label_prefix> <Graph Label>`.
    pub fn nas(key_prefix: &str, label_prefix: &str) -> Self {
        let graph = |suffix: &str, label: &str, unit: &str, metrics: &[(&str, &str)]| GraphSpec {
            key: format!("{}.{}", key_prefix, suffix),
            label: format!("{} {}", label_prefix, label),
            unit: unit.to_string(),
            metrics: metrics
                .iter()
                .map(|(name, label)| MetricSpec {
                    name: name.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        };

        Self::new(
            key_prefix,
            vec![
                graph(
                    "FreeStorageSpace",
                    "Free Storage Space",
                    "bytes",
                    &[("FreeStorageSpace", "FreeStorageSpace")],
                ),
                graph(
                    "UsedStorageSpace",
                    "Used Storage Space",
                    "bytes",
                    &[("UsedStorageSpace", "UsedStorageSpace")],
                ),
                graph(
                    "ActiveConnections",
                    "Active Connections",
                    "float",
                    &[("ActiveConnections", "ActiveConnections")],
                ),
                graph("IOPS", "IOPS", "iops", &[("ReadIOPS", "Read"), ("WriteIOPS", "Write")]),
                graph(
                    "Throughput",
                    "Throughput",
                    "bytes/sec",
                    &[("ReadThroughput", "Read"), ("WriteThroughput", "Write")],
                ),
                graph(
                    "GlobalTraffic",
                    "Global Traffic",
                    "bytes/sec",
                    &[("GlobalReadTraffic", "Read"), ("GlobalWriteTraffic", "Write")],
                ),
                graph(
                    "PrivateTraffic",
                    "Private Traffic",
                    "bytes/sec",
                    &[("PrivateReadTraffic", "Read"), ("PrivateWriteTraffic", "Write")],
                ),
            ],
        )
    }

    pub fn graphs(&self) -> &[GraphSpec] {
        &self.graphs
    }

    /// Every metric name across all graphs, duplicates removed, in first-seen
    /// order.
    pub fn metric_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.graphs
            .iter()
            .flat_map(|graph| graph.metrics.iter())
            .map(|metric| metric.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn contains(&self, metric_name: &str) -> bool {
        self.graphs
            .iter()
            .any(|graph| graph.metrics.iter().any(|metric| metric.name == metric_name))
    }

    pub fn key_prefix(&self) -> &str {
        if self.key_prefix.is_empty() {
            DEFAULT_KEY_PREFIX
        } else {
            self.key_prefix.as_str()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nas_catalog() {
        let catalog = MetricCatalog::nas("nas", "NAS");

        assert_eq!(catalog.graphs().len(), 7);
        let iops = &catalog.graphs()[3];
        assert_eq!(iops.key, "nas.IOPS");
        assert_eq!(iops.label, "NAS IOPS");
        assert_eq!(iops.unit, "iops");
        assert_eq!(
            iops.metrics[1],
            MetricSpec { name: "WriteIOPS".into(), label: "Write".into() }
        );

        assert_eq!(
            catalog.metric_names(),
            vec![
                "FreeStorageSpace",
                "UsedStorageSpace",
                "ActiveConnections",
                "ReadIOPS",
                "WriteIOPS",
                "ReadThroughput",
                "WriteThroughput",
                "GlobalReadTraffic",
                "GlobalWriteTraffic",
                "PrivateReadTraffic",
                "PrivateWriteTraffic",
            ]
        );
    }

    #[test]
    fn test_metric_names_deduplicated() {
        let graph = |key: &str, names: &[&str]| GraphSpec {
            key: key.into(),
            label: key.to_uppercase(),
            unit: "float".into(),
            metrics: names
                .iter()
                .map(|name| MetricSpec { name: name.to_string(), label: name.to_string() })
                .collect(),
        };
        let catalog =
            MetricCatalog::new("custom", vec![graph("a", &["X", "Y"]), graph("b", &["Y", "Z"])]);

        assert_eq!(catalog.metric_names(), vec!["X", "Y", "Z"]);
        assert!(catalog.contains("Z"));
        assert!(!catalog.contains("W"));
    }

    #[test]
    fn test_key_prefix_fallback() {
        assert_eq!(MetricCatalog::new("", vec![]).key_prefix(), "nas");
        assert_eq!(MetricCatalog::nas("filer", "Filer").key_prefix(), "filer");
        assert!(MetricCatalog::new("x", vec![]).metric_names().is_empty());
    }
}
