use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};

/// Lookback window for a single query. Wide enough to always cover at least
/// one aggregation bucket of the remote API.
pub const LOOKBACK_SECS: i64 = 180;

/// Timestamp layout expected by the statistics API (always UTC).
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identifies the monitored instance a query targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn nas_instance(identifier: impl Into<String>) -> Self {
        Self {
            name: "NASInstanceIdentifier".to_string(),
            value: identifier.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub metric_name: String,
    pub dimension: Dimension,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MetricQuery {
    /// Query covering `[now - LOOKBACK_SECS, now)`.
    pub fn latest(
        metric_name: impl Into<String>,
        dimension: Dimension,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            dimension,
            start: now - Duration::seconds(LOOKBACK_SECS),
            end: now,
        }
    }

    /// Request parameters, sorted by key, excluding `Action`.
    pub fn to_params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("MetricName", self.metric_name.clone());
        params.insert("Dimensions.member.1.Name", self.dimension.name.clone());
        params.insert("Dimensions.member.1.Value", self.dimension.value.clone());
        params.insert("StartTime", self.start.format(WIRE_TIME_FORMAT).to_string());
        params.insert("EndTime", self.end.format(WIRE_TIME_FORMAT).to_string());
        params
    }
}

/// How a bucket reports its value.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// Sum over the bucket plus the number of samples it covers.
    SumCount { sum: f64, sample_count: u64 },
    /// Value reported directly, still in its wire text form.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub aggregate: Aggregate,
}

/// Datapoints returned for one query. Order carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric_name: String,
    pub points: Vec<DataPoint>,
}

impl MetricSeries {
    pub fn new(metric_name: impl Into<String>, points: Vec<DataPoint>) -> Self {
        Self {
            metric_name: metric_name.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReducedValue {
    pub metric_name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Metric name to latest value. Only metrics that were fetched successfully
/// are present.
pub type FetchResult = HashMap<String, f64>;
