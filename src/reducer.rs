//! Latest-point reduction: pick the most recent datapoint of a series and
//! turn it into a single scalar.

use crate::models::{Aggregate, DataPoint, MetricSeries, ReducedValue};
use crate::{NasMetricsError, Result};

/// Reduce a series to its most recent value.
///
/// The point with the greatest timestamp wins. Among points sharing that
/// timestamp the first one in iteration order is kept.
pub fn reduce(series: &MetricSeries) -> Result<ReducedValue> {
    let mut latest: Option<&DataPoint> = None;
    for point in &series.points {
        match latest {
            Some(current) if point.timestamp <= current.timestamp => {}
            _ => latest = Some(point),
        }
    }

    let point = latest.ok_or_else(|| NasMetricsError::EmptySeries {
        metric: series.metric_name.clone(),
    })?;

    Ok(ReducedValue {
        metric_name: series.metric_name.clone(),
        value: scalar(&series.metric_name, &point.aggregate)?,
        timestamp: point.timestamp,
    })
}

fn scalar(metric: &str, aggregate: &Aggregate) -> Result<f64> {
    match aggregate {
        Aggregate::SumCount { sample_count: 0, .. } => Err(NasMetricsError::DivideByZero {
            metric: metric.to_string(),
        }),
        Aggregate::SumCount { sum, sample_count } => Ok(sum / *sample_count as f64),
        Aggregate::Raw(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| NasMetricsError::MalformedValue {
                metric: metric.to_string(),
                value: text.clone(),
            }),
    }
}
