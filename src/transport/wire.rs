//! XML shape of the `GetMetricStatistics` response.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::models::{Aggregate, DataPoint, MetricSeries, WIRE_TIME_FORMAT};
use crate::{NasMetricsError, Result};

#[derive(Debug, Deserialize)]
struct GetMetricStatisticsResponse {
    #[serde(rename = "NiftyGetMetricStatisticsResult")]
    result: GetMetricStatisticsResult,
    #[serde(rename = "ResponseMetadata", default)]
    metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct GetMetricStatisticsResult {
    #[serde(rename = "Datapoints", default)]
    datapoints: Vec<Datapoints>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(rename = "RequestId", default)]
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Datapoints {
    #[serde(rename = "member", default)]
    members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Sum")]
    sum: String,
    #[serde(rename = "SampleCount", default)]
    sample_count: Option<String>,
}

/// Decode a response body into the series for `metric_name`.
pub fn decode_series(metric_name: &str, body: &str) -> Result<MetricSeries> {
    let response: GetMetricStatisticsResponse = quick_xml::de::from_str(body)?;
    if let Some(request_id) = response.metadata.and_then(|m| m.request_id) {
        tracing::trace!(metric = metric_name, %request_id, "decoded statistics response");
    }

    let points = response
        .result
        .datapoints
        .into_iter()
        .flat_map(|group| group.members)
        .map(|member| member.into_point())
        .collect::<Result<Vec<_>>>()?;

    Ok(MetricSeries::new(metric_name, points))
}

impl Member {
    fn into_point(self) -> Result<DataPoint> {
        let timestamp = parse_timestamp(&self.timestamp)?;
        let aggregate = match self.sample_count {
            Some(count) => Aggregate::SumCount {
                sum: parse_number::<f64>(&self.sum).and_then(finite_sum)?,
                sample_count: parse_number::<f64>(&count).and_then(sample_count)?,
            },
            None => Aggregate::Raw(self.sum),
        };
        Ok(DataPoint { timestamp, aggregate })
    }
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, WIRE_TIME_FORMAT).map(|ts| ts.and_utc())
        })
        .map_err(|e| NasMetricsError::Decode(format!("invalid timestamp {:?}: {}", text, e)))
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| NasMetricsError::Decode(format!("invalid number {:?}", text)))
}

fn finite_sum(sum: f64) -> Result<f64> {
    if sum.is_finite() {
        Ok(sum)
    } else {
        Err(NasMetricsError::Decode(format!("invalid sum {}", sum)))
    }
}

// Counts arrive as "3" or "3.0".
fn sample_count(count: f64) -> Result<u64> {
    if count.is_finite() && count >= 0.0 && count.fract() == 0.0 {
        Ok(count as u64)
    } else {
        Err(NasMetricsError::Decode(format!("invalid sample count {}", count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    const RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<NiftyGetMetricStatisticsResponse xmlns="https://nas.api.cloud.nifty.com/doc/2016-02-24/">
  <NiftyGetMetricStatisticsResult>
    <Datapoints>
      <member>
        <NiftyTargetName>nas01</NiftyTargetName>
        <Timestamp>2024-03-01T11:58:00Z</Timestamp>
        <Sum>20</Sum>
        <SampleCount>2</SampleCount>
      </member>
      <member>
        <NiftyTargetName>nas01</NiftyTargetName>
        <Timestamp>2024-03-01T11:59:00Z</Timestamp>
        <Sum>45.0</Sum>
        <SampleCount>3.0</SampleCount>
      </member>
    </Datapoints>
    <Label>ReadIOPS</Label>
  </NiftyGetMetricStatisticsResult>
  <ResponseMetadata>
    <RequestId>5ec5d2a1-0000-4000-8000-000000000000</RequestId>
  </ResponseMetadata>
</NiftyGetMetricStatisticsResponse>"#;

    #[test]
    fn test_decode_sum_count() {
        let series = decode_series("ReadIOPS", RESPONSE).unwrap();

        assert_eq!(series.metric_name, "ReadIOPS");
        assert_eq!(series.points.len(), 2);
        assert_eq!(
            series.points[1],
            DataPoint {
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 11, 59, 0).unwrap(),
                aggregate: Aggregate::SumCount { sum: 45.0, sample_count: 3 },
            }
        );
    }

    #[test]
    fn test_decode_empty_datapoints() {
        let body = r#"<NiftyGetMetricStatisticsResponse>
  <NiftyGetMetricStatisticsResult>
    <Datapoints/>
    <Label>FreeStorageSpace</Label>
  </NiftyGetMetricStatisticsResult>
</NiftyGetMetricStatisticsResponse>"#;
        let series = decode_series("FreeStorageSpace", body).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_decode_raw_value_and_wire_timestamp() {
        let body = r#"<NiftyGetMetricStatisticsResponse>
  <NiftyGetMetricStatisticsResult>
    <Datapoints>
      <member>
        <Timestamp>2024-03-01 11:59:00</Timestamp>
        <Sum>1024.5</Sum>
      </member>
    </Datapoints>
  </NiftyGetMetricStatisticsResult>
</NiftyGetMetricStatisticsResponse>"#;
        let series = decode_series("UsedStorageSpace", body).unwrap();

        assert_eq!(series.points[0].aggregate, Aggregate::Raw("1024.5".to_string()));
        assert_eq!(
            series.points[0].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 11, 59, 0).unwrap()
        );
    }

    #[test]
    fn test_bad_timestamp_fails_whole_series() {
        let body = RESPONSE.replace("2024-03-01T11:59:00Z", "yesterday");
        let err = decode_series("ReadIOPS", &body).unwrap_err();
        assert_eq!(err.reason(), "decode");
    }

    #[test]
    fn test_unexpected_document() {
        let body = "<html><body>Service Unavailable</body></html>";
        assert!(matches!(decode_series("ReadIOPS", body), Err(NasMetricsError::Decode(_))));
    }

    #[test]
    fn test_fractional_sample_count_rejected() {
        let body = RESPONSE.replace(
            "<SampleCount>2</SampleCount>",
            "<SampleCount>2.5</SampleCount>",
        );
        assert!(matches!(decode_series("ReadIOPS", &body), Err(NasMetricsError::Decode(_))));
    }

    #[test]
    fn test_non_finite_sum_rejected() {
        for sum in ["NaN", "inf"] {
            let body = RESPONSE.replace("<Sum>20</Sum>", &format!("<Sum>{}</Sum>", sum));
            let err = decode_series("ReadIOPS", &body).unwrap_err();
            assert_eq!(err.reason(), "decode", "sum {:?}", sum);
        }
    }
}
