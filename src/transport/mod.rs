pub mod signer;
pub mod wire;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::debug;
use url::{form_urlencoded, Url};

use crate::config::{Credentials, PluginConfig};
use crate::models::{MetricQuery, MetricSeries};
use crate::{NasMetricsError, Result};

use self::signer::Signer;

pub const SERVICE: &str = "nas";
pub const ACTION: &str = "GetMetricStatistics";

const ERROR_BODY_LIMIT: usize = 256;

/// Sends one statistics query and returns the raw datapoints.
#[async_trait]
pub trait MetricsTransport: Send + Sync {
    async fn fetch(&self, query: &MetricQuery) -> Result<MetricSeries>;
}

/// Signed form POSTs against the NAS API endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    signer: Signer,
}

impl HttpTransport {
    pub fn new(
        endpoint: &str,
        region: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            signer: Signer::new(credentials, region, SERVICE),
        })
    }

    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        Self::new(
            &config.endpoint,
            config.region.as_str(),
            config.credentials.clone(),
            config.timeout,
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Form-encoded request body for `query`, keys in sorted order.
pub fn encode_body(query: &MetricQuery) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("Action", ACTION);
    for (key, value) in query.to_params() {
        serializer.append_pair(key, &value);
    }
    serializer.finish()
}

#[async_trait]
impl MetricsTransport for HttpTransport {
    async fn fetch(&self, query: &MetricQuery) -> Result<MetricSeries> {
        let body = encode_body(query);
        let headers = self.signer.sign(&self.endpoint, &body, Utc::now())?;

        debug!(
            metric = %query.metric_name,
            endpoint = %self.endpoint,
            "requesting metric statistics"
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let snippet: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(NasMetricsError::Transport(format!(
                "{} returned {}: {}",
                ACTION, status, snippet
            )));
        }

        wire::decode_series(&query.metric_name, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Aggregate, Dimension};
    use chrono::TimeZone;
    use httpmock::{Method::POST, MockServer};
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    const BODY: &str = r#"<NiftyGetMetricStatisticsResponse>
  <NiftyGetMetricStatisticsResult>
    <Datapoints>
      <member>
        <Timestamp>2024-03-01T11:59:00Z</Timestamp>
        <Sum>300</Sum>
        <SampleCount>4</SampleCount>
      </member>
    </Datapoints>
  </NiftyGetMetricStatisticsResult>
</NiftyGetMetricStatisticsResponse>"#;

    const AUTH_FAILURE: &str =
        "<Response><Errors><Error><Code>AuthFailure</Code></Error></Errors></Response>";

    fn query() -> MetricQuery {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        MetricQuery::latest("WriteIOPS", Dimension::nas_instance("nas01"), now)
    }

    fn transport(server: &MockServer) -> HttpTransport {
        HttpTransport::new(
            &server.url("/"),
            "east-1",
            Credentials::new("AKID", "SECRET").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_encode_body() {
        assert_eq!(
            encode_body(&query()),
            "Action=GetMetricStatistics\
             &Dimensions.member.1.Name=NASInstanceIdentifier\
             &Dimensions.member.1.Value=nas01\
             &EndTime=2024-03-01+12%3A00%3A00\
             &MetricName=WriteIOPS\
             &StartTime=2024-03-01+11%3A57%3A00"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let credentials = Credentials::new("a", "b").unwrap();
        let result = HttpTransport::new("::nope", "east-1", credentials, Duration::from_secs(1));
        assert!(matches!(result, Err(NasMetricsError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_fetch_signed_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .header_exists("authorization")
                    .header_exists("x-amz-date")
                    .body_contains("Action=GetMetricStatistics")
                    .body_contains("MetricName=WriteIOPS");
                then.status(200).body(BODY);
            })
            .await;

        let series = assert_ok!(transport(&server).fetch(&query()).await);
        mock.assert_async().await;
        assert_eq!(series.metric_name, "WriteIOPS");
        assert_eq!(series.points[0].aggregate, Aggregate::SumCount { sum: 300.0, sample_count: 4 });
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(403).body(AUTH_FAILURE);
            })
            .await;

        let err = assert_err!(transport(&server).fetch(&query()).await);
        assert_eq!(err.reason(), "transport");
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("AuthFailure"));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let server = MockServer::start_async().await;
        let url = server.url("/");
        drop(server);

        let credentials = Credentials::new("a", "b").unwrap();
        let transport =
            HttpTransport::new(&url, "east-1", credentials, Duration::from_secs(1)).unwrap();
        let err = assert_err!(transport.fetch(&query()).await);
        assert_eq!(err.reason(), "transport");
    }
}
