//! Concurrent fan-out of metric queries.
//!
//! Every query runs as its own tokio task (fetch, then reduce). Tasks report
//! over an mpsc channel to a single collector, which is the only writer of
//! the result map. All tasks share one deadline so a hung call turns into a
//! logged failure instead of stalling the cycle.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::{self, Instant as Deadline};
use tracing::{debug, warn};

use crate::metrics::{self, FetchTimer};
use crate::models::{FetchResult, MetricQuery};
use crate::reducer;
use crate::transport::MetricsTransport;
use crate::{NasMetricsError, Result};

#[derive(Clone)]
pub struct FetchOrchestrator {
    transport: Arc<dyn MetricsTransport>,
    timeout: Duration,
}

impl FetchOrchestrator {
    pub fn new(transport: Arc<dyn MetricsTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Fetch and reduce every query concurrently. Failed metrics are logged
    /// and left out of the result; this never fails as a whole.
    pub async fn fetch_all(&self, queries: Vec<MetricQuery>) -> FetchResult {
        let started = Instant::now();
        let deadline = Deadline::now() + self.timeout;
        let mut pending: HashSet<String> = queries.iter().map(|q| q.metric_name.clone()).collect();
        let (result_tx, mut result_rx) = mpsc::channel(queries.len().max(1));

        for query in queries {
            let transport = Arc::clone(&self.transport);
            let result_tx = result_tx.clone();
            let timeout = self.timeout;
            tokio::spawn(async move {
                let fetch = fetch_latest(transport.as_ref(), &query);
                let outcome = match time::timeout_at(deadline, fetch).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(NasMetricsError::Timeout(timeout)),
                };
                // The collector only goes away once every sender is dropped.
                let _ = result_tx.send((query.metric_name, outcome)).await;
            });
        }
        drop(result_tx);

        let mut result = FetchResult::new();
        while let Some((name, outcome)) = result_rx.recv().await {
            pending.remove(&name);
            match outcome {
                Ok(value) => {
                    debug!(metric = %name, value, "fetched metric");
                    result.insert(name, value);
                }
                Err(e) => {
                    metrics::record_failure(e.reason());
                    warn!(metric = %name, reason = e.reason(), "{}: {}", name, e);
                }
            }
        }

        for name in pending {
            metrics::record_failure("aborted");
            warn!(metric = %name, "fetch task ended without reporting");
        }

        metrics::record_cycle(started.elapsed().as_secs_f64(), result.len());
        result
    }
}

async fn fetch_latest(transport: &dyn MetricsTransport, query: &MetricQuery) -> Result<f64> {
    let _timer = FetchTimer::new();
    let series = transport.fetch(query).await?;
    Ok(reducer::reduce(&series)?.value)
}
