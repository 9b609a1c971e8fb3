//! Metric fetcher
//!
//! Queries every selected catalog entry over a short trailing window and
//! reduces each answer to one value. A failing metric never aborts the pass:
//! it is logged and reported as 0, so the result always covers every selected
//! catalog entry.

use super::catalog::{self, MetricDefinition};
use crate::aws::{Datapoint, StatisticsQuery, StatisticsSource};
use crate::defaults::{DEFAULT_CONCURRENCY, LOOKBACK_SECS, PERIOD_SECS};
use crate::error::MetricFetchError;
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Metric name → value for one polling pass
pub type MetricValues = HashMap<&'static str, f64>;

/// Time range and granularity of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period_secs: i32,
}

impl FetchWindow {
    /// Trailing window of [`LOOKBACK_SECS`] ending at `now`
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::seconds(LOOKBACK_SECS),
            end: now,
            period_secs: PERIOD_SECS,
        }
    }
}

/// Successful result of fetching one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchOutcome {
    /// Value of the earliest datapoint in the window
    Value(f64),
    /// No data for an extended metric; the connection likely doesn't report it
    Unsupported,
}

impl FetchOutcome {
    /// Value to report (0 when unsupported)
    pub fn value(self) -> f64 {
        match self {
            FetchOutcome::Value(v) => v,
            FetchOutcome::Unsupported => 0.0,
        }
    }
}

/// Fetches the Direct Connect metric set for one connection
pub struct MetricFetcher<S> {
    source: S,
    connection_id: String,
    extended: bool,
    concurrency: usize,
}

impl<S: StatisticsSource> MetricFetcher<S> {
    pub fn new(source: S, connection_id: impl Into<String>, extended: bool) -> Self {
        Self {
            source,
            connection_id: connection_id.into(),
            extended,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit the number of requests in flight (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn extended(&self) -> bool {
        self.extended
    }

    /// Fetch every selected metric over the window ending now
    pub async fn fetch_all(&self) -> MetricValues {
        self.fetch_all_at(Utc::now()).await
    }

    /// Fetch every selected metric over the window ending at `now`.
    ///
    /// The key set depends only on the extended flag and the catalog.
    pub async fn fetch_all_at(&self, now: DateTime<Utc>) -> MetricValues {
        let window = FetchWindow::ending_at(now);
        let window = &window;

        let values: Vec<(&'static str, f64)> = stream::iter(catalog::selected(self.extended))
            .map(|metric| async move {
                let value = match self.fetch_metric(metric, window).await {
                    Ok(outcome) => outcome.value(),
                    Err(e) => {
                        let api_error = e.is_api_error();
                        let error = anyhow::Error::new(e);
                        warn!(
                            metric = %metric.name,
                            connection_id = %self.connection_id,
                            api_error,
                            error = %format!("{error:#}"),
                            "Metric fetch failed, reporting 0"
                        );
                        0.0
                    }
                };
                (metric.name, value)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        values.into_iter().collect()
    }

    /// Fetch a single metric over `window`
    pub async fn fetch_metric(
        &self,
        metric: &MetricDefinition,
        window: &FetchWindow,
    ) -> Result<FetchOutcome, MetricFetchError> {
        let query = StatisticsQuery {
            metric_name: metric.name,
            connection_id: self.connection_id.clone(),
            statistic: metric.statistic,
            start_time: window.start,
            end_time: window.end,
            period_secs: window.period_secs,
        };

        let datapoints =
            self.source
                .get_statistics(&query)
                .await
                .map_err(|source| MetricFetchError::Api {
                    metric: metric.name,
                    connection_id: self.connection_id.clone(),
                    source,
                })?;

        match earliest_value(&datapoints) {
            Some(value) => {
                debug!(metric = %metric.name, value, "Got metric");
                Ok(FetchOutcome::Value(value))
            }
            None if metric.extended && self.extended => {
                info!(
                    metric = %metric.name,
                    connection_id = %self.connection_id,
                    "fetch no datapoints (metric may not be supported)"
                );
                Ok(FetchOutcome::Unsupported)
            }
            None => Err(MetricFetchError::NoDatapoints {
                metric: metric.name,
                connection_id: self.connection_id.clone(),
            }),
        }
    }
}

/// Value of the datapoint with the earliest timestamp.
///
/// The newest datapoint of a Direct Connect metric is often still being
/// revised upstream; the oldest one in the window is the latest stable one.
pub fn earliest_value(datapoints: &[Datapoint]) -> Option<f64> {
    datapoints
        .iter()
        .min_by_key(|dp| dp.timestamp)
        .map(|dp| dp.value)
}
