//! Test helpers shared by unit and integration tests.
//!
//! Compiled for unit tests and behind the `test-utils` feature, which the
//! integration tests enable.
//!
//! [`FakeStatisticsSource`] answers statistics queries from memory so the
//! fetcher can be exercised without AWS.

use crate::aws::{Datapoint, StatisticsQuery, StatisticsSource};
use crate::metrics::Statistic;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned response for one metric
#[derive(Debug, Clone)]
enum Response {
    Datapoints(Vec<Datapoint>),
    Error(String),
}

/// In-memory [`StatisticsSource`].
///
/// Metrics without a canned response return no datapoints. Every query is
/// recorded and can be inspected with [`FakeStatisticsSource::queries`].
#[derive(Debug, Default)]
pub struct FakeStatisticsSource {
    responses: HashMap<String, Response>,
    queries: Mutex<Vec<StatisticsQuery>>,
}

impl FakeStatisticsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries for `metric` with these datapoints
    pub fn with_datapoints(mut self, metric: &str, datapoints: Vec<Datapoint>) -> Self {
        self.responses
            .insert(metric.to_string(), Response::Datapoints(datapoints));
        self
    }

    /// Fail queries for `metric` with this message
    pub fn with_error(mut self, metric: &str, message: &str) -> Self {
        self.responses
            .insert(metric.to_string(), Response::Error(message.to_string()));
        self
    }

    /// All queries received so far, in arrival order
    pub fn queries(&self) -> Vec<StatisticsQuery> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl StatisticsSource for FakeStatisticsSource {
    async fn get_statistics(&self, query: &StatisticsQuery) -> Result<Vec<Datapoint>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }

        match self.responses.get(query.metric_name) {
            Some(Response::Datapoints(points)) => Ok(points.clone()),
            Some(Response::Error(message)) => Err(anyhow!("{message}")),
            None => Ok(Vec::new()),
        }
    }
}

/// Build a datapoint
pub fn datapoint(timestamp: DateTime<Utc>, statistic: Statistic, value: f64) -> Datapoint {
    Datapoint {
        timestamp,
        statistic,
        value,
    }
}

/// Get the AWS region for live tests.
///
/// Checks `AWS_REGION`, then `AWS_DEFAULT_REGION`, then falls back to
/// us-east-1.
pub fn test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-1".to_string())
}

/// Test fixtures for run configuration
#[cfg(test)]
pub mod fixtures {
    use crate::config::{AwsConfig, FetchConfig, RunConfig, TargetConfig, default_timeout};

    /// Create a minimal valid RunConfig for testing
    pub fn test_run_config() -> RunConfig {
        RunConfig {
            aws: AwsConfig {
                region: Some("us-east-1".to_string()),
                timeout: default_timeout(),
                ..Default::default()
            },
            target: TargetConfig {
                connection_id: "dxcon-fgabc123".to_string(),
                prefix: String::new(),
            },
            fetch: FetchConfig::default(),
        }
    }
}
