//! Error types
//!
//! Only [`ConfigError`] stops a run. [`MetricFetchError`] is absorbed by the
//! fetcher, logged, and replaced with a zero value.

use thiserror::Error;

/// Credential resolution or client construction failed
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `--region` nor the ambient chain produced a region
    #[error("No AWS region configured (pass --region or set AWS_DEFAULT_REGION)")]
    MissingRegion,

    /// The selected credential source could not produce credentials
    #[error("Failed to resolve AWS credentials via {source_kind}")]
    Credentials {
        source_kind: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The monitored connection was not specified
    #[error("Direct Connect connection id is required (--direct-connect-connection)")]
    MissingConnection,
}

/// A single metric could not be fetched
#[derive(Debug, Error)]
pub enum MetricFetchError {
    /// The CloudWatch call itself failed
    #[error("Failed to get statistics for {metric} on {connection_id}")]
    Api {
        metric: &'static str,
        connection_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// A required metric returned no datapoints in the window
    #[error("fetch no datapoints ({metric}): {connection_id}")]
    NoDatapoints {
        metric: &'static str,
        connection_id: String,
    },
}

impl MetricFetchError {
    /// Name of the metric this error belongs to
    pub fn metric(&self) -> &'static str {
        match self {
            MetricFetchError::Api { metric, .. } | MetricFetchError::NoDatapoints { metric, .. } => {
                metric
            }
        }
    }

    /// Check if this was a transport/API failure rather than an empty window
    pub fn is_api_error(&self) -> bool {
        matches!(self, MetricFetchError::Api { .. })
    }
}
