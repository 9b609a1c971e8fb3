//! Direct Connect CloudWatch metrics
//!
//! This module is the single source of truth for the namespace, dimension
//! and metric names. The fetcher and the graph schema both refer to these
//! constants so a graph can never point at a metric that is not fetched.

pub mod catalog;
pub mod fetcher;
pub mod graph;

pub use catalog::{CATALOG, MetricDefinition, Statistic};
pub use fetcher::{FetchOutcome, FetchWindow, MetricFetcher, MetricValues};
pub use graph::{Graph, GraphMetric, Unit};

use aws_sdk_cloudwatch::types::Dimension;

/// CloudWatch namespace for Direct Connect
pub const NAMESPACE: &str = "AWS/DX";

/// Dimension names
pub mod dimensions {
    pub const CONNECTION_ID: &str = "ConnectionId";
}

/// Metric names as published by Direct Connect
pub mod names {
    pub const CONNECTION_STATE: &str = "ConnectionState";
    pub const CONNECTION_ENCRYPTION_STATE: &str = "ConnectionEncryptionState";
    pub const CONNECTION_BPS_EGRESS: &str = "ConnectionBpsEgress";
    pub const CONNECTION_BPS_INGRESS: &str = "ConnectionBpsIngress";
    pub const CONNECTION_PPS_EGRESS: &str = "ConnectionPpsEgress";
    pub const CONNECTION_PPS_INGRESS: &str = "ConnectionPpsIngress";
    pub const CONNECTION_LIGHT_LEVEL_TX: &str = "ConnectionLightLevelTx";
    pub const CONNECTION_LIGHT_LEVEL_RX: &str = "ConnectionLightLevelRx";
    pub const CONNECTION_ERROR_COUNT: &str = "ConnectionErrorCount";
}

/// Build the dimension vector that scopes a query to one connection.
pub fn build_dimensions(connection_id: &str) -> Vec<Dimension> {
    vec![
        Dimension::builder()
            .name(dimensions::CONNECTION_ID)
            .value(connection_id)
            .build(),
    ]
}
