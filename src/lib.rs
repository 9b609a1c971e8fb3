//! dxcon-monitor - CloudWatch metrics for AWS Direct Connect connections
//!
//! Library behind the `mackerel-plugin-aws-dx-con` binary. One invocation
//! resolves AWS credentials once, fetches the Direct Connect metric set for
//! a single connection and prints it in the mackerel-agent plugin format.
//!
//! ## Modules
//!
//! - [`aws`]: credential resolution and the CloudWatch client
//! - [`metrics`]: metric catalog, fetcher and graph definitions
//! - [`plugin`]: mackerel-agent plugin output
//! - [`config`] / [`defaults`]: run configuration
//! - [`error`]: configuration and per-metric errors

pub mod aws;
pub mod config;
pub mod defaults;
pub mod error;
pub mod metrics;
pub mod plugin;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{ConfigError, MetricFetchError};
