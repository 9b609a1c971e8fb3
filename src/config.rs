//! Configuration types for a polling run

use crate::aws::CredentialSource;
use crate::defaults::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use crate::error::ConfigError;
use crate::metrics::graph;
use std::time::Duration;

/// AWS client configuration
#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    /// IAM role to assume (takes precedence over static keys)
    pub role_arn: Option<String>,
    /// Static access key id
    pub access_key_id: Option<String>,
    /// Static secret access key
    pub secret_access_key: Option<String>,
    /// Region override; ambient resolution is used when unset
    pub region: Option<String>,
    /// Operation timeout applied to every SDK call
    pub timeout: Duration,
}

impl AwsConfig {
    /// Pick the credential source for this configuration
    pub fn credential_source(&self) -> CredentialSource {
        CredentialSource::select(
            self.role_arn.as_deref(),
            self.access_key_id.as_deref(),
            self.secret_access_key.as_deref(),
        )
    }
}

/// The monitored Direct Connect connection
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Direct Connect connection id (e.g., "dxcon-fgabc123")
    pub connection_id: String,
    /// Metric key prefix as given on the command line
    pub prefix: String,
}

impl TargetConfig {
    /// Metric key prefix with the default applied
    pub fn metric_key_prefix(&self) -> &str {
        graph::metric_key_prefix(&self.prefix)
    }
}

/// Fetch behavior
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Fetch the full metric set instead of only ConnectionState
    pub extended: bool,
    /// Maximum CloudWatch requests in flight
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            extended: true,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Configuration for one polling run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub aws: AwsConfig,
    pub target: TargetConfig,
    pub fetch: FetchConfig,
}

impl RunConfig {
    /// Reject configurations that cannot produce meaningful output
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.connection_id.trim().is_empty() {
            return Err(ConfigError::MissingConnection);
        }
        Ok(())
    }

    pub fn connection_id(&self) -> &str {
        &self.target.connection_id
    }
    pub fn extended(&self) -> bool {
        self.fetch.extended
    }
}

/// Treat empty or whitespace-only CLI values as unset
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Default operation timeout
pub fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::test_run_config;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(
            non_empty(Some("us-east-1".to_string())),
            Some("us-east-1".to_string())
        );
    }

    #[test]
    fn test_metric_key_prefix_default() {
        let mut config = test_run_config();
        config.target.prefix = String::new();
        assert_eq!(config.target.metric_key_prefix(), "Dx");

        config.target.prefix = "dx-tokyo".to_string();
        assert_eq!(config.target.metric_key_prefix(), "dx-tokyo");
    }

    #[test]
    fn test_validate_requires_connection() {
        let mut config = test_run_config();
        assert!(config.validate().is_ok());

        config.target.connection_id = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingConnection)
        ));
    }

    #[test]
    fn test_fetch_config_defaults() {
        let fetch = FetchConfig::default();
        assert!(fetch.extended);
        assert_eq!(fetch.concurrency, DEFAULT_CONCURRENCY);
    }
}
