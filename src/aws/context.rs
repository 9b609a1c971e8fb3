//! Shared AWS configuration context
//!
//! `AwsContext::resolve` turns an [`AwsConfig`] into a loaded SDK config
//! exactly once per run. The result is immutable and cheap to clone, so
//! every concurrent CloudWatch request shares the same credentials.

use super::credentials::CredentialSource;
use crate::config::AwsConfig;
use crate::defaults::ROLE_SESSION_NAME;
use crate::error::ConfigError;
use anyhow::{Context, anyhow};
use aws_config::retry::RetryConfig;
use aws_config::sts::AssumeRoleProvider;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_cloudwatch::config::Credentials;
use std::sync::Arc;
use tracing::debug;

/// Resolved AWS configuration for creating service clients.
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
    source_kind: &'static str,
}

impl AwsContext {
    /// Resolve credentials and region.
    ///
    /// The SDK resolves credentials lazily, so the provider is asked for
    /// them once here. Any failure is fatal for the run: no metric is
    /// queried with a partially configured client.
    pub async fn resolve(aws: &AwsConfig) -> Result<Self, ConfigError> {
        let source = aws.credential_source();
        let source_kind = source.kind();
        debug!(source = ?source, "Resolving AWS credentials");

        let loader = match source {
            CredentialSource::AssumeRole { role_arn } => {
                // The role is assumed with whatever the default chain yields
                let base = base_loader(aws).load().await;
                let provider = AssumeRoleProvider::builder(role_arn)
                    .session_name(ROLE_SESSION_NAME)
                    .configure(&base)
                    .build()
                    .await;
                base_loader(aws).credentials_provider(provider)
            }
            CredentialSource::Static {
                access_key_id,
                secret_access_key,
            } => {
                let credentials = Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    "mackerel-plugin-static",
                );
                base_loader(aws).credentials_provider(credentials)
            }
            CredentialSource::Ambient => base_loader(aws),
        };

        let config = loader.load().await;

        let region = config
            .region()
            .map(|r| r.to_string())
            .ok_or(ConfigError::MissingRegion)?;

        load_credentials(&config)
            .await
            .map_err(|source| ConfigError::Credentials {
                source_kind,
                source,
            })?;

        debug!(
            region = %region,
            source = source_kind,
            "AWS configuration resolved"
        );

        Ok(Self {
            config: Arc::new(config),
            region,
            source_kind,
        })
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the region string.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Which credential source was used
    pub fn source_kind(&self) -> &'static str {
        self.source_kind
    }

    /// Create a CloudWatch client from this context.
    pub fn cloudwatch_client(&self) -> aws_sdk_cloudwatch::Client {
        aws_sdk_cloudwatch::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .field("source", &self.source_kind)
            .finish_non_exhaustive()
    }
}

/// Force the configured provider to produce credentials.
///
/// Static keys resolve locally, the default chain reads env, profile or
/// instance metadata, and assume-role calls STS `AssumeRole`.
async fn load_credentials(config: &SdkConfig) -> anyhow::Result<()> {
    let provider = config
        .credentials_provider()
        .ok_or_else(|| anyhow!("No AWS credentials provider configured"))?;
    let credentials = provider
        .provide_credentials()
        .await
        .context("Failed to load AWS credentials")?;
    debug!(expiry = ?credentials.expiry(), "AWS credentials loaded");
    Ok(())
}

/// Loader shared by every credential source: explicit timeout, no SDK
/// retries, optional region override.
fn base_loader(aws: &AwsConfig) -> ConfigLoader {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .timeout_config(timeout_config(aws))
        .retry_config(RetryConfig::disabled());

    if let Some(region) = &aws.region {
        loader = loader.region(Region::new(region.clone()));
    }

    loader
}

fn timeout_config(aws: &AwsConfig) -> TimeoutConfig {
    TimeoutConfig::builder()
        .operation_timeout(aws.timeout)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_timeout;
    use crate::testing::test_region;

    #[test]
    fn test_timeout_config_uses_configured_timeout() {
        let aws = AwsConfig {
            timeout: default_timeout(),
            ..Default::default()
        };
        let timeouts = timeout_config(&aws);
        assert_eq!(timeouts.operation_timeout(), Some(default_timeout()));
    }

    #[tokio::test]
    async fn test_resolve_static_keys_without_network() {
        let aws = AwsConfig {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("not-a-real-secret".to_string()),
            region: Some("ap-northeast-1".to_string()),
            timeout: default_timeout(),
            ..Default::default()
        };
        let ctx = AwsContext::resolve(&aws).await.unwrap();

        assert_eq!(ctx.region(), "ap-northeast-1");
        assert_eq!(ctx.source_kind(), "static-keys");

        let provider = ctx.sdk_config().credentials_provider().unwrap();
        let credentials = provider.provide_credentials().await.unwrap();
        assert_eq!(credentials.access_key_id(), "AKIDEXAMPLE");
    }

    // Requires AWS credentials; skipped in regular test runs

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_resolve_ambient() {
        let aws = AwsConfig {
            region: Some(test_region()),
            timeout: default_timeout(),
            ..Default::default()
        };
        let ctx = AwsContext::resolve(&aws).await.expect("ambient credentials");
        assert_eq!(ctx.region(), test_region());
        assert_eq!(ctx.source_kind(), "default-chain");
    }
}
