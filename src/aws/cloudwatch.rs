//! CloudWatch statistics queries

use super::context::AwsContext;
use crate::metrics::{self, NAMESPACE, Statistic};
use anyhow::{Context, Result};
use aws_sdk_cloudwatch::{Client, primitives::DateTime as AwsDateTime, types};
use chrono::{DateTime, Utc};
use tracing::debug;

/// One `GetMetricStatistics` request for a single metric and statistic
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsQuery {
    pub metric_name: &'static str,
    pub connection_id: String,
    pub statistic: Statistic,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub period_secs: i32,
}

/// One aggregated sample for the requested statistic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datapoint {
    pub timestamp: DateTime<Utc>,
    pub statistic: Statistic,
    pub value: f64,
}

/// Anything that can answer a statistics query.
///
/// Implemented by [`CloudWatchClient`]; tests substitute an in-memory fake.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
pub trait StatisticsSource: Send + Sync {
    /// Fetch the datapoints for `query`, in whatever order the backend returns
    async fn get_statistics(&self, query: &StatisticsQuery) -> Result<Vec<Datapoint>>;
}

/// CloudWatch client for querying Direct Connect statistics
#[derive(Debug, Clone)]
pub struct CloudWatchClient {
    client: Client,
}

impl CloudWatchClient {
    /// Create a CloudWatch client from a resolved AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.cloudwatch_client(),
        }
    }

    /// Query statistics for a single metric of one connection
    pub async fn get_metric_statistics(&self, query: &StatisticsQuery) -> Result<Vec<Datapoint>> {
        let response = self
            .client
            .get_metric_statistics()
            .namespace(NAMESPACE)
            .metric_name(query.metric_name)
            .set_dimensions(Some(metrics::build_dimensions(&query.connection_id)))
            .start_time(AwsDateTime::from_secs(query.start_time.timestamp()))
            .end_time(AwsDateTime::from_secs(query.end_time.timestamp()))
            .period(query.period_secs)
            .statistics(query.statistic.into())
            .send()
            .await
            .context("Failed to get metric statistics")?;

        let datapoints: Vec<Datapoint> = response
            .datapoints()
            .iter()
            .filter_map(|dp| convert_datapoint(dp, query.statistic))
            .collect();

        debug!(
            metric = %query.metric_name,
            statistic = %query.statistic,
            returned = response.datapoints().len(),
            usable = datapoints.len(),
            "Got metric statistics"
        );

        Ok(datapoints)
    }
}

impl StatisticsSource for CloudWatchClient {
    async fn get_statistics(&self, query: &StatisticsQuery) -> Result<Vec<Datapoint>> {
        CloudWatchClient::get_metric_statistics(self, query).await
    }
}

impl From<Statistic> for types::Statistic {
    fn from(statistic: Statistic) -> Self {
        match statistic {
            Statistic::Average => types::Statistic::Average,
            Statistic::Sum => types::Statistic::Sum,
            Statistic::Minimum => types::Statistic::Minimum,
            Statistic::Maximum => types::Statistic::Maximum,
        }
    }
}

/// Convert an SDK datapoint, dropping samples without a timestamp or without
/// a value for the requested statistic.
fn convert_datapoint(dp: &types::Datapoint, statistic: Statistic) -> Option<Datapoint> {
    let timestamp = dp.timestamp()?;
    let timestamp = DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())?;

    let value = match statistic {
        Statistic::Average => dp.average(),
        Statistic::Sum => dp.sum(),
        Statistic::Minimum => dp.minimum(),
        Statistic::Maximum => dp.maximum(),
    }?;

    Some(Datapoint {
        timestamp,
        statistic,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sdk_datapoint(secs: i64) -> types::builders::DatapointBuilder {
        types::Datapoint::builder().timestamp(AwsDateTime::from_secs(secs))
    }

    #[test]
    fn test_convert_picks_requested_statistic() {
        let dp = sdk_datapoint(1_700_000_000)
            .average(12.5)
            .sum(50.0)
            .minimum(1.0)
            .maximum(20.0)
            .build();

        let avg = convert_datapoint(&dp, Statistic::Average).unwrap();
        assert_eq!(avg.value, 12.5);
        assert_eq!(avg.statistic, Statistic::Average);
        assert_eq!(avg.timestamp.timestamp(), 1_700_000_000);

        assert_eq!(convert_datapoint(&dp, Statistic::Sum).unwrap().value, 50.0);
        assert_eq!(convert_datapoint(&dp, Statistic::Minimum).unwrap().value, 1.0);
        assert_eq!(convert_datapoint(&dp, Statistic::Maximum).unwrap().value, 20.0);
    }

    #[test]
    fn test_convert_drops_incomplete_datapoints() {
        let no_value = sdk_datapoint(1_700_000_000).sum(3.0).build();
        assert!(convert_datapoint(&no_value, Statistic::Average).is_none());

        let no_timestamp = types::Datapoint::builder().average(3.0).build();
        assert!(convert_datapoint(&no_timestamp, Statistic::Average).is_none());
    }

    #[test]
    fn test_statistic_maps_to_sdk() {
        assert_eq!(
            types::Statistic::from(Statistic::Minimum),
            types::Statistic::Minimum
        );
        assert_eq!(types::Statistic::from(Statistic::Sum), types::Statistic::Sum);
    }
}
