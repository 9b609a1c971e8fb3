//! AWS client modules
//!
//! - `credentials`: credential source selection
//! - `context`: one-time resolution of the SDK config
//! - `cloudwatch`: statistics queries against CloudWatch

pub mod cloudwatch;
pub mod context;
pub mod credentials;

pub use cloudwatch::{CloudWatchClient, Datapoint, StatisticsQuery, StatisticsSource};
pub use context::AwsContext;
pub use credentials::CredentialSource;
