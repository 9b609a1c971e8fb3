//! Default configuration values
//!
//! These constants are shared by the CLI, the fetcher and the graph schema
//! so every component agrees on the same window and naming.

/// Metric key prefix used when none (or a malformed one) is given
pub const DEFAULT_PREFIX: &str = "Dx";

/// Per-request operation timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Maximum number of CloudWatch requests in flight at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Trailing window queried for each metric, in seconds.
///
/// Direct Connect metrics can arrive up to two minutes late, so a three
/// minute window still yields at least one datapoint at 60s granularity.
pub const LOOKBACK_SECS: i64 = 180;

/// Statistics period (granularity) in seconds
pub const PERIOD_SECS: i32 = 60;

/// Session name used when assuming a role
pub const ROLE_SESSION_NAME: &str = "mackerel-plugin-aws-dx-con";

