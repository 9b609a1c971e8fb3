//! mackerel-plugin-aws-dx-con: AWS Direct Connect metrics for mackerel-agent
//!
//! Fetches CloudWatch metrics for one Direct Connect connection and prints
//! them in the mackerel-agent plugin format. Logs go to stderr.

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser};
use dxcon_monitor::aws::{AwsContext, CloudWatchClient};
use dxcon_monitor::config::{self, AwsConfig, FetchConfig, RunConfig, TargetConfig};
use dxcon_monitor::defaults::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use dxcon_monitor::metrics::MetricFetcher;
use dxcon_monitor::plugin::DxConPlugin;
use std::ffi::OsString;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "mackerel-plugin-aws-dx-con")]
#[command(about = "AWS Direct Connect connection metrics for mackerel-agent")]
#[command(after_help = "Single-dash long flags (-region=ap-northeast-1) are accepted as well.")]
#[command(version)]
struct Args {
    /// Metric key prefix (default: Dx)
    #[arg(long, default_value = "")]
    metric_key_prefix: String,

    /// AWS access key id
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_key_id: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_DEFAULT_REGION")]
    region: Option<String>,

    /// IAM role ARN to assume (takes precedence over access keys)
    #[arg(long)]
    role_arn: Option<String>,

    /// Resource id of the Direct Connect connection (e.g., dxcon-fgabc123)
    #[arg(long, default_value = "")]
    direct_connect_connection: String,

    /// Fetch the full metric set; pass --full-spec-support=false for
    /// connections that only report ConnectionState
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        require_equals = true
    )]
    full_spec_support: bool,

    /// Timeout in seconds for each AWS API call
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Maximum number of CloudWatch requests in flight
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        Self {
            aws: AwsConfig {
                role_arn: config::non_empty(args.role_arn),
                access_key_id: config::non_empty(args.access_key_id),
                secret_access_key: config::non_empty(args.secret_key_id),
                region: config::non_empty(args.region),
                timeout: Duration::from_secs(args.timeout_secs),
            },
            target: TargetConfig {
                connection_id: args.direct_connect_connection.trim().to_string(),
                prefix: args.metric_key_prefix,
            },
            fetch: FetchConfig {
                extended: args.full_spec_support,
                concurrency: args.concurrency,
            },
        }
    }
}

/// Rewrite single-dash long flags (`-region=x`) to their `--region=x` form.
///
/// Existing mackerel-agent.conf entries pass flags that way. Only names of
/// known long options are rewritten, and nothing after a `--` terminator.
fn normalize_long_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let command = Args::command();
    let is_long = |name: &str| {
        name == "help"
            || name == "version"
            || command.get_arguments().any(|a| a.get_long() == Some(name))
    };

    let mut terminated = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || terminated {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                terminated = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or_default();
                    if name.len() > 1 && is_long(name) {
                        OsString::from(format!("-{text}"))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

/// Log filter: warn by default, raised with `RUST_LOG` directives
fn log_filter(directives: &str) -> Result<EnvFilter> {
    Ok(EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse(directives)?
        .add_directive("aws_config=warn".parse()?)
        .add_directive("aws_smithy_runtime=warn".parse()?))
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error with its cause chain
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "Error: {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  Caused by: {cause}");
        source = cause.source();
    }
}

async fn run() -> Result<()> {
    // stdout carries plugin output, so logs go to stderr
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(&directives)?)
        .init();

    let args = Args::parse_from(normalize_long_flags(std::env::args_os()));
    let config = RunConfig::from(args);
    config.validate()?;

    info!(
        connection_id = %config.connection_id(),
        extended = config.extended(),
        "Polling Direct Connect metrics"
    );

    let aws = AwsContext::resolve(&config.aws).await?;

    let fetcher = MetricFetcher::new(
        CloudWatchClient::from_context(&aws),
        config.connection_id(),
        config.extended(),
    )
    .with_concurrency(config.fetch.concurrency);
    let plugin = DxConPlugin::new(fetcher, &config.target.prefix);

    let mut stdout = std::io::stdout().lock();
    plugin.run(&mut stdout).await
}
