//! Mackerel agent plugin adapter
//!
//! Speaks the mackerel-agent plugin protocol on a writer: graph definitions
//! as JSON when the agent asks for metadata, otherwise one tab separated
//! `key value timestamp` line per metric.

use crate::aws::StatisticsSource;
use crate::metrics::{Graph, MetricFetcher, MetricValues, Unit, graph};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Environment variable the agent sets when it wants graph definitions
pub const PLUGIN_META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

/// Header line preceding the graph definition JSON
pub const PLUGIN_META_HEADER: &str = "# mackerel-agent-plugin";

/// Check if the agent requested graph definitions instead of values
pub fn is_meta_request() -> bool {
    std::env::var(PLUGIN_META_ENV).is_ok_and(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
struct GraphDefinitions<'a> {
    graphs: BTreeMap<String, GraphDef<'a>>,
}

#[derive(Debug, Serialize)]
struct GraphDef<'a> {
    label: &'a str,
    unit: Unit,
    metrics: Vec<MetricDef<'a>>,
}

#[derive(Debug, Serialize)]
struct MetricDef<'a> {
    name: &'a str,
    label: &'a str,
    stacked: bool,
}

/// Direct Connect plugin: one connection, one fetcher, one prefix
pub struct DxConPlugin<S> {
    fetcher: MetricFetcher<S>,
    prefix: String,
}

impl<S: StatisticsSource> DxConPlugin<S> {
    pub fn new(fetcher: MetricFetcher<S>, prefix: &str) -> Self {
        Self {
            fetcher,
            prefix: graph::metric_key_prefix(prefix).to_string(),
        }
    }

    /// Metric key prefix with the default applied
    pub fn metric_key_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn graph_definition(&self) -> Vec<Graph> {
        graph::graph_definition(&self.prefix, self.fetcher.extended())
    }

    pub async fn fetch_metrics(&self) -> MetricValues {
        self.fetcher.fetch_all().await
    }

    /// Fetch all metrics and write them as plugin value lines
    pub async fn output_values<W: Write>(&self, out: &mut W) -> Result<()> {
        let values = self.fetch_metrics().await;
        write_values(out, &self.prefix, &self.graph_definition(), &values, Utc::now())
    }

    /// Write the graph definitions with the metadata header
    pub fn output_definitions<W: Write>(&self, out: &mut W) -> Result<()> {
        write_definitions(out, &self.prefix, &self.graph_definition())
    }

    /// Answer the agent: definitions or values depending on the environment
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        if is_meta_request() {
            self.output_definitions(out)
        } else {
            self.output_values(out).await
        }
    }
}

/// Write `# mackerel-agent-plugin` followed by the graph definition JSON.
///
/// Graph keys are namespaced as `<prefix>.<key>`.
pub fn write_definitions<W: Write>(out: &mut W, prefix: &str, graphs: &[Graph]) -> Result<()> {
    let definitions = GraphDefinitions {
        graphs: graphs
            .iter()
            .map(|g| {
                let def = GraphDef {
                    label: &g.label,
                    unit: g.unit,
                    metrics: g
                        .metrics
                        .iter()
                        .map(|m| MetricDef {
                            name: m.name,
                            label: m.label,
                            stacked: false,
                        })
                        .collect(),
                };
                (format!("{prefix}.{}", g.key), def)
            })
            .collect(),
    };

    writeln!(out, "{PLUGIN_META_HEADER}")?;
    serde_json::to_writer(&mut *out, &definitions).context("Failed to serialize graph definitions")?;
    writeln!(out)?;
    Ok(())
}

/// Write one `<prefix>.<graph>.<metric>\t<value>\t<epoch>` line per graphed
/// metric that has a value, in graph order.
pub fn write_values<W: Write>(
    out: &mut W,
    prefix: &str,
    graphs: &[Graph],
    values: &MetricValues,
    now: DateTime<Utc>,
) -> Result<()> {
    let timestamp = now.timestamp();
    for g in graphs {
        for m in &g.metrics {
            if let Some(value) = values.get(m.name) {
                writeln!(out, "{prefix}.{}.{}\t{value:.6}\t{timestamp}", g.key, m.name)?;
            }
        }
    }
    Ok(())
}
