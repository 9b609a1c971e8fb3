//! Graph definitions for the Mackerel UI

use super::names;
use crate::defaults::DEFAULT_PREFIX;
use serde::Serialize;
use tracing::warn;

/// Unit of a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "bits/sec")]
    BitsPerSecond,
}

/// One line on a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphMetric {
    /// Catalog metric name
    pub name: &'static str,
    /// Display label
    pub label: &'static str,
}

/// A named group of metrics drawn together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    /// Graph key below the metric key prefix (e.g., "Bps")
    pub key: &'static str,
    pub label: String,
    pub unit: Unit,
    pub metrics: Vec<GraphMetric>,
}

const fn metric(name: &'static str, label: &'static str) -> GraphMetric {
    GraphMetric { name, label }
}

/// Build the graph definitions for the given prefix and mode.
///
/// Without extended support only the connection state graph is returned.
pub fn graph_definition(prefix: &str, extended: bool) -> Vec<Graph> {
    let label_prefix = label_prefix(prefix);
    let graph = |key, suffix: &str, unit, metrics| Graph {
        key,
        label: format!("{label_prefix} {suffix}"),
        unit,
        metrics,
    };

    if !extended {
        return vec![graph(
            "State",
            "connection status",
            Unit::Integer,
            vec![metric(names::CONNECTION_STATE, "ConnectionState")],
        )];
    }

    vec![
        graph(
            "State",
            "connection status",
            Unit::Integer,
            vec![
                metric(names::CONNECTION_STATE, "ConnectionState"),
                metric(
                    names::CONNECTION_ENCRYPTION_STATE,
                    "ConnectionEncryptionState",
                ),
            ],
        ),
        graph(
            "Bps",
            "bps",
            Unit::BitsPerSecond,
            vec![
                metric(names::CONNECTION_BPS_EGRESS, "bps out"),
                metric(names::CONNECTION_BPS_INGRESS, "bps in"),
            ],
        ),
        graph(
            "Pps",
            "pps",
            Unit::Integer,
            vec![
                metric(names::CONNECTION_PPS_EGRESS, "pps out"),
                metric(names::CONNECTION_PPS_INGRESS, "pps in"),
            ],
        ),
        graph(
            "LightLevel",
            "Light level",
            Unit::Integer,
            vec![
                metric(names::CONNECTION_LIGHT_LEVEL_TX, "egress dBm"),
                metric(names::CONNECTION_LIGHT_LEVEL_RX, "ingress dBm"),
            ],
        ),
        graph(
            "Error",
            "Error",
            Unit::Integer,
            vec![metric(names::CONNECTION_ERROR_COUNT, "CRC Errors")],
        ),
    ]
}

/// Metric key prefix, falling back to [`DEFAULT_PREFIX`] when `prefix` is
/// empty or contains characters a metric key can't hold.
pub fn metric_key_prefix(prefix: &str) -> &str {
    if prefix.is_empty() {
        return DEFAULT_PREFIX;
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        warn!(prefix = %prefix, default = DEFAULT_PREFIX, "Malformed metric key prefix, using default");
        return DEFAULT_PREFIX;
    }
    prefix
}

/// Human readable form of the prefix: words title-cased, hyphens as spaces.
///
/// `"dx-tokyo"` becomes `"Dx Tokyo"`.
pub fn label_prefix(prefix: &str) -> String {
    title_case(metric_key_prefix(prefix)).replace('-', " ")
}

/// Upper-case the first letter of every word. Words are separated by
/// anything other than letters, digits and underscores.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::catalog;

    #[test]
    fn test_basic_mode_has_only_state() {
        let graphs = graph_definition("", false);
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].key, "State");
        assert_eq!(graphs[0].label, "Dx connection status");
        assert_eq!(
            graphs[0].metrics,
            vec![metric(names::CONNECTION_STATE, "ConnectionState")]
        );
    }

    #[test]
    fn test_extended_mode_has_five_graphs() {
        let keys: Vec<_> = graph_definition("Dx", true).iter().map(|g| g.key).collect();
        assert_eq!(keys, vec!["State", "Bps", "Pps", "LightLevel", "Error"]);
    }

    #[test]
    fn test_labels_start_with_title_cased_prefix() {
        for graph in graph_definition("foo", true) {
            assert!(graph.label.starts_with("Foo "), "{}", graph.label);
        }
        let graphs = graph_definition("foo", false);
        assert_eq!(graphs[0].label, "Foo connection status");

        let graphs = graph_definition("dx-tokyo", true);
        assert_eq!(graphs[1].label, "Dx Tokyo bps");
        assert_eq!(graphs[3].label, "Dx Tokyo Light level");
    }

    #[test]
    fn test_graph_metrics_exist_in_catalog() {
        for graph in graph_definition("Dx", true) {
            for m in &graph.metrics {
                assert!(catalog::find(m.name).is_some(), "{} not in catalog", m.name);
            }
        }
    }

    #[test]
    fn test_every_selected_metric_is_graphed() {
        for extended in [false, true] {
            let graphed: Vec<_> = graph_definition("Dx", extended)
                .into_iter()
                .flat_map(|g| g.metrics)
                .map(|m| m.name)
                .collect();
            for metric in catalog::selected(extended) {
                assert!(graphed.contains(&metric.name), "{}", metric.name);
            }
        }
    }

    #[test]
    fn test_malformed_prefix_falls_back() {
        assert_eq!(metric_key_prefix(""), "Dx");
        assert_eq!(metric_key_prefix("dx.tokyo"), "Dx");
        assert_eq!(metric_key_prefix("dx tokyo"), "Dx");
        assert_eq!(metric_key_prefix("dx_tokyo-1"), "dx_tokyo-1");
        assert_eq!(label_prefix("bad/prefix"), "Dx");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("foo"), "Foo");
        assert_eq!(title_case("foo-bar"), "Foo-Bar");
        assert_eq!(title_case("foo_bar"), "Foo_bar");
        assert_eq!(title_case("dx1-a"), "Dx1-A");
    }

    #[test]
    fn test_bps_unit() {
        let graphs = graph_definition("Dx", true);
        assert_eq!(graphs[1].unit, Unit::BitsPerSecond);
        assert_eq!(
            serde_json::to_string(&Unit::BitsPerSecond).unwrap(),
            "\"bits/sec\""
        );
        assert_eq!(serde_json::to_string(&Unit::Integer).unwrap(), "\"integer\"");
    }
}
