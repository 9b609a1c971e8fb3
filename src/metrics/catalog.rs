//! Static catalog of Direct Connect metrics
//!
//! The statistic per metric is part of the contract: CloudWatch answers
//! differently depending on which statistic is requested. State metrics use
//! Minimum so a single down sample shows as down, counters use Sum, and
//! rates/levels use Average.

use super::names;

/// CloudWatch aggregation requested for a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Average,
    Sum,
    Minimum,
    Maximum,
}

impl Statistic {
    /// Name as used by the CloudWatch API
    pub fn as_str(self) -> &'static str {
        match self {
            Statistic::Average => "Average",
            Statistic::Sum => "Sum",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
        }
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One metric the plugin fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDefinition {
    /// CloudWatch metric name
    pub name: &'static str,
    /// Statistic to request
    pub statistic: Statistic,
    /// Only available on connections with full metric support
    pub extended: bool,
}

impl MetricDefinition {
    /// A metric every connection reports
    pub const fn required(name: &'static str, statistic: Statistic) -> Self {
        Self {
            name,
            statistic,
            extended: false,
        }
    }

    /// A metric only reported with full metric support
    pub const fn extended(name: &'static str, statistic: Statistic) -> Self {
        Self {
            name,
            statistic,
            extended: true,
        }
    }

    /// Check if this metric is fetched for the given mode
    pub fn is_selected(&self, extended: bool) -> bool {
        !self.extended || extended
    }
}

/// Every metric the plugin knows about, in fetch order.
///
/// See <https://docs.aws.amazon.com/directconnect/latest/UserGuide/monitoring-cloudwatch.html>
pub const CATALOG: &[MetricDefinition] = &[
    // 1 is up, 0 is down
    MetricDefinition::required(names::CONNECTION_STATE, Statistic::Minimum),
    // 1 when MACsec encryption is up (for a LAG: on every member)
    MetricDefinition::extended(names::CONNECTION_ENCRYPTION_STATE, Statistic::Minimum),
    MetricDefinition::extended(names::CONNECTION_BPS_EGRESS, Statistic::Average),
    MetricDefinition::extended(names::CONNECTION_BPS_INGRESS, Statistic::Average),
    MetricDefinition::extended(names::CONNECTION_PPS_EGRESS, Statistic::Average),
    MetricDefinition::extended(names::CONNECTION_PPS_INGRESS, Statistic::Average),
    // Optical levels in dBm
    MetricDefinition::extended(names::CONNECTION_LIGHT_LEVEL_TX, Statistic::Average),
    MetricDefinition::extended(names::CONNECTION_LIGHT_LEVEL_RX, Statistic::Average),
    // MAC level errors including CRC
    MetricDefinition::extended(names::CONNECTION_ERROR_COUNT, Statistic::Sum),
];

/// Catalog entries fetched in the given mode
pub fn selected(extended: bool) -> impl Iterator<Item = &'static MetricDefinition> {
    CATALOG.iter().filter(move |m| m.is_selected(extended))
}

/// Look up a catalog entry by metric name
pub fn find(name: &str) -> Option<&'static MetricDefinition> {
    CATALOG.iter().find(|m| m.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_nine_unique_metrics() {
        assert_eq!(CATALOG.len(), 9);
        let names: HashSet<_> = CATALOG.iter().map(|m| m.name).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_only_connection_state_is_required() {
        let required: Vec<_> = selected(false).map(|m| m.name).collect();
        assert_eq!(required, vec![names::CONNECTION_STATE]);
        assert_eq!(selected(true).count(), 9);
    }

    #[test]
    fn test_statistic_assignment() {
        let stat = |name| find(name).map(|m| m.statistic);

        assert_eq!(stat(names::CONNECTION_STATE), Some(Statistic::Minimum));
        assert_eq!(stat(names::CONNECTION_ENCRYPTION_STATE), Some(Statistic::Minimum));
        assert_eq!(stat(names::CONNECTION_ERROR_COUNT), Some(Statistic::Sum));
        for name in [
            names::CONNECTION_BPS_EGRESS,
            names::CONNECTION_BPS_INGRESS,
            names::CONNECTION_PPS_EGRESS,
            names::CONNECTION_PPS_INGRESS,
            names::CONNECTION_LIGHT_LEVEL_TX,
            names::CONNECTION_LIGHT_LEVEL_RX,
        ] {
            assert_eq!(stat(name), Some(Statistic::Average), "{name}");
        }
    }

    #[test]
    fn test_find_unknown() {
        assert!(find("ConnectionLatency").is_none());
    }

    #[test]
    fn test_statistic_names() {
        assert_eq!(Statistic::Average.to_string(), "Average");
        assert_eq!(Statistic::Sum.as_str(), "Sum");
        assert_eq!(Statistic::Minimum.as_str(), "Minimum");
        assert_eq!(Statistic::Maximum.as_str(), "Maximum");
    }
}
