//! Multi-component compatibility analysis.
//!
//! Given a set of MPNs, the analyzer resolves them against the catalog and
//! cross-checks two things:
//!
//! - **Supply voltage**: the declared `[min, max]` ranges must share a common
//!   window. A component that runs outside every other part's range is a hard
//!   electrical fault and is reported with severity `error`.
//! - **Interfaces**: every interface some component lists under
//!   `interface_requirements` should be provided by at least one component in
//!   the set. Catalog metadata is often incomplete, so a gap is only a
//!   `warning` and never makes the set incompatible on its own.
//!
//! MPNs that do not resolve are dropped without error, so one typo does not
//! block the whole check.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::models::{Component, VoltageRange};
use crate::storage::CatalogStore;

/// Minimum number of resolved components needed to compare anything.
pub const MIN_COMPONENTS: usize = 2;

/// How serious an issue is. Only `Error` blocks compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Category of a compatibility issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Voltage,
    Interface,
}

/// Supply range declared by one component, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentVoltage {
    pub mpn: String,
    pub min: f64,
    pub max: f64,
}

/// Kind-specific data attached to an issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IssueDetail {
    /// The per-component supply ranges that failed to overlap
    Voltage { ranges: Vec<ComponentVoltage> },

    /// Required interfaces nobody in the set provides, sorted
    Interface { missing: Vec<String> },
}

/// A single finding of a compatibility check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityIssue {
    pub severity: Severity,
    pub message: String,
    #[serde(flatten)]
    pub detail: IssueDetail,
}

impl CompatibilityIssue {
    pub fn kind(&self) -> IssueKind {
        match self.detail {
            IssueDetail::Voltage { .. } => IssueKind::Voltage,
            IssueDetail::Interface { .. } => IssueKind::Interface,
        }
    }
}

/// Result of a compatibility check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityReport {
    /// True unless some issue has severity `error`
    pub compatible: bool,

    /// Explanation when there was nothing to compare
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// MPNs that resolved, in request order, as spelled in the catalog
    pub components: Vec<String>,

    pub issues: Vec<CompatibilityIssue>,

    /// Common supply window; `None` if no component declared a range
    pub voltage_range: Option<VoltageRange>,

    /// Union of provided interfaces, sorted
    pub available_interfaces: Vec<String>,
}

impl CompatibilityReport {
    fn from_issues(
        components: Vec<String>,
        issues: Vec<CompatibilityIssue>,
        voltage_range: Option<VoltageRange>,
        available_interfaces: Vec<String>,
    ) -> Self {
        let compatible = issues.iter().all(|issue| issue.severity < Severity::Error);
        Self {
            compatible,
            message: None,
            components,
            issues,
            voltage_range,
            available_interfaces,
        }
    }

    /// Issues of the given kind.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &CompatibilityIssue> {
        self.issues.iter().filter(move |issue| issue.kind() == kind)
    }
}

/// Checks electrical and interface constraints across catalog components.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityAnalyzer<'a> {
    store: &'a CatalogStore,
}

impl<'a> CompatibilityAnalyzer<'a> {
    pub fn new(store: &'a CatalogStore) -> Self {
        Self { store }
    }

    /// Check whether the given components can be used together.
    ///
    /// # Arguments
    /// * `mpns` - Part numbers to check; unknown ones are ignored and
    ///   repeated ones count once
    pub fn check<S: AsRef<str>>(&self, mpns: &[S]) -> CompatibilityReport {
        let components = self.resolve(mpns);
        let resolved: Vec<String> = components.iter().map(|c| c.mpn.clone()).collect();
        debug!(
            "Compatibility check: {} requested, {} resolved",
            mpns.len(),
            resolved.len()
        );

        if components.len() < MIN_COMPONENTS {
            return CompatibilityReport {
                compatible: true,
                message: Some(format!(
                    "Need at least {} known components to check compatibility",
                    MIN_COMPONENTS
                )),
                components: resolved,
                issues: Vec::new(),
                voltage_range: None,
                available_interfaces: Vec::new(),
            };
        }

        let mut issues = Vec::new();

        let (voltage_range, voltage_issue) = check_voltage(&components);
        issues.extend(voltage_issue);

        let (available_interfaces, interface_issue) = check_interfaces(&components);
        issues.extend(interface_issue);

        CompatibilityReport::from_issues(resolved, issues, voltage_range, available_interfaces)
    }

    fn resolve<S: AsRef<str>>(&self, mpns: &[S]) -> Vec<&'a Component> {
        let mut seen = HashSet::new();
        mpns.iter()
            .filter_map(|mpn| self.store.by_mpn(mpn.as_ref()))
            .filter(|component| seen.insert(Component::mpn_key(&component.mpn)))
            .collect()
    }
}

/// Intersect the declared supply ranges.
fn check_voltage(components: &[&Component]) -> (Option<VoltageRange>, Option<CompatibilityIssue>) {
    let ranges: Vec<ComponentVoltage> = components
        .iter()
        .filter_map(|c| {
            c.spec.voltage_range().map(|range| ComponentVoltage {
                mpn: c.mpn.clone(),
                min: range.min,
                max: range.max,
            })
        })
        .collect();

    let Some(window) = ranges
        .iter()
        .map(|r| VoltageRange::new(r.min, r.max))
        .reduce(|acc, next| acc.intersect(&next))
    else {
        return (None, None);
    };

    if window.is_valid() {
        return (Some(window), None);
    }

    let issue = CompatibilityIssue {
        severity: Severity::Error,
        message: format!(
            "Voltage ranges incompatible: highest minimum {}V exceeds lowest maximum {}V",
            window.min, window.max
        ),
        detail: IssueDetail::Voltage { ranges },
    };
    (Some(window), Some(issue))
}

/// Compare required interfaces against the provided ones.
fn check_interfaces(components: &[&Component]) -> (Vec<String>, Option<CompatibilityIssue>) {
    let provided: BTreeSet<&str> = components
        .iter()
        .flat_map(|c| c.spec.interfaces.iter().map(String::as_str))
        .collect();

    let required: BTreeSet<&str> = components
        .iter()
        .flat_map(|c| c.compatibility.interface_requirements.iter().map(String::as_str))
        .collect();

    let available: Vec<String> = provided.iter().map(|s| s.to_string()).collect();
    let missing: Vec<String> = required
        .difference(&provided)
        .map(|s| s.to_string())
        .collect();

    if missing.is_empty() {
        return (available, None);
    }

    let issue = CompatibilityIssue {
        severity: Severity::Warning,
        message: format!("Missing required interfaces: {}", missing.join(", ")),
        detail: IssueDetail::Interface { missing },
    };
    (available, Some(issue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::{record, store_from};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn with_requirements(mut value: Value, required: &[&str]) -> Value {
        value["compatibility"] = json!({ "interface_requirements": required });
        value
    }

    fn sample_store() -> CatalogStore {
        store_from(vec![
            record("MCU-A", "Microcontroller", "", &["I2C", "SPI", "UART"], Some((3.0, 3.6))),
            with_requirements(
                record("SENSOR-B", "Sensor", "", &["I2C"], Some((1.8, 3.3))),
                &["I2C"],
            ),
            record("MOTOR-C", "Driver", "", &[], Some((5.0, 5.5))),
            with_requirements(record("DISPLAY-D", "Display", "", &[], None), &["SPI", "MIPI-DSI"]),
            record("PASSIVE-E", "Capacitor", "", &[], None),
        ])
    }

    #[test]
    fn test_overlapping_voltages_are_compatible() {
        let store = sample_store();
        let report = CompatibilityAnalyzer::new(&store).check(&["MCU-A", "SENSOR-B"]);

        assert!(report.compatible);
        assert!(report.issues.is_empty());
        assert_eq!(report.voltage_range, Some(VoltageRange::new(3.0, 3.3)));
        assert_eq!(report.components, vec!["MCU-A", "SENSOR-B"]);
        assert_eq!(report.available_interfaces, vec!["I2C", "SPI", "UART"]);
        assert!(report.message.is_none());
    }

    #[test]
    fn test_disjoint_voltages_are_an_error() {
        let store = sample_store();
        let report = CompatibilityAnalyzer::new(&store).check(&["MCU-A", "SENSOR-B", "MOTOR-C"]);

        assert!(!report.compatible);
        assert_eq!(report.voltage_range, Some(VoltageRange::new(5.0, 3.3)));

        let issues: Vec<_> = report.issues_of(IssueKind::Voltage).collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        match &issues[0].detail {
            IssueDetail::Voltage { ranges } => {
                let names: Vec<_> = ranges.iter().map(|r| r.mpn.as_str()).collect();
                assert_eq!(names, vec!["MCU-A", "SENSOR-B", "MOTOR-C"]);
            }
            other => panic!("Expected voltage detail, got {:?}", other),
        }
    }

    #[test]
    fn test_half_declared_range_is_ignored() {
        let mut half = record("HALF-F", "Sensor", "", &[], None);
        half["specs"]["voltage_min"] = json!(2.0);
        let store = store_from(vec![
            record("MCU-A", "Microcontroller", "", &["I2C"], Some((3.0, 3.6))),
            half,
            record("PASSIVE-E", "Capacitor", "", &[], None),
        ]);
        let analyzer = CompatibilityAnalyzer::new(&store);

        let report = analyzer.check(&["MCU-A", "HALF-F"]);
        assert!(report.compatible);
        assert_eq!(report.voltage_range, Some(VoltageRange::new(3.0, 3.6)));

        let report = analyzer.check(&["HALF-F", "PASSIVE-E"]);
        assert!(report.compatible);
        assert_eq!(report.voltage_range, None);
    }

    #[test]
    fn test_zero_minimum_takes_part() {
        let store = store_from(vec![
            record("MCU-A", "Microcontroller", "", &[], Some((3.0, 3.6))),
            record("ZERO-G", "Sensor", "", &[], Some((0.0, 3.3))),
            record("MOTOR-C", "Driver", "", &[], Some((5.0, 5.5))),
        ]);
        let analyzer = CompatibilityAnalyzer::new(&store);

        let report = analyzer.check(&["ZERO-G", "MCU-A"]);
        assert!(report.compatible);
        assert_eq!(report.voltage_range, Some(VoltageRange::new(3.0, 3.3)));

        let report = analyzer.check(&["ZERO-G", "MOTOR-C"]);
        assert!(!report.compatible);
        assert_eq!(report.voltage_range, Some(VoltageRange::new(5.0, 3.3)));
        assert_eq!(report.issues_of(IssueKind::Voltage).count(), 1);
    }

    #[test]
    fn test_missing_interface_is_only_a_warning() {
        let store = sample_store();
        let report = CompatibilityAnalyzer::new(&store).check(&["MCU-A", "DISPLAY-D"]);

        assert!(report.compatible);
        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert_eq!(issue.kind(), IssueKind::Interface);
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(
            issue.detail,
            IssueDetail::Interface {
                missing: vec!["MIPI-DSI".to_string()]
            }
        );
        // Only MCU-A declares a supply range
        assert_eq!(report.voltage_range, Some(VoltageRange::new(3.0, 3.6)));
    }

    #[test]
    fn test_error_and_warning_together_are_incompatible() {
        let store = sample_store();
        let report =
            CompatibilityAnalyzer::new(&store).check(&["SENSOR-B", "MOTOR-C", "DISPLAY-D"]);

        assert!(!report.compatible);
        assert_eq!(report.issues_of(IssueKind::Voltage).count(), 1);
        assert_eq!(report.issues_of(IssueKind::Interface).count(), 1);
    }

    #[test]
    fn test_no_declared_voltages_gives_no_range() {
        let store = sample_store();
        let report = CompatibilityAnalyzer::new(&store).check(&["DISPLAY-D", "PASSIVE-E"]);

        assert!(report.voltage_range.is_none());
        assert!(report.available_interfaces.is_empty());
        // DISPLAY-D requires SPI and MIPI-DSI, nobody provides either
        assert!(report.compatible);
    }

    #[test]
    fn test_single_component_is_vacuously_compatible() {
        let store = sample_store();
        let report = CompatibilityAnalyzer::new(&store).check(&["MOTOR-C"]);

        assert!(report.compatible);
        assert!(report.issues.is_empty());
        assert!(report.message.is_some());
        assert_eq!(report.components, vec!["MOTOR-C"]);
    }

    #[test]
    fn test_unknown_mpns_are_dropped() {
        let store = sample_store();
        let analyzer = CompatibilityAnalyzer::new(&store);

        let report = analyzer.check(&["MCU-A", "NOPE-1", "sensor-b"]);
        assert_eq!(report.components, vec!["MCU-A", "SENSOR-B"]);
        assert!(report.message.is_none());

        let report = analyzer.check(&["NOPE-1", "NOPE-2"]);
        assert!(report.compatible);
        assert!(report.components.is_empty());

        let empty: [&str; 0] = [];
        assert!(analyzer.check(&empty).compatible);
    }

    #[test]
    fn test_repeated_mpn_counts_once() {
        let store = sample_store();
        let report = CompatibilityAnalyzer::new(&store).check(&["MOTOR-C", "motor-c"]);
        assert_eq!(report.components, vec!["MOTOR-C"]);
        assert!(report.message.is_some());
    }

    #[test]
    fn test_report_serialization_shape() {
        let store = sample_store();
        let report = CompatibilityAnalyzer::new(&store).check(&["MCU-A", "MOTOR-C", "DISPLAY-D"]);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["compatible"], json!(false));
        assert!(value.get("message").is_none());
        assert_eq!(value["issues"][0]["type"], json!("voltage"));
        assert_eq!(value["issues"][0]["severity"], json!("error"));
        assert_eq!(value["issues"][0]["ranges"][0]["mpn"], json!("MCU-A"));
        assert_eq!(value["issues"][1]["type"], json!("interface"));
        assert_eq!(value["issues"][1]["severity"], json!("warning"));
        assert_eq!(value["issues"][1]["missing"], json!(["MIPI-DSI"]));
        assert_eq!(value["voltage_range"], json!({"min": 5.0, "max": 3.6}));
    }

    /// Issue fields that must not depend on input order.
    fn normalized(report: &CompatibilityReport) -> Vec<(IssueKind, Severity, String, Vec<String>)> {
        let mut issues: Vec<_> = report
            .issues
            .iter()
            .map(|issue| {
                let mut members: Vec<String> = match &issue.detail {
                    IssueDetail::Voltage { ranges } => {
                        ranges.iter().map(|r| r.mpn.clone()).collect()
                    }
                    IssueDetail::Interface { missing } => missing.clone(),
                };
                members.sort();
                (issue.kind(), issue.severity, issue.message.clone(), members)
            })
            .collect();
        issues.sort_by(|a, b| a.2.cmp(&b.2));
        issues
    }

    proptest! {
        #[test]
        fn prop_order_independent(
            picked in prop::sample::subsequence(
                vec!["MCU-A", "SENSOR-B", "MOTOR-C", "DISPLAY-D", "PASSIVE-E", "NOPE-9"],
                0..=6,
            ).prop_shuffle(),
        ) {
            let store = sample_store();
            let analyzer = CompatibilityAnalyzer::new(&store);

            let forward = analyzer.check(&picked);
            let mut reversed = picked.clone();
            reversed.reverse();
            let backward = analyzer.check(&reversed);

            prop_assert_eq!(forward.compatible, backward.compatible);
            prop_assert_eq!(normalized(&forward), normalized(&backward));
            prop_assert_eq!(forward.voltage_range, backward.voltage_range);
            prop_assert_eq!(&forward.available_interfaces, &backward.available_interfaces);
        }

        #[test]
        fn prop_single_component_always_compatible(
            mpn in prop::sample::select(
                vec!["MCU-A", "SENSOR-B", "MOTOR-C", "DISPLAY-D", "PASSIVE-E"]
            ),
        ) {
            let store = sample_store();
            let report = CompatibilityAnalyzer::new(&store).check(&[mpn]);
            prop_assert!(report.compatible);
            prop_assert!(report.issues.is_empty());
        }
    }
}
