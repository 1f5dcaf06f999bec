//! Structural validation of report configurations.
//!
//! Six checks run in a fixed order. The legacy verdict reports only the
//! first violation: checks earlier in [`CHECKS`] take priority regardless
//! of how many violations exist or where they appear in each collection.
//! [`validate_all`] reports everything for callers that want the full list.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ReportConfig;

/// Category of a configuration violation, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DuplicateColumn,
    DuplicateSortField,
    DuplicateCalcName,
    DuplicateGrouping,
    DuplicateSummaryField,
    FieldOverlap,
}

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// The offending key as written in the configuration.
    pub key: String,
}

impl Violation {
    fn new(kind: ViolationKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    /// User-facing message, surfaced verbatim by the editing surface.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::DuplicateColumn => write!(f, "Duplicate Column: {}", self.key),
            ViolationKind::DuplicateSortField => write!(f, "Duplicate Sort Field: {}", self.key),
            ViolationKind::DuplicateCalcName => write!(f, "Duplicate Calc Name: \"{}\"", self.key),
            ViolationKind::DuplicateGrouping => write!(f, "Duplicate Grouping: {}", self.key),
            ViolationKind::DuplicateSummaryField => {
                write!(f, "Duplicate Summary Field: {}", self.key)
            }
            ViolationKind::FieldOverlap => write!(
                f,
                "Field Overlap: \"{}\" is used in Grouping. Remove from Body.",
                self.key
            ),
        }
    }
}

impl std::error::Error for Violation {}

/// Outcome of validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn fail(violation: &Violation) -> Self {
        Self {
            is_valid: false,
            error: Some(violation.message()),
        }
    }
}

/// How much the validator reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// One violation per category, first category wins.
    #[default]
    First,
    /// Every violation in every category.
    Exhaustive,
}

type Scan = fn(&ReportConfig) -> Vec<Violation>;

/// Checks in priority order.
const CHECKS: [(ViolationKind, Scan); 6] = [
    (ViolationKind::DuplicateColumn, duplicate_columns),
    (ViolationKind::DuplicateSortField, duplicate_sort_fields),
    (ViolationKind::DuplicateCalcName, duplicate_calc_names),
    (ViolationKind::DuplicateGrouping, duplicate_groupings),
    (ViolationKind::DuplicateSummaryField, duplicate_summary_fields),
    (ViolationKind::FieldOverlap, field_overlap),
];

/// Validate a configuration, reporting only the highest-priority violation.
pub fn validate(config: &ReportConfig) -> Verdict {
    match first_violation(config) {
        Some(violation) => Verdict::fail(&violation),
        None => Verdict::pass(),
    }
}

/// The violation the legacy verdict reports, if any.
pub fn first_violation(config: &ReportConfig) -> Option<Violation> {
    CHECKS.iter().find_map(|(kind, scan)| {
        let found = scan(config).into_iter().next();
        if let Some(violation) = &found {
            tracing::debug!(kind = ?kind, key = %violation.key, "configuration rejected");
        }
        found
    })
}

/// At most one violation per category, in priority order.
pub fn violations(config: &ReportConfig) -> Vec<Violation> {
    CHECKS
        .iter()
        .filter_map(|(_, scan)| scan(config).into_iter().next())
        .collect()
}

/// Every violation in every category, in priority order.
///
/// A key repeated several times within a category is reported once.
pub fn validate_all(config: &ReportConfig) -> Vec<Violation> {
    CHECKS.iter().flat_map(|(_, scan)| scan(config)).collect()
}

/// Validate according to `mode`.
pub fn validate_with(config: &ReportConfig, mode: ValidationMode) -> Result<(), Vec<Violation>> {
    let found = match mode {
        ValidationMode::First => first_violation(config).into_iter().collect(),
        ValidationMode::Exhaustive => validate_all(config),
    };
    if found.is_empty() {
        Ok(())
    } else {
        Err(found)
    }
}

/// Report each key that appears more than once.
///
/// `identity` yields the comparison key and the text shown in the message,
/// or `None` for entries that cannot be keyed.
fn repeated<'a, T: 'a>(
    kind: ViolationKind,
    items: impl IntoIterator<Item = &'a T>,
    identity: impl Fn(&T) -> Option<(String, String)>,
) -> Vec<Violation> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut found = Vec::new();
    for item in items {
        let Some((key, shown)) = identity(item) else {
            continue;
        };
        if !seen.insert(key.clone()) && reported.insert(key) {
            found.push(Violation::new(kind, shown));
        }
    }
    found
}

fn duplicate_columns(config: &ReportConfig) -> Vec<Violation> {
    repeated(ViolationKind::DuplicateColumn, &config.report_columns, |col| {
        col.key().map(|key| (key.clone(), key))
    })
}

fn duplicate_sort_fields(config: &ReportConfig) -> Vec<Violation> {
    repeated(
        ViolationKind::DuplicateSortField,
        &config.body_sort_order,
        |sort| Some((sort.field.clone(), sort.field.clone())),
    )
}

fn duplicate_calc_names(config: &ReportConfig) -> Vec<Violation> {
    repeated(
        ViolationKind::DuplicateCalcName,
        &config.custom_calculated_fields,
        |calc| Some((calc.folded_name(), calc.field_name.clone())),
    )
}

fn duplicate_groupings(config: &ReportConfig) -> Vec<Violation> {
    repeated(
        ViolationKind::DuplicateGrouping,
        config.group_by_fields.values(),
        |group| group.key().map(|key| (key.clone(), key)),
    )
}

fn duplicate_summary_fields(config: &ReportConfig) -> Vec<Violation> {
    repeated(
        ViolationKind::DuplicateSummaryField,
        &config.summary_fields,
        |field| Some((field.clone(), field.clone())),
    )
}

fn field_overlap(config: &ReportConfig) -> Vec<Violation> {
    let grouped: HashSet<String> = config
        .group_by_fields
        .values()
        .flat_map(|group| group.referenced_keys())
        .collect();
    if grouped.is_empty() {
        return Vec::new();
    }

    // Matched on the qualified key, reported by the bare field name.
    let mut reported = HashSet::new();
    config
        .report_columns
        .iter()
        .filter_map(|col| col.key().map(|key| (key, col)))
        .filter(|(key, _)| grouped.contains(key) && reported.insert(key.clone()))
        .map(|(_, col)| Violation::new(ViolationKind::FieldOverlap, col.field.clone()))
        .collect()
}
