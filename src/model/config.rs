// src/model/config.rs
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the pseudo-table that holds user-defined calculated fields.
pub const CALCULATED_TABLE: &str = "calculated";

/// A report configuration as assembled by the editing surface.
///
/// Wire names follow the upstream payload, including `db_defination`.
/// Keys the engine does not interpret are kept in `extra` so the
/// configuration can be forwarded unchanged once it passes validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Join definitions (display order only)
    pub db_defination: Vec<JoinDefinition>,
    /// Body columns
    pub report_columns: Vec<ColumnRef>,
    /// Body sort order
    pub body_sort_order: Vec<SortField>,
    /// User-defined formula fields
    pub custom_calculated_fields: Vec<CalculatedField>,
    /// Groupings by name, in display order
    pub group_by_fields: IndexMap<String, GroupDefinition>,
    /// Summary field names
    pub summary_fields: Vec<String>,
    /// Filters (opaque to the engine)
    #[serde(skip_serializing_if = "Value::is_null")]
    pub filters: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A declared relationship between two tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinDefinition {
    pub primary_table: String,
    pub joined_table: String,
    pub join_type: JoinType,
    pub source_field: String,
    pub target_field: String,
}

impl JoinDefinition {
    pub fn new(primary_table: impl Into<String>, joined_table: impl Into<String>) -> Self {
        Self {
            primary_table: primary_table.into(),
            joined_table: joined_table.into(),
            ..Default::default()
        }
    }

    pub fn on(mut self, source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        self.source_field = source_field.into();
        self.target_field = target_field.into();
        self
    }

    pub fn with_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    #[default]
    #[serde(alias = "INNER", alias = "Inner")]
    Inner,
    #[serde(alias = "LEFT", alias = "Left")]
    Left,
    #[serde(alias = "RIGHT", alias = "Right")]
    Right,
}

/// A reference to a schema field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnRef {
    pub table: String,
    pub field: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Identity key `table.field`, or `None` when either part is missing.
    pub fn key(&self) -> Option<String> {
        qualified_key(&self.table, &self.field)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.field)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

impl SortField {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

/// A user-defined formula field living in the `calculated` pseudo-table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatedField {
    pub field_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub formula: String,
}

impl CalculatedField {
    pub fn new(field_name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            label: None,
            formula: formula.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Case-folded name used for uniqueness.
    pub fn folded_name(&self) -> String {
        self.field_name.to_lowercase()
    }

    /// Display label, falling back to the field name.
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.field_name,
        }
    }
}

/// A reporting dimension with its display and subtotal fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDefinition {
    pub table: String,
    pub field: String,
    pub display: Vec<ColumnRef>,
    pub group_total: Vec<ColumnRef>,
}

impl GroupDefinition {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
            ..Default::default()
        }
    }

    pub fn with_display(mut self, column: ColumnRef) -> Self {
        self.display.push(column);
        self
    }

    pub fn with_total(mut self, column: ColumnRef) -> Self {
        self.group_total.push(column);
        self
    }

    /// Key of the group's own field.
    pub fn key(&self) -> Option<String> {
        qualified_key(&self.table, &self.field)
    }

    /// Keys of every field the group references: its own, display and totals.
    pub fn referenced_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.key().into_iter().chain(
            self.display
                .iter()
                .chain(self.group_total.iter())
                .filter_map(ColumnRef::key),
        )
    }
}

fn qualified_key(table: &str, field: &str) -> Option<String> {
    if table.is_empty() || field.is_empty() {
        None
    } else {
        Some(format!("{}.{}", table, field))
    }
}
