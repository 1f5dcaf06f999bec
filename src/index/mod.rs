//! Field-selection index over a declared schema.
//!
//! Absence is empty: a missing table, or a schema that has not loaded yet,
//! yields an empty listing rather than an error so selection lists can
//! render while data is still arriving.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::graph::connected_tables;
use crate::model::{
    CalculatedField, FieldDef, ReportConfig, Schema, SemanticType, TableSchema, CALCULATED_TABLE,
};

/// A selectable field as presented to selection lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: SemanticType,
}

/// Where the fields of a requested table come from.
#[derive(Debug, Clone, Copy)]
pub enum TableSource<'a> {
    /// A table declared in the schema.
    Named(&'a TableSchema),
    /// The `calculated` pseudo-table, backed by the configuration.
    Calculated(&'a [CalculatedField]),
    /// Unknown table, or no schema loaded.
    Absent,
}

impl<'a> TableSource<'a> {
    /// Fields of this source in declaration order, before type filtering.
    fn options(self) -> Vec<FieldOption> {
        match self {
            TableSource::Named(table) => table
                .fields()
                .map(|(name, def)| FieldOption {
                    value: name.to_string(),
                    label: def.label.clone(),
                    field_type: def.field_type.clone(),
                })
                .collect(),
            TableSource::Calculated(fields) => fields
                .iter()
                .filter(|calc| !calc.field_name.is_empty())
                .map(|calc| FieldOption {
                    value: calc.field_name.clone(),
                    label: calc.display_label().to_string(),
                    field_type: SemanticType::Number,
                })
                .collect(),
            TableSource::Absent => Vec::new(),
        }
    }
}

/// Read-only view over a published schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    schema: Option<Arc<Schema>>,
}

impl SchemaIndex {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    /// An index with no schema loaded yet.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.schema.is_some()
    }

    /// Every declared table. Never includes the `calculated` pseudo-table.
    pub fn list_tables(&self) -> Vec<String> {
        match &self.schema {
            Some(schema) => schema.table_names().map(str::to_string).collect(),
            None => Vec::new(),
        }
    }

    /// Resolve a table name to its field source.
    pub fn resolve<'a>(&'a self, table: &str, config: &'a ReportConfig) -> TableSource<'a> {
        if table == CALCULATED_TABLE {
            return TableSource::Calculated(&config.custom_calculated_fields);
        }
        match self.schema.as_deref().and_then(|schema| schema.table(table)) {
            Some(table) => TableSource::Named(table),
            None => {
                tracing::trace!(table, loaded = self.is_loaded(), "table not in schema");
                TableSource::Absent
            }
        }
    }

    /// Fields of `table`, optionally restricted to a semantic type.
    ///
    /// A `Number` filter admits number, currency and percentage fields.
    pub fn list_fields(
        &self,
        table: &str,
        config: &ReportConfig,
        type_filter: Option<&SemanticType>,
    ) -> Vec<FieldOption> {
        let mut options = self.resolve(table, config).options();
        if let Some(filter) = type_filter {
            options.retain(|option| option.field_type.satisfies(filter));
        }
        options
    }

    /// Point lookup of a declared field.
    pub fn field(&self, table: &str, field: &str) -> Option<&FieldDef> {
        self.schema.as_deref()?.table(table)?.field(field)
    }

    /// Tables offered when building the report body: those wired by joins,
    /// followed by the pseudo-table when calculated fields exist.
    pub fn body_tables(&self, config: &ReportConfig) -> Vec<String> {
        let mut tables: Vec<String> = connected_tables(config).into_iter().collect();
        let has_calculated = config
            .custom_calculated_fields
            .iter()
            .any(|calc| !calc.field_name.is_empty());
        if has_calculated {
            tables.push(CALCULATED_TABLE.to_string());
        }
        tables
    }
}
