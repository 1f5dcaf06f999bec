// src/model/schema.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::types::SemanticType;

/// A field declared by the schema source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: SemanticType,
}

impl FieldDef {
    pub fn new(label: impl Into<String>, field_type: SemanticType) -> Self {
        Self {
            label: label.into(),
            field_type,
        }
    }
}

/// Fields of one declared table, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSchema {
    fields: IndexMap<String, FieldDef>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.fields.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Declared catalogue of tables and their typed fields.
///
/// A schema is built once per report session and never mutated afterwards;
/// a reload replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    tables: IndexMap<String, TableSchema>,
}

/// One row of a flat schema listing returned by the record store.
#[derive(Debug, Deserialize)]
struct SchemaRecord {
    #[serde(alias = "TableName", alias = "Table")]
    table: String,
    #[serde(alias = "FieldName", alias = "Field")]
    field: String,
    #[serde(default, alias = "Label", alias = "DisplayName")]
    label: Option<String>,
    #[serde(rename = "type", default, alias = "Type", alias = "DataType")]
    field_type: Option<SemanticType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, table: TableSchema) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    /// Build a schema from flat `{table, field, label?, type?}` records.
    ///
    /// Records that do not have that shape are skipped. Tables and fields
    /// keep the order in which they first appear.
    pub fn from_records(records: &[Value]) -> Self {
        let mut tables: IndexMap<String, TableSchema> = IndexMap::new();
        let mut skipped = 0usize;

        for (position, record) in records.iter().enumerate() {
            let row = match SchemaRecord::deserialize(record) {
                Ok(row) => row,
                Err(error) => {
                    tracing::warn!(position, error = %error, "skipping malformed schema record");
                    skipped += 1;
                    continue;
                }
            };

            if row.table.is_empty() || row.field.is_empty() {
                tracing::warn!(position, "skipping schema record without table or field");
                skipped += 1;
                continue;
            }

            let label = row
                .label
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| row.field.clone());
            let def = FieldDef::new(label, row.field_type.unwrap_or_default());

            tables
                .entry(row.table)
                .or_default()
                .fields
                .insert(row.field, def);
        }

        tracing::debug!(
            tables = tables.len(),
            records = records.len(),
            skipped,
            "built schema from records"
        );

        Self { tables }
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Table names in declaration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
