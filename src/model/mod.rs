//! Shared data contracts: the declared schema and the report configuration.

pub mod config;
pub mod schema;
pub mod types;

pub use config::{
    CalculatedField, ColumnRef, GroupDefinition, JoinDefinition, JoinType, ReportConfig,
    SortField, SortOrder, CALCULATED_TABLE,
};
pub use schema::{FieldDef, Schema, TableSchema};
pub use types::SemanticType;
