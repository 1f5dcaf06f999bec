//! # Reportsmith
//!
//! Integrity engine for multi-table report configurations.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Batch response (boundary-delimited text)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [batch]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Flat records + parsed part count            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [model::Schema::from_records]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Schema (published once per session, immutable)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [index + graph]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Selectable tables and fields for a ReportConfig      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Verdict: only valid configurations are forwarded    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage is synchronous and performs no I/O. [`session::ReportSession`]
//! ties the stages together around an injected [`store::DatasetStore`].

pub mod batch;
pub mod config;
pub mod graph;
pub mod index;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::batch::{normalize, BatchError, BatchNormalizer, NormalizedBatch};
    pub use crate::graph::{connected_tables, RelationshipGraph};
    pub use crate::index::{FieldOption, SchemaIndex, TableSource};
    pub use crate::model::{
        CalculatedField, ColumnRef, FieldDef, GroupDefinition, JoinDefinition, JoinType,
        ReportConfig, Schema, SemanticType, SortField, SortOrder, TableSchema, CALCULATED_TABLE,
    };
    pub use crate::session::{ReportSession, SessionError};
    pub use crate::store::{DatasetStore, MemoryStore, SqliteStore};
    pub use crate::validation::{validate, ValidationMode, Verdict, Violation, ViolationKind};
}

// Also export at crate root for convenience
pub use batch::normalize;
pub use model::{ReportConfig, Schema};
pub use validation::{validate, Verdict};
