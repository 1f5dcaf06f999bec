//! Report session: owns the published schema and the dataset store.
//!
//! The schema is published as an `Arc` and replaced wholesale on reload.
//! Readers take a snapshot and never observe a partially built schema.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::batch::{BatchError, BatchNormalizer, NormalizedBatch};
use crate::config::{Settings, StoreBackend};
use crate::index::SchemaIndex;
use crate::model::{ReportConfig, Schema};
use crate::store::{self, DatasetStore, MemoryStore, SqliteStore, StoreError};
use crate::validation::{self, ValidationMode, Verdict, Violation};

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The upstream batch response could not be split into parts.
    #[error("upstream integration error: {0}")]
    Upstream(#[from] BatchError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("settings error: {0}")]
    Settings(#[from] crate::config::SettingsError),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The configuration failed validation and must not be forwarded.
    /// The first violation is the user-facing message.
    #[error("{}", .violations.first().map(Violation::message).unwrap_or_default())]
    Rejected { violations: Vec<Violation> },
}

impl SessionError {
    /// The verdict equivalent of a rejection, if this is one.
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            SessionError::Rejected { violations } => violations.first().map(Verdict::fail),
            _ => None,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Stored form of a normalized batch. Unlike the wire form it keeps the
/// boundary and skip count, so a cache hit reports the same diagnostics.
#[derive(Debug, Serialize, Deserialize)]
struct CachedBatch {
    records: Vec<Value>,
    record_count: usize,
    skipped_parts: usize,
    boundary: String,
}

impl From<&NormalizedBatch> for CachedBatch {
    fn from(batch: &NormalizedBatch) -> Self {
        Self {
            records: batch.records.clone(),
            record_count: batch.record_count,
            skipped_parts: batch.skipped_parts,
            boundary: batch.boundary.clone(),
        }
    }
}

impl From<CachedBatch> for NormalizedBatch {
    fn from(cached: CachedBatch) -> Self {
        Self {
            records: cached.records,
            record_count: cached.record_count,
            skipped_parts: cached.skipped_parts,
            boundary: cached.boundary,
        }
    }
}

/// Per-session context for one report being edited.
pub struct ReportSession<S: DatasetStore = MemoryStore> {
    schema: RwLock<Option<Arc<Schema>>>,
    store: S,
    normalizer: BatchNormalizer,
    mode: ValidationMode,
}

impl ReportSession<MemoryStore> {
    /// A session with an in-memory store and default settings.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl ReportSession<SqliteStore> {
    /// A session backed by the SQLite store configured in `settings`.
    pub fn open_sqlite(settings: &Settings) -> SessionResult<Self> {
        let path = match settings.store.resolved_path()? {
            Some(path) => path,
            None => SqliteStore::default_path()?,
        };
        let store = SqliteStore::open(&path)?;
        Ok(Self::new(store).with_settings(settings))
    }
}

/// Either store backend, chosen from settings at runtime.
pub enum AnySession {
    Memory(ReportSession<MemoryStore>),
    Sqlite(ReportSession<SqliteStore>),
}

impl AnySession {
    pub fn from_settings(settings: &Settings) -> SessionResult<Self> {
        match settings.store.backend {
            StoreBackend::Memory => Ok(AnySession::Memory(
                ReportSession::in_memory().with_settings(settings),
            )),
            StoreBackend::Sqlite => Ok(AnySession::Sqlite(ReportSession::open_sqlite(settings)?)),
        }
    }
}

impl<S: DatasetStore> ReportSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            schema: RwLock::new(None),
            store,
            normalizer: BatchNormalizer::default(),
            mode: ValidationMode::default(),
        }
    }

    /// Apply validation and normalizer settings.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.normalizer = BatchNormalizer::new()
            .sanitize_placeholders(settings.normalizer.sanitize_placeholders);
        self.mode = settings.validation.mode;
        self
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.mode
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Replace the published schema.
    pub fn publish_schema(&self, schema: Schema) -> Arc<Schema> {
        let schema = Arc::new(schema);
        let mut slot = self.schema.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&schema));
        tracing::debug!(tables = schema.len(), "published schema");
        schema
    }

    /// Normalize a schema batch response and publish the result.
    pub fn load_schema(&self, raw: &str) -> SessionResult<Arc<Schema>> {
        let batch = self.normalizer.normalize(raw)?;
        Ok(self.publish_schema(Schema::from_records(&batch.records)))
    }

    /// The current schema, if one has been published.
    pub fn schema(&self) -> Option<Arc<Schema>> {
        self.schema
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Index over the current schema snapshot.
    pub fn index(&self) -> SchemaIndex {
        match self.schema() {
            Some(schema) => SchemaIndex::new(schema),
            None => SchemaIndex::unloaded(),
        }
    }

    // =========================================================================
    // Datasets
    // =========================================================================

    /// Normalize a batch response, reusing a cached result for an identical
    /// payload. A cache hit carries the same `boundary` and `skipped_parts`
    /// as the original run.
    pub fn normalize(&mut self, raw: &str) -> SessionResult<NormalizedBatch> {
        let key = store::batch_key(raw);
        if let Some(cached) = self.store.get::<CachedBatch>(&key)? {
            tracing::trace!(key = %key, "batch cache hit");
            return Ok(cached.into());
        }
        let batch = self.normalizer.normalize(raw)?;
        self.store.put(&key, &CachedBatch::from(&batch))?;
        Ok(batch)
    }

    /// Normalize a dataset response and store its records under `name`,
    /// replacing any earlier records for that name. Dataset responses are not
    /// added to the batch cache, so the store holds one entry per dataset.
    /// Returns the number of records stored.
    pub fn ingest_dataset(&mut self, name: &str, raw: &str) -> SessionResult<usize> {
        let batch = self.normalizer.normalize(raw)?;
        self.store.put(&store::dataset_key(name), &batch.records)?;
        tracing::debug!(dataset = name, records = batch.records.len(), "ingested dataset");
        Ok(batch.records.len())
    }

    pub fn dataset(&self, name: &str) -> SessionResult<Option<Vec<Value>>> {
        Ok(self.store.get(&store::dataset_key(name))?)
    }

    /// Drop every cached dataset and batch.
    pub fn clear_datasets(&mut self) -> SessionResult<()> {
        Ok(self.store.clear()?)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Legacy verdict for the editing surface.
    pub fn verdict(&self, config: &ReportConfig) -> Verdict {
        validation::validate(config)
    }

    /// Gate before saving or forwarding: `Err` blocks the operation.
    pub fn check_before_save(&self, config: &ReportConfig) -> SessionResult<()> {
        validation::validate_with(config, self.mode)
            .map_err(|violations| SessionError::Rejected { violations })
    }

    /// Serialize a configuration for the report-generation collaborator,
    /// only if it passes validation.
    pub fn prepare_for_generation(&self, config: &ReportConfig) -> SessionResult<Value> {
        self.check_before_save(config)?;
        serde_json::to_value(config).map_err(SessionError::Serialize)
    }
}
