//! Tolerant normalizer for multi-part batch responses.
//!
//! The upstream record store answers batched reads with a text payload cut
//! into parts by a boundary line of the form `--b_<token>`. Each part may
//! carry transport headers followed by one JSON object whose `value` array
//! holds records:
//!
//! ```text
//! --b_12345
//! Content-Type: application/json
//!
//! {"value":[{"Item":"A-100","QtyAvailable": ?}]}
//! --b_12345--
//! ```
//!
//! The payload is recovered part by part. A fragment is located with the
//! first `{` and the last `}` of its part rather than a tokenizer, so a part
//! holding several objects, or braces inside header text, is taken as one
//! span. Only a missing boundary is fatal; any other malformation drops the
//! affected part and keeps the rest.

mod error;

pub use error::{BatchError, BatchResult};

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boundary marker: `--b_` followed by the rest of the line.
static BOUNDARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--b_[^\r\n]+").unwrap());

/// Bare `?` used upstream in place of a missing value.
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*\?\s*([,}])").unwrap());

/// Flattened result of a batch response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBatch {
    /// Records from every parseable part, in part order.
    pub records: Vec<Value>,
    /// Number of parts that parsed, not the number of records.
    pub record_count: usize,
    /// Parts dropped because they were unparseable.
    #[serde(skip)]
    pub skipped_parts: usize,
    /// The boundary token the payload was split on.
    #[serde(skip)]
    pub boundary: String,
}

/// Why a part contributed nothing.
#[derive(Debug)]
enum PartOutcome {
    Parsed(Value),
    NoPayload,
    Unparseable(serde_json::Error),
}

/// Normalizer for batch responses.
#[derive(Debug, Clone)]
pub struct BatchNormalizer {
    sanitize_placeholders: bool,
}

impl Default for BatchNormalizer {
    fn default() -> Self {
        Self {
            sanitize_placeholders: true,
        }
    }
}

impl BatchNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable rewriting of bare `?` values to `null`.
    pub fn sanitize_placeholders(mut self, enabled: bool) -> Self {
        self.sanitize_placeholders = enabled;
        self
    }

    /// Parse a raw batch response into a flat record set.
    pub fn normalize(&self, raw: &str) -> BatchResult<NormalizedBatch> {
        let boundary = find_boundary(raw).ok_or(BatchError::MalformedTransport {
            length: raw.len(),
        })?;

        let mut batch = NormalizedBatch {
            boundary: boundary.to_string(),
            ..Default::default()
        };

        for (index, part) in raw.split(boundary).enumerate() {
            match self.parse_part(part) {
                PartOutcome::Parsed(value) => {
                    batch.record_count += 1;
                    if let Value::Object(mut object) = value {
                        if let Some(Value::Array(items)) = object.remove("value") {
                            batch.records.extend(items);
                        }
                    }
                }
                PartOutcome::NoPayload => {
                    tracing::trace!(part = index, "batch part carries no payload");
                }
                PartOutcome::Unparseable(error) => {
                    tracing::warn!(part = index, error = %error, "skipping unparseable batch part");
                    batch.skipped_parts += 1;
                }
            }
        }

        tracing::debug!(
            boundary = %batch.boundary,
            parts = batch.record_count,
            records = batch.records.len(),
            skipped = batch.skipped_parts,
            "normalized batch response"
        );

        Ok(batch)
    }

    fn parse_part(&self, part: &str) -> PartOutcome {
        let Some(fragment) = extract_fragment(part) else {
            return PartOutcome::NoPayload;
        };
        let parsed = if self.sanitize_placeholders {
            serde_json::from_str(&sanitize(fragment))
        } else {
            serde_json::from_str(fragment)
        };
        match parsed {
            Ok(value) => PartOutcome::Parsed(value),
            Err(error) => PartOutcome::Unparseable(error),
        }
    }
}

/// Parse a raw batch response with default settings.
pub fn normalize(raw: &str) -> BatchResult<NormalizedBatch> {
    BatchNormalizer::default().normalize(raw)
}

/// The first boundary token in the payload.
pub fn find_boundary(raw: &str) -> Option<&str> {
    BOUNDARY_PATTERN.find(raw).map(|m| m.as_str())
}

/// Span from the first `{` through the last `}`, if correctly ordered.
pub fn extract_fragment(part: &str) -> Option<&str> {
    let start = part.find('{')?;
    let end = part.rfind('}')?;
    if start < end {
        Some(&part[start..=end])
    } else {
        None
    }
}

/// Rewrite `: ?` before `,` or `}` to `: null`.
pub fn sanitize(fragment: &str) -> std::borrow::Cow<'_, str> {
    PLACEHOLDER_PATTERN.replace_all(fragment, ": null$1")
}
