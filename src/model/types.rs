//! Semantic field types declared by the schema source.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic type of a schema field.
///
/// Parsed case-insensitively from the wire. Unknown names are kept as
/// [`SemanticType::Other`] so a schema from a newer upstream still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SemanticType {
    #[default]
    Text,
    Number,
    Date,
    Currency,
    Percentage,
    Boolean,
    Other(String),
}

impl SemanticType {
    /// Check if this type belongs to the numeric supertype.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::Number | SemanticType::Currency | SemanticType::Percentage
        )
    }

    /// Check if a field of this type passes a type filter.
    ///
    /// A `Number` filter admits the whole numeric supertype; every other
    /// filter requires an exact match.
    pub fn satisfies(&self, filter: &SemanticType) -> bool {
        match filter {
            SemanticType::Number => self.is_numeric(),
            other => self == other,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SemanticType::Text => "text",
            SemanticType::Number => "number",
            SemanticType::Date => "date",
            SemanticType::Currency => "currency",
            SemanticType::Percentage => "percentage",
            SemanticType::Boolean => "boolean",
            SemanticType::Other(name) => name,
        }
    }
}

impl From<&str> for SemanticType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => SemanticType::Text,
            "number" | "numeric" => SemanticType::Number,
            "date" => SemanticType::Date,
            "currency" => SemanticType::Currency,
            "percentage" | "percent" => SemanticType::Percentage,
            "boolean" | "bool" => SemanticType::Boolean,
            _ => SemanticType::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for SemanticType {
    fn from(s: String) -> Self {
        SemanticType::from(s.as_str())
    }
}

impl From<SemanticType> for String {
    fn from(t: SemanticType) -> Self {
        match t {
            SemanticType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for SemanticType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SemanticType::from(s))
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
