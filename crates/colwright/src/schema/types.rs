//! Core type definitions for column typing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColwrightError;

/// Logical kind of a column's data, independent of how it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Float,
    /// Free text.
    String,
    /// Boolean values.
    Boolean,
    /// Date with time of day.
    #[serde(rename = "datetime")]
    DateTime,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Values drawn from a fixed set of categories.
    Categorical,
    /// Ordered sequences.
    List,
    /// Key/value objects.
    Dictionary,
    /// Unable to determine (e.g. every value missing).
    Object,
}

impl SemanticType {
    /// Every semantic type, in declaration order.
    pub const ALL: [SemanticType; 11] = [
        SemanticType::Integer,
        SemanticType::Float,
        SemanticType::String,
        SemanticType::Boolean,
        SemanticType::DateTime,
        SemanticType::Date,
        SemanticType::Time,
        SemanticType::Categorical,
        SemanticType::List,
        SemanticType::Dictionary,
        SemanticType::Object,
    ];

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::String => "string",
            SemanticType::Boolean => "boolean",
            SemanticType::DateTime => "datetime",
            SemanticType::Date => "date",
            SemanticType::Time => "time",
            SemanticType::Categorical => "categorical",
            SemanticType::List => "list",
            SemanticType::Dictionary => "dictionary",
            SemanticType::Object => "object",
        }
    }

    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Integer | SemanticType::Float)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            SemanticType::DateTime | SemanticType::Date | SemanticType::Time
        )
    }

    /// Returns true if this type holds nested structures.
    pub fn is_structured(&self) -> bool {
        matches!(self, SemanticType::List | SemanticType::Dictionary)
    }
}

impl Default for SemanticType {
    fn default() -> Self {
        SemanticType::Object
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = ColwrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "integer" | "int" => Ok(SemanticType::Integer),
            "float" | "double" => Ok(SemanticType::Float),
            "string" | "str" | "text" => Ok(SemanticType::String),
            "boolean" | "bool" => Ok(SemanticType::Boolean),
            "datetime" => Ok(SemanticType::DateTime),
            "date" => Ok(SemanticType::Date),
            "time" => Ok(SemanticType::Time),
            "categorical" | "category" => Ok(SemanticType::Categorical),
            "list" | "array" => Ok(SemanticType::List),
            "dictionary" | "dict" | "json" => Ok(SemanticType::Dictionary),
            "object" => Ok(SemanticType::Object),
            other => Err(ColwrightError::Validation(format!(
                "Unknown target type: '{}'",
                other
            ))),
        }
    }
}

/// Physical storage of a column, derived from the cells it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    Boolean,
    Integer,
    /// Floats, or a mix of integers and floats.
    Float,
    /// Column carries an explicit category list.
    Categorical,
    DateTime,
    Date,
    Time,
    /// Text, nested values or any mix of kinds.
    Generic,
}
