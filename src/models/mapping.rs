//! Column mapping model
//!
//! A [`MappingSpec`] declares, for one target table, which typed column is
//! read from which simplified path of a [`RawRecord`](super::RawRecord). Its
//! JSON form is the wire schema shared with the schema-registration step and
//! with delegated synthesis:
//!
//! ```json
//! { "target_table": "casimage_cases",
//!   "columns": [ { "name": "age", "type": "int", "source_xpath": "/age" } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Int,
    Float,
    Date,
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(ColumnType::String),
            "int" => Ok(ColumnType::Int),
            "float" => Ok(ColumnType::Float),
            "date" => Ok(ColumnType::Date),
            other => Err(format!(
                "Unknown column type: {}. Use 'string', 'int', 'float' or 'date'.",
                other
            )),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Int => write!(f, "int"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Date => write!(f, "date"),
        }
    }
}

/// One output column of a mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Normalized column name (`[a-z0-9_]+`)
    pub name: String,
    /// Declared type used for coercion
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Simplified absolute path (`/A/B/C`)
    #[serde(rename = "source_xpath")]
    pub source_path: String,
}

impl ColumnMapping {
    /// Create a column mapping
    pub fn new(
        name: impl Into<String>,
        column_type: ColumnType,
        source_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            column_type,
            source_path: source_path.into(),
        }
    }
}

/// Ordered column-to-source-path mapping with declared types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSpec {
    /// Name of the flat table the rows belong to
    pub target_table: String,
    /// Columns in output order
    pub columns: Vec<ColumnMapping>,
}

impl MappingSpec {
    /// Create a mapping
    pub fn new(target_table: impl Into<String>, columns: Vec<ColumnMapping>) -> Self {
        Self {
            target_table: target_table.into(),
            columns,
        }
    }

    /// Parse a mapping from its wire JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the mapping to pretty-printed wire JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
