//! Star schema output model

use serde::Serialize;

use super::row::Value;

/// Deduplicated dimension row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionRow {
    /// Surrogate key, sequential from 1
    pub key: u64,
    /// Attribute values aligned with [`DimensionTable::columns`]
    pub values: Vec<Option<Value>>,
}

/// Deduplicated table of descriptive attributes keyed by surrogate key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionTable {
    pub name: String,
    /// Name of the surrogate key column
    pub key_column: String,
    /// Attribute columns, in configuration order
    pub columns: Vec<String>,
    pub rows: Vec<DimensionRow>,
}

impl DimensionTable {
    /// Full column list, surrogate key first
    pub fn column_list(&self) -> Vec<String> {
        std::iter::once(self.key_column.clone())
            .chain(self.columns.iter().cloned())
            .collect()
    }

    /// Row with the given surrogate key
    pub fn row(&self, key: u64) -> Option<&DimensionRow> {
        // Keys are dense and sequential from 1
        let index = usize::try_from(key).ok()?.checked_sub(1)?;
        self.rows.get(index).filter(|r| r.key == key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One fact row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FactRow {
    /// Fact key, sequential from 1
    pub key: u64,
    pub natural_key: String,
    /// One surrogate key per dimension, aligned with [`FactTable::foreign_key_columns`]
    pub foreign_keys: Vec<u64>,
    /// Fact-only values aligned with [`FactTable::columns`]
    pub values: Vec<Option<Value>>,
}

/// Table of cases referencing dimension surrogate keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactTable {
    pub name: String,
    pub key_column: String,
    pub natural_key_column: String,
    pub foreign_key_columns: Vec<String>,
    /// Fact-only columns
    pub columns: Vec<String>,
    pub rows: Vec<FactRow>,
}

impl FactTable {
    /// Full column list: fact key, natural key, foreign keys, fact-only columns
    pub fn column_list(&self) -> Vec<String> {
        let mut list = vec![self.key_column.clone(), self.natural_key_column.clone()];
        list.extend(self.foreign_key_columns.iter().cloned());
        list.extend(self.columns.iter().cloned());
        list
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Dimension tables plus the fact table of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarSchema {
    pub dimensions: Vec<DimensionTable>,
    pub fact: FactTable,
}

impl StarSchema {
    /// Dimension by table name
    pub fn dimension(&self, name: &str) -> Option<&DimensionTable> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}
