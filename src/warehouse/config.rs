//! Star schema layout configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{WarehouseError, WarehouseResult};

/// Minimum number of dimension groups in a star schema
pub const MIN_GROUPS: usize = 3;

/// Columns grouped into one dimension table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionGroup {
    pub name: String,
    pub key_column: String,
    pub columns: Vec<String>,
}

impl DimensionGroup {
    pub fn new(name: impl Into<String>, key_column: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            key_column: key_column.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Fact table layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactConfig {
    pub name: String,
    pub key_column: String,
    pub natural_key_column: String,
    /// Row column holding the case identifier
    #[serde(default)]
    pub id_column: Option<String>,
    /// Fact-only columns
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Dimension groups plus fact table layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarSchemaConfig {
    pub fact: FactConfig,
    pub groups: Vec<DimensionGroup>,
}

impl Default for StarSchemaConfig {
    fn default() -> Self {
        Self::casimage()
    }
}

impl StarSchemaConfig {
    /// Patient, exam and pathology dimensions around a case fact table
    pub fn casimage() -> Self {
        Self {
            fact: FactConfig {
                name: "fact_case".to_string(),
                key_column: "fact_case_key".to_string(),
                natural_key_column: "case_natural_key".to_string(),
                id_column: Some("id".to_string()),
                columns: vec![
                    "source_file".to_string(),
                    "clinicalpresentation".to_string(),
                    "commentary".to_string(),
                ],
            },
            groups: vec![
                DimensionGroup::new(
                    "dim_patient",
                    "patient_key",
                    &["sex", "age", "birthdate", "age_group"],
                ),
                DimensionGroup::new(
                    "dim_exam",
                    "exam_key",
                    &["date", "year", "hospital", "department"],
                ),
                DimensionGroup::new(
                    "dim_pathology",
                    "pathology_key",
                    &["diagnosis", "chapter", "description", "keywords", "anatomy", "title"],
                ),
            ],
        }
    }

    /// Check the structural rules of the layout
    pub fn validate(&self) -> WarehouseResult<()> {
        if self.groups.len() < MIN_GROUPS {
            return Err(WarehouseError::Configuration(format!(
                "at least {} dimension groups are required, found {}",
                MIN_GROUPS,
                self.groups.len()
            )));
        }

        let mut names = HashSet::new();
        let mut keys: HashSet<&str> = [
            self.fact.key_column.as_str(),
            self.fact.natural_key_column.as_str(),
        ]
        .into_iter()
        .collect();
        if keys.len() < 2 {
            return Err(WarehouseError::Configuration(format!(
                "fact key column '{}' collides with the natural key column",
                self.fact.key_column
            )));
        }

        for group in &self.groups {
            if group.name.trim().is_empty() {
                return Err(WarehouseError::Configuration(
                    "dimension group name must not be empty".to_string(),
                ));
            }
            if group.columns.is_empty() {
                return Err(WarehouseError::Configuration(format!(
                    "dimension group '{}' has no columns",
                    group.name
                )));
            }
            if !names.insert(group.name.as_str()) || group.name == self.fact.name {
                return Err(WarehouseError::Configuration(format!(
                    "duplicate table name '{}'",
                    group.name
                )));
            }
            if !keys.insert(group.key_column.as_str()) {
                return Err(WarehouseError::Configuration(format!(
                    "key column '{}' of group '{}' collides with another key column",
                    group.key_column, group.name
                )));
            }
        }

        Ok(())
    }
}
