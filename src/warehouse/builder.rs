//! Dimensional modeler
//!
//! Surrogate keys are assigned in the same pass that records each source
//! row's key, so every fact row references an existing dimension row.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::config::{DimensionGroup, StarSchemaConfig};
use super::{WarehouseError, WarehouseResult};
use crate::models::{
    DimensionRow, DimensionTable, FactRow, FactTable, StarSchema, TypedRow, Value,
};

type Tuple = Vec<Option<Value>>;

/// Deduplicating dimension under construction
struct DimensionBuilder {
    table: DimensionTable,
    keys: HashMap<Tuple, u64>,
}

impl DimensionBuilder {
    fn new(group: &DimensionGroup, columns: Vec<String>) -> Self {
        Self {
            table: DimensionTable {
                name: group.name.clone(),
                key_column: group.key_column.clone(),
                columns,
                rows: Vec::new(),
            },
            keys: HashMap::new(),
        }
    }

    /// Surrogate key of the row's tuple, inserting it when first seen
    fn key_for(&mut self, row: &TypedRow) -> u64 {
        let tuple: Tuple = self
            .table
            .columns
            .iter()
            .map(|c| row.get(c).cloned())
            .collect();
        if let Some(key) = self.keys.get(&tuple) {
            return *key;
        }
        let key = self.table.rows.len() as u64 + 1;
        self.table.rows.push(DimensionRow {
            key,
            values: tuple.clone(),
        });
        self.keys.insert(tuple, key);
        key
    }
}

/// Builds a [`StarSchema`] from enriched rows
#[derive(Debug, Clone)]
pub struct DimensionalModeler {
    config: StarSchemaConfig,
}

impl DimensionalModeler {
    /// Create a modeler, validating the layout
    pub fn new(config: StarSchemaConfig) -> WarehouseResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StarSchemaConfig {
        &self.config
    }

    /// Build dimension and fact tables.
    ///
    /// Configured columns absent from every row are skipped. A group left
    /// with no present column is a configuration error unless `rows` is empty.
    pub fn build(&self, rows: &[TypedRow]) -> WarehouseResult<StarSchema> {
        let present: HashSet<&str> = rows.iter().flat_map(|r| r.columns()).collect();
        let keep = |columns: &[String]| -> Vec<String> {
            columns
                .iter()
                .filter(|c| rows.is_empty() || present.contains(c.as_str()))
                .cloned()
                .collect()
        };

        let mut dimensions = Vec::with_capacity(self.config.groups.len());
        for group in &self.config.groups {
            let columns = keep(&group.columns);
            if columns.is_empty() {
                return Err(WarehouseError::Configuration(format!(
                    "no column of dimension group '{}' is present in the data",
                    group.name
                )));
            }
            if columns.len() < group.columns.len() {
                debug!(
                    "Dimension {} uses {} of {} configured columns",
                    group.name,
                    columns.len(),
                    group.columns.len()
                );
            }
            dimensions.push(DimensionBuilder::new(group, columns));
        }

        let fact_config = &self.config.fact;
        let fact_columns = keep(&fact_config.columns);
        let mut fact = FactTable {
            name: fact_config.name.clone(),
            key_column: fact_config.key_column.clone(),
            natural_key_column: fact_config.natural_key_column.clone(),
            foreign_key_columns: self.config.groups.iter().map(|g| g.key_column.clone()).collect(),
            columns: fact_columns,
            rows: Vec::new(),
        };
        let mut seen_facts: HashSet<(String, Vec<u64>, Tuple)> = HashSet::new();

        for (ordinal, row) in rows.iter().enumerate() {
            let foreign_keys: Vec<u64> = dimensions.iter_mut().map(|d| d.key_for(row)).collect();
            let natural_key = fact_config
                .id_column
                .as_deref()
                .and_then(|c| row.get(c))
                .map(|v| v.to_string())
                .unwrap_or_else(|| ordinal.to_string());
            let values: Tuple = fact.columns.iter().map(|c| row.get(c).cloned()).collect();

            if seen_facts.insert((natural_key.clone(), foreign_keys.clone(), values.clone())) {
                fact.rows.push(FactRow {
                    key: fact.rows.len() as u64 + 1,
                    natural_key,
                    foreign_keys,
                    values,
                });
            }
        }

        let dimensions: Vec<DimensionTable> = dimensions.into_iter().map(|d| d.table).collect();
        for dim in &dimensions {
            info!("Dimension {}: {} rows", dim.name, dim.len());
        }
        info!("Fact {}: {} rows", fact.name, fact.len());

        Ok(StarSchema { dimensions, fact })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str, sex: &str, age: i64, diagnosis: &str) -> TypedRow {
        TypedRow::from_cells([
            ("id", Some(Value::from(id))),
            ("sex", Some(Value::from(sex))),
            ("age", Some(Value::Int(age))),
            ("date", None),
            ("diagnosis", Some(Value::from(diagnosis))),
        ])
    }

    fn modeler() -> DimensionalModeler {
        DimensionalModeler::new(StarSchemaConfig::casimage()).unwrap()
    }

    #[test]
    fn test_identical_tuples_share_key() {
        let rows = vec![
            case("1", "M", 40, "fracture"),
            case("2", "M", 40, "tumeur"),
            case("3", "F", 40, "fracture"),
        ];
        let star = modeler().build(&rows).unwrap();

        let patient = star.dimension("dim_patient").unwrap();
        assert_eq!(patient.columns, vec!["sex", "age"]);
        assert_eq!(patient.len(), 2);

        let fks: Vec<_> = star.fact.rows.iter().map(|r| r.foreign_keys.clone()).collect();
        assert_eq!(fks, vec![vec![1, 1, 1], vec![1, 1, 2], vec![2, 1, 1]]);
    }

    #[test]
    fn test_join_is_total() {
        let rows = vec![case("1", "M", 40, "a"), case("2", "", 12, "b"), case("3", "F", 90, "a")];
        let star = modeler().build(&rows).unwrap();
        for fact in &star.fact.rows {
            for (dim, key) in star.dimensions.iter().zip(&fact.foreign_keys) {
                assert!(dim.row(*key).is_some(), "{} missing key {}", dim.name, key);
            }
        }
    }

    #[test]
    fn test_null_tuples_are_equal() {
        let rows = vec![case("1", "M", 40, "a"), case("2", "F", 50, "b")];
        let star = modeler().build(&rows).unwrap();
        let exam = star.dimension("dim_exam").unwrap();
        assert_eq!(exam.columns, vec!["date"]);
        assert_eq!(exam.len(), 1);
    }

    #[test]
    fn test_natural_key_falls_back_to_ordinal() {
        let mut rows = vec![case("x", "M", 40, "a"), case("y", "M", 41, "a")];
        rows[1].set("id", None);
        let star = modeler().build(&rows).unwrap();
        let keys: Vec<_> = star.fact.rows.iter().map(|r| r.natural_key.as_str()).collect();
        assert_eq!(keys, vec!["x", "1"]);
    }

    #[test]
    fn test_duplicate_facts_collapse() {
        let rows = vec![case("1", "M", 40, "a"), case("1", "M", 40, "a")];
        let star = modeler().build(&rows).unwrap();
        assert_eq!(star.fact.len(), 1);
        assert_eq!(star.fact.rows[0].key, 1);
    }

    #[test]
    fn test_missing_group_columns_is_error() {
        let rows = vec![TypedRow::from_cells([("id", Some(Value::from("1")))])];
        assert!(matches!(
            modeler().build(&rows),
            Err(WarehouseError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_dataset_yields_empty_tables() {
        let star = modeler().build(&[]).unwrap();
        assert_eq!(star.dimensions.len(), 3);
        assert!(star.dimensions.iter().all(|d| d.is_empty()));
        assert!(star.fact.is_empty());
    }
}
