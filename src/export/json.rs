//! JSON exporter

use serde_json::{Value as JsonValue, json};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ExportError, ExportResult, write_file};
use crate::models::{DimensionTable, FactTable, MappingSpec, StarSchema, TypedRow, Value};

/// File name of the exported mapping
pub const MAPPING_FILE: &str = "mapping.json";
/// File name of the exported enriched rows
pub const ROWS_FILE: &str = "rows.json";

fn cell(value: &Option<Value>) -> JsonValue {
    serde_json::to_value(value).unwrap_or(JsonValue::Null)
}

/// `{name, columns, rows}` with each row as an array, surrogate key first
pub fn dimension_to_json(table: &DimensionTable) -> JsonValue {
    let rows: Vec<JsonValue> = table
        .rows
        .iter()
        .map(|row| {
            let mut values = vec![json!(row.key)];
            values.extend(row.values.iter().map(cell));
            JsonValue::Array(values)
        })
        .collect();
    json!({
        "name": table.name,
        "columns": table.column_list(),
        "rows": rows,
    })
}

/// `{name, columns, rows}` in fact column order
pub fn fact_to_json(table: &FactTable) -> JsonValue {
    let rows: Vec<JsonValue> = table
        .rows
        .iter()
        .map(|row| {
            let mut values = vec![json!(row.key), json!(row.natural_key)];
            values.extend(row.foreign_keys.iter().map(|k| json!(k)));
            values.extend(row.values.iter().map(cell));
            JsonValue::Array(values)
        })
        .collect();
    json!({
        "name": table.name,
        "columns": table.column_list(),
        "rows": rows,
    })
}

/// Writes run artifacts into an output directory
#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Serialize the mapping in its wire schema
    pub fn export_mapping(spec: &MappingSpec) -> Result<ExportResult, ExportError> {
        Ok(ExportResult {
            content: spec.to_json()?,
            format: "json".to_string(),
        })
    }

    /// Serialize rows as an array of objects, nulls included
    pub fn export_rows(rows: &[TypedRow]) -> Result<ExportResult, ExportError> {
        Ok(ExportResult {
            content: serde_json::to_string_pretty(rows)?,
            format: "json".to_string(),
        })
    }

    fn write(&self, file_name: &str, content: &str) -> Result<PathBuf, ExportError> {
        write_file(&self.output_dir, file_name, content)
    }

    pub fn write_mapping(&self, spec: &MappingSpec) -> Result<PathBuf, ExportError> {
        self.write(MAPPING_FILE, &Self::export_mapping(spec)?.content)
    }

    pub fn write_rows(&self, rows: &[TypedRow]) -> Result<PathBuf, ExportError> {
        self.write(ROWS_FILE, &Self::export_rows(rows)?.content)
    }

    /// Write one file per table, replacing earlier runs
    pub fn write_star(&self, star: &StarSchema) -> Result<Vec<PathBuf>, ExportError> {
        let mut written = Vec::with_capacity(star.dimensions.len() + 1);
        for dim in &star.dimensions {
            let content = serde_json::to_string_pretty(&dimension_to_json(dim))?;
            written.push(self.write(&format!("{}.json", dim.name), &content)?);
        }
        let content = serde_json::to_string_pretty(&fact_to_json(&star.fact))?;
        written.push(self.write(&format!("{}.json", star.fact.name), &content)?);

        info!(
            "Wrote {} tables to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnMapping, ColumnType, DimensionRow, FactRow};
    use tempfile::tempdir;

    fn star() -> StarSchema {
        StarSchema {
            dimensions: vec![DimensionTable {
                name: "dim_patient".into(),
                key_column: "patient_key".into(),
                columns: vec!["sex".into(), "age".into()],
                rows: vec![DimensionRow {
                    key: 1,
                    values: vec![Some(Value::from("F")), None],
                }],
            }],
            fact: FactTable {
                name: "fact_case".into(),
                key_column: "fact_case_key".into(),
                natural_key_column: "case_natural_key".into(),
                foreign_key_columns: vec!["patient_key".into()],
                columns: vec!["source_file".into()],
                rows: vec![FactRow {
                    key: 1,
                    natural_key: "12".into(),
                    foreign_keys: vec![1],
                    values: vec![Some(Value::from("a.xml"))],
                }],
            },
        }
    }

    #[test]
    fn test_dimension_json_shape() {
        let json = dimension_to_json(&star().dimensions[0]);
        assert_eq!(json["columns"], json!(["patient_key", "sex", "age"]));
        assert_eq!(json["rows"], json!([[1, "F", null]]));
    }

    #[test]
    fn test_fact_json_shape() {
        let json = fact_to_json(&star().fact);
        assert_eq!(
            json["columns"],
            json!(["fact_case_key", "case_natural_key", "patient_key", "source_file"])
        );
        assert_eq!(json["rows"], json!([[1, "12", 1, "a.xml"]]));
    }

    #[test]
    fn test_write_all_artifacts() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path().join("out"));
        let spec =
            MappingSpec::new("cases", vec![ColumnMapping::new("id", ColumnType::Int, "/ID")]);

        exporter.write_mapping(&spec).unwrap();
        exporter
            .write_rows(&[TypedRow::from_cells([("id", Some(Value::Int(1)))])])
            .unwrap();
        let tables = exporter.write_star(&star()).unwrap();
        assert_eq!(tables.len(), 2);

        let mapping = std::fs::read_to_string(dir.path().join("out").join(MAPPING_FILE)).unwrap();
        assert_eq!(MappingSpec::from_json(&mapping).unwrap(), spec);
        let rows: JsonValue = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("out").join(ROWS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(rows, json!([{"id": 1}]));
        assert!(dir.path().join("out").join("fact_case.json").exists());
    }
}
