//! CSV exporter
//!
//! Nulls are written as empty fields. The rows header is the union of row
//! columns in first-seen order.

use std::path::{Path, PathBuf};
use tracing::info;

use super::{ExportError, ExportResult, write_file};
use crate::models::{DimensionTable, FactTable, StarSchema, TypedRow, Value};

/// File name of the exported enriched rows
pub const ROWS_CSV_FILE: &str = "rows.csv";

fn field(value: Option<&Value>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn finish(writer: ::csv::Writer<Vec<u8>>) -> Result<ExportResult, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::IoError(e.error().to_string()))?;
    let content =
        String::from_utf8(bytes).map_err(|e| ExportError::SerializationError(e.to_string()))?;
    Ok(ExportResult {
        content,
        format: "csv".to_string(),
    })
}

/// Union of the rows' columns in first-seen order
pub fn row_header(rows: &[TypedRow]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for column in rows.iter().flat_map(|r| r.columns()) {
        if !header.iter().any(|c| c == column) {
            header.push(column.to_string());
        }
    }
    header
}

/// Writes rows and star tables as CSV files into an output directory
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Serialize rows as a header line plus one record per row
    pub fn export_rows(rows: &[TypedRow]) -> Result<ExportResult, ExportError> {
        let header = row_header(rows);
        let mut writer = ::csv::Writer::from_writer(Vec::new());
        if header.is_empty() {
            return finish(writer);
        }
        writer.write_record(&header)?;
        for row in rows {
            writer.write_record(header.iter().map(|c| field(row.get(c))))?;
        }
        finish(writer)
    }

    pub fn export_dimension(table: &DimensionTable) -> Result<ExportResult, ExportError> {
        let mut writer = ::csv::Writer::from_writer(Vec::new());
        writer.write_record(table.column_list())?;
        for row in &table.rows {
            let mut record = vec![row.key.to_string()];
            record.extend(row.values.iter().map(|v| field(v.as_ref())));
            writer.write_record(&record)?;
        }
        finish(writer)
    }

    pub fn export_fact(table: &FactTable) -> Result<ExportResult, ExportError> {
        let mut writer = ::csv::Writer::from_writer(Vec::new());
        writer.write_record(table.column_list())?;
        for row in &table.rows {
            let mut record = vec![row.key.to_string(), row.natural_key.clone()];
            record.extend(row.foreign_keys.iter().map(|k| k.to_string()));
            record.extend(row.values.iter().map(|v| field(v.as_ref())));
            writer.write_record(&record)?;
        }
        finish(writer)
    }

    pub fn write_rows(&self, rows: &[TypedRow]) -> Result<PathBuf, ExportError> {
        let content = Self::export_rows(rows)?.content;
        let path = write_file(&self.output_dir, ROWS_CSV_FILE, &content)?;
        info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    /// Write one `<table>.csv` per dimension and the fact table
    pub fn write_star(&self, star: &StarSchema) -> Result<Vec<PathBuf>, ExportError> {
        let mut written = Vec::with_capacity(star.dimensions.len() + 1);
        for dim in &star.dimensions {
            let content = Self::export_dimension(dim)?.content;
            written.push(write_file(&self.output_dir, &format!("{}.csv", dim.name), &content)?);
        }
        let content = Self::export_fact(&star.fact)?.content;
        let fact_file = format!("{}.csv", star.fact.name);
        written.push(write_file(&self.output_dir, &fact_file, &content)?);
        Ok(written)
    }
}
