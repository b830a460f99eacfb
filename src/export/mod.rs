//! Export functionality
//!
//! Writes run artifacts as JSON:
//! - the MappingSpec in its wire schema (`mapping.json`)
//! - enriched rows as an array of objects (`rows.json`)
//! - one `<table>.json` per dimension and the fact table
//!
//! and as CSV: the enriched rows (`rows.csv`) plus one `<table>.csv` per table.

pub mod csv;
pub mod json;

pub use self::csv::CsvExporter;
pub use json::{JsonExporter, dimension_to_json, fact_to_json};

use std::path::{Path, PathBuf};

/// Result of an export operation.
///
/// Contains the exported content and format identifier.
#[derive(Debug, serde::Serialize)]
#[must_use = "export results contain the exported content and should be used"]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

impl From<::csv::Error> for ExportError {
    fn from(err: ::csv::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

/// Write `content` to `dir/file_name`, creating the directory first
pub(crate) fn write_file(
    dir: &Path,
    file_name: &str,
    content: &str,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ExportError::IoError(format!("{}: {}", dir.display(), e)))?;
    let path = dir.join(file_name);
    std::fs::write(&path, content)
        .map_err(|e| ExportError::IoError(format!("{}: {}", path.display(), e)))?;
    Ok(path)
}
