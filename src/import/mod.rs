//! Source document import
//!
//! Parses case documents into [`RawRecord`] trees:
//! - XML (feature `xml`), with the entity cleanup and latin-1 fallback the
//!   case archives need

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "xml")]
pub use xml::{XmlImporter, clean_entities, decode_bytes, load_documents, parse_xml};

use crate::models::RawRecord;

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    StructuralParse(String),
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// One parsed source document
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// File name of the document
    pub source: String,
    pub record: RawRecord,
}

/// Outcome counters of a batch import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "import reports should be checked for skipped documents"]
pub struct ImportReport {
    pub loaded: usize,
    /// Documents skipped with their parse error
    pub skipped: Vec<(String, String)>,
}

impl ImportReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
