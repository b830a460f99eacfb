//! Case Warehouse - clinical case documents to a typed star schema
//!
//! Provides:
//! - Structure census and mapping inference over hierarchical records
//! - Local or LLM-delegated mapping synthesis
//! - Typed projection of records into flat rows
//! - Heuristic age and sex recovery from French clinical text
//! - Star schema construction with deduplicated dimensions
//! - XML import plus JSON and CSV export

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod export;
pub mod import;
pub mod inference;
pub mod mapping;
pub mod models;
pub mod pipeline;
pub mod warehouse;

// Re-export commonly used types
pub use config::{ConfigError, PipelineConfig};
pub use enrichment::{EnrichmentOutcome, Enricher, Sex};
pub use export::{CsvExporter, ExportError, ExportResult, JsonExporter};
#[cfg(feature = "xml")]
pub use import::XmlImporter;
pub use import::{ImportError, ImportReport, SourceDocument};
pub use mapping::{
    DelegatedSynthesizer, LocalSynthesizer, MappingSynthesizer, RecordProjector,
    SynthesisRequest, TextGenerator,
};
pub use models::{
    ColumnMapping, ColumnType, DimensionTable, FactTable, MappingSpec, RawRecord, StarSchema,
    TypedRow, Value,
};
pub use pipeline::{Pipeline, PipelineError, PipelineOutput, PipelineReport};
pub use warehouse::{DimensionalModeler, StarSchemaConfig, WarehouseError};
