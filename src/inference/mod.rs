//! Schema inference
//!
//! Structure census of raw records, column-name normalization, sample type
//! classification and heuristic mapping inference.

pub mod local;
pub mod structure;
pub mod types;

pub use local::{DEFAULT_TARGET_TABLE, fixed_fallback_samples, infer_mapping, samples_from_summary};
pub use structure::{
    DEFAULT_MAX_NODES, StructureSummary, TagCount, collect_samples, summarize_structure,
};
pub use types::{classify_sample, normalize_column_name};
