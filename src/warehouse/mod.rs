//! Star schema construction
//!
//! Splits enriched rows into deduplicated dimension tables with sequential
//! surrogate keys, plus a fact table referencing them.

pub mod builder;
pub mod config;

pub use builder::DimensionalModeler;
pub use config::{DimensionGroup, FactConfig, StarSchemaConfig};

/// Errors raised while building the star schema
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for warehouse operations
pub type WarehouseResult<T> = Result<T, WarehouseError>;
