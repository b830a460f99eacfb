//! Core data structures shared by the pipeline stages

pub mod mapping;
pub mod record;
pub mod row;
pub mod star;

pub use mapping::{ColumnMapping, ColumnType, MappingSpec};
pub use record::RawRecord;
pub use row::{TypedRow, Value};
pub use star::{DimensionRow, DimensionTable, FactRow, FactTable, StarSchema};
