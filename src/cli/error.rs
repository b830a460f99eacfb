//! CLI-specific error types

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::import::ImportError;
use crate::pipeline::PipelineError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("No readable documents among {0} input files")]
    NoDocuments(usize),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Import error: {0}")]
    ImportError(#[from] ImportError),

    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),

    #[error("Pipeline error: {0}")]
    PipelineError(#[from] PipelineError),
}
