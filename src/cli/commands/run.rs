//! Run and infer command implementations

use std::path::{Path, PathBuf};

use super::{discover_inputs, load_config};
use crate::cli::error::CliError;
use crate::export::{CsvExporter, JsonExporter};
use crate::import::{SourceDocument, load_documents};
use crate::pipeline::Pipeline;

/// Options shared by `run` and `infer`
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub pattern: String,
    /// Never delegate mapping synthesis
    pub local: bool,
}

fn build_pipeline(args: &RunArgs) -> Result<Pipeline, CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if args.local {
        config.synthesis.delegate = false;
    }
    Ok(Pipeline::new(config)?)
}

fn read_documents(args: &RunArgs) -> Result<Vec<SourceDocument>, CliError> {
    let files = discover_inputs(&args.inputs, &args.pattern)?;
    let (documents, report) = load_documents(&files);
    if report.skipped_count() > 0 {
        eprintln!(
            "Skipped {} of {} documents that failed to parse",
            report.skipped_count(),
            files.len()
        );
    }
    if documents.is_empty() {
        return Err(CliError::NoDocuments(files.len()));
    }
    Ok(documents)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Handle the run command: every stage, every artifact
pub fn handle_run(args: &RunArgs) -> Result<(), CliError> {
    let pipeline = build_pipeline(args)?;
    let documents = read_documents(args)?;
    let output = pipeline.run(&documents)?;

    let exporter = JsonExporter::new(&args.output);
    exporter.write_mapping(&output.mapping)?;
    exporter.write_rows(&output.rows)?;
    let tables = exporter.write_star(&output.star)?;

    let csv = CsvExporter::new(&args.output);
    csv.write_rows(&output.rows)?;
    csv.write_star(&output.star)?;

    let report = &output.report;
    println!(
        "Processed {} documents with {} synthesis: {} rows kept",
        report.documents, report.synthesizer, report.rows_enriched
    );
    println!(
        "  dropped {} without age and {} duplicates",
        report.dropped_no_age, report.dropped_duplicates
    );
    for dim in &output.star.dimensions {
        println!("  {}: {} rows", dim.name, dim.len());
    }
    println!("  {}: {} rows", output.star.fact.name, output.star.fact.len());
    println!(
        "Wrote {} tables as JSON and CSV to {}",
        tables.len(),
        display(exporter.output_dir())
    );
    Ok(())
}

/// Handle the infer command: synthesize and write the mapping only
pub fn handle_infer(args: &RunArgs) -> Result<(), CliError> {
    let pipeline = build_pipeline(args)?;
    let documents = read_documents(args)?;
    let mapping = pipeline.synthesize(&documents);

    let exporter = JsonExporter::new(&args.output);
    let path = exporter.write_mapping(&mapping)?;
    println!(
        "Mapping for {} with {} columns written to {}",
        mapping.target_table,
        mapping.columns.len(),
        display(&path)
    );
    Ok(())
}
