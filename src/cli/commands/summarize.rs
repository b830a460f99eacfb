//! Summarize command implementation

use std::path::Path;

use crate::cli::error::CliError;
use crate::import::XmlImporter;
use crate::inference::summarize_structure;

/// Print the structure census of one document
pub fn handle_summarize(input: &Path, max_nodes: usize) -> Result<(), CliError> {
    if !input.is_file() {
        return Err(CliError::FileNotFound(input.to_path_buf()));
    }
    let document = XmlImporter::new().import_file(input)?;
    let summary = summarize_structure(&document.record, max_nodes);

    println!("{}", summary.to_text());
    if summary.truncated {
        eprintln!("Summary truncated after {} nodes", max_nodes);
    }
    Ok(())
}
