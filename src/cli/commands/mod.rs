//! CLI command implementations

pub mod init;
pub mod run;
pub mod summarize;

use std::path::{Path, PathBuf};

use crate::cli::error::CliError;
use crate::config::PipelineConfig;

/// Default pattern used to find documents inside input directories
pub const DEFAULT_PATTERN: &str = "**/*.xml";

/// Expand input paths into a sorted list of document files.
///
/// Files are taken as given; directories are searched with `pattern`.
pub fn discover_inputs(inputs: &[PathBuf], pattern: &str) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            return Err(CliError::FileNotFound(input.clone()));
        }

        let full_pattern = format!("{}/{}", input.display(), pattern);
        let entries = glob::glob(&full_pattern)
            .map_err(|e| CliError::InvalidPattern(format!("{}: {}", pattern, e)))?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("Error accessing path: {}", e),
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Load the configuration from an explicit file or the working directory
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, CliError> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.to_path_buf()));
            }
            let mut config = PipelineConfig::load_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => PipelineConfig::load(Path::new("."))?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_discover_inputs_sorted() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.xml"), "<A/>").unwrap();
        std::fs::write(dir.path().join("sub").join("a.xml"), "<A/>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = discover_inputs(&[dir.path().to_path_buf()], DEFAULT_PATTERN).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e == "xml")));
    }

    #[test]
    fn test_missing_input() {
        let err = discover_inputs(&[PathBuf::from("/nonexistent/case.xml")], DEFAULT_PATTERN);
        assert!(matches!(err, Err(CliError::FileNotFound(_))));
    }
}
