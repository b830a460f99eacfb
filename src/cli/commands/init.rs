//! Init command implementation

use std::path::Path;

use crate::cli::error::CliError;
use crate::config::{CONFIG_FILENAME, sample_config};

/// Write the sample configuration into `dir`
pub fn handle_init(dir: &Path, force: bool) -> Result<(), CliError> {
    let path = dir.join(CONFIG_FILENAME);
    if path.exists() && !force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }
    std::fs::write(&path, sample_config())
        .map_err(|e| CliError::InvalidArgument(format!("{}: {}", path.display(), e)))?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempdir().unwrap();
        handle_init(dir.path(), false).unwrap();
        assert!(PipelineConfig::load_file(&dir.path().join(CONFIG_FILENAME)).is_ok());
        assert!(handle_init(dir.path(), false).is_err());
        assert!(handle_init(dir.path(), true).is_ok());
    }
}
