//! Configuration loading and environment overrides

use case_warehouse::config::{
    CONFIG_FILENAME, ENV_DELEGATE, ENV_MAX_NODES, ENV_RECORD_ROOT, ENV_TARGET_TABLE,
    PipelineConfig, sample_config,
};
use tempfile::tempdir;

#[test]
fn test_sample_config_parses() {
    let config = PipelineConfig::parse(sample_config()).unwrap();
    assert_eq!(config.summary.max_nodes, 5000);
    assert_eq!(config.synthesis.target_table, "casimage_cases");
    assert_eq!(config.warehouse.groups.len(), 3);
    assert_eq!(config.warehouse.fact.id_column.as_deref(), Some("id"));
}

// The only test in this binary touching the process environment
#[test]
fn test_load_applies_env_overrides() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILENAME),
        "[summary]\nmax_nodes = 10\n\n[synthesis]\ntarget_table = \"from_file\"\n",
    )
    .unwrap();

    let config = PipelineConfig::load(dir.path()).unwrap();
    assert_eq!(config.summary.max_nodes, 10);
    assert_eq!(config.synthesis.target_table, "from_file");

    unsafe {
        std::env::set_var(ENV_MAX_NODES, "25");
        std::env::set_var(ENV_TARGET_TABLE, "from_env");
        std::env::set_var(ENV_RECORD_ROOT, "");
        std::env::set_var(ENV_DELEGATE, "no");
    }

    let config = PipelineConfig::load(dir.path()).unwrap();

    unsafe {
        std::env::remove_var(ENV_MAX_NODES);
        std::env::remove_var(ENV_TARGET_TABLE);
        std::env::remove_var(ENV_RECORD_ROOT);
        std::env::remove_var(ENV_DELEGATE);
    }

    assert_eq!(config.summary.max_nodes, 25);
    assert_eq!(config.synthesis.target_table, "from_env");
    assert_eq!(config.record_root(), None);
    assert!(!config.synthesis.delegate);
}

#[test]
fn test_load_file_requires_file() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig::load_file(&dir.path().join(CONFIG_FILENAME));
    assert!(config.is_err());
}
