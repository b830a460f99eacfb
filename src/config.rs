//! Pipeline configuration file support
//!
//! Handles parsing of `.case-warehouse.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::inference::{DEFAULT_MAX_NODES, DEFAULT_TARGET_TABLE};
use crate::mapping::synthesizer::DEFAULT_MAX_SUMMARY_CHARS;
use crate::warehouse::StarSchemaConfig;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".case-warehouse.toml";

/// Environment variable for the summary node budget
pub const ENV_MAX_NODES: &str = "CASE_DW_MAX_NODES";

/// Environment variable for the target table name
pub const ENV_TARGET_TABLE: &str = "CASE_DW_TARGET_TABLE";

/// Environment variable for the record root path
pub const ENV_RECORD_ROOT: &str = "CASE_DW_RECORD_ROOT";

/// Environment variable enabling or disabling delegated synthesis
pub const ENV_DELEGATE: &str = "CASE_DW_DELEGATE";

/// Environment variable for the model hint
pub const ENV_MODEL: &str = "OPENAI_MODEL";

/// Error type for configuration handling
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for configuration handling
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Source document section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    /// Path from the document root to the case record (empty for the root itself)
    #[serde(default = "default_record_root")]
    pub record_root: String,

    /// Number of leading documents sampled for mapping synthesis
    #[serde(default = "default_sample_documents")]
    pub sample_documents: usize,

    /// Maximum samples taken per document
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Column receiving the source document name (empty to disable)
    #[serde(default = "default_source_column")]
    pub source_column: String,

    /// Column receiving the flattened QCM text (empty to disable)
    #[serde(default = "default_qcm_column")]
    pub qcm_column: String,

    /// Source tags starting with this prefix are technical metadata and never
    /// become columns (empty to keep every tag)
    #[serde(default = "default_metadata_prefix")]
    pub metadata_prefix: String,
}

fn default_record_root() -> String {
    "CASIMAGE_CASE".to_string()
}

fn default_sample_documents() -> usize {
    5
}

fn default_max_samples() -> usize {
    200
}

fn default_source_column() -> String {
    "source_file".to_string()
}

fn default_qcm_column() -> String {
    "qcms".to_string()
}

fn default_metadata_prefix() -> String {
    "O".to_string()
}

impl SourceSection {
    /// Whether a source tag is technical metadata; the match is case-sensitive
    pub fn is_metadata_tag(&self, tag: &str) -> bool {
        !self.metadata_prefix.is_empty() && tag.starts_with(self.metadata_prefix.as_str())
    }
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            record_root: default_record_root(),
            sample_documents: default_sample_documents(),
            max_samples: default_max_samples(),
            source_column: default_source_column(),
            qcm_column: default_qcm_column(),
            metadata_prefix: default_metadata_prefix(),
        }
    }
}

/// Structure summary section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySection {
    /// Node-visit budget of the structure census
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
}

fn default_max_nodes() -> usize {
    DEFAULT_MAX_NODES
}

impl Default for SummarySection {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
        }
    }
}

/// Mapping synthesis section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSection {
    /// Name of the flat target table
    #[serde(default = "default_target_table")]
    pub target_table: String,

    /// Delegate to an LLM when an API key is available
    #[serde(default = "default_true")]
    pub delegate: bool,

    /// Model hint for delegated synthesis
    #[serde(default)]
    pub model: Option<String>,

    /// Request timeout in seconds for delegated synthesis
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Cap on the summary text sent to the LLM, in characters
    #[serde(default = "default_max_summary_chars")]
    pub max_summary_chars: usize,
}

fn default_target_table() -> String {
    DEFAULT_TARGET_TABLE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_summary_chars() -> usize {
    DEFAULT_MAX_SUMMARY_CHARS
}

impl Default for SynthesisSection {
    fn default() -> Self {
        Self {
            target_table: default_target_table(),
            delegate: true,
            model: None,
            timeout_secs: None,
            max_summary_chars: default_max_summary_chars(),
        }
    }
}

/// Heuristic enrichment section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentSection {
    #[serde(default = "default_age_column")]
    pub age_column: String,

    #[serde(default = "default_sex_column")]
    pub sex_column: String,

    #[serde(default = "default_birthdate_column")]
    pub birthdate_column: String,

    #[serde(default = "default_exam_date_column")]
    pub exam_date_column: String,

    /// Text fields scanned for an age, in order
    #[serde(default = "default_age_text_fields")]
    pub age_text_fields: Vec<String>,

    /// Text fields scanned for sex cues, in order
    #[serde(default = "default_sex_text_fields")]
    pub sex_text_fields: Vec<String>,

    /// Text columns normalized in place
    #[serde(default = "default_normalize_columns")]
    pub normalize_columns: Vec<String>,

    /// Add the `year` and `age_group` columns
    #[serde(default = "default_true")]
    pub derive_columns: bool,

    #[serde(default = "default_year_column")]
    pub year_column: String,

    #[serde(default = "default_age_group_column")]
    pub age_group_column: String,

    /// Drop rows identical to an earlier row before enrichment
    #[serde(default = "default_true")]
    pub drop_duplicates: bool,
}

fn default_age_column() -> String {
    "age".to_string()
}

fn default_sex_column() -> String {
    "sex".to_string()
}

fn default_birthdate_column() -> String {
    "birthdate".to_string()
}

fn default_exam_date_column() -> String {
    "date".to_string()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_age_text_fields() -> Vec<String> {
    strings(&["clinicalpresentation", "description", "title"])
}

fn default_sex_text_fields() -> Vec<String> {
    strings(&["clinicalpresentation", "description", "commentary", "title", "keywords"])
}

fn default_normalize_columns() -> Vec<String> {
    strings(&[
        "description",
        "clinicalpresentation",
        "diagnosis",
        "title",
        "commentary",
        "keywords",
        "anatomy",
        "chapter",
        "hospital",
        "department",
    ])
}

fn default_year_column() -> String {
    "year".to_string()
}

fn default_age_group_column() -> String {
    "age_group".to_string()
}

impl Default for EnrichmentSection {
    fn default() -> Self {
        Self {
            age_column: default_age_column(),
            sex_column: default_sex_column(),
            birthdate_column: default_birthdate_column(),
            exam_date_column: default_exam_date_column(),
            age_text_fields: default_age_text_fields(),
            sex_text_fields: default_sex_text_fields(),
            normalize_columns: default_normalize_columns(),
            derive_columns: true,
            year_column: default_year_column(),
            age_group_column: default_age_group_column(),
            drop_duplicates: true,
        }
    }
}

/// Main configuration structure
///
/// Represents the `.case-warehouse.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub source: SourceSection,

    #[serde(default)]
    pub summary: SummarySection,

    #[serde(default)]
    pub synthesis: SynthesisSection,

    #[serde(default)]
    pub enrichment: EnrichmentSection,

    #[serde(default)]
    pub warehouse: StarSchemaConfig,
}

impl PipelineConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.case-warehouse.toml` in the directory.
    /// Falls back to defaults if not found.
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        let config_path = dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from an explicit file, without env overrides
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> ConfigResult<()> {
        let config_path = dir.join(CONFIG_FILENAME);
        let content = self.to_toml()?;

        std::fs::write(&config_path, content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(max) = std::env::var(ENV_MAX_NODES)
            && let Ok(max) = max.parse()
        {
            self.summary.max_nodes = max;
        }

        if let Ok(table) = std::env::var(ENV_TARGET_TABLE)
            && !table.trim().is_empty()
        {
            self.synthesis.target_table = table;
        }

        if let Ok(root) = std::env::var(ENV_RECORD_ROOT) {
            self.source.record_root = root;
        }

        if let Ok(delegate) = std::env::var(ENV_DELEGATE) {
            self.synthesis.delegate = matches!(
                delegate.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Ok(model) = std::env::var(ENV_MODEL)
            && !model.trim().is_empty()
        {
            self.synthesis.model = Some(model);
        }
    }

    /// Record root path, `None` when records are whole documents
    pub fn record_root(&self) -> Option<&str> {
        let root = self.source.record_root.trim();
        (!root.is_empty()).then_some(root)
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Case warehouse configuration

[source]
# Path from the document root to the case record ("" for the root itself)
record_root = "CASIMAGE_CASE"
sample_documents = 5
max_samples = 200
source_column = "source_file"
qcm_column = "qcms"
# Tags starting with this prefix are technical metadata and are skipped
metadata_prefix = "O"

[summary]
# Node-visit budget of the structure census
max_nodes = 5000

[synthesis]
target_table = "casimage_cases"
# Delegate to an LLM when OPENAI_API_KEY (or ANTHROPIC_API_KEY) is set
delegate = true
# model = "gpt-4o-mini"
# timeout_secs = 30
max_summary_chars = 4000

[enrichment]
age_column = "age"
sex_column = "sex"
birthdate_column = "birthdate"
exam_date_column = "date"
age_text_fields = ["clinicalpresentation", "description", "title"]
sex_text_fields = ["clinicalpresentation", "description", "commentary", "title", "keywords"]
derive_columns = true
drop_duplicates = true

[warehouse.fact]
name = "fact_case"
key_column = "fact_case_key"
natural_key_column = "case_natural_key"
id_column = "id"
columns = ["source_file", "clinicalpresentation", "commentary"]

[[warehouse.groups]]
name = "dim_patient"
key_column = "patient_key"
columns = ["sex", "age", "birthdate", "age_group"]

[[warehouse.groups]]
name = "dim_exam"
key_column = "exam_key"
columns = ["date", "year", "hospital", "department"]

[[warehouse.groups]]
name = "dim_pathology"
key_column = "pathology_key"
columns = ["diagnosis", "chapter", "description", "keywords", "anatomy", "title"]
"#
}
