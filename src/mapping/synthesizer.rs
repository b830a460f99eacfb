//! Mapping synthesis
//!
//! [`MappingSynthesizer`] is the single seam between the pipeline and the
//! two ways of producing a [`MappingSpec`]:
//!
//! - [`LocalSynthesizer`] infers the mapping from sampled tag/value pairs.
//! - [`DelegatedSynthesizer`] asks a [`TextGenerator`] for the mapping JSON
//!   and falls back to local inference over a fixed sample on any failure.
//!
//! Both always return a valid, non-empty mapping.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::inference::{
    DEFAULT_TARGET_TABLE, StructureSummary, fixed_fallback_samples, infer_mapping,
    normalize_column_name, samples_from_summary,
};
use crate::models::MappingSpec;

/// Default model asked for a mapping
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default cap on the summary text sent to the generator, in characters
pub const DEFAULT_MAX_SUMMARY_CHARS: usize = 4000;

/// Inputs to one synthesis call
#[derive(Debug, Clone, Default)]
pub struct SynthesisRequest {
    /// Structure census of a sample document
    pub summary: StructureSummary,
    /// Sampled `(tag, value)` pairs
    pub samples: Vec<(String, String)>,
    /// Model preferred by the caller
    pub model_hint: Option<String>,
}

/// Produces the mapping of one pipeline run
pub trait MappingSynthesizer: Send + Sync {
    /// Build a mapping. Never fails.
    fn synthesize(&self, request: &SynthesisRequest) -> MappingSpec;

    /// Short strategy name for logs and reports
    fn name(&self) -> &'static str;
}

/// Heuristic synthesis from samples
#[derive(Debug, Clone)]
pub struct LocalSynthesizer {
    target_table: String,
}

impl Default for LocalSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_TABLE)
    }
}

impl LocalSynthesizer {
    pub fn new(target_table: impl Into<String>) -> Self {
        Self {
            target_table: target_table.into(),
        }
    }
}

impl MappingSynthesizer for LocalSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest) -> MappingSpec {
        let samples = if request.samples.is_empty() {
            samples_from_summary(&request.summary)
        } else {
            request.samples.clone()
        };
        let spec = infer_mapping(&samples, &self.target_table);
        info!(
            "Inferred mapping locally: {} columns from {} samples",
            spec.columns.len(),
            samples.len()
        );
        spec
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Failure of a text-generation call
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Service error ({status}): {body}")]
    ServiceError { status: u16, body: String },
    #[error("Empty response")]
    EmptyResponse,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// External text-generation collaborator
pub trait TextGenerator: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}

/// Why a delegated answer could not be used
#[derive(Debug, thiserror::Error)]
pub enum SynthesisFailure {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("No JSON object in response")]
    NoJson,
    #[error("Malformed mapping JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Mapping has no usable columns")]
    NoColumns,
}

/// Synthesis delegated to a text generator, with local fallback
pub struct DelegatedSynthesizer<G: TextGenerator> {
    generator: G,
    default_model: String,
    max_summary_chars: usize,
    target_table: String,
}

impl<G: TextGenerator> DelegatedSynthesizer<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            default_model: DEFAULT_MODEL.to_string(),
            max_summary_chars: DEFAULT_MAX_SUMMARY_CHARS,
            target_table: DEFAULT_TARGET_TABLE.to_string(),
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_max_summary_chars(mut self, max: usize) -> Self {
        self.max_summary_chars = max;
        self
    }

    pub fn with_target_table(mut self, table: impl Into<String>) -> Self {
        self.target_table = table.into();
        self
    }

    /// Prompt sent to the generator
    pub fn build_prompt(&self, summary: &StructureSummary) -> String {
        let text = summary.to_text();
        let capped = truncate_chars(&text, self.max_summary_chars);
        format!(
            r#"You are a data engineer.
From the XML structure summary below, produce a STRICT JSON mapping.

Expected format:
{{
  "target_table": "{table}",
  "columns": [
    {{
      "name": "snake_case_name",
      "type": "string|int|float|date",
      "source_xpath": "//TagName"
    }}
  ]
}}

XML summary:
{capped}

Answer ONLY with the JSON."#,
            table = self.target_table,
        )
    }

    fn try_delegate(&self, request: &SynthesisRequest) -> Result<MappingSpec, SynthesisFailure> {
        let model = request
            .model_hint
            .as_deref()
            .unwrap_or(&self.default_model);
        let prompt = self.build_prompt(&request.summary);
        debug!("Requesting mapping from model {}", model);
        let response = self.generator.generate(model, &prompt)?;
        let json = extract_json_object(&response).ok_or(SynthesisFailure::NoJson)?;
        let spec = MappingSpec::from_json(json)?;
        sanitize(spec).ok_or(SynthesisFailure::NoColumns)
    }
}

impl<G: TextGenerator> MappingSynthesizer for DelegatedSynthesizer<G> {
    fn synthesize(&self, request: &SynthesisRequest) -> MappingSpec {
        match self.try_delegate(request) {
            Ok(spec) => {
                info!("Delegated mapping accepted: {} columns", spec.columns.len());
                spec
            }
            Err(e) => {
                warn!("Delegated mapping synthesis failed, using local fallback: {}", e);
                infer_mapping(&fixed_fallback_samples(), &self.target_table)
            }
        }
    }

    fn name(&self) -> &'static str {
        "delegated"
    }
}

/// Normalize names and drop repeated ones; `None` when no column survives
fn sanitize(spec: MappingSpec) -> Option<MappingSpec> {
    let mut seen = HashSet::new();
    let columns: Vec<_> = spec
        .columns
        .into_iter()
        .filter_map(|mut column| {
            column.name = normalize_column_name(&column.name);
            seen.insert(column.name.clone()).then_some(column)
        })
        .collect();
    if columns.is_empty() {
        return None;
    }
    let target_table = if spec.target_table.trim().is_empty() {
        DEFAULT_TARGET_TABLE.to_string()
    } else {
        spec.target_table
    };
    Some(MappingSpec::new(target_table, columns))
}

/// First balanced `{...}` block of `text`, skipping braces inside JSON strings
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
