//! Mapping synthesis and record projection
//!
//! - [`resolver`]: simplified path evaluation over [`RawRecord`](crate::models::RawRecord)
//! - [`projector`]: typed projection of a record through a [`MappingSpec`]
//! - [`synthesizer`]: local and delegated mapping synthesis
//! - `llm`: HTTP text generator (feature `llm-online`)

#[cfg(feature = "llm-online")]
pub mod llm;
pub mod projector;
pub mod resolver;
pub mod synthesizer;

#[cfg(feature = "llm-online")]
pub use llm::{HttpTextGenerator, LlmConfig, LlmProvider};
pub use projector::{RecordProjector, coerce, project_record};
pub use resolver::{path_segments, resolve_path};
pub use synthesizer::{
    DelegatedSynthesizer, GenerationError, LocalSynthesizer, MappingSynthesizer,
    SynthesisFailure, SynthesisRequest, TextGenerator, extract_json_object,
};

use crate::config::SynthesisSection;
use crate::models::MappingSpec;

/// Pick the synthesis strategy once, from configuration and environment.
///
/// Delegation is used only when enabled and an LLM API key is configured;
/// otherwise mappings are inferred locally.
pub fn build_synthesizer(settings: &SynthesisSection) -> Box<dyn MappingSynthesizer> {
    #[cfg(feature = "llm-online")]
    {
        if settings.delegate
            && let Some(mut config) = LlmConfig::from_env()
        {
            if let Some(timeout) = settings.timeout_secs {
                config.timeout = std::time::Duration::from_secs(timeout);
            }
            let model = settings.model.clone().unwrap_or_else(|| config.model.clone());
            match HttpTextGenerator::new(config) {
                Ok(generator) => {
                    tracing::info!("Mapping synthesis delegated to model {}", model);
                    return Box::new(
                        DelegatedSynthesizer::new(generator)
                            .with_default_model(model)
                            .with_max_summary_chars(settings.max_summary_chars)
                            .with_target_table(settings.target_table.clone()),
                    );
                }
                Err(e) => tracing::warn!("Cannot build LLM client, inferring locally: {}", e),
            }
        }
    }

    Box::new(LocalSynthesizer::new(settings.target_table.clone()))
}

/// Convenience wrapper: synthesize with the configured strategy
pub fn synthesize_mapping(settings: &SynthesisSection, request: &SynthesisRequest) -> MappingSpec {
    build_synthesizer(settings).synthesize(request)
}
