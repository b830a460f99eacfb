//! Batch pipeline
//!
//! Runs one pass over a set of parsed documents: synthesize the mapping
//! once, project every record, drop duplicates, enrich, then build the star
//! schema.
//! Projection and enrichment run on the rayon pool with feature `parallel`;
//! rows always come back in document order.

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::enrichment::{Enricher, flatten_qcm};
use crate::import::SourceDocument;
use crate::inference::{collect_samples, summarize_structure};
use crate::mapping::{
    MappingSynthesizer, RecordProjector, SynthesisRequest, build_synthesizer, path_segments,
    resolve_path,
};
use crate::models::{MappingSpec, RawRecord, StarSchema, TypedRow, Value};
use crate::warehouse::{DimensionalModeler, WarehouseError};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Error raised by a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
}

/// Result type for pipeline runs
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Counters of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PipelineReport {
    pub documents: usize,
    pub rows_projected: usize,
    pub rows_enriched: usize,
    pub dropped_no_age: usize,
    pub dropped_duplicates: usize,
    /// Strategy that produced the mapping
    pub synthesizer: String,
}

/// Artifacts of one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub mapping: MappingSpec,
    /// Enriched rows in document order
    pub rows: Vec<TypedRow>,
    pub star: StarSchema,
    pub report: PipelineReport,
}

/// Orders results like the input, in parallel when available
fn map_ordered<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        items.par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        items.iter().map(f).collect()
    }
}

/// Configured pipeline, reusable across runs
pub struct Pipeline {
    config: PipelineConfig,
    synthesizer: Box<dyn MappingSynthesizer>,
    enricher: Enricher,
    modeler: DimensionalModeler,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("synthesizer", &self.synthesizer.name())
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline whose synthesis strategy follows the configuration
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let synthesizer = build_synthesizer(&config.synthesis);
        Self::with_synthesizer(config, synthesizer)
    }

    /// Create a pipeline with an explicit synthesis strategy
    pub fn with_synthesizer(
        config: PipelineConfig,
        synthesizer: Box<dyn MappingSynthesizer>,
    ) -> PipelineResult<Self> {
        let modeler = DimensionalModeler::new(config.warehouse.clone())?;
        let enricher = Enricher::new(config.enrichment.clone());
        Ok(Self {
            config,
            synthesizer,
            enricher,
            modeler,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Case record inside a document, or the document itself when the
    /// configured root is absent
    pub fn case_record<'a>(&self, document: &'a RawRecord) -> &'a RawRecord {
        match self.config.record_root() {
            Some(root) => resolve_path(document, root).unwrap_or_else(|| {
                debug!("Record root {} not found, using the whole document", root);
                document
            }),
            None => document,
        }
    }

    /// Build the synthesis request from the leading documents
    pub fn synthesis_request(&self, documents: &[SourceDocument]) -> SynthesisRequest {
        let source = &self.config.source;
        let max_nodes = self.config.summary.max_nodes;
        let summary = documents
            .first()
            .map(|d| summarize_structure(self.case_record(&d.record), max_nodes))
            .unwrap_or_default();
        let samples = documents
            .iter()
            .take(source.sample_documents)
            .flat_map(|d| collect_samples(self.case_record(&d.record), source.max_samples))
            .filter(|(tag, _)| !source.is_metadata_tag(tag))
            .collect();
        SynthesisRequest {
            summary,
            samples,
            model_hint: self.config.synthesis.model.clone(),
        }
    }

    /// Synthesize the run's mapping, without metadata columns
    pub fn synthesize(&self, documents: &[SourceDocument]) -> MappingSpec {
        let request = self.synthesis_request(documents);
        let mut spec = self.synthesizer.synthesize(&request);
        let before = spec.columns.len();
        spec.columns.retain(|c| !self.is_metadata_path(&c.source_path));
        if spec.columns.len() < before {
            debug!("Dropped {} metadata columns", before - spec.columns.len());
        }
        spec
    }

    fn is_metadata_path(&self, path: &str) -> bool {
        path_segments(path)
            .last()
            .is_some_and(|tag| self.config.source.is_metadata_tag(tag))
    }

    /// Project every document through the mapping, tagging its source and
    /// its flattened QCMs
    pub fn project(&self, spec: &MappingSpec, documents: &[SourceDocument]) -> Vec<TypedRow> {
        let projector = RecordProjector::new(spec);
        let source_column = self.config.source.source_column.as_str();
        let qcm_column = self.config.source.qcm_column.as_str();
        map_ordered(documents, |doc| {
            let case = self.case_record(&doc.record);
            let mut row = projector.project(case);
            if !qcm_column.is_empty() && row.get(qcm_column).is_none() {
                let qcms = flatten_qcm(case);
                row.set(qcm_column, (!qcms.is_empty()).then(|| Value::Text(qcms)));
            }
            if !source_column.is_empty() && row.get(source_column).is_none() {
                row.set(source_column, Some(Value::from(doc.source.as_str())));
            }
            row
        })
    }

    /// Run all stages over the documents
    pub fn run(&self, documents: &[SourceDocument]) -> PipelineResult<PipelineOutput> {
        info!(
            "Running pipeline over {} documents with {} synthesis",
            documents.len(),
            self.synthesizer.name()
        );

        let mapping = self.synthesize(documents);
        let projected = self.project(&mapping, documents);
        let rows_projected = projected.len();
        let (unique, dropped_duplicates) = self.enricher.deduplicate(projected);

        let enriched = map_ordered(&unique, |row| self.enricher.enrich(row));
        let dropped_no_age = enriched.iter().filter(|r| r.is_none()).count();
        let rows: Vec<TypedRow> = enriched.into_iter().flatten().collect();
        info!(
            "Enriched {} rows, dropped {} without age",
            rows.len(),
            dropped_no_age
        );

        let star = self.modeler.build(&rows)?;

        let report = PipelineReport {
            documents: documents.len(),
            rows_projected,
            rows_enriched: rows.len(),
            dropped_no_age,
            dropped_duplicates,
            synthesizer: self.synthesizer.name().to_string(),
        };

        Ok(PipelineOutput {
            mapping,
            rows,
            star,
            report,
        })
    }
}
