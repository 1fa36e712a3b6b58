//! Job-level flow: generate, persist, edit and re-check

use crate::config::PipelineConfig;
use crate::edit::{EditRequest, EditTarget, DEFAULT_ACTOR};
use crate::error::PipelineError;
use crate::orchestrator::Orchestrator;
use chrono::Utc;
use scrivener_domain::traits::{DocumentStore, LlmProvider};
use scrivener_domain::{EditEvent, PatentDocument, ProcessingResult, QualityReport};
use scrivener_extractor::PseExtractor;
use scrivener_generator::{GenerationRequest, PatentGenerator};
use scrivener_llm::{new_trace_id, TextGenerator};
use scrivener_store::{sha256_hex, JsonStore, StoreError};
use std::fmt::Display;
use tracing::{info, warn};

/// Everything produced by one generation run
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Job the run was stored under
    pub job_id: String,
    /// Stored document
    pub document: PatentDocument,
    /// Orchestration result
    pub result: ProcessingResult,
    /// Stored quality report
    pub report: QualityReport,
}

/// Generation, optimistic-lock edits and re-checks over a [`JsonStore`]
///
/// One provider is shared by extraction and generation.
///
/// # Examples
///
/// ```no_run
/// use scrivener_generator::GenerationRequest;
/// use scrivener_llm::MockProvider;
/// use scrivener_pipeline::{EditRequest, EditService, PipelineConfig};
///
/// # async fn example() -> Result<(), scrivener_pipeline::PipelineError> {
/// let service = EditService::new(&PipelineConfig::rules_only(), MockProvider::default())?;
/// let request = GenerationRequest {
///     title: "一种缓存装置".to_string(),
///     technical_field: "数据存储".to_string(),
///     ..Default::default()
/// };
/// let run = service.run(None, &request).await?;
///
/// let edit = EditRequest::new("abstract", "summary", "新的摘要", run.document.document_version);
/// service.apply_edit(&run.job_id, &edit)?;
/// let report = service.recheck(&run.job_id)?;
/// println!("score after edit: {:.2}", report.quality_score);
/// # Ok(())
/// # }
/// ```
pub struct EditService<L> {
    store: JsonStore,
    orchestrator: Orchestrator,
    extractor: PseExtractor<L>,
    generator: PatentGenerator<L>,
}

impl<L> EditService<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Build the service from a validated configuration
    pub fn new(config: &PipelineConfig, provider: L) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        let text = TextGenerator::new(provider, config.llm.clone());
        Ok(Self {
            store: JsonStore::new(&config.results_dir)?,
            orchestrator: Orchestrator::from_config(config)?,
            extractor: PseExtractor::new(text.clone(), config.extractor.clone()),
            generator: PatentGenerator::new(text, config.generator.clone()),
        })
    }

    /// The document store
    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    /// The quality orchestrator
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Extract, generate, process and persist a new job
    ///
    /// The document and its report are stored even when the document misses
    /// the quality threshold; `result.success` tells the two apart.
    pub async fn run(&self, job_id: Option<&str>, request: &GenerationRequest) -> Result<RunOutput, PipelineError> {
        if request.title.trim().is_empty() {
            return Err(PipelineError::Validation("Patent title is required".to_string()));
        }
        if request.technical_field.trim().is_empty() {
            return Err(PipelineError::Validation("Technical field is required".to_string()));
        }

        let run_trace_id = new_trace_id();
        let job_id = self.store.create_job(job_id)?;
        info!(job_id = %job_id, run_trace_id = %run_trace_id, "Starting run for '{}'", request.title);

        let pse = self.extractor.extract(&request.draft_text()).await;
        let (mut document, _) = self.generator.generate(request, Some(&pse)).await;
        let result = self.orchestrator.process(&mut document);

        self.store.save(&job_id, &mut document)?;
        let report = self.orchestrator.quality_report(&result, &document, run_trace_id);
        self.store.save_quality_report(&job_id, &report)?;

        info!(
            job_id = %job_id,
            success = result.success,
            version = document.document_version,
            "Run finished with quality score {:.2}",
            result.quality_score
        );
        Ok(RunOutput {
            job_id,
            document,
            result,
            report,
        })
    }

    /// Apply one edit if `if_version` matches the stored version
    ///
    /// On success the snapshot is saved with its version bumped by one and
    /// the returned event is appended to the edit log. A stale version is a
    /// [`PipelineError::Conflict`] and nothing is written.
    pub fn apply_edit(&self, job_id: &str, request: &EditRequest) -> Result<EditEvent, PipelineError> {
        let target = EditTarget::parse(&request.section, &request.target)?;
        let mut document = self
            .store
            .load_at_version(job_id, request.if_version)
            .map_err(|e| match e {
                StoreError::Conflict { expected, actual } => {
                    warn!(job_id = %job_id, expected, actual, "Rejecting stale edit");
                    PipelineError::Conflict { expected, actual }
                }
                other => PipelineError::Store(other),
            })?;

        let (old_value, new_value) = target.apply(&mut document, &request.value)?;
        let actor = match request.actor.trim() {
            "" => DEFAULT_ACTOR.to_string(),
            actor => actor.to_string(),
        };
        let event = EditEvent {
            actor,
            section: target.section().to_string(),
            target: request.target.trim().to_string(),
            old_sha256: Some(sha256_hex(&old_value)),
            new_sha256: Some(sha256_hex(&new_value)),
            old_value,
            new_value,
            timestamp: Utc::now(),
            document_version: document.document_version + 1,
        };
        document.audit.last_edit = Some(event.clone());

        self.store.save(job_id, &mut document)?;
        self.store.append_edit_event(job_id, &event)?;
        info!(
            job_id = %job_id,
            target = %target,
            version = document.document_version,
            "Applied edit"
        );
        Ok(event)
    }

    /// Re-run the gates on the stored document and store the new report
    pub fn recheck(&self, job_id: &str) -> Result<QualityReport, PipelineError> {
        let document = self.store.load(job_id)?;
        let result = self.orchestrator.check_only(&document);
        let report = self.orchestrator.quality_report(&result, &document, new_trace_id());
        self.store.save_quality_report(job_id, &report)?;
        info!(
            job_id = %job_id,
            version = document.document_version,
            success = report.success,
            "Recheck finished with quality score {:.2}",
            report.quality_score
        );
        Ok(report)
    }
}
