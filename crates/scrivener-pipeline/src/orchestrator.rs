//! Quality orchestration over a generated document

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::kpis::compute_kpis;
use chrono::Utc;
use scrivener_domain::{
    Abstract, Claims, Disclosure, PatentDocument, ProcessingResult, QualityReport, ReportAudit, Specification,
};
use scrivener_gatekeeper::{check_statistics, Gatekeeper};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

/// Abstract summaries longer than this are truncated on finalization
pub const MAX_SUMMARY_CHARS: usize = 300;

/// Error recorded when a document misses the quality threshold
pub const QUALITY_FAILURE: &str = "Patent failed quality checks";

/// Runs validation, the gate suite, finalization and KPI collection
///
/// # Examples
///
/// ```
/// use scrivener_domain::{Metadata, PatentDocument};
/// use scrivener_pipeline::{Orchestrator, PipelineConfig};
///
/// let orchestrator = Orchestrator::from_config(&PipelineConfig::default()).unwrap();
/// let document = PatentDocument::new(Metadata::new("", "数据存储"));
/// let result = orchestrator.check_only(&document);
/// assert!(!result.success);
/// assert_eq!(result.errors, vec!["Patent title is required".to_string()]);
/// ```
pub struct Orchestrator {
    gatekeeper: Gatekeeper,
    enable_checks: bool,
}

impl Orchestrator {
    /// Wrap an assembled gatekeeper; checks are enabled
    pub fn new(gatekeeper: Gatekeeper) -> Self {
        Self {
            gatekeeper,
            enable_checks: true,
        }
    }

    /// Standard gates with the configured thresholds and policy
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let gatekeeper = Gatekeeper::new(&config.gates)
            .and_then(|g| g.with_policy(config.policy.clone()))
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Ok(Self::new(gatekeeper).with_checks(config.enable_checks))
    }

    /// Enable or disable the gate suite in [`process`](Self::process)
    pub fn with_checks(mut self, enabled: bool) -> Self {
        self.enable_checks = enabled;
        self
    }

    /// The underlying gate suite
    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gatekeeper
    }

    /// Health of each gate by name
    pub fn checker_status(&self) -> BTreeMap<String, bool> {
        self.gatekeeper.checker_status()
    }

    /// Full processing of a freshly generated document
    ///
    /// On success the document's section texts are finalized and the gate
    /// outcomes and aggregate score are attached to it. A document missing
    /// the threshold is returned untouched with `success == false`.
    pub fn process(&self, document: &mut PatentDocument) -> ProcessingResult {
        let start = Instant::now();
        let mut result = ProcessingResult::default();
        info!("Starting patent processing for: {}", document.metadata.title);

        if !validate_input(document, &mut result) {
            result.processing_time_secs = start.elapsed().as_secs_f64();
            return result;
        }
        result.metadata.kpis = Some(compute_kpis(document, &BTreeMap::new()));

        if self.enable_checks {
            let results = self.gatekeeper.check_all(document);
            result.quality_score = self.gatekeeper.aggregate(&results);
            result.metadata.kpis = Some(compute_kpis(document, &results));
            let passed = self.gatekeeper.passes(&results);
            result.check_results = results;

            if !passed {
                warn!(score = result.quality_score, "Patent failed quality checks");
                result.errors.push(QUALITY_FAILURE.to_string());
                result.processing_time_secs = start.elapsed().as_secs_f64();
                return result;
            }
        }

        finalize(document, &result);
        self.post_process(document, &mut result);

        result.success = true;
        result.processing_time_secs = start.elapsed().as_secs_f64();
        info!(
            "Patent processing completed successfully. Quality score: {:.2}",
            result.quality_score
        );
        result
    }

    /// Re-run the gates without touching the document
    ///
    /// KPIs are always present; `success` reflects the quality threshold.
    pub fn check_only(&self, document: &PatentDocument) -> ProcessingResult {
        let start = Instant::now();
        let mut result = ProcessingResult::default();

        if !validate_input(document, &mut result) {
            result.metadata.kpis = Some(compute_kpis(document, &BTreeMap::new()));
            result.processing_time_secs = start.elapsed().as_secs_f64();
            return result;
        }

        let results = self.gatekeeper.check_all(document);
        result.quality_score = self.gatekeeper.aggregate(&results);
        result.metadata.kpis = Some(compute_kpis(document, &results));
        result.success = self.gatekeeper.passes(&results);
        result.check_results = results;
        result.processing_time_secs = start.elapsed().as_secs_f64();
        info!(
            success = result.success,
            "Check-only completed. Quality score: {:.2}", result.quality_score
        );
        result
    }

    /// Quality report of a result, carrying the document's provenance
    pub fn quality_report(
        &self,
        result: &ProcessingResult,
        document: &PatentDocument,
        run_trace_id: impl Into<String>,
    ) -> QualityReport {
        QualityReport {
            success: result.success,
            quality_score: result.quality_score,
            errors: result.errors.clone(),
            warnings: result.warnings.clone(),
            check_results: result.check_results.clone(),
            metadata: result.metadata.clone(),
            audit: ReportAudit {
                run_trace_id: run_trace_id.into(),
                extraction: document.pse_matrix.as_ref().map(|p| p.audit.clone()),
                generation: document.audit.generation.clone(),
                document_version: Some(document.document_version),
                last_edit: document.audit.last_edit.clone(),
            },
        }
    }

    fn post_process(&self, document: &PatentDocument, result: &mut ProcessingResult) {
        let metadata = &mut result.metadata;
        metadata.title = Some(document.metadata.title.clone());
        metadata.technical_field = Some(document.metadata.technical_field.clone());
        metadata.document_type = Some(document.metadata.document_type);
        metadata.processed_at = Some(Utc::now());
        if !result.check_results.is_empty() {
            metadata.check_statistics = Some(check_statistics(&result.check_results));
        }
    }
}

/// Title and technical field are required; missing sections are warnings
fn validate_input(document: &PatentDocument, result: &mut ProcessingResult) -> bool {
    if document.metadata.title.trim().is_empty() {
        result.errors.push("Patent title is required".to_string());
        return false;
    }
    if document.metadata.technical_field.trim().is_empty() {
        result.errors.push("Technical field is required".to_string());
        return false;
    }

    let sections = [
        (document.specification.is_none(), "Specification is missing"),
        (document.claims.is_none(), "Claims are missing"),
        (document.abstract_section.is_none(), "Abstract is missing"),
        (document.disclosure.is_none(), "Disclosure is missing"),
    ];
    for (missing, warning) in sections {
        if missing {
            result.warnings.push(warning.to_string());
        }
    }
    true
}

/// Re-apply section headers and attach the gate outcomes
///
/// Running it twice leaves the document unchanged.
fn finalize(document: &mut PatentDocument, result: &ProcessingResult) {
    if let Some(spec) = document.specification.as_mut() {
        finalize_specification(spec);
    }
    if let Some(claims) = document.claims.as_mut() {
        finalize_claims(claims);
    }
    if let Some(abstract_section) = document.abstract_section.as_mut() {
        finalize_abstract(abstract_section);
    }
    if let Some(disclosure) = document.disclosure.as_mut() {
        finalize_disclosure(disclosure);
    }
    if !result.check_results.is_empty() {
        document.quality_report = Some(result.check_results.clone());
        document.quality_score = Some(result.quality_score);
    }
}

fn finalize_specification(spec: &mut Specification) {
    let mut content = if spec.content.trim().is_empty() {
        spec.render()
    } else {
        spec.content.clone()
    };
    for (header, body) in [
        ("发明内容", &spec.invention_content),
        ("背景技术", &spec.background_art),
        ("技术领域", &spec.technical_field),
    ] {
        if !content.contains(header) {
            content = format!("{}\n{}\n\n{}", header, body, content);
        }
    }
    spec.content = content;
}

fn finalize_claims(claims: &mut Claims) {
    if claims.content.trim().is_empty() {
        claims.content = claims.render();
    }
    if !claims.content.contains("权利要求") {
        claims.content = format!("权利要求书\n\n{}", claims.content);
    }
}

fn finalize_abstract(abstract_section: &mut Abstract) {
    if abstract_section.summary.chars().count() > MAX_SUMMARY_CHARS {
        let kept: String = abstract_section.summary.chars().take(MAX_SUMMARY_CHARS - 3).collect();
        abstract_section.summary = format!("{}...", kept);
        abstract_section.content = abstract_section.render();
    } else if abstract_section.content.trim().is_empty() {
        abstract_section.content = abstract_section.render();
    }
}

fn finalize_disclosure(disclosure: &mut Disclosure) {
    if !disclosure.content.contains("具体实施方式") {
        disclosure.content = format!("具体实施方式\n\n{}", disclosure.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::Metadata;

    fn orchestrator() -> Orchestrator {
        Orchestrator::from_config(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let mut doc = PatentDocument::new(Metadata::new("  ", "数据存储"));
        let result = orchestrator().process(&mut doc);
        assert!(!result.success);
        assert_eq!(result.errors, vec!["Patent title is required".to_string()]);
        assert!(result.check_results.is_empty());
        assert!(result.metadata.kpis.is_none());
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let doc = PatentDocument::new(Metadata::new("一种缓存装置", ""));
        let result = orchestrator().check_only(&doc);
        assert!(!result.success);
        assert_eq!(result.errors, vec!["Technical field is required".to_string()]);
        assert!(result.metadata.kpis.is_some());
    }

    #[test]
    fn test_missing_sections_are_warnings() {
        let doc = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
        let result = orchestrator().check_only(&doc);
        assert_eq!(result.warnings.len(), 4);
        assert!(result.warnings.contains(&"Claims are missing".to_string()));
        assert_eq!(result.check_results.len(), 7);
        assert!(!result.success);
    }

    #[test]
    fn test_empty_document_fails_threshold() {
        let mut doc = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
        let result = orchestrator().process(&mut doc);
        assert!(!result.success);
        assert_eq!(result.errors, vec![QUALITY_FAILURE.to_string()]);
        assert!(doc.quality_report.is_none(), "failed documents are not finalized");
    }

    #[test]
    fn test_checks_disabled_finalizes() {
        let orchestrator = Orchestrator::from_config(&PipelineConfig::default())
            .unwrap()
            .with_checks(false);
        let mut doc = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
        doc.disclosure = Some(Disclosure {
            detailed_description: "实施例描述".to_string(),
            content: "实施例描述".to_string(),
            ..Default::default()
        });

        let result = orchestrator.process(&mut doc);
        assert!(result.success);
        assert!(result.check_results.is_empty());
        assert!(result.metadata.check_statistics.is_none());
        assert_eq!(result.metadata.title.as_deref(), Some("一种缓存装置"));
        assert!(result.metadata.processed_at.is_some());
        assert!(doc.disclosure.unwrap().content.starts_with("具体实施方式\n\n"));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut doc = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
        doc.specification = Some(Specification {
            technical_field: "本发明涉及数据存储。".to_string(),
            background_art: "现有缓存命中率低。".to_string(),
            invention_content: "提供一种缓存装置。".to_string(),
            embodiments: "实施例一。".to_string(),
            content: "具体实施方式\n实施例一。".to_string(),
            ..Default::default()
        });
        doc.claims = Some(Claims {
            items: vec![],
            content: "1. 一种缓存装置。".to_string(),
        });
        doc.abstract_section = Some(Abstract {
            title: "一种缓存装置".to_string(),
            technical_field: "数据存储".to_string(),
            summary: "缓".repeat(320),
            ..Default::default()
        });

        let result = ProcessingResult::default();
        finalize(&mut doc, &result);
        let once = doc.clone();
        finalize(&mut doc, &result);
        assert_eq!(doc, once);

        let spec = doc.specification.unwrap().content;
        assert!(spec.starts_with("技术领域\n本发明涉及数据存储。"));
        assert!(spec.contains("背景技术") && spec.contains("发明内容"));
        assert!(doc.claims.unwrap().content.starts_with("权利要求书\n\n1."));

        let abstract_section = doc.abstract_section.unwrap();
        assert_eq!(abstract_section.summary.chars().count(), MAX_SUMMARY_CHARS);
        assert!(abstract_section.summary.ends_with("..."));
        assert!(abstract_section.content.contains(&abstract_section.summary));
    }

    #[test]
    fn test_quality_report_carries_provenance() {
        let orchestrator = orchestrator();
        let mut doc = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
        doc.document_version = 4;
        let result = orchestrator.check_only(&doc);
        let report = orchestrator.quality_report(&result, &doc, "trace-1");
        assert_eq!(report.audit.run_trace_id, "trace-1");
        assert_eq!(report.audit.document_version, Some(4));
        assert!(report.audit.extraction.is_none());
        assert_eq!(report.check_results, result.check_results);
        assert_eq!(report.metadata.kpis, result.metadata.kpis);
    }

    #[test]
    fn test_checker_status_lists_all_gates() {
        let status = orchestrator().checker_status();
        assert_eq!(status.len(), 7);
        assert!(status.values().all(|healthy| *healthy));
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(32))]

        #[test]
        fn prop_check_only_is_total(title in "\\PC{0,20}", summary in "\\PC{0,400}") {
            let mut doc = PatentDocument::new(Metadata::new(title, "数据存储"));
            doc.abstract_section = Some(Abstract { summary, ..Default::default() });
            let result = orchestrator().check_only(&doc);
            proptest::prop_assert!((0.0..=1.0).contains(&result.quality_score));
            proptest::prop_assert!(result.metadata.kpis.is_some());
        }

        #[test]
        fn prop_finalize_is_idempotent(summary in "\\PC{0,400}", content in "\\PC{0,60}") {
            let mut doc = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
            doc.abstract_section = Some(Abstract { summary, ..Default::default() });
            doc.disclosure = Some(Disclosure { content, ..Default::default() });
            let result = ProcessingResult::default();
            finalize(&mut doc, &result);
            let once = doc.clone();
            finalize(&mut doc, &result);
            proptest::prop_assert_eq!(doc, once);
        }
    }
}
