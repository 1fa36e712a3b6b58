//! Integration tests for scrivener-pipeline
//!
//! These tests drive whole jobs through generation, storage, edits and
//! re-checks against a temporary results directory.

use scrivener_domain::traits::DocumentStore;
use scrivener_domain::{FallbackReason, GenerationSource};
use scrivener_generator::GenerationRequest;
use scrivener_llm::{LlmConfig, MockProvider};
use scrivener_pipeline::{EditRequest, EditService, PipelineConfig, PipelineError, DEFAULT_ACTOR};
use scrivener_store::{sha256_hex, REPORT_FILE, SNAPSHOT_FILE};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Set RUST_LOG=debug to see pipeline logs while debugging a test
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn request() -> GenerationRequest {
    GenerationRequest {
        title: "一种日志同步装置".to_string(),
        technical_field: "分布式存储".to_string(),
        background: "现有的分布式存储系统存在数据同步延迟高的问题，导致读写一致性难以保证。".to_string(),
        invention_content: "本发明提出一种基于日志复制的同步方法，解决数据同步延迟高的问题。\
            所述同步装置包括日志采集模块、日志传输单元和一致性校验模块。\
            该方法能够降低同步延迟，实现多节点数据的一致性。"
            .to_string(),
        embodiments: "实施例1：主节点的日志采集模块记录操作日志，日志传输单元将日志异步推送给从节点。".to_string(),
        drawings_description: None,
    }
}

fn rules_service() -> (TempDir, EditService<MockProvider>) {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::rules_only().with_results_dir(dir.path());
    let service = EditService::new(&config, MockProvider::default()).unwrap();
    (dir, service)
}

#[tokio::test]
async fn test_rules_only_run_is_persisted() {
    let (dir, service) = rules_service();
    let run = service.run(Some("job-rules"), &request()).await.unwrap();

    assert_eq!(run.job_id, "job-rules");
    assert_eq!(run.document.document_version, 2);
    assert!(dir.path().join("job-rules").join(SNAPSHOT_FILE).is_file());
    assert!(dir.path().join("job-rules").join(REPORT_FILE).is_file());

    let extraction = run.report.audit.extraction.as_ref().unwrap();
    assert_eq!(extraction.extraction_source, GenerationSource::Rules);
    assert_eq!(extraction.fallback_reason, Some(FallbackReason::ForcedRules));
    let claims_step = run.report.audit.generation.claims.as_ref().unwrap();
    assert_eq!(claims_step.source, GenerationSource::Rules);

    assert_eq!(run.result.check_results.len(), 7);
    assert!((0.0..=1.0).contains(&run.result.quality_score));
    assert!(run.result.metadata.kpis.as_ref().unwrap().claims_count >= 1);
    assert_eq!(run.report.success, run.result.success);
    assert_eq!(run.report.audit.document_version, Some(2));
    assert!(!run.report.audit.run_trace_id.is_empty());

    let stored = service.store().load("job-rules").unwrap();
    assert_eq!(stored, run.document);
    assert_eq!(service.store().load_quality_report("job-rules").unwrap(), run.report);
}

#[tokio::test]
async fn test_disabled_model_routes_everything_through_rules() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        llm: LlmConfig::disabled(),
        ..Default::default()
    }
    .with_results_dir(dir.path());
    let provider = MockProvider::default();
    let service = EditService::new(&config, provider.clone()).unwrap();

    let request = GenerationRequest {
        title: "一种专利四件套生成系统".to_string(),
        technical_field: "自然语言处理".to_string(),
        background: "...".to_string(),
        invention_content: "包括解析模块，采用注意力机制".to_string(),
        embodiments: "...".to_string(),
        drawings_description: None,
    };
    let run = service.run(None, &request).await.unwrap();
    assert_eq!(provider.call_count(), 0);

    let extraction = run.report.audit.extraction.as_ref().unwrap();
    assert_eq!(extraction.extraction_source, GenerationSource::Rules);
    let generation = &run.document.audit.generation;
    assert_eq!(generation.claims.as_ref().unwrap().source, GenerationSource::Rules);
    assert_eq!(generation.abstract_step.as_ref().unwrap().source, GenerationSource::Rules);

    let claims = run.document.claims.as_ref().unwrap();
    assert_eq!(claims.independent().count(), 1);
    let independent = claims.independent().next().unwrap();
    assert!(independent.body.contains("解析模块"), "body: {}", independent.body);
    for dependent in claims.dependent() {
        assert!(!dependent.additional_features.contains("利四件套"));
    }
}

#[test]
fn test_run_rejects_missing_title() {
    let (dir, service) = rules_service();
    let mut request = request();
    request.title = "   ".to_string();

    let err = tokio_test::block_on(service.run(Some("job-untitled"), &request)).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(ref m) if m == "Patent title is required"));
    assert!(!dir.path().join("job-untitled").exists(), "nothing is created for rejected input");
}

#[tokio::test]
async fn test_edit_then_stale_retry_is_rejected() {
    let (_dir, service) = rules_service();
    let run = service.run(None, &request()).await.unwrap();
    let version = run.document.document_version;

    let edit = EditRequest::new(
        "claims",
        "claim:1",
        "一种日志同步装置，包括日志采集模块和日志传输单元。",
        version,
    );
    let event = service.apply_edit(&run.job_id, &edit).unwrap();
    assert_eq!(event.document_version, version + 1);
    assert_eq!(event.actor, DEFAULT_ACTOR);
    assert_eq!(event.section, "claims");
    assert_eq!(event.target, "claim:1");
    assert_eq!(event.new_sha256, Some(sha256_hex(&event.new_value)));

    let edited = service.store().load(&run.job_id).unwrap();
    assert_eq!(edited.document_version, version + 1);
    assert_eq!(
        edited.claims.as_ref().unwrap().get(1).unwrap().text(),
        "一种日志同步装置，包括日志采集模块和日志传输单元。"
    );
    assert_eq!(edited.audit.last_edit.as_ref(), Some(&event));

    let retry = EditRequest::new("claims", "claim:1", "另一种写法。", version);
    match service.apply_edit(&run.job_id, &retry) {
        Err(PipelineError::Conflict { expected, actual }) => {
            assert_eq!(expected, version);
            assert_eq!(actual, version + 1);
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    assert_eq!(service.store().load(&run.job_id).unwrap(), edited);
    let summary = service.store().edit_summary(&run.job_id).unwrap();
    assert_eq!(summary.total_events, 1);
    assert_eq!(summary.counts_by_actor[DEFAULT_ACTOR], 1);
}

#[tokio::test]
async fn test_invalid_edit_writes_nothing() {
    let (_dir, service) = rules_service();
    let run = service.run(None, &request()).await.unwrap();
    let version = run.document.document_version;

    let bad = EditRequest::new("metadata", "title", "新标题", version);
    assert!(matches!(
        service.apply_edit(&run.job_id, &bad),
        Err(PipelineError::InvalidEdit(_))
    ));
    let empty = EditRequest::new("abstract", "summary", "  ", version);
    assert!(matches!(
        service.apply_edit(&run.job_id, &empty),
        Err(PipelineError::InvalidEdit(_))
    ));

    assert_eq!(service.store().current_version(&run.job_id).unwrap(), version);
    assert_eq!(service.store().edit_summary(&run.job_id).unwrap().total_events, 0);
}

#[tokio::test]
async fn test_edit_unknown_job_is_not_found() {
    let (_dir, service) = rules_service();
    let edit = EditRequest::new("abstract", "summary", "摘要", 1);
    assert!(matches!(
        service.apply_edit("missing-job", &edit),
        Err(PipelineError::Store(scrivener_store::StoreError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_recheck_reports_version_and_last_edit() {
    let (_dir, service) = rules_service();
    let run = service.run(None, &request()).await.unwrap();

    let edit = EditRequest::new(
        "abstract",
        "summary",
        "本发明公开了一种日志同步装置，涉及分布式存储技术领域，通过日志采集模块记录操作日志并由日志传输单元异步推送，降低了数据同步延迟。",
        run.document.document_version,
    )
    .with_actor("reviewer");
    service.apply_edit(&run.job_id, &edit).unwrap();
    let edit = EditRequest::new(
        "specification",
        "background_art",
        "现有系统数据同步延迟高。",
        run.document.document_version + 1,
    );
    service.apply_edit(&run.job_id, &edit).unwrap();

    let report = service.recheck(&run.job_id).unwrap();
    assert_eq!(report.audit.document_version, Some(run.document.document_version + 2));
    let last_edit = report.audit.last_edit.as_ref().unwrap();
    assert_eq!(last_edit.actor, "human_edit");
    assert_eq!(last_edit.target, "background_art");
    assert_ne!(report.audit.run_trace_id, run.report.audit.run_trace_id);
    assert!(report.metadata.kpis.is_some());
    assert_eq!(service.store().load_quality_report(&run.job_id).unwrap(), report);

    let summary = service.store().edit_summary(&run.job_id).unwrap();
    assert_eq!(summary.counts_by_actor["reviewer"], 1);
    assert_eq!(summary.counts_by_actor["human_edit"], 1);
}

#[tokio::test]
async fn test_recheck_is_idempotent() {
    let (_dir, service) = rules_service();
    let run = service.run(None, &request()).await.unwrap();

    let first = service.recheck(&run.job_id).unwrap();
    let second = service.recheck(&run.job_id).unwrap();
    assert_eq!(first.check_results, second.check_results);
    assert_eq!(first.quality_score, second.quality_score);
    assert_eq!(first.success, second.success);
    assert_eq!(first.metadata.kpis, second.metadata.kpis);
    assert_eq!(
        service.store().current_version(&run.job_id).unwrap(),
        run.document.document_version,
        "re-checks never bump the version"
    );
}

#[tokio::test]
async fn test_model_flow_records_provenance() {
    let provider = MockProvider::default();
    provider.queue_response(
        r#"{"problems":["数据同步延迟高"],"solutions":["基于日志复制的同步"],"effects":["降低同步延迟"],
            "kt_features":[{"name":"日志采集模块"},{"name":"日志传输单元"},{"name":"一致性校验模块"}]}"#,
    );
    provider.queue_response(
        r#"{"independent_claim": {"number": "1", "text": "一种日志同步装置，其特征在于包括日志采集模块、日志传输单元和一致性校验模块。", "feature_refs": ["F1", "F2", "F3"]},
            "dependent_claims": [{"number": "2", "depends_on": "1", "text": "根据权利要求1所述的装置，其中日志传输单元采用异步推送。", "feature_refs": ["F2"]}]}"#,
    );
    provider.queue_response(
        r#"{"summary": "本发明公开了一种日志同步装置，涉及分布式存储技术领域，通过日志采集模块记录主节点操作日志并由日志传输单元异步推送给从节点，降低了数据同步延迟。"}"#,
    );

    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        llm: LlmConfig::new("k", "http://mock.local/v1", "mock"),
        ..Default::default()
    }
    .with_results_dir(dir.path());
    let service = EditService::new(&config, provider.clone()).unwrap();

    let run = service.run(Some("job-model"), &request()).await.unwrap();
    assert_eq!(provider.call_count(), 3);

    let extraction = run.report.audit.extraction.as_ref().unwrap();
    assert_eq!(extraction.extraction_source, GenerationSource::Model);
    assert_eq!(extraction.llm.model, "mock");
    let generation = &run.report.audit.generation;
    assert_eq!(generation.claims.as_ref().unwrap().source, GenerationSource::Model);
    assert_eq!(generation.abstract_step.as_ref().unwrap().source, GenerationSource::Model);
    assert_eq!(generation.feature_refs(1).len(), 3);

    let report_json = serde_json::to_string(&run.report).unwrap();
    assert!(!report_json.contains("\"k\""), "the API key never reaches the report");
}

#[tokio::test]
async fn test_failing_provider_falls_back_to_rules() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        llm: LlmConfig::new("k", "http://mock.local/v1", "mock"),
        ..Default::default()
    }
    .with_results_dir(dir.path());
    let service = EditService::new(&config, MockProvider::failing()).unwrap();

    let run = service.run(None, &request()).await.unwrap();
    let extraction = run.report.audit.extraction.as_ref().unwrap();
    assert_eq!(extraction.extraction_source, GenerationSource::Rules);
    assert_eq!(
        extraction.fallback_reason,
        Some(FallbackReason::ModelUnavailableOrInvalid)
    );
    assert!(run.document.claims.as_ref().unwrap().get(1).is_some());
}
