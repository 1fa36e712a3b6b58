//! Scrivener Pipeline
//!
//! Ties extraction, generation, quality gating and storage into job-level
//! operations.
//!
//! # Overview
//!
//! The pipeline is responsible for:
//! - **Orchestration**: input validation, the gate suite, the weighted
//!   threshold, section finalization and KPI collection
//! - **Re-checks**: gating an existing document without regenerating it
//! - **Edits**: single-field edits guarded by the document version, each
//!   recorded in the job's append-only edit log
//!
//! # Architecture
//!
//! ```text
//! GenerationRequest
//!   → PseExtractor (model | rules)
//!   → PatentGenerator (model | rules)
//!   → Orchestrator: validate → KPIs → gates → threshold → finalize → KPIs
//!   → JsonStore: snapshot (version +1), quality report
//!
//! EditRequest{if_version} → load → version check → apply → save → edit log
//! recheck → load → check_only → quality report
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use scrivener_generator::GenerationRequest;
//! use scrivener_llm::MockProvider;
//! use scrivener_pipeline::{EditRequest, EditService, PipelineConfig, PipelineError};
//!
//! # async fn example() -> Result<(), PipelineError> {
//! let config = PipelineConfig::rules_only().with_results_dir("results");
//! let service = EditService::new(&config, MockProvider::default())?;
//!
//! let request = GenerationRequest {
//!     title: "一种缓存装置".to_string(),
//!     technical_field: "数据存储".to_string(),
//!     invention_content: "本发明提供一种缓存装置，包括存储单元和控制单元。".to_string(),
//!     ..Default::default()
//! };
//! let run = service.run(None, &request).await?;
//!
//! let edit = EditRequest::new("claims", "claim:1", "一种缓存装置，包括存储单元。", run.document.document_version);
//! match service.apply_edit(&run.job_id, &edit) {
//!     Ok(event) => println!("now at version {}", event.document_version),
//!     Err(PipelineError::Conflict { actual, .. }) => println!("stale, stored version is {}", actual),
//!     Err(e) => return Err(e),
//! }
//! let report = service.recheck(&run.job_id)?;
//! # let _ = report;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! results_dir = "results"
//! enable_checks = true
//!
//! [llm]
//! api_key = "..."
//! base_url = "https://api.example.com/v1"
//! model = "model-name"
//!
//! [policy]
//! pass_threshold = 0.7
//! ```

#![warn(missing_docs)]

mod config;
mod edit;
mod error;
mod kpis;
mod orchestrator;
mod service;

pub use config::PipelineConfig;
pub use edit::{EditRequest, EditTarget, SpecificationField, DEFAULT_ACTOR};
pub use error::PipelineError;
pub use kpis::compute_kpis;
pub use orchestrator::{Orchestrator, MAX_SUMMARY_CHARS, QUALITY_FAILURE};
pub use service::{EditService, RunOutput};
