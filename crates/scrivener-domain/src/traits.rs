//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{EditEvent, PatentDocument, QualityReport};

/// Trait for text-generation provider operations
///
/// Implemented by the infrastructure layer (scrivener-llm)
pub trait LlmProvider {
    /// Error type for provider operations
    type Error;

    /// Generate a natural-language completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate a JSON object conforming to `schema`
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}

/// Trait for persisting documents per job
///
/// Implemented by the infrastructure layer (scrivener-store)
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Load the latest snapshot of a job
    fn load(&self, job_id: &str) -> Result<PatentDocument, Self::Error>;

    /// Bump `document_version` by one and persist the snapshot
    fn save(&self, job_id: &str, document: &mut PatentDocument) -> Result<(), Self::Error>;

    /// Append one event to the job's edit log
    fn append_edit_event(&self, job_id: &str, event: &EditEvent) -> Result<(), Self::Error>;

    /// Replace the job's latest quality report
    fn save_quality_report(&self, job_id: &str, report: &QualityReport) -> Result<(), Self::Error>;
}
