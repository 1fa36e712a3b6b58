//! Provenance records for extraction and generation steps
//!
//! Every branch that may either call the text-generation capability or fall
//! back to deterministic rules stamps one of these records, so a reader of a
//! persisted document can tell which path produced each section.

use crate::edit::EditEvent;
use crate::feature::KtfIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which path produced a section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    /// Structured output from the text-generation capability
    #[serde(alias = "llm")]
    Model,

    /// Deterministic rules or templates
    #[default]
    Rules,
}

impl GenerationSource {
    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationSource::Model => "model",
            GenerationSource::Rules => "rules",
        }
    }
}

/// Why a step fell back to rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The caller asked for rules only
    ForcedRules,

    /// The input text was empty after cleaning
    EmptyText,

    /// Not configured, transport failure, timeout or invalid output
    #[serde(rename = "llm_unavailable_or_invalid")]
    ModelUnavailableOrInvalid,
}

impl FallbackReason {
    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::ForcedRules => "forced_rules",
            FallbackReason::EmptyText => "empty_text",
            FallbackReason::ModelUnavailableOrInvalid => "llm_unavailable_or_invalid",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider metadata safe to persist (never contains the API key)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMeta {
    /// Whether a provider was configured for the run
    #[serde(default)]
    pub configured: bool,

    /// Provider host, derived from the base URL
    #[serde(default)]
    pub provider: String,

    /// Base URL of the endpoint
    #[serde(default)]
    pub base_url: String,

    /// Model identifier
    #[serde(default)]
    pub model: String,
}

/// Audit block attached to a [`PseMatrix`](crate::PseMatrix)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionAudit {
    /// Which path produced the matrix
    #[serde(default)]
    pub extraction_source: GenerationSource,

    /// Set whenever `extraction_source` is `rules`
    #[serde(default)]
    pub fallback_reason: Option<FallbackReason>,

    /// Trace id of the capability call (or a fresh one for rules)
    #[serde(default)]
    pub trace_id: String,

    /// Provider metadata
    #[serde(default)]
    pub llm: ProviderMeta,

    /// `F1..Fn` feature index
    #[serde(default)]
    pub ktf_index: KtfIndex,
}

/// Term definition recorded by the grounded claims protocol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermInfo {
    /// Definition of the term
    #[serde(default)]
    pub definition: String,

    /// Where the term occurs, e.g. `claim:1`, `spec:p3`
    #[serde(default)]
    pub occurrences: Vec<String>,
}

/// Audit record for one generation step (claims or abstract)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepAudit {
    /// Which path produced the section
    pub source: GenerationSource,

    /// Trace id of the capability call (or a fresh one for rules)
    pub trace_id: String,

    /// Provider metadata
    #[serde(default)]
    pub llm: ProviderMeta,

    /// `None` on model success
    #[serde(default)]
    pub fallback_reason: Option<FallbackReason>,

    /// Term map returned by the model
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub term_map: BTreeMap<String, TermInfo>,

    /// Feature references per claim number
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_refs_by_claim: BTreeMap<String, Vec<String>>,
}

/// Per-section generation audits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationAudit {
    /// Claims generation
    #[serde(default)]
    pub claims: Option<StepAudit>,

    /// Abstract generation
    #[serde(default, rename = "abstract")]
    pub abstract_step: Option<StepAudit>,
}

impl GenerationAudit {
    /// Feature references recorded for a claim number
    pub fn feature_refs(&self, claim_number: u32) -> &[String] {
        self.claims
            .as_ref()
            .and_then(|a| a.feature_refs_by_claim.get(&claim_number.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Document-level audit data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAudit {
    /// Generation provenance
    #[serde(default)]
    pub generation: GenerationAudit,

    /// Last applied edit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edit: Option<EditEvent>,
}
