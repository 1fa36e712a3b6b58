//! Gate outcomes, processing results and persisted quality reports

use crate::audit::{ExtractionAudit, GenerationAudit};
use crate::document::DocumentType;
use crate::edit::EditEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity or risk level of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocking
    High,
    /// Should be fixed
    Medium,
    /// Cosmetic
    Low,
}

impl Severity {
    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// Result of one quality gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    /// Whether the gate passed
    pub passed: bool,

    /// Score in `[0, 1]`
    pub score: f64,

    /// Diagnostics
    pub details: GateDetails,
}

impl GateOutcome {
    /// Outcome for a gate that could not run
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            passed: false,
            score: 0.0,
            details: GateDetails {
                errors: vec![error.into()],
                ..GateDetails::default()
            },
        }
    }
}

/// Diagnostics common to every gate plus gate-specific findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateDetails {
    /// Errors that made the gate fail outright
    #[serde(default)]
    pub errors: Vec<String>,

    /// Non-fatal problems
    #[serde(default)]
    pub warnings: Vec<String>,

    /// Suggested fixes
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Gate-specific findings
    #[serde(default)]
    pub findings: GateFindings,
}

/// Gate-specific findings, one variant per gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateFindings {
    /// The gate produced no findings (e.g. it errored)
    #[default]
    None,
    /// Key technical feature completeness
    KtfCompleteness(KtfFindings),
    /// Claim support in the specification
    Supportability(SupportFindings),
    /// Term consistency across sections
    TermConsistency(TermFindings),
    /// Banned vocabulary
    BannedWords(BannedWordsFindings),
    /// Abstract structure and length
    AbstractValidation(AbstractFindings),
    /// Background leaking into inventive sections
    BackgroundLeakage(LeakageFindings),
    /// Structural and linguistic claim health
    ClaimQuality(ClaimQualityFindings),
}

/// Findings of the KTF completeness gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KtfFindings {
    /// Number of key technical features
    pub ktf_features_count: usize,
    /// Number of valid features
    pub valid_features_count: usize,
    /// Number of problems
    pub problems_count: usize,
    /// Number of solutions
    pub solutions_count: usize,
    /// Number of effects
    pub effects_count: usize,
    /// Minimums that were not met
    pub missing_elements: Vec<String>,
    /// Problem/solution/effect coherence
    pub coherence: f64,
}

/// Findings of the supportability gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportFindings {
    /// Number of claims checked
    pub claims_count: usize,
    /// Number of claims meeting the support threshold
    pub supported_claims: usize,
    /// Numbers of unsupported claims
    pub unsupported_claims: Vec<u32>,
    /// Support ratio per claim (`claim_N`)
    pub support_scores: BTreeMap<String, f64>,
}

/// Per-section occurrence counts of a term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionUsage {
    /// Occurrences in the specification
    pub specification: usize,
    /// Occurrences in the claims
    pub claims: usize,
    /// Occurrences in the abstract
    #[serde(rename = "abstract")]
    pub abstract_section: usize,
    /// Occurrences in the disclosure
    pub disclosure: usize,
}

impl SectionUsage {
    /// Number of sections the term appears in
    pub fn sections_used(&self) -> usize {
        [self.specification, self.claims, self.abstract_section, self.disclosure]
            .iter()
            .filter(|&&n| n > 0)
            .count()
    }
}

/// A term used in too few sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermIssue {
    /// The term
    pub term: String,
    /// Where it appears
    pub usage: SectionUsage,
    /// Description of the problem
    pub issue: String,
}

/// Findings of the term consistency gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermFindings {
    /// Number of candidate terms
    pub total_terms: usize,
    /// Terms appearing in at least two sections
    pub consistent_terms: usize,
    /// Terms appearing in fewer sections
    pub inconsistent_terms: Vec<TermIssue>,
    /// Usage of every term
    pub term_usage: BTreeMap<String, SectionUsage>,
}

/// One banned-word hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Matched text
    pub word: String,
    /// Character offset in the scanned text
    pub position: usize,
    /// Surrounding text with the match bracketed
    pub context: String,
    /// Lexicon category
    pub category: String,
    /// Category severity
    pub severity: Severity,
    /// Why the category is banned
    pub reason: String,
}

/// Violation counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// High-severity hits
    pub high: usize,
    /// Medium-severity hits
    pub medium: usize,
    /// Low-severity hits
    pub low: usize,
}

impl SeverityCounts {
    /// Increment the counter for a severity
    pub fn record(&mut self, severity: Severity, n: usize) {
        match severity {
            Severity::High => self.high += n,
            Severity::Medium => self.medium += n,
            Severity::Low => self.low += n,
        }
    }
}

/// Findings of the banned-words gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BannedWordsFindings {
    /// Total hits
    pub total_violations: usize,
    /// Hits grouped by category
    pub violations_by_category: BTreeMap<String, Vec<Violation>>,
    /// Hit counts by severity
    pub violations_by_severity: SeverityCounts,
    /// High-severity hits
    pub critical_violations: Vec<Violation>,
}

/// Findings of the abstract gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbstractFindings {
    /// Summary length in characters
    pub length: usize,
    /// Title present
    pub has_title: bool,
    /// Technical field present
    pub has_technical_field: bool,
    /// Summary present
    pub has_summary: bool,
    /// Missing fields
    pub missing_elements: Vec<String>,
    /// Length problems
    pub length_issues: Vec<String>,
}

/// One section with too much background vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakageIssue {
    /// Section name
    pub section: String,
    /// Fraction of background words found in the section
    pub overlap_score: f64,
    /// `high` above 0.5, otherwise `medium`
    pub severity: Severity,
}

/// Findings of the background leakage gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeakageFindings {
    /// Background length in characters
    pub background_length: usize,
    /// Sections over the threshold
    pub leakage_issues: Vec<LeakageIssue>,
    /// Overlap per section
    pub overlap_scores: BTreeMap<String, f64>,
}

/// One claim-quality issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimIssue {
    /// Issue type, e.g. `structure.missing_parent`
    #[serde(rename = "type")]
    pub issue_type: String,
    /// Affected claim, if any
    pub claim_number: Option<u32>,
    /// Excerpt of the claim text
    pub snippet: String,
    /// Risk level
    pub risk: Severity,
    /// Explanation
    pub message: String,
}

/// Pair of near-duplicate dependent claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedundantPair {
    /// First claim number
    pub a: u32,
    /// Second claim number
    pub b: u32,
    /// Sequence similarity ratio
    pub similarity: f64,
}

/// Claim statistics gathered by the claim-quality gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimQualitySummary {
    /// All claims
    pub claims_count: usize,
    /// Independent claims
    pub independent_claims_count: usize,
    /// Dependent claims
    pub dependent_claims_count: usize,
    /// Features referenced (or named) by the independent claim
    pub independent_feature_count: usize,
    /// Feature references across all claims
    pub total_feature_refs: usize,
    /// References absent from the feature index
    pub unsupported_feature_refs: usize,
    /// Dependent claims involved in a redundant pair
    pub redundant_dependent_claims_count: usize,
    /// Redundant pairs
    pub redundant_pairs: Vec<RedundantPair>,
}

/// Findings of the claim-quality gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimQualityFindings {
    /// Issues found
    pub issues: Vec<ClaimIssue>,
    /// Statistics
    pub summary: ClaimQualitySummary,
}

impl ClaimQualityFindings {
    /// Issues of the given type
    pub fn issues_of<'a>(&'a self, issue_type: &'a str) -> impl Iterator<Item = &'a ClaimIssue> + 'a {
        self.issues.iter().filter(move |i| i.issue_type == issue_type)
    }
}

/// Key performance indicators of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// All claims
    pub claims_count: usize,
    /// Independent claims
    pub independent_claims_count: usize,
    /// Mean length of numbered claim lines in characters
    pub avg_claim_length: f64,
    /// Score of the term consistency gate
    pub term_consistency_score: f64,
    /// Features referenced by the independent claim
    pub independent_claim_feature_count: usize,
    /// Feature references per claim
    pub avg_features_per_claim: f64,
    /// Unsupported references / all references
    pub unsupported_feature_ratio: f64,
    /// Redundant dependents / all dependents
    pub redundant_claim_ratio: f64,
}

/// Summary statistics over gate outcomes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckStatistics {
    /// Gates run
    pub total_checks: usize,
    /// Gates passed
    pub passed_checks: usize,
    /// Gates failed
    pub failed_checks: usize,
    /// Mean gate score
    pub average_score: f64,
    /// Gate count per score decile, e.g. `"70-80"`
    pub score_distribution: BTreeMap<String, usize>,
}

/// Metadata attached to a [`ProcessingResult`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// KPIs
    #[serde(default)]
    pub kpis: Option<Kpis>,
    /// Gate statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_statistics: Option<CheckStatistics>,
    /// Title of the processed document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Technical field of the processed document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_field: Option<String>,
    /// Application type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    /// When processing finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Outcome of an orchestrated run. Never mutated after return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Whether the document passed
    pub success: bool,
    /// Weighted aggregate score
    pub quality_score: f64,
    /// Outcome per gate name
    pub check_results: BTreeMap<String, GateOutcome>,
    /// Fatal errors
    pub errors: Vec<String>,
    /// Non-fatal warnings
    pub warnings: Vec<String>,
    /// Elapsed time in seconds
    pub processing_time_secs: f64,
    /// KPIs and statistics
    pub metadata: ResultMetadata,
}

/// Audit block of a persisted quality report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportAudit {
    /// Trace id of the run that produced the report
    pub run_trace_id: String,
    /// Extraction provenance
    #[serde(default)]
    pub extraction: Option<ExtractionAudit>,
    /// Generation provenance
    #[serde(default)]
    pub generation: GenerationAudit,
    /// Document version the report describes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_version: Option<u64>,
    /// Edit that triggered the re-check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edit: Option<EditEvent>,
}

/// Quality report persisted as `quality_report.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Whether the document passed
    pub success: bool,
    /// Weighted aggregate score
    pub quality_score: f64,
    /// Fatal errors
    pub errors: Vec<String>,
    /// Non-fatal warnings
    pub warnings: Vec<String>,
    /// Outcome per gate name
    pub check_results: BTreeMap<String, GateOutcome>,
    /// KPIs and statistics
    pub metadata: ResultMetadata,
    /// Provenance
    pub audit: ReportAudit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_outcome() {
        let outcome = GateOutcome::failed("boom");
        assert!(!outcome.passed);
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.details.errors, vec!["boom".to_string()]);
        assert_eq!(outcome.details.findings, GateFindings::None);
    }

    #[test]
    fn test_findings_are_tagged_by_gate() {
        let details = GateDetails {
            findings: GateFindings::AbstractValidation(AbstractFindings::default()),
            ..Default::default()
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["findings"]["gate"], "abstract_validation");
        let back: GateDetails = serde_json::from_value(value).unwrap();
        assert_eq!(back, details);
    }

    #[test]
    fn test_section_usage_counts_sections() {
        let usage = SectionUsage {
            specification: 3,
            claims: 0,
            abstract_section: 1,
            disclosure: 0,
        };
        assert_eq!(usage.sections_used(), 2);
    }

    #[test]
    fn test_issue_type_serializes_as_type() {
        let issue = ClaimIssue {
            issue_type: "structure.missing_parent".to_string(),
            claim_number: Some(3),
            snippet: String::new(),
            risk: Severity::High,
            message: String::new(),
        };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "structure.missing_parent");
        assert_eq!(value["risk"], "high");
    }
}
