//! Scrivener Domain Layer
//!
//! This crate contains the shared data model for Scrivener: the patent
//! document bundle, the problem/solution/effect (PSE) matrix that grounds it,
//! the audit records every generation step stamps, and the report types the
//! quality gates produce.
//!
//! ## Key Concepts
//!
//! - **PSE matrix**: problems, solutions, effects and key technical features
//!   extracted from a disclosure, plus an `F1..Fn` feature index
//! - **Claim**: a closed `Independent | Dependent` enum; dependents form a DAG
//!   rooted at the single independent claim
//! - **PatentDocument**: specification, claims, abstract and disclosure with a
//!   monotonically increasing `document_version`
//! - **Audit**: every branch records whether the model or the rules produced it
//!
//! ## Architecture
//!
//! - No infrastructure code; serialization only
//! - Trait definitions for external interactions live in [`traits`]
//! - Generation, gating and persistence are implemented in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod claim;
pub mod document;
pub mod edit;
pub mod feature;
pub mod report;
pub mod traits;

// Re-exports for convenience
pub use audit::{
    DocumentAudit, ExtractionAudit, FallbackReason, GenerationAudit, GenerationSource,
    ProviderMeta, StepAudit, TermInfo,
};
pub use claim::{Claim, Claims, DependentClaim, IndependentClaim, DEFAULT_TRANSITION};
pub use document::{
    Abstract, Disclosure, DocumentType, Metadata, PatentDocument, Specification,
};
pub use edit::EditEvent;
pub use feature::{KtfIndex, PseMatrix, TechnicalFeature};
pub use report::{
    AbstractFindings, BannedWordsFindings, CheckStatistics, ClaimIssue, ClaimQualityFindings,
    ClaimQualitySummary, GateDetails, GateFindings, GateOutcome, KtfFindings, Kpis,
    LeakageFindings, LeakageIssue, ProcessingResult, QualityReport, RedundantPair, ReportAudit,
    ResultMetadata, SectionUsage, Severity, SeverityCounts, SupportFindings, TermFindings,
    TermIssue, Violation,
};
