//! The uniform gate contract

use crate::error::GateError;
use scrivener_domain::{GateDetails, GateFindings, GateOutcome, PatentDocument};

/// One independent quality check over a document
///
/// Gates are pure: they read the document and return an outcome. An `Err`
/// means the gate could not judge the document at all.
pub trait Gate: Send + Sync {
    /// Stable gate name used in reports and weights
    fn name(&self) -> &'static str;

    /// Judge the document
    fn check(&self, document: &PatentDocument) -> Result<GateOutcome, GateError>;

    /// Whether the gate can run
    fn health_check(&self) -> bool {
        true
    }
}

/// Assemble an outcome, clamping the score into `[0, 1]`
pub(crate) fn outcome(
    passed: bool,
    score: f64,
    findings: GateFindings,
    errors: Vec<String>,
    warnings: Vec<String>,
    recommendations: Vec<String>,
) -> GateOutcome {
    GateOutcome {
        passed,
        score: score.clamp(0.0, 1.0),
        details: GateDetails {
            errors,
            warnings,
            recommendations,
            findings,
        },
    }
}

/// Run a gate, turning an error into a failed outcome
pub fn run_gate(gate: &dyn Gate, document: &PatentDocument) -> GateOutcome {
    match gate.check(document) {
        Ok(outcome) => outcome,
        Err(e) => GateOutcome::failed(format!("{} check failed: {}", gate.name(), e)),
    }
}

/// First `max` chars of `text`
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
