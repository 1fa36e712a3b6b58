//! Claim supportability in the specification

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{outcome, Gate};
use scrivener_domain::{Claim, GateFindings, GateOutcome, PatentDocument, SupportFindings};
use scrivener_extractor::text::segment;
use std::collections::HashSet;

/// Checks that each claim's vocabulary appears in the specification
pub struct SupportabilityGate {
    threshold: f64,
}

impl SupportabilityGate {
    /// Create the gate from shared thresholds
    pub fn new(config: &GateConfig) -> Self {
        Self {
            threshold: config.support_threshold,
        }
    }
}

impl Gate for SupportabilityGate {
    fn name(&self) -> &'static str {
        "supportability"
    }

    fn check(&self, document: &PatentDocument) -> Result<GateOutcome, GateError> {
        let (Some(claims), Some(spec)) = (&document.claims, &document.specification) else {
            return Err(GateError::MissingSection("Claims or specification".to_string()));
        };
        let spec_tokens = segment(&spec.content);

        let mut findings = SupportFindings::default();
        // Independent claims first, then dependents
        let ordered = claims
            .items
            .iter()
            .filter(|c| matches!(c, Claim::Independent(_)))
            .chain(claims.items.iter().filter(|c| matches!(c, Claim::Dependent(_))));
        for claim in ordered {
            let ratio = support_ratio(&claim_support_text(claim), &spec_tokens);
            findings.claims_count += 1;
            findings
                .support_scores
                .insert(format!("claim_{}", claim.number()), ratio);
            if ratio >= self.threshold {
                findings.supported_claims += 1;
            } else {
                findings.unsupported_claims.push(claim.number());
            }
        }

        let score = if findings.claims_count > 0 {
            findings.supported_claims as f64 / findings.claims_count as f64
        } else {
            0.0
        };
        let passed = score >= self.threshold;
        let recommendations = if passed {
            Vec::new()
        } else {
            vec![
                "Ensure all claims are adequately supported by specification".to_string(),
                "Add missing technical details to specification".to_string(),
            ]
        };

        Ok(outcome(
            passed,
            score,
            GateFindings::Supportability(findings),
            Vec::new(),
            Vec::new(),
            recommendations,
        ))
    }
}

/// Preamble and body for the independent claim, the limitation for dependents
fn claim_support_text(claim: &Claim) -> String {
    match claim {
        Claim::Independent(c) => format!("{} {}", c.preamble, c.body),
        Claim::Dependent(c) => c.additional_features.clone(),
    }
}

fn support_ratio(claim_text: &str, spec_tokens: &HashSet<String>) -> f64 {
    let tokens = segment(claim_text);
    if tokens.is_empty() {
        return 0.0;
    }
    tokens.intersection(spec_tokens).count() as f64 / tokens.len() as f64
}
