//! Background leaking into the inventive sections

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{outcome, Gate};
use scrivener_domain::{GateFindings, GateOutcome, LeakageFindings, LeakageIssue, PatentDocument, Severity};
use scrivener_extractor::text::segment;
use std::collections::HashSet;

/// Flags sections that mostly restate the background art
pub struct BackgroundLeakageGate {
    threshold: f64,
    high_threshold: f64,
}

impl BackgroundLeakageGate {
    /// Create the gate from shared thresholds
    pub fn new(config: &GateConfig) -> Self {
        Self {
            threshold: config.leakage_threshold,
            high_threshold: config.leakage_high_threshold,
        }
    }
}

impl Gate for BackgroundLeakageGate {
    fn name(&self) -> &'static str {
        "background_leakage"
    }

    fn check(&self, document: &PatentDocument) -> Result<GateOutcome, GateError> {
        let spec = document
            .specification
            .as_ref()
            .ok_or_else(|| GateError::MissingSection("Specification".to_string()))?;

        let background = spec.background_art.trim().to_lowercase();
        if background.is_empty() {
            return Ok(outcome(
                true,
                1.0,
                GateFindings::BackgroundLeakage(LeakageFindings::default()),
                Vec::new(),
                vec!["Background section is empty".to_string()],
                Vec::new(),
            ));
        }

        let mut sections: Vec<(&str, &str)> = Vec::new();
        if !spec.invention_content.is_empty() {
            sections.push(("invention_content", &spec.invention_content));
        }
        if !spec.embodiments.is_empty() {
            sections.push(("embodiments", &spec.embodiments));
        }
        if let Some(claims) = document.claims.as_ref().filter(|c| !c.content.is_empty()) {
            sections.push(("claims", &claims.content));
        }

        let background_tokens = segment(&background);
        let mut findings = LeakageFindings {
            background_length: background.chars().count(),
            ..Default::default()
        };
        let mut flagged_total = 0.0;
        for (name, text) in sections {
            let overlap = overlap(&background_tokens, &segment(&text.to_lowercase()));
            findings.overlap_scores.insert(name.to_string(), overlap);
            if overlap > self.threshold {
                let severity = if overlap > self.high_threshold {
                    Severity::High
                } else {
                    Severity::Medium
                };
                findings.leakage_issues.push(LeakageIssue {
                    section: name.to_string(),
                    overlap_score: overlap,
                    severity,
                });
                flagged_total += overlap;
            }
        }

        let score = match findings.leakage_issues.len() {
            0 => 1.0,
            n => (1.0 - flagged_total / n as f64).max(0.0),
        };
        let passed = findings.leakage_issues.is_empty();
        let recommendations = if passed {
            Vec::new()
        } else {
            vec![
                "Reduce background information in invention sections".to_string(),
                "Focus invention content on novel aspects".to_string(),
            ]
        };

        Ok(outcome(
            passed,
            score,
            GateFindings::BackgroundLeakage(findings),
            Vec::new(),
            Vec::new(),
            recommendations,
        ))
    }
}

/// Share of background tokens found in the section
fn overlap(background: &HashSet<String>, section: &HashSet<String>) -> f64 {
    if background.is_empty() {
        return 0.0;
    }
    background.intersection(section).count() as f64 / background.len() as f64
}
