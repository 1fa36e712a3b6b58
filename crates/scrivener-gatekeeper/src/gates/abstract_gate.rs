//! Abstract structure and length

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{outcome, Gate};
use scrivener_domain::{AbstractFindings, GateFindings, GateOutcome, PatentDocument};

/// Checks that the abstract carries a title, field and summary of sane length
pub struct AbstractValidationGate {
    min_length: usize,
    max_length: usize,
}

impl AbstractValidationGate {
    /// Create the gate from shared thresholds
    pub fn new(config: &GateConfig) -> Self {
        Self {
            min_length: config.abstract_min_length,
            max_length: config.abstract_max_length,
        }
    }
}

impl Gate for AbstractValidationGate {
    fn name(&self) -> &'static str {
        "abstract_validation"
    }

    fn check(&self, document: &PatentDocument) -> Result<GateOutcome, GateError> {
        let abs = document
            .abstract_section
            .as_ref()
            .ok_or_else(|| GateError::MissingSection("Abstract".to_string()))?;

        let mut findings = AbstractFindings {
            has_title: !abs.title.trim().is_empty(),
            has_technical_field: !abs.technical_field.trim().is_empty(),
            has_summary: !abs.summary.trim().is_empty(),
            ..Default::default()
        };
        for (present, element) in [
            (findings.has_title, "title"),
            (findings.has_technical_field, "technical_field"),
            (findings.has_summary, "summary"),
        ] {
            if !present {
                findings.missing_elements.push(element.to_string());
            }
        }

        let mut warnings = Vec::new();
        if findings.has_summary {
            findings.length = abs.summary.chars().count();
            if findings.length > self.max_length {
                findings
                    .length_issues
                    .push(format!("Abstract too long: {} > {}", findings.length, self.max_length));
            } else if findings.length < self.min_length {
                let issue = format!("Abstract too short: {} < {}", findings.length, self.min_length);
                warnings.push(issue.clone());
                findings.length_issues.push(issue);
            }
        }

        let within_limit = findings.length > 0 && findings.length <= self.max_length;
        let passed = findings.has_title && findings.has_technical_field && findings.has_summary && within_limit;
        let score = [
            findings.has_title,
            findings.has_technical_field,
            findings.has_summary,
            within_limit,
        ]
        .iter()
        .filter(|ok| **ok)
        .count() as f64
            * 0.25;

        let mut recommendations = Vec::new();
        if !passed {
            if !findings.missing_elements.is_empty() {
                recommendations.push(format!("Add missing elements: {}", findings.missing_elements.join(", ")));
            }
            if !findings.length_issues.is_empty() {
                recommendations.push("Fix abstract length issues".to_string());
            }
        }

        Ok(outcome(
            passed,
            score,
            GateFindings::AbstractValidation(findings),
            Vec::new(),
            warnings,
            recommendations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::{Abstract, Metadata};

    fn document(title: &str, field: &str, summary: &str) -> PatentDocument {
        let mut document = PatentDocument::new(Metadata::new(title, field));
        document.abstract_section = Some(Abstract {
            title: title.to_string(),
            technical_field: field.to_string(),
            summary: summary.to_string(),
            ..Default::default()
        });
        document
    }

    fn check(document: &PatentDocument) -> GateOutcome {
        AbstractValidationGate::new(&GateConfig::default()).check(document).unwrap()
    }

    fn findings(outcome: &GateOutcome) -> &AbstractFindings {
        match &outcome.details.findings {
            GateFindings::AbstractValidation(f) => f,
            other => panic!("unexpected findings {:?}", other),
        }
    }

    #[test]
    fn test_complete_abstract_passes() {
        let outcome = check(&document("一种缓存装置", "数据存储", &"字".repeat(120)));
        assert!(outcome.passed);
        assert_eq!(outcome.score, 1.0);
        assert_eq!(findings(&outcome).length, 120);
    }

    #[test]
    fn test_long_summary_fails() {
        let outcome = check(&document("一种缓存装置", "数据存储", &"字".repeat(301)));
        assert!(!outcome.passed);
        assert_eq!(outcome.score, 0.75);
        assert_eq!(findings(&outcome).length_issues, vec!["Abstract too long: 301 > 300"]);
        assert_eq!(outcome.details.recommendations, vec!["Fix abstract length issues"]);
    }

    #[test]
    fn test_short_summary_warns_but_passes() {
        let outcome = check(&document("一种缓存装置", "数据存储", "简短摘要"));
        assert!(outcome.passed);
        assert_eq!(outcome.details.warnings, vec!["Abstract too short: 4 < 50"]);
    }

    #[test]
    fn test_missing_elements() {
        let outcome = check(&document("", "数据存储", ""));
        assert!(!outcome.passed);
        assert_eq!(outcome.score, 0.25);
        assert_eq!(findings(&outcome).missing_elements, vec!["title", "summary"]);
        assert_eq!(outcome.details.recommendations, vec!["Add missing elements: title, summary"]);
    }

    #[test]
    fn test_missing_abstract_is_an_error() {
        let document = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
        let gate = AbstractValidationGate::new(&GateConfig::default());
        assert!(matches!(gate.check(&document), Err(GateError::MissingSection(_))));
    }
}
