//! Key technical feature completeness

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{outcome, Gate};
use scrivener_domain::{GateFindings, GateOutcome, KtfFindings, PatentDocument, PseMatrix, TechnicalFeature};
use scrivener_extractor::text::segment;

/// Share of each minimum met
const COMPONENT_SCORE: f64 = 0.25;

/// Bonus when features reach twice the minimum
const RICH_BONUS: f64 = 0.1;

/// Checks that features, problems, solutions and effects were extracted and hang together
pub struct KtfCompletenessGate {
    min_features: usize,
    min_items: usize,
    min_coherence: f64,
}

impl KtfCompletenessGate {
    /// Create the gate from shared thresholds
    pub fn new(config: &GateConfig) -> Self {
        Self {
            min_features: config.min_ktf_features,
            min_items: config.min_pse_items,
            min_coherence: config.min_coherence,
        }
    }
}

impl Gate for KtfCompletenessGate {
    fn name(&self) -> &'static str {
        "ktf_completeness"
    }

    fn check(&self, document: &PatentDocument) -> Result<GateOutcome, GateError> {
        let Some(pse) = &document.pse_matrix else {
            let findings = KtfFindings {
                missing_elements: vec!["pse_matrix".to_string()],
                ..Default::default()
            };
            return Ok(outcome(
                false,
                0.0,
                GateFindings::KtfCompleteness(findings),
                vec!["PSE matrix is missing".to_string()],
                Vec::new(),
                Vec::new(),
            ));
        };

        let mut warnings = Vec::new();
        let mut recommendations = Vec::new();
        let mut findings = KtfFindings {
            ktf_features_count: pse.kt_features.len(),
            problems_count: pse.problems.len(),
            solutions_count: pse.solutions.len(),
            effects_count: pse.effects.len(),
            ..Default::default()
        };

        for (i, feature) in pse.kt_features.iter().enumerate() {
            let issues = feature_issues(feature, i + 1);
            if issues.valid {
                findings.valid_features_count += 1;
            }
            warnings.extend(issues.messages);
        }

        let mut passed = true;
        let mut score = 0.0;
        if findings.ktf_features_count < self.min_features {
            passed = false;
            findings.missing_elements.push("ktf_features".to_string());
            recommendations.push(format!(
                "Add at least {} more key technical features",
                self.min_features - findings.ktf_features_count
            ));
        } else {
            score += COMPONENT_SCORE;
        }

        let minimums = [
            ("problems", findings.problems_count, "Document at least one technical problem"),
            ("solutions", findings.solutions_count, "Document at least one technical solution"),
            ("effects", findings.effects_count, "Document at least one technical effect"),
        ];
        for (element, count, advice) in minimums {
            if count < self.min_items {
                passed = false;
                findings.missing_elements.push(element.to_string());
                recommendations.push(advice.to_string());
            } else {
                score += COMPONENT_SCORE;
            }
        }

        if findings.ktf_features_count >= self.min_features * 2 {
            score = (score + RICH_BONUS).min(1.0);
            recommendations.push("Good: Rich set of technical features documented".to_string());
        }

        findings.coherence = pse_coherence(pse);
        if findings.coherence < self.min_coherence {
            passed = false;
            warnings.push("Low coherence between problems, solutions, and effects".to_string());
        }

        Ok(outcome(
            passed,
            score,
            GateFindings::KtfCompleteness(findings),
            Vec::new(),
            warnings,
            recommendations,
        ))
    }
}

struct FeatureIssues {
    valid: bool,
    messages: Vec<String>,
}

fn feature_issues(feature: &TechnicalFeature, position: usize) -> FeatureIssues {
    let mut valid = true;
    let mut messages = Vec::new();
    if feature.name.trim().chars().count() < 2 {
        valid = false;
        messages.push(format!("KTF feature {}: Name is too short or missing", position));
    }
    if feature.description.trim().chars().count() < 10 {
        valid = false;
        messages.push(format!("KTF feature {}: Description is too short", position));
    }
    if feature.category.trim().is_empty() {
        messages.push(format!("KTF feature {}: Category is not specified", position));
    }
    FeatureIssues { valid, messages }
}

/// Mean of problem→solution and solution→effect token containment
///
/// Zero without problems or solutions.
pub fn pse_coherence(pse: &PseMatrix) -> f64 {
    if pse.problems.is_empty() || pse.solutions.is_empty() {
        return 0.0;
    }
    let problems = segment(&pse.problems.join(" "));
    let solutions = segment(&pse.solutions.join(" "));
    let effects = segment(&pse.effects.join(" "));

    let contained = |from: &std::collections::HashSet<String>, into: &std::collections::HashSet<String>| {
        if from.is_empty() {
            0.0
        } else {
            from.intersection(into).count() as f64 / from.len() as f64
        }
    };
    let solution_overlap = contained(&problems, &solutions);
    let effect_overlap = if effects.is_empty() {
        0.0
    } else {
        contained(&solutions, &effects)
    };
    (solution_overlap + effect_overlap) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::Metadata;

    fn feature(name: &str) -> TechnicalFeature {
        TechnicalFeature::new(name, format!("技术特征：{}用于存储和转发数据", name), "technical_feature", true)
    }

    fn document(features: usize) -> PatentDocument {
        let mut document = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
        document.pse_matrix = Some(PseMatrix {
            problems: vec!["缓存命中率低".to_string()],
            solutions: vec!["提升缓存命中率".to_string()],
            effects: vec!["缓存命中率提升".to_string()],
            kt_features: (0..features).map(|i| feature(&format!("模块{}", i))).collect(),
            ..Default::default()
        });
        document
    }

    fn findings(outcome: &GateOutcome) -> &KtfFindings {
        match &outcome.details.findings {
            GateFindings::KtfCompleteness(f) => f,
            other => panic!("unexpected findings {:?}", other),
        }
    }

    #[test]
    fn test_complete_matrix_passes() {
        let gate = KtfCompletenessGate::new(&GateConfig::default());
        let outcome = gate.check(&document(3)).unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.score, 1.0);
        assert_eq!(findings(&outcome).valid_features_count, 3);
        assert!(findings(&outcome).coherence >= 0.5);
    }

    #[test]
    fn test_too_few_features() {
        let gate = KtfCompletenessGate::new(&GateConfig::default());
        let outcome = gate.check(&document(2)).unwrap();
        assert!(!outcome.passed);
        assert!((outcome.score - 0.75).abs() < 1e-9);
        assert_eq!(findings(&outcome).missing_elements, vec!["ktf_features"]);
    }

    #[test]
    fn test_rich_bonus_is_capped() {
        let gate = KtfCompletenessGate::new(&GateConfig::default());
        let outcome = gate.check(&document(6)).unwrap();
        assert_eq!(outcome.score, 1.0);
    }

    #[test]
    fn test_missing_matrix() {
        let gate = KtfCompletenessGate::new(&GateConfig::default());
        let document = PatentDocument::new(Metadata::new("标题", "领域"));
        let outcome = gate.check(&document).unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.details.errors, vec!["PSE matrix is missing"]);
        assert_eq!(findings(&outcome).missing_elements, vec!["pse_matrix"]);
    }

    #[test]
    fn test_incoherent_matrix_fails() {
        let gate = KtfCompletenessGate::new(&GateConfig::default());
        let mut document = document(3);
        if let Some(pse) = document.pse_matrix.as_mut() {
            pse.solutions = vec!["引入冗余电源".to_string()];
        }
        let outcome = gate.check(&document).unwrap();
        assert!(!outcome.passed);
        assert!(outcome
            .details
            .warnings
            .contains(&"Low coherence between problems, solutions, and effects".to_string()));
    }

    #[test]
    fn test_short_feature_fields_warn() {
        let messages = feature_issues(&TechnicalFeature::new("甲", "短", "", true), 4).messages;
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("KTF feature 4"));
    }
}
