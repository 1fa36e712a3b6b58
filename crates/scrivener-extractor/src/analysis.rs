//! Post-extraction analysis over a PSE matrix

use crate::text::segment_jaccard;
use scrivener_domain::PseMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature dependency graph: feature name → names of features that mention it
pub type KtfDag = BTreeMap<String, Vec<String>>;

/// Edge A → B whenever A's name occurs in B's description (A ≠ B)
pub fn build_ktf_dag(matrix: &PseMatrix) -> KtfDag {
    let mut dag = KtfDag::new();
    let features = &matrix.kt_features;
    for (i, from) in features.iter().enumerate() {
        if from.name.is_empty() {
            continue;
        }
        for (j, to) in features.iter().enumerate() {
            if i != j && to.description.contains(&from.name) {
                dag.entry(from.name.clone()).or_default().push(to.name.clone());
            }
        }
    }
    dag
}

/// Overlap between adjacent PSE columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PseCoherence {
    /// Problems vs. solutions; `None` when either side is empty
    pub problem_solution: Option<f64>,
    /// Solutions vs. effects; `None` when either side is empty
    pub solution_effect: Option<f64>,
}

/// Token-set Jaccard similarity between problems↔solutions and solutions↔effects
pub fn analyze_pse_coherence(matrix: &PseMatrix) -> PseCoherence {
    let joined = |items: &[String]| items.join(" ");
    let pair = |a: &[String], b: &[String]| {
        (!a.is_empty() && !b.is_empty()).then(|| segment_jaccard(&joined(a), &joined(b)))
    };
    PseCoherence {
        problem_solution: pair(&matrix.problems, &matrix.solutions),
        solution_effect: pair(&matrix.solutions, &matrix.effects),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::TechnicalFeature;

    #[test]
    fn test_dag_edges_follow_descriptions() {
        let matrix = PseMatrix {
            kt_features: vec![
                TechnicalFeature::new("缓存模块", "技术特征：缓存模块", "technical_feature", true),
                TechnicalFeature::new("淘汰策略", "作用于缓存模块的淘汰策略", "technical_feature", false),
                TechnicalFeature::new("监控单元", "独立部件", "technical_term", false),
            ],
            ..Default::default()
        };
        let dag = build_ktf_dag(&matrix);
        assert_eq!(dag.get("缓存模块"), Some(&vec!["淘汰策略".to_string()]));
        assert!(!dag.contains_key("监控单元"));
        assert!(!dag.contains_key("淘汰策略"));
    }

    #[test]
    fn test_coherence_requires_both_sides() {
        let matrix = PseMatrix {
            problems: vec!["检索效率低".to_string()],
            solutions: vec!["提高检索效率".to_string()],
            ..Default::default()
        };
        let coherence = analyze_pse_coherence(&matrix);
        let ps = coherence.problem_solution.unwrap();
        assert!(ps > 0.0 && ps <= 1.0);
        assert!(coherence.solution_effect.is_none());
    }
}
