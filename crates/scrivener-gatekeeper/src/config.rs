//! Gatekeeper configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-gate thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Minimum key technical features
    pub min_ktf_features: usize,

    /// Minimum problems, solutions and effects (each)
    pub min_pse_items: usize,

    /// PSE coherence below this fails the KTF gate
    pub min_coherence: f64,

    /// Claim vocabulary share found in the specification
    pub support_threshold: f64,

    /// Share of terms used in two or more sections
    pub term_consistency_threshold: f64,

    /// Abstract summary lower bound (chars); shorter is a warning
    pub abstract_min_length: usize,

    /// Abstract summary upper bound (chars)
    pub abstract_max_length: usize,

    /// Background overlap above this flags leakage
    pub leakage_threshold: f64,

    /// Background overlap above this is high severity
    pub leakage_high_threshold: f64,

    /// Medium-severity banned words tolerated before failing
    pub max_medium_banned_words: usize,

    /// Sequence similarity at which dependents count as redundant
    pub redundancy_threshold: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_ktf_features: 3,
            min_pse_items: 1,
            min_coherence: 0.5,
            support_threshold: 0.6,
            term_consistency_threshold: 0.8,
            abstract_min_length: 50,
            abstract_max_length: 300,
            leakage_threshold: 0.3,
            leakage_high_threshold: 0.5,
            max_medium_banned_words: 5,
            redundancy_threshold: 0.92,
        }
    }
}

impl GateConfig {
    /// Create a permissive configuration (looser thresholds)
    pub fn permissive() -> Self {
        Self {
            min_ktf_features: 1,
            min_coherence: 0.0,
            support_threshold: 0.4,
            term_consistency_threshold: 0.5,
            leakage_threshold: 0.5,
            leakage_high_threshold: 0.7,
            max_medium_banned_words: 10,
            ..Self::default()
        }
    }

    /// Create a strict configuration (tighter thresholds)
    pub fn strict() -> Self {
        Self {
            min_ktf_features: 5,
            support_threshold: 0.75,
            term_consistency_threshold: 0.9,
            leakage_threshold: 0.2,
            max_medium_banned_words: 2,
            redundancy_threshold: 0.85,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let ratios = [
            ("min_coherence", self.min_coherence),
            ("support_threshold", self.support_threshold),
            ("term_consistency_threshold", self.term_consistency_threshold),
            ("leakage_threshold", self.leakage_threshold),
            ("leakage_high_threshold", self.leakage_high_threshold),
            ("redundancy_threshold", self.redundancy_threshold),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1]", name));
            }
        }
        if self.abstract_min_length > self.abstract_max_length {
            return Err("abstract_min_length must not exceed abstract_max_length".to_string());
        }
        if self.leakage_high_threshold < self.leakage_threshold {
            return Err("leakage_high_threshold must not be below leakage_threshold".to_string());
        }
        Ok(())
    }
}

/// Weighted aggregation and the pass policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPolicy {
    /// Weight per gate name
    pub weights: BTreeMap<String, f64>,

    /// Weight of gates missing from `weights`
    pub default_weight: f64,

    /// Minimum aggregate score, also the minimum score of each critical gate
    pub pass_threshold: f64,

    /// Gates that must pass individually
    pub critical_gates: Vec<String>,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        let weights = [
            ("ktf_completeness", 0.25),
            ("supportability", 0.20),
            ("term_consistency", 0.15),
            ("banned_words", 0.15),
            ("abstract_validation", 0.15),
            ("background_leakage", 0.05),
            ("claim_quality", 0.05),
        ]
        .into_iter()
        .map(|(name, w)| (name.to_string(), w))
        .collect();
        Self {
            weights,
            default_weight: 0.1,
            pass_threshold: 0.7,
            critical_gates: ["ktf_completeness", "supportability", "banned_words"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl QualityPolicy {
    /// Weight applied to a gate
    pub fn weight(&self, gate: &str) -> f64 {
        self.weights.get(gate).copied().unwrap_or(self.default_weight)
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.pass_threshold) {
            return Err("pass_threshold must be within [0, 1]".to_string());
        }
        if self.default_weight < 0.0 || self.weights.values().any(|w| *w < 0.0) {
            return Err("weights must not be negative".to_string());
        }
        Ok(())
    }
}
