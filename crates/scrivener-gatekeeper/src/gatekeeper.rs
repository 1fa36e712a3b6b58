//! The gate suite and its weighted verdict

use crate::config::{GateConfig, QualityPolicy};
use crate::error::GateError;
use crate::gate::{run_gate, Gate};
use crate::gates::{
    AbstractValidationGate, BackgroundLeakageGate, BannedWordsGate, ClaimQualityGate, KtfCompletenessGate,
    SupportabilityGate, TermConsistencyGate,
};
use scrivener_domain::{CheckStatistics, GateOutcome, PatentDocument};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Runs every gate over a document and judges the combined result
pub struct Gatekeeper {
    gates: Vec<Box<dyn Gate>>,
    policy: QualityPolicy,
}

impl Gatekeeper {
    /// The standard seven gates under the default policy
    pub fn new(config: &GateConfig) -> Result<Self, GateError> {
        config.validate().map_err(GateError::Config)?;
        let gates: Vec<Box<dyn Gate>> = vec![
            Box::new(KtfCompletenessGate::new(config)),
            Box::new(SupportabilityGate::new(config)),
            Box::new(TermConsistencyGate::new(config)),
            Box::new(BannedWordsGate::new(config)?),
            Box::new(AbstractValidationGate::new(config)),
            Box::new(BackgroundLeakageGate::new(config)),
            Box::new(ClaimQualityGate::new(config)),
        ];
        Ok(Self {
            gates,
            policy: QualityPolicy::default(),
        })
    }

    /// An explicit gate list; names must be unique
    pub fn with_gates(gates: Vec<Box<dyn Gate>>) -> Self {
        Self {
            gates,
            policy: QualityPolicy::default(),
        }
    }

    /// Replace the scoring policy
    pub fn with_policy(mut self, policy: QualityPolicy) -> Result<Self, GateError> {
        policy.validate().map_err(GateError::Config)?;
        self.policy = policy;
        Ok(self)
    }

    /// The active policy
    pub fn policy(&self) -> &QualityPolicy {
        &self.policy
    }

    /// Gate names in run order
    pub fn names(&self) -> Vec<&'static str> {
        self.gates.iter().map(|g| g.name()).collect()
    }

    /// Run every gate; a failing gate never affects the others
    pub fn check_all(&self, document: &PatentDocument) -> BTreeMap<String, GateOutcome> {
        let mut results = BTreeMap::new();
        for gate in &self.gates {
            debug!(gate = gate.name(), "Running gate");
            let outcome = run_gate(gate.as_ref(), document);
            info!(
                gate = gate.name(),
                passed = outcome.passed,
                score = format!("{:.2}", outcome.score),
                "Gate completed"
            );
            results.insert(gate.name().to_string(), outcome);
        }
        results
    }

    /// Weighted mean of gate scores normalized by total weight, 0.0 when empty
    pub fn aggregate(&self, results: &BTreeMap<String, GateOutcome>) -> f64 {
        let (weighted, total) = results.iter().fold((0.0, 0.0), |(sum, total), (name, outcome)| {
            let weight = self.policy.weight(name);
            (sum + outcome.score * weight, total + weight)
        });
        if total > 0.0 {
            weighted / total
        } else {
            0.0
        }
    }

    /// Critical gates passed at or above the threshold and the aggregate meets it
    ///
    /// Critical gates absent from `results` are not required.
    pub fn passes(&self, results: &BTreeMap<String, GateOutcome>) -> bool {
        if results.is_empty() {
            return false;
        }
        let threshold = self.policy.pass_threshold;
        let critical_ok = self.policy.critical_gates.iter().all(|name| {
            results
                .get(name)
                .map(|o| o.passed && o.score >= threshold)
                .unwrap_or(true)
        });
        critical_ok && self.aggregate(results) >= threshold
    }

    /// Health of each gate by name
    pub fn checker_status(&self) -> BTreeMap<String, bool> {
        self.gates
            .iter()
            .map(|g| (g.name().to_string(), g.health_check()))
            .collect()
    }
}

/// Pass/fail counts, mean score and decile buckets such as `"70-80"`
pub fn check_statistics(results: &BTreeMap<String, GateOutcome>) -> CheckStatistics {
    let mut stats = CheckStatistics {
        total_checks: results.len(),
        ..Default::default()
    };
    let mut total = 0.0;
    for outcome in results.values() {
        if outcome.passed {
            stats.passed_checks += 1;
        } else {
            stats.failed_checks += 1;
        }
        total += outcome.score;
        let decile = (outcome.score * 10.0).floor() as u32;
        *stats
            .score_distribution
            .entry(format!("{}-{}", decile * 10, (decile + 1) * 10))
            .or_default() += 1;
    }
    if !results.is_empty() {
        stats.average_score = total / results.len() as f64;
    }
    stats
}
