//! Configuration for the pipeline
//!
//! Aggregates the provider, extractor, generator and gate settings with the
//! results directory.

use scrivener_extractor::ExtractorConfig;
use scrivener_gatekeeper::{GateConfig, QualityPolicy};
use scrivener_generator::GeneratorConfig;
use scrivener_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a pipeline run
///
/// # Examples
///
/// ```
/// use scrivener_pipeline::PipelineConfig;
///
/// // Default configuration (model first, rules fallback)
/// let config = PipelineConfig::default();
/// assert!(config.enable_checks);
///
/// // Deterministic configuration that never calls the provider
/// let config = PipelineConfig::rules_only();
/// assert!(config.extractor.force_rules);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the job directories
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Run the gate suite during processing
    #[serde(default = "default_enable_checks")]
    pub enable_checks: bool,

    /// Text-generation provider, shared by extractor and generator
    #[serde(default)]
    pub llm: LlmConfig,

    /// PSE extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Document generation settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Per-gate thresholds
    #[serde(default)]
    pub gates: GateConfig,

    /// Weights, pass threshold and critical gates
    #[serde(default)]
    pub policy: QualityPolicy,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_enable_checks() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            enable_checks: default_enable_checks(),
            llm: LlmConfig::default(),
            extractor: ExtractorConfig::default(),
            generator: GeneratorConfig::default(),
            gates: GateConfig::default(),
            policy: QualityPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Rules and templates only; the provider is disabled
    pub fn rules_only() -> Self {
        Self {
            llm: LlmConfig::disabled(),
            extractor: ExtractorConfig::rules_only(),
            generator: GeneratorConfig::rules_only(),
            ..Default::default()
        }
    }

    /// Same configuration with another results directory
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.llm.validate().map_err(|e| format!("llm: {}", e))?;
        self.extractor.validate().map_err(|e| format!("extractor: {}", e))?;
        self.generator.validate().map_err(|e| format!("generator: {}", e))?;
        self.gates.validate().map_err(|e| format!("gates: {}", e))?;
        self.policy.validate().map_err(|e| format!("policy: {}", e))?;
        if self.results_dir.as_os_str().is_empty() {
            return Err("results_dir must not be empty".to_string());
        }
        Ok(())
    }

    /// Parse from TOML
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| e.to_string())
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string(self).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.results_dir, PathBuf::from("results"));
        assert!(config.enable_checks);
        assert_eq!(config.policy.pass_threshold, 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rules_only_config() {
        let config = PipelineConfig::rules_only();
        assert!(!config.llm.is_configured());
        assert!(config.extractor.force_rules);
        assert!(config.generator.force_rules);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config.results_dir, PathBuf::from("results"));
        assert_eq!(config.gates, GateConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PipelineConfig::rules_only().with_results_dir("/tmp/jobs");
        let text = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.results_dir, PathBuf::from("/tmp/jobs"));
        assert!(parsed.extractor.force_rules);
        assert_eq!(parsed.policy, config.policy);
    }

    #[test]
    fn test_invalid_policy_is_reported() {
        let mut config = PipelineConfig::default();
        config.policy.pass_threshold = 2.0;
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("policy:"));
    }
}
