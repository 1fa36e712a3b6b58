//! Configuration for the Generator

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on model-generated dependent claims
pub const MAX_DEPENDENT_CLAIMS: usize = 8;

/// Configuration for the Generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Skip the model path for claims and abstract
    #[serde(default)]
    pub force_rules: bool,

    /// Maximum time for each structured model call (seconds)
    pub llm_timeout_secs: u64,

    /// Retries after the first claims attempt
    pub claims_retries: u32,

    /// Retries after the first abstract attempt
    pub abstract_retries: u32,

    /// Dependent claims kept from the model output
    pub max_dependent_claims: usize,
}

impl GeneratorConfig {
    /// Get the model timeout as a Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.llm_timeout_secs == 0 {
            return Err("llm_timeout_secs must be greater than 0".to_string());
        }
        if self.max_dependent_claims > MAX_DEPENDENT_CLAIMS {
            return Err(format!(
                "max_dependent_claims must be at most {}",
                MAX_DEPENDENT_CLAIMS
            ));
        }
        Ok(())
    }

    /// Templates and rules only, never calls the model
    pub fn rules_only() -> Self {
        Self {
            force_rules: true,
            ..Self::default()
        }
    }

    /// Aggressive preset: short timeout, single attempts
    pub fn aggressive() -> Self {
        Self {
            llm_timeout_secs: 30,
            claims_retries: 0,
            abstract_retries: 0,
            ..Self::default()
        }
    }

    /// Lenient preset: long timeout, more retries
    pub fn lenient() -> Self {
        Self {
            llm_timeout_secs: 300,
            claims_retries: 3,
            abstract_retries: 2,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            force_rules: false,
            llm_timeout_secs: 120,
            claims_retries: 2,
            abstract_retries: 1,
            max_dependent_claims: MAX_DEPENDENT_CLAIMS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for config in [
            GeneratorConfig::default(),
            GeneratorConfig::rules_only(),
            GeneratorConfig::aggressive(),
            GeneratorConfig::lenient(),
        ] {
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_dependent_cap() {
        let config = GeneratorConfig {
            max_dependent_claims: 9,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let toml = GeneratorConfig::aggressive().to_toml().unwrap();
        let parsed = GeneratorConfig::from_toml(&toml).unwrap();
        assert_eq!(parsed.llm_timeout_secs, 30);
        assert_eq!(parsed.claims_retries, 0);
        assert_eq!(parsed.max_dependent_claims, 8);
    }
}
