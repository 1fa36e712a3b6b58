//! Configuration for the Extractor

use scrivener_domain::feature::{MAX_FEATURES, MAX_PSE_ITEMS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Skip the model path entirely
    #[serde(default)]
    pub force_rules: bool,

    /// Maximum time for the structured model call (seconds)
    pub llm_timeout_secs: u64,

    /// Retries after the first structured attempt
    pub structured_retries: u32,

    /// Cap on problems, solutions and effects
    pub max_items: usize,

    /// Cap on key technical features
    pub max_features: usize,

    /// Character Jaccard similarity above which a candidate is a duplicate
    pub dedupe_threshold: f64,
}

impl ExtractorConfig {
    /// Get the model timeout as a Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.llm_timeout_secs == 0 {
            return Err("llm_timeout_secs must be greater than 0".to_string());
        }
        if self.max_items == 0 || self.max_items > MAX_PSE_ITEMS {
            return Err(format!("max_items must be within 1..={}", MAX_PSE_ITEMS));
        }
        if self.max_features == 0 || self.max_features > MAX_FEATURES {
            return Err(format!("max_features must be within 1..={}", MAX_FEATURES));
        }
        if !(0.0..=1.0).contains(&self.dedupe_threshold) {
            return Err("dedupe_threshold must be within [0, 1]".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            force_rules: false,
            llm_timeout_secs: 120,
            structured_retries: 2,
            max_items: MAX_PSE_ITEMS,
            max_features: MAX_FEATURES,
            dedupe_threshold: 0.7,
        }
    }
}

impl ExtractorConfig {
    /// Rules only, never calls the model
    pub fn rules_only() -> Self {
        Self {
            force_rules: true,
            ..Self::default()
        }
    }

    /// Aggressive preset: short timeout, single attempt
    pub fn aggressive() -> Self {
        Self {
            llm_timeout_secs: 30,
            structured_retries: 0,
            ..Self::default()
        }
    }

    /// Lenient preset: long timeout, more retries
    pub fn lenient() -> Self {
        Self {
            llm_timeout_secs: 300,
            structured_retries: 3,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
        assert!(ExtractorConfig::aggressive().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
        assert!(ExtractorConfig::rules_only().force_rules);
    }

    #[test]
    fn test_invalid_caps() {
        let mut config = ExtractorConfig::default();
        config.max_items = MAX_PSE_ITEMS + 1;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.max_features = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = ExtractorConfig::default();
        config.llm_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let parsed = ExtractorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.llm_timeout_secs, 300);
        assert_eq!(parsed.structured_retries, 3);
        assert!(!parsed.force_rules);
    }
}
