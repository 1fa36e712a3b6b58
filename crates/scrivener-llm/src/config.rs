//! Provider configuration
//!
//! Constructed once per process and injected into the extractor and the
//! generator. Nothing in this crate reads the environment.

use scrivener_domain::ProviderMeta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Configuration of an OpenAI-compatible endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; never logged or persisted in audits
    #[serde(default)]
    pub api_key: String,

    /// Base URL, e.g. `https://api.example.com/v1`
    #[serde(default)]
    pub base_url: String,

    /// Model identifier
    #[serde(default)]
    pub model: String,

    /// Disable the provider regardless of the other fields
    #[serde(default)]
    pub force_disabled: bool,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl LlmConfig {
    /// Configuration for an endpoint
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            force_disabled: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// A configuration that never calls out
    pub fn disabled() -> Self {
        Self {
            force_disabled: true,
            ..Self::new("", "", "")
        }
    }

    /// True iff not disabled and key, URL and model are all non-empty
    pub fn is_configured(&self) -> bool {
        !self.force_disabled
            && !self.api_key.trim().is_empty()
            && !self.base_url.trim().is_empty()
            && !self.model.trim().is_empty()
    }

    /// Host part of the base URL, or `openai-compatible` when it has none
    pub fn provider(&self) -> String {
        let rest = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);
        let host = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('@')
            .next()
            .unwrap_or_default();
        let host = host.split(':').next().unwrap_or_default();
        if host.is_empty() {
            "openai-compatible".to_string()
        } else {
            host.to_string()
        }
    }

    /// Metadata safe to persist
    pub fn public_meta(&self) -> ProviderMeta {
        ProviderMeta {
            configured: self.is_configured(),
            provider: self.provider(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be within [0, 2]".to_string());
        }
        if !self.base_url.is_empty()
            && !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://"))
        {
            return Err("base_url must start with http:// or https://".to_string());
        }
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("force_disabled", &self.force_disabled)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}
