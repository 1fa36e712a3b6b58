//! Bounded-retry text generation with typed fallback reasons
//!
//! [`TextGenerator`] wraps any [`LlmProvider`] and turns its raw string
//! output into either natural text or a validated structured contract.
//! Failures never escape as provider errors: every failure becomes
//! [`FallbackReason::ModelUnavailableOrInvalid`] so callers can switch to
//! their deterministic path and record why.

use crate::json::parse_json_object;
use crate::LlmConfig;
use scrivener_domain::traits::LlmProvider;
use scrivener_domain::{FallbackReason, ProviderMeta};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A structured response shape requested from the model
pub trait StructuredContract: DeserializeOwned {
    /// JSON schema sent alongside the prompt
    fn schema() -> &'static str;

    /// Checks beyond deserialization (lengths, required content)
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Successful generation plus its trace id
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    /// Parsed value
    pub value: T,
    /// Trace id of the call
    pub trace_id: String,
}

/// Fresh trace id (UUIDv4)
pub fn new_trace_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Text-generation capability bound to one provider and configuration
pub struct TextGenerator<L> {
    provider: Arc<L>,
    config: LlmConfig,
}

impl<L> Clone for TextGenerator<L> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
        }
    }
}

impl<L> TextGenerator<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Bind a provider to its configuration
    pub fn new(provider: L, config: LlmConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config,
        }
    }

    /// The bound configuration
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Whether calls will be attempted at all
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Provider metadata for audits
    pub fn meta(&self) -> ProviderMeta {
        self.config.public_meta()
    }

    /// Generate natural text, making up to `retries + 1` attempts
    pub fn generate_text(&self, prompt: &str, retries: u32) -> Result<Generated<String>, FallbackReason> {
        let trace_id = new_trace_id();
        if !self.is_configured() {
            info!(trace_id = %trace_id, "Provider not configured; skipping text generation");
            return Err(FallbackReason::ModelUnavailableOrInvalid);
        }

        for attempt in 1..=retries + 1 {
            match self.provider.generate(prompt) {
                Ok(content) if !content.trim().is_empty() => {
                    return Ok(Generated {
                        value: content.trim().to_string(),
                        trace_id,
                    });
                }
                Ok(_) => warn!(trace_id = %trace_id, "Empty completion (attempt {}/{})", attempt, retries + 1),
                Err(e) => warn!(
                    trace_id = %trace_id,
                    "Text generation failed (attempt {}/{}): {}",
                    attempt,
                    retries + 1,
                    e
                ),
            }
        }
        Err(FallbackReason::ModelUnavailableOrInvalid)
    }

    /// Generate and validate a structured contract
    ///
    /// Makes up to `retries + 1` structured attempts, then one repair pass
    /// over the last raw output through [`generate_text`](Self::generate_text).
    pub fn generate_structured<T: StructuredContract>(
        &self,
        prompt: &str,
        retries: u32,
    ) -> Result<Generated<T>, FallbackReason> {
        let trace_id = new_trace_id();
        if !self.is_configured() {
            info!(trace_id = %trace_id, "Provider not configured; skipping structured generation");
            return Err(FallbackReason::ModelUnavailableOrInvalid);
        }

        let mut last_raw: Option<String> = None;
        for attempt in 1..=retries + 1 {
            match self.provider.generate_structured(prompt, T::schema()) {
                Ok(raw) => {
                    match parse_contract::<T>(&raw) {
                        Ok(value) => {
                            debug!(trace_id = %trace_id, "Structured output accepted on attempt {}", attempt);
                            return Ok(Generated { value, trace_id });
                        }
                        Err(e) => warn!(
                            trace_id = %trace_id,
                            "Structured output invalid (attempt {}/{}): {}",
                            attempt,
                            retries + 1,
                            e
                        ),
                    }
                    last_raw = Some(raw);
                }
                Err(e) => warn!(
                    trace_id = %trace_id,
                    "Structured generation failed (attempt {}/{}): {}",
                    attempt,
                    retries + 1,
                    e
                ),
            }
        }

        let raw = last_raw
            .filter(|r| !r.trim().is_empty())
            .ok_or(FallbackReason::ModelUnavailableOrInvalid)?;
        let repaired = self.generate_text(&repair_prompt(&raw, T::schema()), 1)?;
        match parse_contract::<T>(&repaired.value) {
            Ok(value) => {
                info!(trace_id = %repaired.trace_id, "Structured output accepted after repair");
                Ok(Generated {
                    value,
                    trace_id: repaired.trace_id,
                })
            }
            Err(e) => {
                warn!(trace_id = %repaired.trace_id, "Repaired output still invalid: {}", e);
                Err(FallbackReason::ModelUnavailableOrInvalid)
            }
        }
    }
}

fn parse_contract<T: StructuredContract>(raw: &str) -> Result<T, String> {
    let value = parse_json_object(raw).ok_or_else(|| "no JSON object found".to_string())?;
    let contract: T = serde_json::from_value(value).map_err(|e| e.to_string())?;
    contract.validate()?;
    Ok(contract)
}

fn repair_prompt(bad_output: &str, schema: &str) -> String {
    format!(
        "The following output is supposed to be JSON but is invalid.\n\
         Return ONLY corrected JSON that conforms to the JSON Schema.\n\n\
         JSON Schema:\n{}\n\nBad output:\n{}",
        schema, bad_output
    )
}
