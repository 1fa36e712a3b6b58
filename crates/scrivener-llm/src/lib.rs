//! Scrivener LLM Provider Layer
//!
//! Pluggable text-generation backends behind the `LlmProvider` trait from
//! `scrivener-domain`, plus the retry/repair wrapper every generation step
//! goes through.
//!
//! # Architecture
//!
//! - [`LlmConfig`]: endpoint configuration, injected by the caller
//! - [`OpenAiCompatibleProvider`]: blocking client for `/chat/completions`
//! - [`MockProvider`]: deterministic provider for tests
//! - [`TextGenerator`]: bounded retries, JSON extraction, one repair pass,
//!   and a typed [`FallbackReason`](scrivener_domain::FallbackReason) on failure
//!
//! # Examples
//!
//! ```
//! use scrivener_llm::MockProvider;
//! use scrivener_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("你好");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "你好");
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod json;
pub mod openai;

use scrivener_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use client::{new_trace_id, Generated, StructuredContract, TextGenerator};
pub use config::LlmConfig;
pub use openai::OpenAiCompatibleProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Key, base URL or model missing, or provider force-disabled
    #[error("Provider not configured")]
    NotConfigured,

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

const ERROR_SENTINEL: &str = "ERROR";

/// Mock LLM provider for deterministic testing
///
/// Responses are resolved in order: queued responses first, then the
/// per-prompt map, then the default. A response of `"ERROR"` yields an
/// error instead.
///
/// # Examples
///
/// ```
/// use scrivener_llm::MockProvider;
/// use scrivener_domain::traits::LlmProvider;
///
/// let mut provider = MockProvider::new("fixed");
/// provider.add_response("prompt1", "response1");
/// provider.queue_response("first");
/// assert_eq!(provider.generate("prompt1").unwrap(), "first");
/// assert_eq!(provider.generate("prompt1").unwrap(), "response1");
/// assert_eq!(provider.generate("other").unwrap(), "fixed");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    queue: Arc<Mutex<VecDeque<String>>>,
    call_count: Arc<Mutex<usize>>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// A provider whose every call fails
    pub fn failing() -> Self {
        Self::new(ERROR_SENTINEL)
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), response.into());
    }

    /// Queue a response consumed by the next call, whatever its prompt
    pub fn queue_response(&self, response: impl Into<String>) {
        lock(&self.queue).push_back(response.into());
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), ERROR_SENTINEL.to_string());
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.last_prompt).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *lock(&self.call_count) += 1;
        *lock(&self.last_prompt) = Some(prompt.to_string());

        let response = match lock(&self.queue).pop_front() {
            Some(queued) => queued,
            None => lock(&self.responses)
                .get(prompt)
                .cloned()
                .unwrap_or_else(|| self.default_response.clone()),
        };

        if response == ERROR_SENTINEL {
            return Err(LlmError::Other("Mock error".to_string()));
        }
        Ok(response)
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt)
    }
}
