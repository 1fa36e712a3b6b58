//! OpenAI-compatible Provider Implementation
//!
//! Talks to any endpoint exposing the `/chat/completions` API.
//!
//! # Features
//!
//! - Blocking HTTP client (callers run it under `spawn_blocking` with a timeout)
//! - Configurable endpoint, model and temperature via [`LlmConfig`]
//! - Retry with exponential backoff for transport errors and 5xx responses
//! - JSON mode (`response_format = json_object`) for structured calls
//!
//! # Examples
//!
//! ```no_run
//! use scrivener_llm::{LlmConfig, OpenAiCompatibleProvider};
//! use scrivener_domain::traits::LlmProvider;
//!
//! let config = LlmConfig::new("sk-...", "https://api.example.com/v1", "model-name");
//! let provider = OpenAiCompatibleProvider::new(&config).unwrap();
//! let text = provider.generate("Say hello").unwrap();
//! ```

use crate::{LlmConfig, LlmError};
use scrivener_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const SYSTEM_TEXT: &str = "You are a careful assistant. Return only the requested content.";

const SYSTEM_JSON: &str = "You are a careful assistant.\n\
Return ONLY valid JSON (no markdown, no code fences, no commentary).\n\
The JSON must conform to the provided JSON Schema.";

/// Provider for OpenAI-compatible chat completion endpoints
pub struct OpenAiCompatibleProvider {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::blocking::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] if the configuration is incomplete
    /// and [`LlmError::Communication`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        if !config.is_configured() {
            return Err(LlmError::NotConfigured);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts per request
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    fn chat(&self, system: &str, prompt: &str, json_mode: bool) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.temperature,
            response_format: json_mode.then_some(ResponseFormat { kind: "json_object" }),
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body: ChatResponse = response.json().map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        let content = body
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.message.content)
                            .unwrap_or_default();
                        debug!("Chat completion returned {} chars", content.len());
                        return Ok(content);
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else if status.is_client_error() {
                        let text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(LlmError::Communication(format!("HTTP {}: {}", status, text)));
                    } else {
                        let text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!("HTTP {}: {}", status, text)));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Chat request failed, retrying in {:?}", delay);
                std::thread::sleep(delay);
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl LlmProviderTrait for OpenAiCompatibleProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.chat(SYSTEM_TEXT, prompt, false)
    }

    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        let prompt = format!("{}\n\nJSON Schema:\n{}", prompt, schema);
        self.chat(SYSTEM_JSON, &prompt, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LlmConfig {
        LlmConfig::new("k", "http://localhost:8000/v1/", "test-model")
    }

    #[test]
    fn test_provider_creation() {
        let provider = OpenAiCompatibleProvider::new(&config()).unwrap();
        assert_eq!(provider.endpoint, "http://localhost:8000/v1/chat/completions");
        assert_eq!(provider.model, "test-model");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_unconfigured_is_rejected() {
        let result = OpenAiCompatibleProvider::new(&LlmConfig::disabled());
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }

    #[test]
    fn test_with_max_retries() {
        let provider = OpenAiCompatibleProvider::new(&config()).unwrap().with_max_retries(0);
        assert_eq!(provider.max_retries, 1);
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage { role: "user", content: "hi" }],
            temperature: 0.2,
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_error_handling() {
        // Nothing listens on port 9; a single attempt keeps the test fast
        let mut config = config();
        config.base_url = "http://127.0.0.1:9/v1".to_string();
        config.timeout_secs = 2;
        let provider = OpenAiCompatibleProvider::new(&config).unwrap().with_max_retries(1);

        match provider.generate("test") {
            Err(LlmError::Communication(_)) => {}
            other => panic!("Expected Communication error, got {:?}", other.map(|_| ())),
        }
    }
}
