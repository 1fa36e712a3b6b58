//! Error types for the Extractor
//!
//! These never leave [`PseExtractor::extract`](crate::PseExtractor::extract);
//! each one is logged and mapped to a fallback reason.

use scrivener_domain::FallbackReason;
use thiserror::Error;

/// Errors on the model extraction path
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The capability declined or produced unusable output
    #[error("Model unavailable: {0}")]
    Unavailable(FallbackReason),

    /// Model call exceeded its time budget
    #[error("Extraction timeout after {0} seconds")]
    Timeout(u64),

    /// The blocking task panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(String),

    /// Structured output parsed but held nothing usable
    #[error("Invalid extraction format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<FallbackReason> for ExtractorError {
    fn from(reason: FallbackReason) -> Self {
        ExtractorError::Unavailable(reason)
    }
}
