//! Error types for the Generator
//!
//! Like the extractor's errors these stay internal: each one is logged and
//! mapped to a fallback reason on the step audit.

use scrivener_domain::FallbackReason;
use thiserror::Error;

/// Errors on the model generation path
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The capability declined or produced unusable output
    #[error("Model unavailable: {0}")]
    Unavailable(FallbackReason),

    /// Model call exceeded its time budget
    #[error("Generation timeout after {0} seconds")]
    Timeout(u64),

    /// The blocking task panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(String),
}

impl From<FallbackReason> for GeneratorError {
    fn from(reason: FallbackReason) -> Self {
        GeneratorError::Unavailable(reason)
    }
}
