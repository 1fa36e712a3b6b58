//! Gatekeeper error types

use thiserror::Error;

/// Errors raised inside a gate
///
/// [`Gatekeeper`](crate::Gatekeeper) turns each one into a failed
/// [`GateOutcome`](scrivener_domain::GateOutcome) with the message recorded
/// under `details.errors`.
#[derive(Error, Debug)]
pub enum GateError {
    /// A section the gate needs is absent
    #[error("{0} missing")]
    MissingSection(String),

    /// The document has no text to scan
    #[error("No text content found in patent document")]
    EmptyDocument,

    /// A lexicon pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<regex::Error> for GateError {
    fn from(e: regex::Error) -> Self {
        GateError::Pattern(e.to_string())
    }
}
