//! Error types for pipeline operations

use scrivener_store::StoreError;
use thiserror::Error;

/// Errors that can occur while running or editing a job
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Draft input rejected before generation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The edit was made against a stale document version
    #[error("Version conflict: expected {expected}, found {actual}")]
    Conflict {
        /// Version the editor saw
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// Unknown target, missing section or empty value
    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
