//! Edit events recorded in a job's append-only log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accepted edit. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditEvent {
    /// Who made the edit, e.g. `human_edit`
    pub actor: String,

    /// Section name (`claims`, `abstract`, ...)
    pub section: String,

    /// Target within the section, e.g. `claim:1`
    pub target: String,

    /// Value before the edit
    pub old_value: String,

    /// Value after the edit
    pub new_value: String,

    /// When the edit was applied
    pub timestamp: DateTime<Utc>,

    /// Document version produced by the edit
    pub document_version: u64,

    /// SHA-256 of `old_value`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_sha256: Option<String>,

    /// SHA-256 of `new_value`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_sha256: Option<String>,
}
