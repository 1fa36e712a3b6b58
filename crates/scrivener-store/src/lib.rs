//! Scrivener Storage Layer
//!
//! Implements the DocumentStore trait with one directory of JSON files per job.
//!
//! # Architecture
//!
//! ```text
//! <root>/<job_id>/
//!   patent_metadata.json   latest document snapshot
//!   quality_report.json    latest quality report
//!   edit_events.jsonl      append-only edit log, one event per line
//! ```
//!
//! Snapshots are written to a temp file in the job directory and renamed
//! over the previous snapshot, so readers never observe a partial write.
//! Each save bumps `document_version` by exactly one.
//!
//! # Examples
//!
//! ```no_run
//! use scrivener_store::JsonStore;
//!
//! let store = JsonStore::new("results").unwrap();
//! let job_id = store.create_job(None).unwrap();
//! // Store is now ready for document operations
//! ```

#![warn(missing_docs)]

use chrono::Utc;
use scrivener_domain::traits::DocumentStore;
use scrivener_domain::{EditEvent, PatentDocument, QualityReport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Snapshot file name
pub const SNAPSHOT_FILE: &str = "patent_metadata.json";

/// Quality report file name
pub const REPORT_FILE: &str = "quality_report.json";

/// Edit log file name
pub const EDIT_LOG_FILE: &str = "edit_events.jsonl";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Job directory or file not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored version differs from the expected one
    #[error("Version conflict: expected {expected}, found {actual}")]
    Conflict {
        /// Version the caller edited
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// Job id unusable as a directory name
    #[error("Invalid job id: {0}")]
    InvalidJobId(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-actor edit counts and the most recent event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditSummary {
    /// Well-formed events in the log
    pub total_events: usize,

    /// Events per actor; events without an actor are not counted here
    pub counts_by_actor: BTreeMap<String, usize>,

    /// Last well-formed event
    pub last_event: Option<EditEvent>,
}

/// Hex-encoded SHA-256 of a text
pub fn sha256_hex(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// JSON-file implementation of DocumentStore
///
/// # Concurrency
///
/// One writer per job. The store holds no locks; the edit service enforces
/// optimistic versioning on top of it.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a job
    pub fn job_dir(&self, job_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !job_id.is_empty()
            && job_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidJobId(job_id.to_string()));
        }
        Ok(self.root.join(job_id))
    }

    /// Whether the job directory exists
    pub fn job_exists(&self, job_id: &str) -> bool {
        self.job_dir(job_id).map(|d| d.is_dir()).unwrap_or(false)
    }

    /// Create a job directory; a fresh UUID is used when no id is given
    pub fn create_job(&self, job_id: Option<&str>) -> Result<String, StoreError> {
        let job_id = match job_id {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let dir = self.job_dir(&job_id)?;
        fs::create_dir_all(&dir)?;
        info!(job_id = %job_id, "Created job directory");
        Ok(job_id)
    }

    fn existing_job_dir(&self, job_id: &str) -> Result<PathBuf, StoreError> {
        let dir = self.job_dir(job_id)?;
        if !dir.is_dir() {
            return Err(StoreError::NotFound(format!("job {}", job_id)));
        }
        Ok(dir)
    }

    fn read_json<T: DeserializeOwned>(&self, job_id: &str, file: &str) -> Result<T, StoreError> {
        let path = self.existing_job_dir(job_id)?.join(file);
        if !path.is_file() {
            return Err(StoreError::NotFound(format!("{} for job {}", file, job_id)));
        }
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write `value` as pretty JSON via temp file + rename
    fn write_json<T: Serialize>(&self, dir: &Path, file: &str, value: &T) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, value)?;
        tmp.flush()?;
        tmp.persist(dir.join(file)).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    /// Version of the stored snapshot
    pub fn current_version(&self, job_id: &str) -> Result<u64, StoreError> {
        Ok(self.load(job_id)?.document_version)
    }

    /// Load the snapshot, failing with `Conflict` unless its version equals `expected`
    pub fn load_at_version(&self, job_id: &str, expected: u64) -> Result<PatentDocument, StoreError> {
        let document = self.load(job_id)?;
        if document.document_version != expected {
            return Err(StoreError::Conflict {
                expected,
                actual: document.document_version,
            });
        }
        Ok(document)
    }

    /// Latest quality report of a job
    pub fn load_quality_report(&self, job_id: &str) -> Result<QualityReport, StoreError> {
        self.read_json(job_id, REPORT_FILE)
    }

    /// Well-formed events of the edit log in append order
    ///
    /// Blank and malformed lines are skipped.
    pub fn edit_events(&self, job_id: &str) -> Result<Vec<EditEvent>, StoreError> {
        let path = self.job_dir(job_id)?.join(EDIT_LOG_FILE);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(fs::File::open(&path)?);
        let mut events = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EditEvent>(&line) {
                Ok(event) => events.push(event),
                Err(e) => warn!(job_id = %job_id, line = n + 1, error = %e, "Skipping malformed edit event"),
            }
        }
        Ok(events)
    }

    /// Per-actor counts and the last event of the edit log
    pub fn edit_summary(&self, job_id: &str) -> Result<EditSummary, StoreError> {
        let events = self.edit_events(job_id)?;
        let mut summary = EditSummary {
            total_events: events.len(),
            ..Default::default()
        };
        for event in &events {
            if !event.actor.is_empty() {
                *summary.counts_by_actor.entry(event.actor.clone()).or_default() += 1;
            }
        }
        summary.last_event = events.into_iter().last();
        Ok(summary)
    }
}

impl DocumentStore for JsonStore {
    type Error = StoreError;

    fn load(&self, job_id: &str) -> Result<PatentDocument, Self::Error> {
        self.read_json(job_id, SNAPSHOT_FILE)
    }

    fn save(&self, job_id: &str, document: &mut PatentDocument) -> Result<(), Self::Error> {
        let dir = self.existing_job_dir(job_id)?;
        let previous = (document.document_version, document.metadata.updated_at);
        document.document_version += 1;
        document.metadata.updated_at = Utc::now();

        if let Err(e) = self.write_json(&dir, SNAPSHOT_FILE, document) {
            (document.document_version, document.metadata.updated_at) = previous;
            return Err(e);
        }
        info!(job_id = %job_id, version = document.document_version, "Saved document snapshot");
        Ok(())
    }

    fn append_edit_event(&self, job_id: &str, event: &EditEvent) -> Result<(), Self::Error> {
        let dir = self.existing_job_dir(job_id)?;
        let line = serde_json::to_string(event)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(EDIT_LOG_FILE))?;
        writeln!(file, "{}", line)?;
        debug!(job_id = %job_id, target = %event.target, "Appended edit event");
        Ok(())
    }

    fn save_quality_report(&self, job_id: &str, report: &QualityReport) -> Result<(), Self::Error> {
        let dir = self.existing_job_dir(job_id)?;
        self.write_json(&dir, REPORT_FILE, report)?;
        debug!(job_id = %job_id, "Saved quality report");
        Ok(())
    }
}
