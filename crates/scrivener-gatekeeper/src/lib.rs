//! Scrivener Gatekeeper
//!
//! Independent quality gates over a generated patent package, and the
//! weighted policy that turns their scores into a verdict.
//!
//! # Overview
//!
//! Each [`Gate`] reads a [`PatentDocument`](scrivener_domain::PatentDocument)
//! and returns a [`GateOutcome`](scrivener_domain::GateOutcome) with a score
//! in `[0, 1]` and gate-specific findings. Gates are pure and isolated: an
//! internal error becomes a failed outcome for that gate only.
//!
//! | Gate | Judges |
//! |---|---|
//! | `ktf_completeness` | extracted features and problem/solution/effect coherence |
//! | `supportability` | claim vocabulary present in the specification |
//! | `term_consistency` | terms used across sections |
//! | `banned_words` | severity-tiered banned vocabulary |
//! | `abstract_validation` | abstract elements and length |
//! | `background_leakage` | background restated in inventive sections |
//! | `claim_quality` | claim tree structure, grounding, redundancy, wording |
//!
//! # Example Usage
//!
//! ```no_run
//! use scrivener_gatekeeper::{GateConfig, Gatekeeper};
//! # fn run(document: &scrivener_domain::PatentDocument) -> Result<(), scrivener_gatekeeper::GateError> {
//! let gatekeeper = Gatekeeper::new(&GateConfig::default())?;
//! let results = gatekeeper.check_all(document);
//! let score = gatekeeper.aggregate(&results);
//! println!("quality {:.2}, passed {}", score, gatekeeper.passes(&results));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod gate;
mod gatekeeper;
pub mod gates;
pub mod similarity;


pub use config::{GateConfig, QualityPolicy};
pub use error::GateError;
pub use gate::{run_gate, Gate};
pub use gatekeeper::{check_statistics, Gatekeeper};
