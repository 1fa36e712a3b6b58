//! Scrivener Extractor
//!
//! Turns a free-text invention disclosure into a problem/solution/effect
//! (PSE) matrix with key technical features.
//!
//! # Overview
//!
//! Extraction is hybrid: a structured model call is tried first and, on any
//! failure, a deterministic rule extractor takes over. The returned matrix
//! always carries an audit block naming the path that produced it.
//!
//! # Architecture
//!
//! ```text
//! Text → normalize → model (timeout, retries) ─┐
//!                  └→ rules (fallback) ────────┴→ PseMatrix + audit
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use scrivener_extractor::{ExtractorConfig, PseExtractor};
//! use scrivener_llm::{LlmConfig, MockProvider, TextGenerator};
//!
//! # async fn example() {
//! let generator = TextGenerator::new(MockProvider::default(), LlmConfig::disabled());
//! let extractor = PseExtractor::new(generator, ExtractorConfig::default());
//!
//! let matrix = extractor.extract("现有系统存在检索效率低下的问题。").await;
//! println!("{} problems via {}", matrix.problems.len(), matrix.audit.extraction_source.as_str());
//! # }
//! ```

#![warn(missing_docs)]

mod analysis;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
pub mod rules;
pub mod text;


pub use analysis::{analyze_pse_coherence, build_ktf_dag, KtfDag, PseCoherence};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::PseExtractor;
pub use parser::{DraftFeature, PseDraft};
pub use rules::RuleExtractor;
