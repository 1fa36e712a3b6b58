//! Scrivener Generator
//!
//! Produces the four-part patent package (specification, claims, abstract,
//! disclosure) from draft fields and an optional PSE matrix.
//!
//! # Overview
//!
//! Specification and disclosure are assembled from fixed templates. Claims
//! and abstract follow a term-grounding protocol: the model is told to list
//! every technical term, verify it against the invention content and the
//! key-feature index, and only then emit JSON. Any failure falls back to
//! deterministic assembly, and each step records where its text came from.
//!
//! # Architecture
//!
//! ```text
//! GenerationRequest + PseMatrix
//!   ├→ templates ──────────────────────────→ Specification, Disclosure
//!   ├→ claims:   model (grounded) | rules ─→ Claims   + StepAudit
//!   └→ abstract: model (grounded) | rules ─→ Abstract + StepAudit
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use scrivener_generator::{GenerationRequest, GeneratorConfig, PatentGenerator};
//! use scrivener_llm::{LlmConfig, MockProvider, TextGenerator};
//!
//! # async fn example() {
//! let generator = PatentGenerator::new(
//!     TextGenerator::new(MockProvider::default(), LlmConfig::disabled()),
//!     GeneratorConfig::default(),
//! );
//! let request = GenerationRequest {
//!     title: "一种缓存装置".to_string(),
//!     technical_field: "数据存储".to_string(),
//!     ..Default::default()
//! };
//! let (document, audit) = generator.generate(&request, None).await;
//! println!("{}", document.to_markdown());
//! # let _ = audit;
//! # }
//! ```

#![warn(missing_docs)]

pub mod claims;
mod config;
mod contract;
mod error;
mod generator;
mod prompt;
mod request;
pub mod summary;
pub mod templates;


pub use claims::ClaimsDraft;
pub use config::{GeneratorConfig, MAX_DEPENDENT_CLAIMS};
pub use contract::{
    safe_int, strip_dependent_prefix, AbstractContract, ClaimsContract, DependentContract, IndependentContract,
    TermContract,
};
pub use error::GeneratorError;
pub use generator::PatentGenerator;
pub use prompt::{abstract_prompt, claims_prompt, ABSTRACT_SCHEMA, CLAIMS_SCHEMA};
pub use request::GenerationRequest;
