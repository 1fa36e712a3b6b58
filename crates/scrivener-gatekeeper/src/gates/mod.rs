//! The seven standard gates

mod abstract_gate;
mod banned;
mod claim_quality;
mod ktf;
mod leakage;
mod support;
mod terms;

pub use abstract_gate::AbstractValidationGate;
pub use banned::{all_text, BannedCategory, BannedWordsGate, ViolationStatistics};
pub use claim_quality::ClaimQualityGate;
pub use ktf::{pse_coherence, KtfCompletenessGate};
pub use leakage::BackgroundLeakageGate;
pub use support::SupportabilityGate;
pub use terms::{extract_terms, TermConsistencyGate};
