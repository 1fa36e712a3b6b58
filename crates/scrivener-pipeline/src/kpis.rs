//! KPI collection for processed documents

use scrivener_domain::{ClaimQualitySummary, GateFindings, GateOutcome, Kpis, PatentDocument};
use std::collections::BTreeMap;

/// KPIs of a document given the gate outcomes gathered so far
///
/// Structural counts come from the document. Term consistency and the
/// feature/redundancy ratios come from the `term_consistency` and
/// `claim_quality` outcomes and are zero when those are absent.
pub fn compute_kpis(document: &PatentDocument, results: &BTreeMap<String, GateOutcome>) -> Kpis {
    let claim_texts = document.all_claim_texts();
    let claims_count = claim_texts.len();
    let (independent_claims_count, dependent_claims_count) = document
        .claims
        .as_ref()
        .map(|c| (c.independent().count(), c.dependent().count()))
        .unwrap_or((0, 0));

    let avg_claim_length = if claims_count > 0 {
        claim_texts.iter().map(|t| t.chars().count()).sum::<usize>() as f64 / claims_count as f64
    } else {
        0.0
    };

    let term_consistency_score = results.get("term_consistency").map(|o| o.score).unwrap_or(0.0);

    let summary = claim_quality_summary(results).cloned().unwrap_or_default();

    Kpis {
        claims_count,
        independent_claims_count,
        avg_claim_length,
        term_consistency_score,
        independent_claim_feature_count: summary.independent_feature_count,
        avg_features_per_claim: ratio(summary.total_feature_refs, claims_count),
        unsupported_feature_ratio: ratio(summary.unsupported_feature_refs, summary.total_feature_refs),
        redundant_claim_ratio: ratio(summary.redundant_dependent_claims_count, dependent_claims_count),
    }
}

fn claim_quality_summary(results: &BTreeMap<String, GateOutcome>) -> Option<&ClaimQualitySummary> {
    match &results.get("claim_quality")?.details.findings {
        GateFindings::ClaimQuality(findings) => Some(&findings.summary),
        _ => None,
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
