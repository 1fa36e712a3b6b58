//! Claims assembly from model contracts or deterministic rules

use crate::contract::{safe_int, strip_dependent_prefix, ClaimsContract};
use scrivener_domain::{
    Claim, Claims, DependentClaim, IndependentClaim, KtfIndex, PseMatrix, TechnicalFeature, TermInfo,
    DEFAULT_TRANSITION,
};
use scrivener_extractor::rules::marker_phrases;
use std::collections::{BTreeMap, BTreeSet};

/// Markers mined from the invention content for rule-based claims
const CLAIM_MARKERS: &[&str] = &["包括", "所述", "其特征在于", "采用", "通过"];

/// Maximum key phrases mined from the invention content
pub const MAX_KEY_PHRASES: usize = 10;

/// Essential features recited by a rule-based independent claim
pub const MAX_BODY_FEATURES: usize = 3;

/// Dependent claims produced by the rules
pub const MAX_RULE_DEPENDENTS: usize = 5;

/// Claims plus the grounding data recorded in the audit
#[derive(Debug, Clone, Default)]
pub struct ClaimsDraft {
    /// Structured claims with rendered content
    pub claims: Claims,
    /// Term grounding map (model path only)
    pub term_map: BTreeMap<String, TermInfo>,
    /// Feature references keyed by claim number
    pub feature_refs_by_claim: BTreeMap<String, Vec<String>>,
}

/// Convert a validated model contract into claims
///
/// Numbers that are missing, taken, or not above the independent claim are
/// reassigned past the highest number so far. Parents that do not name an
/// existing lower claim are reset to the independent claim.
pub fn from_contract(
    contract: ClaimsContract,
    pse: Option<&PseMatrix>,
    max_dependent: usize,
) -> ClaimsDraft {
    let index = pse.map(PseMatrix::ktf_index).unwrap_or_default();
    let resolve = |refs: &[String]| resolve_features(refs, &index, pse);

    let mut feature_refs_by_claim = BTreeMap::new();
    let indep_number = safe_int(&contract.independent_claim.number, 1).max(1);
    let indep_refs: Vec<String> = contract
        .independent_claim
        .feature_refs
        .iter()
        .map(|r| r.trim().to_string())
        .collect();
    let mut items = vec![Claim::Independent(IndependentClaim {
        number: indep_number,
        preamble: contract.independent_claim.text.trim().to_string(),
        transition: String::new(),
        body: String::new(),
        features: resolve(&indep_refs),
    })];
    feature_refs_by_claim.insert(indep_number.to_string(), indep_refs);

    let mut used = BTreeSet::from([indep_number]);
    for dep in contract.dependent_claims.into_iter().take(max_dependent) {
        let next = used.last().copied().unwrap_or(indep_number) + 1;
        let mut number = safe_int(&dep.number, next);
        if number <= indep_number || used.contains(&number) {
            number = next;
        }
        let mut parent = safe_int(&dep.depends_on, indep_number);
        if parent >= number || !used.contains(&parent) {
            parent = indep_number;
        }
        used.insert(number);
        let refs: Vec<String> = dep.feature_refs.iter().map(|r| r.trim().to_string()).collect();
        items.push(Claim::Dependent(DependentClaim {
            number,
            parent,
            additional_features: strip_dependent_prefix(&dep.text),
            features: resolve(&refs),
        }));
        feature_refs_by_claim.insert(number.to_string(), refs);
    }

    let term_map = contract
        .term_map
        .into_iter()
        .filter(|(term, _)| !term.trim().is_empty())
        .map(|(term, info)| {
            (
                term,
                TermInfo {
                    definition: info.definition,
                    occurrences: info.occurrences,
                },
            )
        })
        .collect();

    let mut claims = Claims {
        items,
        content: String::new(),
    };
    claims.content = claims.render();
    ClaimsDraft {
        claims,
        term_map,
        feature_refs_by_claim,
    }
}

fn resolve_features(refs: &[String], index: &KtfIndex, pse: Option<&PseMatrix>) -> Vec<TechnicalFeature> {
    let Some(pse) = pse else {
        return Vec::new();
    };
    refs.iter()
        .filter_map(|r| index.get(r))
        .filter_map(|name| pse.kt_features.iter().find(|f| f.name == name))
        .cloned()
        .collect()
}

/// Matrix features merged with key phrases of the invention content, deduped by name
pub fn collect_features(invention_content: &str, pse: Option<&PseMatrix>) -> Vec<TechnicalFeature> {
    let mut features: Vec<TechnicalFeature> = pse.map(|p| p.kt_features.clone()).unwrap_or_default();

    let phrases = marker_phrases(invention_content, CLAIM_MARKERS)
        .into_iter()
        .filter(|p| (3..50).contains(&p.chars().count()))
        .take(MAX_KEY_PHRASES);
    for phrase in phrases {
        let description = format!("技术特征：{}", phrase);
        features.push(TechnicalFeature::new(phrase, description, "invention_feature", true));
    }

    let mut seen = std::collections::HashSet::new();
    features.retain(|f| seen.insert(f.name.clone()));
    features
}

/// Deterministic claims: one independent claim from essential features and
/// up to five dependents from non-essential ones
pub fn from_rules(technical_field: &str, features: &[TechnicalFeature]) -> ClaimsDraft {
    let essential: Vec<TechnicalFeature> = features.iter().filter(|f| f.is_essential).cloned().collect();
    let body = if essential.is_empty() {
        "包括必要的技术特征。".to_string()
    } else {
        let parts: Vec<String> = essential
            .iter()
            .take(MAX_BODY_FEATURES)
            .map(|f| format!("包括{}", f.name))
            .collect();
        format!("{}。", parts.join("，"))
    };

    let mut items = vec![Claim::Independent(IndependentClaim {
        number: 1,
        preamble: format!("一种{}技术，", technical_field),
        transition: DEFAULT_TRANSITION.to_string(),
        body,
        features: essential,
    })];

    for (i, feature) in features
        .iter()
        .filter(|f| !f.is_essential)
        .take(MAX_RULE_DEPENDENTS)
        .enumerate()
    {
        items.push(Claim::Dependent(DependentClaim {
            number: i as u32 + 2,
            parent: 1,
            additional_features: format!("所述技术还包括{}", feature.name),
            features: vec![feature.clone()],
        }));
    }

    let mut claims = Claims {
        items,
        content: String::new(),
    };
    claims.content = render_rules(&claims);
    ClaimsDraft {
        claims,
        ..Default::default()
    }
}

/// Rules-style rendering: dependents always carry the parent reference and a full stop
pub fn render_rules(claims: &Claims) -> String {
    let mut text = String::from("权利要求书\n\n");
    for claim in &claims.items {
        text.push_str(&format!("权利要求{}：\n", claim.number()));
        match claim {
            Claim::Independent(c) => {
                text.push_str(&format!("{}{}{}\n\n", c.preamble, c.transition, c.body));
            }
            Claim::Dependent(c) => {
                text.push_str(&format!(
                    "根据权利要求{}所述的{}。\n\n",
                    c.parent, c.additional_features
                ));
            }
        }
    }
    text
}
