//! Structural and linguistic claim health
//!
//! Diagnostic gate: it scores and explains but a low score alone never
//! blocks a package unless the policy lists it as critical.

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{outcome, truncate_chars, Gate};
use crate::similarity::sequence_ratio;
use regex::Regex;
use scrivener_domain::{
    ClaimIssue, ClaimQualityFindings, ClaimQualitySummary, GateFindings, GateOutcome, KtfIndex,
    PatentDocument, RedundantPair, Severity,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;

const ABSOLUTE_TERMS: &[&str] = &[
    "绝对", "完全", "彻底", "始终", "永远", "必然", "必定", "一定", "肯定", "无疑", "最优", "最好", "最先进", "唯一",
    "100%", "hundred percent", "always", "forever", "undoubtedly",
];

/// Markers of concrete structure or steps
const STRUCTURAL_MARKERS: &[&str] = &["包括", "包含", "由", "连接", "设置", "步骤", "模块", "单元"];

/// Snippet length for issues without a highlight
const SNIPPET_CHARS: usize = 80;

/// Context either side of a highlighted term
const HIGHLIGHT_CONTEXT: usize = 20;

/// Leading features treated as core
const CORE_FEATURES: usize = 3;

/// Feature names searched in the independent claim text
const NAME_SCAN_LIMIT: usize = 10;

static RESULT_ONLY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["用于", "从而", "以便"]
        .iter()
        .map(|lead| {
            Regex::new(&format!(
                r"{}(?:提高|降低|改善|实现|达到).{{0,20}}(?:效果|目的|性能|效率)",
                lead
            ))
            .expect("result-only pattern")
        })
        .collect()
});

static VAGUE_FUNCTIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"用于.{0,15}(?:处理|分析|识别|生成|优化)").expect("vague functional pattern"));

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("number pattern"));

/// CJK units anywhere; Latin units after a number or as a standalone token
static UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:毫米|厘米|米|分钟|小时)|(?:\d|^|[^A-Za-z0-9'])\s*(?:kg|g|ms|s)(?:[^A-Za-z]|$)")
        .expect("unit pattern")
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Checks claim tree structure, feature grounding, redundancy and wording
pub struct ClaimQualityGate {
    redundancy_threshold: f64,
}

impl ClaimQualityGate {
    /// Create the gate from shared thresholds
    pub fn new(config: &GateConfig) -> Self {
        Self {
            redundancy_threshold: config.redundancy_threshold,
        }
    }
}

fn issue(
    issue_type: &str,
    claim_number: Option<u32>,
    snippet: String,
    risk: Severity,
    message: impl Into<String>,
) -> ClaimIssue {
    ClaimIssue {
        issue_type: issue_type.to_string(),
        claim_number,
        snippet,
        risk,
        message: message.into(),
    }
}

fn snippet(text: &str) -> String {
    truncate_chars(text.trim(), SNIPPET_CHARS)
}

/// Up to 20 chars either side of the first occurrence of `term`
fn highlight(text: &str, term: &str) -> String {
    let Some(byte_pos) = text.find(term) else {
        return snippet(text);
    };
    let chars: Vec<char> = text.chars().collect();
    let pos = text[..byte_pos].chars().count();
    let start = pos.saturating_sub(HIGHLIGHT_CONTEXT);
    let end = (pos + term.chars().count() + HIGHLIGHT_CONTEXT).min(chars.len());
    chars[start..end].iter().collect()
}

fn has_hard_constants(text: &str) -> bool {
    NUMBER.is_match(text) || UNIT.is_match(text)
}

fn names_in_text(text: &str, index: &KtfIndex) -> usize {
    index
        .entries()
        .into_iter()
        .take(NAME_SCAN_LIMIT)
        .filter(|(_, name)| !name.is_empty() && text.contains(name))
        .count()
}

fn format_list<T: std::fmt::Display>(items: &[T]) -> String {
    let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

impl Gate for ClaimQualityGate {
    fn name(&self) -> &'static str {
        "claim_quality"
    }

    fn check(&self, document: &PatentDocument) -> Result<GateOutcome, GateError> {
        let Some(claims) = &document.claims else {
            return Ok(outcome(
                true,
                1.0,
                GateFindings::ClaimQuality(ClaimQualityFindings::default()),
                Vec::new(),
                vec!["Claims missing; claim quality checks skipped".to_string()],
                Vec::new(),
            ));
        };

        let texts: BTreeMap<u32, String> = claims
            .items
            .iter()
            .map(|c| (c.number(), WHITESPACE.replace_all(c.text().trim(), " ").into_owned()))
            .collect();
        let text_of = |n: u32| texts.get(&n).map(String::as_str).unwrap_or("");
        let independent: Vec<u32> = claims.independent().map(|c| c.number).collect();
        let dependents: Vec<(u32, u32)> = claims.dependent().map(|c| (c.number, c.parent)).collect();

        let mut issues = Vec::new();

        // Structure
        if texts.len() != claims.items.len() {
            let mut seen = BTreeSet::new();
            let duplicated: BTreeSet<u32> = claims
                .items
                .iter()
                .map(|c| c.number())
                .filter(|n| !seen.insert(*n))
                .collect();
            let listed: Vec<u32> = duplicated.into_iter().collect();
            issues.push(issue(
                "structure.duplicate_claim_number",
                listed.first().copied(),
                String::new(),
                Severity::High,
                format!("Claim numbers must be unique, duplicated: {}", format_list(&listed)),
            ));
        }
        if independent.len() != 1 {
            issues.push(issue(
                "structure.independent_claim_count",
                None,
                String::new(),
                Severity::High,
                format!("Expected exactly 1 independent claim, got {}", independent.len()),
            ));
        }
        let edges: BTreeMap<u32, u32> = dependents.iter().copied().collect();
        for &(child, parent) in &dependents {
            if !texts.contains_key(&parent) {
                issues.push(issue(
                    "structure.missing_parent",
                    Some(child),
                    snippet(text_of(child)),
                    Severity::High,
                    format!("Dependent claim references non-existent parent claim {}", parent),
                ));
            }
            if parent >= child {
                issues.push(issue(
                    "structure.invalid_dependency_order",
                    Some(child),
                    snippet(text_of(child)),
                    Severity::High,
                    format!(
                        "Dependent claim must depend on a lower-numbered claim (parent={}, child={})",
                        parent, child
                    ),
                ));
            }
        }
        for &child in edges.keys() {
            let mut seen = HashSet::new();
            let mut current = child;
            while let Some(&parent) = edges.get(&current) {
                if !seen.insert(current) {
                    issues.push(issue(
                        "structure.dependency_cycle",
                        Some(child),
                        snippet(text_of(child)),
                        Severity::High,
                        "Dependency cycle detected in dependent claims",
                    ));
                    break;
                }
                current = parent;
            }
        }

        // Feature coverage
        let index = document
            .pse_matrix
            .as_ref()
            .map(|p| p.ktf_index())
            .unwrap_or_default();
        let core: Vec<&str> = index.entries().into_iter().take(CORE_FEATURES).map(|(k, _)| k).collect();
        let generation = &document.audit.generation;
        let indep_number = independent.first().copied().unwrap_or(1);
        let indep_text = text_of(indep_number);
        let indep_refs = generation.feature_refs(indep_number);
        let unsupported_refs: Vec<&String> = indep_refs.iter().filter(|r| !index.contains(r.as_str())).collect();

        if !core.is_empty() && !indep_refs.is_empty() && !indep_refs.iter().any(|r| core.contains(&r.as_str())) {
            issues.push(issue(
                "missing_core_features",
                Some(indep_number),
                snippet(indep_text),
                Severity::Medium,
                format!(
                    "Independent claim does not reference core KTF features: expected one of {}",
                    format_list(&core)
                ),
            ));
        }
        let names_matched = names_in_text(indep_text, &index);
        if !index.is_empty() && names_matched == 0 {
            issues.push(issue(
                "missing_core_features",
                Some(indep_number),
                snippet(indep_text),
                Severity::Medium,
                "Independent claim text appears to miss core KTF feature names; consider adding key structures/modules",
            ));
        }
        if !unsupported_refs.is_empty() {
            issues.push(issue(
                "unsupported_features",
                Some(indep_number),
                snippet(indep_text),
                Severity::Medium,
                format!(
                    "Independent claim references unknown features not grounded in KTF: {}",
                    format_list(&unsupported_refs)
                ),
            ));
        }
        if has_hard_constants(indep_text) {
            issues.push(issue(
                "over_specific_constants",
                Some(indep_number),
                snippet(indep_text),
                Severity::Medium,
                "Independent claim contains hard-coded numeric constants; consider moving specifics to dependent claims",
            ));
        }

        // Redundant dependents
        let mut dep_numbers: Vec<u32> = dependents.iter().map(|(n, _)| *n).collect();
        dep_numbers.sort_unstable();
        let mut redundant = BTreeSet::new();
        let mut redundant_pairs = Vec::new();
        for (i, &a) in dep_numbers.iter().enumerate() {
            for &b in &dep_numbers[i + 1..] {
                let (ta, tb) = (text_of(a), text_of(b));
                if ta.is_empty() || tb.is_empty() {
                    continue;
                }
                let similarity = sequence_ratio(ta, tb);
                if similarity >= self.redundancy_threshold {
                    redundant.extend([a, b]);
                    redundant_pairs.push(RedundantPair { a, b, similarity });
                }
            }
        }
        let mut recommendations = Vec::new();
        if !redundant.is_empty() {
            let listed: Vec<u32> = redundant.iter().copied().collect();
            issues.push(issue(
                "redundant_dependent_claims",
                None,
                String::new(),
                Severity::Low,
                format!("Near-duplicate dependent claims detected: {}", format_list(&listed)),
            ));
            recommendations.push(
                "Merge or differentiate redundant dependent claims to improve layering and patentability".to_string(),
            );
        }

        let mut dependent_refs = 0;
        let mut dependent_unsupported = 0;
        for &n in &dep_numbers {
            let refs = generation.feature_refs(n);
            dependent_refs += refs.len();
            let bad: Vec<&String> = refs.iter().filter(|r| !index.contains(r.as_str())).collect();
            dependent_unsupported += bad.len();
            if !bad.is_empty() {
                issues.push(issue(
                    "unsupported_features",
                    Some(n),
                    snippet(text_of(n)),
                    Severity::Low,
                    format!(
                        "Dependent claim references unknown features not grounded in KTF: {}",
                        format_list(&bad)
                    ),
                ));
            }
        }

        // Wording
        for (&n, text) in &texts {
            for term in ABSOLUTE_TERMS.iter().filter(|t| text.contains(*t)) {
                issues.push(issue(
                    "language.absolute_term",
                    Some(n),
                    highlight(text, term),
                    Severity::High,
                    format!("Absolute term detected in claim: {}", term),
                ));
            }
            for _ in RESULT_ONLY.iter().filter(|re| re.is_match(text)) {
                issues.push(issue(
                    "language.result_only_limitation",
                    Some(n),
                    snippet(text),
                    Severity::Medium,
                    "Result-only limitation pattern detected; add structural/technical features supporting the result",
                ));
            }
            let structured = STRUCTURAL_MARKERS.iter().any(|m| text.contains(m));
            if !structured && VAGUE_FUNCTIONAL.is_match(text) {
                issues.push(issue(
                    "language.vague_functional",
                    Some(n),
                    snippet(text),
                    Severity::Medium,
                    "Vague functional language detected without clear structure; consider adding concrete components/steps",
                ));
            }
        }

        let high = issues.iter().filter(|i| i.risk == Severity::High).count();
        let medium = issues.iter().filter(|i| i.risk == Severity::Medium).count();
        let score = (1.0 - 0.2 * high as f64 - 0.05 * medium as f64).max(0.4);
        let passed = high == 0;

        if issues.iter().any(|i| i.issue_type.starts_with("structure.")) {
            recommendations.push(
                "Fix claim numbering/dependency: ensure dependent claims reference existing lower-numbered claims without cycles"
                    .to_string(),
            );
        }
        if issues.iter().any(|i| i.issue_type == "missing_core_features") {
            recommendations.push(
                "Strengthen independent claim: include core technical features (modules/steps) grounded in the KTF list"
                    .to_string(),
            );
        }
        if issues.iter().any(|i| i.issue_type == "unsupported_features") {
            recommendations.push(
                "Align claim features with KTF: map feature references to extracted key technical features or update PSE/KTF extraction"
                    .to_string(),
            );
        }

        let summary = ClaimQualitySummary {
            claims_count: claims.items.len(),
            independent_claims_count: independent.len(),
            dependent_claims_count: dependents.len(),
            independent_feature_count: if indep_refs.is_empty() {
                names_matched
            } else {
                indep_refs.len()
            },
            total_feature_refs: indep_refs.len() + dependent_refs,
            unsupported_feature_refs: unsupported_refs.len() + dependent_unsupported,
            redundant_dependent_claims_count: redundant.len(),
            redundant_pairs,
        };

        Ok(outcome(
            passed,
            score,
            GateFindings::ClaimQuality(ClaimQualityFindings { issues, summary }),
            Vec::new(),
            Vec::new(),
            recommendations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::{
        Claim, Claims, DependentClaim, GenerationSource, IndependentClaim, Metadata, PseMatrix, StepAudit, TechnicalFeature,
    };

    fn independent(number: u32, body: &str) -> Claim {
        Claim::Independent(IndependentClaim {
            number,
            preamble: "一种缓存装置，".to_string(),
            transition: "其特征在于".to_string(),
            body: body.to_string(),
            features: Vec::new(),
        })
    }

    fn dependent(number: u32, parent: u32, text: &str) -> Claim {
        Claim::Dependent(DependentClaim {
            number,
            parent,
            additional_features: text.to_string(),
            features: Vec::new(),
        })
    }

    fn document(items: Vec<Claim>) -> PatentDocument {
        let mut document = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
        document.claims = Some(Claims {
            items,
            content: String::new(),
        });
        document.pse_matrix = Some(PseMatrix {
            kt_features: vec![
                TechnicalFeature::new("缓存模块", "技术特征：缓存模块", "technical_feature", true),
                TechnicalFeature::new("监控单元", "技术特征：监控单元", "technical_feature", true),
            ],
            ..Default::default()
        });
        document
    }

    fn check(document: &PatentDocument) -> (GateOutcome, ClaimQualityFindings) {
        let outcome = ClaimQualityGate::new(&GateConfig::default()).check(document).unwrap();
        let findings = match &outcome.details.findings {
            GateFindings::ClaimQuality(f) => f.clone(),
            other => panic!("unexpected findings {:?}", other),
        };
        (outcome, findings)
    }

    #[test]
    fn test_clean_claims_pass() {
        let (outcome, findings) = check(&document(vec![
            independent(1, "包括缓存模块和监控单元。"),
            dependent(2, 1, "装置，其中所述监控单元统计命中率。"),
        ]));
        assert!(outcome.passed, "{:?}", findings.issues);
        assert_eq!(outcome.score, 1.0);
        assert_eq!(findings.summary.claims_count, 2);
        assert_eq!(findings.summary.independent_feature_count, 2);
    }

    #[test]
    fn test_two_independent_claims() {
        let (outcome, findings) = check(&document(vec![
            independent(1, "包括缓存模块。"),
            independent(2, "包括监控单元。"),
        ]));
        assert!(!outcome.passed);
        let issue = findings.issues_of("structure.independent_claim_count").next().unwrap();
        assert_eq!(issue.message, "Expected exactly 1 independent claim, got 2");
        assert_eq!(issue.claim_number, None);
        assert!((outcome.score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_dependency_errors() {
        let (outcome, findings) = check(&document(vec![
            independent(1, "包括缓存模块。"),
            dependent(2, 3, "装置，其中缓存为内存。"),
            dependent(3, 2, "装置，其中缓存为磁盘。"),
            dependent(4, 9, "装置，其中缓存为闪存。"),
        ]));
        assert!(!outcome.passed);
        assert_eq!(findings.issues_of("structure.invalid_dependency_order").count(), 1);
        assert_eq!(findings.issues_of("structure.missing_parent").count(), 1);
        assert_eq!(findings.issues_of("structure.dependency_cycle").count(), 2);
        assert_eq!(outcome.score, 0.4);
        assert!(outcome.details.recommendations[0].starts_with("Fix claim numbering/dependency"));
    }

    #[test]
    fn test_absolute_term_snippet() {
        let (outcome, findings) = check(&document(vec![independent(1, "包括缓存模块，命中率始终保持稳定。")]));
        assert!(!outcome.passed);
        let issue = findings.issues_of("language.absolute_term").next().unwrap();
        assert_eq!(issue.message, "Absolute term detected in claim: 始终");
        assert!(issue.snippet.contains("始终"));
    }

    #[test]
    fn test_result_only_and_constants() {
        let (outcome, findings) = check(&document(vec![independent(
            1,
            "包括缓存模块，容量为 64 MB，从而提高读取效率。",
        )]));
        assert!(outcome.passed);
        assert_eq!(findings.issues_of("language.result_only_limitation").count(), 1);
        assert_eq!(findings.issues_of("over_specific_constants").count(), 1);
        assert!((outcome.score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_bare_units_are_constants() {
        let (_, findings) = check(&document(vec![independent(1, "包括底座，所述底座厚度以毫米计。")]));
        assert_eq!(findings.issues_of("over_specific_constants").count(), 1);

        let (_, findings) = check(&document(vec![independent(1, "包括缓存模块，超时以 ms 计。")]));
        assert_eq!(findings.issues_of("over_specific_constants").count(), 1);

        let (_, findings) = check(&document(vec![independent(1, "包括缓存模块，每10s刷新一次。")]));
        assert_eq!(findings.issues_of("over_specific_constants").count(), 1);
    }

    #[test]
    fn test_latin_words_are_not_units() {
        let (_, findings) = check(&document(vec![independent(
            1,
            "包括缓存模块，所述缓存模块's status 由 logs 和 settings 记录。",
        )]));
        assert_eq!(findings.issues_of("over_specific_constants").count(), 0);
    }

    #[test]
    fn test_duplicate_claim_numbers() {
        let (outcome, findings) = check(&document(vec![
            independent(1, "包括缓存模块和监控单元。"),
            dependent(1, 1, "装置，其中所述监控单元统计命中率。"),
            dependent(2, 1, "装置，其中所述缓存模块为内存。"),
        ]));
        assert!(!outcome.passed);
        let issue = findings.issues_of("structure.duplicate_claim_number").next().unwrap();
        assert_eq!(issue.risk, Severity::High);
        assert_eq!(issue.claim_number, Some(1));
        assert_eq!(issue.message, "Claim numbers must be unique, duplicated: [1]");
        assert_eq!(findings.summary.claims_count, 3);
    }

    #[test]
    fn test_vague_functional_without_structure() {
        let (_, findings) = check(&document(vec![
            independent(1, "包括缓存模块。"),
            dependent(2, 1, "装置，用于数据处理。"),
        ]));
        let issue = findings.issues_of("language.vague_functional").next().unwrap();
        assert_eq!(issue.claim_number, Some(2));
    }

    #[test]
    fn test_redundant_dependents() {
        let (outcome, findings) = check(&document(vec![
            independent(1, "包括缓存模块和监控单元。"),
            dependent(2, 1, "装置，其中所述监控单元按访问频率淘汰缓存中的冷数据条目"),
            dependent(3, 1, "装置，其中所述监控单元按访问次数淘汰缓存中的冷数据条目"),
        ]));
        assert!(outcome.passed);
        assert_eq!(findings.summary.redundant_dependent_claims_count, 2);
        assert_eq!(findings.summary.redundant_pairs[0].a, 2);
        let issue = findings.issues_of("redundant_dependent_claims").next().unwrap();
        assert_eq!(issue.message, "Near-duplicate dependent claims detected: [2, 3]");
        assert_eq!(issue.risk, Severity::Low);
    }

    #[test]
    fn test_feature_refs_grounding() {
        let mut document = document(vec![
            independent(1, "包括缓存模块。"),
            dependent(2, 1, "装置，其中所述监控单元统计命中率。"),
        ]);
        let mut step = StepAudit {
            source: GenerationSource::Model,
            ..Default::default()
        };
        step.feature_refs_by_claim.insert("1".to_string(), vec!["F1".to_string(), "F9".to_string()]);
        step.feature_refs_by_claim.insert("2".to_string(), vec!["F7".to_string()]);
        document.audit.generation.claims = Some(step);

        let (outcome, findings) = check(&document);
        assert!(outcome.passed);
        let risks: Vec<Severity> = findings.issues_of("unsupported_features").map(|i| i.risk).collect();
        assert_eq!(risks, vec![Severity::Medium, Severity::Low]);
        assert_eq!(findings.summary.total_feature_refs, 3);
        assert_eq!(findings.summary.unsupported_feature_refs, 2);
        assert_eq!(findings.summary.independent_feature_count, 2);
    }

    #[test]
    fn test_missing_claims_are_skipped() {
        let mut document = document(Vec::new());
        document.claims = None;
        let (outcome, findings) = check(&document);
        assert!(outcome.passed);
        assert_eq!(outcome.score, 1.0);
        assert_eq!(findings.summary, ClaimQualitySummary::default());
    }
}
