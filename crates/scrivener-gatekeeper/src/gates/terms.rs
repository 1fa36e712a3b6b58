//! Term consistency across sections

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{outcome, Gate};
use regex::Regex;
use scrivener_domain::{GateFindings, GateOutcome, PatentDocument, SectionUsage, TermFindings, TermIssue};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TERM_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r#"[“"](.+?)[”"]"#, r"所述(.+?)[，。；]", r"包括(.+?)[，。；]"]
        .iter()
        .map(|p| Regex::new(p).expect("term pattern"))
        .collect()
});

/// Candidate terms: quoted phrases and phrases after 所述/包括, 2–19 chars
pub fn extract_terms(text: &str) -> Vec<String> {
    TERM_RES
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|t| (2..20).contains(&t.chars().count()))
        .collect()
}

/// Checks that candidate terms recur across sections
pub struct TermConsistencyGate {
    threshold: f64,
}

impl TermConsistencyGate {
    /// Create the gate from shared thresholds
    pub fn new(config: &GateConfig) -> Self {
        Self {
            threshold: config.term_consistency_threshold,
        }
    }
}

impl Gate for TermConsistencyGate {
    fn name(&self) -> &'static str {
        "term_consistency"
    }

    fn check(&self, document: &PatentDocument) -> Result<GateOutcome, GateError> {
        let usage = term_usage(document);
        let mut findings = TermFindings {
            total_terms: usage.len(),
            ..Default::default()
        };
        for (term, u) in &usage {
            if u.sections_used() >= 2 {
                findings.consistent_terms += 1;
            } else {
                findings.inconsistent_terms.push(TermIssue {
                    term: term.clone(),
                    usage: *u,
                    issue: describe_issue(u),
                });
            }
        }
        findings.term_usage = usage;

        let score = if findings.total_terms > 0 {
            findings.consistent_terms as f64 / findings.total_terms as f64
        } else {
            1.0
        };
        let passed = score >= self.threshold;
        let recommendations = if passed {
            Vec::new()
        } else {
            vec![
                "Standardize terminology across all sections".to_string(),
                "Use consistent terms for the same concepts".to_string(),
            ]
        };
        Ok(outcome(
            passed,
            score,
            GateFindings::TermConsistency(findings),
            Vec::new(),
            Vec::new(),
            recommendations,
        ))
    }
}

fn term_usage(document: &PatentDocument) -> BTreeMap<String, SectionUsage> {
    let mut usage: BTreeMap<String, SectionUsage> = BTreeMap::new();
    let sections: [(Option<&String>, fn(&mut SectionUsage) -> &mut usize); 4] = [
        (document.specification.as_ref().map(|s| &s.content), |u| &mut u.specification),
        (document.claims.as_ref().map(|c| &c.content), |u| &mut u.claims),
        (document.abstract_section.as_ref().map(|a| &a.content), |u| &mut u.abstract_section),
        (document.disclosure.as_ref().map(|d| &d.content), |u| &mut u.disclosure),
    ];
    for (content, counter) in sections {
        let Some(content) = content else { continue };
        for term in extract_terms(content) {
            *counter(usage.entry(term).or_default()) += 1;
        }
    }
    usage
}

fn describe_issue(usage: &SectionUsage) -> String {
    let named = [
        ("specification", usage.specification),
        ("claims", usage.claims),
        ("abstract", usage.abstract_section),
        ("disclosure", usage.disclosure),
    ];
    let present: Vec<&str> = named.iter().filter(|(_, n)| *n > 0).map(|(s, _)| *s).collect();
    let missing: Vec<&str> = named.iter().filter(|(_, n)| *n == 0).map(|(s, _)| *s).collect();
    if present.len() == 1 {
        format!("Term only appears in {} section", present[0])
    } else if missing.len() > 2 {
        format!("Term missing from {} sections", missing.join(", "))
    } else {
        "Term usage inconsistent".to_string()
    }
}
