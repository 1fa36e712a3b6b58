//! Severity-tiered banned vocabulary

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{outcome, Gate};
use regex::{Regex, RegexBuilder};
use scrivener_domain::{
    BannedWordsFindings, GateFindings, GateOutcome, PatentDocument, Severity, SeverityCounts, Violation,
};
use scrivener_extractor::text::is_cjk;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Characters of context on each side of a hit
const CONTEXT_CHARS: usize = 30;

const ABSOLUTE: &[&str] = &[
    "绝对", "完全", "彻底", "始终", "永远", "必然", "必定", "一定", "肯定", "无疑", "毋庸置疑", "百分之百", "百分百",
    "absolute", "completely", "totally", "always", "forever", "certainly", "definitely", "undoubtedly", "100%",
    "hundred percent",
];

const VAGUE: &[&str] = &[
    "大约", "大概", "左右", "差不多", "基本", "主要", "大致", "近似", "接近", "相当", "比较", "较为", "相对",
    "approximately", "about", "roughly", "basically", "mainly", "generally", "relatively", "comparatively",
];

const SUBJECTIVE: &[&str] = &[
    "美观", "漂亮", "好看", "舒适", "方便", "简单", "容易", "显然", "明显", "众所周知", "容易理解", "显而易见",
    "beautiful", "pretty", "comfortable", "convenient", "simple", "obvious", "apparently", "well-known",
    "easy to understand",
];

const COMMERCIAL: &[&str] = &[
    "便宜", "昂贵", "经济", "实惠", "划算", "性价比高", "低成本", "高利润", "畅销", "市场", "销售", "盈利", "cheap",
    "expensive", "economic", "affordable", "cost-effective", "low cost", "high profit", "best-selling", "market",
    "sales",
];

const SUPERLATIVE: &[&str] = &[
    "最佳", "最优", "最好", "最强", "最高", "最低", "最小", "最大", "最先进", "最新", "首创", "第一", "唯一", "best",
    "optimal", "superior", "strongest", "highest", "lowest", "smallest", "largest", "most advanced", "latest",
    "first", "only", "unique",
];

/// One lexicon category
#[derive(Debug, Clone)]
pub struct BannedCategory {
    /// Category name, e.g. `absolute_terms`
    pub name: String,
    /// Words in the category
    pub words: Vec<String>,
    /// Severity of every hit
    pub severity: Severity,
    /// Why the category is banned
    pub reason: String,
    pattern: Regex,
}

impl BannedCategory {
    fn new(name: &str, words: Vec<String>, severity: Severity, reason: &str) -> Result<Self, GateError> {
        let pattern = compile(&words)?;
        Ok(Self {
            name: name.to_string(),
            words,
            severity,
            reason: reason.to_string(),
            pattern,
        })
    }
}

/// Case-insensitive union; Latin words are bounded by `\b` at alphanumeric edges
fn compile(words: &[String]) -> Result<Regex, GateError> {
    let alternatives: Vec<String> = words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| {
            if w.chars().any(is_cjk) {
                return regex::escape(w);
            }
            let edge = |c: Option<char>| if c.is_some_and(|c| c.is_alphanumeric()) { r"\b" } else { "" };
            format!("{}{}{}", edge(w.chars().next()), regex::escape(w), edge(w.chars().last()))
        })
        .collect();
    let source = if alternatives.is_empty() {
        // Matches nothing
        r"\b\B".to_string()
    } else {
        alternatives.join("|")
    };
    Ok(RegexBuilder::new(&source).case_insensitive(true).build()?)
}

/// Aggregate counts over a set of violations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationStatistics {
    /// Number of violations
    pub total_violations: usize,
    /// Count per category
    pub by_category: BTreeMap<String, usize>,
    /// Count per severity
    pub by_severity: SeverityCounts,
    /// Up to ten most frequent words, most frequent first
    pub most_common_words: Vec<(String, usize)>,
}

/// Scans every section for banned vocabulary
pub struct BannedWordsGate {
    categories: Vec<BannedCategory>,
    max_medium: usize,
}

impl BannedWordsGate {
    /// Create the gate with the built-in lexicons
    pub fn new(config: &GateConfig) -> Result<Self, GateError> {
        let lexicon = [
            (
                "absolute_terms",
                ABSOLUTE,
                Severity::High,
                "Absolute terms are generally not allowed in patents as they imply unlimited scope",
            ),
            ("vague_terms", VAGUE, Severity::Medium, "Vague terms can lead to unclear claim scope"),
            (
                "subjective_terms",
                SUBJECTIVE,
                Severity::Medium,
                "Subjective terms are not objectively measurable",
            ),
            (
                "commercial_terms",
                COMMERCIAL,
                Severity::Low,
                "Commercial terms are generally discouraged in technical patents",
            ),
            (
                "discriminatory_terms",
                SUPERLATIVE,
                Severity::High,
                "Discriminatory terms imply superiority and should be avoided",
            ),
        ];
        let categories = lexicon
            .into_iter()
            .map(|(name, words, severity, reason)| {
                BannedCategory::new(name, words.iter().map(|w| w.to_string()).collect(), severity, reason)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            categories,
            max_medium: config.max_medium_banned_words,
        })
    }

    /// Words of a category, empty for unknown categories
    pub fn banned_words_in(&self, category: &str) -> &[String] {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.words.as_slice())
            .unwrap_or(&[])
    }

    /// Category names in scan order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Extend a category, creating it with `severity` and `reason` if new
    pub fn add_custom_banned_words(
        &mut self,
        words: &[&str],
        category: &str,
        severity: Severity,
        reason: &str,
    ) -> Result<(), GateError> {
        let words = words.iter().map(|w| w.to_string());
        match self.categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => {
                existing.words.extend(words);
                existing.pattern = compile(&existing.words)?;
            }
            None => {
                let created = BannedCategory::new(category, words.collect(), severity, reason)?;
                self.categories.push(created);
            }
        }
        Ok(())
    }

    /// Replace every banned word with `[REDACTED]`
    pub fn redact(&self, text: &str) -> String {
        self.categories.iter().fold(text.to_string(), |acc, c| {
            c.pattern.replace_all(&acc, "[REDACTED]").into_owned()
        })
    }

    /// Suggested replacements for a banned word
    pub fn suggest_alternatives(&self, word: &str) -> Vec<&'static str> {
        match word {
            "绝对" => vec!["相对", "基本上", "在大多数情况下"],
            "完全" => vec!["基本上", "在很大程度上", "显著地"],
            "最佳" => vec!["优选", "合适的", "适当的"],
            "最优" => vec!["较优", "合适的", "令人满意的"],
            "大约" => vec!["约", "大致", "左右"],
            "美观" => vec!["符合审美要求", "视觉上令人愉悦", "具有吸引力"],
            "便宜" => vec!["成本较低", "经济实用", "具有成本效益"],
            _ => vec!["[请使用更准确的术语]"],
        }
    }

    /// Every hit in `text`, grouped per category in scan order
    pub fn scan(&self, text: &str) -> Vec<Violation> {
        let mut violations = Vec::new();
        for category in &self.categories {
            for m in category.pattern.find_iter(text) {
                violations.push(Violation {
                    word: m.as_str().to_string(),
                    position: text[..m.start()].chars().count(),
                    context: context(text, m.start(), m.end()),
                    category: category.name.clone(),
                    severity: category.severity,
                    reason: category.reason.clone(),
                });
            }
        }
        violations
    }

    /// Counts by category, severity and word
    pub fn violation_statistics(&self, violations: &[Violation]) -> ViolationStatistics {
        let mut stats = ViolationStatistics {
            total_violations: violations.len(),
            ..Default::default()
        };
        let mut words: HashMap<&str, usize> = HashMap::new();
        for v in violations {
            *stats.by_category.entry(v.category.clone()).or_default() += 1;
            stats.by_severity.record(v.severity, 1);
            *words.entry(v.word.as_str()).or_default() += 1;
        }
        let mut common: Vec<(String, usize)> = words.into_iter().map(|(w, n)| (w.to_string(), n)).collect();
        common.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        common.truncate(10);
        stats.most_common_words = common;
        stats
    }
}

impl Gate for BannedWordsGate {
    fn name(&self) -> &'static str {
        "banned_words"
    }

    fn check(&self, document: &PatentDocument) -> Result<GateOutcome, GateError> {
        let text = all_text(document);
        if text.trim().is_empty() {
            return Err(GateError::EmptyDocument);
        }

        let mut findings = BannedWordsFindings::default();
        for violation in self.scan(&text) {
            findings.violations_by_severity.record(violation.severity, 1);
            if violation.severity == Severity::High {
                findings.critical_violations.push(violation.clone());
            }
            findings
                .violations_by_category
                .entry(violation.category.clone())
                .or_default()
                .push(violation);
            findings.total_violations += 1;
        }

        let counts = findings.violations_by_severity;
        let (passed, base, advice) = if counts.high > 0 {
            (false, 0.0, "Remove all high-severity banned words before submission")
        } else if counts.medium > self.max_medium {
            (false, 0.3, "Reduce the number of medium-severity banned words")
        } else if findings.total_violations > 0 {
            let base = match findings.total_violations {
                0..=3 => 0.8,
                4..=10 => 0.6,
                _ => 0.4,
            };
            (true, base, "Consider revising to remove banned words for better quality")
        } else {
            (true, 1.0, "Excellent: No banned words detected")
        };
        let score = (base - 0.3 * counts.high as f64 - 0.1 * counts.medium as f64 - 0.05 * counts.low as f64).max(0.0);

        Ok(outcome(
            passed,
            score,
            GateFindings::BannedWords(findings),
            Vec::new(),
            Vec::new(),
            vec![advice.to_string()],
        ))
    }
}

/// Title and every section's fields joined by spaces
pub fn all_text(document: &PatentDocument) -> String {
    let mut parts: Vec<&str> = vec![document.metadata.title.as_str()];
    if let Some(spec) = &document.specification {
        parts.extend([
            spec.technical_field.as_str(),
            spec.background_art.as_str(),
            spec.invention_content.as_str(),
            spec.embodiments.as_str(),
        ]);
        if let Some(drawings) = &spec.description_of_drawings {
            parts.push(drawings);
        }
    }
    if let Some(claims) = &document.claims {
        parts.push(&claims.content);
    }
    if let Some(abs) = &document.abstract_section {
        parts.extend([abs.title.as_str(), abs.technical_field.as_str(), abs.summary.as_str()]);
    }
    if let Some(disclosure) = &document.disclosure {
        parts.push(&disclosure.detailed_description);
        parts.extend(disclosure.examples.iter().map(String::as_str));
        parts.extend(disclosure.drawings.iter().map(String::as_str));
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// Up to 30 chars either side of the hit, with the hit bracketed
fn context(text: &str, start: usize, end: usize) -> String {
    let before: Vec<char> = text[..start].chars().collect();
    let from = before.len().saturating_sub(CONTEXT_CHARS);
    let lead: String = before[from..].iter().collect();
    let trail: String = text[end..].chars().take(CONTEXT_CHARS).collect();
    format!("{}[{}]{}", lead, &text[start..end], trail).trim().to_string()
}
