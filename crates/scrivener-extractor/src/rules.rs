//! Deterministic problem/solution/effect extraction
//!
//! Used whenever the model path is skipped or fails. Sentences are matched
//! against bilingual keyword sets, narrowed to a clause with a small pattern
//! list, de-duplicated by character Jaccard similarity and capped. Features
//! come from lexical markers (包括, 所述, ...) plus a head-noun heuristic for
//! technical terms.

use crate::text::{char_jaccard, char_len, is_cjk, split_sentences};
use regex::Regex;
use scrivener_domain::{KtfIndex, PseMatrix, TechnicalFeature};
use std::sync::LazyLock;

/// Keywords marking a sentence as describing a problem
pub const PROBLEM_KEYWORDS: &[&str] = &[
    "问题", "缺陷", "不足", "缺点", "弊端", "困难", "障碍", "挑战", "难以", "无法", "不能",
    "限制", "局限", "瓶颈", "痛点", "problem", "issue", "defect", "drawback", "limitation",
];

/// Keywords marking a sentence as describing a solution
pub const SOLUTION_KEYWORDS: &[&str] = &[
    "解决", "克服", "改进", "优化", "提升", "提高", "增强", "方法", "技术方案", "措施", "手段",
    "途径", "策略", "solve", "resolve", "improve", "enhance", "method", "solution",
];

/// Keywords marking a sentence as describing an effect
pub const EFFECT_KEYWORDS: &[&str] = &[
    "效果", "效益", "优点", "优势", "改进", "提升", "提高", "增强", "降低", "减少", "避免",
    "防止", "实现", "effect", "benefit", "advantage", "improvement",
];

/// Lexical markers that introduce a technical feature
pub const FEATURE_MARKERS: &[&str] = &["包括", "所述", "其特征在于", "采用", "通过", "设置有"];

/// Head nouns that end a technical term
pub const HEAD_NOUNS: &[&str] = &[
    "模块", "单元", "装置", "设备", "系统", "组件", "结构", "机构", "电路", "传感器", "控制器",
    "处理器", "算法", "模型", "网络", "接口", "平台", "引擎", "部件", "元件", "机制",
];

const COMMON_WORDS: &[&str] = &[
    "的", "了", "在", "是", "有", "和", "与", "或", "但", "而", "为", "可以", "能够", "进行",
    "使用", "采用", "通过", "设置", "安装", "the", "and", "or", "but", "with", "for", "of", "in",
    "on", "at",
];

// Words that cannot start a noun phrase; the phrase begins after the last one
const PHRASE_BOUNDARIES: &[&str] = &[
    "包括", "所述", "采用", "通过", "设置有", "一种", "用于", "具有", "以及", "和", "与", "及",
    "的", "将", "对", "由", "在", "该", "本", "其", "还", "各", "个", "是", "为",
];

/// Minimum description length (chars) for a problem/solution/effect
pub const MIN_DESCRIPTION_CHARS: usize = 10;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static extraction pattern")
}

// Each pattern captures the clause up to (not including) the delimiter
static PROBLEM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(.{2,}?的?问题[是：].+?)[，。；]",
        r"(.{2,}?的?缺点[是：].+?)[，。；]",
        r"(.{2,}?的?不足[是：].+?)[，。；]",
        r"(存在.+?)[，。；]",
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

static SOLUTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(.{2,}?解决.+?)[，。；]",
        r"(.{2,}?采用.+?)[，。；]",
        r"(.{2,}?通过.+?)[，。；]",
        r"(技术方案[是：].+?)[，。；]",
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

static EFFECT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(.{2,}?效果[是：].+?)[，。；]",
        r"(.{2,}?优点[是：].+?)[，。；]",
        r"(.{2,}?能够.+?)[，。；]",
        r"(.{2,}?实现.+?)[，。；]",
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

static MARKER_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FEATURE_MARKERS
        .iter()
        .map(|m| (*m, compile(&format!("{}(.+?)[，。；]", regex::escape(m)))))
        .collect()
});

/// Longest mined technical term (chars)
pub const MAX_TERM_CHARS: usize = 12;

static HEAD_RE: LazyLock<Regex> = LazyLock::new(|| compile(&HEAD_NOUNS.join("|")));

/// Trimmed phrases introduced by `markers`, in marker order then text order
///
/// Only markers listed in [`FEATURE_MARKERS`] are recognized.
pub fn marker_phrases(text: &str, markers: &[&str]) -> Vec<String> {
    let mut phrases = Vec::new();
    for (marker, re) in MARKER_PATTERNS.iter() {
        if !markers.contains(marker) {
            continue;
        }
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                phrases.push(m.as_str().trim().to_string());
            }
        }
    }
    phrases
}

/// Candidate technical terms ending in a head noun, first-seen order
///
/// A term spans the CJK run before its head noun, starting after the last
/// phrase boundary in that run. Terms outside 2..=[`MAX_TERM_CHARS`] chars
/// are dropped rather than cut mid-word.
pub fn noun_candidates(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut prev_end = 0;
    for head in HEAD_RE.find_iter(text) {
        let run_start = text[prev_end..head.start()]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_cjk(*c))
            .last()
            .map(|(i, _)| prev_end + i)
            .unwrap_or(head.start());
        prev_end = head.end();

        let prefix = &text[run_start..head.start()];
        let cut = PHRASE_BOUNDARIES
            .iter()
            .filter_map(|w| prefix.rfind(w).map(|i| i + w.len()))
            .max()
            .unwrap_or(0);
        let term = format!("{}{}", &prefix[cut..], head.as_str());
        let len = char_len(&term);
        if !(2..=MAX_TERM_CHARS).contains(&len) || COMMON_WORDS.contains(&term.as_str()) {
            continue;
        }
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Rule-based PSE extraction with configurable caps
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    max_items: usize,
    max_features: usize,
    dedupe_threshold: f64,
}

impl RuleExtractor {
    /// Create a rule extractor
    pub fn new(max_items: usize, max_features: usize, dedupe_threshold: f64) -> Self {
        Self {
            max_items,
            max_features,
            dedupe_threshold,
        }
    }

    /// Extract a matrix from normalized text; the audit block is left to the caller
    /// except for the feature index
    pub fn extract(&self, text: &str) -> PseMatrix {
        let sentences = split_sentences(text);
        let kt_features = self.features(text);
        let mut matrix = PseMatrix {
            problems: self.collect(&sentences, PROBLEM_KEYWORDS, &PROBLEM_PATTERNS),
            solutions: self.collect(&sentences, SOLUTION_KEYWORDS, &SOLUTION_PATTERNS),
            effects: self.collect(&sentences, EFFECT_KEYWORDS, &EFFECT_PATTERNS),
            kt_features,
            ..Default::default()
        };
        matrix.audit.ktf_index = KtfIndex::from_features(&matrix.kt_features);
        matrix
    }

    fn collect(&self, sentences: &[String], keywords: &[&str], patterns: &[Regex]) -> Vec<String> {
        let candidates = sentences
            .iter()
            .filter(|s| keywords.iter().any(|k| s.contains(k)))
            .map(|s| narrow_clause(s, patterns))
            .filter(|d| char_len(d) > MIN_DESCRIPTION_CHARS)
            .collect();
        let mut unique = remove_similar(candidates, self.dedupe_threshold);
        unique.truncate(self.max_items);
        unique
    }

    fn features(&self, text: &str) -> Vec<TechnicalFeature> {
        let mut features: Vec<TechnicalFeature> = marker_phrases(text, FEATURE_MARKERS)
            .into_iter()
            .filter(|p| char_len(p) > 2)
            .map(|p| {
                let description = format!("技术特征：{}", p);
                TechnicalFeature::new(p, description, "technical_feature", true)
            })
            .collect();

        for term in noun_candidates(text) {
            if features.iter().any(|f| f.name == term) {
                continue;
            }
            let description = format!("技术术语：{}", term);
            features.push(TechnicalFeature::new(term, description, "technical_term", false));
        }

        features.truncate(self.max_features);
        features
    }
}

/// First matching clause, or the whole sentence
fn narrow_clause(sentence: &str, patterns: &[Regex]) -> String {
    patterns
        .iter()
        .find_map(|re| re.captures(sentence).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| sentence.to_string())
}

/// Keep items whose character Jaccard similarity to every kept item is at most `threshold`
pub fn remove_similar(items: Vec<String>, threshold: f64) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for item in items {
        if unique.iter().all(|u| char_jaccard(&item, u) <= threshold) {
            unique.push(item);
        }
    }
    unique
}
