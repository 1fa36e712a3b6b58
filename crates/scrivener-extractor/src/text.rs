//! Text normalization and lexical helpers shared by the rule paths

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

static DISALLOWED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\x{4e00}-\x{9fff}\w\s，。；：！？（）【】]").expect("character class pattern")
});

static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[。！？；]").expect("sentence delimiter pattern"));

/// Minimum sentence length (chars) kept by [`split_sentences`]
pub const MIN_SENTENCE_CHARS: usize = 5;

/// Collapse whitespace runs, trim, and strip characters outside CJK, word
/// characters, whitespace and common full-width punctuation
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text.trim(), " ");
    DISALLOWED_RE.replace_all(&collapsed, "").into_owned()
}

/// Split on `。！？；` and keep trimmed sentences longer than five chars
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_RE
        .split(text)
        .map(str::trim)
        .filter(|s| char_len(s) > MIN_SENTENCE_CHARS)
        .map(str::to_string)
        .collect()
}

/// Length in Unicode scalar values
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// True for characters in the CJK unified ideographs block
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Jaccard similarity over character sets
pub fn char_jaccard(a: &str, b: &str) -> f64 {
    let left: HashSet<char> = a.chars().collect();
    let right: HashSet<char> = b.chars().collect();
    jaccard(&left, &right)
}

/// Jaccard similarity over lowercase whitespace-separated words
pub fn word_jaccard(a: &str, b: &str) -> f64 {
    jaccard(&word_set(a), &word_set(b))
}

/// Lowercase whitespace-separated word set
pub fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Approximate word segmentation: CJK runs become overlapping bigrams,
/// everything else lowercase alphanumeric words
pub fn segment(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut run: Vec<char> = Vec::new();
    let mut word = String::new();

    let flush_run = |run: &mut Vec<char>, tokens: &mut HashSet<String>| {
        match run.len() {
            0 => {}
            1 => {
                tokens.insert(run[0].to_string());
            }
            _ => {
                for pair in run.windows(2) {
                    tokens.insert(pair.iter().collect());
                }
            }
        }
        run.clear();
    };

    for c in text.chars() {
        if is_cjk(c) {
            if !word.is_empty() {
                tokens.insert(std::mem::take(&mut word));
            }
            run.push(c);
        } else {
            flush_run(&mut run, &mut tokens);
            if c.is_alphanumeric() {
                word.extend(c.to_lowercase());
            } else if !word.is_empty() {
                tokens.insert(std::mem::take(&mut word));
            }
        }
    }
    flush_run(&mut run, &mut tokens);
    if !word.is_empty() {
        tokens.insert(word);
    }
    tokens
}

/// Jaccard similarity over [`segment`] tokens
pub fn segment_jaccard(a: &str, b: &str) -> f64 {
    jaccard(&segment(a), &segment(b))
}

fn jaccard<T: std::hash::Hash + Eq>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_and_strips() {
        let text = "  本发明\n\n涉及  一种@装置#，用于 测试!  ";
        assert_eq!(normalize(text), "本发明 涉及 一种装置，用于 测试");
    }

    #[test]
    fn test_normalize_keeps_fullwidth_punctuation() {
        assert_eq!(normalize("（注意）【重要】：是！"), "（注意）【重要】：是！");
    }

    #[test]
    fn test_split_sentences_filters_short() {
        let sentences = split_sentences("短句。这是一个足够长的句子；好！另一个较长的句子在这里？");
        assert_eq!(sentences, vec!["这是一个足够长的句子", "另一个较长的句子在这里"]);
    }

    #[test]
    fn test_char_jaccard() {
        assert!((char_jaccard("abc", "abc") - 1.0).abs() < f64::EPSILON);
        assert!((char_jaccard("ab", "cd")).abs() < f64::EPSILON);
        assert!((char_jaccard("", "")).abs() < f64::EPSILON);
    }

    #[test]
    fn test_segment_mixes_bigrams_and_words() {
        let tokens = segment("缓存模块 uses LRU，快");
        for expected in ["缓存", "存模", "模块", "uses", "lru", "快"] {
            assert!(tokens.contains(expected), "missing {}", expected);
        }
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_word_jaccard_is_case_insensitive() {
        assert!((word_jaccard("Fast Cache", "fast cache") - 1.0).abs() < f64::EPSILON);
        assert!((word_jaccard("a b", "b c") - 1.0 / 3.0).abs() < 1e-9);
    }
}
