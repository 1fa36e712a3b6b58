//! Structured contracts for grounded claims and abstract generation

use crate::prompt::{ABSTRACT_SCHEMA, CLAIMS_SCHEMA};
use regex::Regex;
use scrivener_llm::StructuredContract;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Minimum claim text length (chars)
pub const MIN_CLAIM_CHARS: usize = 10;

/// Abstract summary bounds (chars)
pub const SUMMARY_CHARS: std::ops::RangeInclusive<usize> = 30..=500;

fn default_one() -> Value {
    Value::String("1".to_string())
}

/// Independent claim as returned by the model
#[derive(Debug, Clone, Deserialize)]
pub struct IndependentContract {
    /// Claim number, string or integer
    #[serde(default = "default_one")]
    pub number: Value,
    /// Full claim sentence without numbering
    pub text: String,
    /// Feature references (`F1`, ...)
    #[serde(default)]
    pub feature_refs: Vec<String>,
}

/// Dependent claim as returned by the model
#[derive(Debug, Clone, Deserialize)]
pub struct DependentContract {
    /// Claim number, string or integer
    pub number: Value,
    /// Parent claim number, string or integer
    #[serde(default = "default_one")]
    pub depends_on: Value,
    /// Full claim sentence without numbering
    pub text: String,
    /// Feature references (`F1`, ...)
    #[serde(default)]
    pub feature_refs: Vec<String>,
}

/// Term entry of the grounding map
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermContract {
    /// Definition
    #[serde(default)]
    pub definition: String,
    /// Occurrences such as `claim:1`, `spec:p3`
    #[serde(default)]
    pub occurrences: Vec<String>,
}

/// Claims draft returned by the model
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimsContract {
    /// The independent claim
    pub independent_claim: IndependentContract,
    /// Dependent claims
    #[serde(default)]
    pub dependent_claims: Vec<DependentContract>,
    /// Term grounding map
    #[serde(default)]
    pub term_map: BTreeMap<String, TermContract>,
}

impl StructuredContract for ClaimsContract {
    fn schema() -> &'static str {
        CLAIMS_SCHEMA
    }

    fn validate(&self) -> Result<(), String> {
        if self.independent_claim.text.chars().count() < MIN_CLAIM_CHARS {
            return Err("independent_claim.text is too short".to_string());
        }
        for (i, dep) in self.dependent_claims.iter().enumerate() {
            if dep.text.chars().count() < MIN_CLAIM_CHARS {
                return Err(format!("dependent_claims[{}].text is too short", i));
            }
        }
        Ok(())
    }
}

/// Abstract draft returned by the model
#[derive(Debug, Clone, Deserialize)]
pub struct AbstractContract {
    /// Summary body
    pub summary: String,
    /// Optional description of the main figure
    #[serde(default)]
    pub main_figure_description: Option<String>,
}

impl StructuredContract for AbstractContract {
    fn schema() -> &'static str {
        ABSTRACT_SCHEMA
    }

    fn validate(&self) -> Result<(), String> {
        let len = self.summary.chars().count();
        if !SUMMARY_CHARS.contains(&len) {
            return Err(format!(
                "summary length {} outside {}..={}",
                len,
                SUMMARY_CHARS.start(),
                SUMMARY_CHARS.end()
            ));
        }
        Ok(())
    }
}

/// Parse a claim number leniently, falling back to `default`
pub fn safe_int(value: &Value, default: u32) -> u32 {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(default),
        Value::String(s) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

static NUMBER_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[\.、]\s*").expect("number prefix pattern"));

static PARENT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^根据权利要求\s*\d+\s*所述的").expect("parent prefix pattern"));

/// Strip leading numbering and a "根据权利要求N所述的" reference
pub fn strip_dependent_prefix(text: &str) -> String {
    let t = text.trim();
    if t.is_empty() {
        return String::new();
    }
    let t = NUMBER_PREFIX_RE.replace(t, "");
    let t = PARENT_PREFIX_RE.replace(&t, "");
    t.trim().trim_start_matches('，').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_int() {
        assert_eq!(safe_int(&json!("3"), 1), 3);
        assert_eq!(safe_int(&json!(" 4 "), 1), 4);
        assert_eq!(safe_int(&json!(5), 1), 5);
        assert_eq!(safe_int(&json!("二"), 7), 7);
        assert_eq!(safe_int(&json!(-2), 7), 7);
        assert_eq!(safe_int(&Value::Null, 1), 1);
    }

    #[test]
    fn test_strip_dependent_prefix() {
        assert_eq!(strip_dependent_prefix("2. 根据权利要求1所述的系统，其中缓存为LRU"), "系统，其中缓存为LRU");
        assert_eq!(strip_dependent_prefix("根据权利要求 1 所述的，装置还包括传感器"), "装置还包括传感器");
        assert_eq!(strip_dependent_prefix("3、所述装置还包括接口"), "所述装置还包括接口");
        assert_eq!(strip_dependent_prefix("依照权利要求1，装置"), "依照权利要求1，装置");
        assert_eq!(strip_dependent_prefix("   "), "");
    }

    #[test]
    fn test_claims_contract_validation() {
        let ok: ClaimsContract = serde_json::from_value(json!({
            "independent_claim": {"text": "一种缓存装置，其特征在于包括缓存模块。"},
            "dependent_claims": [{"number": 2, "text": "根据权利要求1所述的装置，还包括监控单元。"}]
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(safe_int(&ok.independent_claim.number, 0), 1);
        assert_eq!(safe_int(&ok.dependent_claims[0].depends_on, 0), 1);

        let short: ClaimsContract = serde_json::from_value(json!({
            "independent_claim": {"text": "太短"}
        }))
        .unwrap();
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_dependent_number_is_required() {
        let result = serde_json::from_value::<ClaimsContract>(json!({
            "independent_claim": {"text": "一种缓存装置，其特征在于包括缓存模块。"},
            "dependent_claims": [{"text": "根据权利要求1所述的装置，还包括监控单元。"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_abstract_contract_bounds() {
        let short = AbstractContract { summary: "短".repeat(29), main_figure_description: None };
        assert!(short.validate().is_err());
        let ok = AbstractContract { summary: "字".repeat(30), main_figure_description: None };
        assert!(ok.validate().is_ok());
        let long = AbstractContract { summary: "长".repeat(501), main_figure_description: None };
        assert!(long.validate().is_err());
    }
}
