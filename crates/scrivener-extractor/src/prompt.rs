//! Prompt for structured PSE extraction

/// Builds the PSE extraction prompt
pub struct PromptBuilder {
    text: String,
    max_items: usize,
}

impl PromptBuilder {
    /// Create a new prompt builder for cleaned draft text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_items: scrivener_domain::feature::MAX_PSE_ITEMS,
        }
    }

    /// Upper bound on items requested per column
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str(&format!(
            "- problems/solutions/effects 各给出 1~{} 条，尽量短且可复用\n",
            self.max_items
        ));
        prompt.push_str(FEATURE_RULES);
        prompt.push_str("\n\n专利草稿文本：\n");
        prompt.push_str(&self.text);
        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = "从给定专利草稿文本中抽取 PSE（Problem/Solution/Effect）并识别关键技术特征。\n\
要求：\n\
- 使用中文输出\n";

const FEATURE_RULES: &str = "- kt_features 为关键技术特征列表（对象），name 为名词短语\n\
- 仅输出 JSON";

/// JSON schema of the extraction contract
pub const PSE_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "problems": {"type": "array", "items": {"type": "string"}},
    "solutions": {"type": "array", "items": {"type": "string"}},
    "effects": {"type": "array", "items": {"type": "string"}},
    "kt_features": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["name"],
        "properties": {
          "name": {"type": "string", "minLength": 1},
          "description": {"type": "string"},
          "category": {"type": "string"},
          "is_essential": {"type": "boolean"}
        }
      }
    }
  }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_text_and_rules() {
        let prompt = PromptBuilder::new("一种缓存装置").build();
        assert!(prompt.contains("一种缓存装置"));
        assert!(prompt.contains("kt_features"));
        assert!(prompt.contains("1~5 条"));
        assert!(prompt.ends_with("一种缓存装置"));
    }

    #[test]
    fn test_max_items_is_clamped() {
        let prompt = PromptBuilder::new("x").with_max_items(0).build();
        assert!(prompt.contains("1~1 条"));
    }

    #[test]
    fn test_schema_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(PSE_SCHEMA).unwrap();
        assert_eq!(value["type"], "object");
    }
}
