//! Structured extraction contract and its conversion to a matrix

use crate::prompt::PSE_SCHEMA;
use scrivener_domain::{PseMatrix, TechnicalFeature};
use scrivener_llm::StructuredContract;
use serde::Deserialize;

/// Feature as returned by the model
#[derive(Debug, Clone, Deserialize)]
pub struct DraftFeature {
    /// Noun phrase naming the feature
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: String,
    /// Optional category
    #[serde(default = "default_category")]
    pub category: String,
    /// Defaults to essential
    #[serde(default = "default_essential")]
    pub is_essential: bool,
}

fn default_category() -> String {
    "technical_feature".to_string()
}

fn default_essential() -> bool {
    true
}

/// Matrix draft as returned by the model
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PseDraft {
    /// Problems
    #[serde(default)]
    pub problems: Vec<String>,
    /// Solutions
    #[serde(default)]
    pub solutions: Vec<String>,
    /// Effects
    #[serde(default)]
    pub effects: Vec<String>,
    /// Key technical features
    #[serde(default)]
    pub kt_features: Vec<DraftFeature>,
}

impl StructuredContract for PseDraft {
    fn schema() -> &'static str {
        PSE_SCHEMA
    }

    fn validate(&self) -> Result<(), String> {
        match self.kt_features.iter().position(|f| f.name.trim().is_empty()) {
            Some(i) => Err(format!("kt_features[{}].name is empty", i)),
            None => Ok(()),
        }
    }
}

impl PseDraft {
    /// Trim, drop empties and cap; the audit block is left to the caller
    pub fn into_matrix(self, max_items: usize, max_features: usize) -> PseMatrix {
        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(max_items)
                .collect()
        };

        let kt_features = self
            .kt_features
            .into_iter()
            .map(|f| {
                let name = f.name.trim().to_string();
                let description = match f.description.trim() {
                    "" => format!("技术特征：{}", name),
                    d => d.to_string(),
                };
                let category = match f.category.trim() {
                    "" => default_category(),
                    c => c.to_string(),
                };
                TechnicalFeature::new(name, description, category, f.is_essential)
            })
            .take(max_features)
            .collect();

        let mut matrix = PseMatrix {
            problems: clean(self.problems),
            solutions: clean(self.solutions),
            effects: clean(self.effects),
            kt_features,
            ..Default::default()
        };
        matrix.enforce_caps();
        matrix
    }
}
