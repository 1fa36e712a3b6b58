//! Technical features and the problem/solution/effect matrix

use crate::audit::ExtractionAudit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of problems, solutions or effects kept in a matrix
pub const MAX_PSE_ITEMS: usize = 5;

/// Maximum number of key technical features kept in a matrix
pub const MAX_FEATURES: usize = 20;

/// A key technical feature of the invention
///
/// Features are immutable once attached to a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalFeature {
    /// Short feature name, e.g. "解析模块"
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Free-form category ("technical_feature", "technical_term", ...)
    #[serde(default)]
    pub category: String,

    /// Whether the feature is essential to the independent claim
    #[serde(default)]
    pub is_essential: bool,

    /// Reference keys or source locations supporting this feature
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

impl TechnicalFeature {
    /// Create a new feature without references
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        is_essential: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            is_essential,
            references: Vec::new(),
        }
    }
}

/// Mapping of stable reference keys (`F1`, `F2`, ...) to feature names
///
/// Stored as a map for JSON compatibility; [`KtfIndex::entries`] returns the
/// keys in numeric order so `F10` sorts after `F9`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KtfIndex(BTreeMap<String, String>);

impl KtfIndex {
    /// Build an index from features in order, skipping blank names
    pub fn from_features(features: &[TechnicalFeature]) -> Self {
        let mut map = BTreeMap::new();
        for (i, feature) in features.iter().enumerate() {
            let name = feature.name.trim();
            if !name.is_empty() {
                map.insert(format!("F{}", i + 1), name.to_string());
            }
        }
        Self(map)
    }

    /// Entries ordered by the numeric part of their key
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_by_key(|(k, _)| (key_number(k), k.to_string()));
        entries
    }

    /// Whether a reference key is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Feature name for a reference key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of indexed features
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, name: impl Into<String>) {
        self.0.insert(key.into(), name.into());
    }
}

fn key_number(key: &str) -> u64 {
    key.trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .unwrap_or(u64::MAX)
}

/// Problem/solution/effect matrix with key technical features
///
/// Created once per run by the extractor; read-only thereafter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PseMatrix {
    /// Technical problems, at most [`MAX_PSE_ITEMS`]
    #[serde(default)]
    pub problems: Vec<String>,

    /// Technical solutions, at most [`MAX_PSE_ITEMS`]
    #[serde(default)]
    pub solutions: Vec<String>,

    /// Technical effects, at most [`MAX_PSE_ITEMS`]
    #[serde(default)]
    pub effects: Vec<String>,

    /// Key technical features, at most [`MAX_FEATURES`]
    #[serde(default)]
    pub kt_features: Vec<TechnicalFeature>,

    /// How this matrix was produced
    #[serde(default)]
    pub audit: ExtractionAudit,
}

impl PseMatrix {
    /// Feature index from the audit block, or rebuilt from feature order
    pub fn ktf_index(&self) -> KtfIndex {
        if !self.audit.ktf_index.is_empty() {
            return self.audit.ktf_index.clone();
        }
        KtfIndex::from_features(&self.kt_features)
    }

    /// Truncate every list to its cap and refresh the feature index
    pub fn enforce_caps(&mut self) {
        self.problems.truncate(MAX_PSE_ITEMS);
        self.solutions.truncate(MAX_PSE_ITEMS);
        self.effects.truncate(MAX_PSE_ITEMS);
        self.kt_features.truncate(MAX_FEATURES);
        self.audit.ktf_index = KtfIndex::from_features(&self.kt_features);
    }
}
