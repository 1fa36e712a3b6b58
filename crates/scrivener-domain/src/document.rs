//! The patent document bundle

use crate::audit::DocumentAudit;
use crate::claim::Claims;
use crate::feature::{PseMatrix, TechnicalFeature};
use crate::report::GateOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of patent application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Invention patent
    #[default]
    Invention,
    /// Utility model
    UtilityModel,
    /// Design patent
    Design,
}

fn default_language() -> String {
    "zh-CN".to_string()
}

/// Bibliographic metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Title of the invention
    pub title: String,

    /// Technical field
    pub technical_field: String,

    /// Application type
    #[serde(default)]
    pub document_type: DocumentType,

    /// Document language
    #[serde(default = "default_language")]
    pub language: String,

    /// Application number, once assigned
    #[serde(default)]
    pub application_number: Option<String>,

    /// Applicant name
    #[serde(default)]
    pub applicant: Option<String>,

    /// Inventor names
    #[serde(default)]
    pub inventors: Vec<String>,

    /// Patent agent
    #[serde(default)]
    pub agent: Option<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Metadata {
    /// Metadata for a new invention application
    pub fn new(title: impl Into<String>, technical_field: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            technical_field: technical_field.into(),
            document_type: DocumentType::Invention,
            language: default_language(),
            application_number: None,
            applicant: None,
            inventors: Vec::new(),
            agent: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The specification (说明书)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    /// 技术领域
    pub technical_field: String,
    /// 背景技术
    pub background_art: String,
    /// 发明内容
    pub invention_content: String,
    /// 附图说明
    #[serde(default)]
    pub description_of_drawings: Option<String>,
    /// 具体实施方式
    pub embodiments: String,
    /// Rendered text
    #[serde(default)]
    pub content: String,
}

impl Specification {
    /// Render the specification text from its sections
    pub fn render(&self) -> String {
        let mut text = format!(
            "说明书\n\n技术领域\n{}\n\n背景技术\n{}\n\n发明内容\n{}\n",
            self.technical_field, self.background_art, self.invention_content
        );
        if let Some(drawings) = &self.description_of_drawings {
            text.push_str(&format!("\n附图说明\n{}\n", drawings));
        }
        text.push_str(&format!("\n具体实施方式\n{}\n", self.embodiments));
        text
    }
}

/// The abstract (摘要)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abstract {
    /// Title of the invention
    pub title: String,
    /// Technical field
    pub technical_field: String,
    /// Summary text
    pub summary: String,
    /// Description of the main figure
    #[serde(default)]
    pub main_figure_description: Option<String>,
    /// Rendered text
    #[serde(default)]
    pub content: String,
}

impl Abstract {
    /// Render the abstract text from its fields
    pub fn render(&self) -> String {
        format!(
            "摘要\n\n发明名称：{}\n技术领域：{}\n\n{}\n",
            self.title, self.technical_field, self.summary
        )
    }
}

/// The technical disclosure (具体实施方式)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    /// Detailed description
    pub detailed_description: String,
    /// Worked examples
    #[serde(default)]
    pub examples: Vec<String>,
    /// Drawing references
    #[serde(default)]
    pub drawings: Vec<String>,
    /// Rendered text
    #[serde(default)]
    pub content: String,
}

impl Disclosure {
    /// Render the disclosure text from its parts
    pub fn render(&self) -> String {
        let mut text = format!("具体实施方式\n\n{}\n", self.detailed_description);
        if !self.examples.is_empty() {
            text.push_str("\n实施例\n");
            for (i, example) in self.examples.iter().enumerate() {
                text.push_str(&format!("\n实施例 {}：\n{}\n", i + 1, example));
            }
        }
        if !self.drawings.is_empty() {
            text.push_str("\n附图说明\n");
            for drawing in &self.drawings {
                text.push_str(&format!("\n- {}", drawing));
            }
        }
        text
    }
}

fn default_version() -> u64 {
    1
}

/// A complete patent application package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentDocument {
    /// Bibliographic metadata
    pub metadata: Metadata,

    /// Specification
    #[serde(default)]
    pub specification: Option<Specification>,

    /// Claims
    #[serde(default)]
    pub claims: Option<Claims>,

    /// Abstract
    #[serde(default, rename = "abstract")]
    pub abstract_section: Option<Abstract>,

    /// Disclosure
    #[serde(default)]
    pub disclosure: Option<Disclosure>,

    /// PSE matrix that grounded generation
    #[serde(default)]
    pub pse_matrix: Option<PseMatrix>,

    /// Aggregate quality score of the last gating run
    #[serde(default)]
    pub quality_score: Option<f64>,

    /// Per-gate outcomes of the last gating run
    #[serde(default)]
    pub quality_report: Option<BTreeMap<String, GateOutcome>>,

    /// Provenance
    #[serde(default)]
    pub audit: DocumentAudit,

    /// Version for optimistic locking; bumped by every save
    #[serde(default = "default_version")]
    pub document_version: u64,
}

impl PatentDocument {
    /// An empty document with the given metadata
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            specification: None,
            claims: None,
            abstract_section: None,
            disclosure: None,
            pse_matrix: None,
            quality_score: None,
            quality_report: None,
            audit: DocumentAudit::default(),
            document_version: default_version(),
        }
    }

    /// Every claim as a numbered line
    pub fn all_claim_texts(&self) -> Vec<String> {
        self.claims
            .as_ref()
            .map(|c| c.items.iter().map(|claim| claim.numbered()).collect())
            .unwrap_or_default()
    }

    /// Features from the PSE matrix followed by features recited in claims
    pub fn technical_features(&self) -> Vec<TechnicalFeature> {
        let mut features = Vec::new();
        if let Some(pse) = &self.pse_matrix {
            features.extend(pse.kt_features.iter().cloned());
        }
        if let Some(claims) = &self.claims {
            for claim in &claims.items {
                features.extend(claim.features().iter().cloned());
            }
        }
        features
    }

    /// Markdown rendering for review
    pub fn to_markdown(&self) -> String {
        let mut md = vec![format!("# {}", self.metadata.title), String::new()];

        if let Some(abs) = &self.abstract_section {
            md.push("## 摘要".to_string());
            md.push(format!("**技术领域:** {}", abs.technical_field));
            md.push(format!("**发明名称:** {}", abs.title));
            md.push(String::new());
            md.push(abs.summary.clone());
            if let Some(figure) = &abs.main_figure_description {
                md.push(String::new());
                md.push(format!("**主要附图:** {}", figure));
            }
            md.push(String::new());
        }

        if let Some(spec) = &self.specification {
            md.push("## 说明书".to_string());
            md.push(String::new());
            for (heading, body) in [
                ("技术领域", &spec.technical_field),
                ("背景技术", &spec.background_art),
                ("发明内容", &spec.invention_content),
            ] {
                md.push(format!("### {}", heading));
                md.push(body.clone());
                md.push(String::new());
            }
            if let Some(drawings) = &spec.description_of_drawings {
                md.push("### 附图说明".to_string());
                md.push(drawings.clone());
                md.push(String::new());
            }
            md.push("### 具体实施方式".to_string());
            md.push(spec.embodiments.clone());
            md.push(String::new());
        }

        if let Some(claims) = &self.claims {
            md.push("## 权利要求书".to_string());
            md.push(String::new());
            for claim in &claims.items {
                md.push(format!("**权利要求 {}**", claim.number()));
                match claim {
                    crate::Claim::Independent(c) => {
                        md.push(format!("{} {} {}", c.preamble, c.transition, c.body))
                    }
                    crate::Claim::Dependent(c) => md.push(format!(
                        "根据权利要求{}所述的{}",
                        c.parent, c.additional_features
                    )),
                }
                md.push(String::new());
            }
        }

        if let Some(disclosure) = &self.disclosure {
            md.push("## 具体实施方式".to_string());
            md.push(String::new());
            md.push(disclosure.detailed_description.clone());
            for (i, example) in disclosure.examples.iter().enumerate() {
                md.push(String::new());
                md.push(format!("### 实施例 {}", i + 1));
                md.push(example.clone());
            }
            md.push(String::new());
        }

        md.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{Claim, DependentClaim, IndependentClaim};

    fn doc() -> PatentDocument {
        let mut doc = PatentDocument::new(Metadata::new("一种测试系统", "数据处理"));
        doc.claims = Some(Claims {
            items: vec![
                Claim::Independent(IndependentClaim {
                    number: 1,
                    preamble: "一种测试系统，".to_string(),
                    transition: "其特征在于".to_string(),
                    body: "包括解析模块。".to_string(),
                    features: vec![TechnicalFeature::new("解析模块", "", "", true)],
                }),
                Claim::Dependent(DependentClaim {
                    number: 2,
                    parent: 1,
                    additional_features: "所述系统还包括缓存".to_string(),
                    features: vec![],
                }),
            ],
            content: String::new(),
        });
        doc
    }

    #[test]
    fn test_new_document_starts_at_version_one() {
        assert_eq!(doc().document_version, 1);
    }

    #[test]
    fn test_all_claim_texts() {
        let texts = doc().all_claim_texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("1. 一种测试系统"));
        assert_eq!(texts[1], "2. 根据权利要求1所述的所述系统还包括缓存");
    }

    #[test]
    fn test_technical_features_include_claim_features() {
        assert_eq!(doc().technical_features().len(), 1);
    }

    #[test]
    fn test_markdown_sections() {
        let md = doc().to_markdown();
        assert!(md.starts_with("# 一种测试系统"));
        assert!(md.contains("## 权利要求书"));
        assert!(md.contains("**权利要求 2**"));
    }

    #[test]
    fn test_missing_version_defaults_on_load() {
        let mut value = serde_json::to_value(doc()).unwrap();
        value.as_object_mut().unwrap().remove("document_version");
        let loaded: PatentDocument = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.document_version, 1);
    }

    #[test]
    fn test_abstract_render() {
        let abs = Abstract {
            title: "T".to_string(),
            technical_field: "F".to_string(),
            summary: "S".to_string(),
            main_figure_description: None,
            content: String::new(),
        };
        assert_eq!(abs.render(), "摘要\n\n发明名称：T\n技术领域：F\n\nS\n");
    }
}
