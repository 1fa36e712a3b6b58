//! Addressable edit targets inside a patent document

use crate::error::PipelineError;
use scrivener_domain::{Claim, PatentDocument};
use scrivener_generator::strip_dependent_prefix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor recorded when a request names none
pub const DEFAULT_ACTOR: &str = "human_edit";

fn default_actor() -> String {
    DEFAULT_ACTOR.to_string()
}

/// A single-field edit made against a known document version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Section name: `claims`, `abstract`, `specification` or `disclosure`
    pub section: String,

    /// Field inside the section, e.g. `claim:1` or `summary`
    pub target: String,

    /// Replacement text
    pub value: String,

    /// Version the editor based the edit on
    pub if_version: u64,

    /// Who made the edit
    #[serde(default = "default_actor")]
    pub actor: String,
}

impl EditRequest {
    /// Edit by the default actor
    pub fn new(
        section: impl Into<String>,
        target: impl Into<String>,
        value: impl Into<String>,
        if_version: u64,
    ) -> Self {
        Self {
            section: section.into(),
            target: target.into(),
            value: value.into(),
            if_version,
            actor: default_actor(),
        }
    }

    /// Same request with another actor
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }
}

/// Editable field of the specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecificationField {
    /// 技术领域
    TechnicalField,
    /// 背景技术
    BackgroundArt,
    /// 发明内容
    InventionContent,
    /// 具体实施方式
    Embodiments,
}

impl SpecificationField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "technical_field" => Some(Self::TechnicalField),
            "background_art" => Some(Self::BackgroundArt),
            "invention_content" => Some(Self::InventionContent),
            "embodiments" => Some(Self::Embodiments),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::TechnicalField => "technical_field",
            Self::BackgroundArt => "background_art",
            Self::InventionContent => "invention_content",
            Self::Embodiments => "embodiments",
        }
    }
}

/// A resolved `section` + `target` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Claim by number
    Claim(u32),
    /// Abstract summary
    AbstractSummary,
    /// One specification field
    Specification(SpecificationField),
    /// Disclosure detailed description
    DisclosureDescription,
}

impl EditTarget {
    /// Resolve a section and target name
    pub fn parse(section: &str, target: &str) -> Result<Self, PipelineError> {
        let section = section.trim();
        let target = target.trim();
        let resolved = match section {
            "claims" => target
                .strip_prefix("claim:")
                .and_then(|n| n.trim().parse::<u32>().ok())
                .filter(|n| *n > 0)
                .map(Self::Claim),
            "abstract" if target == "summary" => Some(Self::AbstractSummary),
            "specification" => SpecificationField::parse(target).map(Self::Specification),
            "disclosure" if target == "detailed_description" => Some(Self::DisclosureDescription),
            _ => None,
        };
        resolved.ok_or_else(|| PipelineError::InvalidEdit(format!("unknown target {}:{}", section, target)))
    }

    /// Owning section name
    pub fn section(&self) -> &'static str {
        match self {
            Self::Claim(_) => "claims",
            Self::AbstractSummary => "abstract",
            Self::Specification(_) => "specification",
            Self::DisclosureDescription => "disclosure",
        }
    }

    /// Replace the addressed field and re-render the owning section
    ///
    /// Returns the previous and the new text of the field. The document is
    /// untouched on error.
    pub fn apply(&self, document: &mut PatentDocument, value: &str) -> Result<(String, String), PipelineError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(PipelineError::InvalidEdit(format!("empty value for {}", self)));
        }

        match *self {
            Self::Claim(number) => {
                let claims = document.claims.as_mut().ok_or_else(|| missing("claims"))?;
                let claim = claims
                    .get_mut(number)
                    .ok_or_else(|| PipelineError::InvalidEdit(format!("claim {} not found", number)))?;
                let old = claim.text();
                match &mut *claim {
                    // Whole wording lives in the preamble, as for model-written claims
                    Claim::Independent(c) => {
                        c.preamble = value.to_string();
                        c.transition.clear();
                        c.body.clear();
                    }
                    Claim::Dependent(c) => {
                        let wording = strip_dependent_prefix(value);
                        if wording.is_empty() {
                            return Err(PipelineError::InvalidEdit(format!(
                                "claim {} has no wording beyond its parent reference",
                                number
                            )));
                        }
                        c.additional_features = wording;
                    }
                }
                let new = claim.text();
                claims.content = claims.render();
                Ok((old, new))
            }
            Self::AbstractSummary => {
                let section = document.abstract_section.as_mut().ok_or_else(|| missing("abstract"))?;
                let old = std::mem::replace(&mut section.summary, value.to_string());
                section.content = section.render();
                Ok((old, value.to_string()))
            }
            Self::Specification(field) => {
                let spec = document.specification.as_mut().ok_or_else(|| missing("specification"))?;
                let slot = match field {
                    SpecificationField::TechnicalField => &mut spec.technical_field,
                    SpecificationField::BackgroundArt => &mut spec.background_art,
                    SpecificationField::InventionContent => &mut spec.invention_content,
                    SpecificationField::Embodiments => &mut spec.embodiments,
                };
                let old = std::mem::replace(slot, value.to_string());
                spec.content = spec.render();
                Ok((old, value.to_string()))
            }
            Self::DisclosureDescription => {
                let disclosure = document.disclosure.as_mut().ok_or_else(|| missing("disclosure"))?;
                let old = std::mem::replace(&mut disclosure.detailed_description, value.to_string());
                disclosure.content = disclosure.render();
                Ok((old, value.to_string()))
            }
        }
    }
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claim(n) => write!(f, "claims:claim:{}", n),
            Self::AbstractSummary => write!(f, "abstract:summary"),
            Self::Specification(field) => write!(f, "specification:{}", field.as_str()),
            Self::DisclosureDescription => write!(f, "disclosure:detailed_description"),
        }
    }
}

fn missing(section: &str) -> PipelineError {
    PipelineError::InvalidEdit(format!("{} section missing", section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::{Abstract, Claims, DependentClaim, IndependentClaim, Metadata, Specification};

    fn document() -> PatentDocument {
        let mut doc = PatentDocument::new(Metadata::new("一种缓存装置", "数据存储"));
        let mut claims = Claims {
            items: vec![
                Claim::Independent(IndependentClaim {
                    number: 1,
                    preamble: "一种缓存装置，".to_string(),
                    transition: "其特征在于，包括：".to_string(),
                    body: "存储单元。".to_string(),
                    features: vec![],
                }),
                Claim::Dependent(DependentClaim {
                    number: 2,
                    parent: 1,
                    additional_features: "缓存装置，还包括索引单元。".to_string(),
                    features: vec![],
                }),
            ],
            content: String::new(),
        };
        claims.content = claims.render();
        doc.claims = Some(claims);
        doc.specification = Some(Specification {
            technical_field: "本发明涉及数据存储。".to_string(),
            ..Default::default()
        });
        doc
    }

    #[test]
    fn test_parse_targets() {
        assert_eq!(EditTarget::parse("claims", "claim:3").unwrap(), EditTarget::Claim(3));
        assert_eq!(EditTarget::parse("abstract", "summary").unwrap(), EditTarget::AbstractSummary);
        assert_eq!(
            EditTarget::parse("specification", "background_art").unwrap(),
            EditTarget::Specification(SpecificationField::BackgroundArt)
        );
        assert_eq!(
            EditTarget::parse("disclosure", "detailed_description").unwrap(),
            EditTarget::DisclosureDescription
        );
    }

    #[test]
    fn test_parse_rejects_unknown_targets() {
        for (section, target) in [
            ("claims", "claim:0"),
            ("claims", "claim:x"),
            ("claims", "1"),
            ("abstract", "title"),
            ("specification", "content"),
            ("metadata", "title"),
        ] {
            assert!(
                matches!(EditTarget::parse(section, target), Err(PipelineError::InvalidEdit(_))),
                "{}:{} should be rejected",
                section,
                target
            );
        }
    }

    #[test]
    fn test_display_names_section_and_field() {
        assert_eq!(EditTarget::Claim(2).to_string(), "claims:claim:2");
        assert_eq!(
            EditTarget::Specification(SpecificationField::Embodiments).to_string(),
            "specification:embodiments"
        );
    }

    #[test]
    fn test_edit_independent_claim() {
        let mut doc = document();
        let (old, new) = EditTarget::Claim(1)
            .apply(&mut doc, "一种缓存装置，包括存储单元和淘汰单元。")
            .unwrap();
        assert_eq!(old, "一种缓存装置， 其特征在于，包括： 存储单元。");
        assert_eq!(new, "一种缓存装置，包括存储单元和淘汰单元。");

        let claims = doc.claims.unwrap();
        assert_eq!(claims.get(1).unwrap().text(), "一种缓存装置，包括存储单元和淘汰单元。");
        assert!(claims.content.contains("权利要求1：\n一种缓存装置，包括存储单元和淘汰单元。"));
    }

    #[test]
    fn test_edit_dependent_claim_strips_parent_reference() {
        let mut doc = document();
        let (_, new) = EditTarget::Claim(2)
            .apply(&mut doc, "根据权利要求1所述的缓存装置，还包括压缩单元。")
            .unwrap();
        assert_eq!(new, "缓存装置，还包括压缩单元。");
        let claims = doc.claims.unwrap();
        assert_eq!(claims.get(2).unwrap().text(), "缓存装置，还包括压缩单元。");
        assert_eq!(claims.content.matches("根据权利要求1所述的").count(), 1);
    }

    #[test]
    fn test_edit_specification_field_rerenders() {
        let mut doc = document();
        let (old, _) = EditTarget::Specification(SpecificationField::TechnicalField)
            .apply(&mut doc, "本发明涉及分布式缓存。")
            .unwrap();
        assert_eq!(old, "本发明涉及数据存储。");
        assert!(doc
            .specification
            .unwrap()
            .content
            .contains("技术领域\n本发明涉及分布式缓存。"));
    }

    #[test]
    fn test_edit_abstract_summary() {
        let mut doc = document();
        doc.abstract_section = Some(Abstract {
            summary: "旧摘要".to_string(),
            ..Default::default()
        });
        let (old, new) = EditTarget::AbstractSummary.apply(&mut doc, "  新摘要 ").unwrap();
        assert_eq!(old, "旧摘要");
        assert_eq!(new, "新摘要");
        assert!(doc.abstract_section.unwrap().content.contains("新摘要"));
    }

    #[test]
    fn test_invalid_edits_leave_document_unchanged() {
        let mut doc = document();
        let before = doc.clone();
        assert!(EditTarget::Claim(9).apply(&mut doc, "文本").is_err());
        assert!(EditTarget::Claim(1).apply(&mut doc, "   ").is_err());
        assert!(EditTarget::Claim(2).apply(&mut doc, "根据权利要求1所述的").is_err());
        assert!(EditTarget::AbstractSummary.apply(&mut doc, "新摘要").is_err());
        assert!(EditTarget::DisclosureDescription.apply(&mut doc, "描述").is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_request_defaults_actor() {
        let request: EditRequest =
            serde_json::from_str(r#"{"section":"claims","target":"claim:1","value":"x","if_version":2}"#).unwrap();
        assert_eq!(request.actor, DEFAULT_ACTOR);
        assert_eq!(request, EditRequest::new("claims", "claim:1", "x", 2));
    }
}
