//! Claim module - the independent/dependent claim tree

use crate::feature::TechnicalFeature;
use serde::{Deserialize, Serialize};

/// Default transition phrase between preamble and body
pub const DEFAULT_TRANSITION: &str = "其特征在于";

/// The independent claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndependentClaim {
    /// Claim number (normally 1)
    pub number: u32,

    /// Preamble, e.g. "一种自然语言处理技术，"
    pub preamble: String,

    /// Transition phrase, usually [`DEFAULT_TRANSITION`]
    #[serde(default)]
    pub transition: String,

    /// Claim body
    #[serde(default)]
    pub body: String,

    /// Features recited by the claim
    #[serde(default)]
    pub features: Vec<TechnicalFeature>,
}

/// A claim depending on a lower-numbered parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentClaim {
    /// Claim number
    pub number: u32,

    /// Parent claim number
    pub parent: u32,

    /// Additional limitation, stored without the "根据权利要求N所述的" prefix
    pub additional_features: String,

    /// Features recited by the claim
    #[serde(default)]
    pub features: Vec<TechnicalFeature>,
}

/// A single claim
///
/// Rendering and gating always dispatch on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Claim {
    /// The independent claim
    Independent(IndependentClaim),
    /// A dependent claim
    Dependent(DependentClaim),
}

impl Claim {
    /// Claim number
    pub fn number(&self) -> u32 {
        match self {
            Claim::Independent(c) => c.number,
            Claim::Dependent(c) => c.number,
        }
    }

    /// Features recited by this claim
    pub fn features(&self) -> &[TechnicalFeature] {
        match self {
            Claim::Independent(c) => &c.features,
            Claim::Dependent(c) => &c.features,
        }
    }

    /// Claim wording without numbering or parent reference
    ///
    /// Independent parts are joined with single spaces, skipping empty parts.
    pub fn text(&self) -> String {
        match self {
            Claim::Independent(c) => [c.preamble.trim(), c.transition.trim(), c.body.trim()]
                .iter()
                .filter(|p| !p.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" "),
            Claim::Dependent(c) => c.additional_features.trim().to_string(),
        }
    }

    /// Numbered one-line rendering, e.g. `2. 根据权利要求1所述的...`
    pub fn numbered(&self) -> String {
        match self {
            Claim::Independent(c) => format!(
                "{}. {} {} {}",
                c.number, c.preamble, c.transition, c.body
            ),
            Claim::Dependent(c) => format!(
                "{}. 根据权利要求{}所述的{}",
                c.number, c.parent, c.additional_features
            ),
        }
    }
}

/// The claims section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Claims in document order
    #[serde(default)]
    pub items: Vec<Claim>,

    /// Rendered claims text
    #[serde(default)]
    pub content: String,
}

impl Claims {
    /// Independent claims in order
    pub fn independent(&self) -> impl Iterator<Item = &IndependentClaim> {
        self.items.iter().filter_map(|c| match c {
            Claim::Independent(i) => Some(i),
            Claim::Dependent(_) => None,
        })
    }

    /// Dependent claims in order
    pub fn dependent(&self) -> impl Iterator<Item = &DependentClaim> {
        self.items.iter().filter_map(|c| match c {
            Claim::Dependent(d) => Some(d),
            Claim::Independent(_) => None,
        })
    }

    /// Find a claim by number
    pub fn get(&self, number: u32) -> Option<&Claim> {
        self.items.iter().find(|c| c.number() == number)
    }

    /// Find a claim by number for editing
    pub fn get_mut(&mut self, number: u32) -> Option<&mut Claim> {
        self.items.iter_mut().find(|c| c.number() == number)
    }

    /// Render claims text from the structured items
    ///
    /// Dependent wording that already starts with a parent reference is kept
    /// as-is so the reference is never duplicated.
    pub fn render(&self) -> String {
        let mut lines = vec!["权利要求书".to_string(), String::new()];
        for claim in &self.items {
            lines.push(format!("权利要求{}：", claim.number()));
            match claim {
                Claim::Independent(c) => {
                    lines.push(format!("{}{}{}", c.preamble.trim(), c.transition.trim(), c.body.trim()));
                }
                Claim::Dependent(c) => {
                    let text = c.additional_features.trim();
                    if has_parent_reference(text) {
                        lines.push(text.to_string());
                    } else {
                        lines.push(format!("根据权利要求{}所述的{}", c.parent, text));
                    }
                }
            }
            lines.push(String::new());
        }
        format!("{}\n", lines.join("\n").trim())
    }
}

/// Whether dependent wording already names its parent claim
pub fn has_parent_reference(text: &str) -> bool {
    text.starts_with("根据权利要求") || text.starts_with("依照权利要求")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Claims {
        Claims {
            items: vec![
                Claim::Independent(IndependentClaim {
                    number: 1,
                    preamble: "一种数据处理系统，".to_string(),
                    transition: DEFAULT_TRANSITION.to_string(),
                    body: "包括解析模块。".to_string(),
                    features: vec![],
                }),
                Claim::Dependent(DependentClaim {
                    number: 2,
                    parent: 1,
                    additional_features: "系统还包括缓存单元".to_string(),
                    features: vec![],
                }),
                Claim::Dependent(DependentClaim {
                    number: 3,
                    parent: 1,
                    additional_features: "根据权利要求1所述的系统，还包括日志单元".to_string(),
                    features: vec![],
                }),
            ],
            content: String::new(),
        }
    }

    #[test]
    fn test_variant_accessors() {
        let claims = sample();
        assert_eq!(claims.independent().count(), 1);
        assert_eq!(claims.dependent().count(), 2);
        assert_eq!(claims.get(2).map(Claim::number), Some(2));
        assert!(claims.get(9).is_none());
    }

    #[test]
    fn test_text_joins_parts() {
        let claims = sample();
        let text = claims.get(1).unwrap().text();
        assert_eq!(text, "一种数据处理系统， 其特征在于 包括解析模块。");
    }

    #[test]
    fn test_render_does_not_duplicate_prefix() {
        let rendered = sample().render();
        assert!(rendered.starts_with("权利要求书\n\n权利要求1：\n一种数据处理系统，其特征在于包括解析模块。"));
        assert!(rendered.contains("根据权利要求1所述的系统还包括缓存单元"));
        assert_eq!(rendered.matches("根据权利要求1所述的系统，还包括日志单元").count(), 1);
        assert!(!rendered.contains("根据权利要求1所述的根据权利要求"));
    }

    #[test]
    fn test_serde_tagging() {
        let claims = sample();
        let value = serde_json::to_value(&claims.items[0]).unwrap();
        assert_eq!(value["kind"], "independent");
        let back: Claim = serde_json::from_value(value).unwrap();
        assert_eq!(back, claims.items[0]);
    }
}
