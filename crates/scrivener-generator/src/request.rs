//! Generation input

use serde::{Deserialize, Serialize};

/// Draft inputs for one patent package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Title of the invention
    pub title: String,

    /// Technical field
    pub technical_field: String,

    /// Background art as drafted
    #[serde(default)]
    pub background: String,

    /// Invention content as drafted
    #[serde(default)]
    pub invention_content: String,

    /// Embodiments as drafted
    #[serde(default)]
    pub embodiments: String,

    /// Optional drawings description
    #[serde(default)]
    pub drawings_description: Option<String>,
}

impl GenerationRequest {
    /// Labelled draft text fed to the extractor
    pub fn draft_text(&self) -> String {
        format!(
            "发明名称：{}\n技术领域：{}\n背景技术：{}\n发明内容：{}\n具体实施方式：{}\n",
            self.title, self.technical_field, self.background, self.invention_content, self.embodiments
        )
    }
}
