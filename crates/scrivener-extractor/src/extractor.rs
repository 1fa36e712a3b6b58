//! Core PSE extractor

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::PseDraft;
use crate::prompt::PromptBuilder;
use crate::rules::RuleExtractor;
use crate::text::{char_len, normalize};
use scrivener_domain::traits::LlmProvider;
use scrivener_domain::{ExtractionAudit, FallbackReason, GenerationSource, PseMatrix};
use scrivener_llm::{new_trace_id, TextGenerator};
use std::fmt::Display;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns a free-text invention disclosure into a [`PseMatrix`]
///
/// The model path is tried first; any failure (not configured, timeout,
/// invalid output) falls back to [`RuleExtractor`]. [`extract`](Self::extract)
/// never fails.
pub struct PseExtractor<L> {
    generator: TextGenerator<L>,
    rules: RuleExtractor,
    config: ExtractorConfig,
}

impl<L> PseExtractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a new extractor
    pub fn new(generator: TextGenerator<L>, config: ExtractorConfig) -> Self {
        let rules = RuleExtractor::new(config.max_items, config.max_features, config.dedupe_threshold);
        Self {
            generator,
            rules,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a matrix with a populated audit block
    pub async fn extract(&self, text: &str) -> PseMatrix {
        let clean = normalize(text);
        info!("Starting PSE extraction, cleaned length {}", char_len(&clean));

        if clean.is_empty() {
            return self.extract_with_rules(&clean, FallbackReason::EmptyText);
        }
        if self.config.force_rules {
            return self.extract_with_rules(&clean, FallbackReason::ForcedRules);
        }

        match self.extract_with_model(&clean).await {
            Ok(matrix) => {
                info!(
                    "Model extraction complete: {} problems, {} solutions, {} effects, {} features",
                    matrix.problems.len(),
                    matrix.solutions.len(),
                    matrix.effects.len(),
                    matrix.kt_features.len()
                );
                matrix
            }
            Err(e) => {
                warn!("Model extraction failed, falling back to rules: {}", e);
                self.extract_with_rules(&clean, FallbackReason::ModelUnavailableOrInvalid)
            }
        }
    }

    /// Deterministic extraction over already-normalized text
    pub fn extract_with_rules(&self, clean: &str, reason: FallbackReason) -> PseMatrix {
        let mut matrix = self.rules.extract(clean);
        let ktf_index = std::mem::take(&mut matrix.audit.ktf_index);
        matrix.audit = ExtractionAudit {
            extraction_source: GenerationSource::Rules,
            fallback_reason: Some(reason),
            trace_id: new_trace_id(),
            llm: self.generator.meta(),
            ktf_index,
        };
        info!(
            "Rule extraction complete ({}): {} problems, {} solutions, {} effects, {} features",
            reason,
            matrix.problems.len(),
            matrix.solutions.len(),
            matrix.effects.len(),
            matrix.kt_features.len()
        );
        matrix
    }

    async fn extract_with_model(&self, clean: &str) -> Result<PseMatrix, ExtractorError> {
        if !self.generator.is_configured() {
            return Err(FallbackReason::ModelUnavailableOrInvalid.into());
        }

        let prompt = PromptBuilder::new(clean)
            .with_max_items(self.config.max_items)
            .build();
        debug!("Prompt length: {} chars", prompt.len());

        let generator = self.generator.clone();
        let retries = self.config.structured_retries;
        // Provider calls are blocking
        let task = tokio::task::spawn_blocking(move || {
            generator.generate_structured::<PseDraft>(&prompt, retries)
        });
        let generated = timeout(self.config.llm_timeout(), task)
            .await
            .map_err(|_| ExtractorError::Timeout(self.config.llm_timeout_secs))?
            .map_err(|e| ExtractorError::Join(e.to_string()))??;

        let mut matrix = generated
            .value
            .into_matrix(self.config.max_items, self.config.max_features);
        let ktf_index = std::mem::take(&mut matrix.audit.ktf_index);
        matrix.audit = ExtractionAudit {
            extraction_source: GenerationSource::Model,
            fallback_reason: None,
            trace_id: generated.trace_id,
            llm: self.generator.meta(),
            ktf_index,
        };
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_llm::{LlmConfig, MockProvider};

    fn extractor(provider: MockProvider, llm: LlmConfig, config: ExtractorConfig) -> PseExtractor<MockProvider> {
        PseExtractor::new(TextGenerator::new(provider, llm), config)
    }

    fn configured() -> LlmConfig {
        LlmConfig::new("k", "http://mock.local/v1", "mock")
    }

    #[tokio::test]
    async fn test_empty_text_uses_rules() {
        let provider = MockProvider::default();
        let ex = extractor(provider.clone(), configured(), ExtractorConfig::default());
        let matrix = ex.extract("  \n\t ").await;
        assert_eq!(matrix.audit.extraction_source, GenerationSource::Rules);
        assert_eq!(matrix.audit.fallback_reason, Some(FallbackReason::EmptyText));
        assert!(matrix.problems.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_forced_rules_skip_model() {
        let provider = MockProvider::default();
        let ex = extractor(provider.clone(), configured(), ExtractorConfig::rules_only());
        let matrix = ex.extract("现有系统存在检索效率低下的严重问题。").await;
        assert_eq!(matrix.audit.fallback_reason, Some(FallbackReason::ForcedRules));
        assert_eq!(provider.call_count(), 0);
        assert!(!matrix.audit.trace_id.is_empty());
    }

    #[tokio::test]
    async fn test_model_success() {
        let provider = MockProvider::new(
            r#"{"problems":["延迟高"],"solutions":["引入缓存"],"effects":["降低延迟"],
                "kt_features":[{"name":"缓存模块","description":"存储热点数据","is_essential":true}]}"#,
        );
        let ex = extractor(provider, configured(), ExtractorConfig::default());
        let matrix = ex.extract("一种缓存装置。").await;
        assert_eq!(matrix.audit.extraction_source, GenerationSource::Model);
        assert_eq!(matrix.audit.fallback_reason, None);
        assert_eq!(matrix.audit.ktf_index.get("F1"), Some("缓存模块"));
        assert_eq!(matrix.audit.llm.model, "mock");
    }

    #[tokio::test]
    async fn test_invalid_model_output_falls_back() {
        let ex = extractor(MockProvider::new("not json"), configured(), ExtractorConfig::default());
        let matrix = ex.extract("现有系统存在检索效率低下的严重问题。").await;
        assert_eq!(matrix.audit.extraction_source, GenerationSource::Rules);
        assert_eq!(
            matrix.audit.fallback_reason,
            Some(FallbackReason::ModelUnavailableOrInvalid)
        );
    }

    #[tokio::test]
    async fn test_unconfigured_falls_back() {
        let provider = MockProvider::default();
        let ex = extractor(provider.clone(), LlmConfig::disabled(), ExtractorConfig::default());
        let matrix = ex.extract("一种足够长的测试文本内容。").await;
        assert_eq!(
            matrix.audit.fallback_reason,
            Some(FallbackReason::ModelUnavailableOrInvalid)
        );
        assert!(!matrix.audit.llm.configured);
        assert_eq!(provider.call_count(), 0);
    }
}
