//! Core patent package generator

use crate::claims::{collect_features, from_contract, from_rules, ClaimsDraft};
use crate::config::GeneratorConfig;
use crate::contract::{AbstractContract, ClaimsContract};
use crate::error::GeneratorError;
use crate::prompt::{abstract_prompt, claims_prompt};
use crate::request::GenerationRequest;
use crate::summary::rule_summary;
use crate::templates::{build_disclosure, build_specification};
use scrivener_domain::traits::LlmProvider;
use scrivener_domain::{
    Abstract, Claims, FallbackReason, GenerationAudit, GenerationSource, Metadata, PatentDocument, PseMatrix,
    StepAudit,
};
use scrivener_llm::{new_trace_id, Generated, StructuredContract, TextGenerator};
use std::fmt::Display;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Produces the four-part patent package from draft fields
///
/// Specification and disclosure are always template-assembled. Claims and
/// abstract try the grounded model protocol first and fall back to rules on
/// any failure; each step records a [`StepAudit`]. [`generate`](Self::generate)
/// never fails.
pub struct PatentGenerator<L> {
    generator: TextGenerator<L>,
    config: GeneratorConfig,
}

impl<L> PatentGenerator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a new generator
    pub fn new(generator: TextGenerator<L>, config: GeneratorConfig) -> Self {
        Self { generator, config }
    }

    /// The active configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the full package and its generation audit
    ///
    /// The audit is also merged into `document.audit.generation`.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        pse: Option<&PseMatrix>,
    ) -> (PatentDocument, GenerationAudit) {
        info!("Generating patent package for '{}'", request.title);

        let (claims, claims_audit) = self.generate_claims(request, pse).await;
        let (abstract_section, abstract_audit) = self.generate_abstract(request).await;
        let audit = GenerationAudit {
            claims: Some(claims_audit),
            abstract_step: Some(abstract_audit),
        };

        let mut document = PatentDocument::new(Metadata::new(&request.title, &request.technical_field));
        document.specification = Some(build_specification(request));
        document.claims = Some(claims);
        document.abstract_section = Some(abstract_section);
        document.disclosure = Some(build_disclosure(&request.embodiments, pse));
        document.pse_matrix = pse.cloned();
        document.audit.generation = audit.clone();

        info!(
            "Generation complete: claims via {}, abstract via {}",
            source_of(&audit.claims),
            source_of(&audit.abstract_step)
        );
        (document, audit)
    }

    /// Claims via the grounded protocol, or rules
    pub async fn generate_claims(&self, request: &GenerationRequest, pse: Option<&PseMatrix>) -> (Claims, StepAudit) {
        if self.config.force_rules {
            return self.rule_claims(request, pse, FallbackReason::ForcedRules);
        }
        match self.claims_with_model(request, pse).await {
            Ok((draft, trace_id)) => {
                info!("Model claims: {} items", draft.claims.items.len());
                let audit = StepAudit {
                    source: GenerationSource::Model,
                    trace_id,
                    llm: self.generator.meta(),
                    fallback_reason: None,
                    term_map: draft.term_map,
                    feature_refs_by_claim: draft.feature_refs_by_claim,
                };
                (draft.claims, audit)
            }
            Err(e) => {
                warn!("Claims generation failed, falling back to rules: {}", e);
                self.rule_claims(request, pse, FallbackReason::ModelUnavailableOrInvalid)
            }
        }
    }

    /// Abstract via the grounded protocol, or a truncated summary
    pub async fn generate_abstract(&self, request: &GenerationRequest) -> (Abstract, StepAudit) {
        if self.config.force_rules {
            return self.rule_abstract(request, FallbackReason::ForcedRules);
        }
        let prompt = abstract_prompt(request);
        match self
            .call_model::<AbstractContract>(prompt, self.config.abstract_retries)
            .await
        {
            Ok(generated) => {
                let contract = generated.value;
                let mut section = Abstract {
                    title: request.title.clone(),
                    technical_field: request.technical_field.clone(),
                    summary: contract.summary.trim().to_string(),
                    main_figure_description: contract
                        .main_figure_description
                        .map(|d| d.trim().to_string())
                        .filter(|d| !d.is_empty()),
                    content: String::new(),
                };
                section.content = section.render();
                (section, self.model_audit(generated.trace_id))
            }
            Err(e) => {
                warn!("Abstract generation failed, falling back to rules: {}", e);
                self.rule_abstract(request, FallbackReason::ModelUnavailableOrInvalid)
            }
        }
    }

    async fn claims_with_model(
        &self,
        request: &GenerationRequest,
        pse: Option<&PseMatrix>,
    ) -> Result<(ClaimsDraft, String), GeneratorError> {
        let index = pse.map(PseMatrix::ktf_index).unwrap_or_default();
        let features: Vec<(String, String)> = index
            .entries()
            .into_iter()
            .map(|(k, n)| (k.to_string(), n.to_string()))
            .collect();
        let prompt = claims_prompt(request, &features, self.config.max_dependent_claims);

        let generated = self
            .call_model::<ClaimsContract>(prompt, self.config.claims_retries)
            .await?;
        let draft = from_contract(generated.value, pse, self.config.max_dependent_claims);
        Ok((draft, generated.trace_id))
    }

    async fn call_model<T>(&self, prompt: String, retries: u32) -> Result<Generated<T>, GeneratorError>
    where
        T: StructuredContract + Send + 'static,
    {
        if !self.generator.is_configured() {
            return Err(FallbackReason::ModelUnavailableOrInvalid.into());
        }
        debug!("Prompt length: {} chars", prompt.len());

        let generator = self.generator.clone();
        // Provider calls are blocking
        let task = tokio::task::spawn_blocking(move || generator.generate_structured::<T>(&prompt, retries));
        let generated = timeout(self.config.llm_timeout(), task)
            .await
            .map_err(|_| GeneratorError::Timeout(self.config.llm_timeout_secs))?
            .map_err(|e| GeneratorError::Join(e.to_string()))??;
        Ok(generated)
    }

    fn rule_claims(
        &self,
        request: &GenerationRequest,
        pse: Option<&PseMatrix>,
        reason: FallbackReason,
    ) -> (Claims, StepAudit) {
        let features = collect_features(&request.invention_content, pse);
        let draft = from_rules(&request.technical_field, &features);
        info!(
            "Rule claims ({}): {} items from {} features",
            reason,
            draft.claims.items.len(),
            features.len()
        );
        (draft.claims, self.rules_audit(reason))
    }

    fn rule_abstract(&self, request: &GenerationRequest, reason: FallbackReason) -> (Abstract, StepAudit) {
        let mut section = Abstract {
            title: request.title.clone(),
            technical_field: request.technical_field.clone(),
            summary: rule_summary(&request.invention_content),
            main_figure_description: None,
            content: String::new(),
        };
        section.content = section.render();
        info!("Rule abstract ({}): {} chars", reason, section.summary.chars().count());
        (section, self.rules_audit(reason))
    }

    fn model_audit(&self, trace_id: String) -> StepAudit {
        StepAudit {
            source: GenerationSource::Model,
            trace_id,
            llm: self.generator.meta(),
            fallback_reason: None,
            ..Default::default()
        }
    }

    fn rules_audit(&self, reason: FallbackReason) -> StepAudit {
        StepAudit {
            source: GenerationSource::Rules,
            trace_id: new_trace_id(),
            llm: self.generator.meta(),
            fallback_reason: Some(reason),
            ..Default::default()
        }
    }
}

fn source_of(step: &Option<StepAudit>) -> &'static str {
    step.as_ref().map(|s| s.source.as_str()).unwrap_or("none")
}
