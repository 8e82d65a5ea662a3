//! Ordered model fallback
//!
//! Remote model names drift and individual versions get overloaded or
//! retired. The chain tries a fixed priority order, one attempt per
//! candidate, strictly sequentially, and stops at the first candidate that
//! yields non-empty text. Sequential trial keeps failure attribution
//! unambiguous and avoids hammering an already rate-limited channel.

use super::{GenerationPart, GenerationRequest, GenerationService};
use crate::{Error, Result};

/// Priority order: the fast current-generation model first, its heavier
/// sibling second, the previous generation as a last resort.
pub const DEFAULT_MODEL_CANDIDATES: &[&str] = &[
    "models/gemini-2.5-flash",
    "models/gemini-2.5-pro",
    "models/gemini-2.0-flash",
];

const PROBE_PROMPT: &str = "Say hello";
const PROBE_TEMPERATURE: f32 = 0.1;
const PROBE_MAX_OUTPUT_TOKENS: u32 = 50;

/// A successful chain run: which candidate answered, and with what text.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub model: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct FallbackChain {
    candidates: Vec<String>,
}

impl FallbackChain {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    pub fn gemini_defaults() -> Self {
        Self::new(
            DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        )
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Connectivity probe: a trivial generation call walked down the chain.
    /// Returns the first candidate that answered with any text, or `None`
    /// when the whole chain is unreachable.
    pub async fn probe(&self, service: &dyn GenerationService) -> Option<String> {
        match self.run(service, &probe_request()).await {
            Ok(outcome) => {
                tracing::info!(model = %outcome.model, "connectivity probe succeeded");
                Some(outcome.model)
            }
            Err(error) => {
                tracing::warn!("connectivity probe failed: {error}");
                None
            }
        }
    }

    /// Walks the candidates in priority order with one attempt each. A
    /// candidate is skipped on any error or on empty text; the first
    /// non-empty answer wins. Exhaustion is `NoWorkingModel`; the
    /// per-candidate failures stay in the logs.
    pub async fn run(
        &self,
        service: &dyn GenerationService,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome> {
        for model in &self.candidates {
            tracing::debug!(model = %model, "trying model candidate");
            match service.generate(model, request).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!(model = %model, "model candidate answered");
                    return Ok(GenerationOutcome {
                        model: model.clone(),
                        text,
                    });
                }
                Ok(_) => {
                    tracing::warn!(model = %model, "model candidate returned empty text, advancing");
                }
                Err(error) => {
                    tracing::warn!(model = %model, "model candidate failed, advancing: {error}");
                }
            }
        }

        Err(Error::NoWorkingModel)
    }
}

fn probe_request() -> GenerationRequest {
    GenerationRequest::new(vec![GenerationPart::Text(PROBE_PROMPT.to_string())])
        .with_temperature(PROBE_TEMPERATURE)
        .with_max_output_tokens(PROBE_MAX_OUTPUT_TOKENS)
}
