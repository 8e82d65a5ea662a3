//! Analysis orchestration: the pipeline behind `probe_connectivity` and
//! `analyze`.
//!
//! Each run is strictly sequential: validate the request, encode files,
//! compose the prompt, walk the model fallback chain, then extract and
//! validate the report. No two remote calls are ever in flight at once and
//! no state survives between runs.

use crate::ai::{FallbackChain, GeminiClient, GenerationPart, GenerationRequest, GenerationService};
use crate::models::{AnalysisModule, AnalysisRequest, AnalysisResult, Config};
use crate::{encode, extract, prompts, schema};
use crate::{Error, Result};
use tracing::info;
use uuid::Uuid;

/// Coordinates input encoding, prompt composition, model fallback, and
/// response validation for one analysis request at a time.
pub struct Analyzer {
    generation: Box<dyn GenerationService>,
    chain: FallbackChain,
}

impl Analyzer {
    /// Build an analyzer from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_services(generation: Box<dyn GenerationService>, chain: FallbackChain) -> Self {
        Self { generation, chain }
    }

    /// Build an analyzer from resolved configuration. The credential was
    /// validated when the config was loaded; no further environment access
    /// happens here.
    pub fn from_config(config: &Config) -> Self {
        Self::with_services(
            Box::new(GeminiClient::new(config.gemini_api_key.clone())),
            FallbackChain::new(config.model_candidates.clone()),
        )
    }

    /// Construct an analyzer from environment configuration
    /// (`Config::from_env`). A missing or malformed credential fails here,
    /// before any network call.
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        Ok(Self::from_config(&config))
    }

    /// True when at least one model candidate answers a trivial generation
    /// call. Drives an online/offline indicator; never blocks `analyze`.
    pub async fn probe_connectivity(&self) -> bool {
        self.chain.probe(self.generation.as_ref()).await.is_some()
    }

    /// Runs one analysis to completion. Fails with exactly one classified
    /// error; never returns a partially-filled report.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            module = request.module.as_str(),
            language = %request.language,
            jurisdiction = %request.jurisdiction,
            files = request.files.len(),
            has_url = request.url_input.is_some(),
            "starting analysis"
        );

        let url_input = normalized_url(request);
        validate_request(request, url_input)?;

        let mut parts = encode::to_parts(&request.files)?;
        let prompt = prompts::compose(
            request.module,
            &request.language,
            &request.jurisdiction,
            url_input,
        );
        parts.push(GenerationPart::Text(prompt));

        let mut generation_request = GenerationRequest::new(parts);
        if request.module == AnalysisModule::Contract {
            generation_request =
                generation_request.with_schema(schema::contract_response_schema());
        }

        let outcome = self
            .chain
            .run(self.generation.as_ref(), &generation_request)
            .await?;
        info!(
            %run_id,
            model = %outcome.model,
            response_chars = outcome.text.len(),
            "model answered, validating response"
        );

        let report = extract::extract_and_validate(&outcome.text, request.module)?;
        info!(%run_id, "analysis complete");
        Ok(report)
    }
}

/// A blank URL counts as absent, matching how callers clear the field.
fn normalized_url(request: &AnalysisRequest) -> Option<&str> {
    request
        .url_input
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
}

/// Rejects ambiguous requests up front rather than silently preferring one
/// input: files and a URL are mutually exclusive, an empty request has
/// nothing to analyze, and link mode belongs to the scam module.
fn validate_request(request: &AnalysisRequest, url_input: Option<&str>) -> Result<()> {
    let has_files = !request.files.is_empty();
    let has_url = url_input.is_some();

    if has_files && has_url {
        return Err(Error::BadRequest(
            "a request may carry files or a URL, not both".to_string(),
        ));
    }
    if !has_files && !has_url {
        return Err(Error::BadRequest(
            "nothing to analyze: no files and no URL".to_string(),
        ));
    }
    if has_url && request.module == AnalysisModule::Contract {
        return Err(Error::BadRequest(
            "URL input is only supported by the scam module".to_string(),
        ));
    }

    Ok(())
}
