//! Data models and structures
//!
//! Defines the analysis request/result types shared across the pipeline,
//! the fixed machine-readable vocabularies, and process configuration.

use serde::{Deserialize, Serialize};

/// The two supported analysis domains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisModule {
    Contract,
    Scam,
}

impl AnalysisModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisModule::Contract => "contract",
            AnalysisModule::Scam => "scam",
        }
    }
}

/// One user-supplied file: raw bytes plus the media type the caller
/// declared for them, if any.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub bytes: Vec<u8>,
    pub media_type: Option<String>,
}

impl FileInput {
    pub fn new(bytes: Vec<u8>, media_type: Option<String>) -> Self {
        Self { bytes, media_type }
    }
}

/// One user-initiated analysis run. Created fresh per request; nothing is
/// cached or mutated across requests.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub files: Vec<FileInput>,
    pub module: AnalysisModule,
    /// Display name of the output language, e.g. "Spanish", not a code.
    pub language: String,
    /// Display name of the legal/regional context, e.g. "Germany".
    pub jurisdiction: String,
    pub url_input: Option<String>,
}

impl AnalysisRequest {
    pub fn for_files(
        module: AnalysisModule,
        files: Vec<FileInput>,
        language: String,
        jurisdiction: String,
    ) -> Self {
        Self {
            files,
            module,
            language,
            jurisdiction,
            url_input: None,
        }
    }

    /// Link-checking mode; only the scam module accepts a URL.
    pub fn for_url(url: String, language: String, jurisdiction: String) -> Self {
        Self {
            files: Vec::new(),
            module: AnalysisModule::Scam,
            language,
            jurisdiction,
            url_input: Some(url),
        }
    }
}

/// Fixed severity vocabulary for contract findings. Serialized exactly as
/// `High`/`Medium`/`Low` in every output language.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// Fixed verdict vocabulary for scam assessments. Serialized exactly as
/// `SAFE`/`DANGER`/`CAUTION` in every output language; the localized label
/// lives in `verdict_text`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Safe,
    Danger,
    Caution,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardDetails {
    pub plain_english_explanation: String,
    /// Verbatim quote from the source document. Evidentiary text: never
    /// translated, never paraphrased.
    pub exact_quote_citation: String,
    pub suggested_fix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractCard {
    pub id: u32,
    pub short_warning: String,
    pub risk_level: RiskLevel,
    pub risk_level_label: String,
    pub details: CardDetails,
}

/// Interface labels the model localizes alongside the report body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractUiTranslations {
    pub summary_label: String,
    pub risk_score_label: String,
    pub findings_label: String,
    pub explanation_label: String,
    pub evidence_label: String,
    pub advice_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractAnalysis {
    pub summary: String,
    /// Integer score, 0 through 100 inclusive. Out-of-range values fail
    /// validation; they are never clamped.
    pub overall_risk: u32,
    pub cards: Vec<ContractCard>,
    pub ui_translations: ContractUiTranslations,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisualCue {
    pub cue: String,
    pub psychology: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScamUiTranslations {
    pub verdict_label: String,
    pub analysis_label: String,
    pub sources_label: String,
    pub cues_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScamAnalysis {
    pub verdict: Verdict,
    /// Localized human-facing label for `verdict`.
    pub verdict_text: String,
    pub headline: String,
    pub explanation: String,
    pub visual_cues: Vec<VisualCue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceRef>>,
    pub ui_translations: ScamUiTranslations,
}

/// The typed analysis report, discriminated by the wire-level `type` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisResult {
    Contract(ContractAnalysis),
    Scam(ScamAnalysis),
}

impl AnalysisResult {
    /// Which module this report belongs to, read off the discriminator.
    pub fn module(&self) -> AnalysisModule {
        match self {
            AnalysisResult::Contract(_) => AnalysisModule::Contract,
            AnalysisResult::Scam(_) => AnalysisModule::Scam,
        }
    }
}

// Configuration

const MIN_API_KEY_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub model_candidates: Vec<String>,
}

impl Config {
    /// Resolves configuration from the environment once, at process start.
    /// A missing or malformed credential fails here, before any network
    /// call is ever attempted.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| crate::Error::Auth("GEMINI_API_KEY not set".to_string()))?;
        let gemini_api_key = validate_api_key(&key)?;

        let model_candidates = match std::env::var("GEMINI_MODEL_CANDIDATES") {
            Ok(raw) => parse_candidates(&raw),
            Err(_) => Vec::new(),
        };
        let model_candidates = if model_candidates.is_empty() {
            crate::ai::fallback::DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|m| m.to_string())
                .collect()
        } else {
            model_candidates
        };

        Ok(Self {
            gemini_api_key,
            model_candidates,
        })
    }
}

pub(crate) fn validate_api_key(raw: &str) -> crate::Result<String> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(crate::Error::Auth("GEMINI_API_KEY is empty".to_string()));
    }
    if key.len() < MIN_API_KEY_LEN {
        return Err(crate::Error::Auth(
            "GEMINI_API_KEY is too short to be a real key".to_string(),
        ));
    }
    if !key.starts_with("AIza") {
        tracing::warn!("GEMINI_API_KEY does not look like a Generative Language API key");
    }
    Ok(key.to_string())
}

pub(crate) fn parse_candidates(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
