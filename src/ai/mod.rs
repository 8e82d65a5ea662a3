//! AI service integration for analysis generation
//!
//! Provides the generation-service seam the pipeline talks through, the
//! Gemini wire client behind it, and the ordered model fallback chain.

pub mod fallback;
pub mod gemini;
pub mod mime;
pub mod mock;

pub use fallback::FallbackChain;
pub use gemini::GeminiClient;
pub use mock::MockGenerationClient;

use crate::schema::OutputSchema;
use crate::Result;
use async_trait::async_trait;

/// A transmissible unit of the outbound request: inline binary data tagged
/// with a media type, or plain instruction text. Bytes are held raw here;
/// base64 happens at the wire boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationPart {
    Text(String),
    Inline { media_type: String, bytes: Vec<u8> },
}

/// The payload for one generation attempt, independent of which model
/// candidate it is sent to.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub parts: Vec<GenerationPart>,
    /// When present, the service is instructed to constrain decoding to
    /// this shape and emit `application/json`.
    pub schema: Option<OutputSchema>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(parts: Vec<GenerationPart>) -> Self {
        Self {
            parts,
            schema: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_schema(mut self, schema: OutputSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Issues a single generation attempt against one model candidate.
    /// Returns the text of the response, or an empty string when the model
    /// answered without any text part; the fallback chain owns the
    /// non-empty success criterion.
    async fn generate(&self, model: &str, request: &GenerationRequest) -> Result<String>;
}
