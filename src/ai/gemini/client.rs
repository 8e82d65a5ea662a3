use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
};
use crate::ai::{GenerationPart, GenerationRequest, GenerationService};
use crate::{error, Error, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Gemini REST client for `generateContent`. The model is supplied per
/// call so one client serves the whole fallback chain.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, Client::new())
    }

    pub fn new_with_client(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Calls `generateContent` for one model candidate. Non-success
    /// statuses are classified into the error taxonomy before they leave
    /// this layer.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let model = model.strip_prefix("models/").unwrap_or(model);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                error::classify_transport(e)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(error::classify_http(status, &error_text));
        }

        let body = response.text().await.map_err(error::classify_transport)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::Unknown(format!("unparseable service response: {e}"))
        })
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, model: &str, request: &GenerationRequest) -> Result<String> {
        let wire = build_wire_request(request);
        let response = self.generate_content(model, &wire).await?;
        Ok(response.first_text().unwrap_or_default().to_string())
    }
}

/// Maps the provider-neutral request onto the wire shape. Inline bytes are
/// base64-encoded here and nowhere else.
fn build_wire_request(request: &GenerationRequest) -> GenerateContentRequest {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            GenerationPart::Text(text) => Part::Text { text: text.clone() },
            GenerationPart::Inline { media_type, bytes } => Part::InlineData {
                inline_data: InlineData {
                    mime_type: media_type.clone(),
                    data: general_purpose::STANDARD.encode(bytes),
                },
            },
        })
        .collect();

    let mut config = GenerationConfig {
        temperature: request.temperature,
        max_output_tokens: request.max_output_tokens,
        ..Default::default()
    };
    if let Some(schema) = &request.schema {
        config.response_mime_type = Some("application/json".to_string());
        config.response_schema = Some(schema.clone());
    }
    let has_config = config.response_mime_type.is_some()
        || config.response_schema.is_some()
        || config.temperature.is_some()
        || config.max_output_tokens.is_some();

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: has_config.then_some(config),
    }
}
