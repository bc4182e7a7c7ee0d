use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::upstream::{
    safety::{uniform_settings, SafetySetting},
    types::{
        ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
        RequestContent, RequestPart,
    },
    GenerativeModel, UpstreamError,
};

const JSON_MIME: &str = "application/json";

/// REST client for `models/{model}:generateContent`.
///
/// Built once at startup and shared read-only; the underlying
/// `reqwest::Client` pools connections across requests.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiClient {
    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().build()?;
        let safety_settings = config
            .safety_threshold
            .map(uniform_settings)
            .unwrap_or_default();

        if config.api_key.is_none() {
            warn!("GEMINI_API_KEY is not set; every generate call will fail");
        }
        if let Some(threshold) = config.safety_threshold {
            info!(?threshold, "overriding Gemini safety thresholds");
        }

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            safety_settings,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    pub fn build_request<'a>(
        &'a self,
        prompt: &'a str,
        schema: &'a Value,
    ) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME,
                response_schema: schema,
            },
            safety_settings: (!self.safety_settings.is_empty())
                .then_some(self.safety_settings.as_slice()),
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_text(&self, prompt: &str, schema: &Value) -> Result<String, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(prompt, schema))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| match envelope.error.status {
                    Some(code) => format!("{code}: {}", envelope.error.message),
                    None => envelope.error.message,
                })
                .unwrap_or(body);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        extract_text(parsed)
    }
}

/// Concatenates the text parts of the first candidate.
pub fn extract_text(response: GenerateContentResponse) -> Result<String, UpstreamError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(UpstreamError::Blocked(reason));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(UpstreamError::EmptyResponse {
            finish_reason: None,
        });
    };

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(UpstreamError::EmptyResponse {
            finish_reason: candidate.finish_reason,
        });
    }
    Ok(text)
}
