//! Health advisor chat backed by a hosted text-generation model.
//!
//! Only the latest message is sent to the model, wrapped in a fixed instruction. Every failure
//! is reported to users as the same generic message (see [`crate::PortalError::user_message`]);
//! details only go to the log.

use crate::config::InferenceConfig;
use crate::constants::{ADVISOR_MAX_NEW_TOKENS, ADVISOR_TEMPERATURE, ADVISOR_TOP_P};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const INVALID_MESSAGES: &str = "Invalid messages format";

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("health advisor is not configured (HUGGINGFACE_API_KEY is not set)")]
    NotConfigured,
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("inference endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("No response from model")]
    EmptyResponse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn parse(input: &str) -> Result<Self, AdvisorError> {
        match input.trim() {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            _ => Err(AdvisorError::InvalidRequest(INVALID_MESSAGES.into())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Wrap a user question in the medical-assistant instruction.
pub fn build_prompt(question: &str) -> String {
    format!(
        "You are a helpful medical AI assistant. Provide detailed and clear health information \
for this question, while emphasizing the importance of consulting healthcare professionals: {question}

Remember to:
1. Give detailed explanations
2. Use simple language
3. Include relevant recommendations
4. Mention when professional medical help is needed"
    )
}

// ============================================================================
// Text generation backend
// ============================================================================

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError>;
}

#[derive(Clone, Debug, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: ADVISOR_MAX_NEW_TOKENS,
            temperature: ADVISOR_TEMPERATURE,
            top_p: ADVISOR_TOP_P,
        }
    }
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParameters,
}

#[derive(Deserialize)]
struct Generated {
    #[serde(default)]
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Many(Vec<Generated>),
    One(Generated),
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerationResponse::Many(items) => items.into_iter().next().map(|g| g.generated_text),
            GenerationResponse::One(g) => Some(g.generated_text),
        }
    }
}

/// Client for the Hugging Face hosted inference API.
#[derive(Clone, Debug)]
pub struct HuggingFaceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    parameters: GenerationParameters,
}

impl HuggingFaceClient {
    /// # Errors
    ///
    /// Returns `AdvisorError::NotConfigured` if the config carries no API key.
    pub fn new(config: &InferenceConfig) -> Result<Self, AdvisorError> {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(
        http: reqwest::Client,
        config: &InferenceConfig,
    ) -> Result<Self, AdvisorError> {
        let api_key = config.api_key().ok_or(AdvisorError::NotConfigured)?;
        Ok(Self {
            http,
            endpoint: format!("{}/models/{}", config.api_url(), config.model()),
            api_key: api_key.to_string(),
            parameters: GenerationParameters::default(),
        })
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceClient {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&GenerationRequest {
                inputs: prompt,
                parameters: &self.parameters,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GenerationResponse>()
            .await?
            .into_text()
            .ok_or(AdvisorError::EmptyResponse)
    }
}

// ============================================================================
// Advisor
// ============================================================================

#[derive(Clone, Default)]
pub struct HealthAdvisor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl HealthAdvisor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// An advisor that answers every question with [`AdvisorError::NotConfigured`].
    pub fn disabled() -> Self {
        Self { generator: None }
    }

    /// Use the hosted model when an API key is configured, otherwise run disabled.
    pub fn from_config(config: &InferenceConfig) -> Self {
        match HuggingFaceClient::new(config) {
            Ok(client) => {
                tracing::info!(model = config.model(), "health advisor enabled");
                Self::new(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!("health advisor disabled: {e}");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Answer the latest message of a conversation.
    pub async fn ask(&self, messages: &[ChatMessage]) -> Result<String, AdvisorError> {
        let last = messages
            .last()
            .ok_or_else(|| AdvisorError::InvalidRequest(INVALID_MESSAGES.into()))?;
        if last.content.trim().is_empty() {
            return Err(AdvisorError::InvalidRequest(INVALID_MESSAGES.into()));
        }

        let generator = self.generator.as_ref().ok_or(AdvisorError::NotConfigured)?;
        let text = generator.generate(&build_prompt(&last.content)).await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AdvisorError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}
