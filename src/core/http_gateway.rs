use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{ChatCompletionResponse, ChatRequest};
use crate::core::config::Config;
use crate::core::gateway::{build_messages, InferenceGateway, UpstreamError};
use crate::utils::url::construct_api_url;

/// [`InferenceGateway`] backed by an OpenAI-compatible chat completions
/// endpoint. Holds no per-turn state, so one instance serves a whole session.
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl HttpGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: construct_api_url(&config.base_url, "chat/completions"),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceGateway for HttpGateway {
    async fn ask(&self, user_text: &str) -> Result<String, UpstreamError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: build_messages(user_text),
            temperature: self.temperature,
            stream: false,
        };

        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            prompt_chars = user_text.chars().count(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "chat completion request failed");
            return Err(UpstreamError::from_status(status.as_u16(), &body));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body)?;
        if let Some(reason) = completion
            .choices
            .first()
            .and_then(|choice| choice.finish_reason.as_deref())
        {
            debug!(finish_reason = reason, "chat completion finished");
        }

        match completion.first_content() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(UpstreamError::EmptyReply),
        }
    }
}
