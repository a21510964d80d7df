//! HTTP client for the remote completion service
//!
//! The service exposes two engines: one completes labeling prompts, one
//! follows summary instructions. A 400-class response is the provider's
//! signal that the prompt exceeded its limit, distinguished here from hard
//! failures so the retry loops can react to it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    COMPLETION_TEMPERATURE, INFERENCE_STOP, MAX_COMPLETION_TOKENS, SUMMARY_STOP,
};
use crate::InferenceError;

const DEFAULT_INFERENCE_ENDPOINT: &str = "https://api.openai.com/v1/engines/davinci/completions";
const DEFAULT_SUMMARY_ENDPOINT: &str =
    "https://api.openai.com/v1/engines/davinci-instruct-beta/completions";

/// Which completion engine a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionEndpoint {
    Inference,
    Summary,
}

/// Wire body of a completion request
#[derive(Debug, Clone, Serialize)]
pub struct CompletionBody {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub stop: Vec<String>,
}

impl CompletionBody {
    #[must_use]
    pub fn inference(prompt: String) -> Self {
        Self {
            prompt,
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: COMPLETION_TEMPERATURE,
            stop: vec![INFERENCE_STOP.to_string()],
        }
    }

    #[must_use]
    pub fn summary(prompt: String) -> Self {
        Self {
            prompt,
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: COMPLETION_TEMPERATURE,
            stop: vec![SUMMARY_STOP.to_string()],
        }
    }
}

/// Outcome of one completion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionReply {
    /// A usable completion string
    Text(String),
    /// The provider rejected the prompt as over its length limit
    PromptTooLong,
}

/// Remote completion collaborator
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        endpoint: CompletionEndpoint,
        body: &CompletionBody,
    ) -> Result<CompletionReply, InferenceError>;
}

/// Completion endpoints and credentials, resolved once at startup
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub inference_endpoint: String,
    pub summary_endpoint: String,
    pub api_key: String,
}

impl CompletionConfig {
    /// Read credentials from `OPENAI_API_KEY`; endpoint overrides come from
    /// `COMPLETION_ENDPOINT` / `SUMMARY_COMPLETION_ENDPOINT`.
    pub fn from_env() -> Result<Self, InferenceError> {
        Ok(Self {
            inference_endpoint: std::env::var("COMPLETION_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_INFERENCE_ENDPOINT.to_string()),
            summary_endpoint: std::env::var("SUMMARY_COMPLETION_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_SUMMARY_ENDPOINT.to_string()),
            api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| InferenceError::MissingEnv("OPENAI_API_KEY"))?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

/// HTTP client for the completion service
pub struct HttpCompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl HttpCompletionClient {
    #[must_use]
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(
        &self,
        endpoint: CompletionEndpoint,
        body: &CompletionBody,
    ) -> Result<CompletionReply, InferenceError> {
        let url = match endpoint {
            CompletionEndpoint::Inference => &self.config.inference_endpoint,
            CompletionEndpoint::Summary => &self.config.summary_endpoint,
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            debug!(%status, prompt_len = body.prompt.len(), "completion rejected as too long");
            return Ok(CompletionReply::PromptTooLong);
        }
        if !status.is_success() {
            return Err(InferenceError::RemoteService(status));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::ResponseParse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::ResponseParse("response had no choices".to_string()))?;

        Ok(CompletionReply::Text(choice.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_body_uses_newline_stop() {
        let body = CompletionBody::inference("prompt".to_string());
        assert_eq!(body.stop, vec!["\n".to_string()]);
        assert_eq!(body.max_tokens, MAX_COMPLETION_TOKENS);
    }

    #[test]
    fn body_serializes_to_provider_shape() {
        let body = CompletionBody::summary("p".to_string());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["prompt"], "p");
        assert_eq!(json["max_tokens"], 128);
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["stop"][0], "\"\"\"");
    }
}
