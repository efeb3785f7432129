use std::env;

use async_trait::async_trait;
use eyre::{Result, eyre};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::conversation_state::{Message, Role};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b:free";

/// Maps an ordered list of role-tagged messages to one generated text
/// response. Both loops run against this seam; tests substitute a canned
/// implementation.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("invalid completion endpoint URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion endpoint returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("completion response contained no choices")]
    EmptyResponse,

    #[error("completion choice carried no text content")]
    MissingContent,
}

/// Connection settings for one completion client, loaded once at startup
/// and passed by value into `OpenRouterClient::new`.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
}

impl OpenRouterConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENROUTER_API_KEY")
            .map_err(|_| eyre!("OPENROUTER_API_KEY environment variable not set"))?;

        let base_url =
            env::var("OPENROUTER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("OPENROUTER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
            temperature: None,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

pub struct OpenRouterClient {
    config: OpenRouterConfig,
    endpoint: Url,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self, CompletionError> {
        let endpoint = Url::parse(&format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        ))?;

        // No request timeout: an unresponsive endpoint blocks the caller,
        // there is no retry or cancellation anywhere in this program.
        let client = reqwest::Client::new();

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    /// Send the transcript and return the first choice's text.
    pub async fn chat_completion(&self, messages: &[Message]) -> Result<String, CompletionError> {
        let request = ApiRequest {
            model: &self.config.model,
            messages: messages.iter().map(ApiMessage::from).collect(),
            temperature: self.config.temperature,
        };

        if let Ok(body) = serde_json::to_string_pretty(&request) {
            debug!("Sending request to {}: {}", self.endpoint, body);
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("API request failed with status {}: {}", status, body);
            return Err(CompletionError::Api { status, body });
        }

        let response: ApiResponse = response.json().await?;
        debug!("Received response: {:?}", response);

        first_choice_text(response)
    }
}

#[async_trait]
impl CompletionService for OpenRouterClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        Ok(self.chat_completion(messages).await?)
    }
}

fn first_choice_text(response: ApiResponse) -> Result<String, CompletionError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::EmptyResponse)?;

    choice.message.content.ok_or(CompletionError::MissingContent)
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for ApiMessage<'a> {
    fn from(message: &'a Message) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::System => "system",
            // Model-produced turns; the remote API only knows "assistant".
            Role::Interviewer | Role::Interviewee => "assistant",
        };

        Self {
            role,
            content: &message.text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_reads_required_and_optional_settings() {
        env::remove_var("OPENROUTER_API_KEY");
        env::remove_var("OPENROUTER_BASE_URL");
        env::remove_var("OPENROUTER_MODEL");
        assert!(OpenRouterConfig::from_env().is_err());

        env::set_var("OPENROUTER_API_KEY", "sk-or-test");
        let config = OpenRouterConfig::from_env().unwrap();
        assert_eq!(config.api_key, "sk-or-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, None);

        env::set_var("OPENROUTER_BASE_URL", "http://localhost:8080/v1");
        env::set_var("OPENROUTER_MODEL", "mistralai/mistral-7b-instruct");
        let config = OpenRouterConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "mistralai/mistral-7b-instruct");

        env::remove_var("OPENROUTER_API_KEY");
        env::remove_var("OPENROUTER_BASE_URL");
        env::remove_var("OPENROUTER_MODEL");
    }

    #[test]
    fn builder_overrides_replace_env_values() {
        let config = OpenRouterConfig {
            api_key: "sk-or-test".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
        };

        let config = config
            .with_model("openai/gpt-4o-mini")
            .with_temperature(0.0);

        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert_eq!(config.temperature, Some(0.0));
    }

    #[test]
    fn endpoint_ignores_a_trailing_slash_in_the_base_url() {
        let mut config = OpenRouterConfig {
            api_key: "sk-or-test".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
        };

        let client = OpenRouterClient::new(config.clone()).unwrap();
        assert_eq!(
            client.endpoint.as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );

        config.base_url = "https://openrouter.ai/api/v1/".to_string();
        let client = OpenRouterClient::new(config).unwrap();
        assert_eq!(
            client.endpoint.as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn an_unparseable_base_url_is_rejected() {
        let config = OpenRouterConfig {
            api_key: "sk-or-test".to_string(),
            base_url: "openrouter.ai/api/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
        };

        assert!(matches!(
            OpenRouterClient::new(config),
            Err(CompletionError::BaseUrl(_))
        ));
    }

    #[test]
    fn request_body_maps_roles_for_the_wire() {
        let messages = vec![
            Message::system("You are an interviewer."),
            Message::user("Hello! Welcome to our interview. Let's begin."),
            Message {
                role: Role::Interviewer,
                text: "Tell me about your experience.".to_string(),
            },
            Message {
                role: Role::Interviewee,
                text: "Three years of backend work.".to_string(),
            },
        ];

        let request = ApiRequest {
            model: DEFAULT_MODEL,
            messages: messages.iter().map(ApiMessage::from).collect(),
            temperature: Some(0.0),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["temperature"], 0.0);

        let roles: Vec<&str> = value["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["system", "user", "assistant", "assistant"]);
        assert_eq!(
            value["messages"][1]["content"],
            "Hello! Welcome to our interview. Let's begin."
        );
    }

    #[test]
    fn temperature_is_omitted_when_unset() {
        let messages = [Message::user("hi")];
        let request = ApiRequest {
            model: DEFAULT_MODEL,
            messages: messages.iter().map(ApiMessage::from).collect(),
            temperature: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn response_parsing_returns_the_first_choice_text() {
        let raw = r#"{
            "id": "gen-1234",
            "model": "openai/gpt-oss-20b:free",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": "Hi there." },
                    "finish_reason": "stop"
                }
            ],
            "usage": { "prompt_tokens": 12, "completion_tokens": 4 }
        }"#;

        let response: ApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "Hi there.");
    }

    #[test]
    fn a_response_without_choices_is_an_error() {
        let response: ApiResponse = serde_json::from_str(r#"{ "choices": [] }"#).unwrap();
        assert!(matches!(
            first_choice_text(response),
            Err(CompletionError::EmptyResponse)
        ));
    }

    #[test]
    fn a_choice_without_content_is_an_error() {
        let raw = r#"{ "choices": [ { "message": { "role": "assistant", "content": null } } ] }"#;
        let response: ApiResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            first_choice_text(response),
            Err(CompletionError::MissingContent)
        ));
    }
}
