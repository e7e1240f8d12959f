use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ErrorCode, GenerationError, GenerationResult, validate_prompt};

use super::config::ProviderSettings;
use super::env::non_empty_owned;
use super::response_parsing::truncate_message;
use super::LlmProvider;

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant.";
pub const TEMPERATURE: f32 = 0.7;

/// Adapter for any backend exposing the chat completions API (Groq, OpenRouter, ...).
pub struct OpenAiCompatibleProvider {
    provider_id: String,
    display_name: String,
    api_key: Option<String>,
    api_base_url: Option<String>,
    model: String,
    extra_headers: Vec<(String, String)>,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, GenerationError> {
        let mut provider = Self::build(
            &settings.name,
            &settings.display_name,
            settings.api_key.clone(),
            settings.base_url.clone(),
            &settings.model,
            settings.timeout,
        )?;
        provider.extra_headers = settings.extra_headers.clone();
        Ok(provider)
    }

    pub fn with_config(
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        api_base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let provider_id = provider_id.into();
        let model = model.into();
        Self::build(
            &provider_id,
            &provider_id,
            Some(api_key.into()),
            Some(api_base_url.into()),
            &model,
            timeout,
        )
    }

    fn build(
        provider_id: &str,
        display_name: &str,
        api_key: Option<String>,
        api_base_url: Option<String>,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let provider_id = provider_id.trim();
        if provider_id.is_empty() {
            return Err(GenerationError::invalid_input(
                "OpenAI-compatible provider_id must not be empty",
            ));
        }
        let model = non_empty_owned(model).ok_or_else(|| {
            GenerationError::for_provider(
                ErrorCode::ConfigMissing,
                "model identifier must not be empty",
                provider_id,
            )
        })?;

        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            GenerationError::for_provider(
                ErrorCode::NetworkError,
                format!("failed to create HTTP client: {err}"),
                provider_id,
            )
        })?;

        Ok(Self {
            provider_id: provider_id.to_string(),
            display_name: display_name.to_string(),
            api_key: api_key.as_deref().and_then(non_empty_owned),
            api_base_url: api_base_url.as_deref().and_then(non_empty_owned),
            model,
            extra_headers: Vec::new(),
            client,
        })
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>) -> GenerationError {
        GenerationError::for_provider(code, message, &self.provider_id)
    }

    fn credentials(&self) -> Result<(&str, &str), GenerationError> {
        match (self.api_key.as_deref(), self.api_base_url.as_deref()) {
            (Some(api_key), Some(api_base_url)) => Ok((api_key, api_base_url)),
            _ => Err(self.error(
                ErrorCode::ConfigMissing,
                format!("{} API key or base URL not configured", self.display_name),
            )),
        }
    }

    fn build_request_payload(&self, prompt: &str) -> ChatCompletionsRequest {
        ChatCompletionsRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: TEMPERATURE,
        }
    }

    fn rate_limited(&self) -> GenerationError {
        self.error(
            ErrorCode::RateLimit,
            format!("{} rate limit exceeded", self.display_name),
        )
    }

    fn map_http_error(&self, status: StatusCode, body: &str) -> GenerationError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return self.rate_limited();
        }

        self.error(
            ErrorCode::HttpError,
            format!(
                "{} HTTP {}: {}",
                self.display_name,
                status.as_u16(),
                truncate_message(body)
            ),
        )
    }

    fn map_transport_error(&self, error: reqwest::Error) -> GenerationError {
        let message = if error.is_timeout() {
            format!("{} request timed out: {error}", self.display_name)
        } else {
            format!("{} network error: {error}", self.display_name)
        };
        self.error(ErrorCode::NetworkError, message)
    }

    fn map_success_response(&self, response_body: &str) -> Result<GenerationResult, GenerationError> {
        let response: ChatCompletionsResponse =
            serde_json::from_str(response_body).map_err(|err| {
                self.error(
                    ErrorCode::InvalidResponse,
                    format!("{} response decode failed: {err}", self.display_name),
                )
            })?;

        let output = response
            .choices
            .first()
            .and_then(ChatChoice::extract_text)
            .ok_or_else(|| {
                self.error(
                    ErrorCode::InvalidResponse,
                    format!("{} returned an empty response", self.display_name),
                )
            })?;

        let tokens_used = response.usage.and_then(|usage| usage.total_tokens);

        Ok(GenerationResult::succeeded(
            &self.provider_id,
            &self.model,
            output,
            tokens_used,
        ))
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn generate(&self, prompt: &str) -> Result<GenerationResult, GenerationError> {
        let (api_key, api_base_url) = self.credentials()?;
        validate_prompt(prompt).map_err(|err| err.with_default_provider(&self.provider_id))?;

        let payload = self.build_request_payload(prompt);
        let started = Instant::now();

        let mut request = self
            .client
            .post(endpoint_url(api_base_url))
            .bearer_auth(api_key)
            .header("content-type", "application/json");
        for (name, value) in &self.extra_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .json(&payload)
            .send()
            .map_err(|err| self.map_transport_error(err))?;

        let status = response.status();
        tracing::debug!(
            provider = %self.provider_id,
            status = status.as_u16(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "chat completion responded"
        );
        // The rate-limit verdict needs only the status line.
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(self.rate_limited());
        }

        let response_body = response
            .text()
            .map_err(|err| self.map_transport_error(err))?;
        if !status.is_success() {
            return Err(self.map_http_error(status, &response_body));
        }

        self.map_success_response(&response_body)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

impl ChatChoice {
    fn extract_text(&self) -> Option<String> {
        let content = self.message.as_ref()?.content.as_ref()?;
        extract_message_content(content)
    }
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: Option<u32>,
}

fn extract_message_content(content: &Value) -> Option<String> {
    let text = match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(extract_content_part_text)
            .collect::<String>(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn extract_content_part_text(part: &Value) -> Option<String> {
    match part {
        Value::String(text) => Some(text.to_string()),
        Value::Object(map) => map
            .get("text")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        _ => None,
    }
}

fn endpoint_url(api_base_url: &str) -> String {
    format!("{}/chat/completions", api_base_url.trim_end_matches('/'))
}
