/// LLM Client — the single point of entry for all text-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// The scheduling engine depends only on the `TextCompletionPort` trait, so the
/// repair/validation pipeline can be exercised against scripted responses.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod retry;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all completion calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
/// Session plans for a full day run long; leave generous output headroom.
pub const MAX_TOKENS: u32 = 8192;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service overloaded")]
    Overloaded,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion returned empty content")]
    EmptyContent,
}

impl CompletionError {
    /// Only the upstream "overloaded" signal is transient; validation of the
    /// returned text is deterministic and never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CompletionError::Overloaded)
    }
}

/// One prompt/response exchange with the completion service.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: &'static str,
    pub max_tokens: u32,
    pub system: String,
    pub prompt: String,
}

/// The untyped-text boundary between the scheduler and the generation service.
/// Returns a raw text blob that should, but is not guaranteed to, contain one
/// parseable JSON object.
#[async_trait]
pub trait TextCompletionPort: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// The production `TextCompletionPort` backed by the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl TextCompletionPort for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let request_body = AnthropicRequest {
            model: request.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<AnthropicError>(&body).ok();

            let is_overloaded = status.as_u16() == 529
                || parsed
                    .as_ref()
                    .is_some_and(|e| e.error.error_type == "overloaded_error");
            if is_overloaded {
                return Err(CompletionError::Overloaded);
            }

            let message = parsed.map(|e| e.error.message).unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .map_err(CompletionError::Http)?;

        debug!(
            "completion call succeeded: input_tokens={}, output_tokens={}",
            response.usage.input_tokens, response.usage.output_tokens
        );

        response
            .content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.clone())
            .ok_or(CompletionError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_only_overloaded_is_retryable() {
        assert!(CompletionError::Overloaded.is_retryable());
        assert!(!CompletionError::EmptyContent.is_retryable());
        assert!(!CompletionError::Api {
            status: 400,
            message: "bad request".to_string()
        }
        .is_retryable());
    }
}
