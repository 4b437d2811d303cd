//! OpenAI-compatible chat completion client
//!
//! Works against any endpoint that speaks the `/chat/completions` protocol
//! (RedPill, OpenAI, Ollama, vLLM, ...). Tool definitions are sent as
//! `function` tools and tool calls are parsed back into [`ToolCall`]s.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ModelSettings;
use crate::error::{Error, Result};

use super::traits::CompletionClient;
use super::types::{ChatMessage, ChatRole, Completion, ToolCall, ToolSpec};

const PROVIDER: &str = "openai";

/// First retry delay; doubles per attempt up to [`MAX_BACKOFF`]
const BASE_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Delay before retry number `attempt` (1-based)
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    BASE_BACKOFF.saturating_mul(factor).min(MAX_BACKOFF)
}

// ─────────────────────────────────────────────────────────────────
// Wire types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: ChatRole,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: "function".to_string(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

impl From<&ToolSpec> for WireTool {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    total_tokens: u32,
}

/// Parse the JSON-encoded arguments of a tool call
///
/// Models occasionally send an empty string or malformed JSON for
/// argument-less tools; both decode to an empty object.
fn parse_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(error = %e, "Tool call arguments are not valid JSON, ignoring them");
        serde_json::json!({})
    })
}

fn into_completion(response: ChatCompletionResponse) -> Result<Completion> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedResponse {
            message: "No choices in API response".to_string(),
        })?;

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| ToolCall {
            arguments: parse_arguments(&call.function.arguments),
            id: call.id,
            name: call.function.name,
        })
        .collect();

    Ok(Completion {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
    })
}

// ─────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────

/// Chat completion client for OpenAI-compatible APIs
pub struct OpenAiClient {
    settings: ModelSettings,
    client: Client,
}

impl OpenAiClient {
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %settings.base_url,
            model = %settings.model,
            "OpenAI-compatible client created"
        );

        Ok(Self {
            settings: settings.clone(),
            client,
        })
    }

    /// Build the authorization header value (if API key is set)
    fn auth_header(&self) -> Option<String> {
        if self.settings.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.settings.api_key))
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Send a chat completion request with retry on transient failures
    async fn chat_completion(&self, request: &ChatCompletionRequest<'_>) -> Result<Completion> {
        let url = self.endpoint();
        let mut last_error: Option<Error> = None;

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let backoff = backoff_delay(attempt);
                debug!(attempt, ?backoff, "Retrying after error");
                tokio::time::sleep(backoff).await;
            }

            let mut req = self.client.post(&url).json(request);
            if let Some(ref auth) = self.auth_header() {
                req = req.header("Authorization", auth);
            }

            let response = match req.send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    warn!(attempt, "Completion request timed out");
                    last_error = Some(Error::CompletionTimeout {
                        provider: PROVIDER.to_string(),
                        timeout_secs: self.settings.timeout_secs,
                    });
                    continue;
                }
                Err(e) if e.is_connect() => {
                    warn!(attempt, error = %e, "Retryable connection error");
                    last_error = Some(Error::completion_failed(
                        PROVIDER,
                        format!("Connection error: {}", e),
                    ));
                    continue;
                }
                Err(e) => {
                    return Err(Error::completion_failed(
                        PROVIDER,
                        format!("Request error: {}", e),
                    ));
                }
            };

            let status = response.status();
            if status.is_success() {
                let parsed = response
                    .json::<ChatCompletionResponse>()
                    .await
                    .map_err(|e| Error::MalformedResponse {
                        message: format!("Failed to parse API response: {}", e),
                    })?;

                if let Some(ref usage) = parsed.usage {
                    debug!(total_tokens = usage.total_tokens, "Completion token usage");
                }
                return into_completion(parsed);
            }

            let body = response.text().await.unwrap_or_default();
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                return Err(Error::AuthenticationFailed {
                    message: format!("API returned {}: {}", status, body),
                });
            }
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(status = %status, attempt, "Retryable API error: {}", body);
                last_error = Some(Error::completion_failed(
                    PROVIDER,
                    format!("API error {}: {}", status, body),
                ));
                continue;
            }
            return Err(Error::completion_failed(
                PROVIDER,
                format!("API error {}: {}", status, body),
            ));
        }

        Err(last_error.unwrap_or_else(|| {
            Error::completion_failed(PROVIDER, "All retry attempts exhausted")
        }))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<Completion> {
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: self.settings.temperature,
            tools: tools.iter().map(WireTool::from).collect(),
        };

        debug!(
            model = %self.settings.model,
            messages = messages.len(),
            tools = tools.len(),
            "Sending chat completion request"
        );

        self.chat_completion(&request).await
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name() {
        let client = OpenAiClient::new(&ModelSettings::default()).unwrap();
        assert_eq!(client.name(), "openai");
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        assert_eq!(backoff_delay(1), Duration::from_millis(500));
        assert_eq!(backoff_delay(2), Duration::from_secs(1));
        assert_eq!(backoff_delay(4), Duration::from_secs(4));
        assert_eq!(backoff_delay(5), MAX_BACKOFF);
        assert_eq!(backoff_delay(40), MAX_BACKOFF);
        assert_eq!(backoff_delay(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn test_auth_header() {
        let settings = ModelSettings {
            api_key: "sk-test-123".to_string(),
            ..Default::default()
        };
        let client = OpenAiClient::new(&settings).unwrap();
        assert_eq!(client.auth_header(), Some("Bearer sk-test-123".to_string()));

        let no_key = OpenAiClient::new(&ModelSettings {
            api_key: String::new(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(no_key.auth_header(), None);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let settings = ModelSettings {
            base_url: "http://localhost:11434/v1/".to_string(),
            ..Default::default()
        };
        let client = OpenAiClient::new(&settings).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_request_serialization_with_tools() {
        let messages = vec![
            ChatMessage::system("tell jokes"),
            ChatMessage::assistant_with_calls(
                "",
                vec![ToolCall {
                    id: "call_1".to_string(),
                    name: "get_joke".to_string(),
                    arguments: serde_json::json!({"category": "puns"}),
                }],
            ),
            ChatMessage::tool_result("call_1", "a pun"),
        ];
        let tools = vec![ToolSpec {
            name: "get_joke".to_string(),
            description: "Fetch a joke".to_string(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let request = ChatCompletionRequest {
            model: "m",
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: None,
            tools: tools.iter().map(WireTool::from).collect(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "get_joke");
        assert_eq!(json["messages"][1]["tool_calls"][0]["function"]["arguments"], r#"{"category":"puns"}"#);
        assert_eq!(json["messages"][2]["role"], "tool");
        assert_eq!(json["messages"][2]["tool_call_id"], "call_1");
        assert!(json.get("temperature").is_none());
        assert!(json["messages"][0].get("tool_calls").is_none());
    }

    #[test]
    fn test_request_without_tools_omits_field() {
        let request = ChatCompletionRequest {
            model: "m",
            messages: vec![WireMessage::from(&ChatMessage::user("hi"))],
            temperature: Some(0.2),
            tools: Vec::new(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_response_with_tool_calls() {
        let raw = r#"{
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "get_joke", "arguments": "{\"category\":\"puns\"}"}
                    }]
                }
            }],
            "usage": {"total_tokens": 12}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let completion = into_completion(parsed).unwrap();
        assert!(completion.content.is_empty());
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].name, "get_joke");
        assert_eq!(completion.tool_calls[0].arguments["category"], "puns");
    }

    #[test]
    fn test_response_without_choices_is_malformed() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let err = into_completion(parsed).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_arguments_tolerates_garbage() {
        assert_eq!(parse_arguments(""), serde_json::json!({}));
        assert_eq!(parse_arguments("not json"), serde_json::json!({}));
        assert_eq!(parse_arguments(r#"{"a":1}"#)["a"], 1);
    }
}
