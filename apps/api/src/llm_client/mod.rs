/// LLM client: the single point of entry for all completion API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// AI actions depend on the `CompletionBackend` trait; `LlmClient` is the production backend.
///
/// Structured output: the target schema is declared as the input schema of a single
/// tool and `tool_choice` forces the model to call it, so the reply is a `tool_use`
/// block whose `input` is the object. Every call is a single request (no retries).
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;
const OUTPUT_TOOL_NAME: &str = "emit_structured_output";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response did not match the output schema: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned no structured output")]
    EmptyContent,
}

/// One schema-constrained completion.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    /// JSON schema the returned object must satisfy.
    pub schema: &'a Value,
}

/// A hosted completion API that returns an object for a declared output schema.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Value, LlmError>;
}

/// Calls `backend` and deserializes the returned object into `T`.
/// A shape mismatch is reported as `LlmError::Parse`.
pub async fn generate_object<T: DeserializeOwned>(
    backend: &dyn CompletionBackend,
    request: CompletionRequest<'_>,
) -> Result<T, LlmError> {
    let value = backend.complete(request).await?;
    serde_json::from_value(value).map_err(LlmError::Parse)
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    tools: Vec<AnthropicTool<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AnthropicTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
    pub input: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the structured object: the first `tool_use` input, or JSON in the
    /// first text block if the model answered in text.
    pub fn structured_output(&self) -> Result<Value, LlmError> {
        if let Some(input) = self
            .content
            .iter()
            .find(|b| b.block_type == "tool_use")
            .and_then(|b| b.input.clone())
        {
            return Ok(input);
        }

        let text = self
            .content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
            .ok_or(LlmError::EmptyContent)?;

        Ok(serde_json::from_str(strip_json_fences(text))?)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Production completion backend over the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }

    /// Makes a single call to the Messages API, returning the full response object.
    pub async fn call(&self, request: CompletionRequest<'_>) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: request.model,
            max_tokens: MAX_TOKENS,
            system: request.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.prompt,
            }],
            tools: vec![AnthropicTool {
                name: OUTPUT_TOOL_NAME,
                description: "Return the final answer as an object matching the input schema.",
                input_schema: request.schema,
            }],
            tool_choice: ToolChoice {
                kind: "tool",
                name: OUTPUT_TOOL_NAME,
            },
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
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: model={}, input_tokens={}, output_tokens={}",
            request.model, llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Value, LlmError> {
        self.call(request).await?.structured_output()
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
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
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_structured_output_prefers_tool_use_input() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "Here you go"},
                {"type": "tool_use", "id": "toolu_1", "name": OUTPUT_TOOL_NAME,
                 "input": {"content": "rewritten"}}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }))
        .unwrap();
        assert_eq!(
            response.structured_output().unwrap(),
            json!({"content": "rewritten"})
        );
    }

    #[test]
    fn test_structured_output_falls_back_to_fenced_text() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "```json\n{\"content\": 1}\n```"}],
            "usage": {"input_tokens": 1, "output_tokens": 1}
        }))
        .unwrap();
        assert_eq!(response.structured_output().unwrap(), json!({"content": 1}));
    }

    #[test]
    fn test_structured_output_empty_content_errors() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [],
            "usage": {"input_tokens": 1, "output_tokens": 0}
        }))
        .unwrap();
        assert!(matches!(
            response.structured_output(),
            Err(LlmError::EmptyContent)
        ));
    }

    #[test]
    fn test_request_body_forces_output_tool() {
        let schema = json!({"type": "object"});
        let body = AnthropicRequest {
            model: "m",
            max_tokens: MAX_TOKENS,
            system: "s",
            messages: vec![AnthropicMessage {
                role: "user",
                content: "p",
            }],
            tools: vec![AnthropicTool {
                name: OUTPUT_TOOL_NAME,
                description: "d",
                input_schema: &schema,
            }],
            tool_choice: ToolChoice {
                kind: "tool",
                name: OUTPUT_TOOL_NAME,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["tool_choice"]["type"], "tool");
        assert_eq!(value["tool_choice"]["name"], OUTPUT_TOOL_NAME);
        assert_eq!(value["tools"][0]["input_schema"], schema);
    }

    struct FixedBackend(Value);

    #[async_trait]
    impl CompletionBackend for FixedBackend {
        async fn complete(&self, _request: CompletionRequest<'_>) -> Result<Value, LlmError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_generate_object_reports_schema_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Wrapped {
            #[allow(dead_code)]
            content: String,
        }

        let backend = FixedBackend(json!({"content": 12}));
        let schema = json!({});
        let request = CompletionRequest {
            model: "m",
            system: "s",
            prompt: "p",
            schema: &schema,
        };
        let result = generate_object::<Wrapped>(&backend, request).await;
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }
}
