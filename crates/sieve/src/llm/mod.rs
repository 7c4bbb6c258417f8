//! LLM client, the single point of entry for all model calls in Sieve.
//!
//! No other module may talk to the provider directly; the analyzer and the
//! criteria parser both go through here. The client makes exactly one attempt
//! per `call`: retry and backoff are owned by [`crate::retry::Retrier`], so
//! the rate limiter observes every real outbound request.

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::AnalyzerError;

pub mod prompts;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Thin wrapper over the provider's chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(config: &EngineConfig) -> Result<Self, AnalyzerError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.api_endpoint.clone(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Makes one call and returns the assistant text.
    ///
    /// Status mapping is structural: 429 becomes `RateLimited` (carrying a
    /// parsed `Retry-After` when present), any other non-2xx becomes
    /// `Transient`. The caller decides the backoff policy from the variant.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, AnalyzerError> {
        let body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(AnalyzerError::RateLimited {
                status: status.as_u16(),
                retry_after,
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Transient {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Malformed(format!("invalid completion body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AnalyzerError::EmptyContent);
        }

        debug!(chars = content.len(), "LLM call succeeded");
        Ok(content)
    }

    /// Calls the model and deserializes the reply as JSON. The prompt must
    /// instruct the model to return a single JSON object.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, AnalyzerError> {
        let text = self.call(prompt, system).await?;
        let json = extract_json_object(&text)
            .ok_or_else(|| AnalyzerError::Malformed("no JSON object in response".to_string()))?;
        serde_json::from_str(json).map_err(|e| AnalyzerError::Malformed(e.to_string()))
    }
}

/// Locates the outermost JSON object in model output, tolerating markdown
/// code fences and stray prose around it.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let text = strip_json_fences(text);
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
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
    fn test_extract_json_object_ignores_surrounding_prose() {
        let input = "Here is the result:\n{\"name\": \"Ada\"}\nHope that helps!";
        assert_eq!(extract_json_object(input), Some("{\"name\": \"Ada\"}"));
    }

    #[test]
    fn test_extract_json_object_takes_outermost_braces() {
        let input = r#"{"outer": {"inner": 1}}"#;
        assert_eq!(extract_json_object(input), Some(r#"{"outer": {"inner": 1}}"#));
    }

    #[test]
    fn test_extract_json_object_none_when_absent() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
