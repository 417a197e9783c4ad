use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core_types::{LlmResponse, Message, Role, Usage};
use crate::errors::KataError;
use crate::llm::Llm;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    request_timeout: Option<Duration>,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_base: "https://api.openai.com/v1".to_string(),
            model,
            temperature: None,
            max_tokens: None,
            request_timeout: None,
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Bound each chat-turn call; a stalled provider fails the turn instead
    /// of suspending the loop until the ceiling can never be reached.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    fn build_request_body(&self, messages: &[Message]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.format_messages(messages),
        });

        if let Some(temp) = self.temperature {
            body["temperature"] = temp.into();
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = max_tokens.into();
        }

        body
    }

    fn format_messages(&self, messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": self.format_role(&msg.role),
                    "content": msg.content,
                })
            })
            .collect()
    }

    fn format_role(&self, role: &Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn parse_response(&self, response: Value) -> Result<LlmResponse, KataError> {
        let choices = response["choices"]
            .as_array()
            .ok_or_else(|| KataError::Parsing("no choices in response".to_string()))?;
        if choices.is_empty() {
            return Err(KataError::Parsing("empty choices array".to_string()));
        }

        let choice = &choices[0];
        let content = choice["message"]["content"]
            .as_str()
            .ok_or_else(|| KataError::Parsing("response message has no content".to_string()))?
            .to_string();
        let finish_reason = choice["finish_reason"].as_str().map(|s| s.to_string());

        let usage = response["usage"].as_object().and_then(|u| {
            Some(Usage {
                prompt_tokens: u.get("prompt_tokens")?.as_u64()? as u32,
                completion_tokens: u.get("completion_tokens")?.as_u64()? as u32,
                total_tokens: u.get("total_tokens")?.as_u64()? as u32,
            })
        });

        Ok(LlmResponse {
            content,
            finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl Llm for OpenAiClient {
    async fn generate(&self, messages: Vec<Message>) -> Result<LlmResponse, KataError> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request_body(&messages);

        log::debug!("LLM request to {} with {} messages", url, messages.len());

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    KataError::Llm(format!(
                        "LLM request timed out after {:?}",
                        self.request_timeout.unwrap_or_default()
                    ))
                } else {
                    KataError::Llm(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| KataError::Llm(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(KataError::Llm(format!(
                "API request failed with status {}: {}",
                status, response_text
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|e| KataError::Parsing(format!("invalid JSON response: {}", e)))?;

        self.parse_response(response_json)
    }
}

/// Build a client from configuration, resolving the API key from the
/// environment when only `api_key_env` is set.
pub fn create_client(
    config: &crate::config::LlmConfig,
) -> Result<std::sync::Arc<dyn Llm>, KataError> {
    let api_key = config
        .auth
        .api_key
        .clone()
        .or_else(|| {
            config
                .auth
                .api_key_env
                .as_ref()
                .and_then(|env_var| std::env::var(env_var).ok())
        })
        .ok_or_else(|| {
            KataError::Config("no API key found; set api_key or api_key_env".to_string())
        })?;

    let mut client = OpenAiClient::new(api_key, config.model.clone());
    if let Some(base) = &config.api_base {
        client = client.with_api_base(base.clone());
    }
    client = client
        .with_temperature(config.parameters.temperature)
        .with_max_tokens(config.parameters.max_tokens)
        .with_request_timeout(Duration::from_secs(
            config.parameters.request_timeout_seconds,
        ));

    Ok(std::sync::Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_builder() {
        let client = OpenAiClient::new("test-key".to_string(), "gpt-4o".to_string())
            .with_temperature(0.7)
            .with_max_tokens(1000)
            .with_request_timeout(Duration::from_secs(30));

        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.model, "gpt-4o");
        assert_eq!(client.temperature, Some(0.7));
        assert_eq!(client.max_tokens, Some(1000));
        assert_eq!(client.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_message_formatting() {
        let client = OpenAiClient::new("test-key".to_string(), "gpt-4o".to_string());
        let messages = vec![
            Message::system("You are a problem solver."),
            Message::user("Reverse a linked list."),
        ];

        let formatted = client.format_messages(&messages);
        assert_eq!(formatted.len(), 2);
        assert_eq!(formatted[0]["role"], "system");
        assert_eq!(formatted[1]["role"], "user");
        assert_eq!(formatted[1]["content"], "Reverse a linked list.");
    }

    #[test]
    fn test_request_body_includes_parameters() {
        let client = OpenAiClient::new("k".to_string(), "gpt-4o".to_string())
            .with_temperature(0.2)
            .with_max_tokens(512);
        let body = client.build_request_body(&[Message::user("hi")]);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 512);
    }

    #[test]
    fn test_parse_response_extracts_content_and_usage() {
        let client = OpenAiClient::new("k".to_string(), "gpt-4o".to_string());
        let response = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "The answer is 4. STOP"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18}
        });
        let parsed = client.parse_response(response).unwrap();
        assert_eq!(parsed.content, "The answer is 4. STOP");
        assert_eq!(parsed.finish_reason.as_deref(), Some("stop"));
        assert_eq!(parsed.usage.unwrap().total_tokens, 18);
    }

    #[test]
    fn test_parse_response_without_choices_fails() {
        let client = OpenAiClient::new("k".to_string(), "gpt-4o".to_string());
        let err = client.parse_response(json!({"error": "rate limit"})).unwrap_err();
        assert!(matches!(err, KataError::Parsing(_)));
    }
}
