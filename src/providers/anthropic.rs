use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use zeroize::Zeroize;

use crate::providers::ProviderError;
use crate::traits::{ChatMessage, ModelProvider};

/// Anthropic Messages API client. The coach only needs plain text in and out:
/// no tools, no streaming.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl Drop for AnthropicProvider {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

impl AnthropicProvider {
    pub fn new(api_key: &str, model: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: "https://api.anthropic.com/v1".to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Messages must alternate user/assistant; a rehydrated transcript can
    /// carry adjacent same-role entries, so merge them before sending.
    fn to_wire_messages(messages: &[ChatMessage]) -> Vec<Value> {
        let mut wire: Vec<Value> = Vec::with_capacity(messages.len());
        for msg in messages {
            if let Some(last) = wire.last_mut() {
                if last["role"] == msg.role.as_str() {
                    let merged = format!(
                        "{}\n\n{}",
                        last["content"].as_str().unwrap_or(""),
                        msg.content
                    );
                    last["content"] = json!(merged);
                    continue;
                }
            }
            wire.push(json!({ "role": msg.role, "content": msg.content }));
        }
        wire
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    async fn chat(
        &self,
        system: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "system": system,
            "messages": Self::to_wire_messages(messages),
        });

        let url = format!("{}/messages", self.base_url);
        info!(model = %self.model, messages = messages.len(), "Calling coach LLM");

        let resp = match self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!("HTTP request failed: {}", e);
                return Err(ProviderError::network(&e).into());
            }
        };

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            error!(status = %status, "Anthropic API error: {}", text);
            return Err(ProviderError::from_status(status.as_u16(), &text).into());
        }

        // Truncate for debug logging, respecting UTF-8 char boundaries.
        let truncated = if text.len() > 2000 {
            let mut end = 2000;
            while end > 0 && !text.is_char_boundary(end) {
                end -= 1;
            }
            &text[..end]
        } else {
            &text
        };
        debug!("Provider response: {}", truncated);

        let data: Value = serde_json::from_str(&text)?;
        let mut reply = String::new();
        if let Some(blocks) = data["content"].as_array() {
            for block in blocks {
                if block["type"].as_str() == Some("text") {
                    if let Some(t) = block["text"].as_str() {
                        reply.push_str(t);
                    }
                }
            }
        }

        if reply.is_empty() {
            anyhow::bail!("No text content in response");
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_messages_keep_alternating_roles() {
        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("how"),
        ];
        let wire = AnthropicProvider::to_wire_messages(&messages);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0]["role"], "user");
        assert_eq!(wire[1]["role"], "assistant");
    }

    #[test]
    fn adjacent_same_role_messages_are_merged() {
        let messages = vec![
            ChatMessage::user("first"),
            ChatMessage::user("second"),
            ChatMessage::assistant("ok"),
        ];
        let wire = AnthropicProvider::to_wire_messages(&messages);
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0]["content"], "first\n\nsecond");
    }
}
