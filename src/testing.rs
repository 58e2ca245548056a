//! Test infrastructure: MockProvider and an in-temp-file store harness for
//! agent tests that exercise the real chat path.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::traits::{ChatMessage, ModelProvider};

/// A recorded call to `MockProvider::chat()`.
#[derive(Debug, Clone)]
pub struct MockChatCall {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// Scripted reply or failure for one `chat()` call.
pub enum MockReply {
    Text(String),
    Error(anyhow::Error),
}

/// Mock LLM provider that returns scripted responses in FIFO order.
pub struct MockProvider {
    responses: Mutex<Vec<MockReply>>,
    pub call_log: Mutex<Vec<MockChatCall>>,
}

impl MockProvider {
    /// A provider that always answers "Mock response".
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            call_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses(responses: Vec<MockReply>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_log: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> MockReply {
        MockReply::Text(text.to_string())
    }

    pub fn failure(message: &str) -> MockReply {
        MockReply::Error(anyhow::anyhow!("{}", message))
    }

    pub async fn call_count(&self) -> usize {
        self.call_log.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn chat(
        &self,
        system: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> anyhow::Result<String> {
        self.call_log.lock().await.push(MockChatCall {
            system: system.to_string(),
            messages: messages.to_vec(),
            max_tokens,
        });

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Ok("Mock response".to_string());
        }
        match responses.remove(0) {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(err) => Err(err),
        }
    }
}
