use async_trait::async_trait;

use super::ChatMessage;

/// Model provider: sends a system instruction plus a bounded message window
/// to an LLM and returns the generated text.
///
/// The coaching agent never asserts on real model output; tests script this
/// trait with canned strings instead.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn chat(
        &self,
        system: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> anyhow::Result<String>;
}
