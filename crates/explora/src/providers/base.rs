use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

use super::configs::ModelConfig;
use crate::models::message::Message;

/// Text fragments as the provider produces them, ended by end-of-stream.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Base trait for chat-completion providers
///
/// The system instruction is passed separately from `messages`, which hold prior session
/// turns followed by the new user turn.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Start a token-streaming completion. Errors returned here mean the call itself failed;
    /// errors inside the stream mean it broke off midway.
    async fn stream(
        &self,
        config: &ModelConfig,
        system: &str,
        messages: &[Message],
    ) -> Result<FragmentStream>;

    /// Single-shot completion returning the whole assistant message.
    async fn complete(
        &self,
        config: &ModelConfig,
        system: &str,
        messages: &[Message],
    ) -> Result<Message>;
}
