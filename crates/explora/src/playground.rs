//! Single-shot practice questions.
//!
//! Unlike [`Explorer::explore`], this goes through one non-streaming completion and hands
//! back the provider's message untouched; nothing is reassembled or written to the
//! transcript.
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::{ExploraError, ExploraResult};
use crate::explore::Explorer;
use crate::models::message::Message;
use crate::prompt_template::PromptTemplates;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaygroundRequest {
    #[serde(alias = "sessionId")]
    pub session_id: String,
    pub age: u32,
    pub topic: String,
    pub level: f64,
    #[serde(alias = "selectedAspect")]
    pub selected_aspect: String,
}

impl Explorer {
    /// Ask for one practice question. Templates see every request field by name.
    pub async fn playground_question(
        &self,
        templates: &PromptTemplates,
        request: &PlaygroundRequest,
    ) -> ExploraResult<Message> {
        let (system, user) = templates.render(request)?;
        self.provider()
            .complete(self.config(), &system, &[Message::user(user)])
            .await
            .map_err(|e| {
                error!(session_id = %request.session_id, "Playground completion failed: {}", e);
                ExploraError::Provider(e.to_string())
            })
    }
}
