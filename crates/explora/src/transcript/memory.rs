use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::TranscriptStore;
use crate::errors::ExploraResult;
use crate::models::message::{Message, Role};

/// Process-local transcript store; history is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryTranscriptStore {
    sessions: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl TranscriptStore for MemoryTranscriptStore {
    async fn get_messages(&self, session_id: &str) -> ExploraResult<Vec<Message>> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> ExploraResult<()> {
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .push(Message::new(role, content));
        Ok(())
    }
}
