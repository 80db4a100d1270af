//! Per-session conversation history.
//!
//! From the engine's point of view a transcript is append-only: it reads the whole
//! history before a turn and appends the user prompt and assistant reply after it.
pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{ExploraError, ExploraResult};
use crate::models::message::{Message, Role};

pub use file::FileTranscriptStore;
pub use memory::MemoryTranscriptStore;

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Messages for `session_id` in the order they were saved; empty for unknown sessions.
    async fn get_messages(&self, session_id: &str) -> ExploraResult<Vec<Message>>;

    /// Append one message, creating the session on first write.
    async fn save_message(&self, session_id: &str, role: Role, content: &str)
        -> ExploraResult<()>;
}

/// The `{"messages": [...]}` shape clients fetch a session's history in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub messages: Vec<Message>,
}

pub async fn history(store: &dyn TranscriptStore, session_id: &str) -> ExploraResult<History> {
    Ok(History {
        messages: store.get_messages(session_id).await?,
    })
}

/// Reject ids that could escape a storage directory or collide with nothing at all.
pub(crate) fn validate_session_id(session_id: &str) -> ExploraResult<()> {
    if session_id.is_empty()
        || session_id.contains(['/', '\\', '\0'])
        || session_id == "."
        || session_id.contains("..")
    {
        return Err(ExploraError::Transcript(format!(
            "invalid session id: {:?}",
            session_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_history_shape() -> anyhow::Result<()> {
        let store = MemoryTranscriptStore::new();
        store.save_message("s1", Role::User, "photosynthesis").await?;

        let history = history(&store, "s1").await?;
        assert_eq!(
            serde_json::to_value(&history)?,
            json!({"messages": [{"role": "user", "content": "photosynthesis"}]})
        );

        let empty = super::history(&store, "unknown").await?;
        assert!(empty.messages.is_empty());
        Ok(())
    }

    #[test]
    fn test_validate_session_id() {
        assert!(validate_session_id("3f2a-session").is_ok());
        assert!(validate_session_id("a.b").is_ok());
        for bad in ["", ".", "..", "../etc", "a/b", "a\\b"] {
            assert!(validate_session_id(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
