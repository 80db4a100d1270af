use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use super::{validate_session_id, TranscriptStore};
use crate::errors::ExploraResult;
use crate::models::message::{Message, Role};

/// Transcript store keeping one JSONL file per session under a directory.
///
/// Each line is one `{"role", "content"}` record. Writers are serialized through a single
/// lock so concurrent appends never interleave within a line.
#[derive(Debug)]
pub struct FileTranscriptStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `~/.config/explora/sessions`, or a relative fallback when there is no home directory.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(".config").join("explora").join("sessions"))
            .unwrap_or_else(|| PathBuf::from(".config/explora/sessions"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_file(&self, session_id: &str) -> ExploraResult<PathBuf> {
        validate_session_id(session_id)?;
        Ok(self.dir.join(format!("{}.jsonl", session_id)))
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn get_messages(&self, session_id: &str) -> ExploraResult<Vec<Message>> {
        let path = self.session_file(session_id)?;
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let messages = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str::<Message>(line) {
                Ok(message) => Some(message),
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        line = index + 1,
                        error = %err,
                        "skipping unreadable transcript line"
                    );
                    None
                }
            })
            .collect();
        Ok(messages)
    }

    async fn save_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> ExploraResult<()> {
        let path = self.session_file(session_id)?;
        let mut line = serde_json::to_string(&Message::new(role, content))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        fs::create_dir_all(&self.dir).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_round_trip_through_disk() -> anyhow::Result<()> {
        let temp_dir = tempdir()?;
        let store = FileTranscriptStore::new(temp_dir.path().join("sessions"));

        assert!(store.get_messages("abc").await?.is_empty());

        store.save_message("abc", Role::User, "volcanoes").await?;
        store
            .save_message("abc", Role::Assistant, "{\"content\": \"line1\nline2\"}")
            .await?;

        let reopened = FileTranscriptStore::new(store.dir().to_path_buf());
        assert_eq!(
            reopened.get_messages("abc").await?,
            vec![
                Message::user("volcanoes"),
                Message::assistant("{\"content\": \"line1\nline2\"}"),
            ]
        );

        let raw = std::fs::read_to_string(store.dir().join("abc.jsonl"))?;
        assert_eq!(raw.lines().count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_lines_are_skipped() -> anyhow::Result<()> {
        let temp_dir = tempdir()?;
        std::fs::write(
            temp_dir.path().join("s.jsonl"),
            "{\"role\":\"user\",\"content\":\"ok\"}\nnot json\n\n",
        )?;
        let store = FileTranscriptStore::new(temp_dir.path());
        assert_eq!(store.get_messages("s").await?, vec![Message::user("ok")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let temp_dir = tempdir().unwrap();
        let store = FileTranscriptStore::new(temp_dir.path());
        assert!(store.save_message("../escape", Role::User, "x").await.is_err());
        assert!(store.get_messages("nested/id").await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_appends_keep_lines_whole() -> anyhow::Result<()> {
        let temp_dir = tempdir()?;
        let store = Arc::new(FileTranscriptStore::new(temp_dir.path()));
        let mut handles = Vec::new();
        for writer in 0..4 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for turn in 0..25 {
                    store
                        .save_message("shared", Role::User, &format!("{writer}-{turn}"))
                        .await?;
                }
                anyhow::Ok(())
            }));
        }
        for handle in handles {
            handle.await??;
        }

        assert_eq!(store.get_messages("shared").await?.len(), 100);
        Ok(())
    }
}
