use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::driver::EmissionState;
use crate::emission::{EmissionEvent, SseBody};
use crate::errors::ExploraResult;
use crate::models::message::{Message, Role};
use crate::prompt_template::PromptTemplates;
use crate::providers::base::Provider;
use crate::providers::configs::ModelConfig;
use crate::reassembler::{ParseOutcome, Reassembler};
use crate::transcript::{self, History, TranscriptStore};

/// One learner question, ready to send upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreTurn {
    pub session_id: String,
    /// What the learner typed; this is what the transcript remembers.
    pub prompt: String,
    /// Rendered system instruction.
    pub system: String,
    /// Rendered user turn sent after the session history.
    pub user: String,
}

/// Values available to explore templates.
#[derive(Debug, Clone, Serialize)]
pub struct ExploreContext<'a> {
    pub prompt: &'a str,
    pub age: u32,
}

impl ExploreTurn {
    pub fn new<S, P, Y, U>(session_id: S, prompt: P, system: Y, user: U) -> Self
    where
        S: Into<String>,
        P: Into<String>,
        Y: Into<String>,
        U: Into<String>,
    {
        Self {
            session_id: session_id.into(),
            prompt: prompt.into(),
            system: system.into(),
            user: user.into(),
        }
    }

    pub fn from_templates(
        session_id: impl Into<String>,
        prompt: impl Into<String>,
        age: u32,
        templates: &PromptTemplates,
    ) -> ExploraResult<Self> {
        let prompt = prompt.into();
        let (system, user) = templates.render(&ExploreContext {
            prompt: &prompt,
            age,
        })?;
        Ok(Self {
            session_id: session_id.into(),
            prompt,
            system,
            user,
        })
    }
}

/// Drives provider output through reassembly and diffing for each request.
///
/// Holds no per-request state: every call to [`Explorer::explore`] gets its own buffer and
/// emission state, so one `Explorer` serves any number of concurrent requests.
pub struct Explorer {
    provider: Arc<dyn Provider>,
    store: Arc<dyn TranscriptStore>,
    config: ModelConfig,
}

impl Explorer {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn TranscriptStore>,
        config: ModelConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub(crate) fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub async fn history(&self, session_id: &str) -> ExploraResult<History> {
        transcript::history(self.store.as_ref(), session_id).await
    }

    /// Stream events for one turn.
    ///
    /// The stream always ends with exactly one terminal event: `Done` when the provider
    /// finished, `Error` when the provider call failed or broke off. The turn is written to
    /// the transcript just before `Done`, and never on the error path.
    pub fn explore(&self, turn: ExploreTurn) -> BoxStream<'_, EmissionEvent> {
        Box::pin(async_stream::stream! {
            let mut messages = match self.store.get_messages(&turn.session_id).await {
                Ok(messages) => messages,
                Err(e) => {
                    error!(session_id = %turn.session_id, "Failed to load session history: {}", e);
                    yield EmissionEvent::Error(e.to_string());
                    return;
                }
            };
            messages.push(Message::user(turn.user.as_str()));

            let mut fragments = match self.provider.stream(&self.config, &turn.system, &messages).await {
                Ok(fragments) => fragments,
                Err(e) => {
                    error!(session_id = %turn.session_id, "Failed to start provider stream: {}", e);
                    yield EmissionEvent::Error(e.to_string());
                    return;
                }
            };

            let mut reassembler = Reassembler::new();
            let mut state = EmissionState::new();

            while let Some(fragment) = fragments.next().await {
                let fragment = match fragment {
                    Ok(fragment) => fragment,
                    Err(e) => {
                        error!(
                            session_id = %turn.session_id,
                            received = reassembler.len(),
                            "Provider stream failed: {}", e
                        );
                        yield EmissionEvent::Error(e.to_string());
                        return;
                    }
                };

                if let ParseOutcome::Complete(document) = reassembler.push(&fragment) {
                    for event in state.diff(&document) {
                        yield event;
                    }
                }
            }

            let full_text = reassembler.into_text();
            info!(
                session_id = %turn.session_id,
                bytes = full_text.len(),
                "explore stream complete"
            );
            self.save_turn(&turn.session_id, &turn.prompt, &full_text).await;

            yield EmissionEvent::Done;
        })
    }

    /// [`Explorer::explore`] framed as SSE bytes.
    pub fn explore_sse(&self, turn: ExploreTurn) -> SseBody<'_> {
        SseBody::new(self.explore(turn))
    }

    async fn save_turn(&self, session_id: &str, prompt: &str, reply: &str) {
        for (role, content) in [(Role::User, prompt), (Role::Assistant, reply)] {
            if let Err(e) = self.store.save_message(session_id, role, content).await {
                warn!(session_id, %role, "Failed to save transcript message: {}", e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::scripted::{Script, ScriptedProvider};
    use crate::transcript::MemoryTranscriptStore;

    fn explorer(scripts: Vec<Script>) -> (Explorer, Arc<ScriptedProvider>, Arc<MemoryTranscriptStore>) {
        let provider = Arc::new(ScriptedProvider::new(scripts));
        let store = Arc::new(MemoryTranscriptStore::new());
        let explorer = Explorer::new(provider.clone(), store.clone(), ModelConfig::default());
        (explorer, provider, store)
    }

    #[tokio::test]
    async fn test_simple_turn() -> anyhow::Result<()> {
        let (explorer, _, store) = explorer(vec![Script::fragments(["{\"content\":\"hi\"", "}"])]);

        let events: Vec<_> = explorer
            .explore(ExploreTurn::new("s", "greet me", "sys", "Say hi"))
            .collect()
            .await;

        assert_eq!(
            events,
            vec![EmissionEvent::Content("hi".to_string()), EmissionEvent::Done]
        );
        assert_eq!(
            store.get_messages("s").await?,
            vec![
                Message::user("greet me"),
                Message::assistant("{\"content\":\"hi\"}"),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_history_sent_upstream() -> anyhow::Result<()> {
        let (explorer, provider, store) = explorer(vec![Script::fragments(["{}"])]);
        store.save_message("s", Role::User, "earlier").await?;
        store.save_message("s", Role::Assistant, "{\"content\":\"x\"}").await?;

        let _: Vec<_> = explorer
            .explore(ExploreTurn::new("s", "next", "system text", "rendered next"))
            .collect()
            .await;

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, "system text");
        assert_eq!(
            calls[0].messages,
            vec![
                Message::user("earlier"),
                Message::assistant("{\"content\":\"x\"}"),
                Message::user("rendered next"),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_turn_from_templates() -> anyhow::Result<()> {
        let templates = PromptTemplates::new("Tutor, age {{ age }}", "Explain {{ prompt }}");
        let turn = ExploreTurn::from_templates("s", "black holes", 14, &templates)?;
        assert_eq!(turn.prompt, "black holes");
        assert_eq!(turn.system, "Tutor, age 14");
        assert_eq!(turn.user, "Explain black holes");
        Ok(())
    }

    #[tokio::test]
    async fn test_history_via_explorer() -> anyhow::Result<()> {
        let (explorer, _, store) = explorer(vec![]);
        store.save_message("s", Role::User, "q").await?;
        let history = explorer.history("s").await?;
        assert_eq!(history.messages, vec![Message::user("q")]);
        Ok(())
    }
}
