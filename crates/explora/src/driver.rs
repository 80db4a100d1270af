//! Decides which events a freshly parsed document produces.
use serde_json::{Map, Value};
use tracing::warn;

use crate::compose::compose;
use crate::emission::EmissionEvent;
use crate::errors::FormatError;
use crate::normalize::{
    normalize_questions, normalize_topics, select_list, QUESTIONS_KEYS, TOPICS_KEYS,
};

const CONTENT_KEY: &str = "content";

/// Per-stream memory of what the client has already seen.
///
/// Only content is diffed. Topics and questions are re-sent on every parse that
/// carries them.
#[derive(Debug, Default, Clone)]
pub struct EmissionState {
    current_content: String,
}

impl EmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_content(&self) -> &str {
        &self.current_content
    }

    /// Events for one successfully parsed document, in content, topics, questions order.
    ///
    /// A malformed record stops the cycle: events produced before it are kept, the rest
    /// are dropped and the next parse starts clean.
    pub fn diff(&mut self, document: &Map<String, Value>) -> Vec<EmissionEvent> {
        let mut events = Vec::new();
        if let Err(err) = self.collect(document, &mut events) {
            warn!(error = %err, "skipping malformed fields for this cycle");
        }
        events
    }

    fn collect(
        &mut self,
        document: &Map<String, Value>,
        events: &mut Vec<EmissionEvent>,
    ) -> Result<(), FormatError> {
        if let Some(content) = document.get(CONTENT_KEY) {
            let composed = compose(content);
            if composed != self.current_content {
                self.current_content = composed.clone();
                events.push(EmissionEvent::Content(composed));
            }
        }

        if let Some(raw) = select_list(document, TOPICS_KEYS) {
            events.push(EmissionEvent::Topics(normalize_topics(raw)?));
        }

        if let Some(raw) = select_list(document, QUESTIONS_KEYS) {
            events.push(EmissionEvent::Questions(normalize_questions(raw)?));
        }

        Ok(())
    }
}
