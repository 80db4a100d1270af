use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::Mutex;

use super::base::{FragmentStream, Provider};
use super::configs::ModelConfig;
use crate::models::message::Message;

/// How one scripted `stream` call plays out.
#[derive(Debug, Clone)]
pub enum Script {
    /// Yield every fragment, then end normally.
    Fragments(Vec<String>),
    /// Yield the fragments, then break off with `error`.
    FailAfter { fragments: Vec<String>, error: String },
    /// Fail the call itself before any fragment.
    FailOnCall(String),
}

impl Script {
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Script::Fragments(fragments.into_iter().map(Into::into).collect())
    }
}

/// A call the provider received, kept for assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
}

/// A provider that replays pre-configured fragment scripts
///
/// Each `stream` call consumes the next script; once they run out, calls stream nothing.
/// `complete` works the same way over a queue of messages.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    completions: Mutex<VecDeque<Result<Message, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            ..Self::default()
        }
    }

    pub fn with_completions(self, completions: Vec<Result<Message, String>>) -> Self {
        Self {
            completions: Mutex::new(completions.into()),
            ..self
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, config: &ModelConfig, system: &str, messages: &[Message]) -> Result<()> {
        let mut calls = self
            .calls
            .lock()
            .map_err(|_| anyhow!("scripted provider call log poisoned"))?;
        calls.push(RecordedCall {
            model: config.model.clone(),
            system: system.to_string(),
            messages: messages.to_vec(),
        });
        Ok(())
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn stream(
        &self,
        config: &ModelConfig,
        system: &str,
        messages: &[Message],
    ) -> Result<FragmentStream> {
        self.record(config, system, messages)?;
        let script = self
            .scripts
            .lock()
            .map_err(|_| anyhow!("scripted provider scripts poisoned"))?
            .pop_front();

        match script {
            None => Ok(stream::empty().boxed()),
            Some(Script::Fragments(fragments)) => {
                Ok(stream::iter(fragments.into_iter().map(Ok)).boxed())
            }
            Some(Script::FailAfter { fragments, error }) => Ok(stream::iter(
                fragments.into_iter().map(Ok),
            )
            .chain(stream::once(async move { Err(anyhow!(error)) }))
            .boxed()),
            Some(Script::FailOnCall(error)) => Err(anyhow!(error)),
        }
    }

    async fn complete(
        &self,
        config: &ModelConfig,
        system: &str,
        messages: &[Message],
    ) -> Result<Message> {
        self.record(config, system, messages)?;
        let next = self
            .completions
            .lock()
            .map_err(|_| anyhow!("scripted provider completions poisoned"))?
            .pop_front();

        match next {
            Some(Ok(message)) => Ok(message),
            Some(Err(error)) => Err(anyhow!(error)),
            None => Ok(Message::assistant("")),
        }
    }
}
