//! Canonical topic and question records.
//!
//! Providers do not agree on key names: the same topic arrives as `name` or `topic`, its
//! explanation as `detail` or `reason`. Each canonical field carries an ordered alias list
//! and takes the first alias present in the raw record.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compose::{is_truthy, value_to_text};
use crate::errors::FormatError;

pub const TOPICS_KEYS: &[&str] = &["relatedTopics", "topics"];
pub const QUESTIONS_KEYS: &[&str] = &["relatedQuestions", "questions"];

const TOPIC_ALIASES: &[&str] = &["name", "topic"];
const TOPIC_TYPE_ALIASES: &[&str] = &["type"];
const TOPIC_REASON_ALIASES: &[&str] = &["detail", "reason"];

const QUESTION_ALIASES: &[&str] = &["text", "question"];
const QUESTION_TYPE_ALIASES: &[&str] = &["type"];
const QUESTION_CONTEXT_ALIASES: &[&str] = &["detail", "context"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub topic: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub context: String,
}

/// First alias present in `record`, in priority order. A key holding `null` still counts
/// as present.
pub fn resolve<'a>(record: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| record.get(*alias))
}

/// Resolve a canonical text field, defaulting to an empty string.
pub fn resolve_text(record: &Map<String, Value>, aliases: &[&str]) -> String {
    resolve(record, aliases)
        .map(value_to_text)
        .unwrap_or_default()
}

/// Pick the record list out of a document. The first alias holding a non-empty value
/// wins, so an empty `relatedTopics` falls through to `topics`.
pub fn select_list<'a>(document: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| document.get(*key))
        .find(|value| is_truthy(value))
}

pub fn normalize_topic(raw: &Map<String, Value>) -> Topic {
    Topic {
        topic: resolve_text(raw, TOPIC_ALIASES),
        kind: resolve_text(raw, TOPIC_TYPE_ALIASES),
        reason: resolve_text(raw, TOPIC_REASON_ALIASES),
    }
}

pub fn normalize_question(raw: &Map<String, Value>) -> Question {
    Question {
        question: resolve_text(raw, QUESTION_ALIASES),
        kind: resolve_text(raw, QUESTION_TYPE_ALIASES),
        context: resolve_text(raw, QUESTION_CONTEXT_ALIASES),
    }
}

pub fn normalize_topics(raw: &Value) -> Result<Vec<Topic>, FormatError> {
    let items = raw
        .as_array()
        .ok_or(FormatError::NotAList { field: "topics" })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object()
                .map(normalize_topic)
                .ok_or(FormatError::TopicNotObject { index })
        })
        .collect()
}

pub fn normalize_questions(raw: &Value) -> Result<Vec<Question>, FormatError> {
    let items = raw
        .as_array()
        .ok_or(FormatError::NotAList { field: "questions" })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object()
                .map(normalize_question)
                .ok_or(FormatError::QuestionNotObject { index })
        })
        .collect()
}
