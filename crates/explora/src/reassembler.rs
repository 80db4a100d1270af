//! Incremental reassembly of a JSON document delivered in arbitrary fragments.
//!
//! Fragment boundaries carry no meaning: a fragment may end in the middle of a key, a
//! string escape, or a multi-byte character's worth of text. After every fragment the whole
//! buffer is parsed again; most attempts fail and that is the normal case.
use serde_json::{Map, Value};
use tracing::debug;

/// Result of one parse attempt over the accumulated buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The buffer currently holds one complete JSON object.
    Complete(Map<String, Value>),
    /// The buffer is not (yet) a JSON object. Not an error.
    Incomplete,
}

impl ParseOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, ParseOutcome::Complete(_))
    }
}

/// Append-only text buffer for one streaming request.
#[derive(Debug, Default, Clone)]
pub struct Reassembler {
    buffer: String,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `fragment` and try to parse everything received so far.
    pub fn push(&mut self, fragment: &str) -> ParseOutcome {
        self.buffer.push_str(fragment);
        parse_document(&self.buffer)
    }

    /// Everything received so far, valid JSON or not.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_text(self) -> String {
        self.buffer
    }
}

/// Functional form of [`Reassembler::push`]: consumes the buffer state and returns the
/// next one alongside the outcome.
pub fn process_chunk(mut state: Reassembler, fragment: &str) -> (Reassembler, ParseOutcome) {
    let outcome = state.push(fragment);
    (state, outcome)
}

fn parse_document(text: &str) -> ParseOutcome {
    // An object can only be complete once the closing brace has arrived.
    if !text.trim_end().ends_with('}') {
        return ParseOutcome::Incomplete;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(document)) => ParseOutcome::Complete(document),
        Ok(_) => {
            debug!(len = text.len(), "buffer parsed to a non-object value");
            ParseOutcome::Incomplete
        }
        Err(err) => {
            debug!(len = text.len(), error = %err, "buffer not yet valid JSON");
            ParseOutcome::Incomplete
        }
    }
}
