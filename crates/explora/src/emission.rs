//! Client-facing event protocol, framed as Server-Sent Events.
//!
//! Every event is a single `data: ` line followed by a blank line. A stream ends with
//! exactly one of `data: [DONE]` or an `{"error": ...}` payload.
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::Stream;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};

use crate::normalize::{Question, Topic};

pub const DONE_SENTINEL: &str = "[DONE]";

/// Response headers a transport should send ahead of an [`SseBody`].
pub const SSE_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "text/event-stream"),
    ("Cache-Control", "no-cache"),
    ("Connection", "keep-alive"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum EmissionEvent {
    Content(String),
    Topics(Vec<Topic>),
    Questions(Vec<Question>),
    Error(String),
    Done,
}

impl EmissionEvent {
    /// JSON payload carried by the event, `None` for the terminal sentinel.
    pub fn payload(&self) -> Option<Value> {
        match self {
            EmissionEvent::Content(content) => Some(json!({ "content": content })),
            EmissionEvent::Topics(topics) => Some(json!({ "topics": topics })),
            EmissionEvent::Questions(questions) => Some(json!({ "questions": questions })),
            EmissionEvent::Error(message) => Some(json!({ "error": message })),
            EmissionEvent::Done => None,
        }
    }

    /// True for the events that close a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EmissionEvent::Done | EmissionEvent::Error(_))
    }

    pub fn to_sse(&self) -> String {
        match self.payload() {
            Some(payload) => format!("data: {}\n\n", payload),
            None => format!("data: {}\n\n", DONE_SENTINEL),
        }
    }
}

/// Byte stream of SSE frames, ready to hand to an HTTP body.
pub struct SseBody<'a> {
    events: BoxStream<'a, EmissionEvent>,
}

impl<'a> SseBody<'a> {
    pub fn new(events: BoxStream<'a, EmissionEvent>) -> Self {
        Self { events }
    }
}

impl Stream for SseBody<'_> {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events
            .as_mut()
            .poll_next(cx)
            .map(|opt| opt.map(|event| Ok(Bytes::from(event.to_sse()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_content_frame() {
        let frame = EmissionEvent::Content("hi".to_string()).to_sse();
        assert_eq!(frame, "data: {\"content\":\"hi\"}\n\n");
    }

    #[test]
    fn test_done_and_error_frames() {
        assert_eq!(EmissionEvent::Done.to_sse(), "data: [DONE]\n\n");
        assert_eq!(
            EmissionEvent::Error("upstream timed out".to_string()).to_sse(),
            "data: {\"error\":\"upstream timed out\"}\n\n"
        );
        assert!(EmissionEvent::Done.is_terminal());
        assert!(EmissionEvent::Error(String::new()).is_terminal());
        assert!(!EmissionEvent::Content(String::new()).is_terminal());
    }

    #[test]
    fn test_topics_frame_uses_canonical_keys() {
        let event = EmissionEvent::Topics(vec![Topic {
            topic: "Waves".to_string(),
            kind: "prerequisite".to_string(),
            reason: "Light is one".to_string(),
        }]);
        let frame = event.to_sse();
        let body = frame
            .strip_prefix("data: ")
            .and_then(|rest| rest.strip_suffix("\n\n"))
            .unwrap();
        let value: Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            value,
            json!({"topics": [{"topic": "Waves", "type": "prerequisite", "reason": "Light is one"}]})
        );
    }

    #[test]
    fn test_content_with_newlines_stays_on_one_line() {
        let frame = EmissionEvent::Content("a\n\nb".to_string()).to_sse();
        assert_eq!(frame.matches('\n').count(), 2);
        assert!(frame.ends_with("\n\n"));
    }

    #[tokio::test]
    async fn test_sse_body_frames_each_event() {
        let events = futures::stream::iter(vec![
            EmissionEvent::Content("hi".to_string()),
            EmissionEvent::Done,
        ])
        .boxed();
        let frames: Vec<Bytes> = SseBody::new(events)
            .map(|frame| match frame {
                Ok(bytes) => bytes,
                Err(never) => match never {},
            })
            .collect()
            .await;

        assert_eq!(
            frames,
            vec![
                Bytes::from("data: {\"content\":\"hi\"}\n\n"),
                Bytes::from("data: [DONE]\n\n"),
            ]
        );
    }
}
