//! Messages exchanged with the provider and stored in session transcripts.
//!
//! The provider sees the same `{role, content}` shape that the transcript store keeps, so
//! a session's history can be replayed upstream without conversion.
pub mod message;
