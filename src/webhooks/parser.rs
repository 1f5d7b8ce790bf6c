//! Webhook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed [`InboundEvent`]
//! values. The parser is designed to be robust against unknown fields and
//! event kinds.
//!
//! # Parsing Strategy
//!
//! 1. The envelope is parsed as `{"events": [...]}`
//! 2. Each entry is converted according to its `type` field
//! 3. Unknown event kinds, unknown message kinds, and entries missing the
//!    fields their kind requires are skipped (ignored, not an error)
//! 4. A malformed envelope returns `Err` with details
//!
//! Skipping rather than failing keeps one odd entry from discarding the rest
//! of the batch; the platform delivers heterogeneous batches routinely.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{GroupId, UserId};

use super::events::{
    EventSource, InboundEvent, MessageContent, MessageEvent, PostbackEvent, SourceKind,
    SourceOnlyEvent,
};

/// Error type for envelope parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes a missing `events` array).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Parses a webhook envelope into typed events.
///
/// Entries with unknown or incomplete kinds are dropped; the returned vector
/// preserves the order of the entries that survive.
///
/// # Examples
///
/// ```
/// use chat_intake::webhooks::parse_envelope;
///
/// let payload = br#"{
///     "destination": "U000",
///     "events": [{
///         "type": "message",
///         "message": { "type": "text", "id": "1", "text": "hello" },
///         "source": { "type": "user", "userId": "U123" },
///         "timestamp": 1700000000000
///     }]
/// }"#;
///
/// let events = parse_envelope(payload).unwrap();
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].text(), Some("hello"));
/// ```
pub fn parse_envelope(payload: &[u8]) -> Result<Vec<InboundEvent>, ParseError> {
    let raw: RawEnvelope = serde_json::from_slice(payload)?;

    Ok(raw.events.into_iter().filter_map(convert_event).collect())
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match the platform's webhook JSON structure. We use Option<T>
// liberally to handle missing fields gracefully, then validate per event
// kind explicitly.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    message: Option<RawMessage>,
    source: Option<RawSource>,
    postback: Option<RawPostback>,
    timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    #[serde(rename = "groupId")]
    group_id: Option<String>,
    #[serde(rename = "roomId")]
    room_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPostback {
    data: String,
}

/// Converts one raw entry into a typed event, or `None` if the entry should
/// be skipped.
fn convert_event(raw: RawEvent) -> Option<InboundEvent> {
    let source = convert_source(raw.source?)?;

    match raw.kind.as_str() {
        "message" => {
            let content = convert_message(raw.message?)?;
            Some(InboundEvent::Message(MessageEvent {
                source,
                content,
                timestamp_ms: raw.timestamp,
            }))
        }
        "follow" => Some(InboundEvent::Follow(SourceOnlyEvent { source })),
        "unfollow" => Some(InboundEvent::Unfollow(SourceOnlyEvent { source })),
        "join" => Some(InboundEvent::Join(SourceOnlyEvent { source })),
        "leave" => Some(InboundEvent::Leave(SourceOnlyEvent { source })),
        "postback" => Some(InboundEvent::Postback(PostbackEvent {
            source,
            data: raw.postback?.data,
        })),
        // Unknown event kinds are skipped (not an error)
        _ => None,
    }
}

fn convert_source(raw: RawSource) -> Option<EventSource> {
    // Rooms are multi-person chats too; their identifier fills the same
    // group-vs-direct distinction as a group identifier.
    let (kind, group_id) = match raw.kind.as_str() {
        "user" => (SourceKind::User, None),
        "group" => (SourceKind::Group, raw.group_id),
        "room" => (SourceKind::Room, raw.room_id),
        _ => return None,
    };

    Some(EventSource {
        kind,
        user_id: raw.user_id.map(UserId::new),
        group_id: group_id.map(GroupId::new),
    })
}

fn convert_message(raw: RawMessage) -> Option<MessageContent> {
    match raw.kind.as_str() {
        "text" => Some(MessageContent::Text { text: raw.text? }),
        "image" => Some(MessageContent::Image),
        "video" => Some(MessageContent::Video),
        "audio" => Some(MessageContent::Audio),
        "file" => Some(MessageContent::File),
        "sticker" => Some(MessageContent::Sticker),
        "location" => Some(MessageContent::Location),
        _ => None,
    }
}
