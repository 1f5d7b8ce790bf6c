//! Typed webhook event representations.
//!
//! This module defines the closed set of platform events the intake service
//! understands. Each variant corresponds to a webhook event kind with the
//! fields we need for processing.
//!
//! # Event Kinds
//!
//! - `message` - A user sent a message (only text content is triaged)
//! - `follow` / `unfollow` - A user added or blocked the bot
//! - `join` / `leave` - The bot was added to or removed from a group
//! - `postback` - A rich-menu or button postback
//!
//! Event kinds outside this set are represented by the parser returning
//! `None` for that entry, not by an error.

use serde::{Deserialize, Serialize};

use crate::types::{GroupId, UserId};

/// A parsed webhook event.
///
/// This enum contains only the event kinds the service cares about. Unknown
/// kinds are skipped at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundEvent {
    /// A message was sent to the bot. Only the text variant of
    /// [`MessageContent`] proceeds to classification.
    Message(MessageEvent),

    /// A user added the bot as a friend.
    Follow(SourceOnlyEvent),

    /// A user blocked or removed the bot.
    Unfollow(SourceOnlyEvent),

    /// The bot was invited into a group or room.
    Join(SourceOnlyEvent),

    /// The bot was removed from a group or room.
    Leave(SourceOnlyEvent),

    /// A postback action was triggered (rich menu, button).
    Postback(PostbackEvent),
}

impl InboundEvent {
    /// Returns the source of this event.
    pub fn source(&self) -> &EventSource {
        match self {
            InboundEvent::Message(e) => &e.source,
            InboundEvent::Follow(e) => &e.source,
            InboundEvent::Unfollow(e) => &e.source,
            InboundEvent::Join(e) => &e.source,
            InboundEvent::Leave(e) => &e.source,
            InboundEvent::Postback(e) => &e.source,
        }
    }

    /// Returns the text payload if this is a text message event.
    pub fn text(&self) -> Option<&str> {
        match self {
            InboundEvent::Message(e) => match &e.content {
                MessageContent::Text { text } => Some(text),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Where an event originated: a direct chat, a group, or a multi-person room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// One-on-one chat with a user.
    User,
    /// Group chat.
    Group,
    /// Multi-person room.
    Room,
}

/// The sender context attached to every event.
///
/// `user_id` can be absent for some group events (e.g., a join delivered
/// without an acting user). `group_id` is only present for group and room
/// sources; direct chats carry none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    /// The kind of chat the event came from.
    pub kind: SourceKind,

    /// The sending user, when the platform attributes one.
    pub user_id: Option<UserId>,

    /// The group or room, for non-direct chats.
    pub group_id: Option<GroupId>,
}

impl EventSource {
    /// Creates a direct-chat source for the given user.
    pub fn user(user_id: impl Into<UserId>) -> Self {
        EventSource {
            kind: SourceKind::User,
            user_id: Some(user_id.into()),
            group_id: None,
        }
    }

    /// Creates a group source for the given user and group.
    pub fn group(user_id: impl Into<UserId>, group_id: impl Into<GroupId>) -> Self {
        EventSource {
            kind: SourceKind::Group,
            user_id: Some(user_id.into()),
            group_id: Some(group_id.into()),
        }
    }
}

/// Content of a message event, tagged by message kind.
///
/// Only `Text` is triaged; the other kinds are modeled so the dispatch
/// match stays exhaustive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageContent {
    /// A plain text message.
    Text { text: String },
    /// An image message.
    Image,
    /// A video message.
    Video,
    /// An audio message.
    Audio,
    /// A file attachment.
    File,
    /// A sticker.
    Sticker,
    /// A shared location.
    Location,
}

impl MessageContent {
    /// Returns true for text content.
    pub fn is_text(&self) -> bool {
        matches!(self, MessageContent::Text { .. })
    }
}

/// A message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// The sender context.
    pub source: EventSource,

    /// The message content.
    pub content: MessageContent,

    /// Platform timestamp of the event (milliseconds since the epoch).
    pub timestamp_ms: Option<i64>,
}

/// An event that carries only its source context (follow, unfollow, join,
/// leave).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOnlyEvent {
    /// The sender context.
    pub source: EventSource,
}

/// A postback event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostbackEvent {
    /// The sender context.
    pub source: EventSource,

    /// Opaque postback payload configured on the triggering control.
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_event(text: &str) -> InboundEvent {
        InboundEvent::Message(MessageEvent {
            source: EventSource::user("U1"),
            content: MessageContent::Text {
                text: text.to_string(),
            },
            timestamp_ms: None,
        })
    }

    #[test]
    fn text_accessor_returns_text_for_text_messages() {
        assert_eq!(text_event("hello").text(), Some("hello"));
    }

    #[test]
    fn text_accessor_returns_none_for_non_text_content() {
        let event = InboundEvent::Message(MessageEvent {
            source: EventSource::user("U1"),
            content: MessageContent::Sticker,
            timestamp_ms: None,
        });
        assert_eq!(event.text(), None);
    }

    #[test]
    fn text_accessor_returns_none_for_non_message_events() {
        let event = InboundEvent::Follow(SourceOnlyEvent {
            source: EventSource::user("U1"),
        });
        assert_eq!(event.text(), None);
    }

    #[test]
    fn source_accessor_is_consistent_across_variants() {
        let source = EventSource::group("U1", "C1");
        let event = InboundEvent::Postback(PostbackEvent {
            source: source.clone(),
            data: "action=buy".to_string(),
        });
        assert_eq!(event.source(), &source);
    }

    #[test]
    fn source_kind_json_format() {
        assert_eq!(serde_json::to_string(&SourceKind::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&SourceKind::Group).unwrap(),
            "\"group\""
        );
        assert_eq!(serde_json::to_string(&SourceKind::Room).unwrap(), "\"room\"");
    }

    #[test]
    fn group_source_carries_group_id() {
        let source = EventSource::group("U1", "C1");
        assert_eq!(source.kind, SourceKind::Group);
        assert_eq!(source.group_id, Some(GroupId::new("C1")));
    }

    #[test]
    fn user_source_has_no_group_id() {
        let source = EventSource::user("U1");
        assert_eq!(source.kind, SourceKind::User);
        assert_eq!(source.group_id, None);
    }
}
