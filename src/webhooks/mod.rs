//! Webhook handling for platform events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256, base64)
//! - Envelope parsing into typed events

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{
    EventSource, InboundEvent, MessageContent, MessageEvent, PostbackEvent, SourceKind,
    SourceOnlyEvent,
};
pub use parser::{parse_envelope, ParseError};
pub use signature::{
    compute_signature, decode_signature_header, format_signature_header, verify_signature,
};
