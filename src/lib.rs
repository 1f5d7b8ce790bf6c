//! Chat Intake - a messaging-platform webhook receiver with LLM-backed triage.
//!
//! This library provides the core types and logic for the intake service:
//! signature verification, event parsing, message classification, and
//! result recording. The standalone `mint-token` binary reuses the
//! [`token`] module to obtain channel access tokens.

pub mod classify;
pub mod config;
pub mod pipeline;
pub mod server;
pub mod sink;
pub mod token;
pub mod types;
pub mod webhooks;
