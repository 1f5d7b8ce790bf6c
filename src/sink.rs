//! Recording of classification outcomes.
//!
//! The sink is the seam between the in-request pipeline and the durable
//! destination (log aggregation, a spreadsheet export, etc.). It is a trait
//! so the pipeline stays testable without capturing process-wide output,
//! and so the console implementation can later be swapped for a real
//! spreadsheet writer without touching the dispatch path.
//!
//! Sink failures are observability-only: the pipeline logs them and moves
//! on; they never surface as HTTP errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::classify::{Category, ClassificationResult};
use crate::types::{GroupId, UserId};

/// Rendered in place of an absent group identifier (direct chats).
pub const GROUP_SENTINEL: &str = "N/A";

/// The durable projection of an event and its classification outcome.
///
/// Write-once, append-only: records are constructed, handed to the sink,
/// and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// When the record was created (UTC).
    pub timestamp: DateTime<Utc>,

    /// The sending user.
    pub user_id: UserId,

    /// The group or room, absent for direct chats.
    pub group_id: Option<GroupId>,

    /// The original message text.
    pub message: String,

    /// Assigned triage category.
    pub category: Category,

    /// Buying-intent score, 0-100.
    pub intent_score: u8,

    /// Summary produced by the classifier (or the message itself on
    /// fallback).
    pub summary: String,

    /// Recommended next step, when one was produced. Absent (not null)
    /// when classification was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl LogRecord {
    /// Builds a record for a classified message, stamped with the current
    /// time.
    pub fn new(
        user_id: UserId,
        group_id: Option<GroupId>,
        message: impl Into<String>,
        result: ClassificationResult,
    ) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            user_id,
            group_id,
            message: message.into(),
            category: result.category,
            intent_score: result.intent_score,
            summary: result.summary,
            suggested_action: result.suggested_action,
        }
    }

    /// The group identifier as displayed, with the `N/A` sentinel for
    /// direct chats.
    pub fn group_display(&self) -> &str {
        self.group_id
            .as_ref()
            .map(GroupId::as_str)
            .unwrap_or(GROUP_SENTINEL)
    }
}

/// Errors that can occur writing a record.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The record could not be serialized for the destination.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The destination rejected the write.
    #[error("sink write failed: {0}")]
    Write(String),
}

/// Destination for classification outcomes.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Records one outcome. Implementations append; they never overwrite.
    async fn record(&self, record: &LogRecord) -> Result<(), SinkError>;
}

/// Sink that emits each record as a structured log event.
///
/// This stands in for the durable spreadsheet export: the record is written
/// as a single JSON line under the `chat_intake::records` target so it can
/// be scraped or shipped by the surrounding log infrastructure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

#[async_trait]
impl RecordSink for ConsoleSink {
    async fn record(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = serde_json::to_string(record)?;
        info!(
            target: "chat_intake::records",
            user_id = %record.user_id,
            group_id = %record.group_display(),
            category = ?record.category,
            intent_score = record.intent_score,
            record = %line,
            "message recorded"
        );
        Ok(())
    }
}

/// In-memory sink for tests: accumulates records in order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    records: std::sync::Mutex<Vec<LogRecord>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far, in write order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().expect("sink mutex poisoned").clone()
    }
}

#[cfg(test)]
#[async_trait]
impl RecordSink for MemorySink {
    async fn record(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .expect("sink mutex poisoned")
            .push(record.clone());
        Ok(())
    }
}
