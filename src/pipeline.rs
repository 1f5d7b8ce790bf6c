//! Per-batch event processing.
//!
//! The pipeline walks a parsed webhook batch in array order and, for each
//! text message, runs classification and hands the outcome to the sink.
//! Everything else is skipped.
//!
//! Two guarantees matter here:
//!
//! - Events are awaited one at a time, so sink writes land in the same
//!   order as the qualifying events in the input batch. Downstream log
//!   ordering depends on this.
//! - One event's failure (classification or sink) never aborts the rest of
//!   the batch. Failures are logged and the loop continues.

use tracing::{debug, warn};

use crate::classify::Classifier;
use crate::sink::{LogRecord, RecordSink};
use crate::webhooks::{InboundEvent, MessageContent};

/// Summary of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Text messages classified and handed to the sink.
    pub processed: usize,

    /// Events skipped as out of scope (non-message kinds, non-text
    /// content, unattributable senders).
    pub skipped: usize,
}

/// Processes a batch of events sequentially.
///
/// Returns only after every qualifying event has been classified and its
/// record offered to the sink; the webhook response must not be sent
/// before that.
pub async fn process_batch(
    events: Vec<InboundEvent>,
    classifier: &Classifier,
    sink: &dyn RecordSink,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for event in events {
        match event {
            InboundEvent::Message(message) => match message.content {
                MessageContent::Text { text } => {
                    let Some(user_id) = message.source.user_id else {
                        // Without a sender there is nothing to key the
                        // record by.
                        debug!("skipping text message with no sender attribution");
                        outcome.skipped += 1;
                        continue;
                    };

                    let result = classifier.classify(&text).await;
                    let record =
                        LogRecord::new(user_id, message.source.group_id, text, result);

                    if let Err(e) = sink.record(&record).await {
                        warn!(
                            error = %e,
                            user_id = %record.user_id,
                            "failed to record classification outcome"
                        );
                    }
                    outcome.processed += 1;
                }
                other => {
                    debug!(content = ?other, "skipping non-text message");
                    outcome.skipped += 1;
                }
            },
            InboundEvent::Follow(_)
            | InboundEvent::Unfollow(_)
            | InboundEvent::Join(_)
            | InboundEvent::Leave(_)
            | InboundEvent::Postback(_) => {
                debug!("skipping non-message event");
                outcome.skipped += 1;
            }
        }
    }

    outcome
}
