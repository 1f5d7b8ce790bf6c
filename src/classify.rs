//! Message classification via an external language-model service.
//!
//! The classifier sends each inbound text message to the Anthropic messages
//! API with a fixed triage instruction and parses the model's reply as a
//! structured verdict. Classification is best-effort enrichment, not a
//! correctness-critical path: on any failure (unconfigured key, network
//! error, non-2xx response, unparseable output) the client degrades to a
//! deterministic fallback result so the caller never has to handle an error.
//! A single attempt is made per message; no retry.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Default API base URL. Overridable for tests via [`Classifier::with_base_url`].
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Fixed model identifier used for every classification call.
const CLAUDE_MODEL: &str = "claude-3-haiku-20240307";

/// API version header required by the messages endpoint.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Output token budget for the verdict.
const MAX_OUTPUT_TOKENS: u32 = 300;

/// Bound on the outbound call so a slow provider can never stall the
/// webhook response indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Suggested action recorded when a classification attempt failed.
pub const FALLBACK_NOTE: &str = "unable to analyze";

/// Fixed triage instruction sent as the system prompt.
const SYSTEM_PROMPT: &str = "You are a message-triage assistant for a sales team. \
Classify the user's message into exactly one category: \
\"faq\" (a general product or support question), \
\"high_intent\" (a buying signal: the message touches pricing, contract, trial, \
demo, starting a partnership, cost, budget, timeline, or implementation), or \
\"other\" (anything else). \
Respond with JSON only, no prose, in exactly this shape: \
{\"type\": \"faq\" | \"high_intent\" | \"other\", \
\"intentScore\": <integer 0-100>, \
\"summary\": \"<one-sentence summary of the message>\", \
\"suggestedAction\": \"<recommended next step for the sales team>\"}";

/// Triage category assigned to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// General product or support question.
    Faq,
    /// Buying signal worth a prompt follow-up.
    HighIntent,
    /// Neither of the above.
    Other,
    /// Classification was not performed (fallback).
    Unknown,
}

/// The outcome of classifying one message. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Assigned category.
    pub category: Category,

    /// Buying-intent score, 0-100.
    pub intent_score: u8,

    /// One-sentence summary of the message. For fallback results this is
    /// the original message text.
    pub summary: String,

    /// Recommended next step, when one was produced.
    pub suggested_action: Option<String>,
}

impl ClassificationResult {
    /// Fallback when no API credential is configured: no call was attempted.
    fn unconfigured(message: &str) -> Self {
        ClassificationResult {
            category: Category::Unknown,
            intent_score: 0,
            summary: message.to_string(),
            suggested_action: None,
        }
    }

    /// Fallback when a classification attempt failed.
    fn degraded(message: &str) -> Self {
        ClassificationResult {
            category: Category::Unknown,
            intent_score: 0,
            summary: message.to_string(),
            suggested_action: Some(FALLBACK_NOTE.to_string()),
        }
    }
}

/// Errors internal to a classification attempt.
///
/// These never escape [`Classifier::classify`]; they exist so the failure
/// can be logged with its cause before degrading to the fallback result.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Network failure, timeout, or non-2xx response.
    #[error("classification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response carried no text content block.
    #[error("classification response contained no text content")]
    NoTextContent,

    /// The model's text output was not the expected JSON verdict.
    #[error("malformed verdict: {0}")]
    MalformedVerdict(#[from] serde_json::Error),

    /// The verdict's intent score was outside 0-100.
    #[error("intent score out of range: {0}")]
    ScoreOutOfRange(u8),
}

/// Client for the external classification service.
///
/// Cheap to clone; the underlying HTTP client is reference-counted.
#[derive(Clone)]
pub struct Classifier {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl Classifier {
    /// Creates a classifier. `api_key` of `None` means every call returns
    /// the unconfigured fallback without touching the network.
    pub fn new(api_key: Option<String>) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Classifier {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Overrides the API base URL (tests point this at a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns true if an API credential is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Classifies a message. Never fails: any error in the attempt degrades
    /// to a deterministic fallback result.
    pub async fn classify(&self, message: &str) -> ClassificationResult {
        let Some(api_key) = &self.api_key else {
            debug!("no classification API key configured, skipping call");
            return ClassificationResult::unconfigured(message);
        };

        match self.request_verdict(api_key, message).await {
            Ok(result) => {
                debug!(
                    category = ?result.category,
                    intent_score = result.intent_score,
                    "message classified"
                );
                result
            }
            Err(e) => {
                warn!(error = %e, "classification failed, using fallback");
                ClassificationResult::degraded(message)
            }
        }
    }

    /// Issues the single classification request and parses the verdict.
    async fn request_verdict(
        &self,
        api_key: &str,
        message: &str,
    ) -> Result<ClassificationResult, ClassifyError> {
        let request = MessagesRequest {
            model: CLAUDE_MODEL,
            max_tokens: MAX_OUTPUT_TOKENS,
            system: SYSTEM_PROMPT,
            messages: vec![TurnMessage {
                role: "user",
                content: message,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let reply: MessagesResponse = response.json().await?;

        let text = reply
            .content
            .iter()
            .find_map(|block| match block.kind.as_str() {
                "text" => block.text.as_deref(),
                _ => None,
            })
            .ok_or(ClassifyError::NoTextContent)?;

        parse_verdict(text)
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("configured", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Parses the model's text output strictly as a JSON verdict.
fn parse_verdict(text: &str) -> Result<ClassificationResult, ClassifyError> {
    let verdict: RawVerdict = serde_json::from_str(text.trim())?;

    if verdict.intent_score > 100 {
        return Err(ClassifyError::ScoreOutOfRange(verdict.intent_score));
    }

    Ok(ClassificationResult {
        category: verdict.category,
        intent_score: verdict.intent_score,
        summary: verdict.summary,
        suggested_action: verdict.suggested_action,
    })
}

// ============================================================================
// Wire structures for the messages endpoint
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<TurnMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TurnMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

/// The verdict shape the model is instructed to emit.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(rename = "type")]
    category: Category,
    #[serde(rename = "intentScore")]
    intent_score: u8,
    summary: String,
    #[serde(rename = "suggestedAction")]
    suggested_action: Option<String>,
}
