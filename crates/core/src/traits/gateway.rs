//! Edge collaborators: intent classification in, language generation out.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AgentResult, Intent, TurnRequest};

/// Reply used when nothing in a turn succeeded.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I wasn't able to help with that just now. Please try again in a moment or contact our support team.";

/// Note appended to a reply when some capabilities failed.
pub const PARTIAL_NOTICE: &str =
    "I couldn't complete every part of your request; a support agent can help with the rest.";

/// Intent classifier for incoming messages.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Return every intent detected in the message, in detection order.
    async fn classify(&self, request: &TurnRequest) -> Result<Vec<Intent>>;
}

/// Turns structured results into reply prose.
pub trait ResponseFormatter: Send + Sync {
    /// Render a single successful contribution.
    fn render_single(&self, result: &AgentResult) -> Result<String>;

    /// Render several successful contributions, keeping each one visible.
    fn render_combined(&self, results: &[&AgentResult]) -> Result<String>;

    /// Apology shown when nothing succeeded.
    fn fallback(&self) -> String {
        FALLBACK_REPLY.to_string()
    }

    /// Note appended when only part of the request could be handled.
    fn partial_notice(&self) -> Option<String> {
        Some(PARTIAL_NOTICE.to_string())
    }
}
