use serde::{Deserialize, Serialize};

use super::agent::ProvenanceEntry;

// =============================================================================
// Turn Invocation Types
// =============================================================================

/// Chat transport the message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Web,
    Mobile,
    Whatsapp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Whatsapp => "whatsapp",
        }
    }
}

/// One user message to be handled as a conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    /// Conversation session identifier.
    pub session_id: String,
    /// Authenticated user identifier.
    pub user_id: i64,
    /// Raw message text.
    pub message: String,
    /// Originating channel.
    #[serde(default)]
    pub channel: Channel,
}

impl TurnRequest {
    /// Create a web-channel turn request.
    pub fn new(session_id: impl Into<String>, user_id: i64, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id,
            message: message.into(),
            channel: Channel::Web,
        }
    }

    /// Set the channel.
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }
}

/// The merged answer for a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub session_id: String,
    /// Reply text shown to the user.
    pub reply: String,
    /// One entry per capability invocation, in execution order.
    pub provenance: Vec<ProvenanceEntry>,
    /// Wall-clock time spent on the turn.
    pub response_time_ms: u64,
}
