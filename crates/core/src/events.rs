use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured event envelope for turn lifecycle auditing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: String,
    /// Session ID (if applicable)
    pub session_id: Option<String>,
    /// Actor who triggered the event (user id, agent name, or 'system')
    pub actor: String,
    /// Timestamp of the event
    pub timestamp: DateTime<Utc>,
    /// Event type category
    pub event_type: EventType,
    /// Event severity level
    pub severity: EventSeverity,
    /// Structured payload (event-specific data)
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: None,
            actor: "system".to_string(),
            timestamp: Utc::now(),
            event_type,
            severity: EventSeverity::Info,
            payload,
        }
    }

    pub fn with_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = actor.to_string();
        self
    }

    pub fn with_severity(mut self, severity: EventSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Emit the event on the `concierge::events` tracing target.
    pub fn emit(&self) {
        let payload = serde_json::to_string(&self.payload).unwrap_or_default();
        let event_type = serde_json::to_string(&self.event_type).unwrap_or_default();
        match self.severity {
            EventSeverity::Debug => tracing::debug!(
                target: "concierge::events",
                event_id = %self.id,
                event_type = %event_type,
                session_id = ?self.session_id,
                actor = %self.actor,
                payload = %payload,
            ),
            EventSeverity::Info => tracing::info!(
                target: "concierge::events",
                event_id = %self.id,
                event_type = %event_type,
                session_id = ?self.session_id,
                actor = %self.actor,
                payload = %payload,
            ),
            EventSeverity::Warning => tracing::warn!(
                target: "concierge::events",
                event_id = %self.id,
                event_type = %event_type,
                session_id = ?self.session_id,
                actor = %self.actor,
                payload = %payload,
            ),
            EventSeverity::Error | EventSeverity::Critical => tracing::error!(
                target: "concierge::events",
                event_id = %self.id,
                event_type = %event_type,
                session_id = ?self.session_id,
                actor = %self.actor,
                payload = %payload,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Received a new message from the user
    TurnReceived,
    /// Classifier returned the turn's intents
    IntentsClassified,
    /// Dependency analysis produced an execution plan
    PlanBuilt,
    /// A capability finished (successfully or not)
    AgentFinished,
    /// Merged reply produced
    TurnCompleted,
    /// Nothing in the turn succeeded
    AllAgentsFailed,
    /// System error or exception
    SystemError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// Payload for [`EventType::AgentFinished`].
#[derive(Serialize, Deserialize)]
pub struct AgentFinishedPayload {
    pub agent: String,
    pub intent: String,
    pub order: u32,
    pub duration_ms: u64,
    pub success: bool,
    pub error: Option<String>,
}

/// Payload for [`EventType::PlanBuilt`].
#[derive(Serialize, Deserialize)]
pub struct PlanBuiltPayload {
    pub independent: Vec<String>,
    pub sequential_chain: Vec<String>,
}
