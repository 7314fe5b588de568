use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::{AgentResult, ProvenanceEntry};
use super::request::Channel;
use crate::error::ErrorKind;

// =============================================================================
// Conversation Audit Types
// =============================================================================

/// Execution metadata for one capability invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentExecution {
    pub agent: String,
    pub intent_name: String,
    pub duration_ms: u64,
    pub success: bool,
    pub error: Option<ErrorKind>,
}

impl From<&AgentResult> for AgentExecution {
    fn from(result: &AgentResult) -> Self {
        Self {
            agent: result.agent.clone(),
            intent_name: result.intent_name.clone(),
            duration_ms: result.execution_time_ms,
            success: result.success,
            error: result.error,
        }
    }
}

/// Append-only audit record written once per turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub session_id: String,
    pub user_id: i64,
    pub channel: Channel,
    pub message: String,
    pub reply: String,
    pub executions: Vec<AgentExecution>,
    pub provenance: Vec<ProvenanceEntry>,
    /// Turn-level failure, e.g. `AllAgentsFailed`.
    pub error: Option<ErrorKind>,
    pub response_time_ms: u64,
    pub recorded_at: DateTime<Utc>,
}
