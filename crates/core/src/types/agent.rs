use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use super::intent::Intent;
use super::request::{Channel, TurnRequest};
use crate::error::ErrorKind;

// =============================================================================
// Planning Types
// =============================================================================

/// Partition of a turn's intents into a concurrent group and an ordered chain.
///
/// Every input intent lands in exactly one list; `sequential_chain` is a
/// topological order of the dependency edges among the turn's intents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub independent: Vec<Intent>,
    pub sequential_chain: Vec<Intent>,
}

impl ExecutionPlan {
    /// Total number of intents in the plan.
    pub fn len(&self) -> usize {
        self.independent.len() + self.sequential_chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of an earlier sequential step, visible to later steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub intent_name: String,
    pub success: bool,
    pub payload: Option<Value>,
    pub error: Option<ErrorKind>,
}

/// Per-task input context.
///
/// Carries the turn identity and, for chained tasks, the outcomes of every
/// step that ran before.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskContext {
    pub session_id: String,
    pub user_id: i64,
    pub channel: Channel,
    /// Raw user message for the turn.
    pub message: String,
    /// Outcomes of earlier steps in the chain, oldest first.
    #[serde(default)]
    pub prior_steps: Vec<StepOutcome>,
}

impl TaskContext {
    /// Build the base context for a turn.
    pub fn for_turn(request: &TurnRequest) -> Self {
        Self {
            session_id: request.session_id.clone(),
            user_id: request.user_id,
            channel: request.channel,
            message: request.message.clone(),
            prior_steps: Vec::new(),
        }
    }

    /// Record a finished step so later steps can see it.
    pub fn extend_with(&mut self, result: &AgentResult) {
        self.prior_steps.push(StepOutcome {
            intent_name: result.intent_name.clone(),
            success: result.success,
            payload: result.payload.clone(),
            error: result.error,
        });
    }

    /// The most recent step, if any.
    pub fn last_step(&self) -> Option<&StepOutcome> {
        self.prior_steps.last()
    }

    /// Payload of the latest successful step for `intent_name`.
    pub fn payload_from(&self, intent_name: &str) -> Option<&Value> {
        self.prior_steps
            .iter()
            .rev()
            .filter(|s| s.success && s.intent_name == intent_name)
            .find_map(|s| s.payload.as_ref())
    }

    /// Whether any earlier step in the chain failed.
    pub fn upstream_failed(&self) -> bool {
        self.prior_steps.iter().any(|s| !s.success)
    }
}

/// A unit of work submitted to a specialist capability.
#[derive(Debug, Clone)]
pub struct AgentTask {
    pub intent: Intent,
    /// Absolute turn deadline.
    pub deadline: Instant,
    pub context: TaskContext,
    /// Position of this task's result in the merged timeline.
    pub order: u32,
}

impl AgentTask {
    pub fn new(intent: Intent, context: TaskContext, deadline: Instant, order: u32) -> Self {
        Self {
            intent,
            deadline,
            context,
            order,
        }
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// What a capability produces on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityOutput {
    /// Machine-readable action, e.g. `booking_cancelled`.
    pub action: String,
    /// One-line, user-presentable summary of the contribution.
    pub summary: String,
    /// Structured result data.
    pub payload: Value,
}

impl CapabilityOutput {
    pub fn new(action: impl Into<String>, summary: impl Into<String>, payload: Value) -> Self {
        Self {
            action: action.into(),
            summary: summary.into(),
            payload,
        }
    }
}

/// Result of running one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub intent_name: String,
    /// Name of the capability that handled the intent.
    pub agent: String,
    pub success: bool,
    pub payload: Option<Value>,
    pub summary: Option<String>,
    pub action: Option<String>,
    pub error: Option<ErrorKind>,
    /// Internal failure detail for logs; never shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub execution_time_ms: u64,
    /// Position in the merged timeline; unique per turn.
    pub order: u32,
}

impl AgentResult {
    /// Successful result from a capability output.
    pub fn from_output(
        intent_name: impl Into<String>,
        agent: impl Into<String>,
        output: CapabilityOutput,
    ) -> Self {
        Self {
            intent_name: intent_name.into(),
            agent: agent.into(),
            success: true,
            payload: Some(output.payload),
            summary: Some(output.summary),
            action: Some(output.action),
            error: None,
            detail: None,
            execution_time_ms: 0,
            order: 0,
        }
    }

    /// Failed result.
    pub fn failure(
        intent_name: impl Into<String>,
        agent: impl Into<String>,
        kind: ErrorKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            intent_name: intent_name.into(),
            agent: agent.into(),
            success: false,
            payload: None,
            summary: None,
            action: None,
            error: Some(kind),
            detail: Some(detail.into()),
            execution_time_ms: 0,
            order: 0,
        }
    }

    /// Timeout result for a task that never reported back.
    pub fn timed_out(intent_name: impl Into<String>, agent: impl Into<String>) -> Self {
        Self::failure(intent_name, agent, ErrorKind::Timeout, "deadline elapsed")
    }

    pub fn with_elapsed(mut self, execution_time_ms: u64) -> Self {
        self.execution_time_ms = execution_time_ms;
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

/// Attribution record for one agent result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub agent: String,
    pub contribution_summary: String,
    pub action_taken: String,
    pub order: u32,
    pub execution_time_ms: u64,
    pub success: bool,
}

impl From<&AgentResult> for ProvenanceEntry {
    fn from(result: &AgentResult) -> Self {
        let (contribution_summary, action_taken) = if result.success {
            (
                result.summary.clone().unwrap_or_default(),
                result.action.clone().unwrap_or_else(|| result.intent_name.clone()),
            )
        } else {
            let kind = result.error.unwrap_or(ErrorKind::AgentFailure);
            (
                format!("{} {}", result.intent_name, kind.describe()),
                "none".to_string(),
            )
        };

        Self {
            agent: result.agent.clone(),
            contribution_summary,
            action_taken,
            order: result.order,
            execution_time_ms: result.execution_time_ms,
            success: result.success,
        }
    }
}
