//! Mock implementations of core traits for testing.
//!
//! Shared by unit and integration tests across the workspace.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    error::ErrorKind,
    traits::{CapabilityRegistry, ConversationLog, IntentClassifier, SpecialistCapability},
    types::{CapabilityOutput, Intent, TaskContext, TurnRecord, TurnRequest},
    Error, Result,
};

// =============================================================================
// Mock Capability
// =============================================================================

/// Scripted behaviour for a [`MockCapability`].
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Sleep, then succeed with the given summary.
    Succeed { delay: Duration, summary: String },
    /// Sleep, then fail with an error of the given kind.
    Fail { delay: Duration, kind: ErrorKind },
    /// Panic inside the capability.
    Panic,
    /// Never complete.
    Hang,
}

/// Capability that follows a script and records every context it sees.
pub struct MockCapability {
    name: String,
    intents: Vec<&'static str>,
    behavior: MockBehavior,
    seen: Mutex<Vec<TaskContext>>,
}

impl MockCapability {
    fn build(name: &str, intent: &'static str, behavior: MockBehavior) -> Self {
        Self {
            name: name.to_string(),
            intents: vec![intent],
            behavior,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Succeed immediately.
    pub fn ok(intent: &'static str, summary: &str) -> Self {
        Self::delayed(intent, summary, Duration::ZERO)
    }

    /// Succeed after `delay`.
    pub fn delayed(intent: &'static str, summary: &str, delay: Duration) -> Self {
        Self::build(
            &format!("{}_agent", intent),
            intent,
            MockBehavior::Succeed {
                delay,
                summary: summary.to_string(),
            },
        )
    }

    /// Fail immediately with `kind`.
    pub fn failing(intent: &'static str, kind: ErrorKind) -> Self {
        Self::build(
            &format!("{}_agent", intent),
            intent,
            MockBehavior::Fail {
                delay: Duration::ZERO,
                kind,
            },
        )
    }

    /// Panic when invoked.
    pub fn panicking(intent: &'static str) -> Self {
        Self::build(&format!("{}_agent", intent), intent, MockBehavior::Panic)
    }

    /// Never return.
    pub fn hanging(intent: &'static str) -> Self {
        Self::build(&format!("{}_agent", intent), intent, MockBehavior::Hang)
    }

    /// Contexts passed to this capability, in call order.
    pub fn seen_contexts(&self) -> Vec<TaskContext> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of invocations.
    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn error_of_kind(kind: ErrorKind) -> Error {
    match kind {
        ErrorKind::Timeout => Error::Timeout("scripted".into()),
        ErrorKind::InvalidState => Error::invalid_state("scripted"),
        ErrorKind::BookingNotFound => Error::BookingNotFound("scripted".into()),
        ErrorKind::ComplaintNotFound => Error::ComplaintNotFound("scripted".into()),
        ErrorKind::InvalidDependencyGraph => Error::invalid_graph("scripted"),
        ErrorKind::AllAgentsFailed => Error::AllAgentsFailed,
        ErrorKind::AgentFailure => Error::agent_failure("scripted"),
    }
}

#[async_trait]
impl SpecialistCapability for MockCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn intents(&self) -> &[&'static str] {
        &self.intents
    }

    async fn handle(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).push(context.clone());

        match &self.behavior {
            MockBehavior::Succeed { delay, summary } => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(CapabilityOutput::new(
                    format!("{}_done", intent.name),
                    summary.clone(),
                    serde_json::json!({
                        "intent": intent.name,
                        "prior_steps": context.prior_steps.len(),
                    }),
                ))
            }
            MockBehavior::Fail { delay, kind } => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Err(error_of_kind(*kind))
            }
            MockBehavior::Panic => panic!("scripted panic in {}", self.name),
            MockBehavior::Hang => std::future::pending().await,
        }
    }
}

// =============================================================================
// Mock Registry
// =============================================================================

/// HashMap-backed registry for tests.
#[derive(Default)]
pub struct StaticRegistry {
    capabilities: HashMap<String, Arc<dyn SpecialistCapability>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under each of its intents.
    pub fn with(mut self, capability: Arc<dyn SpecialistCapability>) -> Self {
        for intent in capability.intents() {
            self.capabilities.insert(intent.to_string(), capability.clone());
        }
        self
    }
}

impl CapabilityRegistry for StaticRegistry {
    fn resolve(&self, intent_name: &str) -> Option<Arc<dyn SpecialistCapability>> {
        self.capabilities.get(intent_name).cloned()
    }

    fn intents(&self) -> Vec<String> {
        let mut names: Vec<String> = self.capabilities.keys().cloned().collect();
        names.sort();
        names
    }
}

// =============================================================================
// Mock Classifier
// =============================================================================

/// Classifier that returns a fixed intent list, or fails.
pub struct StaticClassifier {
    intents: Vec<Intent>,
    fail: bool,
}

impl StaticClassifier {
    pub fn new(intents: Vec<Intent>) -> Self {
        Self { intents, fail: false }
    }

    /// A classifier whose backend is down.
    pub fn unavailable() -> Self {
        Self {
            intents: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl IntentClassifier for StaticClassifier {
    async fn classify(&self, _request: &TurnRequest) -> Result<Vec<Intent>> {
        if self.fail {
            return Err(Error::Classification("classifier unavailable".into()));
        }
        Ok(self.intents.clone())
    }
}

// =============================================================================
// Mock Conversation Log
// =============================================================================

/// Conversation log that keeps every record in a Vec.
#[derive(Default)]
pub struct RecordingLog {
    records: Mutex<Vec<TurnRecord>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TurnRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ConversationLog for RecordingLog {
    async fn append(&self, record: TurnRecord) -> Result<()> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).push(record);
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<TurnRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }
}
