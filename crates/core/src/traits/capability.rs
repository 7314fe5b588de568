//! Specialist capability contract.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;

use crate::error::{ErrorKind, Result};
use crate::types::{AgentResult, CapabilityOutput, Intent, TaskContext};

/// One domain-specific executor (booking, cancellation, complaint, ...).
///
/// Implementations must hold no per-user mutable state: the same instance is
/// invoked concurrently for different sessions.
#[async_trait]
pub trait SpecialistCapability: Send + Sync {
    /// Agent name recorded in provenance.
    fn name(&self) -> &str;

    /// Intent labels this capability handles.
    fn intents(&self) -> &[&'static str];

    /// Perform the domain action.
    async fn handle(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput>;

    /// Run [`handle`](Self::handle) against the deadline and fold the
    /// outcome into an [`AgentResult`]. Never returns an error.
    async fn execute(&self, intent: &Intent, context: &TaskContext, deadline: Instant) -> AgentResult {
        let started = Instant::now();
        let outcome = tokio::time::timeout_at(deadline, self.handle(intent, context)).await;
        let elapsed = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Ok(output)) => AgentResult::from_output(&intent.name, self.name(), output),
            Ok(Err(e)) => {
                tracing::warn!(agent = %self.name(), intent = %intent.name, error = %e, "Capability failed");
                AgentResult::failure(&intent.name, self.name(), e.kind(), e.to_string())
            }
            Err(_) => {
                tracing::warn!(agent = %self.name(), intent = %intent.name, "Capability hit the deadline");
                AgentResult::failure(&intent.name, self.name(), ErrorKind::Timeout, "deadline elapsed")
            }
        };

        result.with_elapsed(elapsed)
    }
}

/// Resolves an intent label to the capability that handles it.
pub trait CapabilityRegistry: Send + Sync {
    /// Look up the capability for an intent.
    fn resolve(&self, intent_name: &str) -> Option<Arc<dyn SpecialistCapability>>;

    /// All registered intent labels, sorted.
    fn intents(&self) -> Vec<String>;
}
