//! Turn orchestration.
//!
//! One turn runs as:
//! 1. Classify the message into intents and drop low-confidence ones
//! 2. Plan: split intents into a parallel group and a dependency chain
//! 3. Execute both groups under one shared deadline
//! 4. Merge results into a reply plus provenance
//! 5. Append the turn to the conversation log
//!
//! A single intent skips planning and calls its capability directly.

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use concierge_core::{
    config::OrchestratorConfig,
    error::ErrorKind,
    events::{AgentFinishedPayload, EventEnvelope, EventSeverity, EventType, PlanBuiltPayload},
    traits::{CapabilityRegistry, ConversationLog, IntentClassifier, TurnHandler},
    types::{AgentExecution, AgentResult, Intent, TaskContext, TurnRecord, TurnRequest, TurnResponse},
    Result,
};

use crate::executor::{ParallelExecutor, SequentialExecutor, UNASSIGNED_AGENT};
use crate::merger::{MergedResponse, ResponseMerger};
use crate::planning::ExecutionPlanner;

/// Per-turn limits.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Shared wall-clock budget for a whole turn.
    pub turn_timeout: Duration,
    /// Intents below this confidence are ignored.
    pub min_confidence: f32,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(30),
            min_confidence: 0.0,
        }
    }
}

impl From<&OrchestratorConfig> for TurnConfig {
    fn from(config: &OrchestratorConfig) -> Self {
        Self {
            turn_timeout: Duration::from_millis(config.turn_timeout_ms),
            min_confidence: config.min_confidence,
        }
    }
}

/// Top-level turn handler.
pub struct Orchestrator {
    pub(crate) config: TurnConfig,
    pub(crate) classifier: Arc<dyn IntentClassifier>,
    pub(crate) registry: Arc<dyn CapabilityRegistry>,
    pub(crate) planner: ExecutionPlanner,
    pub(crate) parallel: ParallelExecutor,
    pub(crate) sequential: SequentialExecutor,
    pub(crate) merger: ResponseMerger,
    pub(crate) log: Option<Arc<dyn ConversationLog>>,
}

impl Orchestrator {
    /// Create a new builder for Orchestrator.
    pub fn builder() -> crate::builder::OrchestratorBuilder {
        crate::builder::OrchestratorBuilder::new()
    }

    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    /// Classify the request; a classifier outage yields no intents.
    async fn classify(&self, request: &TurnRequest) -> Vec<Intent> {
        let intents = match self.classifier.classify(request).await {
            Ok(intents) => intents,
            Err(e) => {
                tracing::error!(session_id = %request.session_id, error = %e, "Intent classification failed");
                EventEnvelope::new(EventType::SystemError, serde_json::json!({ "stage": "classify", "error": e.to_string() }))
                    .with_session(&request.session_id)
                    .with_severity(EventSeverity::Error)
                    .emit();
                return Vec::new();
            }
        };

        let (kept, dropped): (Vec<Intent>, Vec<Intent>) = intents
            .into_iter()
            .partition(|i| i.confidence >= self.config.min_confidence);
        if !dropped.is_empty() {
            tracing::debug!(
                dropped = ?dropped.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
                threshold = self.config.min_confidence,
                "Dropped low-confidence intents"
            );
        }

        EventEnvelope::new(
            EventType::IntentsClassified,
            serde_json::json!({ "intents": kept.iter().map(|i| &i.name).collect::<Vec<_>>() }),
        )
        .with_session(&request.session_id)
        .emit();

        kept
    }

    /// Invoke one capability directly, without planning or spawning.
    async fn run_single(&self, intent: Intent, context: &TaskContext, deadline: Instant) -> AgentResult {
        let Some(capability) = self.registry.resolve(&intent.name) else {
            tracing::warn!(intent = %intent.name, "No capability registered for intent");
            return AgentResult::failure(
                &intent.name,
                UNASSIGNED_AGENT,
                ErrorKind::AgentFailure,
                format!("no capability registered for '{}'", intent.name),
            );
        };

        let started = Instant::now();
        let guarded = AssertUnwindSafe(capability.execute(&intent, context, deadline)).catch_unwind();
        match tokio::time::timeout_at(deadline, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                tracing::error!(agent = %capability.name(), intent = %intent.name, "Capability panicked");
                AgentResult::failure(&intent.name, capability.name(), ErrorKind::AgentFailure, "capability panicked")
                    .with_elapsed(started.elapsed().as_millis() as u64)
            }
            Err(_) => {
                tracing::warn!(agent = %capability.name(), intent = %intent.name, "Capability abandoned at deadline");
                AgentResult::timed_out(&intent.name, capability.name())
                    .with_elapsed(started.elapsed().as_millis() as u64)
            }
        }
    }

    /// Plan and execute a multi-intent turn.
    async fn run_planned(&self, intents: Vec<Intent>, context: &TaskContext, deadline: Instant) -> Result<MergedResponse> {
        let schedule = self.planner.plan(intents, context, deadline)?;

        EventEnvelope::new(
            EventType::PlanBuilt,
            serde_json::to_value(PlanBuiltPayload {
                independent: schedule.plan.independent.iter().map(|i| i.name.clone()).collect(),
                sequential_chain: schedule.plan.sequential_chain.iter().map(|i| i.name.clone()).collect(),
            })?,
        )
        .with_session(&context.session_id)
        .with_severity(EventSeverity::Debug)
        .emit();

        let (parallel, sequential) = tokio::join!(
            self.parallel.execute(schedule.parallel, deadline),
            self.sequential.execute(schedule.sequential, deadline),
        );

        Ok(self.merger.merge(parallel, sequential))
    }

    fn record_results(&self, session_id: &str, merged: &MergedResponse) {
        for result in &merged.results {
            concierge_governance::track_agent(
                &result.intent_name,
                result.success,
                result.error,
                result.execution_time_ms as f64 / 1000.0,
            );

            let payload = AgentFinishedPayload {
                agent: result.agent.clone(),
                intent: result.intent_name.clone(),
                order: result.order,
                duration_ms: result.execution_time_ms,
                success: result.success,
                error: result.error.map(|k| k.as_str().to_string()),
            };
            if let Ok(payload) = serde_json::to_value(payload) {
                EventEnvelope::new(EventType::AgentFinished, payload)
                    .with_session(session_id)
                    .with_actor(&result.agent)
                    .with_severity(if result.success { EventSeverity::Debug } else { EventSeverity::Warning })
                    .emit();
            }
            if let Some(detail) = &result.detail {
                tracing::debug!(agent = %result.agent, order = result.order, detail = %detail, "Agent failure detail");
            }
        }
    }

    async fn append_to_log(&self, request: &TurnRequest, merged: &MergedResponse, response_time_ms: u64) {
        let Some(log) = &self.log else {
            return;
        };

        let record = TurnRecord {
            session_id: request.session_id.clone(),
            user_id: request.user_id,
            channel: request.channel,
            message: request.message.clone(),
            reply: merged.reply.clone(),
            executions: merged.results.iter().map(AgentExecution::from).collect(),
            provenance: merged.provenance.clone(),
            error: merged.error,
            response_time_ms,
            recorded_at: chrono::Utc::now(),
        };

        // The reply is already built; a log outage must not lose it.
        if let Err(e) = log.append(record).await {
            tracing::error!(session_id = %request.session_id, error = %e, "Failed to append turn to conversation log");
        }
    }
}

#[async_trait]
impl TurnHandler for Orchestrator {
    async fn handle_turn(&self, request: TurnRequest) -> Result<TurnResponse> {
        let started = Instant::now();
        let deadline = started + self.config.turn_timeout;

        tracing::info!(
            session_id = %request.session_id,
            user_id = request.user_id,
            channel = request.channel.as_str(),
            "Handling turn"
        );
        EventEnvelope::new(EventType::TurnReceived, serde_json::json!({ "channel": request.channel }))
            .with_session(&request.session_id)
            .with_actor(&format!("user:{}", request.user_id))
            .emit();

        let mut intents = self.classify(&request).await;
        let intent_count = intents.len();
        let context = TaskContext::for_turn(&request);

        let merged = match intents.len() {
            0 => self.merger.fallback(),
            1 => {
                let intent = intents.remove(0);
                let result = self.run_single(intent, &context, deadline).await.with_order(0);
                self.merger.merge(vec![result], Vec::new())
            }
            _ => self.run_planned(intents, &context, deadline).await?,
        };

        let response_time_ms = started.elapsed().as_millis() as u64;
        self.record_results(&request.session_id, &merged);
        concierge_governance::track_turn(
            request.channel.as_str(),
            intent_count,
            merged.all_failed(),
            response_time_ms as f64 / 1000.0,
        );

        if merged.all_failed() {
            EventEnvelope::new(EventType::AllAgentsFailed, serde_json::json!({ "intents": intent_count }))
                .with_session(&request.session_id)
                .with_severity(EventSeverity::Warning)
                .emit();
        }
        EventEnvelope::new(
            EventType::TurnCompleted,
            serde_json::json!({
                "response_time_ms": response_time_ms,
                "results": merged.results.len(),
                "succeeded": merged.provenance.iter().filter(|p| p.success).count(),
            }),
        )
        .with_session(&request.session_id)
        .emit();

        self.append_to_log(&request, &merged, response_time_ms).await;

        Ok(TurnResponse {
            session_id: request.session_id,
            reply: merged.reply,
            provenance: merged.provenance,
            response_time_ms,
        })
    }
}
