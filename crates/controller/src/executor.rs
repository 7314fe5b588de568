//! Task executors.
//!
//! Both executors turn every failure mode (error, panic, missing capability,
//! deadline) into an [`AgentResult`]; neither ever returns early.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use concierge_core::{
    error::ErrorKind,
    traits::{CapabilityRegistry, SpecialistCapability},
    types::{AgentResult, AgentTask, TaskContext},
};

/// Agent name recorded when no capability handles an intent.
pub const UNASSIGNED_AGENT: &str = "unassigned";

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

fn unassigned(task: &AgentTask) -> AgentResult {
    tracing::warn!(intent = %task.intent.name, "No capability registered for intent");
    AgentResult::failure(
        &task.intent.name,
        UNASSIGNED_AGENT,
        ErrorKind::AgentFailure,
        format!("no capability registered for '{}'", task.intent.name),
    )
}

/// Invocation started on its own tokio task.
struct Running {
    intent_name: String,
    agent: String,
    started: Instant,
    handle: JoinHandle<AgentResult>,
}

impl Running {
    fn spawn(capability: Arc<dyn SpecialistCapability>, task: AgentTask) -> Self {
        let intent_name = task.intent.name.clone();
        let agent = capability.name().to_string();
        let started = Instant::now();
        let handle = tokio::spawn(async move {
            capability
                .execute(&task.intent, &task.context, task.deadline)
                .await
        });
        Self {
            intent_name,
            agent,
            started,
            handle,
        }
    }

    /// Wait until the result arrives or `deadline` passes.
    ///
    /// On timeout the task is aborted and a Timeout result stands in for it.
    async fn finish(self, deadline: Instant) -> AgentResult {
        let Running {
            intent_name,
            agent,
            started,
            mut handle,
        } = self;

        match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                tracing::error!(agent = %agent, intent = %intent_name, error = %join_error, "Capability task crashed");
                AgentResult::failure(
                    &intent_name,
                    &agent,
                    ErrorKind::AgentFailure,
                    format!("capability task crashed: {}", join_error),
                )
                .with_elapsed(elapsed_ms(started))
            }
            Err(_) => {
                handle.abort();
                tracing::warn!(agent = %agent, intent = %intent_name, "Capability abandoned at deadline");
                AgentResult::timed_out(&intent_name, &agent).with_elapsed(elapsed_ms(started))
            }
        }
    }
}

// =============================================================================
// Parallel Executor
// =============================================================================

/// Runs independent tasks concurrently under one deadline.
#[derive(Clone)]
pub struct ParallelExecutor {
    registry: Arc<dyn CapabilityRegistry>,
}

impl ParallelExecutor {
    pub fn new(registry: Arc<dyn CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Start every task, then collect results in dispatch order.
    ///
    /// Returns once all tasks finish or the deadline passes, whichever is first.
    pub async fn execute(&self, tasks: Vec<AgentTask>, deadline: Instant) -> Vec<AgentResult> {
        enum Slot {
            Started(Running, u32),
            Done(AgentResult),
        }

        // Spawn everything before awaiting anything.
        let slots: Vec<Slot> = tasks
            .into_iter()
            .map(|task| {
                let order = task.order;
                match self.registry.resolve(&task.intent.name) {
                    Some(capability) => Slot::Started(Running::spawn(capability, task), order),
                    None => Slot::Done(unassigned(&task).with_order(order)),
                }
            })
            .collect();

        let mut results = Vec::with_capacity(slots.len());
        for slot in slots {
            let result = match slot {
                Slot::Started(running, order) => running.finish(deadline).await.with_order(order),
                Slot::Done(result) => result,
            };
            results.push(result);
        }
        results
    }
}

// =============================================================================
// Sequential Executor
// =============================================================================

/// Runs a dependency chain strictly in order.
#[derive(Clone)]
pub struct SequentialExecutor {
    registry: Arc<dyn CapabilityRegistry>,
}

impl SequentialExecutor {
    pub fn new(registry: Arc<dyn CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Run each step with the outcomes of all earlier steps in its context.
    ///
    /// A failed step does not stop the chain. A step reached after the
    /// deadline is not invoked and is recorded as a Timeout.
    pub async fn execute(&self, chain: Vec<AgentTask>, deadline: Instant) -> Vec<AgentResult> {
        let mut results: Vec<AgentResult> = Vec::with_capacity(chain.len());
        let mut carried: Option<TaskContext> = None;

        for mut task in chain {
            let order = task.order;
            if let Some(context) = &carried {
                task.context = context.clone();
            }
            let mut context = task.context.clone();

            let capability = self.registry.resolve(&task.intent.name);
            let result = if Instant::now() >= deadline {
                let agent = capability
                    .as_ref()
                    .map(|c| c.name().to_string())
                    .unwrap_or_else(|| UNASSIGNED_AGENT.to_string());
                tracing::warn!(intent = %task.intent.name, "Skipping chain step, turn budget spent");
                AgentResult::timed_out(&task.intent.name, agent)
            } else {
                match capability {
                    Some(capability) => Running::spawn(capability, task).finish(deadline).await,
                    None => unassigned(&task),
                }
            }
            .with_order(order);

            context.extend_with(&result);
            carried = Some(context);
            results.push(result);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::mocks::{MockCapability, StaticRegistry};
    use concierge_core::types::Intent;
    use std::time::Duration;

    fn task(intent: &str, order: u32, deadline: Instant) -> AgentTask {
        AgentTask::new(Intent::new(intent, 0.9), TaskContext::default(), deadline, order)
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_elapsed_is_the_slowest_task() {
        let registry = Arc::new(
            StaticRegistry::new()
                .with(Arc::new(MockCapability::delayed("policy_lookup", "a", Duration::from_millis(150))))
                .with(Arc::new(MockCapability::delayed("data_query", "b", Duration::from_millis(200)))),
        );
        let executor = ParallelExecutor::new(registry);
        let deadline = Instant::now() + Duration::from_secs(30);

        let started = Instant::now();
        let results = executor
            .execute(
                vec![task("data_query", 0, deadline), task("policy_lookup", 1, deadline)],
                deadline,
            )
            .await;
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(250), "took {:?}", elapsed);
        assert_eq!(results.len(), 2);
        // Dispatch order, not completion order.
        assert_eq!(results[0].intent_name, "data_query");
        assert_eq!(results[1].intent_name, "policy_lookup");
        assert!(results.iter().all(|r| r.success));
        assert_eq!(results[0].order, 0);
        assert_eq!(results[1].order, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_task_times_out_without_blocking_siblings() {
        let registry = Arc::new(
            StaticRegistry::new()
                .with(Arc::new(MockCapability::hanging("service_discovery")))
                .with(Arc::new(MockCapability::delayed("policy_lookup", "ok", Duration::from_millis(50)))),
        );
        let executor = ParallelExecutor::new(registry);
        let deadline = Instant::now() + Duration::from_millis(500);

        let started = Instant::now();
        let results = executor
            .execute(
                vec![task("service_discovery", 0, deadline), task("policy_lookup", 1, deadline)],
                deadline,
            )
            .await;

        assert!(started.elapsed() <= Duration::from_millis(510));
        assert!(!results[0].success);
        assert_eq!(results[0].error, Some(ErrorKind::Timeout));
        assert!(results[1].success);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let registry = Arc::new(
            StaticRegistry::new()
                .with(Arc::new(MockCapability::panicking("complaint")))
                .with(Arc::new(MockCapability::failing("booking_cancel", ErrorKind::InvalidState)))
                .with(Arc::new(MockCapability::ok("policy_lookup", "ok"))),
        );
        let executor = ParallelExecutor::new(registry);
        let deadline = Instant::now() + Duration::from_secs(5);

        let results = executor
            .execute(
                vec![
                    task("complaint", 0, deadline),
                    task("booking_cancel", 1, deadline),
                    task("policy_lookup", 2, deadline),
                    task("not_registered", 3, deadline),
                ],
                deadline,
            )
            .await;

        assert_eq!(results[0].error, Some(ErrorKind::AgentFailure));
        assert_eq!(results[1].error, Some(ErrorKind::InvalidState));
        assert!(results[2].success);
        assert_eq!(results[3].error, Some(ErrorKind::AgentFailure));
        assert_eq!(results[3].agent, UNASSIGNED_AGENT);
        assert_eq!(results[3].order, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_threads_context_and_survives_failure() {
        let status = Arc::new(MockCapability::failing("booking_status", ErrorKind::BookingNotFound));
        let complaint = Arc::new(MockCapability::ok("complaint", "filed"));
        let registry = Arc::new(StaticRegistry::new().with(status).with(complaint.clone()));
        let executor = SequentialExecutor::new(registry);
        let deadline = Instant::now() + Duration::from_secs(5);

        let results = executor
            .execute(
                vec![task("booking_status", 4, deadline), task("complaint", 5, deadline)],
                deadline,
            )
            .await;

        assert!(!results[0].success);
        assert!(results[1].success);
        assert_eq!(results[1].order, 5);

        let seen = complaint.seen_contexts();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].prior_steps.len(), 1);
        assert_eq!(seen[0].prior_steps[0].intent_name, "booking_status");
        assert!(seen[0].upstream_failed());
        assert_eq!(seen[0].prior_steps[0].error, Some(ErrorKind::BookingNotFound));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_latency_is_the_sum() {
        let registry = Arc::new(
            StaticRegistry::new()
                .with(Arc::new(MockCapability::delayed("booking_status", "found", Duration::from_millis(100))))
                .with(Arc::new(MockCapability::delayed("complaint", "filed", Duration::from_millis(120)))),
        );
        let executor = SequentialExecutor::new(registry);
        let deadline = Instant::now() + Duration::from_secs(5);

        let started = Instant::now();
        let results = executor
            .execute(
                vec![task("booking_status", 0, deadline), task("complaint", 1, deadline)],
                deadline,
            )
            .await;

        assert!(started.elapsed() >= Duration::from_millis(220));
        assert!(results.iter().all(|r| r.success));
        assert_eq!(results[1].payload.as_ref().unwrap()["prior_steps"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_past_deadline_are_skipped() {
        let late = Arc::new(MockCapability::ok("complaint", "filed"));
        let registry = Arc::new(
            StaticRegistry::new()
                .with(Arc::new(MockCapability::delayed("booking_status", "found", Duration::from_millis(300))))
                .with(late.clone()),
        );
        let executor = SequentialExecutor::new(registry);
        let deadline = Instant::now() + Duration::from_millis(200);

        let results = executor
            .execute(
                vec![task("booking_status", 0, deadline), task("complaint", 1, deadline)],
                deadline,
            )
            .await;

        assert_eq!(results[0].error, Some(ErrorKind::Timeout));
        assert_eq!(results[1].error, Some(ErrorKind::Timeout));
        assert_eq!(results[1].execution_time_ms, 0);
        assert_eq!(late.call_count(), 0);
    }
}
