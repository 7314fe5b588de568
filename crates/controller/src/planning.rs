//! Execution planning: from intents to dispatchable tasks.

use tokio::time::Instant;

use concierge_core::{
    types::{AgentTask, ExecutionPlan, Intent, TaskContext},
    Result,
};

use crate::dag::DependencyAnalyzer;

/// Tasks for one turn, with merge order already assigned.
///
/// Parallel tasks take orders `0..p` in dispatch order; chain tasks follow
/// with `p..p+s` in chain order.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub plan: ExecutionPlan,
    pub parallel: Vec<AgentTask>,
    pub sequential: Vec<AgentTask>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.parallel.len() + self.sequential.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds a [`Schedule`] from a turn's intents.
#[derive(Debug, Clone)]
pub struct ExecutionPlanner {
    analyzer: DependencyAnalyzer,
}

impl ExecutionPlanner {
    pub fn new(analyzer: DependencyAnalyzer) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &DependencyAnalyzer {
        &self.analyzer
    }

    /// Analyze the intents and wrap each one in an [`AgentTask`].
    pub fn plan(&self, intents: Vec<Intent>, context: &TaskContext, deadline: Instant) -> Result<Schedule> {
        let plan = self.analyzer.analyze(intents)?;

        let mut order = 0u32;
        let mut next_task = |intent: &Intent| {
            let task = AgentTask::new(intent.clone(), context.clone(), deadline, order);
            order += 1;
            task
        };

        let parallel = plan.independent.iter().map(&mut next_task).collect();
        let sequential = plan.sequential_chain.iter().map(&mut next_task).collect();

        tracing::debug!(
            independent = plan.independent.len(),
            chained = plan.sequential_chain.len(),
            "Execution plan built"
        );

        Ok(Schedule {
            plan,
            parallel,
            sequential,
        })
    }
}
