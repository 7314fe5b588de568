//! Builder for Orchestrator.

use std::sync::Arc;

use concierge_core::{
    config::OrchestratorConfig,
    traits::{CapabilityRegistry, ConversationLog, IntentClassifier, ResponseFormatter},
    Error, Result, TemplateFormatter,
};

use crate::dag::{DependencyAnalyzer, DependencyTable};
use crate::executor::{ParallelExecutor, SequentialExecutor};
use crate::merger::ResponseMerger;
use crate::orchestrator::{Orchestrator, TurnConfig};
use crate::planning::ExecutionPlanner;

/// Builder for constructing an Orchestrator.
pub struct OrchestratorBuilder {
    config: TurnConfig,
    table: DependencyTable,
    classifier: Option<Arc<dyn IntentClassifier>>,
    registry: Option<Arc<dyn CapabilityRegistry>>,
    formatter: Option<Arc<dyn ResponseFormatter>>,
    log: Option<Arc<dyn ConversationLog>>,
}

impl OrchestratorBuilder {
    /// Create a new builder with default limits and no dependency edges.
    pub fn new() -> Self {
        Self {
            config: TurnConfig::default(),
            table: DependencyTable::empty(),
            classifier: None,
            registry: None,
            formatter: None,
            log: None,
        }
    }

    /// Apply timeout, confidence threshold and dependency table from configuration.
    pub fn with_orchestrator_config(mut self, config: &OrchestratorConfig) -> Result<Self> {
        self.table = DependencyTable::from_config(config)?;
        self.config = TurnConfig::from(config);
        Ok(self)
    }

    /// Set the turn limits.
    pub fn with_config(mut self, config: TurnConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the dependency table.
    pub fn with_dependencies(mut self, table: DependencyTable) -> Self {
        self.table = table;
        self
    }

    /// Set the intent classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the capability registry.
    pub fn with_registry(mut self, registry: Arc<dyn CapabilityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the reply formatter. Defaults to [`TemplateFormatter`].
    pub fn with_formatter(mut self, formatter: Arc<dyn ResponseFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Set the conversation log.
    pub fn with_conversation_log(mut self, log: Arc<dyn ConversationLog>) -> Self {
        self.log = Some(log);
        self
    }

    /// Build the Orchestrator.
    pub fn build(self) -> Result<Orchestrator> {
        let classifier = self
            .classifier
            .ok_or_else(|| Error::Config("orchestrator requires an intent classifier".into()))?;
        let registry = self
            .registry
            .ok_or_else(|| Error::Config("orchestrator requires a capability registry".into()))?;
        let formatter: Arc<dyn ResponseFormatter> = match self.formatter {
            Some(formatter) => formatter,
            None => Arc::new(TemplateFormatter::new()?),
        };

        Ok(Orchestrator {
            config: self.config,
            classifier,
            registry: registry.clone(),
            planner: ExecutionPlanner::new(DependencyAnalyzer::new(self.table)),
            parallel: ParallelExecutor::new(registry.clone()),
            sequential: SequentialExecutor::new(registry),
            merger: ResponseMerger::new(formatter),
            log: self.log,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
