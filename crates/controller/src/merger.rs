//! Response merging.

use std::sync::Arc;

use concierge_core::{
    error::ErrorKind,
    traits::ResponseFormatter,
    types::{AgentResult, ProvenanceEntry},
};

/// Merged reply for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedResponse {
    pub reply: String,
    /// One entry per result, parallel results first then the chain.
    pub provenance: Vec<ProvenanceEntry>,
    /// All results in merge order.
    pub results: Vec<AgentResult>,
    /// `Some(AllAgentsFailed)` when nothing succeeded.
    pub error: Option<ErrorKind>,
}

impl MergedResponse {
    pub fn all_failed(&self) -> bool {
        self.error == Some(ErrorKind::AllAgentsFailed)
    }
}

/// Combines capability results into one reply plus provenance.
#[derive(Clone)]
pub struct ResponseMerger {
    formatter: Arc<dyn ResponseFormatter>,
}

impl ResponseMerger {
    pub fn new(formatter: Arc<dyn ResponseFormatter>) -> Self {
        Self { formatter }
    }

    /// Reply used when a turn produced nothing to merge.
    pub fn fallback(&self) -> MergedResponse {
        self.merge(Vec::new(), Vec::new())
    }

    /// Merge results, keeping parallel dispatch order then chain order.
    pub fn merge(&self, parallel: Vec<AgentResult>, sequential: Vec<AgentResult>) -> MergedResponse {
        let results: Vec<AgentResult> = parallel.into_iter().chain(sequential).collect();
        let provenance = results.iter().map(ProvenanceEntry::from).collect();

        let succeeded: Vec<&AgentResult> = results.iter().filter(|r| r.success).collect();
        let failed = results.len() - succeeded.len();

        let (reply, error) = match succeeded.as_slice() {
            [] => (self.formatter.fallback(), Some(ErrorKind::AllAgentsFailed)),
            [only] => (self.render_single(only), None),
            many => (self.render_combined(many), None),
        };

        let reply = match self.formatter.partial_notice() {
            Some(notice) if error.is_none() && failed > 0 => format!("{}\n\n{}", reply, notice),
            _ => reply,
        };

        MergedResponse {
            reply,
            provenance,
            results,
            error,
        }
    }

    fn render_single(&self, result: &AgentResult) -> String {
        self.formatter.render_single(result).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Formatter failed, using raw summary");
            result.summary.clone().unwrap_or_default()
        })
    }

    fn render_combined(&self, results: &[&AgentResult]) -> String {
        self.formatter.render_combined(results).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Formatter failed, joining raw summaries");
            results
                .iter()
                .filter_map(|r| r.summary.as_deref())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}
