//! Error types for Concierge.
//!
//! Two layers live here. [`Error`] is the ordinary Rust error returned by
//! stores, capabilities and configuration code. [`ErrorKind`] is the small,
//! serializable taxonomy that travels inside an `AgentResult` and decides
//! how the orchestrator treats a failed capability.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using Concierge's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure classification recorded on agent results and provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A task exceeded its share of the turn budget.
    Timeout,
    /// A capability raised, panicked, or returned invalid output.
    AgentFailure,
    /// The dependency table is cyclic or unresolvable.
    InvalidDependencyGraph,
    /// A domain precondition was violated.
    InvalidState,
    BookingNotFound,
    ComplaintNotFound,
    /// Nothing in the turn succeeded.
    AllAgentsFailed,
}

impl ErrorKind {
    /// Stable identifier, used as a metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::AgentFailure => "agent_failure",
            Self::InvalidDependencyGraph => "invalid_dependency_graph",
            Self::InvalidState => "invalid_state",
            Self::BookingNotFound => "booking_not_found",
            Self::ComplaintNotFound => "complaint_not_found",
            Self::AllAgentsFailed => "all_agents_failed",
        }
    }

    /// Short human phrase for provenance summaries.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Timeout => "did not finish in time",
            Self::AgentFailure => "could not be completed",
            Self::InvalidDependencyGraph => "could not be scheduled",
            Self::InvalidState => "is not allowed in the current state",
            Self::BookingNotFound => "could not find the booking",
            Self::ComplaintNotFound => "could not find the complaint",
            Self::AllAgentsFailed => "produced no result",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for Concierge.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Orchestration Errors
    // =========================================================================
    #[error("Invalid dependency graph: {0}")]
    InvalidDependencyGraph(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Agent failure: {0}")]
    AgentFailure(String),

    #[error("No capability registered for intent: {0}")]
    CapabilityNotFound(String),

    #[error("All agents failed")]
    AllAgentsFailed,

    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Complaint not found: {0}")]
    ComplaintNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Template rendering error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map this error onto the agent-result taxonomy.
    ///
    /// Anything without a dedicated kind is an `AgentFailure`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDependencyGraph(_) => ErrorKind::InvalidDependencyGraph,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::AllAgentsFailed => ErrorKind::AllAgentsFailed,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::BookingNotFound(_) => ErrorKind::BookingNotFound,
            Self::ComplaintNotFound(_) => ErrorKind::ComplaintNotFound,
            _ => ErrorKind::AgentFailure,
        }
    }

    /// Create an invalid dependency graph error.
    pub fn invalid_graph(msg: impl Into<String>) -> Self {
        Self::InvalidDependencyGraph(msg.into())
    }

    /// Create an agent failure error.
    pub fn agent_failure(msg: impl Into<String>) -> Self {
        Self::AgentFailure(msg.into())
    }

    /// Create an invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<tera::Error> for Error {
    fn from(err: tera::Error) -> Self {
        Self::Template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::BookingNotFound("BK-1".into()).kind(), ErrorKind::BookingNotFound);
        assert_eq!(Error::invalid_state("completed").kind(), ErrorKind::InvalidState);
        assert_eq!(Error::storage("down").kind(), ErrorKind::AgentFailure);
        assert_eq!(Error::CapabilityNotFound("x".into()).kind(), ErrorKind::AgentFailure);
    }

    #[test]
    fn test_kind_serializes_screaming_case() {
        let json = serde_json::to_string(&ErrorKind::AllAgentsFailed).unwrap();
        assert_eq!(json, "\"ALL_AGENTS_FAILED\"");
    }
}
