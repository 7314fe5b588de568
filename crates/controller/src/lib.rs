#![deny(unused)]
//! Turn controller for Concierge.
//!
//! This crate provides dependency analysis, execution planning, the
//! parallel and sequential executors, response merging, and the
//! orchestrator that ties them together per conversation turn.

pub mod builder;
pub mod dag;
pub mod executor;
pub mod merger;
pub mod orchestrator;
pub mod planning;

pub use builder::OrchestratorBuilder;
pub use dag::{DependencyAnalyzer, DependencyTable};
pub use executor::{ParallelExecutor, SequentialExecutor, UNASSIGNED_AGENT};
pub use merger::{MergedResponse, ResponseMerger};
pub use orchestrator::{Orchestrator, TurnConfig};
pub use planning::{ExecutionPlanner, Schedule};
pub use concierge_core::traits::TurnHandler;
