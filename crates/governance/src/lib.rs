#![deny(unused)]
//! Observability for Concierge.
//!
//! This crate provides:
//! - Log and trace subscriber setup (stdout, JSON, OTLP)
//! - Prometheus metrics for turns, capabilities and HTTP requests

pub mod metrics;
pub mod tracing_layer;

pub use self::metrics::{setup_metrics_recorder, track_agent, track_request, track_turn};
pub use tracing_layer::{configure_tracing, DEFAULT_LOG_FILTER};
