#![deny(unused)]
//! HTTP gateway for Concierge.
//!
//! This crate provides the HTTP turn endpoint and the keyword intent
//! classifier used when no model-backed classifier is configured.

pub mod router;
pub mod server;

pub use router::KeywordClassifier;
pub use server::{GatewayConfig, GatewayServer};
