#![deny(unused)]
//! Core types, traits, and error definitions for Concierge.
//!
//! This crate provides the foundational building blocks shared across all layers
//! of the orchestration stack: the intent/result data model, the specialist
//! capability contract, storage contracts, configuration and test mocks.

pub mod config;
pub mod error;
pub mod events;
pub mod mocks;
pub mod template;
pub mod traits;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use events::*;
pub use template::TemplateFormatter;
pub use traits::*;
pub use types::*;
