//! Core type definitions for Concierge.
//!
//! Broken down into submodules by concern; everything is re-exported here.

pub mod agent;
pub mod booking;
pub mod complaint;
pub mod conversation;
pub mod intent;
pub mod request;

pub use agent::*;
pub use booking::*;
pub use complaint::*;
pub use conversation::*;
pub use intent::*;
pub use request::*;
