//! Core traits for Concierge.
//!
//! Traits are organized by seam:
//! - `capability`: specialist capabilities and the registry that resolves them
//! - `controller`: the turn handler consumed by the transport layer
//! - `gateway`: external collaborators at the edges (classifier, formatter)
//! - `store`: storage collaborators (bookings, complaints, conversation log)

pub mod capability;
pub mod controller;
pub mod gateway;
pub mod store;

pub use capability::*;
pub use controller::*;
pub use gateway::*;
pub use store::*;
