#![deny(unused)]
//! Specialist capabilities for the concierge.
//!
//! This crate provides:
//! - Capability registry keyed by intent name
//! - Built-in booking, cancellation, complaint, policy, discovery and data-query capabilities
//! - Refund policy and complaint priority calculators

pub mod capabilities;
pub mod catalog;
pub mod clock;
pub mod priority;
pub mod refund;
pub mod registry;

pub use capabilities::{
    intents, BookingCapability, CancellationCapability, ComplaintCapability, DataQueryCapability,
    PolicyCapability, ServiceDiscoveryCapability,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use registry::DefaultCapabilityRegistry;

use std::sync::Arc;

use concierge_core::{
    traits::{BookingStore, ComplaintStore},
    Result,
};

/// Register every built-in capability against the given stores.
pub fn register_builtin_capabilities(
    registry: &DefaultCapabilityRegistry,
    bookings: Arc<dyn BookingStore>,
    complaints: Arc<dyn ComplaintStore>,
    clock: Arc<dyn Clock>,
) -> Result<()> {
    registry.register(Arc::new(BookingCapability::new(bookings.clone(), clock.clone())))?;
    registry.register(Arc::new(CancellationCapability::new(bookings.clone(), clock.clone())))?;
    registry.register(Arc::new(ComplaintCapability::new(complaints.clone(), clock)))?;
    registry.register(Arc::new(PolicyCapability::new()))?;
    registry.register(Arc::new(ServiceDiscoveryCapability::new()))?;
    registry.register(Arc::new(DataQueryCapability::new(bookings, complaints)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::traits::CapabilityRegistry;
    use concierge_store::{InMemoryBookingStore, InMemoryComplaintStore};

    #[test]
    fn test_builtins_cover_all_intents() {
        let registry = DefaultCapabilityRegistry::new();
        register_builtin_capabilities(
            &registry,
            Arc::new(InMemoryBookingStore::new()),
            Arc::new(InMemoryComplaintStore::new()),
            Arc::new(SystemClock),
        )
        .unwrap();

        assert_eq!(
            registry.intents(),
            vec![
                "booking_cancel",
                "booking_create",
                "booking_reschedule",
                "booking_status",
                "complaint",
                "data_query",
                "policy_lookup",
                "service_discovery",
            ]
        );
        assert_eq!(registry.resolve(intents::BOOKING_CANCEL).unwrap().name(), "cancellation_agent");
    }
}
