//! Static service catalogue.

use concierge_core::types::Money;
use serde::Serialize;

/// A bookable service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceListing {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub base_price: Money,
    pub duration_minutes: u32,
    pub keywords: &'static [&'static str],
}

pub const SERVICES: &[ServiceListing] = &[
    ServiceListing {
        id: "home_cleaning",
        name: "Standard Home Cleaning",
        category: "cleaning",
        base_price: Money(8_000),
        duration_minutes: 120,
        keywords: &["clean", "cleaning", "house", "home", "tidy"],
    },
    ServiceListing {
        id: "deep_cleaning",
        name: "Deep Cleaning",
        category: "cleaning",
        base_price: Money(15_000),
        duration_minutes: 240,
        keywords: &["deep", "clean", "cleaning", "move", "spring"],
    },
    ServiceListing {
        id: "plumbing_repair",
        name: "Plumbing Repair",
        category: "plumbing",
        base_price: Money(12_000),
        duration_minutes: 90,
        keywords: &["plumber", "plumbing", "leak", "pipe", "drain", "tap", "toilet"],
    },
    ServiceListing {
        id: "electrical_inspection",
        name: "Electrical Safety Inspection",
        category: "electrical",
        base_price: Money(11_000),
        duration_minutes: 60,
        keywords: &["electric", "electrical", "electrician", "wiring", "socket", "inspection"],
    },
    ServiceListing {
        id: "ac_servicing",
        name: "Air Conditioner Servicing",
        category: "appliance",
        base_price: Money(9_500),
        duration_minutes: 75,
        keywords: &["ac", "air", "conditioner", "cooling", "aircon", "hvac"],
    },
    ServiceListing {
        id: "pest_control",
        name: "Pest Control Treatment",
        category: "pest_control",
        base_price: Money(13_500),
        duration_minutes: 120,
        keywords: &["pest", "pests", "insects", "termite", "cockroach", "rodent"],
    },
];

/// Look up a service by id.
pub fn find_service(id: &str) -> Option<&'static ServiceListing> {
    SERVICES.iter().find(|s| s.id == id)
}

/// All distinct categories, in catalogue order.
pub fn categories() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for service in SERVICES {
        if !seen.contains(&service.category) {
            seen.push(service.category);
        }
    }
    seen
}
