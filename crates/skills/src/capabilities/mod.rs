//! Built-in specialist capabilities.

pub mod booking;
pub mod cancellation;
pub mod complaint;
pub mod data_query;
pub mod discovery;
pub mod policy;

pub use booking::BookingCapability;
pub use cancellation::CancellationCapability;
pub use complaint::ComplaintCapability;
pub use data_query::DataQueryCapability;
pub use discovery::ServiceDiscoveryCapability;
pub use policy::PolicyCapability;

use chrono::{DateTime, Utc};
use concierge_core::{
    types::{Intent, TaskContext},
    Error, Result,
};

/// Intent labels handled by the built-in capabilities.
pub mod intents {
    pub const BOOKING_STATUS: &str = "booking_status";
    pub const BOOKING_CREATE: &str = "booking_create";
    pub const BOOKING_RESCHEDULE: &str = "booking_reschedule";
    pub const BOOKING_CANCEL: &str = "booking_cancel";
    pub const COMPLAINT: &str = "complaint";
    pub const POLICY_LOOKUP: &str = "policy_lookup";
    pub const SERVICE_DISCOVERY: &str = "service_discovery";
    pub const DATA_QUERY: &str = "data_query";
}

/// Booking reference from the intent, or from an earlier `booking_status` step.
pub(crate) fn booking_reference(intent: &Intent, context: &TaskContext) -> Option<String> {
    intent
        .param_str("booking_reference")
        .map(str::to_string)
        .or_else(|| {
            context
                .payload_from(intents::BOOKING_STATUS)
                .and_then(|p| p.get("reference"))
                .and_then(|r| r.as_str())
                .map(str::to_string)
        })
}

/// Parse an RFC 3339 timestamp parameter.
pub(crate) fn timestamp_param(intent: &Intent, key: &str) -> Result<Option<DateTime<Utc>>> {
    match intent.param_str(key) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| Error::invalid_request(format!("'{}' is not a valid timestamp: {}", key, e))),
    }
}

/// Human-readable timestamp for summaries.
pub(crate) fn display_time(t: DateTime<Utc>) -> String {
    t.format("%a %d %b %Y, %H:%M UTC").to_string()
}
