//! Time-tiered cancellation refund policy.
//!
//! Tiers are evaluated from the most generous down; the first threshold that
//! `hours_until_service` meets or exceeds wins.

use chrono::{DateTime, Utc};
use concierge_core::types::{Money, RefundDecision};

/// `(minimum hours until service, refund percent)`, highest tier first.
pub const REFUND_TIERS: &[(f64, u8)] = &[(24.0, 100), (12.0, 50), (6.0, 25)];

/// Refund percent below the lowest tier.
pub const LATE_CANCELLATION_PERCENT: u8 = 0;

/// Fractional hours from `now` until `scheduled_at` (negative if past).
pub fn hours_between(now: DateTime<Utc>, scheduled_at: DateTime<Utc>) -> f64 {
    (scheduled_at - now).num_milliseconds() as f64 / 3_600_000.0
}

/// Refund percent for a given lead time.
pub fn refund_percentage(hours_until_service: f64) -> u8 {
    REFUND_TIERS
        .iter()
        .find(|(min_hours, _)| hours_until_service >= *min_hours)
        .map(|(_, percent)| *percent)
        .unwrap_or(LATE_CANCELLATION_PERCENT)
}

/// Compute the refund/fee split for cancelling at `now`.
///
/// Pure: the caller has already checked the booking is cancellable and not
/// in the past. `refund_amount + cancellation_fee == total_amount` always.
pub fn calculate(scheduled_at: DateTime<Utc>, now: DateTime<Utc>, total_amount: Money) -> RefundDecision {
    let hours_until_service = hours_between(now, scheduled_at);
    let refund_percentage = refund_percentage(hours_until_service);
    let refund_amount = total_amount.percent(refund_percentage);

    RefundDecision {
        hours_until_service,
        refund_percentage,
        refund_amount,
        cancellation_fee: total_amount - refund_amount,
    }
}
