use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Money
// =============================================================================

/// Monetary amount in minor units (cents).
///
/// Integer cents keep `refund + fee == total` exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// `self * percent / 100`, rounded half-up to the nearest cent.
    ///
    /// Percentages above 100 are treated as 100.
    pub fn percent(&self, percent: u8) -> Money {
        let scaled = i128::from(self.0) * i128::from(percent.min(100));
        // |result| <= |self| for percent <= 100, so it fits back into i64.
        Money((scaled + 50).div_euclid(100) as i64)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Bookings
// =============================================================================

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Only bookings that have not started can be cancelled or rescheduled.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Refund/fee split for a cancelled booking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefundDecision {
    pub hours_until_service: f64,
    /// One of 0, 25, 50, 100.
    pub refund_percentage: u8,
    pub refund_amount: Money,
    pub cancellation_fee: Money,
}

/// A booking as seen through the storage contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Public reference, e.g. `BK-1A2B3C`.
    pub reference: String,
    pub user_id: i64,
    pub service_id: String,
    pub status: BookingStatus,
    pub scheduled_at: DateTime<Utc>,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Set when the booking is cancelled.
    #[serde(default)]
    pub refund: Option<RefundDecision>,
}

/// Input for creating a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub user_id: i64,
    pub service_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub total_amount: Money,
}
