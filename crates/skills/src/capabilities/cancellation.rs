//! Booking cancellation with the time-tiered refund policy.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use concierge_core::{
    traits::{BookingStore, SpecialistCapability},
    types::{CapabilityOutput, Intent, TaskContext},
    Error, Result,
};

use super::{booking_reference, display_time, intents};
use crate::clock::Clock;
use crate::refund;

pub struct CancellationCapability {
    bookings: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl CancellationCapability {
    pub fn new(bookings: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { bookings, clock }
    }
}

#[async_trait]
impl SpecialistCapability for CancellationCapability {
    fn name(&self) -> &str {
        "cancellation_agent"
    }

    fn intents(&self) -> &[&'static str] {
        &[intents::BOOKING_CANCEL]
    }

    async fn handle(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        // Only an explicitly referenced booking is ever cancelled.
        let reference = booking_reference(intent, context)
            .ok_or_else(|| Error::BookingNotFound("no booking reference given".into()))?;

        let booking = match self.bookings.get(&reference).await? {
            Some(b) if b.user_id == context.user_id => b,
            _ => return Err(Error::BookingNotFound(reference)),
        };

        if !booking.status.is_cancellable() {
            return Err(Error::invalid_state(format!(
                "booking {} is {} and cannot be cancelled",
                reference,
                booking.status.as_str()
            )));
        }

        let now = self.clock.now();
        if booking.scheduled_at <= now {
            return Err(Error::invalid_state(format!(
                "booking {} was scheduled for {} and has already started",
                reference,
                display_time(booking.scheduled_at)
            )));
        }

        let decision = refund::calculate(booking.scheduled_at, now, booking.total_amount);
        let cancelled = self.bookings.cancel(&reference, decision, now).await?;

        tracing::info!(
            reference = %reference,
            hours = decision.hours_until_service,
            refund_percent = decision.refund_percentage,
            "Booking cancelled"
        );

        let summary = if decision.refund_percentage == 0 {
            format!(
                "Booking {} is cancelled. It was less than 6 hours away, so no refund applies (fee {}).",
                reference, decision.cancellation_fee
            )
        } else {
            format!(
                "Booking {} is cancelled. You'll get a {}% refund of {} (fee {}).",
                reference, decision.refund_percentage, decision.refund_amount, decision.cancellation_fee
            )
        };

        Ok(CapabilityOutput::new(
            "booking_cancelled",
            summary,
            json!({
                "reference": reference,
                "status": cancelled.status,
                "refund": decision,
                "cancelled_at": now,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use concierge_core::types::{Booking, BookingStatus, Money};
    use concierge_store::InMemoryBookingStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    }

    fn booking(reference: &str, status: BookingStatus, lead: Duration) -> Booking {
        Booking {
            reference: reference.into(),
            user_id: 7,
            service_id: "plumbing_repair".into(),
            status,
            scheduled_at: now() + lead,
            total_amount: Money(12_000),
            created_at: now() - Duration::days(5),
            cancelled_at: None,
            refund: None,
        }
    }

    fn setup(bookings: Vec<Booking>) -> (Arc<InMemoryBookingStore>, CancellationCapability) {
        let store = Arc::new(InMemoryBookingStore::new());
        for b in bookings {
            store.insert(b);
        }
        let cap = CancellationCapability::new(store.clone(), Arc::new(FixedClock(now())));
        (store, cap)
    }

    fn ctx() -> TaskContext {
        TaskContext {
            session_id: "s".into(),
            user_id: 7,
            ..Default::default()
        }
    }

    fn cancel_intent(reference: &str) -> Intent {
        Intent::new("booking_cancel", 0.95).with_param("booking_reference", reference)
    }

    #[tokio::test]
    async fn test_half_refund_between_12_and_24_hours() {
        let (store, cap) = setup(vec![booking("BK-HALF01", BookingStatus::Confirmed, Duration::hours(18))]);

        let out = cap.handle(&cancel_intent("BK-HALF01"), &ctx()).await.unwrap();
        assert_eq!(out.action, "booking_cancelled");
        assert_eq!(out.payload["refund"]["refund_percentage"], 50);
        assert!(out.summary.contains("50%"));

        let stored = store.get("BK-HALF01").await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert_eq!(stored.cancelled_at, Some(now()));
        let refund = stored.refund.unwrap();
        assert_eq!(refund.refund_amount, Money(6_000));
        assert_eq!(refund.cancellation_fee, Money(6_000));
    }

    #[tokio::test]
    async fn test_reference_from_previous_step() {
        let (_store, cap) = setup(vec![booking("BK-CHAIN1", BookingStatus::Pending, Duration::days(3))]);

        let mut context = ctx();
        context.prior_steps.push(concierge_core::types::StepOutcome {
            intent_name: "booking_status".into(),
            success: true,
            payload: Some(json!({ "reference": "BK-CHAIN1" })),
            error: None,
        });

        let out = cap
            .handle(&Intent::new("booking_cancel", 0.9), &context)
            .await
            .unwrap();
        assert_eq!(out.payload["reference"], "BK-CHAIN1");
        assert_eq!(out.payload["refund"]["refund_percentage"], 100);
    }

    #[tokio::test]
    async fn test_already_cancelled_is_invalid_state() {
        let (_store, cap) = setup(vec![booking("BK-GONE01", BookingStatus::Cancelled, Duration::days(2))]);

        let err = cap.handle(&cancel_intent("BK-GONE01"), &ctx()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_past_booking_is_invalid_state() {
        let (_store, cap) = setup(vec![booking("BK-PAST01", BookingStatus::Confirmed, -Duration::hours(1))]);

        let err = cap.handle(&cancel_intent("BK-PAST01"), &ctx()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_missing_reference_leaves_bookings_alone() {
        let (store, cap) = setup(vec![booking("BK-KEEP01", BookingStatus::Confirmed, Duration::hours(30))]);

        let err = cap
            .handle(&Intent::new("booking_cancel", 0.6), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BookingNotFound(_)));

        let stored = store.get("BK-KEEP01").await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        assert!(stored.refund.is_none());
    }

    #[tokio::test]
    async fn test_unknown_reference_is_not_found() {
        let (_store, cap) = setup(vec![]);

        let err = cap.handle(&cancel_intent("BK-NOPE00"), &ctx()).await.unwrap_err();
        assert!(matches!(err, Error::BookingNotFound(_)));
    }
}
