//! Booking lookup, creation and rescheduling.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use concierge_core::{
    traits::{BookingStore, SpecialistCapability},
    types::{Booking, CapabilityOutput, Intent, Money, NewBooking, TaskContext},
    Error, Result,
};

use super::{booking_reference, display_time, intents, timestamp_param};
use crate::catalog;
use crate::clock::Clock;

/// Handles `booking_status`, `booking_create` and `booking_reschedule`.
pub struct BookingCapability {
    bookings: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl BookingCapability {
    pub fn new(bookings: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { bookings, clock }
    }

    /// Load a booking the current user owns.
    async fn owned_booking(&self, reference: &str, user_id: i64) -> Result<Booking> {
        match self.bookings.get(reference).await? {
            Some(b) if b.user_id == user_id => Ok(b),
            _ => Err(Error::BookingNotFound(reference.to_string())),
        }
    }

    async fn status(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        let booking = match booking_reference(intent, context) {
            Some(reference) => self.owned_booking(&reference, context.user_id).await?,
            None => self
                .bookings
                .latest_for_user(context.user_id)
                .await?
                .ok_or_else(|| Error::BookingNotFound(format!("no bookings for user {}", context.user_id)))?,
        };

        let service = catalog::find_service(&booking.service_id)
            .map(|s| s.name)
            .unwrap_or(booking.service_id.as_str());

        Ok(CapabilityOutput::new(
            "booking_found",
            format!(
                "Booking {} for {} on {} is {}.",
                booking.reference,
                service,
                display_time(booking.scheduled_at),
                booking.status.as_str().replace('_', " ")
            ),
            serde_json::to_value(&booking)?,
        ))
    }

    async fn create(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        let service_id = intent
            .param_str("service_id")
            .ok_or_else(|| Error::invalid_request("service_id is required"))?;
        let service = catalog::find_service(service_id)
            .ok_or_else(|| Error::invalid_request(format!("unknown service '{}'", service_id)))?;
        let scheduled_at = timestamp_param(intent, "scheduled_at")?
            .ok_or_else(|| Error::invalid_request("scheduled_at is required"))?;

        if scheduled_at <= self.clock.now() {
            return Err(Error::invalid_request("scheduled_at must be in the future"));
        }

        let total_amount = intent
            .param_i64("amount_cents")
            .map(Money::from_cents)
            .unwrap_or(service.base_price);

        let booking = self
            .bookings
            .create(NewBooking {
                user_id: context.user_id,
                service_id: service.id.to_string(),
                scheduled_at,
                total_amount,
            })
            .await?;

        tracing::info!(reference = %booking.reference, service = %service.id, "Booking created");

        Ok(CapabilityOutput::new(
            "booking_created",
            format!(
                "Booked {} for {} at {}. Your reference is {}.",
                service.name,
                display_time(booking.scheduled_at),
                booking.total_amount,
                booking.reference
            ),
            serde_json::to_value(&booking)?,
        ))
    }

    async fn reschedule(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        let reference = booking_reference(intent, context)
            .ok_or_else(|| Error::BookingNotFound("no booking reference given".into()))?;
        let new_time = timestamp_param(intent, "scheduled_at")?
            .ok_or_else(|| Error::invalid_request("scheduled_at is required"))?;

        let booking = self.owned_booking(&reference, context.user_id).await?;
        if !booking.status.is_cancellable() {
            return Err(Error::invalid_state(format!(
                "booking {} is {} and cannot be rescheduled",
                reference,
                booking.status.as_str()
            )));
        }
        if new_time <= self.clock.now() {
            return Err(Error::invalid_request("new time must be in the future"));
        }

        let updated = self.bookings.reschedule(&reference, new_time).await?;
        Ok(CapabilityOutput::new(
            "booking_rescheduled",
            format!(
                "Booking {} moved from {} to {}.",
                reference,
                display_time(booking.scheduled_at),
                display_time(updated.scheduled_at)
            ),
            json!({
                "reference": reference,
                "previous_scheduled_at": booking.scheduled_at,
                "booking": updated,
            }),
        ))
    }
}

#[async_trait]
impl SpecialistCapability for BookingCapability {
    fn name(&self) -> &str {
        "booking_agent"
    }

    fn intents(&self) -> &[&'static str] {
        &[intents::BOOKING_STATUS, intents::BOOKING_CREATE, intents::BOOKING_RESCHEDULE]
    }

    async fn handle(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        match intent.name.as_str() {
            intents::BOOKING_STATUS => self.status(intent, context).await,
            intents::BOOKING_CREATE => self.create(intent, context).await,
            intents::BOOKING_RESCHEDULE => self.reschedule(intent, context).await,
            other => Err(Error::agent_failure(format!("booking agent cannot handle '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use concierge_core::types::BookingStatus;
    use concierge_store::InMemoryBookingStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    }

    fn setup() -> (Arc<InMemoryBookingStore>, BookingCapability) {
        let store = Arc::new(InMemoryBookingStore::new());
        let cap = BookingCapability::new(store.clone(), Arc::new(FixedClock(now())));
        (store, cap)
    }

    fn ctx(user_id: i64) -> TaskContext {
        TaskContext {
            user_id,
            session_id: "s".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_status() {
        let (_store, cap) = setup();
        let when = (now() + Duration::days(2)).to_rfc3339();

        let created = cap
            .handle(
                &Intent::new("booking_create", 0.9)
                    .with_param("service_id", "deep_cleaning")
                    .with_param("scheduled_at", when),
                &ctx(7),
            )
            .await
            .unwrap();
        assert_eq!(created.action, "booking_created");
        assert_eq!(created.payload["total_amount"], 15_000);
        let reference = created.payload["reference"].as_str().unwrap().to_string();

        let status = cap
            .handle(&Intent::new("booking_status", 0.9), &ctx(7))
            .await
            .unwrap();
        assert_eq!(status.payload["reference"], reference.as_str());
        assert!(status.summary.contains("Deep Cleaning"));
        assert!(status.summary.contains("pending"));
    }

    #[tokio::test]
    async fn test_status_of_other_users_booking_is_not_found() {
        let (store, cap) = setup();
        let booking = store
            .create(NewBooking {
                user_id: 1,
                service_id: "home_cleaning".into(),
                scheduled_at: now() + Duration::days(1),
                total_amount: Money(8_000),
            })
            .await
            .unwrap();

        let err = cap
            .handle(
                &Intent::new("booking_status", 0.9).with_param("booking_reference", booking.reference),
                &ctx(2),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BookingNotFound(_)));
    }

    #[tokio::test]
    async fn test_reschedule_rejects_completed_booking() {
        let (store, cap) = setup();
        let booking = store
            .insert(Booking {
                reference: "BK-DONE01".into(),
                user_id: 7,
                service_id: "home_cleaning".into(),
                status: BookingStatus::Completed,
                scheduled_at: now() - Duration::days(1),
                total_amount: Money(8_000),
                created_at: now() - Duration::days(3),
                cancelled_at: None,
                refund: None,
            });

        let err = cap
            .handle(
                &Intent::new("booking_reschedule", 0.9)
                    .with_param("booking_reference", booking.reference)
                    .with_param("scheduled_at", (now() + Duration::days(4)).to_rfc3339()),
                &ctx(7),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_create_requires_future_time() {
        let (_store, cap) = setup();
        let err = cap
            .handle(
                &Intent::new("booking_create", 0.9)
                    .with_param("service_id", "home_cleaning")
                    .with_param("scheduled_at", (now() - Duration::hours(1)).to_rfc3339()),
                &ctx(7),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
