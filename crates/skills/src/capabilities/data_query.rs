//! Account summaries over a user's bookings and complaints.

use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use concierge_core::{
    traits::{BookingStore, ComplaintStore, SpecialistCapability},
    types::{BookingStatus, CapabilityOutput, ComplaintStatus, Intent, Money, TaskContext},
    Result,
};

use super::intents;

pub struct DataQueryCapability {
    bookings: Arc<dyn BookingStore>,
    complaints: Arc<dyn ComplaintStore>,
}

impl DataQueryCapability {
    pub fn new(bookings: Arc<dyn BookingStore>, complaints: Arc<dyn ComplaintStore>) -> Self {
        Self { bookings, complaints }
    }
}

#[async_trait]
impl SpecialistCapability for DataQueryCapability {
    fn name(&self) -> &str {
        "data_query_agent"
    }

    fn intents(&self) -> &[&'static str] {
        &[intents::DATA_QUERY]
    }

    async fn handle(&self, _intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        let (bookings, complaints) = tokio::try_join!(
            self.bookings.list_for_user(context.user_id),
            self.complaints.list_for_user(context.user_id),
        )?;

        let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
        for b in &bookings {
            *by_status.entry(b.status.as_str()).or_default() += 1;
        }

        let spent = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Completed)
            .fold(Money::ZERO, |acc, b| acc + b.total_amount);
        let refunded = bookings
            .iter()
            .filter_map(|b| b.refund)
            .fold(Money::ZERO, |acc, r| acc + r.refund_amount);
        let open_complaints = complaints
            .iter()
            .filter(|c| !matches!(c.status, ComplaintStatus::Resolved | ComplaintStatus::Closed))
            .count();

        let upcoming = by_status.get("pending").copied().unwrap_or(0)
            + by_status.get("confirmed").copied().unwrap_or(0);

        Ok(CapabilityOutput::new(
            "account_summarized",
            format!(
                "You have {} booking(s), {} upcoming, and {} open complaint(s). Spent {}, refunded {}.",
                bookings.len(),
                upcoming,
                open_complaints,
                spent,
                refunded
            ),
            json!({
                "booking_count": bookings.len(),
                "bookings_by_status": by_status,
                "total_spent": spent,
                "total_refunded": refunded,
                "complaint_count": complaints.len(),
                "open_complaints": open_complaints,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use concierge_core::types::{Booking, ComplaintPriority, ComplaintType, NewComplaint, RefundDecision};
    use concierge_store::{InMemoryBookingStore, InMemoryComplaintStore};

    #[tokio::test]
    async fn test_summary_counts() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
        let bookings = Arc::new(InMemoryBookingStore::new());
        let complaints = Arc::new(InMemoryComplaintStore::new());

        let base = Booking {
            reference: "BK-A".into(),
            user_id: 5,
            service_id: "home_cleaning".into(),
            status: BookingStatus::Completed,
            scheduled_at: now - Duration::days(10),
            total_amount: Money(8_000),
            created_at: now - Duration::days(12),
            cancelled_at: None,
            refund: None,
        };
        bookings.insert(base.clone());
        bookings.insert(Booking {
            reference: "BK-B".into(),
            status: BookingStatus::Confirmed,
            scheduled_at: now + Duration::days(2),
            ..base.clone()
        });
        bookings.insert(Booking {
            reference: "BK-C".into(),
            status: BookingStatus::Cancelled,
            refund: Some(RefundDecision {
                hours_until_service: 30.0,
                refund_percentage: 100,
                refund_amount: Money(8_000),
                cancellation_fee: Money::ZERO,
            }),
            ..base.clone()
        });
        bookings.insert(Booking {
            reference: "BK-D".into(),
            user_id: 6,
            ..base
        });
        complaints
            .create(NewComplaint {
                user_id: 5,
                booking_reference: Some("BK-A".into()),
                complaint_type: ComplaintType::ServiceQuality,
                description: "Missed a room".into(),
                priority: ComplaintPriority::Medium,
                created_at: now,
            })
            .await
            .unwrap();

        let cap = DataQueryCapability::new(bookings, complaints);
        let ctx = TaskContext {
            user_id: 5,
            ..Default::default()
        };
        let out = cap.handle(&Intent::new("data_query", 0.9), &ctx).await.unwrap();

        assert_eq!(out.payload["booking_count"], 3);
        assert_eq!(out.payload["bookings_by_status"]["confirmed"], 1);
        assert_eq!(out.payload["total_spent"], 8_000);
        assert_eq!(out.payload["total_refunded"], 8_000);
        assert_eq!(out.payload["open_complaints"], 1);
        assert!(out.summary.contains("1 upcoming"));
    }
}
