//! In-memory stores using DashMap.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use concierge_core::{
    traits::{BookingStore, ComplaintStore, ConversationLog},
    types::{
        Booking, BookingStatus, ComplaintComment, ComplaintRecord, ComplaintStatus, ComplaintUpdate,
        ComplaintView, NewBooking, NewComplaint, RefundDecision, TurnRecord,
    },
    Error, Result,
};

fn short_id(prefix: &str, len: usize) -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}", prefix, &raw[..len])
}

// =============================================================================
// Bookings
// =============================================================================

/// In-memory booking store keyed by reference.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    bookings: DashMap<String, Booking>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a booking as-is, replacing any with the same reference.
    pub fn insert(&self, booking: Booking) -> Booking {
        self.bookings.insert(booking.reference.clone(), booking.clone());
        booking
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    fn for_user(&self, user_id: i64) -> Vec<Booking> {
        let mut found: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| b.value().clone())
            .collect();
        found.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.reference.cmp(&a.reference))
        });
        found
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn get(&self, reference: &str) -> Result<Option<Booking>> {
        Ok(self.bookings.get(reference).map(|b| b.clone()))
    }

    async fn latest_for_user(&self, user_id: i64) -> Result<Option<Booking>> {
        Ok(self.for_user(user_id).into_iter().next())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>> {
        Ok(self.for_user(user_id))
    }

    async fn create(&self, booking: NewBooking) -> Result<Booking> {
        let created = Booking {
            reference: short_id("BK", 6),
            user_id: booking.user_id,
            service_id: booking.service_id,
            status: BookingStatus::Pending,
            scheduled_at: booking.scheduled_at,
            total_amount: booking.total_amount,
            created_at: Utc::now(),
            cancelled_at: None,
            refund: None,
        };
        tracing::trace!(reference = %created.reference, "Storing booking in memory");
        Ok(self.insert(created))
    }

    async fn reschedule(&self, reference: &str, scheduled_at: DateTime<Utc>) -> Result<Booking> {
        let mut entry = self
            .bookings
            .get_mut(reference)
            .ok_or_else(|| Error::BookingNotFound(reference.to_string()))?;
        entry.scheduled_at = scheduled_at;
        Ok(entry.clone())
    }

    async fn cancel(
        &self,
        reference: &str,
        refund: RefundDecision,
        cancelled_at: DateTime<Utc>,
    ) -> Result<Booking> {
        let mut entry = self
            .bookings
            .get_mut(reference)
            .ok_or_else(|| Error::BookingNotFound(reference.to_string()))?;
        if !entry.status.is_cancellable() {
            return Err(Error::invalid_state(format!(
                "booking {} is already {}",
                reference,
                entry.status.as_str()
            )));
        }
        entry.status = BookingStatus::Cancelled;
        entry.cancelled_at = Some(cancelled_at);
        entry.refund = Some(refund);
        Ok(entry.clone())
    }
}

// =============================================================================
// Complaints
// =============================================================================

#[derive(Debug, Clone)]
struct StoredComplaint {
    record: ComplaintRecord,
    update_count: usize,
}

impl StoredComplaint {
    fn view(&self) -> ComplaintView {
        ComplaintView {
            record: self.record.clone(),
            update_count: self.update_count,
        }
    }
}

/// In-memory complaint store.
#[derive(Debug, Default)]
pub struct InMemoryComplaintStore {
    complaints: DashMap<String, StoredComplaint>,
}

impl InMemoryComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Apply one update to a record, enforcing the status rules.
fn apply_update(record: &mut ComplaintRecord, update: ComplaintUpdate, at: DateTime<Utc>) -> Result<()> {
    match update {
        ComplaintUpdate::Comment { author, body } => {
            record.comments.push(ComplaintComment {
                author,
                body,
                created_at: at,
            });
        }
        ComplaintUpdate::Transition { status } => {
            if record.status == ComplaintStatus::Closed {
                return Err(Error::invalid_state(format!("complaint {} is closed", record.id)));
            }
            if record.status == status {
                return Err(Error::invalid_state(format!(
                    "complaint {} is already {:?}",
                    record.id, status
                )));
            }
            if status == ComplaintStatus::Resolved && record.resolved_at.is_none() {
                record.resolved_at = Some(at);
            }
            record.status = status;
        }
    }
    Ok(())
}

#[async_trait]
impl ComplaintStore for InMemoryComplaintStore {
    async fn create(&self, complaint: NewComplaint) -> Result<ComplaintRecord> {
        let record = ComplaintRecord {
            id: short_id("CMP", 8),
            user_id: complaint.user_id,
            booking_reference: complaint.booking_reference,
            complaint_type: complaint.complaint_type,
            description: complaint.description,
            priority: complaint.priority,
            status: ComplaintStatus::Open,
            created_at: complaint.created_at,
            response_due_at: complaint.created_at + complaint.priority.response_window(),
            resolution_due_at: complaint.created_at + complaint.priority.resolution_window(),
            resolved_at: None,
            comments: Vec::new(),
        };
        self.complaints.insert(
            record.id.clone(),
            StoredComplaint {
                record: record.clone(),
                update_count: 0,
            },
        );
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<ComplaintView> {
        self.complaints
            .get(id)
            .map(|c| c.view())
            .ok_or_else(|| Error::ComplaintNotFound(id.to_string()))
    }

    async fn update(&self, id: &str, update: ComplaintUpdate) -> Result<ComplaintView> {
        let mut entry = self
            .complaints
            .get_mut(id)
            .ok_or_else(|| Error::ComplaintNotFound(id.to_string()))?;
        apply_update(&mut entry.record, update, Utc::now())?;
        entry.update_count += 1;
        Ok(entry.view())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ComplaintRecord>> {
        let mut found: Vec<ComplaintRecord> = self
            .complaints
            .iter()
            .filter(|c| c.record.user_id == user_id)
            .map(|c| c.record.clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

// =============================================================================
// Conversation Log
// =============================================================================

/// Append-only in-memory conversation log.
#[derive(Debug, Default)]
pub struct InMemoryConversationLog {
    sessions: DashMap<String, Vec<TurnRecord>>,
}

impl InMemoryConversationLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationLog for InMemoryConversationLog {
    async fn append(&self, record: TurnRecord) -> Result<()> {
        self.sessions
            .entry(record.session_id.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<TurnRecord>> {
        Ok(self
            .sessions
            .get(session_id)
            .map(|records| records.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use concierge_core::types::{Channel, ComplaintPriority, ComplaintType, Money};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap()
    }

    fn complaint(priority: ComplaintPriority) -> NewComplaint {
        NewComplaint {
            user_id: 1,
            booking_reference: None,
            complaint_type: ComplaintType::Other,
            description: "desc".into(),
            priority,
            created_at: at(),
        }
    }

    #[tokio::test]
    async fn test_booking_create_and_cancel() {
        let store = InMemoryBookingStore::new();
        let booking = store
            .create(NewBooking {
                user_id: 4,
                service_id: "home_cleaning".into(),
                scheduled_at: at() + Duration::days(1),
                total_amount: Money(8_000),
            })
            .await
            .unwrap();
        assert!(booking.reference.starts_with("BK-"));
        assert_eq!(booking.reference.len(), 9);
        assert_eq!(booking.status, BookingStatus::Pending);

        let refund = RefundDecision {
            hours_until_service: 24.0,
            refund_percentage: 100,
            refund_amount: Money(8_000),
            cancellation_fee: Money::ZERO,
        };
        let cancelled = store.cancel(&booking.reference, refund, at()).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.refund, Some(refund));

        let again = store.cancel(&booking.reference, refund, at()).await.unwrap_err();
        assert!(matches!(again, Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_latest_for_user() {
        let store = InMemoryBookingStore::new();
        let template = Booking {
            reference: "BK-OLD000".into(),
            user_id: 4,
            service_id: "pest_control".into(),
            status: BookingStatus::Completed,
            scheduled_at: at(),
            total_amount: Money(13_500),
            created_at: at() - Duration::days(30),
            cancelled_at: None,
            refund: None,
        };
        store.insert(template.clone());
        store.insert(Booking {
            reference: "BK-NEW000".into(),
            created_at: at() - Duration::days(1),
            ..template
        });

        let latest = store.latest_for_user(4).await.unwrap().unwrap();
        assert_eq!(latest.reference, "BK-NEW000");
        assert!(store.latest_for_user(5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_complaint_due_dates_from_priority() {
        let store = InMemoryComplaintStore::new();
        let record = store.create(complaint(ComplaintPriority::High)).await.unwrap();
        assert!(record.id.starts_with("CMP-"));
        assert_eq!(record.status, ComplaintStatus::Open);
        assert_eq!(record.response_due_at, at() + Duration::hours(4));
        assert_eq!(record.resolution_due_at, at() + Duration::hours(24));
    }

    #[tokio::test]
    async fn test_complaint_lifecycle() {
        let store = InMemoryComplaintStore::new();
        let record = store.create(complaint(ComplaintPriority::Low)).await.unwrap();

        let view = store
            .update(
                &record.id,
                ComplaintUpdate::Comment {
                    author: "agent:42".into(),
                    body: "Looking into it".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(view.update_count, 1);
        assert_eq!(view.record.comments.len(), 1);

        let resolved = store
            .update(&record.id, ComplaintUpdate::Transition { status: ComplaintStatus::Resolved })
            .await
            .unwrap();
        let first_resolution = resolved.record.resolved_at.unwrap();

        store
            .update(&record.id, ComplaintUpdate::Transition { status: ComplaintStatus::InProgress })
            .await
            .unwrap();
        let reresolved = store
            .update(&record.id, ComplaintUpdate::Transition { status: ComplaintStatus::Resolved })
            .await
            .unwrap();
        assert_eq!(reresolved.record.resolved_at, Some(first_resolution));
        assert_eq!(reresolved.record.priority, ComplaintPriority::Low);

        store
            .update(&record.id, ComplaintUpdate::Transition { status: ComplaintStatus::Closed })
            .await
            .unwrap();
        let err = store
            .update(&record.id, ComplaintUpdate::Transition { status: ComplaintStatus::Open })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(store.get(&record.id).await.unwrap().update_count, 5);
    }

    #[tokio::test]
    async fn test_unknown_complaint() {
        let store = InMemoryComplaintStore::new();
        let err = store.get("CMP-MISSING").await.unwrap_err();
        assert!(matches!(err, Error::ComplaintNotFound(_)));
    }

    #[tokio::test]
    async fn test_conversation_log_keeps_order_per_session() {
        let log = InMemoryConversationLog::new();
        for (session, message) in [("a", "first"), ("b", "other"), ("a", "second")] {
            log.append(TurnRecord {
                session_id: session.into(),
                user_id: 1,
                channel: Channel::Web,
                message: message.into(),
                reply: String::new(),
                executions: Vec::new(),
                provenance: Vec::new(),
                error: None,
                response_time_ms: 0,
                recorded_at: at(),
            })
            .await
            .unwrap();
        }

        let history = log.history("a").await.unwrap();
        let messages: Vec<&str> = history.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(log.history("missing").await.unwrap().is_empty());
    }
}
