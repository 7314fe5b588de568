//! Storage collaborator traits.
//!
//! Schema and persistence are owned elsewhere; these are only the read/write
//! contracts the orchestrator and capabilities rely on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{
    Booking, ComplaintRecord, ComplaintUpdate, ComplaintView, NewBooking, NewComplaint,
    RefundDecision, TurnRecord,
};

/// Booking storage.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Read a booking by its public reference.
    async fn get(&self, reference: &str) -> Result<Option<Booking>>;

    /// Most recently created booking for a user.
    async fn latest_for_user(&self, user_id: i64) -> Result<Option<Booking>>;

    /// All bookings for a user, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>>;

    /// Create a pending booking.
    async fn create(&self, booking: NewBooking) -> Result<Booking>;

    /// Move a booking to a new scheduled time.
    async fn reschedule(&self, reference: &str, scheduled_at: DateTime<Utc>) -> Result<Booking>;

    /// Mark a booking cancelled and record the refund split.
    async fn cancel(
        &self,
        reference: &str,
        refund: RefundDecision,
        cancelled_at: DateTime<Utc>,
    ) -> Result<Booking>;
}

/// Complaint storage.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Persist a new complaint; due dates are derived from its priority.
    async fn create(&self, complaint: NewComplaint) -> Result<ComplaintRecord>;

    /// Read a complaint with its update count.
    async fn get(&self, id: &str) -> Result<ComplaintView>;

    /// Add a comment or change status.
    async fn update(&self, id: &str, update: ComplaintUpdate) -> Result<ComplaintView>;

    /// All complaints for a user, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ComplaintRecord>>;
}

/// Append-only conversation audit log, keyed by session.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Append one turn record.
    async fn append(&self, record: TurnRecord) -> Result<()>;

    /// Turn records for a session, oldest first.
    async fn history(&self, session_id: &str) -> Result<Vec<TurnRecord>>;
}
