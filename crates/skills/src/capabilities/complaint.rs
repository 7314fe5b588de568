//! Complaint intake and follow-up.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use concierge_core::{
    traits::{ComplaintStore, SpecialistCapability},
    types::{CapabilityOutput, ComplaintType, ComplaintUpdate, Intent, NewComplaint, TaskContext},
    Error, Result,
};

use super::{booking_reference, display_time, intents};
use crate::clock::Clock;
use crate::priority;

/// Files complaints, or comments on an existing one when `complaint_id` is given.
pub struct ComplaintCapability {
    complaints: Arc<dyn ComplaintStore>,
    clock: Arc<dyn Clock>,
}

impl ComplaintCapability {
    pub fn new(complaints: Arc<dyn ComplaintStore>, clock: Arc<dyn Clock>) -> Self {
        Self { complaints, clock }
    }

    async fn file(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        let description = intent
            .param_str("description")
            .unwrap_or(context.message.trim())
            .to_string();
        if description.is_empty() {
            return Err(Error::invalid_request("complaint description is empty"));
        }

        let complaint_type = intent
            .param_str("complaint_type")
            .map(ComplaintType::from_hint)
            .unwrap_or_default();

        // A failed lookup upstream still lets the complaint through, just unlinked.
        let booking_reference = booking_reference(intent, context);
        if booking_reference.is_none() && context.upstream_failed() {
            tracing::debug!(session = %context.session_id, "Filing complaint without booking link");
        }

        let created_at = self.clock.now();
        let assessment = priority::classify(&description, complaint_type, created_at);

        let record = self
            .complaints
            .create(NewComplaint {
                user_id: context.user_id,
                booking_reference: booking_reference.clone(),
                complaint_type,
                description,
                priority: assessment.priority,
                created_at,
            })
            .await?;

        tracing::info!(
            complaint = %record.id,
            priority = record.priority.as_str(),
            "Complaint filed"
        );

        let link = booking_reference
            .as_deref()
            .map(|r| format!(" about booking {}", r))
            .unwrap_or_default();

        Ok(CapabilityOutput::new(
            "complaint_filed",
            format!(
                "Complaint {}{} logged as {} priority. We'll respond by {}.",
                record.id,
                link,
                record.priority.as_str(),
                display_time(record.response_due_at)
            ),
            serde_json::to_value(&record)?,
        ))
    }

    async fn follow_up(&self, id: &str, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        let current = self.complaints.get(id).await?;
        if current.record.user_id != context.user_id {
            return Err(Error::ComplaintNotFound(id.to_string()));
        }

        let Some(body) = intent.param_str("comment") else {
            return Ok(CapabilityOutput::new(
                "complaint_found",
                format!(
                    "Complaint {} is {:?} with {} update(s).",
                    id, current.record.status, current.update_count
                ),
                serde_json::to_value(&current)?,
            ));
        };

        let view = self
            .complaints
            .update(
                id,
                ComplaintUpdate::Comment {
                    author: format!("user:{}", context.user_id),
                    body: body.to_string(),
                },
            )
            .await?;

        Ok(CapabilityOutput::new(
            "complaint_commented",
            format!("Added your note to complaint {}.", id),
            json!({ "complaint": view.record, "update_count": view.update_count }),
        ))
    }
}

#[async_trait]
impl SpecialistCapability for ComplaintCapability {
    fn name(&self) -> &str {
        "complaint_agent"
    }

    fn intents(&self) -> &[&'static str] {
        &[intents::COMPLAINT]
    }

    async fn handle(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        match intent.param_str("complaint_id") {
            Some(id) => self.follow_up(id, intent, context).await,
            None => self.file(intent, context).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use concierge_core::error::ErrorKind;
    use concierge_core::types::{ComplaintPriority, StepOutcome};
    use concierge_store::InMemoryComplaintStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    }

    fn setup() -> (Arc<InMemoryComplaintStore>, ComplaintCapability) {
        let store = Arc::new(InMemoryComplaintStore::new());
        let cap = ComplaintCapability::new(store.clone(), Arc::new(FixedClock(now())));
        (store, cap)
    }

    fn ctx(message: &str) -> TaskContext {
        TaskContext {
            session_id: "s".into(),
            user_id: 3,
            message: message.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_urgent_complaint_is_critical() {
        let (_store, cap) = setup();
        let out = cap
            .handle(
                &Intent::new("complaint", 0.9).with_param("complaint_type", "service_quality"),
                &ctx("URGENT - This is a critical safety issue!"),
            )
            .await
            .unwrap();

        assert_eq!(out.payload["priority"], "CRITICAL");
        let due: DateTime<Utc> = serde_json::from_value(out.payload["response_due_at"].clone()).unwrap();
        assert_eq!(due, now() + Duration::hours(1));
        assert!(out.summary.contains("CRITICAL"));
    }

    #[tokio::test]
    async fn test_links_booking_from_previous_step() {
        let (_store, cap) = setup();
        let mut context = ctx("The technician was a bit late");
        context.prior_steps.push(StepOutcome {
            intent_name: "booking_status".into(),
            success: true,
            payload: Some(json!({ "reference": "BK-LATE01" })),
            error: None,
        });

        let out = cap
            .handle(&Intent::new("complaint", 0.9).with_param("complaint_type", "delay"), &context)
            .await
            .unwrap();
        assert_eq!(out.payload["booking_reference"], "BK-LATE01");
        assert_eq!(out.payload["priority"], "LOW");
    }

    #[tokio::test]
    async fn test_failed_lookup_still_files_unlinked() {
        let (_store, cap) = setup();
        let mut context = ctx("Worst service I've had");
        context.prior_steps.push(StepOutcome {
            intent_name: "booking_status".into(),
            success: false,
            payload: None,
            error: Some(ErrorKind::BookingNotFound),
        });

        let out = cap.handle(&Intent::new("complaint", 0.9), &context).await.unwrap();
        assert!(out.payload["booking_reference"].is_null());
        assert_eq!(out.payload["priority"], "HIGH");
    }

    #[tokio::test]
    async fn test_comment_on_existing_complaint() {
        let (store, cap) = setup();
        let record = store
            .create(NewComplaint {
                user_id: 3,
                booking_reference: None,
                complaint_type: ComplaintType::Billing,
                description: "Charged twice".into(),
                priority: ComplaintPriority::High,
                created_at: now(),
            })
            .await
            .unwrap();

        let out = cap
            .handle(
                &Intent::new("complaint", 0.9)
                    .with_param("complaint_id", record.id.clone())
                    .with_param("comment", "Any news?"),
                &ctx("Any news on my complaint?"),
            )
            .await
            .unwrap();
        assert_eq!(out.action, "complaint_commented");
        assert_eq!(out.payload["update_count"], 1);
    }

    #[tokio::test]
    async fn test_other_users_complaint_is_not_found() {
        let (store, cap) = setup();
        let record = store
            .create(NewComplaint {
                user_id: 99,
                booking_reference: None,
                complaint_type: ComplaintType::Other,
                description: "x".into(),
                priority: ComplaintPriority::Low,
                created_at: now(),
            })
            .await
            .unwrap();

        let err = cap
            .handle(
                &Intent::new("complaint", 0.9).with_param("complaint_id", record.id),
                &ctx("status?"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ComplaintNotFound(_)));
    }
}
