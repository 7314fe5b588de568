//! Static policy answers.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use concierge_core::{
    traits::SpecialistCapability,
    types::{CapabilityOutput, Intent, TaskContext},
    Result,
};

use super::intents;

#[derive(Debug, Clone, Serialize)]
pub struct PolicyTopic {
    pub id: &'static str,
    pub title: &'static str,
    pub answer: &'static str,
    #[serde(skip)]
    pub keywords: &'static [&'static str],
}

pub const POLICY_TOPICS: &[PolicyTopic] = &[
    PolicyTopic {
        id: "cancellation",
        title: "Cancellation and refunds",
        answer: "Cancel 24+ hours ahead for a full refund, 12-24 hours for 50%, 6-12 hours for 25%. \
                 Under 6 hours no refund applies.",
        keywords: &["cancel", "cancellation", "refund", "money back"],
    },
    PolicyTopic {
        id: "rescheduling",
        title: "Rescheduling",
        answer: "Pending or confirmed bookings can be moved to any future slot at no charge.",
        keywords: &["reschedule", "move", "change time", "different day"],
    },
    PolicyTopic {
        id: "complaints",
        title: "Complaint handling",
        answer: "Critical issues get a response within 1 hour, high within 4 hours, \
                 medium within 24 hours and everything else within 48 hours.",
        keywords: &["complaint", "complain", "escalate", "response time"],
    },
    PolicyTopic {
        id: "payment",
        title: "Payment",
        answer: "Payment is taken when the booking is confirmed. Refunds go back to the original payment method.",
        keywords: &["pay", "payment", "charge", "card", "invoice"],
    },
    PolicyTopic {
        id: "guarantee",
        title: "Service guarantee",
        answer: "If a job isn't done right, report it within 48 hours and we'll send someone back free of charge.",
        keywords: &["guarantee", "warranty", "redo", "not done right"],
    },
    PolicyTopic {
        id: "privacy",
        title: "Privacy",
        answer: "We share your address and phone number only with the assigned provider, and only for the booked job.",
        keywords: &["privacy", "personal data", "my data", "gdpr", "share my"],
    },
];

/// Answers policy questions from a fixed topic list.
#[derive(Debug, Default)]
pub struct PolicyCapability;

impl PolicyCapability {
    pub fn new() -> Self {
        Self
    }

    /// Topic named by the `topic` parameter, else the first whose keywords appear in `text`.
    pub fn lookup(topic: Option<&str>, text: &str) -> Option<&'static PolicyTopic> {
        if let Some(id) = topic {
            let id = id.to_lowercase();
            if let Some(found) = POLICY_TOPICS.iter().find(|t| t.id == id) {
                return Some(found);
            }
        }
        let lower = text.to_lowercase();
        POLICY_TOPICS
            .iter()
            .find(|t| t.keywords.iter().any(|k| lower.contains(k)))
    }
}

#[async_trait]
impl SpecialistCapability for PolicyCapability {
    fn name(&self) -> &str {
        "policy_agent"
    }

    fn intents(&self) -> &[&'static str] {
        &[intents::POLICY_LOOKUP]
    }

    async fn handle(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        match Self::lookup(intent.param_str("topic"), &context.message) {
            Some(topic) => Ok(CapabilityOutput::new(
                "policy_answered",
                format!("{}: {}", topic.title, topic.answer),
                serde_json::to_value(topic)?,
            )),
            None => {
                let titles: Vec<&str> = POLICY_TOPICS.iter().map(|t| t.title).collect();
                Ok(CapabilityOutput::new(
                    "policy_topics_listed",
                    format!("I can help with these policies: {}.", titles.join(", ")),
                    json!({ "topics": POLICY_TOPICS }),
                ))
            }
        }
    }
}
