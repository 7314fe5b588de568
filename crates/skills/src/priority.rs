//! Keyword-driven complaint priority and SLA assignment.
//!
//! Rules are checked in order and the first match wins:
//! 1. a critical keyword in the description -> `Critical`
//! 2. a strong-sentiment keyword, or a billing/refund complaint -> `High`
//! 3. a service-quality or provider-behaviour complaint -> `Medium`
//! 4. anything else -> `Low`
//!
//! Keywords match case-insensitively against the start of any word, so
//! `danger` also catches "dangerous" and `immediate` catches "immediately".

use chrono::{DateTime, Utc};
use concierge_core::types::{ComplaintPriority, ComplaintType};
use serde::{Deserialize, Serialize};

/// Words that escalate a complaint straight to `Critical`.
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "urgent",
    "emergency",
    "danger",
    "immediate",
    "unsafe",
    "hazard",
    "injur",
];

/// Strong negative sentiment that raises a complaint to `High`.
pub const HIGH_SENTIMENT_KEYWORDS: &[&str] = &[
    "terrible",
    "worst",
    "unacceptable",
    "horrible",
    "awful",
    "disgusting",
];

/// Priority plus the SLA deadlines derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintAssessment {
    pub priority: ComplaintPriority,
    pub response_due_at: DateTime<Utc>,
    pub resolution_due_at: DateTime<Utc>,
}

fn contains_keyword(description: &str, keywords: &[&str]) -> bool {
    let lower = description.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| keywords.iter().any(|k| word.starts_with(k)))
}

/// Assign a priority from the description and complaint type.
pub fn priority_for(description: &str, complaint_type: ComplaintType) -> ComplaintPriority {
    if contains_keyword(description, CRITICAL_KEYWORDS) {
        return ComplaintPriority::Critical;
    }

    if contains_keyword(description, HIGH_SENTIMENT_KEYWORDS)
        || matches!(complaint_type, ComplaintType::Billing | ComplaintType::RefundIssue)
    {
        return ComplaintPriority::High;
    }

    if matches!(
        complaint_type,
        ComplaintType::ServiceQuality | ComplaintType::ProviderBehavior
    ) {
        return ComplaintPriority::Medium;
    }

    ComplaintPriority::Low
}

/// Classify a complaint created at `created_at`.
pub fn classify(description: &str, complaint_type: ComplaintType, created_at: DateTime<Utc>) -> ComplaintAssessment {
    let priority = priority_for(description, complaint_type);
    ComplaintAssessment {
        priority,
        response_due_at: created_at + priority.response_window(),
        resolution_due_at: created_at + priority.resolution_window(),
    }
}
