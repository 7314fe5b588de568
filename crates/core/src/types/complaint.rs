use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Complaint Classification
// =============================================================================

/// Category of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintType {
    ServiceQuality,
    ProviderBehavior,
    Billing,
    RefundIssue,
    Delay,
    #[default]
    Other,
}

impl ComplaintType {
    /// Parse a loose type hint (`"billing"`, `"Refund Issue"`, `"delay"` ...).
    pub fn from_hint(hint: &str) -> Self {
        let normalized: String = hint
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        match normalized.as_str() {
            "service_quality" | "quality" => Self::ServiceQuality,
            "provider_behavior" | "provider_behaviour" | "behavior" | "behaviour" => {
                Self::ProviderBehavior
            }
            "billing" | "payment" => Self::Billing,
            "refund_issue" | "refund" => Self::RefundIssue,
            "delay" | "late" => Self::Delay,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceQuality => "service_quality",
            Self::ProviderBehavior => "provider_behavior",
            Self::Billing => "billing",
            Self::RefundIssue => "refund_issue",
            Self::Delay => "delay",
            Self::Other => "other",
        }
    }
}

/// Complaint urgency. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl ComplaintPriority {
    /// Time allowed for the first response.
    pub fn response_window(&self) -> Duration {
        match self {
            Self::Critical => Duration::hours(1),
            Self::High => Duration::hours(4),
            Self::Medium => Duration::hours(24),
            Self::Low => Duration::hours(48),
        }
    }

    /// Time allowed for resolution.
    pub fn resolution_window(&self) -> Duration {
        match self {
            Self::Critical => Duration::hours(4),
            Self::High => Duration::hours(24),
            Self::Medium => Duration::hours(72),
            Self::Low => Duration::hours(168),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Complaint workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Escalated,
}

// =============================================================================
// Complaint Records
// =============================================================================

/// A threaded comment on a complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintComment {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A stored complaint.
///
/// `priority` and both due dates are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub id: String,
    pub user_id: i64,
    pub booking_reference: Option<String>,
    pub complaint_type: ComplaintType,
    pub description: String,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub response_due_at: DateTime<Utc>,
    pub resolution_due_at: DateTime<Utc>,
    /// Set exactly once, on the first transition into `Resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Vec<ComplaintComment>,
}

/// Input for creating a complaint. The store derives both due dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComplaint {
    pub user_id: i64,
    pub booking_reference: Option<String>,
    pub complaint_type: ComplaintType,
    pub description: String,
    pub priority: ComplaintPriority,
    pub created_at: DateTime<Utc>,
}

/// Complaint read model: the record plus how many updates it has received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintView {
    pub record: ComplaintRecord,
    pub update_count: usize,
}

/// A change applied to an existing complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComplaintUpdate {
    Comment { author: String, body: String },
    Transition { status: ComplaintStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_hints() {
        assert_eq!(ComplaintType::from_hint("Refund Issue"), ComplaintType::RefundIssue);
        assert_eq!(ComplaintType::from_hint("billing"), ComplaintType::Billing);
        assert_eq!(ComplaintType::from_hint("provider-behavior"), ComplaintType::ProviderBehavior);
        assert_eq!(ComplaintType::from_hint("something else"), ComplaintType::Other);
    }

    #[test]
    fn test_sla_windows() {
        assert_eq!(ComplaintPriority::Critical.response_window(), Duration::hours(1));
        assert_eq!(ComplaintPriority::High.resolution_window(), Duration::hours(24));
        assert_eq!(ComplaintPriority::Medium.response_window(), Duration::hours(24));
        assert_eq!(ComplaintPriority::Low.resolution_window(), Duration::hours(168));
    }
}
