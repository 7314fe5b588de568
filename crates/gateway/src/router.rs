//! Keyword intent classifier.
//!
//! Stand-in for a model-backed classifier: every rule whose keywords appear
//! in the message yields one intent, so a single message can carry several.

use async_trait::async_trait;
use regex::Regex;

use concierge_core::{
    traits::IntentClassifier,
    types::{Intent, TurnRequest},
    Error, Result,
};

/// Intent label and the keywords that trigger it, in detection order.
const INTENT_RULES: &[(&str, &[&str])] = &[
    ("booking_cancel", &["cancel", "call off"]),
    ("booking_reschedule", &["reschedule", "move my booking", "change the time", "different day"]),
    ("booking_create", &["book a", "book an", "schedule a", "make a booking", "new booking"]),
    ("booking_status", &["booking status", "my booking", "my appointment", "where is", "when is"]),
    ("complaint", &["complain", "complaint", "unhappy", "terrible", "rude", "not satisfied", "worst"]),
    ("policy_lookup", &["policy", "refund", "guarantee", "privacy", "how long", "what happens if"]),
    ("service_discovery", &["services", "offer", "available", "looking for", "price", "cost"]),
    ("data_query", &["my account", "history", "how many", "summary", "spent"]),
];

/// Complaint type hint and the words that suggest it; first match wins.
const COMPLAINT_HINTS: &[(&str, &[&str])] = &[
    ("refund_issue", &["refund"]),
    ("billing", &["bill", "charged", "charge", "invoice", "payment"]),
    ("provider_behavior", &["rude", "behavior", "behaviour", "unprofessional"]),
    ("delay", &["late", "delay", "no-show", "never showed"]),
    ("service_quality", &["quality", "dirty", "poor", "broken", "damaged"]),
];

const BASE_CONFIDENCE: f32 = 0.6;
const CONFIDENCE_STEP: f32 = 0.1;
const MAX_CONFIDENCE: f32 = 0.95;
/// Confidence of an implied status lookup added to link a reference.
const IMPLIED_CONFIDENCE: f32 = 0.5;

/// Whether `phrase` occurs in `text` as whole words.
///
/// `cancel` matches "please cancel it" but not "cancellation policy".
fn contains_phrase(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Rule-based [`IntentClassifier`].
pub struct KeywordClassifier {
    booking_ref: Regex,
    complaint_ref: Regex,
}

impl KeywordClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            booking_ref: Regex::new(r"(?i)\bBK-[A-Z0-9]{4,}\b")
                .map_err(|e| Error::Config(format!("booking reference pattern: {}", e)))?,
            complaint_ref: Regex::new(r"(?i)\bCMP-[A-Z0-9]{4,}\b")
                .map_err(|e| Error::Config(format!("complaint reference pattern: {}", e)))?,
        })
    }

    fn booking_reference(&self, message: &str) -> Option<String> {
        self.booking_ref.find(message).map(|m| m.as_str().to_uppercase())
    }

    fn complaint_reference(&self, message: &str) -> Option<String> {
        self.complaint_ref.find(message).map(|m| m.as_str().to_uppercase())
    }

    /// Pure classification over lowercase text.
    pub fn detect(&self, message: &str) -> Vec<Intent> {
        let lower = message.to_lowercase();
        let booking_reference = self.booking_reference(message);

        let mut intents: Vec<Intent> = INTENT_RULES
            .iter()
            .filter_map(|(name, keywords)| {
                let hits = keywords.iter().filter(|k| contains_phrase(&lower, k)).count();
                (hits > 0).then(|| {
                    let confidence = (BASE_CONFIDENCE + CONFIDENCE_STEP * (hits - 1) as f32).min(MAX_CONFIDENCE);
                    self.with_parameters(Intent::new(*name, confidence), message, &lower, booking_reference.as_deref())
                })
            })
            .collect();

        // A complaint or reschedule naming a booking should see its status first.
        let wants_status = intents
            .iter()
            .any(|i| i.name == "complaint" || i.name == "booking_reschedule");
        let has_status = intents.iter().any(|i| i.name == "booking_status");
        if let (true, false, Some(reference)) = (wants_status, has_status, booking_reference.as_deref()) {
            intents.push(Intent::new("booking_status", IMPLIED_CONFIDENCE).with_param("booking_reference", reference));
        }

        intents
    }

    fn with_parameters(&self, mut intent: Intent, message: &str, lower: &str, booking_reference: Option<&str>) -> Intent {
        if let Some(reference) = booking_reference {
            intent = intent.with_param("booking_reference", reference);
        }
        match intent.name.as_str() {
            "complaint" => {
                if let Some(id) = self.complaint_reference(message) {
                    intent = intent.with_param("complaint_id", id);
                }
                if let Some((hint, _)) = COMPLAINT_HINTS
                    .iter()
                    .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
                {
                    intent = intent.with_param("complaint_type", *hint);
                }
                intent.with_param("description", message.trim())
            }
            "service_discovery" => intent.with_param("query", message.trim()),
            _ => intent,
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, request: &TurnRequest) -> Result<Vec<Intent>> {
        let intents = self.detect(&request.message);
        tracing::debug!(
            session_id = %request.session_id,
            intents = ?intents.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            "Classified message"
        );
        Ok(intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(intents: &[Intent]) -> Vec<&str> {
        intents.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_single_intent_with_reference() {
        let classifier = KeywordClassifier::new().unwrap();
        let intents = classifier.detect("Please cancel bk-7F3A21 for tomorrow");

        assert_eq!(names(&intents), vec!["booking_cancel"]);
        assert_eq!(intents[0].param_str("booking_reference"), Some("BK-7F3A21"));
    }

    #[test]
    fn test_multiple_intents_in_one_message() {
        let classifier = KeywordClassifier::new().unwrap();
        let intents = classifier.detect("What is your refund policy? Also what services do you offer?");
        assert_eq!(names(&intents), vec!["policy_lookup", "service_discovery"]);
        assert!((intents[0].confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_complaint_implies_status_lookup() {
        let classifier = KeywordClassifier::new().unwrap();
        let intents = classifier.detect("The cleaner for BK-AB12CD was rude, I want to complain");

        assert_eq!(names(&intents), vec!["complaint", "booking_status"]);
        assert_eq!(intents[0].param_str("complaint_type"), Some("provider_behavior"));
        assert_eq!(intents[1].param_str("booking_reference"), Some("BK-AB12CD"));
        assert!((intents[1].confidence - IMPLIED_CONFIDENCE).abs() < 1e-6);
    }

    #[test]
    fn test_complaint_follow_up_reference() {
        let classifier = KeywordClassifier::new().unwrap();
        let intents = classifier.detect("Any update on my complaint CMP-1A2B3C4D?");
        assert_eq!(intents[0].param_str("complaint_id"), Some("CMP-1A2B3C4D"));
    }

    #[test]
    fn test_cancellation_question_is_not_a_cancel_request() {
        let classifier = KeywordClassifier::new().unwrap();
        let intents = classifier.detect("What is your cancellation policy? Is there a cancellation fee?");
        assert_eq!(names(&intents), vec!["policy_lookup"]);
    }

    #[test]
    fn test_phrase_matching_respects_word_boundaries() {
        assert!(contains_phrase("please cancel it", "cancel"));
        assert!(contains_phrase("cancel", "cancel"));
        assert!(contains_phrase("ok, cancel.", "cancel"));
        assert!(!contains_phrase("cancellation policy", "cancel"));
        assert!(!contains_phrase("uncancel", "cancel"));
        assert!(contains_phrase("i want to book a cleaner", "book a"));
        assert!(!contains_phrase("i want to book another", "book a"));
    }

    #[tokio::test]
    async fn test_unrecognized_message_yields_nothing() {
        let classifier = KeywordClassifier::new().unwrap();
        let intents = classifier
            .classify(&TurnRequest::new("s", 1, "hello there"))
            .await
            .unwrap();
        assert!(intents.is_empty());
    }
}
