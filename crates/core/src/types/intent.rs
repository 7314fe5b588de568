use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Intent Types (classifier output)
// =============================================================================

/// A classified user goal with its extracted parameters.
///
/// Produced by the external classifier and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Intent label, e.g. `booking_status` or `complaint`.
    pub name: String,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f32,
    /// Parameters the classifier pulled out of the message.
    #[serde(default)]
    pub extracted_parameters: Map<String, Value>,
}

impl Intent {
    /// Create an intent with no parameters. Confidence is clamped to `[0, 1]`.
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence: confidence.clamp(0.0, 1.0),
            extracted_parameters: Map::new(),
        }
    }

    /// Attach an extracted parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extracted_parameters.insert(key.into(), value.into());
        self
    }

    /// Look up a parameter.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.extracted_parameters.get(key)
    }

    /// Look up a string parameter, ignoring blanks.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.param(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Look up an integer parameter, accepting numeric strings.
    pub fn param_i64(&self, key: &str) -> Option<i64> {
        match self.param(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(Intent::new("x", 1.7).confidence, 1.0);
        assert_eq!(Intent::new("x", -0.2).confidence, 0.0);
    }

    #[test]
    fn test_param_accessors() {
        let intent = Intent::new("booking_create", 0.9)
            .with_param("amount_cents", "12000")
            .with_param("service_id", "  ")
            .with_param("note", "window seat");

        assert_eq!(intent.param_i64("amount_cents"), Some(12000));
        assert_eq!(intent.param_str("service_id"), None);
        assert_eq!(intent.param_str("note"), Some("window seat"));
    }
}
