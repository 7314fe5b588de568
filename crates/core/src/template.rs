//! Template-based reply formatting.
//!
//! Stands in for the language-generation step: each successful contribution
//! carries a one-line summary, and Tera templates stitch them into a reply.

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::Result;
use crate::traits::ResponseFormatter;
use crate::types::AgentResult;

const SINGLE_TEMPLATE: &str = "reply_single.txt";
const COMBINED_TEMPLATE: &str = "reply_combined.txt";

const DEFAULT_SINGLE: &str = "{{ summary }}";
const DEFAULT_COMBINED: &str = "Here's what I took care of:\n{%- for item in items %}\n- {{ item.summary }}{% endfor %}";

#[derive(Serialize)]
struct Contribution<'a> {
    agent: &'a str,
    intent: &'a str,
    action: &'a str,
    summary: &'a str,
    payload: &'a serde_json::Value,
}

impl<'a> Contribution<'a> {
    fn from_result(result: &'a AgentResult) -> Self {
        Self {
            agent: &result.agent,
            intent: &result.intent_name,
            action: result.action.as_deref().unwrap_or(""),
            summary: result.summary.as_deref().unwrap_or(""),
            payload: result.payload.as_ref().unwrap_or(&serde_json::Value::Null),
        }
    }
}

/// Tera-backed [`ResponseFormatter`].
pub struct TemplateFormatter {
    tera: Tera,
}

impl TemplateFormatter {
    /// Formatter with the built-in templates.
    pub fn new() -> Result<Self> {
        Self::with_templates(DEFAULT_SINGLE, DEFAULT_COMBINED)
    }

    /// Formatter with custom templates.
    ///
    /// The single template sees `agent`, `intent`, `action`, `summary` and
    /// `payload`; the combined template sees `items`, a list of the same.
    pub fn with_templates(single: &str, combined: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![(SINGLE_TEMPLATE, single), (COMBINED_TEMPLATE, combined)])?;
        Ok(Self { tera })
    }
}

impl ResponseFormatter for TemplateFormatter {
    fn render_single(&self, result: &AgentResult) -> Result<String> {
        let context = Context::from_serialize(Contribution::from_result(result))?;
        Ok(self.tera.render(SINGLE_TEMPLATE, &context)?)
    }

    fn render_combined(&self, results: &[&AgentResult]) -> Result<String> {
        let items: Vec<Contribution<'_>> = results.iter().map(|r| Contribution::from_result(r)).collect();
        let mut context = Context::new();
        context.insert("items", &items);
        Ok(self.tera.render(COMBINED_TEMPLATE, &context)?)
    }
}
