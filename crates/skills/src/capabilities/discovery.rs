//! Service catalogue search.

use async_trait::async_trait;
use serde_json::json;

use concierge_core::{
    traits::SpecialistCapability,
    types::{CapabilityOutput, Intent, TaskContext},
    Result,
};

use super::intents;
use crate::catalog::{self, ServiceListing, SERVICES};

#[derive(Debug, Default)]
pub struct ServiceDiscoveryCapability;

impl ServiceDiscoveryCapability {
    pub fn new() -> Self {
        Self
    }

    /// Services matching a category or any query word, cheapest first.
    ///
    /// With neither a category nor a matching word, the whole catalogue is returned.
    pub fn search(category: Option<&str>, query: &str) -> Vec<&'static ServiceListing> {
        let words: Vec<String> = query
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();

        let mut hits: Vec<&ServiceListing> = SERVICES
            .iter()
            .filter(|s| match category {
                Some(c) => s.category.eq_ignore_ascii_case(c),
                None => s.keywords.iter().any(|k| words.iter().any(|w| w == k)),
            })
            .collect();

        if hits.is_empty() && category.is_none() {
            hits = SERVICES.iter().collect();
        }
        hits.sort_by_key(|s| s.base_price);
        hits
    }
}

#[async_trait]
impl SpecialistCapability for ServiceDiscoveryCapability {
    fn name(&self) -> &str {
        "service_discovery_agent"
    }

    fn intents(&self) -> &[&'static str] {
        &[intents::SERVICE_DISCOVERY]
    }

    async fn handle(&self, intent: &Intent, context: &TaskContext) -> Result<CapabilityOutput> {
        let query = intent.param_str("query").unwrap_or(&context.message);
        let matches = Self::search(intent.param_str("category"), query);

        let summary = match matches.as_slice() {
            [] => format!(
                "We don't offer that yet. Available categories: {}.",
                catalog::categories().join(", ")
            ),
            [only] => format!("{} is available from {}.", only.name, only.base_price),
            many => {
                let names: Vec<String> = many
                    .iter()
                    .map(|s| format!("{} ({})", s.name, s.base_price))
                    .collect();
                format!("Available services: {}.", names.join(", "))
            }
        };

        Ok(CapabilityOutput::new(
            "services_listed",
            summary,
            json!({ "services": matches }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_by_keyword_sorted_by_price() {
        let hits = ServiceDiscoveryCapability::search(None, "I need my house cleaned, a deep clean");
        let ids: Vec<&str> = hits.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["home_cleaning", "deep_cleaning"]);
    }

    #[test]
    fn test_search_by_category() {
        let hits = ServiceDiscoveryCapability::search(Some("Plumbing"), "");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "plumbing_repair");
    }

    #[test]
    fn test_unknown_category_is_empty() {
        assert!(ServiceDiscoveryCapability::search(Some("gardening"), "").is_empty());
    }

    #[tokio::test]
    async fn test_no_keyword_lists_everything() {
        let ctx = TaskContext {
            message: "what do you offer?".into(),
            ..Default::default()
        };
        let out = ServiceDiscoveryCapability::new()
            .handle(&Intent::new("service_discovery", 0.7), &ctx)
            .await
            .unwrap();
        assert_eq!(out.payload["services"].as_array().unwrap().len(), SERVICES.len());
        assert_eq!(out.payload["services"][0]["id"], "home_cleaning");
    }
}
