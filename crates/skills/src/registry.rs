//! Capability registry implementation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use concierge_core::{
    traits::{CapabilityRegistry, SpecialistCapability},
    Error, Result,
};

/// Default capability registry using DashMap, keyed by intent name.
pub struct DefaultCapabilityRegistry {
    capabilities: DashMap<String, Arc<dyn SpecialistCapability>>,
}

impl DefaultCapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            capabilities: DashMap::new(),
        }
    }

    /// Register a capability under every intent it declares.
    ///
    /// Each intent is claimed atomically. If one is already taken, the intents
    /// claimed so far are released and nothing stays registered.
    pub fn register(&self, capability: Arc<dyn SpecialistCapability>) -> Result<()> {
        let mut claimed: Vec<&str> = Vec::new();

        for &intent in capability.intents() {
            let owner = match self.capabilities.entry(intent.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(capability.clone());
                    claimed.push(intent);
                    continue;
                }
                Entry::Occupied(existing) => existing.get().name().to_string(),
            };

            for released in claimed {
                self.capabilities.remove(released);
            }
            return Err(Error::Internal(format!(
                "Intent '{}' is already handled by '{}'",
                intent, owner
            )));
        }

        for intent in claimed {
            tracing::info!(agent = %capability.name(), intent = %intent, "Registered capability");
        }
        Ok(())
    }

    /// Number of registered intents.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl Default for DefaultCapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry for DefaultCapabilityRegistry {
    fn resolve(&self, intent_name: &str) -> Option<Arc<dyn SpecialistCapability>> {
        self.capabilities.get(intent_name).map(|entry| entry.value().clone())
    }

    fn intents(&self) -> Vec<String> {
        let mut names: Vec<String> = self.capabilities.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
