//! Layered application configuration.

use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub orchestrator: OrchestratorConfig,
    pub store: StoreConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub enable_tracing: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrchestratorConfig {
    /// Wall-clock budget for a whole turn.
    pub turn_timeout_ms: u64,
    /// Intents below this confidence are dropped before planning.
    pub min_confidence: f32,
    /// Intent name -> intents it depends on.
    pub dependencies: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Redis URL for the conversation log; in-memory when unset.
    pub redis_url: Option<Secret<String>>,
    pub conversation_prefix: String,
    pub conversation_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    pub json_logs: bool,
    pub service_name: String,
    pub enable_metrics: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("CONCIERGE_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__SERVER__PORT=3000 to server.port
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::from_config(s)
    }

    /// Deserialize on top of the built-in defaults, so partial files work.
    fn from_config(overrides: Config) -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&DefaultsView::from(&AppConfig::default()))?;
        Config::builder()
            .add_source(defaults)
            .add_source(overrides)
            .build()?
            .try_deserialize()
    }
}

impl OrchestratorConfig {
    /// Dependency edges shipped out of the box.
    pub fn default_dependencies() -> BTreeMap<String, Vec<String>> {
        let mut deps = BTreeMap::new();
        deps.insert("complaint".to_string(), vec!["booking_status".to_string()]);
        deps.insert("booking_reschedule".to_string(), vec!["booking_status".to_string()]);
        deps.insert("booking_cancel".to_string(), vec!["booking_status".to_string()]);
        deps
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 3000,
                enable_cors: true,
                enable_tracing: true,
            },
            orchestrator: OrchestratorConfig {
                turn_timeout_ms: 30_000,
                min_confidence: 0.0,
                dependencies: OrchestratorConfig::default_dependencies(),
            },
            store: StoreConfig {
                redis_url: None,
                conversation_prefix: "concierge:conversation".into(),
                conversation_ttl_secs: 7 * 24 * 3600,
            },
            observability: ObservabilityConfig {
                json_logs: false,
                service_name: "concierge".into(),
                enable_metrics: true,
            },
        }
    }
}

/// Serializable mirror of the defaults (secrets are never defaulted).
#[derive(serde::Serialize)]
struct DefaultsView {
    server: ServerView,
    orchestrator: OrchestratorView,
    store: StoreView,
    observability: ObservabilityView,
}

#[derive(serde::Serialize)]
struct ServerView {
    host: String,
    port: u16,
    enable_cors: bool,
    enable_tracing: bool,
}

#[derive(serde::Serialize)]
struct OrchestratorView {
    turn_timeout_ms: u64,
    min_confidence: f32,
    dependencies: BTreeMap<String, Vec<String>>,
}

#[derive(serde::Serialize)]
struct StoreView {
    conversation_prefix: String,
    conversation_ttl_secs: u64,
}

#[derive(serde::Serialize)]
struct ObservabilityView {
    json_logs: bool,
    service_name: String,
    enable_metrics: bool,
}

impl From<&AppConfig> for DefaultsView {
    fn from(c: &AppConfig) -> Self {
        Self {
            server: ServerView {
                host: c.server.host.clone(),
                port: c.server.port,
                enable_cors: c.server.enable_cors,
                enable_tracing: c.server.enable_tracing,
            },
            orchestrator: OrchestratorView {
                turn_timeout_ms: c.orchestrator.turn_timeout_ms,
                min_confidence: c.orchestrator.min_confidence,
                dependencies: c.orchestrator.dependencies.clone(),
            },
            store: StoreView {
                conversation_prefix: c.store.conversation_prefix.clone(),
                conversation_ttl_secs: c.store.conversation_ttl_secs,
            },
            observability: ObservabilityView {
                json_logs: c.observability.json_logs,
                service_name: c.observability.service_name.clone(),
                enable_metrics: c.observability.enable_metrics,
            },
        }
    }
}
