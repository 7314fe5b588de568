#![deny(unused)]
//! Concierge - customer-service turn orchestrator.
//!
//! Classifies each message into intents, runs the matching specialist
//! capabilities in parallel or in dependency order, and merges their results
//! into one reply with provenance.

use std::sync::Arc;

use concierge_controller::Orchestrator;
use concierge_core::config::AppConfig;
use concierge_core::traits::{BookingStore, ComplaintStore};
use concierge_gateway::{GatewayConfig, GatewayServer, KeywordClassifier};
use concierge_skills::{register_builtin_capabilities, DefaultCapabilityRegistry, SystemClock};
use concierge_store::{conversation_log_from_config, InMemoryBookingStore, InMemoryComplaintStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    concierge_governance::configure_tracing(config.observability.json_logs, &config.observability.service_name)?;
    tracing::info!("Starting Concierge v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Storage
    // =========================================================================
    let bookings: Arc<dyn BookingStore> = Arc::new(InMemoryBookingStore::new());
    let complaints: Arc<dyn ComplaintStore> = Arc::new(InMemoryComplaintStore::new());
    let conversation_log = conversation_log_from_config(&config.store)?;

    // =========================================================================
    // Capabilities
    // =========================================================================
    let registry = Arc::new(DefaultCapabilityRegistry::new());
    register_builtin_capabilities(&registry, bookings, complaints, Arc::new(SystemClock))?;
    tracing::info!(capabilities = registry.len(), "Capability registry initialized");

    // =========================================================================
    // Orchestrator
    // =========================================================================
    // A cyclic dependency table fails here, before any turn is served.
    let orchestrator = Arc::new(
        Orchestrator::builder()
            .with_orchestrator_config(&config.orchestrator)?
            .with_classifier(Arc::new(KeywordClassifier::new()?))
            .with_registry(registry)
            .with_conversation_log(conversation_log.clone())
            .build()?,
    );
    tracing::info!(
        turn_timeout_ms = config.orchestrator.turn_timeout_ms,
        min_confidence = config.orchestrator.min_confidence,
        "Orchestrator initialized"
    );

    // =========================================================================
    // Gateway
    // =========================================================================
    let mut server = GatewayServer::new(GatewayConfig::from(&config.server), orchestrator)
        .with_conversation_log(conversation_log);

    if config.observability.enable_metrics {
        let handle = concierge_governance::setup_metrics_recorder()?;
        server = server.with_metrics(handle);
    }

    server.run().await?;

    Ok(())
}
