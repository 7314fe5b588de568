//! Axum-based HTTP server for the gateway.

use axum::{
    extract::{Json, MatchedPath, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use concierge_core::{
    config::ServerConfig,
    traits::{ConversationLog, TurnHandler},
    types::{TurnRecord, TurnRequest},
    Error, Result,
};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Enable CORS.
    pub enable_cors: bool,
    /// Enable request tracing.
    pub enable_tracing: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

impl From<&ServerConfig> for GatewayConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
            enable_tracing: config.enable_tracing,
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Turn handler, normally the orchestrator.
    pub handler: Arc<dyn TurnHandler>,
    /// Conversation log backing the history endpoint.
    pub log: Option<Arc<dyn ConversationLog>>,
}

/// Gateway server.
pub struct GatewayServer {
    config: GatewayConfig,
    state: Arc<AppState>,
    metrics_handle: Option<PrometheusHandle>,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(config: GatewayConfig, handler: Arc<dyn TurnHandler>) -> Self {
        Self {
            config,
            state: Arc::new(AppState { handler, log: None }),
            metrics_handle: None,
        }
    }

    /// Expose conversation history from this log.
    pub fn with_conversation_log(mut self, log: Arc<dyn ConversationLog>) -> Self {
        self.state = Arc::new(AppState {
            handler: self.state.handler.clone(),
            log: Some(log),
        });
        self
    }

    /// Set metrics handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/v1/turn", post(turn_handler))
            .route("/v1/sessions/:session_id/history", get(history_handler))
            .with_state(self.state.clone());

        if let Some(handle) = &self.metrics_handle {
            let handle = handle.clone();
            router = router.route("/metrics", get(move || async move { handle.render() }));
        }

        router = router.layer(middleware::from_fn(track_requests));

        if self.config.enable_cors {
            router = router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));
        }

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::internal(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(addr = %addr, "Gateway server starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Conversation history response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub turns: Vec<TurnRecord>,
}

/// Error response. Messages are generic; details stay in the logs.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(status: StatusCode, code: &str, message: &str) -> Response {
        (
            status,
            Json(Self {
                code: code.to_string(),
                message: message.to_string(),
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Run one conversation turn.
async fn turn_handler(State(state): State<Arc<AppState>>, Json(request): Json<TurnRequest>) -> Response {
    if request.session_id.trim().is_empty() || request.message.trim().is_empty() {
        return ErrorResponse::new(
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
            "session_id and message must not be empty",
        );
    }

    let session_id = request.session_id.clone();
    match state.handler.handle_turn(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "Turn failed");
            ErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "TURN_FAILED",
                "We could not process your message. Please try again.",
            )
        }
    }
}

async fn history_handler(State(state): State<Arc<AppState>>, Path(session_id): Path<String>) -> Response {
    let Some(log) = &state.log else {
        return ErrorResponse::new(StatusCode::NOT_FOUND, "HISTORY_UNAVAILABLE", "conversation history is not enabled");
    };

    match log.history(&session_id).await {
        Ok(turns) => Json(HistoryResponse { session_id, turns }).into_response(),
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "History lookup failed");
            ErrorResponse::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "HISTORY_FAILED",
                "conversation history is temporarily unavailable",
            )
        }
    }
}

/// Record method, route, status and latency for every request.
async fn track_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    concierge_governance::track_request(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}
