//! HTTP server
//!
//! Routes:
//!   POST /chat   - forward a message to the completion API
//!   GET  /health - liveness check

mod state;

pub use state::AppState;

use crate::config::Config;
use crate::error::ChatError;
use crate::handler::ChatHandler;
use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Build the application router.
///
/// No body size limit: message length is left to the completion API.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::disable())
}

async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(e) => return e.into_response(),
    };

    match state.handler.handle(&payload).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// An empty body reads as `{}` so it reports the missing field.
fn parse_body(body: &[u8]) -> Result<Value, ChatError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Rejected malformed JSON body");
        ChatError::InvalidJson
    })
}

/// Bind the configured port and serve until Ctrl-C.
pub async fn run(config: &Config) -> Result<()> {
    let handler = ChatHandler::from_config(config)?;
    if config.api_key().is_none() {
        error!("OPENAI_API_KEY is not set; /chat will answer 500 until it is configured");
    }

    let model = handler.model().to_string();
    let app = router(AppState::new(handler));

    let addr = config.listen_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            error!("Port {} is already in use", config.port);
            error!("Try a different port with: chat-proxy serve --port <PORT>");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    info!("Server is running on port {}", config.port);
    info!(
        model = %model,
        prompt = %config.system_prompt_path.display(),
        timeout_secs = config.request_timeout_secs,
        "Forwarding POST /chat"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
