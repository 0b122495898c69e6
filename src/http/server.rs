use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use tracing::info;

use crate::handlers::extract_text::extract_text;

// Firefox ESR User-Agent string to reduce server-side variance
pub const FIREFOX_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:115.0) Gecko/20100101 Firefox/115.0";

// The request body only ever carries a URL; anything bigger is noise.
const INBOUND_BODY_LIMIT: usize = 64 * 1024;

/// Operational parameters of the service, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub fetch_timeout: Duration,
    pub max_pdf_bytes: usize,
}

/// Shared per-process state handed to every request.
pub struct AppState {
    pub http_client: Client,
    pub max_pdf_bytes: usize,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(FIREFOX_UA)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            max_pdf_bytes: config.max_pdf_bytes,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(extract_text).post(extract_text))
        .route("/healthz", get(health))
        .layer(DefaultBodyLimit::max(INBOUND_BODY_LIMIT))
        .with_state(state)
}

/// Liveness probe for the hosting platform; carries no pipeline logic.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::new(&config)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!("Listening on http://{}", config.addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server terminated")?;

    Ok(())
}
