//! HTTP surface.
//!
//! | Route              | Purpose                                   |
//! |--------------------|-------------------------------------------|
//! | `POST /generate`   | generate one document                     |
//! | `POST /wiki/search`| search Wikipedia for reference titles     |
//! | `GET /status`      | connector state                           |
//! | `GET /health`      | same as `/status`                         |
//!
//! When a static directory is configured it is served for every other path.

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::assembler::DocumentAssembler;
use crate::config::ServerConfig;
use crate::connector::ModelConnector;
use crate::models::WikiLang;
use crate::wiki::ReferenceSource;

pub use handlers::{GenerateResponse, SearchRequest, SearchResponse, StatusResponse};

/// Shared state of the HTTP handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub assembler: Arc<DocumentAssembler>,
    pub references: Arc<dyn ReferenceSource>,
    pub default_lang: WikiLang,
    pub search_limit: usize,
    /// Length of the configured API key; zero when none is set
    pub key_length: usize,
}

impl AppState {
    pub fn new(assembler: Arc<DocumentAssembler>, references: Arc<dyn ReferenceSource>) -> Self {
        Self {
            assembler,
            references,
            default_lang: WikiLang::default(),
            search_limit: 8,
            key_length: 0,
        }
    }

    pub fn with_default_lang(mut self, lang: WikiLang) -> Self {
        self.default_lang = lang;
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Record the configured key's length (never the key itself)
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.key_length = api_key.trim().chars().count();
        self
    }

    pub fn connector(&self) -> &ModelConnector {
        self.assembler.connector()
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(handlers::generate))
        .route("/wiki/search", post(handlers::wiki_search))
        .route("/status", get(handlers::status))
        .route("/health", get(handlers::status))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until interrupted
pub async fn run_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let mut app = router(state);
    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "Serving static files");
        app = app.fallback_service(ServeDir::new(dir));
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
