//! HTTP server for the onboarding REST API

use crate::api::handlers;
use crate::error::{AppError, Result};
use crate::services::kyc_service::MAX_DOCUMENT_SIZE;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Oversized uploads still reach the handler so they get a readable error
const UPLOAD_BODY_LIMIT: usize = MAX_DOCUMENT_SIZE * 2;

/// Build the API router over shared state
pub fn build_router(state: Arc<AppState>) -> Router {
    // Website runs on a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::health_check))
        // Application & login
        .route("/api/apply", post(handlers::apply))
        .route("/api/login", post(handlers::login))
        // KYC
        .route("/api/kyc/submit", post(handlers::submit_documents))
        .route("/api/kyc/:email", get(handlers::get_documents))
        .route(
            "/api/kyc/:email/:slot",
            put(handlers::upload_document).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Agreement
        .route("/api/agreement", post(handlers::submit_agreement))
        // Progress
        .route("/api/progress/:email", get(handlers::get_progress))
        .route("/api/progress/:email/view", get(handlers::get_progress_view))
        .route("/api/progress/:email/events", get(handlers::progress_events))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API server manager
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: Option<SocketAddr>,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
            local_addr: None,
        }
    }

    /// Bind the configured address and serve in the background
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let addr = self.state.config.socket_addr()?;
        let app = build_router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        });

        info!("Investor onboarding API listening on {}", local_addr);
        info!("  GET  http://{}/health", local_addr);
        info!("  POST http://{}/api/apply", local_addr);
        info!("  PUT  http://{}/api/kyc/{{email}}/{{slot}}", local_addr);
        info!("  GET  http://{}/api/progress/{{email}}/events", local_addr);

        Ok(local_addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}
