// ABOUTME: HTTP server assembly: merges route groups, applies tracing and CORS layers
// ABOUTME: Binds the listener and serves until a shutdown signal arrives
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Server
//!
//! [`build_router`] is separate from [`serve`] so tests can drive the full
//! application with `tower::ServiceExt::oneshot` without binding a port.

use crate::errors::{AppError, AppResult};
use crate::middleware::{create_request_span, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{DreamRoutes, HealthRoutes};
use axum::body::Body;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the complete application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config.cors);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(DreamRoutes::routes(resources))
        .layer(TraceLayer::new_for_http().make_span_with(create_request_span::<Body>))
        .layer(cors)
}

/// Bind `0.0.0.0:port` and serve until Ctrl+C
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server loop fails
pub async fn serve(resources: Arc<ServerResources>, port: u16) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Somnia server listening on http://{addr}");
    info!("   Dream stats:    GET  http://{addr}/dream-stats");
    info!("   Stats summary:  GET  http://{addr}/dream-stats/summary");
    info!("   Submit dream:   POST http://{addr}/dream-analysis");
    info!("   Health:         GET  http://{addr}/health");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
