// ABOUTME: HTTP server assembly: router composition, middleware stack, and graceful shutdown
// ABOUTME: Serves the health, chat, and user routes over a single axum application
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # HTTP Server
//!
//! [`build_router`] is what tests drive directly; [`serve`] binds it to the
//! configured address and runs until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{extract::Request, Router};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, info_span};

use crate::constants::limits::MAX_REQUEST_BODY_BYTES;
use crate::middleware::setup_cors;
use crate::resources::ServerResources;
use crate::routes::{ChatRoutes, HealthRoutes, UserRoutes};

/// Header carrying the per-request identifier
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application router with all middleware applied
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .merge(ChatRoutes::routes(Arc::clone(resources)))
        .merge(UserRoutes::routes(Arc::clone(resources)))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(trace_layer)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(setup_cors(&resources.config))
}

/// Bind the configured address and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn serve(resources: Arc<ServerResources>) -> Result<()> {
    let addr = format!("{}:{}", resources.config.host, resources.config.http_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Saedam API listening on http://{}", addr);

    axum::serve(listener, build_router(&resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Saedam API stopped");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
