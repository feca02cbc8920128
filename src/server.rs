// ABOUTME: HTTP server assembly with middleware, listener binding, and graceful shutdown
// ABOUTME: Wraps the API router in tracing, CORS, and request timeout layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::ServerConfig;
use crate::constants::defaults::HTTP_REQUEST_TIMEOUT_SECS;
use crate::resources::ServerResources;
use crate::routes::api_router;
use anyhow::{Context, Result};
use axum::Router;
use http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Configure CORS from the configured origin list
///
/// `*` or an empty list allows any origin; otherwise only the listed ones.
#[must_use]
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
}

/// The complete application: routes plus middleware
///
/// The request timeout sits above the plan generator timeout so a slow
/// upstream surfaces as a 502 rather than a dropped request.
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    api_router(resources)
        .layer(TimeoutLayer::new(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS)))
        .layer(setup_cors(&resources.config))
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the Phasewise API
pub struct PhasewiseServer {
    resources: Arc<ServerResources>,
}

impl PhasewiseServer {
    /// Create a server over shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Bind the configured port and serve until SIGINT or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server fails
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.resources.config.http_port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
        info!("HTTP server listening on {addr}");

        let app = build_router(&self.resources);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                error!("Failed to register signal handlers, falling back to Ctrl+C");
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl+C: {e}");
                }
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
        }
    }
    info!("Shutdown signal received, draining connections");
}
