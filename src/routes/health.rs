// ABOUTME: Health check route for load balancers and uptime monitoring
// ABOUTME: Reports liveness together with a database round-trip
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::service_names;
use crate::resources::ServerResources;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use std::sync::Arc;
use tracing::warn;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the unauthenticated health route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Response {
        let timestamp = resources.clock.now().to_rfc3339();
        match resources.database.ping().await {
            Ok(()) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "healthy",
                    "service": service_names::PHASEWISE_SERVER,
                    "version": env!("CARGO_PKG_VERSION"),
                    "database": "ok",
                    "timestamp": timestamp,
                })),
            )
                .into_response(),
            Err(e) => {
                warn!(error = %e, "Health check database ping failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({
                        "status": "unhealthy",
                        "service": service_names::PHASEWISE_SERVER,
                        "database": "unavailable",
                        "timestamp": timestamp,
                    })),
                )
                    .into_response()
            }
        }
    }
}
