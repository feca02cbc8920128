// ABOUTME: Route module organization for the Phasewise HTTP API
// ABOUTME: Groups handlers by domain and merges them into one router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP routes
//!
//! Each domain module holds route definitions and thin handlers that
//! delegate to the service layer.

/// Liveness and database health
pub mod health;
/// Workout phase generation and daily progression
pub mod phases;
/// Subscription plan catalogue
pub mod plans;
/// Logged workouts and accumulated totals
pub mod progress;
/// Subscriptions and payment events
pub mod subscriptions;

pub use health::HealthRoutes;
pub use phases::PhaseRoutes;
pub use plans::PlanRoutes;
pub use progress::ProgressRoutes;
pub use subscriptions::SubscriptionRoutes;

use crate::resources::ServerResources;
use axum::Router;
use std::sync::Arc;

/// Every route of the API, without middleware
pub fn api_router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(PhaseRoutes::routes(resources.clone()))
        .merge(PlanRoutes::routes(resources.clone()))
        .merge(SubscriptionRoutes::routes(resources.clone()))
        .merge(ProgressRoutes::routes(resources.clone()))
}
