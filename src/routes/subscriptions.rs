// ABOUTME: Subscription route handlers for opening, inspecting, and settling subscriptions
// ABOUTME: Payment outcome events are restricted to administrative callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::{authenticate, ADMIN_ROLES, ANY_ROLE};
use crate::errors::AppError;
use crate::models::PaymentOutcome;
use crate::resources::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Request to subscribe to a plan
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub plan_id: Uuid,
}

/// Payment provider notification
#[derive(Debug, Deserialize)]
pub struct PaymentEventRequest {
    pub payment_reference: String,
    pub outcome: PaymentOutcome,
}

/// Subscription routes implementation
pub struct SubscriptionRoutes;

impl SubscriptionRoutes {
    /// Create all subscription routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/subscriptions", post(Self::handle_create_subscription))
            .route("/api/subscriptions/me", get(Self::handle_my_subscription))
            .route(
                "/api/subscriptions/payment-events",
                post(Self::handle_payment_event),
            )
            .with_state(resources)
    }

    async fn handle_create_subscription(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateSubscriptionRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, ANY_ROLE).await?;
        let subscription = resources
            .billing
            .create_subscription(auth.user_id(), request.plan_id)
            .await?;
        Ok((StatusCode::CREATED, Json(subscription)).into_response())
    }

    async fn handle_my_subscription(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, ANY_ROLE).await?;
        let details = resources.billing.my_subscription(auth.user_id()).await?;
        Ok((StatusCode::OK, Json(details)).into_response())
    }

    async fn handle_payment_event(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<PaymentEventRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources, ADMIN_ROLES).await?;
        let payment_reference = request.payment_reference.trim();
        if payment_reference.is_empty() {
            return Err(AppError::missing_field("payment_reference"));
        }

        let subscription = resources
            .billing
            .record_payment_outcome(payment_reference, request.outcome)
            .await?;
        Ok((StatusCode::OK, Json(subscription)).into_response())
    }
}
