// ABOUTME: Subscription plan catalogue route handlers
// ABOUTME: Any authenticated caller may browse plans; only admins may create them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::{authenticate, ADMIN_ROLES, ANY_ROLE};
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::CreatePlanRequest;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

/// Plan routes implementation
pub struct PlanRoutes;

impl PlanRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/plans",
                get(Self::handle_list_plans).post(Self::handle_create_plan),
            )
            .route("/api/plans/:plan_id", get(Self::handle_get_plan))
            .with_state(resources)
    }

    async fn handle_list_plans(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources, ANY_ROLE).await?;
        let plans = resources.billing.list_plans().await?;
        Ok((StatusCode::OK, Json(plans)).into_response())
    }

    async fn handle_get_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources, ANY_ROLE).await?;
        let plan = resources.billing.get_plan(plan_id).await?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    async fn handle_create_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreatePlanRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources, ADMIN_ROLES).await?;
        let plan = resources.billing.create_plan(request).await?;
        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }
}
