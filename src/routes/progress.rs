// ABOUTME: Training progress route handlers for logging workouts and reading totals
// ABOUTME: Also lets a user record the body weight used for calorie estimates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::{authenticate, USER_ROLES};
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// A finished workout session
#[derive(Debug, Deserialize)]
pub struct LogWorkoutRequest {
    pub exercise_type: String,
    pub duration_minutes: f64,
}

/// Body weight update
#[derive(Debug, Deserialize)]
pub struct UpdateWeightRequest {
    pub weight_kg: f64,
}

/// Progress routes implementation
pub struct ProgressRoutes;

impl ProgressRoutes {
    /// Create all progress routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/progress", get(Self::handle_get_progress))
            .route("/api/progress/workouts", post(Self::handle_log_workout))
            .route("/api/progress/weight", put(Self::handle_update_weight))
            .with_state(resources)
    }

    async fn handle_log_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<LogWorkoutRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, USER_ROLES).await?;
        let progress = resources
            .progress
            .log_workout(auth.user_id(), &request.exercise_type, request.duration_minutes)
            .await?;
        Ok((StatusCode::OK, Json(progress)).into_response())
    }

    async fn handle_get_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, USER_ROLES).await?;
        let progress = resources.progress.get_progress(auth.user_id()).await?;
        Ok((StatusCode::OK, Json(progress)).into_response())
    }

    async fn handle_update_weight(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpdateWeightRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, USER_ROLES).await?;
        resources
            .progress
            .set_weight(auth.user_id(), request.weight_kg)
            .await?;
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "weight_kg": request.weight_kg })),
        )
            .into_response())
    }
}
