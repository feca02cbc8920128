// ABOUTME: Phase progression route handlers for generating and following workout phases
// ABOUTME: Thin wrappers that authenticate, parse the request, and delegate to the phase engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::{authenticate, USER_ROLES};
use crate::errors::AppError;
use crate::models::{MissionPreferences, PhaseNumber, PhaseState, WorkoutPlanDay};
use crate::resources::ServerResources;
use crate::services::AutoProgressReport;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of a phase request
///
/// Phase 1 needs all four fields. Later phases reuse the first mission and
/// accept an empty body.
#[derive(Debug, Default, Deserialize)]
pub struct PhaseRequest {
    pub mission: Option<String>,
    pub time_commitment: Option<String>,
    pub gear: Option<String>,
    pub squad: Option<String>,
}

impl PhaseRequest {
    /// Preferences if any field was sent
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` naming the first absent field when the
    /// request is partially filled
    pub fn into_preferences(self) -> Result<Option<MissionPreferences>, AppError> {
        if self.mission.is_none()
            && self.time_commitment.is_none()
            && self.gear.is_none()
            && self.squad.is_none()
        {
            return Ok(None);
        }

        let preferences = MissionPreferences {
            mission: self.mission.ok_or_else(|| AppError::missing_field("mission"))?,
            time_commitment: self
                .time_commitment
                .ok_or_else(|| AppError::missing_field("time_commitment"))?,
            gear: self.gear.ok_or_else(|| AppError::missing_field("gear"))?,
            squad: self.squad.ok_or_else(|| AppError::missing_field("squad"))?,
        };
        preferences.validated().map(Some)
    }
}

/// Newly generated phase
#[derive(Debug, Serialize)]
pub struct GeneratedPhaseResponse {
    pub phase: PhaseNumber,
    pub days: Vec<WorkoutPlanDay>,
}

/// Today's scheduled workout and what progression did before reading it
#[derive(Debug, Serialize)]
pub struct TodayWorkoutResponse {
    pub date: NaiveDate,
    pub workouts: Vec<WorkoutPlanDay>,
    pub progression: AutoProgressReport,
}

/// Position in the phase state machine
#[derive(Debug, Serialize)]
pub struct PhaseStatusResponse {
    pub state: PhaseState,
    pub phase: Option<PhaseNumber>,
    pub terminal: bool,
}

/// Request body, treating a body-less request as empty
fn phase_request(body: Result<Json<PhaseRequest>, JsonRejection>) -> Result<PhaseRequest, AppError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(PhaseRequest::default()),
        Err(rejection) => Err(AppError::invalid_input(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    }
}

fn parse_phase(raw: i64) -> Result<PhaseNumber, AppError> {
    PhaseNumber::new(raw).map_err(|e| AppError::out_of_range(e.to_string()))
}

/// Phase routes implementation
pub struct PhaseRoutes;

impl PhaseRoutes {
    /// Create all phase routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/phases/next", post(Self::handle_next_phase))
            .route("/api/phases/today", get(Self::handle_today))
            .route("/api/phases/status", get(Self::handle_status))
            .route("/api/phases/:phase/generate", post(Self::handle_generate_phase))
            .route(
                "/api/phases/:phase/days/:day/complete",
                post(Self::handle_complete_day),
            )
            .with_state(resources)
    }

    async fn handle_next_phase(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<PhaseRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, USER_ROLES).await?;
        let preferences = phase_request(body)?.into_preferences()?;

        let days = resources
            .phase_engine
            .advance_to_next_phase(auth.user_id(), preferences)
            .await?;
        let phase = days.first().map_or(PhaseNumber::FIRST, |day| day.phase);

        Ok((StatusCode::CREATED, Json(GeneratedPhaseResponse { phase, days })).into_response())
    }

    async fn handle_generate_phase(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(phase): Path<i64>,
        body: Result<Json<PhaseRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, USER_ROLES).await?;
        let phase = parse_phase(phase)?;
        let preferences = phase_request(body)?.into_preferences()?;

        let days = resources
            .phase_engine
            .request_phase_advance(auth.user_id(), phase, preferences)
            .await?;

        Ok((StatusCode::CREATED, Json(GeneratedPhaseResponse { phase, days })).into_response())
    }

    async fn handle_today(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, USER_ROLES).await?;
        let engine = &resources.phase_engine;

        let progression = engine.auto_progress_phases(auth.user_id()).await;
        let workouts = engine.get_today_workout(auth.user_id()).await?;

        Ok((
            StatusCode::OK,
            Json(TodayWorkoutResponse {
                date: resources.clock.today(),
                workouts,
                progression,
            }),
        )
            .into_response())
    }

    async fn handle_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, USER_ROLES).await?;
        let state = resources.phase_engine.phase_state(auth.user_id()).await?;

        Ok((
            StatusCode::OK,
            Json(PhaseStatusResponse {
                state,
                phase: state.phase(),
                terminal: state.is_terminal(),
            }),
        )
            .into_response())
    }

    async fn handle_complete_day(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((phase, day)): Path<(i64, u32)>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources, USER_ROLES).await?;
        let phase = parse_phase(phase)?;

        let row = resources
            .phase_engine
            .complete_day(auth.user_id(), phase, day)
            .await?;

        Ok((StatusCode::OK, Json(row)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_empty_request_has_no_preferences() {
        assert!(PhaseRequest::default().into_preferences().unwrap().is_none());
    }

    #[test]
    fn test_partial_request_names_missing_field() {
        let request = PhaseRequest {
            mission: Some("get strong".into()),
            time_commitment: Some("30 minutes".into()),
            gear: None,
            squad: Some("solo".into()),
        };
        let error = request.into_preferences().unwrap_err();
        assert_eq!(error.code, ErrorCode::MissingRequiredField);
        assert_eq!(error.context.details["field"], "gear");
    }
}
