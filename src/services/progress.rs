// ABOUTME: Workout logging service turning sessions into calories, hours, and XP
// ABOUTME: Uses the user's stored weight and the exercise MET table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::clock::Clock;
use crate::constants::limits::MAX_WORKOUT_DURATION_MINUTES;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::progress::xp_for_calories;
use crate::models::{ExerciseType, UserProgress};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Training progress
#[derive(Clone)]
pub struct ProgressService {
    database: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl ProgressService {
    /// Create a progress service
    #[must_use]
    pub fn new(database: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { database, clock }
    }

    /// Record one session and return the updated totals
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` for an unknown exercise type or a duration outside
    ///   `(0, 1440]` minutes
    /// - `RESOURCE_NOT_FOUND` if the user does not exist
    /// - `PRECONDITION_FAILED` if the user has no weight on file
    pub async fn log_workout(
        &self,
        user_id: Uuid,
        exercise_type: &str,
        duration_minutes: f64,
    ) -> AppResult<UserProgress> {
        let exercise: ExerciseType = exercise_type
            .parse()
            .map_err(|e| AppError::invalid_input(format!("Unknown exercise type: {e}")))?;

        if !(duration_minutes > 0.0 && duration_minutes <= MAX_WORKOUT_DURATION_MINUTES) {
            return Err(AppError::invalid_input(format!(
                "duration_minutes must be greater than 0 and at most {MAX_WORKOUT_DURATION_MINUTES}"
            )));
        }

        let user = self
            .database
            .users()
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        let weight_kg = user
            .weight_kg
            .ok_or_else(|| AppError::precondition("Set your weight before logging workouts"))?;

        let calories = exercise.calories(weight_kg, duration_minutes);
        let xp = xp_for_calories(calories);
        let progress = self
            .database
            .progress()
            .record_workout(user_id, duration_minutes / 60.0, calories, xp, self.clock.now())
            .await?;

        info!(user_id = %user_id, exercise = exercise_type, calories, xp, "Logged workout");
        Ok(progress)
    }

    /// Accumulated totals
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` before the first logged workout
    pub async fn get_progress(&self, user_id: Uuid) -> AppResult<UserProgress> {
        self.database
            .progress()
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Progress"))
    }

    /// Store the user's body weight used for calorie estimates
    ///
    /// # Errors
    ///
    /// `VALUE_OUT_OF_RANGE` for a non-positive weight, `RESOURCE_NOT_FOUND` for
    /// an unknown user
    pub async fn set_weight(&self, user_id: Uuid, weight_kg: f64) -> AppResult<()> {
        if !(weight_kg.is_finite() && weight_kg > 0.0) {
            return Err(AppError::out_of_range("weight_kg must be greater than 0"));
        }
        self.database.users().update_weight(user_id, weight_kg).await
    }
}
