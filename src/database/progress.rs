// ABOUTME: Database operations for accumulated training progress
// ABOUTME: One row per user, created on the first logged workout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::UserProgress;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Progress database operations manager
pub struct ProgressManager {
    pool: SqlitePool,
}

impl ProgressManager {
    /// Create a new progress manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add one workout to the user's totals, creating the row if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails
    pub async fn record_workout(
        &self,
        user_id: Uuid,
        hours: f64,
        calories: f64,
        xp: i64,
        now: DateTime<Utc>,
    ) -> AppResult<UserProgress> {
        let row = sqlx::query(
            r"
            INSERT INTO user_progress (user_id, total_workouts, total_training_hours, calories_burned, xp, updated_at)
            VALUES ($1, 1, $2, $3, $4, $5)
            ON CONFLICT(user_id) DO UPDATE SET
                total_workouts = total_workouts + 1,
                total_training_hours = total_training_hours + excluded.total_training_hours,
                calories_burned = calories_burned + excluded.calories_burned,
                xp = xp + excluded.xp,
                updated_at = excluded.updated_at
            RETURNING *
            ",
        )
        .bind(user_id.to_string())
        .bind(hours)
        .bind(calories)
        .bind(xp)
        .bind(encode_timestamp(now))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record workout: {e}")))?;
        row_to_progress(&row)
    }

    /// The user's totals, if any workout has been logged
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<UserProgress>> {
        let row = sqlx::query("SELECT * FROM user_progress WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get progress: {e}")))?;
        row.as_ref().map(row_to_progress).transpose()
    }
}

fn row_to_progress(row: &SqliteRow) -> AppResult<UserProgress> {
    let user_id: String = row.get("user_id");
    let updated_at: String = row.get("updated_at");
    Ok(UserProgress {
        user_id: decode_uuid(&user_id, "user_progress.user_id")?,
        total_workouts: row.get("total_workouts"),
        total_training_hours: row.get("total_training_hours"),
        calories_burned: row.get("calories_burned"),
        xp: row.get("xp"),
        updated_at: decode_timestamp(&updated_at, "user_progress.updated_at")?,
    })
}
