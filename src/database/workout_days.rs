// ABOUTME: Database operations for scheduled workout plan days
// ABOUTME: Filtered queries, bulk insertion, completion marking, and phase aggregates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{decode_date, decode_timestamp, decode_uuid, encode_date, encode_timestamp, map_write_error};
use crate::errors::{AppError, AppResult};
use crate::models::{PhaseNumber, WorkoutPlanDay};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Row selection for workout day queries
///
/// Every filter is scoped to one user; unset fields do not constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutDayFilter {
    pub user_id: Uuid,
    pub phase: Option<PhaseNumber>,
    pub day: Option<u32>,
    pub scheduled_on: Option<NaiveDate>,
    pub scheduled_on_or_before: Option<NaiveDate>,
    pub completed: Option<bool>,
}

impl WorkoutDayFilter {
    /// All rows of a user
    #[must_use]
    pub const fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            phase: None,
            day: None,
            scheduled_on: None,
            scheduled_on_or_before: None,
            completed: None,
        }
    }

    #[must_use]
    pub const fn phase(mut self, phase: PhaseNumber) -> Self {
        self.phase = Some(phase);
        self
    }

    #[must_use]
    pub const fn day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    #[must_use]
    pub const fn scheduled_on(mut self, date: NaiveDate) -> Self {
        self.scheduled_on = Some(date);
        self
    }

    #[must_use]
    pub const fn scheduled_on_or_before(mut self, date: NaiveDate) -> Self {
        self.scheduled_on_or_before = Some(date);
        self
    }

    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(" WHERE user_id = ");
        builder.push_bind(self.user_id.to_string());
        if let Some(phase) = self.phase {
            builder.push(" AND phase = ");
            builder.push_bind(i64::from(phase.get()));
        }
        if let Some(day) = self.day {
            builder.push(" AND day = ");
            builder.push_bind(i64::from(day));
        }
        if let Some(date) = self.scheduled_on {
            builder.push(" AND scheduled_date = ");
            builder.push_bind(encode_date(date));
        }
        if let Some(date) = self.scheduled_on_or_before {
            builder.push(" AND scheduled_date <= ");
            builder.push_bind(encode_date(date));
        }
        if let Some(completed) = self.completed {
            builder.push(" AND completed = ");
            builder.push_bind(completed);
        }
    }
}

/// Aggregate view of one phase for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSummary {
    pub total_days: i64,
    pub completed_days: i64,
    pub last_scheduled_date: NaiveDate,
}

impl PhaseSummary {
    /// Every day completed, or the last day has started
    #[must_use]
    pub fn is_finished(&self, today: NaiveDate) -> bool {
        self.completed_days >= self.total_days || self.last_scheduled_date <= today
    }
}

/// Workout day database operations manager
pub struct WorkoutDayManager {
    pool: SqlitePool,
}

impl WorkoutDayManager {
    /// Create a new workout day manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a batch of rows inside an open transaction
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if any `(user, phase, day)` is taken;
    /// the caller's transaction must then be rolled back as a unit
    pub async fn insert_many(conn: &mut SqliteConnection, days: &[WorkoutPlanDay]) -> AppResult<()> {
        for day in days {
            sqlx::query(
                r"
                INSERT INTO workout_plan_days
                    (id, user_id, phase, day, name, sets, reps, description, rest,
                     motivational_quote, is_workout_day, video_url, scheduled_date, completed, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                ",
            )
            .bind(day.id.to_string())
            .bind(day.user_id.to_string())
            .bind(i64::from(day.phase.get()))
            .bind(i64::from(day.day))
            .bind(&day.name)
            .bind(day.sets)
            .bind(&day.reps)
            .bind(&day.description)
            .bind(&day.rest)
            .bind(&day.motivational_quote)
            .bind(day.is_workout_day)
            .bind(&day.video_url)
            .bind(encode_date(day.scheduled_date))
            .bind(day.completed)
            .bind(encode_timestamp(day.created_at))
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                map_write_error(
                    &e,
                    &format!("Phase {} has already been generated", day.phase),
                    "insert workout day",
                )
            })?;
        }
        Ok(())
    }

    /// Rows matching `filter`, ordered by phase then day
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn find_many(
        &self,
        filter: &WorkoutDayFilter,
    ) -> AppResult<Vec<WorkoutPlanDay>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM workout_plan_days");
        filter.push_where(&mut builder);
        builder.push(" ORDER BY phase, day");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to query workout days: {e}")))?;
        rows.iter().map(row_to_day).collect()
    }

    /// Whether any row matches `filter`
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn exists(&self, filter: &WorkoutDayFilter) -> AppResult<bool> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT EXISTS(SELECT 1 FROM workout_plan_days");
        filter.push_where(&mut builder);
        builder.push(")");

        builder
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to query workout days: {e}")))
    }

    /// Mark every matching incomplete row as completed
    ///
    /// Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn mark_completed(&self, filter: &WorkoutDayFilter) -> AppResult<u64> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("UPDATE workout_plan_days SET completed = 1");
        filter.push_where(&mut builder);
        builder.push(" AND completed = 0");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to complete workout days: {e}")))?;
        Ok(result.rows_affected())
    }

    /// Highest phase among matching rows
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored phase is out of range
    pub async fn max_phase(&self, filter: &WorkoutDayFilter) -> AppResult<Option<PhaseNumber>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT MAX(phase) FROM workout_plan_days");
        filter.push_where(&mut builder);

        let max: Option<i64> = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to query highest phase: {e}")))?;

        max.map(|phase| PhaseNumber::new(phase).map_err(|e| AppError::database(e.to_string())))
            .transpose()
    }

    /// Latest scheduled date across all of the user's rows
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored date is corrupt
    pub async fn max_scheduled_date(&self, user_id: Uuid) -> AppResult<Option<NaiveDate>> {
        let max: Option<String> =
            sqlx::query_scalar("SELECT MAX(scheduled_date) FROM workout_plan_days WHERE user_id = $1")
                .bind(user_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to query latest date: {e}")))?;

        max.as_deref()
            .map(|value| decode_date(value, "workout_plan_days.scheduled_date"))
            .transpose()
    }

    /// Day counts and last date for one phase, or `None` if it has no rows
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored date is corrupt
    pub async fn phase_summary(
        &self,
        user_id: Uuid,
        phase: PhaseNumber,
    ) -> AppResult<Option<PhaseSummary>> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS total_days,
                   COALESCE(SUM(completed), 0) AS completed_days,
                   MAX(scheduled_date) AS last_scheduled_date
            FROM workout_plan_days
            WHERE user_id = $1 AND phase = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(phase.get()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to summarize phase: {e}")))?;

        let last: Option<String> = row.get("last_scheduled_date");
        let Some(last) = last else {
            return Ok(None);
        };
        Ok(Some(PhaseSummary {
            total_days: row.get("total_days"),
            completed_days: row.get("completed_days"),
            last_scheduled_date: decode_date(&last, "workout_plan_days.scheduled_date")?,
        }))
    }
}

fn row_to_day(row: &SqliteRow) -> AppResult<WorkoutPlanDay> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let phase: i64 = row.get("phase");
    let day: i64 = row.get("day");
    let scheduled_date: String = row.get("scheduled_date");
    let created_at: String = row.get("created_at");

    Ok(WorkoutPlanDay {
        id: decode_uuid(&id, "workout_plan_days.id")?,
        user_id: decode_uuid(&user_id, "workout_plan_days.user_id")?,
        phase: PhaseNumber::new(phase).map_err(|e| AppError::database(e.to_string()))?,
        day: u32::try_from(day)
            .map_err(|_| AppError::database(format!("Invalid day {day} in workout_plan_days")))?,
        name: row.get("name"),
        sets: row.get("sets"),
        reps: row.get("reps"),
        description: row.get("description"),
        rest: row.get("rest"),
        motivational_quote: row.get("motivational_quote"),
        is_workout_day: row.get("is_workout_day"),
        video_url: row.get("video_url"),
        scheduled_date: decode_date(&scheduled_date, "workout_plan_days.scheduled_date")?,
        completed: row.get("completed"),
        created_at: decode_timestamp(&created_at, "workout_plan_days.created_at")?,
    })
}
