// ABOUTME: SQLite database setup, schema migrations, and manager accessors
// ABOUTME: Owns the connection pool; per-table managers implement the queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! One `SQLite` database holds users, plans, subscriptions, missions, scheduled
//! workout days, and progress. Timestamps are stored as fixed-width RFC 3339
//! UTC strings and calendar dates as `YYYY-MM-DD`, so text ordering matches
//! time ordering.

mod missions;
mod plans;
mod progress;
mod subscriptions;
mod users;
mod workout_days;

pub use missions::MissionManager;
pub use plans::{NewPlan, PlanManager};
pub use progress::ProgressManager;
pub use subscriptions::SubscriptionManager;
pub use users::UserManager;
pub use workout_days::{PhaseSummary, WorkoutDayFilter, WorkoutDayManager};

use crate::errors::{AppError, AppResult};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

/// Database handle shared by all managers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// In-memory databases use a single connection, since every `SQLite`
    /// memory connection is a separate database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL '{database_url}'"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if database_url.contains(":memory:") {
            // Dropping the only connection would drop the database with it
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check that the database answers queries
    ///
    /// # Errors
    ///
    /// Returns an error if the ping query fails
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// User account queries
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Plan queries
    #[must_use]
    pub fn plans(&self) -> PlanManager {
        PlanManager::new(self.pool.clone())
    }

    /// Subscription queries
    #[must_use]
    pub fn subscriptions(&self) -> SubscriptionManager {
        SubscriptionManager::new(self.pool.clone())
    }

    /// Mission queries
    #[must_use]
    pub fn missions(&self) -> MissionManager {
        MissionManager::new(self.pool.clone())
    }

    /// Scheduled workout day queries
    #[must_use]
    pub fn workout_days(&self) -> WorkoutDayManager {
        WorkoutDayManager::new(self.pool.clone())
    }

    /// Progress queries
    #[must_use]
    pub fn progress(&self) -> ProgressManager {
        ProgressManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_billing().await?;
        self.migrate_phases().await?;
        self.migrate_progress().await?;
        Ok(())
    }

    async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                full_name TEXT,
                role TEXT NOT NULL DEFAULT 'USER' CHECK (role IN ('USER', 'ADMIN', 'SUPER_ADMIN')),
                weight_kg REAL,
                is_subscribed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create users table")?;
        Ok(())
    }

    async fn migrate_billing(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS plans (
                id TEXT PRIMARY KEY,
                plan_name TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                currency TEXT NOT NULL DEFAULT 'eur',
                description TEXT,
                allowed_phases INTEGER NOT NULL CHECK (allowed_phases BETWEEN 0 AND 3),
                duration_days INTEGER CHECK (duration_days IS NULL OR duration_days >= 1),
                facilities TEXT NOT NULL DEFAULT '[]',
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create plans table")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS subscriptions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                plan_id TEXT NOT NULL REFERENCES plans(id),
                payment_reference TEXT NOT NULL UNIQUE,
                amount REAL NOT NULL,
                payment_status TEXT NOT NULL CHECK (payment_status IN ('PENDING', 'COMPLETED', 'CANCELED')),
                start_date TEXT NOT NULL,
                end_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create subscriptions table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_subscriptions_user_status ON subscriptions(user_id, payment_status)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn migrate_phases(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS missions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                mission TEXT NOT NULL,
                time_commitment TEXT NOT NULL,
                gear TEXT NOT NULL,
                squad TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create missions table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_missions_user_created ON missions(user_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_plan_days (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                phase INTEGER NOT NULL CHECK (phase BETWEEN 1 AND 3),
                day INTEGER NOT NULL CHECK (day >= 1),
                name TEXT,
                sets INTEGER,
                reps TEXT,
                description TEXT,
                rest TEXT,
                motivational_quote TEXT NOT NULL DEFAULT '',
                is_workout_day INTEGER NOT NULL DEFAULT 0,
                video_url TEXT,
                scheduled_date TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, phase, day)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create workout_plan_days table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workout_days_user_date ON workout_plan_days(user_id, scheduled_date)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn migrate_progress(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_progress (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                total_workouts INTEGER NOT NULL DEFAULT 0,
                total_training_hours REAL NOT NULL DEFAULT 0,
                calories_burned REAL NOT NULL DEFAULT 0,
                xp INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_progress table")?;
        Ok(())
    }
}

// ============================================================================
// Column encoding shared by the managers
// ============================================================================

pub(crate) fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(value: &str, column: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp in {column}: {e}")))
}

pub(crate) fn encode_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub(crate) fn decode_date(value: &str, column: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::database(format!("Invalid date in {column}: {e}")))
}

pub(crate) fn decode_uuid(value: &str, column: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::database(format!("Invalid UUID in {column}: {e}")))
}

/// Map a write error, turning unique violations into `RESOURCE_ALREADY_EXISTS`
pub(crate) fn map_write_error(error: &sqlx::Error, conflict: &str, action: &str) -> AppError {
    match error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::already_exists(conflict.to_owned())
        }
        other => AppError::database(format!("Failed to {action}: {other}")),
    }
}
