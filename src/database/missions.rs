// ABOUTME: Database operations for mission preference snapshots
// ABOUTME: The oldest mission per user is the canonical input for later phases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{Mission, MissionPreferences};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Mission database operations manager
pub struct MissionManager {
    pool: SqlitePool,
}

impl MissionManager {
    /// Create a new mission manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a mission inside an open transaction
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails
    pub async fn create(conn: &mut SqliteConnection, mission: &Mission) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO missions (id, user_id, mission, time_commitment, gear, squad, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(mission.id.to_string())
        .bind(mission.user_id.to_string())
        .bind(&mission.preferences.mission)
        .bind(&mission.preferences.time_commitment)
        .bind(&mission.preferences.gear)
        .bind(&mission.preferences.squad)
        .bind(encode_timestamp(mission.created_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to create mission: {e}")))?;
        Ok(())
    }

    /// The user's first recorded mission
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn find_oldest(&self, user_id: Uuid) -> AppResult<Option<Mission>> {
        self.find_one(user_id, "ASC").await
    }

    /// The user's most recent mission
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn find_latest(&self, user_id: Uuid) -> AppResult<Option<Mission>> {
        self.find_one(user_id, "DESC").await
    }

    /// Count the user's missions
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn count(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM missions WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count missions: {e}")))
    }

    async fn find_one(&self, user_id: Uuid, direction: &'static str) -> AppResult<Option<Mission>> {
        let sql = format!(
            "SELECT * FROM missions WHERE user_id = $1 ORDER BY created_at {direction}, rowid {direction} LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to find mission: {e}")))?;
        row.as_ref().map(row_to_mission).transpose()
    }
}

fn row_to_mission(row: &SqliteRow) -> AppResult<Mission> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    Ok(Mission {
        id: decode_uuid(&id, "missions.id")?,
        user_id: decode_uuid(&user_id, "missions.user_id")?,
        preferences: MissionPreferences {
            mission: row.get("mission"),
            time_commitment: row.get("time_commitment"),
            gear: row.get("gear"),
            squad: row.get("squad"),
        },
        created_at: decode_timestamp(&created_at, "missions.created_at")?,
    })
}
