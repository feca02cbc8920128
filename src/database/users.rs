// ABOUTME: Database operations for user accounts
// ABOUTME: Creation, lookup, body weight, and the subscription flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{decode_timestamp, decode_uuid, encode_timestamp, map_write_error};
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// User database operations manager
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if the email is taken, or a database error
    pub async fn create(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, full_name, role, weight_kg, is_subscribed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.weight_kg)
        .bind(user.is_subscribed)
        .bind(encode_timestamp(user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(&e, &format!("User with email {} already exists", user.email), "create user")
        })?;
        Ok(())
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Record the user's body weight
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the user does not exist
    pub async fn update_weight(&self, user_id: Uuid, weight_kg: f64) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET weight_kg = $1 WHERE id = $2")
            .bind(weight_kg)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update weight: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id}")));
        }
        Ok(())
    }

    /// Set the subscribed flag inside an open transaction
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn set_subscribed(
        conn: &mut SqliteConnection,
        user_id: Uuid,
        subscribed: bool,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_subscribed = $1 WHERE id = $2")
            .bind(subscribed)
            .bind(user_id.to_string())
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to update subscription flag: {e}")))?;
        Ok(())
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    let role: String = row.get("role");
    let created_at: String = row.get("created_at");
    Ok(User {
        id: decode_uuid(&id, "users.id")?,
        email: row.get("email"),
        full_name: row.get("full_name"),
        role: role
            .parse::<UserRole>()
            .map_err(|e| AppError::database(e.to_string()))?,
        weight_kg: row.get("weight_kg"),
        is_subscribed: row.get("is_subscribed"),
        created_at: decode_timestamp(&created_at, "users.created_at")?,
    })
}
