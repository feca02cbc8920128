// ABOUTME: Database operations for user subscriptions
// ABOUTME: Pending creation, payment transitions, active lookup, and end-date extension
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{decode_timestamp, decode_uuid, encode_timestamp, map_write_error};
use crate::errors::{AppError, AppResult};
use crate::models::{PaymentStatus, Subscription};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Subscription database operations manager
pub struct SubscriptionManager {
    pool: SqlitePool,
}

impl SubscriptionManager {
    /// Create a new subscription manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a subscription row
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a duplicate payment reference
    pub async fn create(&self, subscription: &Subscription) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO subscriptions (id, user_id, plan_id, payment_reference, amount, payment_status, start_date, end_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(subscription.id.to_string())
        .bind(subscription.user_id.to_string())
        .bind(subscription.plan_id.to_string())
        .bind(&subscription.payment_reference)
        .bind(subscription.amount)
        .bind(subscription.payment_status.as_str())
        .bind(encode_timestamp(subscription.start_date))
        .bind(subscription.end_date.map(encode_timestamp))
        .bind(encode_timestamp(subscription.created_at))
        .bind(encode_timestamp(subscription.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(&e, "Payment reference already in use", "create subscription"))?;
        Ok(())
    }

    /// Most recent subscription of the user in `status`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn find_latest_with_status(
        &self,
        user_id: Uuid,
        status: PaymentStatus,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(
            r"
            SELECT * FROM subscriptions
            WHERE user_id = $1 AND payment_status = $2
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find subscription: {e}")))?;
        row.as_ref().map(row_to_subscription).transpose()
    }

    /// Most recent subscription of the user regardless of status
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn find_latest(&self, user_id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(
            "SELECT * FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find subscription: {e}")))?;
        row.as_ref().map(row_to_subscription).transpose()
    }

    /// Most recent paid subscription whose window contains `now`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn find_latest_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Subscription>> {
        let now = encode_timestamp(now);
        let row = sqlx::query(
            r"
            SELECT * FROM subscriptions
            WHERE user_id = $1
              AND payment_status = 'COMPLETED'
              AND start_date <= $2
              AND (end_date IS NULL OR end_date >= $2)
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(&now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find active subscription: {e}")))?;
        row.as_ref().map(row_to_subscription).transpose()
    }

    /// Look up a subscription by its payment reference
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn find_by_reference(&self, payment_reference: &str) -> AppResult<Option<Subscription>> {
        let row = sqlx::query("SELECT * FROM subscriptions WHERE payment_reference = $1")
            .bind(payment_reference)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to find subscription: {e}")))?;
        row.as_ref().map(row_to_subscription).transpose()
    }

    /// Point a pending subscription at a different plan
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn repoint_pending(
        &self,
        subscription_id: Uuid,
        plan_id: Uuid,
        amount: f64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE subscriptions
            SET plan_id = $1, amount = $2, start_date = $3, updated_at = $3
            WHERE id = $4 AND payment_status = 'PENDING'
            ",
        )
        .bind(plan_id.to_string())
        .bind(amount)
        .bind(encode_timestamp(now))
        .bind(subscription_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update pending subscription: {e}")))?;
        Ok(())
    }

    /// Move a pending subscription to its final payment state
    ///
    /// Only rows still `PENDING` are touched; returns whether one was.
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn settle(
        conn: &mut SqliteConnection,
        subscription_id: Uuid,
        status: PaymentStatus,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE subscriptions
            SET payment_status = $1, start_date = $2, end_date = $3, updated_at = $4
            WHERE id = $5 AND payment_status = 'PENDING'
            ",
        )
        .bind(status.as_str())
        .bind(encode_timestamp(start_date))
        .bind(end_date.map(encode_timestamp))
        .bind(encode_timestamp(now))
        .bind(subscription_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to settle subscription: {e}")))?;
        Ok(result.rows_affected() == 1)
    }

    /// Replace a subscription's end date inside an open transaction
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn update_end_date(
        conn: &mut SqliteConnection,
        subscription_id: Uuid,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE subscriptions SET end_date = $1, updated_at = $2 WHERE id = $3")
            .bind(encode_timestamp(end_date))
            .bind(encode_timestamp(now))
            .bind(subscription_id.to_string())
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to extend subscription: {e}")))?;
        Ok(())
    }

    /// Get a subscription by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn get(&self, subscription_id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query("SELECT * FROM subscriptions WHERE id = $1")
            .bind(subscription_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get subscription: {e}")))?;
        row.as_ref().map(row_to_subscription).transpose()
    }
}

fn row_to_subscription(row: &SqliteRow) -> AppResult<Subscription> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let plan_id: String = row.get("plan_id");
    let status: String = row.get("payment_status");
    let start_date: String = row.get("start_date");
    let end_date: Option<String> = row.get("end_date");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Subscription {
        id: decode_uuid(&id, "subscriptions.id")?,
        user_id: decode_uuid(&user_id, "subscriptions.user_id")?,
        plan_id: decode_uuid(&plan_id, "subscriptions.plan_id")?,
        payment_reference: row.get("payment_reference"),
        amount: row.get("amount"),
        payment_status: status
            .parse::<PaymentStatus>()
            .map_err(|e| AppError::database(e.to_string()))?,
        start_date: decode_timestamp(&start_date, "subscriptions.start_date")?,
        end_date: end_date
            .as_deref()
            .map(|value| decode_timestamp(value, "subscriptions.end_date"))
            .transpose()?,
        created_at: decode_timestamp(&created_at, "subscriptions.created_at")?,
        updated_at: decode_timestamp(&updated_at, "subscriptions.updated_at")?,
    })
}
