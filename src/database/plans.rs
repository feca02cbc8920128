// ABOUTME: Database operations for subscription plans
// ABOUTME: Plan catalogue storage and the allowed-phases lookup used by the gate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::Plan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Validated input for a new plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlan {
    pub plan_name: String,
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    pub allowed_phases: u8,
    pub duration_days: Option<i64>,
    pub facilities: Vec<String>,
}

/// Plan database operations manager
pub struct PlanManager {
    pool: SqlitePool,
}

impl PlanManager {
    /// Create a new plan manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a plan
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the insert fails
    pub async fn create(&self, plan: NewPlan, now: DateTime<Utc>) -> AppResult<Plan> {
        let id = Uuid::new_v4();
        let facilities = serde_json::to_string(&plan.facilities)?;

        sqlx::query(
            r"
            INSERT INTO plans (id, plan_name, amount, currency, description, allowed_phases, duration_days, facilities, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, $9)
            ",
        )
        .bind(id.to_string())
        .bind(&plan.plan_name)
        .bind(plan.amount)
        .bind(&plan.currency)
        .bind(&plan.description)
        .bind(i64::from(plan.allowed_phases))
        .bind(plan.duration_days)
        .bind(&facilities)
        .bind(encode_timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create plan: {e}")))?;

        Ok(Plan {
            id,
            plan_name: plan.plan_name,
            amount: plan.amount,
            currency: plan.currency,
            description: plan.description,
            allowed_phases: plan.allowed_phases,
            duration_days: plan.duration_days,
            facilities: plan.facilities,
            active: true,
            created_at: now,
        })
    }

    /// Get a plan by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn get(&self, plan_id: Uuid) -> AppResult<Option<Plan>> {
        let row = sqlx::query("SELECT * FROM plans WHERE id = $1")
            .bind(plan_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get plan: {e}")))?;
        row.as_ref().map(row_to_plan).transpose()
    }

    /// List active plans, cheapest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt
    pub async fn list_active(&self) -> AppResult<Vec<Plan>> {
        let rows = sqlx::query("SELECT * FROM plans WHERE active = 1 ORDER BY amount, created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list plans: {e}")))?;
        rows.iter().map(row_to_plan).collect()
    }

    /// Highest phase the plan permits
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the plan does not exist
    pub async fn allowed_phases(&self, plan_id: Uuid) -> AppResult<u8> {
        let allowed: Option<i64> =
            sqlx::query_scalar("SELECT allowed_phases FROM plans WHERE id = $1")
                .bind(plan_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to get plan phases: {e}")))?;

        let allowed = allowed.ok_or_else(|| AppError::not_found(format!("Plan {plan_id}")))?;
        u8::try_from(allowed)
            .map_err(|_| AppError::database(format!("Invalid allowed_phases {allowed} on plan {plan_id}")))
    }
}

fn row_to_plan(row: &SqliteRow) -> AppResult<Plan> {
    let id: String = row.get("id");
    let allowed_phases: i64 = row.get("allowed_phases");
    let facilities: String = row.get("facilities");
    let created_at: String = row.get("created_at");
    Ok(Plan {
        id: decode_uuid(&id, "plans.id")?,
        plan_name: row.get("plan_name"),
        amount: row.get("amount"),
        currency: row.get("currency"),
        description: row.get("description"),
        allowed_phases: u8::try_from(allowed_phases)
            .map_err(|_| AppError::database(format!("Invalid allowed_phases {allowed_phases}")))?,
        duration_days: row.get("duration_days"),
        facilities: serde_json::from_str(&facilities)
            .map_err(|e| AppError::database(format!("Invalid facilities on plan {id}: {e}")))?,
        active: row.get("active"),
        created_at: decode_timestamp(&created_at, "plans.created_at")?,
    })
}
