// ABOUTME: Plan catalogue and subscription lifecycle service
// ABOUTME: Validates plans, opens pending subscriptions, and settles payment outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::clock::Clock;
use crate::constants::limits::MAX_PLAN_DURATION_DAYS;
use crate::constants::phases::MAX_PHASE;
use crate::constants::DEFAULT_CURRENCY;
use crate::database::{Database, NewPlan, SubscriptionManager, UserManager};
use crate::errors::{AppError, AppResult};
use crate::models::{PaymentOutcome, PaymentStatus, Plan, Subscription};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Plan creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanRequest {
    pub plan_name: Option<String>,
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub allowed_phases: Option<i64>,
    #[serde(default)]
    pub duration_days: Option<i64>,
    #[serde(default)]
    pub facilities: Vec<String>,
}

impl CreatePlanRequest {
    fn validated(self) -> AppResult<NewPlan> {
        let plan_name = self
            .plan_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::missing_field("plan_name"))?;

        let amount = self.amount.ok_or_else(|| AppError::missing_field("amount"))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::out_of_range("amount must be zero or more"));
        }

        let allowed_phases = self
            .allowed_phases
            .ok_or_else(|| AppError::missing_field("allowed_phases"))?;
        let allowed_phases = u8::try_from(allowed_phases)
            .ok()
            .filter(|phases| *phases <= MAX_PHASE)
            .ok_or_else(|| {
                AppError::out_of_range(format!("allowed_phases must be between 0 and {MAX_PHASE}"))
            })?;

        if let Some(days) = self.duration_days {
            if !(1..=MAX_PLAN_DURATION_DAYS).contains(&days) {
                return Err(AppError::out_of_range(format!(
                    "duration_days must be between 1 and {MAX_PLAN_DURATION_DAYS}"
                )));
            }
        }

        let currency = self
            .currency
            .map(|currency| currency.trim().to_lowercase())
            .filter(|currency| !currency.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());

        Ok(NewPlan {
            plan_name,
            amount,
            currency,
            description: self.description,
            allowed_phases,
            duration_days: self.duration_days,
            facilities: self.facilities,
        })
    }
}

/// A subscription together with the plan it pays for
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionDetails {
    pub subscription: Subscription,
    pub plan: Plan,
}

/// Plans and subscriptions
#[derive(Clone)]
pub struct BillingService {
    database: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl BillingService {
    /// Create a billing service
    #[must_use]
    pub fn new(database: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { database, clock }
    }

    /// Add a plan to the catalogue
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or a database error
    pub async fn create_plan(&self, request: CreatePlanRequest) -> AppResult<Plan> {
        let new_plan = request.validated()?;
        let plan = self.database.plans().create(new_plan, self.clock.now()).await?;
        info!(plan_id = %plan.id, plan_name = %plan.plan_name, allowed_phases = plan.allowed_phases, "Created plan");
        Ok(plan)
    }

    /// Active plans, cheapest first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list_plans(&self) -> AppResult<Vec<Plan>> {
        self.database.plans().list_active().await
    }

    /// One plan
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown plan
    pub async fn get_plan(&self, plan_id: Uuid) -> AppResult<Plan> {
        self.database
            .plans()
            .get(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan {plan_id}")))
    }

    /// Open a pending subscription for `plan_id`
    ///
    /// A pending subscription the user already has is moved to the new plan
    /// instead of creating a second one.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown or inactive plan
    pub async fn create_subscription(&self, user_id: Uuid, plan_id: Uuid) -> AppResult<Subscription> {
        let plan = self.get_plan(plan_id).await?;
        if !plan.active {
            return Err(AppError::not_found(format!("Plan {plan_id}")));
        }

        let subscriptions = self.database.subscriptions();
        let now = self.clock.now();

        if let Some(pending) = subscriptions
            .find_latest_with_status(user_id, PaymentStatus::Pending)
            .await?
        {
            subscriptions
                .repoint_pending(pending.id, plan.id, plan.amount, now)
                .await?;
            info!(user_id = %user_id, subscription_id = %pending.id, plan_id = %plan.id, "Moved pending subscription to new plan");
            return subscriptions
                .get(pending.id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Subscription {}", pending.id)));
        }

        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan.id,
            payment_reference: format!("pay_{}", Uuid::new_v4().simple()),
            amount: plan.amount,
            payment_status: PaymentStatus::Pending,
            start_date: now,
            end_date: None,
            created_at: now,
            updated_at: now,
        };
        subscriptions.create(&subscription).await?;
        info!(user_id = %user_id, subscription_id = %subscription.id, plan_id = %plan.id, "Created pending subscription");
        Ok(subscription)
    }

    /// Settle a pending subscription from a payment provider event
    ///
    /// # Errors
    ///
    /// - `RESOURCE_NOT_FOUND` for an unknown reference
    /// - `PRECONDITION_FAILED` if the subscription is no longer pending
    pub async fn record_payment_outcome(
        &self,
        payment_reference: &str,
        outcome: PaymentOutcome,
    ) -> AppResult<Subscription> {
        let subscriptions = self.database.subscriptions();
        let subscription = subscriptions
            .find_by_reference(payment_reference)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Payment {payment_reference}")))?;

        if subscription.payment_status != PaymentStatus::Pending {
            return Err(AppError::precondition(format!(
                "Subscription is already {}",
                subscription.payment_status
            )));
        }

        let now = self.clock.now();
        let (status, start_date, end_date) = match outcome {
            PaymentOutcome::Succeeded => {
                let plan = self.get_plan(subscription.plan_id).await?;
                let end_date = plan.duration_days.map(|days| now + Duration::days(days));
                (PaymentStatus::Completed, now, end_date)
            }
            PaymentOutcome::Failed => (PaymentStatus::Canceled, subscription.start_date, Some(now)),
        };

        let mut tx = self
            .database
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let settled =
            SubscriptionManager::settle(&mut tx, subscription.id, status, start_date, end_date, now)
                .await?;
        if !settled {
            return Err(AppError::precondition("Subscription is no longer pending"));
        }
        if status == PaymentStatus::Completed {
            UserManager::set_subscribed(&mut tx, subscription.user_id, true).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit payment outcome: {e}")))?;

        info!(
            user_id = %subscription.user_id,
            subscription_id = %subscription.id,
            status = %status,
            "Recorded payment outcome"
        );

        Ok(Subscription {
            payment_status: status,
            start_date,
            end_date,
            updated_at: now,
            ..subscription
        })
    }

    /// The user's latest subscription with its plan
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the user never subscribed
    pub async fn my_subscription(&self, user_id: Uuid) -> AppResult<SubscriptionDetails> {
        let subscription = self
            .database
            .subscriptions()
            .find_latest(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Subscription"))?;
        let plan = self.get_plan(subscription.plan_id).await?;
        Ok(SubscriptionDetails { subscription, plan })
    }
}
