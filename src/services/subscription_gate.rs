// ABOUTME: Subscription gate deciding whether a user may enter a paid phase
// ABOUTME: Resolves the active subscription, its plan ceiling, and the end-date extension policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::clock::Clock;
use crate::config::PhaseConfig;
use crate::database::{Database, SubscriptionManager};
use crate::errors::AppResult;
use crate::models::{PhaseNumber, Subscription};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqliteConnection;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Gate decision for one user and phase
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseEligibility {
    /// An active subscription allows the phase
    Eligible {
        /// The subscription granting access
        subscription: Subscription,
        /// Ceiling from the subscription's plan
        allowed_phases: u8,
    },
    /// The user has no paid subscription covering now
    NoActiveSubscription,
    /// The active subscription's plan stops below the phase
    PhaseNotPermitted {
        /// Ceiling from the subscription's plan
        allowed_phases: u8,
    },
}

impl PhaseEligibility {
    /// Whether access is granted
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible { .. })
    }
}

/// New end date after entering a phase with a `window_days` extension
///
/// Measured from `now` and never shortening; an open-ended subscription stays open.
#[must_use]
pub fn extended_end_date(
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window_days: i64,
) -> Option<DateTime<Utc>> {
    current.map(|end| end.max(now + Duration::days(window_days)))
}

/// Subscription entitlement checks for paid phases
#[derive(Clone)]
pub struct SubscriptionGate {
    database: Arc<Database>,
    clock: Arc<dyn Clock>,
    phases: PhaseConfig,
}

impl SubscriptionGate {
    /// Create a gate over `database`
    #[must_use]
    pub fn new(database: Arc<Database>, clock: Arc<dyn Clock>, phases: PhaseConfig) -> Self {
        Self {
            database,
            clock,
            phases,
        }
    }

    /// Decide whether the user's subscription covers `phase`
    ///
    /// Uses the most recently created paid subscription whose window contains now.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the subscription's plan is missing, or a
    /// database error
    pub async fn eligibility(&self, user_id: Uuid, phase: PhaseNumber) -> AppResult<PhaseEligibility> {
        let now = self.clock.now();
        let Some(subscription) = self
            .database
            .subscriptions()
            .find_latest_active(user_id, now)
            .await?
        else {
            debug!(user_id = %user_id, phase = %phase, "No active subscription");
            return Ok(PhaseEligibility::NoActiveSubscription);
        };

        let allowed_phases = self
            .database
            .plans()
            .allowed_phases(subscription.plan_id)
            .await?;

        if phase.get() > allowed_phases {
            debug!(user_id = %user_id, phase = %phase, allowed_phases, "Phase above plan ceiling");
            return Ok(PhaseEligibility::PhaseNotPermitted { allowed_phases });
        }

        Ok(PhaseEligibility::Eligible {
            subscription,
            allowed_phases,
        })
    }

    /// Boolean form of [`Self::eligibility`]; free phases are always allowed
    ///
    /// # Errors
    ///
    /// Returns an error only when the lookup itself fails
    pub async fn is_eligible_for_phase(&self, user_id: Uuid, phase: PhaseNumber) -> AppResult<bool> {
        if !phase.requires_subscription() {
            return Ok(true);
        }
        Ok(self.eligibility(user_id, phase).await?.is_eligible())
    }

    /// Apply the entry extension for `phase` inside an open transaction
    ///
    /// Returns the resulting end date. Nothing is written when the date does
    /// not change.
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails
    pub async fn extend_for_phase(
        &self,
        conn: &mut SqliteConnection,
        subscription: &Subscription,
        phase: PhaseNumber,
    ) -> AppResult<Option<DateTime<Utc>>> {
        let Some(window_days) = self.phases.extension_days(phase) else {
            return Ok(subscription.end_date);
        };

        let now = self.clock.now();
        let new_end = extended_end_date(subscription.end_date, now, window_days);
        if let Some(end) = new_end {
            if subscription.end_date != Some(end) {
                SubscriptionManager::update_end_date(conn, subscription.id, end, now).await?;
                info!(
                    user_id = %subscription.user_id,
                    subscription_id = %subscription.id,
                    phase = %phase,
                    end_date = %end,
                    "Extended subscription for phase entry"
                );
            }
        }
        Ok(new_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extension_never_shortens() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let far = now + Duration::days(365);
        assert_eq!(extended_end_date(Some(far), now, 60), Some(far));

        let soon = now + Duration::days(5);
        assert_eq!(
            extended_end_date(Some(soon), now, 60),
            Some(now + Duration::days(60))
        );
    }

    #[test]
    fn test_extension_is_idempotent_and_keeps_open_end() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let once = extended_end_date(Some(now), now, 30);
        assert_eq!(extended_end_date(once, now, 30), once);
        assert_eq!(extended_end_date(None, now, 30), None);
    }
}
