// ABOUTME: Phase progression engine generating, scheduling, and advancing workout phases
// ABOUTME: Serialises mutations per user and writes each phase in a single transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Phase Progression Engine
//!
//! A user moves through up to three phases of generated workout days:
//!
//! ```text
//! NONE -> PHASE_1_ACTIVE -> PHASE_1_DONE -> PHASE_2_ACTIVE -> ... -> PHASE_3_DONE
//! ```
//!
//! Phase 1 is requested explicitly with the user's mission preferences. Later
//! phases reuse the first mission and need an active subscription whose plan
//! allows them. Progression is lazy: [`PhaseEngine::auto_progress_phases`]
//! runs when the user reads today's workout, marks elapsed days completed and
//! generates the next phase once the current one is finished.

use super::subscription_gate::{PhaseEligibility, SubscriptionGate};
use crate::clock::Clock;
use crate::database::{Database, MissionManager, WorkoutDayFilter, WorkoutDayManager};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Mission, MissionPreferences, PhaseNumber, PhaseState, WorkoutPlanDay};
use crate::plan_source::PlanSource;
use chrono::{Duration, NaiveDate};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What a lazy progression run did after marking elapsed days
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AutoProgressOutcome {
    /// Nothing to generate
    Idle,
    /// The last phase is complete
    Finished,
    /// The subscription does not cover the next phase
    NotPermitted { phase: PhaseNumber },
    /// The next phase cannot start yet
    Blocked { phase: PhaseNumber, reason: String },
    /// The next phase was generated
    Generated { phase: PhaseNumber, days: usize },
    /// The plan generator failed
    GenerationFailed { phase: PhaseNumber, reason: String },
    /// An unexpected failure was swallowed
    Errored { reason: String },
}

/// Result of [`PhaseEngine::auto_progress_phases`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoProgressReport {
    pub days_marked_completed: u64,
    pub outcome: AutoProgressOutcome,
}

/// First date of a new phase
///
/// The day after the latest scheduled day, or tomorrow for a user with no
/// rows. A phase requested late may start in the past; auto-progress marks
/// those days completed on the next read.
#[must_use]
pub fn phase_start_date(latest_scheduled: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    latest_scheduled.map_or(today + Duration::days(1), |latest| latest + Duration::days(1))
}

/// Per-user async mutexes
///
/// An entry lives only while some task holds or waits on it, so the map is
/// bounded by the number of users with a mutation in flight.
#[derive(Default)]
struct UserLocks {
    inner: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl UserLocks {
    async fn acquire(&self, user_id: Uuid) -> UserLockGuard<'_> {
        let lock = self.inner.entry(user_id).or_default().clone();
        UserLockGuard {
            locks: self,
            user_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

struct UserLockGuard<'a> {
    locks: &'a UserLocks,
    user_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        // Release first so the map holds the last reference when uncontended
        drop(self.guard.take());
        self.locks
            .inner
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Phase progression engine
pub struct PhaseEngine {
    database: Arc<Database>,
    gate: SubscriptionGate,
    plan_source: Arc<dyn PlanSource>,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
}

impl PhaseEngine {
    /// Create an engine
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        gate: SubscriptionGate,
        plan_source: Arc<dyn PlanSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            database,
            gate,
            plan_source,
            clock,
            locks: UserLocks::default(),
        }
    }

    /// The subscription gate used for paid phases
    #[must_use]
    pub const fn gate(&self) -> &SubscriptionGate {
        &self.gate
    }

    /// Generate and schedule `phase` for the user
    ///
    /// `preferences` are required for phase 1 and ignored afterwards, where the
    /// user's first mission is reused.
    ///
    /// # Errors
    ///
    /// - `RESOURCE_ALREADY_EXISTS` if the phase was already generated
    /// - `PRECONDITION_FAILED` if the previous phase is missing or unfinished,
    ///   or the subscription does not cover the phase
    /// - `RESOURCE_NOT_FOUND` if a later phase has no mission to reuse
    /// - `EXTERNAL_SERVICE_ERROR` if the plan generator fails; nothing is written
    pub async fn request_phase_advance(
        &self,
        user_id: Uuid,
        phase: PhaseNumber,
        preferences: Option<MissionPreferences>,
    ) -> AppResult<Vec<WorkoutPlanDay>> {
        let _guard = self.locks.acquire(user_id).await;
        self.generate_phase(user_id, phase, preferences).await
    }

    /// Generate the phase after the highest one the user has
    ///
    /// # Errors
    ///
    /// `PRECONDITION_FAILED` with "All phases completed" after the last phase,
    /// otherwise the same errors as [`Self::request_phase_advance`]
    pub async fn advance_to_next_phase(
        &self,
        user_id: Uuid,
        preferences: Option<MissionPreferences>,
    ) -> AppResult<Vec<WorkoutPlanDay>> {
        let _guard = self.locks.acquire(user_id).await;

        let highest = self
            .database
            .workout_days()
            .max_phase(&WorkoutDayFilter::for_user(user_id))
            .await?;
        let phase = match highest {
            None => PhaseNumber::FIRST,
            Some(current) => current
                .next()
                .ok_or_else(|| AppError::precondition("All phases completed"))?,
        };

        self.generate_phase(user_id, phase, preferences).await
    }

    /// Mark elapsed days completed and generate the next phase when due
    ///
    /// Never fails; every problem is reported in the outcome. Running it twice
    /// in a row leaves the same state as running it once.
    pub async fn auto_progress_phases(&self, user_id: Uuid) -> AutoProgressReport {
        let _guard = self.locks.acquire(user_id).await;

        let today = self.clock.today();
        let elapsed = WorkoutDayFilter::for_user(user_id).scheduled_on_or_before(today);
        let days_marked_completed = match self.database.workout_days().mark_completed(&elapsed).await {
            Ok(count) => count,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to mark elapsed workout days");
                return AutoProgressReport {
                    days_marked_completed: 0,
                    outcome: AutoProgressOutcome::Errored { reason: e.message },
                };
            }
        };

        let outcome = match self.next_automatic_phase(user_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Automatic phase progression failed");
                AutoProgressOutcome::Errored { reason: e.message }
            }
        };

        debug!(user_id = %user_id, days_marked_completed, outcome = ?outcome, "Auto-progress finished");
        AutoProgressReport {
            days_marked_completed,
            outcome,
        }
    }

    async fn next_automatic_phase(&self, user_id: Uuid) -> AppResult<AutoProgressOutcome> {
        let days = self.database.workout_days();
        let highest_completed = days
            .max_phase(&WorkoutDayFilter::for_user(user_id).completed(true))
            .await?;

        // Phase 1 needs preferences from the user
        let Some(highest_completed) = highest_completed else {
            return Ok(AutoProgressOutcome::Idle);
        };
        let Some(candidate) = highest_completed.next() else {
            return Ok(AutoProgressOutcome::Finished);
        };

        if !self.gate.is_eligible_for_phase(user_id, candidate).await? {
            return Ok(AutoProgressOutcome::NotPermitted { phase: candidate });
        }

        if days
            .exists(&WorkoutDayFilter::for_user(user_id).phase(candidate))
            .await?
        {
            return Ok(AutoProgressOutcome::Idle);
        }

        match self.generate_phase(user_id, candidate, None).await {
            Ok(rows) => Ok(AutoProgressOutcome::Generated {
                phase: candidate,
                days: rows.len(),
            }),
            Err(e) => match e.code {
                ErrorCode::ExternalServiceError => Ok(AutoProgressOutcome::GenerationFailed {
                    phase: candidate,
                    reason: e.message,
                }),
                ErrorCode::PreconditionFailed | ErrorCode::ResourceNotFound => {
                    Ok(AutoProgressOutcome::Blocked {
                        phase: candidate,
                        reason: e.message,
                    })
                }
                ErrorCode::ResourceAlreadyExists => Ok(AutoProgressOutcome::Idle),
                _ => Err(e),
            },
        }
    }

    /// Rows scheduled for today, in day order
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn get_today_workout(&self, user_id: Uuid) -> AppResult<Vec<WorkoutPlanDay>> {
        let today = self.clock.today();
        self.database
            .workout_days()
            .find_many(&WorkoutDayFilter::for_user(user_id).scheduled_on(today))
            .await
    }

    /// Current position in the phase state machine
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn phase_state(&self, user_id: Uuid) -> AppResult<PhaseState> {
        let days = self.database.workout_days();
        let Some(phase) = days.max_phase(&WorkoutDayFilter::for_user(user_id)).await? else {
            return Ok(PhaseState::None);
        };

        let today = self.clock.today();
        match days.phase_summary(user_id, phase).await? {
            Some(summary) if summary.is_finished(today) => Ok(PhaseState::Done(phase)),
            _ => Ok(PhaseState::Active(phase)),
        }
    }

    /// Mark one day of a phase completed
    ///
    /// Completing an already completed day returns it unchanged.
    ///
    /// # Errors
    ///
    /// `RESOURCE_NOT_FOUND` if the day does not exist, `PRECONDITION_FAILED`
    /// if it is scheduled after today
    pub async fn complete_day(
        &self,
        user_id: Uuid,
        phase: PhaseNumber,
        day: u32,
    ) -> AppResult<WorkoutPlanDay> {
        let _guard = self.locks.acquire(user_id).await;

        let filter = WorkoutDayFilter::for_user(user_id).phase(phase).day(day);
        let days = self.database.workout_days();
        let mut row = days
            .find_many(&filter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(format!("Day {day} of phase {phase}")))?;

        if row.completed {
            return Ok(row);
        }

        if !row.has_elapsed(self.clock.today()) {
            return Err(AppError::precondition(format!(
                "Day {day} of phase {phase} is scheduled for {}",
                row.scheduled_date
            )));
        }

        days.mark_completed(&filter).await?;
        row.completed = true;
        info!(user_id = %user_id, phase = %phase, day, "Workout day completed");
        Ok(row)
    }

    /// Generation path shared by every entry point; caller holds the user lock
    async fn generate_phase(
        &self,
        user_id: Uuid,
        phase: PhaseNumber,
        preferences: Option<MissionPreferences>,
    ) -> AppResult<Vec<WorkoutPlanDay>> {
        let days = self.database.workout_days();

        if days
            .exists(&WorkoutDayFilter::for_user(user_id).phase(phase))
            .await?
        {
            return Err(AppError::already_exists(format!(
                "Phase {phase} has already been generated"
            )));
        }

        let today = self.clock.today();
        if let Some(previous) = phase.previous() {
            let summary = days.phase_summary(user_id, previous).await?.ok_or_else(|| {
                AppError::precondition(format!("Phase {previous} has not been generated yet"))
            })?;
            if !summary.is_finished(today) {
                return Err(AppError::precondition(format!(
                    "You are still in Phase {previous}. Finish it before starting Phase {phase}"
                )));
            }
        }

        let subscription = if phase.requires_subscription() {
            match self.gate.eligibility(user_id, phase).await? {
                PhaseEligibility::Eligible { subscription, .. } => Some(subscription),
                PhaseEligibility::NoActiveSubscription => {
                    return Err(AppError::precondition("No active subscription"));
                }
                PhaseEligibility::PhaseNotPermitted { allowed_phases } => {
                    return Err(AppError::precondition(format!(
                        "Phase {phase} is not permitted by your plan (allows up to phase {allowed_phases})"
                    )));
                }
            }
        } else {
            None
        };

        let (preferences, new_mission) = if phase == PhaseNumber::FIRST {
            let preferences = preferences
                .ok_or_else(|| AppError::missing_field("mission"))?
                .validated()?;
            let mission = Mission {
                id: Uuid::new_v4(),
                user_id,
                preferences: preferences.clone(),
                created_at: self.clock.now(),
            };
            (preferences, Some(mission))
        } else {
            let mission = self
                .database
                .missions()
                .find_oldest(user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Mission"))?;
            (mission.preferences, None)
        };

        let start = phase_start_date(days.max_scheduled_date(user_id).await?, today);

        let entries = match self.plan_source.fetch_plan(phase, &preferences).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(user_id = %user_id, phase = %phase, error = %e, "Plan generation failed");
                return Err(e.into());
            }
        };

        let now = self.clock.now();
        let rows: Vec<WorkoutPlanDay> = entries
            .into_iter()
            .zip(start.iter_days())
            .map(|(entry, date)| WorkoutPlanDay::scheduled(user_id, phase, entry, date, now))
            .collect();

        let mut tx = self
            .database
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        if let Some(mission) = &new_mission {
            MissionManager::create(&mut tx, mission).await?;
        }
        WorkoutDayManager::insert_many(&mut tx, &rows).await?;
        if let Some(subscription) = &subscription {
            self.gate.extend_for_phase(&mut tx, subscription, phase).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit phase {phase}: {e}")))?;

        info!(
            user_id = %user_id,
            phase = %phase,
            days = rows.len(),
            start_date = %start,
            "Generated workout phase"
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_date_follows_latest_day() {
        let today = date(2025, 3, 1);
        assert_eq!(phase_start_date(None, today), date(2025, 3, 2));
        assert_eq!(
            phase_start_date(Some(date(2025, 3, 10)), today),
            date(2025, 3, 11)
        );
    }

    #[test]
    fn test_start_date_continues_after_elapsed_phase() {
        let today = date(2025, 3, 20);
        assert_eq!(
            phase_start_date(Some(date(2025, 3, 5)), today),
            date(2025, 3, 6)
        );
        assert_eq!(phase_start_date(Some(today), today), date(2025, 3, 21));
    }

    #[tokio::test]
    async fn test_user_locks_are_released_after_use() {
        let locks = &UserLocks::default();
        let user = Uuid::new_v4();

        let guard = locks.acquire(user).await;
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert_eq!(locks.len(), 0);

        // A waiter keeps the entry alive past the holder's release
        let first = locks.acquire(user).await;
        let (second, ()) = tokio::join!(locks.acquire(user), async move {
            tokio::task::yield_now().await;
            drop(first);
            assert_eq!(locks.len(), 1);
        });
        assert_eq!(locks.len(), 1);
        drop(second);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_outcome_serialization() {
        let report = AutoProgressReport {
            days_marked_completed: 2,
            outcome: AutoProgressOutcome::Generated {
                phase: PhaseNumber::LAST,
                days: 4,
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["outcome"]["status"], "generated");
        assert_eq!(value["outcome"]["phase"], 3);
    }
}
