// ABOUTME: Mission preferences, generated day entries, and persisted workout plan days
// ABOUTME: DayEntry mirrors the plan generator payload; WorkoutPlanDay is the scheduled row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::PhaseNumber;
use crate::constants::limits::MAX_PREFERENCE_FIELD_LEN;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inputs sent to the plan generator
///
/// Field names match the generator's request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionPreferences {
    /// Training goal in the user's words
    pub mission: String,
    /// How much time the user can commit
    pub time_commitment: String,
    /// Available equipment
    pub gear: String,
    /// Training group size
    pub squad: String,
}

impl MissionPreferences {
    /// Trim every field and check it is present and within length limits
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` naming the first blank field, or
    /// `VALUE_OUT_OF_RANGE` for an overlong one
    pub fn validated(self) -> AppResult<Self> {
        Ok(Self {
            mission: check_field("mission", self.mission)?,
            time_commitment: check_field("time_commitment", self.time_commitment)?,
            gear: check_field("gear", self.gear)?,
            squad: check_field("squad", self.squad)?,
        })
    }
}

fn check_field(name: &str, value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(name));
    }
    if trimmed.chars().count() > MAX_PREFERENCE_FIELD_LEN {
        return Err(AppError::out_of_range(format!(
            "Field '{name}' must be at most {MAX_PREFERENCE_FIELD_LEN} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Stored snapshot of a user's preferences; the oldest one is canonical
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub preferences: MissionPreferences,
    pub created_at: DateTime<Utc>,
}

/// One day of a generated plan, as returned by the plan generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    /// Day index within the phase, starting at 1
    pub day: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sets: Option<i32>,
    #[serde(default)]
    pub reps: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rest: Option<String>,
    #[serde(default)]
    pub motivational_quote: String,
    #[serde(default)]
    pub is_workout_day: bool,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// A scheduled workout day belonging to one phase of one user
///
/// Unique per `(user_id, phase, day)`. Only `completed` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlanDay {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phase: PhaseNumber,
    pub day: u32,
    pub name: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<String>,
    pub description: Option<String>,
    pub rest: Option<String>,
    pub motivational_quote: String,
    pub is_workout_day: bool,
    pub video_url: Option<String>,
    /// Calendar day (UTC) the workout is scheduled for
    pub scheduled_date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl WorkoutPlanDay {
    /// Build a fresh, incomplete row from a generated entry
    #[must_use]
    pub fn scheduled(
        user_id: Uuid,
        phase: PhaseNumber,
        entry: DayEntry,
        scheduled_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            phase,
            day: entry.day,
            name: entry.name,
            sets: entry.sets,
            reps: entry.reps,
            description: entry.description,
            rest: entry.rest,
            motivational_quote: entry.motivational_quote,
            is_workout_day: entry.is_workout_day,
            video_url: entry.video_url,
            scheduled_date,
            completed: false,
            created_at,
        }
    }

    /// Whether the scheduled day has started
    #[must_use]
    pub fn has_elapsed(&self, today: NaiveDate) -> bool {
        self.scheduled_date <= today
    }
}
