// ABOUTME: Exercise types with their MET values and accumulated user progress
// ABOUTME: Calories follow MET * kg * minutes / 60; one XP per ten calories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::DomainParseError;
use crate::constants::mets;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Kinds of workout a user can log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExerciseType {
    ChestWorkout,
    LegWorkout,
    BackWorkout,
    ShoulderWorkout,
    Cycling,
    Yoga,
    Meditation,
    Hiit,
    Walking,
    Jogging,
}

impl ExerciseType {
    /// Metabolic equivalent for this activity
    #[must_use]
    pub const fn met(self) -> f64 {
        match self {
            Self::ChestWorkout => mets::CHEST_WORKOUT,
            Self::LegWorkout => mets::LEG_WORKOUT,
            Self::Cycling => mets::CYCLING,
            Self::Yoga => mets::YOGA,
            Self::Meditation => mets::MEDITATION,
            Self::Hiit => mets::HIIT,
            Self::Walking => mets::WALKING,
            Self::Jogging => mets::JOGGING,
            Self::BackWorkout | Self::ShoulderWorkout => mets::DEFAULT,
        }
    }

    /// Estimated calories burned for a session
    #[must_use]
    pub fn calories(self, weight_kg: f64, duration_minutes: f64) -> f64 {
        self.met() * weight_kg * duration_minutes / 60.0
    }
}

impl FromStr for ExerciseType {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_owned()))
            .map_err(|_| DomainParseError::new("exercise type", s))
    }
}

/// Experience points awarded for a session's calories
#[must_use]
pub fn xp_for_calories(calories: f64) -> i64 {
    // Calories are bounded by the duration limit, so the cast cannot overflow
    #[allow(clippy::cast_possible_truncation)]
    let xp = (calories / mets::CALORIES_PER_XP).floor() as i64;
    xp.max(0)
}

/// Running totals across all logged workouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: Uuid,
    pub total_workouts: i64,
    pub total_training_hours: f64,
    pub calories_burned: f64,
    pub xp: i64,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_names_are_camel_case() {
        assert_eq!("chestWorkout".parse::<ExerciseType>().unwrap(), ExerciseType::ChestWorkout);
        assert_eq!("hiit".parse::<ExerciseType>().unwrap(), ExerciseType::Hiit);
        assert!("swimming".parse::<ExerciseType>().is_err());
    }

    #[test]
    fn test_calories_and_xp() {
        // 7.0 MET * 80kg * 30min / 60 = 280
        let calories = ExerciseType::Jogging.calories(80.0, 30.0);
        assert!((calories - 280.0).abs() < f64::EPSILON);
        assert_eq!(xp_for_calories(calories), 28);
        assert_eq!(xp_for_calories(9.99), 0);
    }

    #[test]
    fn test_unlisted_types_use_default_met() {
        assert!((ExerciseType::BackWorkout.met() - mets::DEFAULT).abs() < f64::EPSILON);
    }
}
