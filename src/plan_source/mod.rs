// ABOUTME: Plan source abstraction for the external workout plan generator
// ABOUTME: Defines the PlanSource trait, its error type, and day entry normalisation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Source
//!
//! A plan source turns a user's mission preferences into the day entries of
//! one phase. Entries are normalised before they reach the engine: at least
//! one entry, every `day >= 1`, no repeated days, sorted by day.

/// HTTP implementation backed by per-phase generator endpoints
pub mod http;

pub use http::HttpPlanSource;

use crate::constants::service_names;
use crate::errors::AppError;
use crate::models::{DayEntry, MissionPreferences, PhaseNumber};
use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

/// Failure to obtain a usable plan
#[derive(Debug, Error)]
pub enum PlanSourceError {
    /// No generator endpoint is configured for the phase
    #[error("no plan generator configured for phase {phase}")]
    NotConfigured {
        /// Phase that was requested
        phase: PhaseNumber,
    },

    /// Transport failure, timeout, or non-success status
    #[error("plan generator unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The generator answered with something that is not a usable plan
    #[error("malformed plan generator response: {0}")]
    MalformedResponse(String),
}

impl From<PlanSourceError> for AppError {
    fn from(error: PlanSourceError) -> Self {
        Self::external_service(service_names::PLAN_SOURCE, "Workout plan generation failed")
            .with_source(error)
    }
}

/// Generator of phase plans
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Produce the normalised day entries for `phase`
    async fn fetch_plan(
        &self,
        phase: PhaseNumber,
        preferences: &MissionPreferences,
    ) -> Result<Vec<DayEntry>, PlanSourceError>;
}

/// Validate and sort generated entries
///
/// # Errors
///
/// Returns `MalformedResponse` for an empty plan, a zero day, or a repeated day
pub fn normalize_day_entries(mut entries: Vec<DayEntry>) -> Result<Vec<DayEntry>, PlanSourceError> {
    if entries.is_empty() {
        return Err(PlanSourceError::MalformedResponse(
            "workout_plan is empty".to_owned(),
        ));
    }

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &entries {
        if entry.day == 0 {
            return Err(PlanSourceError::MalformedResponse(
                "day numbers start at 1".to_owned(),
            ));
        }
        if !seen.insert(entry.day) {
            return Err(PlanSourceError::MalformedResponse(format!(
                "day {} appears more than once",
                entry.day
            )));
        }
    }

    entries.sort_by_key(|entry| entry.day);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn entry(day: u32) -> DayEntry {
        DayEntry {
            day,
            name: Some(format!("Day {day}")),
            sets: None,
            reps: None,
            description: None,
            rest: None,
            motivational_quote: String::new(),
            is_workout_day: true,
            video_url: None,
        }
    }

    #[test]
    fn test_normalize_sorts_by_day() {
        let sorted = normalize_day_entries(vec![entry(3), entry(1), entry(2)]).unwrap();
        let days: Vec<u32> = sorted.iter().map(|e| e.day).collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn test_normalize_rejects_bad_plans() {
        assert!(matches!(
            normalize_day_entries(vec![]),
            Err(PlanSourceError::MalformedResponse(_))
        ));
        assert!(normalize_day_entries(vec![entry(0), entry(1)]).is_err());
        assert!(normalize_day_entries(vec![entry(1), entry(2), entry(1)]).is_err());
    }

    #[test]
    fn test_errors_map_to_external_service() {
        let error: AppError = PlanSourceError::UpstreamUnavailable("timeout".into()).into();
        assert_eq!(error.code, ErrorCode::ExternalServiceError);
        assert!(error.message.contains("Workout plan generation failed"));
    }
}
