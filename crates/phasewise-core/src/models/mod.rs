// ABOUTME: Domain model module organization and re-exports
// ABOUTME: Users, billing, phases, scheduled workout days, and training progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Core data models shared by the storage, service, and HTTP layers.

use thiserror::Error;

/// Subscription plans, subscriptions, and payment status
pub mod billing;
/// Phase numbers and the per-user phase state machine
pub mod phase;
/// Logged workouts and accumulated progress
pub mod progress;
/// Users and roles
pub mod user;
/// Missions, generated day entries, and scheduled workout days
pub mod workout;

pub use billing::{PaymentOutcome, PaymentStatus, Plan, Subscription};
pub use phase::{PhaseNumber, PhaseState};
pub use progress::{ExerciseType, UserProgress};
pub use user::{User, UserRole};
pub use workout::{DayEntry, Mission, MissionPreferences, WorkoutPlanDay};

/// Error returned when a stored or submitted value does not map to a domain type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}'")]
pub struct DomainParseError {
    /// Which domain type was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl DomainParseError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
