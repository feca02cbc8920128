// ABOUTME: Application-wide constants for phases, subscriptions, and exercise energy costs
// ABOUTME: Shared by the server crate so every layer agrees on limits and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Phase progression limits
pub mod phases {
    /// Highest phase a user can reach; completing it is terminal
    pub const MAX_PHASE: u8 = 3;

    /// Subscription extension applied when a user enters phase 2
    pub const DEFAULT_PHASE_TWO_EXTENSION_DAYS: i64 = 60;

    /// Subscription extension applied when a user enters phase 3
    pub const DEFAULT_PHASE_THREE_EXTENSION_DAYS: i64 = 30;
}

/// Request validation limits
pub mod limits {
    /// Maximum length of each mission preference field
    pub const MAX_PREFERENCE_FIELD_LEN: usize = 500;

    /// Longest single logged workout, in minutes
    pub const MAX_WORKOUT_DURATION_MINUTES: f64 = 1440.0;

    /// Longest plan duration an admin can configure, in days
    pub const MAX_PLAN_DURATION_DAYS: i64 = 3650;
}

/// Metabolic equivalents used for calorie estimation
pub mod mets {
    pub const CHEST_WORKOUT: f64 = 6.0;
    pub const LEG_WORKOUT: f64 = 7.0;
    pub const CYCLING: f64 = 6.8;
    pub const YOGA: f64 = 3.0;
    pub const MEDITATION: f64 = 1.5;
    pub const HIIT: f64 = 9.0;
    pub const WALKING: f64 = 2.8;
    pub const JOGGING: f64 = 7.0;
    /// Used for exercise types without a dedicated value
    pub const DEFAULT: f64 = 5.0;

    /// Calories per experience point awarded for a logged workout
    pub const CALORIES_PER_XP: f64 = 10.0;
}

/// Default currency for plans created without one
pub const DEFAULT_CURRENCY: &str = "eur";

/// JWT audience for tokens issued by the platform
pub const JWT_AUDIENCE: &str = "phasewise";
