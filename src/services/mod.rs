// ABOUTME: Domain service layer holding the business rules behind the HTTP routes
// ABOUTME: Phase progression, subscription gating, billing, and training progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Route handlers stay thin: they authenticate, parse the request, and call
//! one of these services, which own validation, ordering of checks, and
//! transactional writes.

/// Plans, pending subscriptions, and payment settlement
pub mod billing;

/// Phase generation, scheduling, and lazy progression
pub mod phase_engine;

/// Workout logging with calorie and XP accounting
pub mod progress;

/// Paid-phase entitlement and end-date extension
pub mod subscription_gate;

pub use billing::{BillingService, CreatePlanRequest, SubscriptionDetails};
pub use phase_engine::{AutoProgressOutcome, AutoProgressReport, PhaseEngine};
pub use progress::ProgressService;
pub use subscription_gate::{PhaseEligibility, SubscriptionGate};
