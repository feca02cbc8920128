// ABOUTME: Core types and constants for the Phasewise training platform
// ABOUTME: Foundation crate with error handling, domain models, and phase constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Phasewise Core
//!
//! Foundation crate providing shared types for the Phasewise platform. It is
//! designed to change infrequently so the server crate compiles incrementally.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Phase limits, subscription windows, and exercise MET values
//! - **models**: Users, plans, subscriptions, missions, and scheduled workout days

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (users, phases, workout days, subscriptions)
pub mod models;
