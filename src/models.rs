// ABOUTME: Domain models re-exported from the phasewise-core crate
// ABOUTME: Users, plans, subscriptions, missions, workout days, and progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use phasewise_core::models::*;
