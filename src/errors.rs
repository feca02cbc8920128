// ABOUTME: Unified error handling re-exported from the phasewise-core crate
// ABOUTME: Keeps crate::errors paths stable for server code and integration tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use phasewise_core::errors::*;
