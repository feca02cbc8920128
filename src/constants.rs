// ABOUTME: Server-side constants and environment variable defaults
// ABOUTME: Re-exports domain constants from phasewise-core alongside service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Domain constants live in `phasewise-core`; this module adds the values only
//! the server needs: service identifiers and configuration defaults.

pub use phasewise_core::constants::*;

/// Service names used in logs and error messages
pub mod service_names {
    /// This server
    pub const PHASEWISE_SERVER: &str = "phasewise_server";
    /// External plan generator, as named in upstream errors
    pub const PLAN_SOURCE: &str = "Plan source";
}

/// Defaults applied when an environment variable is unset
pub mod defaults {
    /// HTTP listen port
    pub const HTTP_PORT: u16 = 8081;
    /// Database location
    pub const DATABASE_URL: &str = "sqlite:./data/phasewise.db";
    /// Token lifetime
    pub const JWT_EXPIRY_HOURS: i64 = 24;
    /// Upstream plan generation timeout
    pub const PLAN_SOURCE_TIMEOUT_SECS: u64 = 60;
    /// Per-request timeout applied by the HTTP layer; longer than the upstream timeout
    pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 90;
    /// Allowed CORS origins
    pub const CORS_ORIGINS: &str = "*";
    /// Signing secret used outside production when `JWT_SECRET` is unset
    pub const DEVELOPMENT_JWT_SECRET: &str = "phasewise-development-secret-do-not-use-in-production";
}

/// Environment variable names
pub mod env_keys {
    pub const HTTP_PORT: &str = "HTTP_PORT";
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const JWT_SECRET: &str = "JWT_SECRET";
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    pub const PLAN_SOURCE_TIMEOUT_SECS: &str = "PLAN_SOURCE_TIMEOUT_SECS";
    pub const PHASE_2_EXTENSION_DAYS: &str = "PHASE_2_EXTENSION_DAYS";
    pub const PHASE_3_EXTENSION_DAYS: &str = "PHASE_3_EXTENSION_DAYS";
    pub const CORS_ORIGINS: &str = "CORS_ORIGINS";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";

    /// Per-phase generator URL variable, e.g. `PLAN_SOURCE_PHASE_2_URL`
    #[must_use]
    pub fn plan_source_url(phase: u8) -> String {
        format!("PLAN_SOURCE_PHASE_{phase}_URL")
    }
}
