// ABOUTME: Configuration module organization
// ABOUTME: Environment-only configuration, loaded once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration management
//!
//! All settings come from environment variables (optionally seeded from a
//! `.env` file). There are no configuration files.

/// Environment-based server configuration
pub mod environment;

pub use environment::{
    AuthConfig, DatabaseConfig, DatabaseUrl, Environment, LogLevel, PhaseConfig, PlanSourceConfig,
    ServerConfig,
};
