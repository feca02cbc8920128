// ABOUTME: Main library entry point for the Phasewise training platform
// ABOUTME: Phase progression engine, subscription gating, billing, and the axum HTTP surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Phasewise Server
//!
//! Backend for a subscription-based training program delivered in numbered
//! phases. Each phase is a generated schedule of workout days. Phase 1 is
//! free; later phases need an active subscription whose plan allows them.
//!
//! ## Architecture
//!
//! - **`plan_source`**: client for the external workout plan generator
//! - **`database`**: `SQLite` managers for users, plans, subscriptions, missions,
//!   scheduled workout days, and progress
//! - **`services`**: the phase engine, subscription gate, billing, and progress
//! - **`routes`**: axum routers, one per domain
//! - **`config`** / **`logging`**: environment-driven configuration and tracing
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use phasewise_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Phasewise configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// JWT issuing and request authentication
pub mod auth;

/// Time source abstraction
pub mod clock;

/// Environment configuration
pub mod config;

/// Application constants
pub mod constants;

/// `SQLite` persistence
pub mod database;

/// Unified error handling (re-exported from `phasewise-core`)
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Domain models (re-exported from `phasewise-core`)
pub mod models;

/// External workout plan generator
pub mod plan_source;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Router assembly and HTTP serving
pub mod server;

/// Domain services
pub mod services;
