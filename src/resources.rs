// ABOUTME: Centralized resource container shared by every route handler
// ABOUTME: Builds the auth manager and domain services once over one database and clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Expensive shared state is built once at startup and handed to the router
//! as `Arc<ServerResources>`.

use crate::auth::AuthManager;
use crate::clock::Clock;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::plan_source::PlanSource;
use crate::services::{BillingService, PhaseEngine, ProgressService, SubscriptionGate};
use std::sync::Arc;

/// Shared server resources
#[derive(Clone)]
pub struct ServerResources {
    pub config: Arc<ServerConfig>,
    pub database: Arc<Database>,
    pub auth_manager: Arc<AuthManager>,
    pub phase_engine: Arc<PhaseEngine>,
    pub billing: Arc<BillingService>,
    pub progress: Arc<ProgressService>,
    pub clock: Arc<dyn Clock>,
}

impl ServerResources {
    /// Wire services over a migrated database
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        database: Database,
        plan_source: Arc<dyn PlanSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.jwt_expiry_hours,
        ));

        let gate = SubscriptionGate::new(database.clone(), clock.clone(), config.phases);
        let phase_engine = Arc::new(PhaseEngine::new(
            database.clone(),
            gate,
            plan_source,
            clock.clone(),
        ));
        let billing = Arc::new(BillingService::new(database.clone(), clock.clone()));
        let progress = Arc::new(ProgressService::new(database.clone(), clock.clone()));

        Self {
            config,
            database,
            auth_manager,
            phase_engine,
            billing,
            progress,
            clock,
        }
    }
}
