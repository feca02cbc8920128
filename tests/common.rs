// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, a scripted plan source, and user and plan fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `phasewise_server`

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use phasewise_server::{
    clock::{Clock, ManualClock},
    config::{
        AuthConfig, DatabaseConfig, DatabaseUrl, Environment, LogLevel, PhaseConfig,
        PlanSourceConfig, ServerConfig,
    },
    database::Database,
    models::{
        DayEntry, MissionPreferences, PaymentOutcome, PhaseNumber, Plan, Subscription, User,
        UserRole,
    },
    plan_source::{PlanSource, PlanSourceError},
    resources::ServerResources,
    services::{BillingService, CreatePlanRequest, PhaseEngine, SubscriptionGate},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging once per test binary
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

pub const TEST_JWT_SECRET: &str = "phasewise-integration-test-secret";

/// 2025-03-01 09:00 UTC, a fixed starting point for scheduling tests
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fresh migrated in-memory database
pub async fn create_test_database() -> Arc<Database> {
    init_test_logging();
    Arc::new(Database::new("sqlite::memory:").await.unwrap())
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(start_time()))
}

pub fn preferences() -> MissionPreferences {
    MissionPreferences {
        mission: "Build strength".into(),
        time_commitment: "45 minutes".into(),
        gear: "Dumbbells".into(),
        squad: "Solo".into(),
    }
}

/// Plan source returning a fixed number of days per phase
///
/// Phases can be switched to fail, and every call is counted.
#[derive(Default)]
pub struct ScriptedPlanSource {
    days_per_phase: Mutex<HashMap<u8, u32>>,
    failing: Mutex<Vec<u8>>,
    delay: Mutex<Option<std::time::Duration>>,
    calls: AtomicUsize,
}

impl ScriptedPlanSource {
    pub fn new() -> Arc<Self> {
        let source = Self::default();
        source.set_days(1, 5);
        source.set_days(2, 4);
        source.set_days(3, 3);
        Arc::new(source)
    }

    pub fn set_days(&self, phase: u8, days: u32) {
        self.days_per_phase.lock().unwrap().insert(phase, days);
    }

    pub fn fail_phase(&self, phase: u8) {
        self.failing.lock().unwrap().push(phase);
    }

    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn set_delay(&self, delay: std::time::Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn day_entry(day: u32) -> DayEntry {
    DayEntry {
        day,
        name: Some(format!("Session {day}")),
        sets: Some(3),
        reps: Some("10".into()),
        description: Some("Controlled tempo".into()),
        rest: Some("60s".into()),
        motivational_quote: "Keep going".into(),
        is_workout_day: day % 3 != 0,
        video_url: None,
    }
}

#[async_trait]
impl PlanSource for ScriptedPlanSource {
    async fn fetch_plan(
        &self,
        phase: PhaseNumber,
        _preferences: &MissionPreferences,
    ) -> Result<Vec<DayEntry>, PlanSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&phase.get()) {
            return Err(PlanSourceError::UpstreamUnavailable("scripted outage".into()));
        }

        let days = self
            .days_per_phase
            .lock()
            .unwrap()
            .get(&phase.get())
            .copied()
            .ok_or(PlanSourceError::NotConfigured { phase })?;
        Ok((1..=days).map(day_entry).collect())
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        environment: Environment::Testing,
        log_level: LogLevel::Warn,
        database: DatabaseConfig {
            url: DatabaseUrl::Memory,
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.into(),
            jwt_expiry_hours: 24,
        },
        plan_source: PlanSourceConfig::default(),
        phases: PhaseConfig::default(),
        cors_origins: vec!["*".into()],
    }
}

/// Everything an engine test needs, sharing one database and clock
pub struct TestContext {
    pub database: Arc<Database>,
    pub clock: Arc<ManualClock>,
    pub plan_source: Arc<ScriptedPlanSource>,
    pub engine: PhaseEngine,
    pub billing: BillingService,
}

impl TestContext {
    pub async fn new() -> Self {
        let database = create_test_database().await;
        let clock = manual_clock();
        let plan_source = ScriptedPlanSource::new();
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let gate = SubscriptionGate::new(database.clone(), dyn_clock.clone(), PhaseConfig::default());
        let engine = PhaseEngine::new(database.clone(), gate, plan_source.clone(), dyn_clock.clone());
        let billing = BillingService::new(database.clone(), dyn_clock);

        Self {
            database,
            clock,
            plan_source,
            engine,
            billing,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Move the clock forward by whole days
    pub fn advance_days(&self, days: i64) {
        self.clock.advance(Duration::days(days));
    }

    pub async fn create_user(&self, email: &str) -> User {
        create_test_user(&self.database, email, UserRole::User).await
    }

    pub async fn create_plan(&self, allowed_phases: i64, duration_days: Option<i64>) -> Plan {
        self.billing
            .create_plan(CreatePlanRequest {
                plan_name: Some(format!("Plan up to phase {allowed_phases}")),
                amount: Some(29.0),
                currency: None,
                description: None,
                allowed_phases: Some(allowed_phases),
                duration_days,
                facilities: vec![],
            })
            .await
            .unwrap()
    }

    /// Pending subscription settled as paid
    pub async fn subscribe(&self, user: &User, plan: &Plan) -> Subscription {
        let pending = self
            .billing
            .create_subscription(user.id, plan.id)
            .await
            .unwrap();
        self.billing
            .record_payment_outcome(&pending.payment_reference, PaymentOutcome::Succeeded)
            .await
            .unwrap()
    }

    /// Generate phase 1 and finish it by moving past its last day
    pub async fn complete_phase_one(&self, user: &User) {
        let days = self
            .engine
            .request_phase_advance(user.id, PhaseNumber::FIRST, Some(preferences()))
            .await
            .unwrap();
        let last = days.last().unwrap().scheduled_date;
        let until_last = (last - self.today()).num_days();
        self.advance_days(until_last);
    }
}

pub async fn create_test_user(database: &Database, email: &str, role: UserRole) -> User {
    let mut user = User::new(email, Some("Test Athlete".into()), role);
    database.users().create(&user).await.unwrap();
    database.users().update_weight(user.id, 70.0).await.unwrap();
    user.weight_kg = Some(70.0);
    user
}

/// Server resources over a fresh database with a scripted plan source
pub async fn create_test_resources() -> (Arc<ServerResources>, Arc<ScriptedPlanSource>, Arc<ManualClock>) {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await.unwrap();
    let plan_source = ScriptedPlanSource::new();
    let clock = manual_clock();
    let resources = Arc::new(ServerResources::new(
        Arc::new(test_config()),
        database,
        plan_source.clone(),
        clock.clone(),
    ));
    (resources, plan_source, clock)
}

/// A user of `role` plus a bearer header value for them
pub async fn create_authenticated_user(
    resources: &ServerResources,
    email: &str,
    role: UserRole,
) -> (User, String) {
    let user = create_test_user(&resources.database, email, role).await;
    let token = resources.auth_manager.generate_token(&user).unwrap();
    (user, format!("Bearer {token}"))
}
