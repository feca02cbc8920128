// ABOUTME: Unit tests for environment-driven server configuration
// ABOUTME: Validates parsing, defaults, per-phase generator URLs, and production requirements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use phasewise_server::config::{DatabaseUrl, Environment, LogLevel, ServerConfig};
use phasewise_server::constants::env_keys;
use phasewise_server::models::PhaseNumber;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const MANAGED_KEYS: &[&str] = &[
    env_keys::HTTP_PORT,
    env_keys::ENVIRONMENT,
    env_keys::DATABASE_URL,
    env_keys::JWT_SECRET,
    env_keys::JWT_EXPIRY_HOURS,
    env_keys::PLAN_SOURCE_TIMEOUT_SECS,
    env_keys::PHASE_2_EXTENSION_DAYS,
    env_keys::PHASE_3_EXTENSION_DAYS,
    env_keys::CORS_ORIGINS,
    env_keys::LOG_LEVEL,
];

fn clear_env() {
    for key in MANAGED_KEYS {
        env::remove_var(key);
    }
    for phase in 1..=3 {
        env::remove_var(env_keys::plan_source_url(phase));
    }
}

#[test]
fn test_log_level_parsing() {
    assert_eq!(LogLevel::from_str_or_default("error"), LogLevel::Error);
    assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
    assert_eq!(LogLevel::from_str_or_default("Debug"), LogLevel::Debug);
    assert_eq!(LogLevel::from_str_or_default("nonsense"), LogLevel::Info);
}

#[test]
fn test_environment_parsing() {
    assert_eq!(
        Environment::from_str_or_default("PROD"),
        Environment::Production
    );
    assert_eq!(
        Environment::from_str_or_default("test"),
        Environment::Testing
    );
    assert_eq!(
        Environment::from_str_or_default("staging"),
        Environment::Development
    );
}

#[test]
fn test_database_url_parsing() {
    assert_eq!(
        DatabaseUrl::parse_url("sqlite::memory:").unwrap(),
        DatabaseUrl::Memory
    );
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:./data/app.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("./data/app.db")
        }
    );
    assert!(DatabaseUrl::parse_url("postgres://localhost/app").is_err());
    assert!(DatabaseUrl::parse_url("sqlite:").is_err());
}

#[test]
#[serial]
fn test_defaults_outside_production() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.http_port, 8081);
    assert_eq!(config.auth.jwt_expiry_hours, 24);
    assert!(!config.auth.jwt_secret.is_empty());
    assert!(config.plan_source.phase_urls.is_empty());
    assert_eq!(config.plan_source.timeout, Duration::from_secs(60));
    assert_eq!(config.phases.phase_two_extension_days, 60);
    assert_eq!(config.phases.phase_three_extension_days, 30);
    assert_eq!(config.cors_origins, vec!["*"]);
}

#[test]
#[serial]
fn test_per_phase_generator_urls() {
    clear_env();
    env::set_var(env_keys::plan_source_url(1), "http://generator.local/phase1");
    env::set_var(env_keys::plan_source_url(3), "  http://generator.local/phase3  ");
    env::set_var(env_keys::plan_source_url(2), "   ");
    env::set_var(env_keys::PLAN_SOURCE_TIMEOUT_SECS, "15");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(
        config.plan_source.url_for(PhaseNumber::FIRST),
        Some("http://generator.local/phase1")
    );
    assert_eq!(config.plan_source.url_for(PhaseNumber::new(2).unwrap()), None);
    assert_eq!(
        config.plan_source.url_for(PhaseNumber::LAST),
        Some("http://generator.local/phase3")
    );
    assert_eq!(config.plan_source.timeout, Duration::from_secs(15));
}

#[test]
#[serial]
fn test_production_requires_jwt_secret() {
    clear_env();
    env::set_var(env_keys::ENVIRONMENT, "production");

    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("JWT_SECRET"));

    env::set_var(env_keys::JWT_SECRET, "a-real-production-secret");
    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert!(config.environment.is_production());
    assert_eq!(config.auth.jwt_secret, "a-real-production-secret");
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_env();
    env::set_var(env_keys::HTTP_PORT, "not-a-port");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var(env_keys::PHASE_2_EXTENSION_DAYS, "0");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var(env_keys::JWT_EXPIRY_HOURS, "-1");
    assert!(ServerConfig::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_summary_omits_secret() {
    clear_env();
    env::set_var(env_keys::JWT_SECRET, "super-secret-value");
    env::set_var(env_keys::CORS_ORIGINS, "https://app.example.com, https://admin.example.com");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(
        config.cors_origins,
        vec!["https://app.example.com", "https://admin.example.com"]
    );
    let summary = config.summary();
    assert!(!summary.contains("super-secret-value"));
    assert!(!format!("{:?}", config.auth).contains("super-secret-value"));
}
