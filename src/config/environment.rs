// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database, JWT, plan generator endpoints, and phase extension windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use crate::constants::{defaults, env_keys, phases};
use crate::models::PhaseNumber;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string, falling back to `info`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string, falling back to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
            Self::Testing => f.write_str("testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite { path: PathBuf },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for non-`SQLite` URLs or an empty path
    pub fn parse_url(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with("postgres://") || trimmed.starts_with("postgresql://") {
            return Err(anyhow!("Only SQLite databases are supported, got '{trimmed}'"));
        }

        let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
        let path_str = path_str.strip_prefix("//").unwrap_or(path_str);
        match path_str {
            "" => Err(anyhow!("DATABASE_URL must not be empty")),
            ":memory:" => Ok(Self::Memory),
            path => Ok(Self::SQLite {
                path: PathBuf::from(path),
            }),
        }
    }

    /// Convert to an sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/phasewise.db"),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .finish()
    }
}

/// Plan generator endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSourceConfig {
    /// Generator URL per phase; phases without a URL cannot be generated
    pub phase_urls: BTreeMap<u8, String>,
    /// Upstream request timeout
    pub timeout: Duration,
}

impl PlanSourceConfig {
    /// URL configured for `phase`
    #[must_use]
    pub fn url_for(&self, phase: PhaseNumber) -> Option<&str> {
        self.phase_urls.get(&phase.get()).map(String::as_str)
    }
}

impl Default for PlanSourceConfig {
    fn default() -> Self {
        Self {
            phase_urls: BTreeMap::new(),
            timeout: Duration::from_secs(defaults::PLAN_SOURCE_TIMEOUT_SECS),
        }
    }
}

/// Subscription extension windows applied when entering paid phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Days granted from now when entering phase 2
    pub phase_two_extension_days: i64,
    /// Days granted from now when entering phase 3
    pub phase_three_extension_days: i64,
}

impl PhaseConfig {
    /// Extension window for entering `phase`, if it has one
    #[must_use]
    pub const fn extension_days(&self, phase: PhaseNumber) -> Option<i64> {
        match phase.get() {
            2 => Some(self.phase_two_extension_days),
            3 => Some(self.phase_three_extension_days),
            _ => None,
        }
    }
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            phase_two_extension_days: phases::DEFAULT_PHASE_TWO_EXTENSION_DAYS,
            phase_three_extension_days: phases::DEFAULT_PHASE_THREE_EXTENSION_DAYS,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Plan generator configuration
    pub plan_source: PlanSourceConfig,
    /// Phase extension windows
    pub phases: PhaseConfig,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a variable cannot be parsed or a production
    /// requirement is missing
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {e}");
        }

        let environment =
            Environment::from_str_or_default(&env_var_or(env_keys::ENVIRONMENT, "development"));

        let config = Self {
            http_port: env_var_or(env_keys::HTTP_PORT, &defaults::HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            environment,
            log_level: LogLevel::from_str_or_default(&env_var_or(env_keys::LOG_LEVEL, "info")),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or(
                    env_keys::DATABASE_URL,
                    defaults::DATABASE_URL,
                ))
                .context("Invalid DATABASE_URL value")?,
            },
            auth: AuthConfig {
                jwt_secret: jwt_secret(environment)?,
                jwt_expiry_hours: env_var_or(
                    env_keys::JWT_EXPIRY_HOURS,
                    &defaults::JWT_EXPIRY_HOURS.to_string(),
                )
                .parse()
                .context("Invalid JWT_EXPIRY_HOURS value")?,
            },
            plan_source: PlanSourceConfig {
                phase_urls: plan_source_urls(),
                timeout: Duration::from_secs(
                    env_var_or(
                        env_keys::PLAN_SOURCE_TIMEOUT_SECS,
                        &defaults::PLAN_SOURCE_TIMEOUT_SECS.to_string(),
                    )
                    .parse()
                    .context("Invalid PLAN_SOURCE_TIMEOUT_SECS value")?,
                ),
            },
            phases: PhaseConfig {
                phase_two_extension_days: env_var_or(
                    env_keys::PHASE_2_EXTENSION_DAYS,
                    &phases::DEFAULT_PHASE_TWO_EXTENSION_DAYS.to_string(),
                )
                .parse()
                .context("Invalid PHASE_2_EXTENSION_DAYS value")?,
                phase_three_extension_days: env_var_or(
                    env_keys::PHASE_3_EXTENSION_DAYS,
                    &phases::DEFAULT_PHASE_THREE_EXTENSION_DAYS.to_string(),
                )
                .parse()
                .context("Invalid PHASE_3_EXTENSION_DAYS value")?,
            },
            cors_origins: parse_origins(&env_var_or(
                env_keys::CORS_ORIGINS,
                defaults::CORS_ORIGINS,
            )),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive windows, timeouts, or token lifetimes
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }
        if self.plan_source.timeout.is_zero() {
            return Err(anyhow!("PLAN_SOURCE_TIMEOUT_SECS must be positive"));
        }
        if self.phases.phase_two_extension_days <= 0 || self.phases.phase_three_extension_days <= 0
        {
            return Err(anyhow!("Phase extension windows must be positive"));
        }
        for phase in 1..=phases::MAX_PHASE {
            if !self.plan_source.phase_urls.contains_key(&phase) {
                warn!("No plan generator URL configured for phase {phase}");
            }
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        let configured_phases: Vec<String> = self
            .plan_source
            .phase_urls
            .keys()
            .map(ToString::to_string)
            .collect();
        format!(
            "Phasewise Server Configuration:\n\
             - Environment: {}\n\
             - HTTP Port: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - JWT Expiry: {}h\n\
             - Plan Source Phases: [{}]\n\
             - Plan Source Timeout: {}s\n\
             - Extension Windows: phase 2 = {}d, phase 3 = {}d\n\
             - CORS Origins: {}",
            self.environment,
            self.http_port,
            self.log_level,
            if self.database.url.is_memory() {
                "SQLite (memory)"
            } else {
                "SQLite"
            },
            self.auth.jwt_expiry_hours,
            configured_phases.join(", "),
            self.plan_source.timeout.as_secs(),
            self.phases.phase_two_extension_days,
            self.phases.phase_three_extension_days,
            self.cors_origins.join(",")
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Resolve the signing secret; production refuses to start without one
fn jwt_secret(environment: Environment) -> Result<String> {
    match env::var(env_keys::JWT_SECRET) {
        Ok(secret) if !secret.trim().is_empty() => Ok(secret),
        _ if environment.is_production() => {
            Err(anyhow!("JWT_SECRET must be set in production"))
        }
        _ => {
            warn!("JWT_SECRET not set, using development secret");
            Ok(defaults::DEVELOPMENT_JWT_SECRET.to_owned())
        }
    }
}

/// Collect `PLAN_SOURCE_PHASE_n_URL` for every phase
fn plan_source_urls() -> BTreeMap<u8, String> {
    (1..=phases::MAX_PHASE)
        .filter_map(|phase| {
            env::var(env_keys::plan_source_url(phase))
                .ok()
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty())
                .map(|url| (phase, url))
        })
        .collect()
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_database_url_parsing() {
        let file = DatabaseUrl::parse_url("sqlite:./test.db").unwrap();
        assert_eq!(file.to_connection_string(), "sqlite:./test.db");
        assert!(!file.is_memory());

        assert!(DatabaseUrl::parse_url("sqlite::memory:").unwrap().is_memory());
        assert!(DatabaseUrl::parse_url("postgres://localhost/db").is_err());
        assert!(DatabaseUrl::parse_url("sqlite:").is_err());
    }

    #[test]
    fn test_phase_extension_lookup() {
        let phases = PhaseConfig::default();
        assert_eq!(phases.extension_days(PhaseNumber::FIRST), None);
        assert_eq!(phases.extension_days(PhaseNumber::LAST), Some(30));
    }

    #[test]
    fn test_auth_config_debug_hides_secret() {
        let auth = AuthConfig {
            jwt_secret: "hunter2".into(),
            jwt_expiry_hours: 1,
        };
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
