// ABOUTME: User account model and role definitions
// ABOUTME: Roles gate which HTTP routes a caller may use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::DomainParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// User role for permission checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular member following a training program
    User,
    /// Operator managing plans and payments
    Admin,
    /// Operator with full access
    SuperAdmin,
}

impl UserRole {
    /// Database and token representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Whether this role can manage plans and payments
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl FromStr for UserRole {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            other => Err(DomainParseError::new("role", other)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    /// Body weight used for calorie estimates
    pub weight_kg: Option<f64>,
    pub is_subscribed: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new account with no weight recorded
    #[must_use]
    pub fn new(email: impl Into<String>, full_name: Option<String>, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            full_name,
            role,
            weight_kg: None,
            is_subscribed: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("SUPER_ADMIN".parse::<UserRole>().unwrap(), UserRole::SuperAdmin);
        assert!("admin".parse::<UserRole>().is_err());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }
}
