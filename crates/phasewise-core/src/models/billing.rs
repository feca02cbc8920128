// ABOUTME: Subscription plans, subscriptions, and payment lifecycle types
// ABOUTME: A subscription is active when paid and the current time is inside its window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::DomainParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Subscription tier definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub plan_name: String,
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    /// Highest phase reachable under this plan
    pub allowed_phases: u8,
    /// Length of a paid period; `None` means open ended
    pub duration_days: Option<i64>,
    pub facilities: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payment state of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Canceled,
}

impl PaymentStatus {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(DomainParseError::new("payment status", other)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result reported by the payment provider for a pending subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
}

/// Link between a user and a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    /// Opaque payment provider reference
    pub payment_reference: String,
    pub amount: f64,
    pub payment_status: PaymentStatus,
    pub start_date: DateTime<Utc>,
    /// `None` means the subscription does not expire
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether the subscription is paid and `now` falls inside its window
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.payment_status == PaymentStatus::Completed
            && self.start_date <= now
            && self.end_date.is_none_or(|end| now <= end)
    }
}
