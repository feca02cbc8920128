// ABOUTME: HTTP client for the external workout plan generator
// ABOUTME: POSTs mission preferences to the per-phase URL and parses the workout_plan array
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{normalize_day_entries, PlanSource, PlanSourceError};
use crate::config::PlanSourceConfig;
use crate::models::{DayEntry, MissionPreferences, PhaseNumber};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// Generator response body
#[derive(Debug, Deserialize)]
struct GeneratedPlan {
    workout_plan: Vec<DayEntry>,
}

/// Plan source calling one HTTP endpoint per phase
///
/// There are no retries; a failed call fails the phase request.
#[derive(Debug, Clone)]
pub struct HttpPlanSource {
    client: reqwest::Client,
    config: PlanSourceConfig,
}

impl HttpPlanSource {
    /// Build a client with the configured request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(config: PlanSourceConfig) -> Result<Self, PlanSourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlanSourceError::UpstreamUnavailable(format!("client setup failed: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl PlanSource for HttpPlanSource {
    async fn fetch_plan(
        &self,
        phase: PhaseNumber,
        preferences: &MissionPreferences,
    ) -> Result<Vec<DayEntry>, PlanSourceError> {
        let url = self
            .config
            .url_for(phase)
            .ok_or(PlanSourceError::NotConfigured { phase })?;

        debug!(phase = %phase, url, "Requesting workout plan");

        let response = self
            .client
            .post(url)
            .json(preferences)
            .send()
            .await
            .map_err(|e| PlanSourceError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(phase = %phase, status = %status, "Plan generator returned an error");
            return Err(PlanSourceError::UpstreamUnavailable(format!(
                "status {status}: {body}"
            )));
        }

        let plan: GeneratedPlan = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PlanSourceError::UpstreamUnavailable(e.to_string())
                } else {
                    PlanSourceError::MalformedResponse(format!("JSON parse error: {e}"))
                }
            })?;

        normalize_day_entries(plan.workout_plan)
    }
}
