// ABOUTME: Contract tests for the HTTP plan source against a mock generator
// ABOUTME: Verifies request shape, response parsing, normalisation, and error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::preferences;
use phasewise_server::config::PlanSourceConfig;
use phasewise_server::errors::{AppError, ErrorCode};
use phasewise_server::models::PhaseNumber;
use phasewise_server::plan_source::{HttpPlanSource, PlanSource, PlanSourceError};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer, timeout: Duration) -> HttpPlanSource {
    let mut phase_urls = BTreeMap::new();
    phase_urls.insert(1, format!("{}/phase1", server.uri()));
    phase_urls.insert(2, format!("{}/phase2", server.uri()));
    HttpPlanSource::new(PlanSourceConfig {
        phase_urls,
        timeout,
    })
    .unwrap()
}

#[tokio::test]
async fn test_posts_preferences_and_sorts_days() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/phase1"))
        .and(body_json(json!({
            "mission": "Build strength",
            "time_commitment": "45 minutes",
            "gear": "Dumbbells",
            "squad": "Solo"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workout_plan": [
                {
                    "day": 2,
                    "name": "Rest",
                    "motivational_quote": "Recover well",
                    "is_workout_day": false
                },
                {
                    "day": 1,
                    "name": "Push",
                    "sets": 4,
                    "reps": "8-10",
                    "description": "Bench and overhead press",
                    "rest": "90s",
                    "motivational_quote": "Start strong",
                    "is_workout_day": true,
                    "video_url": "https://videos.example.com/push"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, Duration::from_secs(5));
    let entries = source
        .fetch_plan(PhaseNumber::FIRST, &preferences())
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].day, 1);
    assert_eq!(entries[0].sets, Some(4));
    assert!(entries[0].is_workout_day);
    assert_eq!(entries[1].day, 2);
    assert_eq!(entries[1].sets, None);
    assert!(!entries[1].is_workout_day);
}

#[tokio::test]
async fn test_unconfigured_phase() {
    let server = MockServer::start().await;
    let source = source_for(&server, Duration::from_secs(5));

    let err = source
        .fetch_plan(PhaseNumber::LAST, &preferences())
        .await
        .unwrap_err();
    assert!(matches!(err, PlanSourceError::NotConfigured { .. }));
}

#[tokio::test]
async fn test_error_status_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/phase2"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let source = source_for(&server, Duration::from_secs(5));
    let err = source
        .fetch_plan(PhaseNumber::new(2).unwrap(), &preferences())
        .await
        .unwrap_err();
    assert!(matches!(err, PlanSourceError::UpstreamUnavailable(_)));

    let app_error: AppError = err.into();
    assert_eq!(app_error.code, ErrorCode::ExternalServiceError);
    assert_eq!(app_error.http_status(), 502);
}

#[tokio::test]
async fn test_timeout_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/phase1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "workout_plan": [{ "day": 1 }] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let source = source_for(&server, Duration::from_millis(50));
    let err = source
        .fetch_plan(PhaseNumber::FIRST, &preferences())
        .await
        .unwrap_err();
    assert!(matches!(err, PlanSourceError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn test_malformed_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/phase1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "plan": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/phase2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workout_plan": [{ "day": 1 }, { "day": 1 }]
        })))
        .mount(&server)
        .await;

    let source = source_for(&server, Duration::from_secs(5));

    let missing_key = source
        .fetch_plan(PhaseNumber::FIRST, &preferences())
        .await
        .unwrap_err();
    assert!(matches!(missing_key, PlanSourceError::MalformedResponse(_)));

    let duplicate_days = source
        .fetch_plan(PhaseNumber::new(2).unwrap(), &preferences())
        .await
        .unwrap_err();
    assert!(matches!(duplicate_days, PlanSourceError::MalformedResponse(_)));
}
