// ABOUTME: Integration tests for workout logging and accumulated progress
// ABOUTME: Covers calorie and XP accumulation, input validation, and weight requirements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{create_test_database, manual_clock};
use phasewise_server::database::Database;
use phasewise_server::errors::ErrorCode;
use phasewise_server::models::{User, UserRole};
use phasewise_server::services::ProgressService;
use std::sync::Arc;

async fn service() -> (ProgressService, Arc<Database>) {
    let database = create_test_database().await;
    (ProgressService::new(database.clone(), manual_clock()), database)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn test_workouts_accumulate() {
    let (progress, database) = service().await;
    let user = common::create_test_user(&database, "runner@example.com", UserRole::User).await;

    // 7.0 MET * 70kg * 30min / 60 = 245 kcal, 24 XP
    let first = progress.log_workout(user.id, "jogging", 30.0).await.unwrap();
    assert_eq!(first.total_workouts, 1);
    assert!(close(first.calories_burned, 245.0));
    assert!(close(first.total_training_hours, 0.5));
    assert_eq!(first.xp, 24);

    // 3.0 MET * 70kg * 60min / 60 = 210 kcal, 21 XP
    let second = progress.log_workout(user.id, "yoga", 60.0).await.unwrap();
    assert_eq!(second.total_workouts, 2);
    assert!(close(second.calories_burned, 455.0));
    assert!(close(second.total_training_hours, 1.5));
    assert_eq!(second.xp, 45);

    let stored = progress.get_progress(user.id).await.unwrap();
    assert_eq!(stored, second);
}

#[tokio::test]
async fn test_invalid_workouts_are_rejected() {
    let (progress, database) = service().await;
    let user = common::create_test_user(&database, "strict@example.com", UserRole::User).await;

    let err = progress.log_workout(user.id, "swimming", 30.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    for minutes in [0.0, -5.0, 1441.0, f64::NAN] {
        let err = progress.log_workout(user.id, "walking", minutes).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput, "duration {minutes}");
    }

    let err = progress.get_progress(user.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_weight_is_required() {
    let (progress, database) = service().await;
    let user = User::new("light@example.com", None, UserRole::User);
    database.users().create(&user).await.unwrap();

    let err = progress.log_workout(user.id, "hiit", 20.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PreconditionFailed);

    let err = progress.set_weight(user.id, 0.0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);

    progress.set_weight(user.id, 60.0).await.unwrap();
    // 9.0 MET * 60kg * 20min / 60 = 180 kcal
    let logged = progress.log_workout(user.id, "hiit", 20.0).await.unwrap();
    assert!(close(logged.calories_burned, 180.0));
    assert_eq!(logged.xp, 18);
}
