// ABOUTME: Integration tests for subscription-based phase eligibility
// ABOUTME: Covers plan ceilings, expiry, pending and canceled payments, and free phases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::TestContext;
use phasewise_server::models::{PaymentOutcome, PhaseNumber};
use phasewise_server::services::PhaseEligibility;

fn phase(n: i64) -> PhaseNumber {
    PhaseNumber::new(n).unwrap()
}

#[tokio::test]
async fn test_phase_one_is_free() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("free@example.com").await;
    let gate = ctx.engine.gate();

    assert!(gate.is_eligible_for_phase(user.id, PhaseNumber::FIRST).await.unwrap());
    assert!(!gate.is_eligible_for_phase(user.id, phase(2)).await.unwrap());
    assert_eq!(
        gate.eligibility(user.id, phase(2)).await.unwrap(),
        PhaseEligibility::NoActiveSubscription
    );
}

#[tokio::test]
async fn test_plan_ceiling() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("basic@example.com").await;
    let plan = ctx.create_plan(2, Some(30)).await;
    let subscription = ctx.subscribe(&user, &plan).await;
    let gate = ctx.engine.gate();

    match gate.eligibility(user.id, phase(2)).await.unwrap() {
        PhaseEligibility::Eligible {
            subscription: granted,
            allowed_phases,
        } => {
            assert_eq!(granted.id, subscription.id);
            assert_eq!(allowed_phases, 2);
        }
        other => panic!("expected eligibility, got {other:?}"),
    }

    assert_eq!(
        gate.eligibility(user.id, phase(3)).await.unwrap(),
        PhaseEligibility::PhaseNotPermitted { allowed_phases: 2 }
    );
}

#[tokio::test]
async fn test_expired_subscription_grants_nothing() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("lapsed@example.com").await;
    let plan = ctx.create_plan(3, Some(30)).await;
    ctx.subscribe(&user, &plan).await;
    let gate = ctx.engine.gate();

    ctx.advance_days(29);
    assert!(gate.is_eligible_for_phase(user.id, phase(3)).await.unwrap());

    ctx.advance_days(2);
    assert!(!gate.is_eligible_for_phase(user.id, phase(3)).await.unwrap());
}

#[tokio::test]
async fn test_open_ended_subscription_never_expires() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("lifetime@example.com").await;
    let plan = ctx.create_plan(3, None).await;
    ctx.subscribe(&user, &plan).await;

    ctx.advance_days(3650);
    assert!(ctx.engine.gate().is_eligible_for_phase(user.id, phase(3)).await.unwrap());
}

#[tokio::test]
async fn test_unpaid_subscriptions_grant_nothing() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("unpaid@example.com").await;
    let plan = ctx.create_plan(3, Some(30)).await;
    let gate = ctx.engine.gate();

    let pending = ctx.billing.create_subscription(user.id, plan.id).await.unwrap();
    assert!(!gate.is_eligible_for_phase(user.id, phase(2)).await.unwrap());

    ctx.billing
        .record_payment_outcome(&pending.payment_reference, PaymentOutcome::Failed)
        .await
        .unwrap();
    assert!(!gate.is_eligible_for_phase(user.id, phase(2)).await.unwrap());
}

#[tokio::test]
async fn test_zero_phase_plan_allows_no_paid_phase() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("zero@example.com").await;
    let plan = ctx.create_plan(0, Some(30)).await;
    ctx.subscribe(&user, &plan).await;
    let gate = ctx.engine.gate();

    assert!(gate.is_eligible_for_phase(user.id, PhaseNumber::FIRST).await.unwrap());
    assert_eq!(
        gate.eligibility(user.id, phase(2)).await.unwrap(),
        PhaseEligibility::PhaseNotPermitted { allowed_phases: 0 }
    );
}
