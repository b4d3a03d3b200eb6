// crates/brats/src/readiness/readiness_tests.rs
// ============================================================================
// Module: Readiness Unit Tests
// Description: Unit coverage for bounded running-state polling.
// Purpose: Ensure polling ends on running, crash, or deadline.
// Dependencies: brats
// ============================================================================

#![allow(clippy::unwrap_used, reason = "Test-only assertions favor direct unwrap for clarity.")]

use std::time::Duration;
use std::time::Instant;

use super::Readiness;
use super::poll_until_running;
use super::wait_until_running;
use crate::error::ScenarioError;
use crate::platform::DeploymentClient;
use crate::platform::InstanceState;
use crate::testing::FakePlatform;
use crate::types::AppHandle;

#[test]
fn polling_continues_until_all_instances_run() {
    let platform = FakePlatform::new().with_states(vec![
        vec![],
        vec![InstanceState::Down],
        vec![InstanceState::Starting, InstanceState::Running],
        vec![InstanceState::Running, InstanceState::Running],
    ]);
    let app = AppHandle::named("app");
    let outcome =
        poll_until_running(&platform, &app, Duration::from_secs(5), Duration::from_millis(1))
            .unwrap();
    assert_eq!(outcome, Readiness::Running);
    let polls = platform.calls().iter().filter(|call| call.starts_with("states:")).count();
    assert_eq!(polls, 4);
}

#[test]
fn crashed_instance_ends_polling_early() {
    let platform = FakePlatform::new()
        .with_states(vec![vec![InstanceState::Starting], vec![InstanceState::Crashed]]);
    let app = AppHandle::named("app");
    let err = wait_until_running(&platform, &app, Duration::from_secs(5)).unwrap_err();
    match err {
        ScenarioError::AssertionFailure {
            expectation,
        } => assert!(expectation.contains("CRASHED")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn deadline_bounds_the_wait() {
    let platform = FakePlatform::new().with_states(vec![vec![InstanceState::Starting]]);
    let app = AppHandle::named("slow-app");
    let started = Instant::now();
    let err = wait_until_running(&platform, &app, Duration::from_millis(30)).unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(5));
    match err {
        ScenarioError::DeploymentTimeout {
            app,
            last_states,
            ..
        } => {
            assert_eq!(app, "slow-app");
            assert_eq!(last_states, "STARTING");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn is_running_reports_bool_outcome() {
    let app = AppHandle::named("app");
    let running = FakePlatform::new();
    assert!(running.is_running(&app, Duration::from_secs(1)).unwrap());

    let stuck = FakePlatform::new().with_states(vec![vec![InstanceState::Down]]);
    assert!(!stuck.is_running(&app, Duration::from_millis(10)).unwrap());
}
