// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for buildpack acceptance suites.
// Purpose: Wire live collaborators, serialize suites, and write summaries.
// Dependencies: brats, system-tests
// ============================================================================

//! ## Overview
//! Shared helpers for buildpack acceptance suites.
//! Invariants:
//! - Only one suite talks to the platform at a time; buildpack registrations
//!   are shared platform state.
//! - A summary is written for every suite, including ones that panic.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

use std::error::Error;
use std::sync::Mutex;
use std::sync::PoisonError;

use brats::ScenarioError;
use brats::ScenarioRunner;
use brats::report::SuiteReporter;
use brats::telemetry;
use system_tests::LivePlatform;

/// Serializes suites within the test binary.
static PLATFORM_LOCK: Mutex<()> = Mutex::new(());

/// Runs `body` against the live platform and fails on any recorded failure.
///
/// The summary lands under `BRATS_RUN_ROOT/<suite>` or `target/brats/run_<ms>/<suite>`.
pub fn run_suite(
    suite: &str,
    body: impl FnOnce(&mut ScenarioRunner<'_>) -> Result<(), ScenarioError>,
) -> Result<(), Box<dyn Error>> {
    let _guard = PLATFORM_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    telemetry::init();
    let live = LivePlatform::from_env()?;
    if let Some(commit) = live.buildpack_commit() {
        tracing::info!(suite, commit, "testing cloned buildpack branch");
    }
    let mut reporter = SuiteReporter::new(live.config(), suite)?;
    let mut runner = live.runner();
    let outcome = body(&mut runner);
    let report = runner.finish();
    reporter.finish(&report)?;
    if !report.all_passed() {
        return Err(report.failure_text().into());
    }
    outcome.map_err(Into::into)
}
