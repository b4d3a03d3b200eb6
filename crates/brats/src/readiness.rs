// crates/brats/src/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Bounded polling for pushed apps to reach the running state.
// Purpose: Ensure apps are running without arbitrary sleeps or unbounded waits.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! Staging and startup happen asynchronously on the platform. These helpers
//! poll instance states until every instance runs, an instance crashes, or
//! the deadline passes. Polling stops at the deadline; nothing blocks past it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread::sleep;
use std::time::Duration;
use std::time::Instant;

use crate::error::PlatformError;
use crate::error::ScenarioError;
use crate::platform::DeploymentClient;
use crate::platform::InstanceState;
use crate::types::AppHandle;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Terminal result of a readiness poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Every instance reported running.
    Running,
    /// An instance crashed.
    Crashed(Vec<InstanceState>),
    /// The deadline passed first.
    TimedOut {
        /// States seen on the final poll.
        last_states: Vec<InstanceState>,
        /// Number of polls made.
        attempts: u32,
    },
}

impl Readiness {
    /// Returns true when the app is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

// ============================================================================
// SECTION: Polling
// ============================================================================

/// Polls instance states until running, crashed, or `timeout`.
///
/// # Errors
///
/// Returns [`PlatformError`] when a status query fails.
pub fn poll_until_running<C: DeploymentClient + ?Sized>(
    client: &C,
    app: &AppHandle,
    timeout: Duration,
    interval: Duration,
) -> Result<Readiness, PlatformError> {
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let states = client.instance_states(app)?;
        if states.contains(&InstanceState::Crashed) {
            return Ok(Readiness::Crashed(states));
        }
        if !states.is_empty() && states.iter().all(|state| *state == InstanceState::Running) {
            tracing::debug!(app = %app, attempts, "app running");
            return Ok(Readiness::Running);
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(Readiness::TimedOut {
                last_states: states,
                attempts,
            });
        }
        tracing::trace!(app = %app, attempts, "app not running yet");
        sleep(interval.min(timeout.saturating_sub(elapsed)));
    }
}

/// Waits for the running state, mapping non-running outcomes to scenario
/// failures.
///
/// # Errors
///
/// Returns [`ScenarioError::DeploymentTimeout`] when the deadline passes,
/// [`ScenarioError::AssertionFailure`] when an instance crashes, and
/// [`ScenarioError::PlatformUnavailable`] when a status query fails.
pub fn wait_until_running<C: DeploymentClient + ?Sized>(
    client: &C,
    app: &AppHandle,
    timeout: Duration,
) -> Result<(), ScenarioError> {
    match poll_until_running(client, app, timeout, client.poll_interval())? {
        Readiness::Running => Ok(()),
        Readiness::Crashed(states) => Err(ScenarioError::assertion(format!(
            "app {app} running within {}s, but instances reached [{}]",
            timeout.as_secs(),
            render_states(&states)
        ))),
        Readiness::TimedOut {
            last_states,
            attempts,
        } => {
            tracing::warn!(app = %app, attempts, "app did not reach running state");
            Err(ScenarioError::DeploymentTimeout {
                app: app.to_string(),
                timeout,
                last_states: render_states(&last_states),
            })
        }
    }
}

/// Renders states as a comma-separated list.
fn render_states(states: &[InstanceState]) -> String {
    if states.is_empty() {
        return "none".to_string();
    }
    states.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod readiness_tests;
