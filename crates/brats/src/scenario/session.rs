// crates/brats/src/scenario/session.rs
// ============================================================================
// Module: Deployment Sessions
// Description: Scoped ownership of a pushed app.
// Purpose: Delete every acquired app exactly once on every exit path.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! A [`DeployedApp`] is created before the first push, so a failed push is
//! still followed by a delete. [`DeployedApp::destroy`] deletes explicitly and
//! reports the result; dropping an undestroyed session (early return or
//! panic) deletes best-effort and logs any failure.
//! Invariants:
//! - At most one delete is issued per session.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::PlatformError;
use crate::error::ScenarioError;
use crate::platform::DeployRequest;
use crate::platform::DeploymentClient;
use crate::readiness::wait_until_running;
use crate::types::AppHandle;

// ============================================================================
// SECTION: Session
// ============================================================================

/// A platform app owned by the current scenario.
pub struct DeployedApp<'a> {
    /// Client used to observe and delete the app.
    client: &'a dyn DeploymentClient,
    /// App name.
    handle: AppHandle,
    /// Set once the delete has been issued.
    released: bool,
}

impl<'a> DeployedApp<'a> {
    /// Takes ownership of `handle`; nothing is pushed yet.
    #[must_use]
    pub fn new(client: &'a dyn DeploymentClient, handle: AppHandle) -> Self {
        Self {
            client,
            handle,
            released: false,
        }
    }

    /// Returns the app name.
    #[must_use]
    pub const fn handle(&self) -> &AppHandle {
        &self.handle
    }

    /// Pushes (or re-pushes) the app and waits for the running state.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::PlatformUnavailable`] when the push fails,
    /// [`ScenarioError::DeploymentTimeout`] when the app is not running within
    /// `timeout`, and [`ScenarioError::AssertionFailure`] when it crashes.
    pub fn push(&self, request: &DeployRequest<'_>, timeout: Duration) -> Result<(), ScenarioError> {
        tracing::debug!(app = %self.handle, stack = %request.stack, "session push");
        self.client.deploy(&self.handle, request)?;
        wait_until_running(self.client, &self.handle, timeout)
    }

    /// Returns the app's log text.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when logs cannot be fetched.
    pub fn log_text(&self) -> Result<String, PlatformError> {
        self.client.log_text(&self.handle)
    }

    /// Returns the app's base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the app has no route.
    pub fn route(&self) -> Result<Url, PlatformError> {
        self.client.route(&self.handle)
    }

    /// Deletes the app now.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the delete fails; it is not retried.
    pub fn destroy(mut self) -> Result<(), PlatformError> {
        self.release()
    }

    /// Issues the delete once.
    fn release(&mut self) -> Result<(), PlatformError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        tracing::debug!(app = %self.handle, "session release");
        self.client.delete(&self.handle)
    }
}

impl Drop for DeployedApp<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::warn!(app = %self.handle, error = %err, "app teardown failed");
        }
    }
}

// ============================================================================
// SECTION: Scoped Helpers
// ============================================================================

/// Runs `body` with a session for `handle`, then deletes the app.
///
/// A body failure takes precedence over a delete failure; the latter is
/// logged.
///
/// # Errors
///
/// Returns the body's error, or [`ScenarioError::PlatformUnavailable`] when
/// the body passed but the delete failed.
pub fn with_session<T>(
    client: &dyn DeploymentClient,
    handle: AppHandle,
    body: impl FnOnce(&DeployedApp<'_>) -> Result<T, ScenarioError>,
) -> Result<T, ScenarioError> {
    let app = DeployedApp::new(client, handle);
    let outcome = body(&app);
    let app_name = app.handle().to_string();
    let released = app.destroy();
    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(teardown)) => {
            tracing::warn!(app = %app_name, error = %teardown, "app teardown failed");
            Err(err)
        }
    }
}

/// Pushes an app, waits for it to run, runs `body`, and deletes the app.
///
/// # Errors
///
/// Returns push, readiness, or body failures as described on
/// [`with_session`].
pub fn with_deployed_app<T>(
    client: &dyn DeploymentClient,
    handle: AppHandle,
    request: &DeployRequest<'_>,
    timeout: Duration,
    body: impl FnOnce(&DeployedApp<'_>) -> Result<T, ScenarioError>,
) -> Result<T, ScenarioError> {
    with_session(client, handle, |app| {
        app.push(request, timeout)?;
        body(app)
    })
}
