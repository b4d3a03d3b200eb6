// crates/brats/src/platform/mod.rs
// ============================================================================
// Module: Platform Seams
// Description: Interfaces to the deployment platform, buildpack registry, and
//              HTTP routing layer.
// Purpose: Keep scenario logic independent of the `cf` CLI and HTTP client.
// Dependencies: url
// ============================================================================

//! ## Overview
//! The suite never deploys, stages, or serves anything itself. It drives three
//! collaborators through these traits:
//! - [`DeploymentClient`]: pushes, observes, and deletes apps.
//! - [`BuildpackManager`]: registers and removes buildpacks.
//! - [`HttpTransport`]: issues GET requests against app routes.
//!
//! `cf`-backed implementations live in [`cf`] and [`buildpacks`]; the
//! reqwest-backed transport lives in [`browser`]. Branch clones of the
//! buildpack source live in [`git`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod browser;
pub mod buildpacks;
pub mod cf;
pub mod command;
pub mod git;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::error::PlatformError;
use crate::readiness;
use crate::types::AppHandle;
use crate::types::BuildpackName;
use crate::types::CachingMode;
use crate::types::Stack;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Delay between instance-state polls when callers do not choose one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Inputs of one push.
#[derive(Debug, Clone, Copy)]
pub struct DeployRequest<'a> {
    /// Generated app directory.
    pub app_dir: &'a Path,
    /// Stack to stage against.
    pub stack: &'a Stack,
    /// Buildpack to stage with.
    pub buildpack: &'a BuildpackName,
}

/// Reported state of one app instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    /// Serving.
    Running,
    /// Booting.
    Starting,
    /// Not yet placed or restarting.
    Down,
    /// Exited and will not recover without intervention.
    Crashed,
    /// Any other platform-reported state.
    Other(String),
}

impl InstanceState {
    /// Parses a platform state word, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "starting" => Self::Starting,
            "down" => Self::Down,
            "crashed" => Self::Crashed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("RUNNING"),
            Self::Starting => f.write_str("STARTING"),
            Self::Down => f.write_str("DOWN"),
            Self::Crashed => f.write_str("CRASHED"),
            Self::Other(state) => f.write_str(&state.to_ascii_uppercase()),
        }
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Pushes and observes apps on the platform.
pub trait DeploymentClient {
    /// Pushes `request.app_dir` as `app` and returns once the push command
    /// completes.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the push fails.
    fn deploy(&self, app: &AppHandle, request: &DeployRequest<'_>) -> Result<(), PlatformError>;

    /// Deletes the app and its routes.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the delete fails.
    fn delete(&self, app: &AppHandle) -> Result<(), PlatformError>;

    /// Returns the current state of every instance.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the status query fails.
    fn instance_states(&self, app: &AppHandle) -> Result<Vec<InstanceState>, PlatformError>;

    /// Returns everything the app has logged so far, staging output included.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the logs cannot be fetched.
    fn log_text(&self, app: &AppHandle) -> Result<String, PlatformError>;

    /// Returns the base URL of the app's first route.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the app has no route.
    fn route(&self, app: &AppHandle) -> Result<Url, PlatformError>;

    /// Removes routes no longer bound to any app.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the cleanup fails.
    fn delete_orphaned_routes(&self) -> Result<(), PlatformError>;

    /// Delay between readiness polls.
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Polls until every instance runs or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when a status query fails.
    fn is_running(&self, app: &AppHandle, timeout: Duration) -> Result<bool, PlatformError> {
        readiness::poll_until_running(self, app, timeout, self.poll_interval())
            .map(|outcome| outcome.is_running())
    }
}

/// Registers buildpacks on the platform.
pub trait BuildpackManager {
    /// Removes any registration under the buildpack's name.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform rejects the removal.
    fn cleanup(&self, buildpack: &BuildpackName) -> Result<(), PlatformError>;

    /// Packages the current buildpack source and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when packaging or registration fails.
    fn install(&self, buildpack: &BuildpackName) -> Result<(), PlatformError>;

    /// Registers the buildpack with credentials embedded in every dependency
    /// URI of its manifest.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when editing, packaging, or registration fails.
    fn install_with_credentialed_uris(
        &self,
        buildpack: &BuildpackName,
        caching: CachingMode,
    ) -> Result<(), PlatformError>;

    /// Registers the buildpack with its version suffixed by `revision`, so the
    /// platform treats it as an upgrade of the same buildpack.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when editing, packaging, or registration fails.
    fn install_revision(&self, buildpack: &BuildpackName, revision: &str)
    -> Result<(), PlatformError>;
}

/// Issues GET requests against deployed apps.
pub trait HttpTransport {
    /// Fetches `url` without following redirects.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] when no response arrives.
    fn get(&self, url: &Url) -> Result<HttpResponse, PlatformError>;
}
