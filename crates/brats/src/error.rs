// crates/brats/src/error.rs
// ============================================================================
// Module: Error Taxonomy
// Description: Errors raised while generating, deploying, and asserting.
// Purpose: Separate fatal setup errors from per-scenario failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Four scenario failure classes exist: template generation failures,
//! deployment timeouts, unmet expectations, and platform failures. Platform
//! failures abort the remaining scenarios of a buildpack group because the
//! shared buildpack registration may be inconsistent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Sample-app generation errors. Fatal to the scenario, never retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Fixture directory for template assets does not exist.
    #[error("template assets missing at {}", path.display())]
    MissingAssets {
        /// Expected asset directory.
        path: PathBuf,
    },
    /// Asset references a placeholder the generator cannot fill.
    #[error("template asset {asset} references unknown placeholder {{{{{name}}}}}")]
    UnresolvedPlaceholder {
        /// Asset path relative to the template root.
        asset: String,
        /// Placeholder name.
        name: String,
    },
    /// Filesystem failure while writing the template.
    #[error("template io failure at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Buildpack manifest lookup errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No buildpack source directory could be located.
    #[error("could not find {0}-buildpack directory")]
    BuildpackDirNotFound(String),
    /// Manifest file could not be read.
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        /// Manifest path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Manifest YAML could not be parsed.
    #[error("failed to parse manifest {}: {message}", path.display())]
    Parse {
        /// Manifest path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// Manifest lists a malformed version token.
    #[error("invalid dependency version {0:?}")]
    InvalidVersion(String),
    /// Requested dependency version is not listed.
    #[error("manifest has no {dependency} {version} entry")]
    UnknownDependency {
        /// Dependency name.
        dependency: String,
        /// Requested version.
        version: String,
    },
}

/// Failures of the platform CLI, packager, or HTTP transport.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// External program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// External program exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured stderr (or stdout when stderr is empty).
        stderr: String,
    },
    /// Program output did not have the expected shape.
    #[error("unexpected output from {command}: {detail}")]
    UnexpectedOutput {
        /// Rendered command line.
        command: String,
        /// What was missing or malformed.
        detail: String,
    },
    /// HTTP request to a deployed app failed before a response arrived.
    #[error("http request to {url} failed: {message}")]
    Http {
        /// Target URL.
        url: String,
        /// Transport error message.
        message: String,
    },
    /// Filesystem failure while staging a buildpack.
    #[error("buildpack staging io failure at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Buildpack manifest could not be located or edited.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Failure of a single scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Template generation failed.
    #[error("app generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// App never reached the running state within the bound.
    #[error("app {app} not running after {}s (last states: {last_states})", timeout.as_secs())]
    DeploymentTimeout {
        /// App name.
        app: String,
        /// Wait bound.
        timeout: Duration,
        /// Last observed instance states.
        last_states: String,
    },
    /// Expected log or HTTP content was absent.
    #[error("expectation not met: {expectation}")]
    AssertionFailure {
        /// The unmet expectation.
        expectation: String,
    },
    /// Buildpack install/cleanup or a platform call failed.
    #[error("platform unavailable: {0}")]
    PlatformUnavailable(#[from] PlatformError),
    /// Manifest lookup failed.
    #[error("manifest lookup failed: {0}")]
    Manifest(#[from] ManifestError),
}

impl ScenarioError {
    /// Builds an assertion failure from an expectation description.
    #[must_use]
    pub fn assertion(expectation: impl Into<String>) -> Self {
        Self::AssertionFailure {
            expectation: expectation.into(),
        }
    }

    /// Returns true when the failure leaves shared buildpack state suspect.
    #[must_use]
    pub const fn aborts_group(&self) -> bool {
        matches!(self, Self::PlatformUnavailable(_) | Self::Manifest(_))
    }
}
