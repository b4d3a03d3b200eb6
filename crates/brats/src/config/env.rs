// crates/brats/src/config/env.rs
// ============================================================================
// Module: Suite Environment
// Description: Environment keys and strict parsing helpers.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and blank values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for suite configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BratsEnv {
    /// Optional TOML config file path.
    ConfigFile,
    /// Platform CLI binary.
    CfBinary,
    /// Buildpack language (`go`).
    Language,
    /// Manifest dependency name of the runtime.
    Dependency,
    /// Buildpack source directory.
    BuildpackDir,
    /// Legacy buildpack source directory key.
    LegacyBuildpackDir,
    /// Branch to clone the buildpack source from instead of a local checkout.
    BuildpackBranch,
    /// Repository cloned when a branch is requested.
    BuildpackRepo,
    /// Git binary used for branch clones.
    GitBinary,
    /// Comma-separated stacks to deploy against.
    Stacks,
    /// Running-state timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Readiness poll interval in milliseconds (positive integer).
    PollIntervalMillis,
    /// Memory limit for pushed apps.
    Memory,
    /// Disk limit for pushed apps.
    Disk,
    /// Buildpack packager binary.
    Packager,
    /// Package the standard buildpack in cached mode (`true`/`false`, `1`/`0`).
    Cached,
    /// Report output directory.
    RunRoot,
    /// URL scheme used to probe app routes.
    RouteScheme,
}

impl BratsEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigFile => "BRATS_CONFIG",
            Self::CfBinary => "BRATS_CF_BIN",
            Self::Language => "BRATS_LANGUAGE",
            Self::Dependency => "BRATS_DEPENDENCY",
            Self::BuildpackDir => "BRATS_BUILDPACK_DIR",
            Self::LegacyBuildpackDir => "BP_DIR",
            Self::BuildpackBranch => "BRATS_BUILDPACK_BRANCH",
            Self::BuildpackRepo => "BRATS_BUILDPACK_REPO",
            Self::GitBinary => "BRATS_GIT_BIN",
            Self::Stacks => "BRATS_STACKS",
            Self::TimeoutSeconds => "BRATS_TIMEOUT_SEC",
            Self::PollIntervalMillis => "BRATS_POLL_INTERVAL_MS",
            Self::Memory => "BRATS_MEMORY",
            Self::Disk => "BRATS_DISK",
            Self::Packager => "BRATS_PACKAGER",
            Self::Cached => "BRATS_CACHED",
            Self::RunRoot => "BRATS_RUN_ROOT",
            Self::RouteScheme => "BRATS_ROUTE_SCHEME",
        }
    }

    /// All keys, in documentation order.
    pub const ALL: [Self; 18] = [
        Self::ConfigFile,
        Self::CfBinary,
        Self::Language,
        Self::Dependency,
        Self::BuildpackDir,
        Self::LegacyBuildpackDir,
        Self::BuildpackBranch,
        Self::BuildpackRepo,
        Self::GitBinary,
        Self::Stacks,
        Self::TimeoutSeconds,
        Self::PollIntervalMillis,
        Self::Memory,
        Self::Disk,
        Self::Packager,
        Self::Cached,
        Self::RunRoot,
        Self::RouteScheme,
    ];
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads a suite environment key and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
pub(super) fn read_env_nonempty(key: BratsEnv) -> Result<Option<String>, String> {
    let name = key.as_str();
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive integer from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
pub(super) fn parse_positive(name: &str, raw: &str) -> Result<u64, String> {
    let value: u64 =
        raw.trim().parse().map_err(|_| format!("{name} must be a positive integer"))?;
    if value == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(value)
}

/// Parses a positive timeout value in seconds.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
pub(super) fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    parse_positive(name, raw).map(Duration::from_secs)
}

/// Parses a boolean literal.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
pub(super) fn parse_bool(name: &str, raw: &str) -> Result<bool, String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}

/// Splits a comma-separated list, dropping blank entries.
///
/// # Errors
///
/// Returns an error when no entries remain.
pub(super) fn parse_list(name: &str, raw: &str) -> Result<Vec<String>, String> {
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        return Err(format!("{name} must list at least one entry"));
    }
    Ok(items)
}
