// crates/brats/src/config/settings.rs
// ============================================================================
// Module: Suite Settings
// Description: Typed suite configuration with file and environment layers.
// Purpose: Resolve one immutable configuration for a suite run.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! [`BratsConfig::load`] starts from defaults, applies the optional TOML file
//! named by `BRATS_CONFIG`, then applies environment overrides. Each layer is
//! validated; unknown file keys and malformed values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::env::BratsEnv;
use super::env::parse_bool;
use super::env::parse_list;
use super::env::parse_positive;
use super::env::parse_timeout_seconds;
use super::env::read_env_nonempty;
use crate::types::BuildpackName;
use crate::types::Stack;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Bound on waiting for a pushed app to report running.
pub const DEFAULT_RUNNING_TIMEOUT: Duration = Duration::from_secs(120);

/// Delay between instance-state polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment value is malformed.
    #[error("{0}")]
    Env(String),
    /// Config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML for this schema.
    #[error("invalid config file: {0}")]
    Parse(String),
    /// A value failed validation.
    #[error("invalid config value for {field}: {message}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Validation message.
        message: String,
    },
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        Self::Env(value)
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Resolved suite configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BratsConfig {
    /// Platform CLI binary.
    pub cf_binary: String,
    /// Buildpack language.
    pub language: String,
    /// Manifest dependency name of the runtime.
    pub dependency: String,
    /// Buildpack source directory override.
    pub buildpack_dir: Option<PathBuf>,
    /// Branch cloned into a scratch checkout instead of a local directory.
    pub buildpack_branch: Option<String>,
    /// Repository URL for branch clones; defaults to the upstream
    /// `cloudfoundry/<language>-buildpack` repository.
    pub buildpack_repo: Option<String>,
    /// Git binary used for branch clones.
    pub git_binary: String,
    /// Stacks to deploy against, in order.
    pub stacks: Vec<Stack>,
    /// Bound on waiting for the running state.
    pub running_timeout: Duration,
    /// Delay between readiness polls.
    pub poll_interval: Duration,
    /// Memory limit for pushed apps.
    pub memory: String,
    /// Disk limit for pushed apps.
    pub disk: String,
    /// Buildpack packager binary.
    pub packager: String,
    /// Package the standard buildpack with bundled dependencies.
    pub cached: bool,
    /// Report output directory override.
    pub run_root: Option<PathBuf>,
    /// URL scheme used to probe app routes (`http` or `https`).
    pub route_scheme: String,
}

impl Default for BratsConfig {
    fn default() -> Self {
        Self {
            cf_binary: "cf".to_string(),
            language: "go".to_string(),
            dependency: "go".to_string(),
            buildpack_dir: None,
            buildpack_branch: None,
            buildpack_repo: None,
            git_binary: "git".to_string(),
            stacks: vec![Stack::new("cflinuxfs2")],
            running_timeout: DEFAULT_RUNNING_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            memory: "256M".to_string(),
            disk: "384M".to_string(),
            packager: "buildpack-packager".to_string(),
            cached: false,
            run_root: None,
            route_scheme: "http".to_string(),
        }
    }
}

/// On-disk config file layout; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    /// See [`BratsConfig::cf_binary`].
    cf_binary: Option<String>,
    /// See [`BratsConfig::language`].
    language: Option<String>,
    /// See [`BratsConfig::dependency`].
    dependency: Option<String>,
    /// See [`BratsConfig::buildpack_dir`].
    buildpack_dir: Option<PathBuf>,
    /// See [`BratsConfig::buildpack_branch`].
    buildpack_branch: Option<String>,
    /// See [`BratsConfig::buildpack_repo`].
    buildpack_repo: Option<String>,
    /// See [`BratsConfig::git_binary`].
    git_binary: Option<String>,
    /// See [`BratsConfig::stacks`].
    stacks: Option<Vec<String>>,
    /// Running timeout in seconds.
    timeout_sec: Option<u64>,
    /// Poll interval in milliseconds.
    poll_interval_ms: Option<u64>,
    /// See [`BratsConfig::memory`].
    memory: Option<String>,
    /// See [`BratsConfig::disk`].
    disk: Option<String>,
    /// See [`BratsConfig::packager`].
    packager: Option<String>,
    /// See [`BratsConfig::cached`].
    cached: Option<bool>,
    /// See [`BratsConfig::run_root`].
    run_root: Option<PathBuf>,
    /// See [`BratsConfig::route_scheme`].
    route_scheme: Option<String>,
}

impl BratsConfig {
    /// Loads configuration from the optional config file and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable or malformed, or an
    /// environment value is empty, not UTF-8, or fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match read_env_nonempty(BratsEnv::ConfigFile)? {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads defaults overlaid with a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable or malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses defaults overlaid with TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys, and
    /// [`ConfigError::Invalid`] for zero durations or empty stack lists.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: FileConfig =
            toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let mut config = Self::default();
        config.apply_file(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the repository cloned for branch checkouts.
    #[must_use]
    pub fn buildpack_repo_url(&self) -> String {
        self.buildpack_repo.clone().unwrap_or_else(|| {
            format!("https://github.com/cloudfoundry/{}-buildpack", self.language)
        })
    }

    /// Returns the buildpack identity under test.
    #[must_use]
    pub fn buildpack(&self) -> BuildpackName {
        BuildpackName::new(self.language.clone())
    }

    /// Applies a parsed config file over the current values.
    fn apply_file(&mut self, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(value) = file.cf_binary {
            self.cf_binary = value;
        }
        if let Some(value) = file.language {
            self.language = value;
        }
        if let Some(value) = file.dependency {
            self.dependency = value;
        }
        if file.buildpack_dir.is_some() {
            self.buildpack_dir = file.buildpack_dir;
        }
        if file.buildpack_branch.is_some() {
            self.buildpack_branch = file.buildpack_branch;
        }
        if file.buildpack_repo.is_some() {
            self.buildpack_repo = file.buildpack_repo;
        }
        if let Some(value) = file.git_binary {
            self.git_binary = value;
        }
        if let Some(stacks) = file.stacks {
            self.stacks = stacks.into_iter().map(Stack::new).collect();
        }
        if let Some(secs) = file.timeout_sec {
            self.running_timeout = Duration::from_secs(nonzero("timeout_sec", secs)?);
        }
        if let Some(millis) = file.poll_interval_ms {
            self.poll_interval = Duration::from_millis(nonzero("poll_interval_ms", millis)?);
        }
        if let Some(value) = file.memory {
            self.memory = value;
        }
        if let Some(value) = file.disk {
            self.disk = value;
        }
        if let Some(value) = file.packager {
            self.packager = value;
        }
        if let Some(value) = file.cached {
            self.cached = value;
        }
        if file.run_root.is_some() {
            self.run_root = file.run_root;
        }
        if let Some(value) = file.route_scheme {
            self.route_scheme = value;
        }
        Ok(())
    }

    /// Applies environment overrides over the current values.
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env_nonempty(BratsEnv::CfBinary)? {
            self.cf_binary = value;
        }
        if let Some(value) = read_env_nonempty(BratsEnv::Language)? {
            self.language = value;
        }
        if let Some(value) = read_env_nonempty(BratsEnv::Dependency)? {
            self.dependency = value;
        }
        let dir = match read_env_nonempty(BratsEnv::BuildpackDir)? {
            Some(dir) => Some(dir),
            None => read_env_nonempty(BratsEnv::LegacyBuildpackDir)?,
        };
        if let Some(dir) = dir {
            self.buildpack_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = read_env_nonempty(BratsEnv::BuildpackBranch)? {
            self.buildpack_branch = Some(value);
        }
        if let Some(value) = read_env_nonempty(BratsEnv::BuildpackRepo)? {
            self.buildpack_repo = Some(value);
        }
        if let Some(value) = read_env_nonempty(BratsEnv::GitBinary)? {
            self.git_binary = value;
        }
        if let Some(raw) = read_env_nonempty(BratsEnv::Stacks)? {
            self.stacks = parse_list(BratsEnv::Stacks.as_str(), &raw)?
                .into_iter()
                .map(Stack::new)
                .collect();
        }
        if let Some(raw) = read_env_nonempty(BratsEnv::TimeoutSeconds)? {
            self.running_timeout = parse_timeout_seconds(BratsEnv::TimeoutSeconds.as_str(), &raw)?;
        }
        if let Some(raw) = read_env_nonempty(BratsEnv::PollIntervalMillis)? {
            self.poll_interval = Duration::from_millis(parse_positive(
                BratsEnv::PollIntervalMillis.as_str(),
                &raw,
            )?);
        }
        if let Some(value) = read_env_nonempty(BratsEnv::Memory)? {
            self.memory = value;
        }
        if let Some(value) = read_env_nonempty(BratsEnv::Disk)? {
            self.disk = value;
        }
        if let Some(value) = read_env_nonempty(BratsEnv::Packager)? {
            self.packager = value;
        }
        if let Some(raw) = read_env_nonempty(BratsEnv::Cached)? {
            self.cached = parse_bool(BratsEnv::Cached.as_str(), &raw)?;
        }
        if let Some(value) = read_env_nonempty(BratsEnv::RunRoot)? {
            self.run_root = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env_nonempty(BratsEnv::RouteScheme)? {
            self.route_scheme = value;
        }
        Ok(())
    }

    /// Checks cross-field constraints.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.stacks.is_empty() || self.stacks.iter().any(|stack| stack.as_str().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "stacks",
                message: "at least one non-empty stack is required".to_string(),
            });
        }
        if self.route_scheme != "http" && self.route_scheme != "https" {
            return Err(ConfigError::Invalid {
                field: "route_scheme",
                message: format!("expected http or https, got {}", self.route_scheme),
            });
        }
        if self.language.is_empty() || self.dependency.is_empty() {
            return Err(ConfigError::Invalid {
                field: "language",
                message: "language and dependency must not be empty".to_string(),
            });
        }
        if self.buildpack_branch.is_some() && self.buildpack_dir.is_some() {
            return Err(ConfigError::Invalid {
                field: "buildpack_branch",
                message: "set either a buildpack directory or a branch to clone, not both"
                    .to_string(),
            });
        }
        if self.buildpack_branch.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Invalid {
                field: "buildpack_branch",
                message: "branch must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Rejects zero for a numeric file setting.
fn nonzero(field: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field,
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
