// system-tests/src/live.rs
// ============================================================================
// Module: Live Platform
// Description: Real collaborators resolved from suite configuration.
// Purpose: Give each suite a runner wired to `cf`, the packager, and HTTP.
// Dependencies: brats, thiserror
// ============================================================================

//! ## Overview
//! [`LivePlatform::from_env`] loads [`BratsConfig`], locates the buildpack
//! checkout (or clones the configured branch into a scratch directory), and
//! constructs the `cf`-backed deployment client, buildpack
//! manager, and reqwest transport. [`LivePlatform::runner`] borrows them for
//! one suite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use brats::BratsConfig;
use brats::ManifestError;
use brats::ManifestLookup;
use brats::PlatformError;
use brats::ScenarioRunner;
use brats::config::ConfigError;
use brats::platform::browser::ReqwestTransport;
use brats::platform::buildpacks::CfBuildpackManager;
use brats::platform::cf::CfDeploymentClient;
use brats::platform::command::SystemCommandRunner;
use brats::platform::git::BranchCheckout;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures wiring the live collaborators.
#[derive(Debug, Error)]
pub enum LiveSetupError {
    /// Configuration could not be loaded.
    #[error("system-test config invalid: {0}")]
    Config(#[from] ConfigError),
    /// Buildpack checkout could not be located.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    /// HTTP client could not be built, or the branch clone failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

// ============================================================================
// SECTION: Live Platform
// ============================================================================

/// Collaborators talking to a real platform.
pub struct LivePlatform {
    /// Loaded configuration.
    config: BratsConfig,
    /// `cf` deployment client.
    platform: CfDeploymentClient,
    /// `cf` and packager backed buildpack manager.
    buildpacks: CfBuildpackManager,
    /// Route prober.
    transport: ReqwestTransport,
    /// Manifest of the buildpack checkout.
    manifest: ManifestLookup,
    /// Scratch clone when a branch was requested; removed on drop.
    checkout: Option<BranchCheckout>,
}

impl LivePlatform {
    /// Loads configuration from the environment and builds collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`LiveSetupError`] when config is invalid, the buildpack
    /// checkout cannot be found, or the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, LiveSetupError> {
        Self::from_config(BratsConfig::load()?)
    }

    /// Builds collaborators for an already-loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LiveSetupError`] when the buildpack checkout cannot be found
    /// or cloned, or the HTTP client cannot be built.
    pub fn from_config(config: BratsConfig) -> Result<Self, LiveSetupError> {
        let checkout = match &config.buildpack_branch {
            Some(branch) => Some(BranchCheckout::clone_branch(
                &SystemCommandRunner,
                &config.git_binary,
                &config.buildpack_repo_url(),
                branch,
                &config.language,
            )?),
            None => None,
        };
        let manifest = match &checkout {
            Some(checkout) => ManifestLookup::new(checkout.dir()),
            None => ManifestLookup::locate(&config)?,
        };
        tracing::info!(
            buildpack_dir = %manifest.buildpack_dir().display(),
            stacks = config.stacks.len(),
            "resolved buildpack checkout"
        );
        Ok(Self {
            platform: CfDeploymentClient::from_config(&config),
            buildpacks: CfBuildpackManager::from_config(&config, manifest.buildpack_dir()),
            transport: ReqwestTransport::new()?,
            manifest,
            checkout,
            config,
        })
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &BratsConfig {
        &self.config
    }

    /// Returns the head commit when the buildpack was cloned from a branch.
    #[must_use]
    pub fn buildpack_commit(&self) -> Option<&str> {
        self.checkout.as_ref().map(BranchCheckout::commit)
    }

    /// Returns a runner borrowing these collaborators.
    #[must_use]
    pub fn runner(&self) -> ScenarioRunner<'_> {
        ScenarioRunner::new(
            &self.config,
            &self.platform,
            &self.buildpacks,
            &self.transport,
            self.manifest.clone(),
        )
    }
}
