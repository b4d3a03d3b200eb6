// crates/brats/src/scenario/group.rs
// ============================================================================
// Module: Buildpack Groups
// Description: Group-scoped buildpack registration lifecycle.
// Purpose: Reset the shared registration before a group and remove it after.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! The registration under a buildpack's name is shared by every scenario in
//! a group. [`BuildpackGroup::establish`] removes any stale registration and
//! installs the requested variant once; [`BuildpackGroup::close`] removes it.
//! A group dropped without closing removes it best-effort.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::error::PlatformError;
use crate::platform::BuildpackManager;
use crate::types::BuildpackName;
use crate::types::CachingMode;

// ============================================================================
// SECTION: Install Variants
// ============================================================================

/// How a group installs its buildpack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupInstall {
    /// Package the current source as-is.
    Standard,
    /// Embed credentials in every dependency URI first.
    CredentialedUris(CachingMode),
    /// Suffix the buildpack version with a revision first.
    Revision(String),
}

impl fmt::Display for GroupInstall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::CredentialedUris(caching) => write!(f, "credentialed uris, {caching}"),
            Self::Revision(revision) => write!(f, "revision {revision}"),
        }
    }
}

// ============================================================================
// SECTION: Group
// ============================================================================

/// A buildpack registration owned by one scenario group.
pub struct BuildpackGroup<'a> {
    /// Registry the buildpack lives in.
    manager: &'a dyn BuildpackManager,
    /// Registered buildpack.
    buildpack: BuildpackName,
    /// Set once cleanup has been issued.
    closed: bool,
}

impl<'a> BuildpackGroup<'a> {
    /// Removes any existing registration, then installs `install`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when cleanup or install fails. A failed
    /// install is followed by a best-effort cleanup.
    pub fn establish(
        manager: &'a dyn BuildpackManager,
        buildpack: BuildpackName,
        install: &GroupInstall,
    ) -> Result<Self, PlatformError> {
        tracing::info!(buildpack = %buildpack, install = %install, "establishing buildpack group");
        manager.cleanup(&buildpack)?;
        let group = Self {
            manager,
            buildpack,
            closed: false,
        };
        match install {
            GroupInstall::Standard => manager.install(&group.buildpack)?,
            GroupInstall::CredentialedUris(caching) => {
                manager.install_with_credentialed_uris(&group.buildpack, *caching)?;
            }
            GroupInstall::Revision(revision) => {
                manager.install_revision(&group.buildpack, revision)?;
            }
        }
        Ok(group)
    }

    /// Returns the registered buildpack.
    #[must_use]
    pub const fn buildpack(&self) -> &BuildpackName {
        &self.buildpack
    }

    /// Removes the registration.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform rejects the removal.
    pub fn close(mut self) -> Result<(), PlatformError> {
        self.cleanup()
    }

    /// Issues the cleanup once.
    fn cleanup(&mut self) -> Result<(), PlatformError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.manager.cleanup(&self.buildpack)
    }
}

impl Drop for BuildpackGroup<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.cleanup() {
            tracing::warn!(buildpack = %self.buildpack, error = %err, "buildpack cleanup failed");
        }
    }
}
