// crates/brats/src/platform/git.rs
// ============================================================================
// Module: Branch Checkout
// Description: Shallow single-branch clone of the buildpack repository.
// Purpose: Test a named branch without a pre-existing local checkout.
// Dependencies: tempfile, tracing
// ============================================================================

//! ## Overview
//! [`BranchCheckout::clone_branch`] runs
//! `git clone --depth 1 --single-branch --branch <branch> <repo> <dir>` into a
//! fresh scratch directory and records the head commit. The directory is
//! removed when the checkout is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

use super::command::CommandRunner;
use super::command::Invocation;
use super::command::run_checked;
use crate::error::PlatformError;

// ============================================================================
// SECTION: Checkout
// ============================================================================

/// Scratch clone of one buildpack branch.
#[derive(Debug)]
pub struct BranchCheckout {
    /// Scratch root; owns the clone.
    root: TempDir,
    /// Clone directory, named `<language>-buildpack`.
    dir: PathBuf,
    /// Branch that was cloned.
    branch: String,
    /// Head commit of the clone.
    commit: String,
}

impl BranchCheckout {
    /// Clones `branch` of `repo` into a scratch `<language>-buildpack`
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] when the scratch directory cannot be
    /// created, [`PlatformError::CommandFailed`] when git fails, and
    /// [`PlatformError::UnexpectedOutput`] when the head commit is blank.
    pub fn clone_branch<R: CommandRunner + ?Sized>(
        runner: &R,
        git_binary: &str,
        repo: &str,
        branch: &str,
        language: &str,
    ) -> Result<Self, PlatformError> {
        let root = tempfile::Builder::new().prefix("brats-checkout-").tempdir().map_err(
            |source| PlatformError::Io {
                path: std::env::temp_dir(),
                source,
            },
        )?;
        let dir = root.path().join(format!("{language}-buildpack"));
        let target = dir.to_string_lossy().into_owned();
        run_checked(
            runner,
            &Invocation::new(
                git_binary,
                [
                    "clone",
                    "--depth",
                    "1",
                    "--single-branch",
                    "--branch",
                    branch,
                    repo,
                    target.as_str(),
                ],
            ),
        )?;
        let head = Invocation::new(git_binary, ["-C", target.as_str(), "rev-parse", "HEAD"]);
        let output = run_checked(runner, &head)?;
        let commit = output.stdout.trim().to_string();
        if commit.is_empty() {
            return Err(PlatformError::UnexpectedOutput {
                command: head.to_string(),
                detail: "no head commit".to_string(),
            });
        }
        tracing::info!(repo, branch, commit = %commit, "cloned buildpack branch");
        Ok(Self {
            root,
            dir,
            branch: branch.to_string(),
            commit,
        })
    }

    /// Returns the cloned buildpack directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the cloned branch.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the head commit.
    #[must_use]
    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Returns the scratch root holding the clone.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.path()
    }
}
