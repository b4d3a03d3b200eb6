// crates/brats/src/manifest.rs
// ============================================================================
// Module: Buildpack Manifest Lookup
// Description: Reads dependency versions from a buildpack's manifest.yml.
// Purpose: Drive the version matrix from what the buildpack actually ships.
// Dependencies: serde, serde_yaml
// ============================================================================

//! ## Overview
//! The buildpack source directory carries `manifest.yml`, listing every
//! dependency version and the stacks it supports. [`ManifestLookup`] filters
//! that list per stack and returns versions in ascending order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::config::BratsConfig;
use crate::error::ManifestError;
use crate::types::RuntimeVersion;
use crate::types::Stack;

// ============================================================================
// SECTION: Manifest Schema
// ============================================================================

/// File name of the buildpack manifest.
pub const MANIFEST_FILE: &str = "manifest.yml";

/// Subset of `manifest.yml` the suite reads.
#[derive(Debug, Clone, Deserialize)]
struct ManifestFile {
    /// Buildpack language.
    #[serde(default)]
    language: Option<String>,
    /// Shipped dependencies.
    #[serde(default)]
    dependencies: Vec<ManifestDependency>,
}

/// One dependency entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestDependency {
    /// Dependency name (for example `go`).
    pub name: String,
    /// Dependency version token.
    pub version: String,
    /// Download URI.
    #[serde(default)]
    pub uri: Option<String>,
    /// Stacks the dependency is built for.
    #[serde(default)]
    pub cf_stacks: Vec<String>,
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Manifest reader bound to one buildpack source directory.
#[derive(Debug, Clone)]
pub struct ManifestLookup {
    /// Buildpack source directory.
    buildpack_dir: PathBuf,
}

impl ManifestLookup {
    /// Binds a lookup to a buildpack directory.
    #[must_use]
    pub fn new(buildpack_dir: impl Into<PathBuf>) -> Self {
        Self {
            buildpack_dir: buildpack_dir.into(),
        }
    }

    /// Resolves the buildpack directory from config or the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::BuildpackDirNotFound`] when no directory is
    /// configured and none named `<language>-buildpack` exists at or above
    /// the working directory.
    pub fn locate(config: &BratsConfig) -> Result<Self, ManifestError> {
        if let Some(dir) = &config.buildpack_dir {
            return Ok(Self::new(dir.clone()));
        }
        let cwd = std::env::current_dir()
            .map_err(|_| ManifestError::BuildpackDirNotFound(config.language.clone()))?;
        find_buildpack_dir(&cwd, &config.language).map(Self::new)
    }

    /// Returns the buildpack source directory.
    #[must_use]
    pub fn buildpack_dir(&self) -> &Path {
        &self.buildpack_dir
    }

    /// Returns the manifest path.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.buildpack_dir.join(MANIFEST_FILE)
    }

    /// Returns ascending, de-duplicated versions of `dependency` for `stack`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the manifest is unreadable, belongs to a
    /// different language, or lists a malformed version.
    pub fn dependency_versions(
        &self,
        language: &str,
        dependency: &str,
        stack: &Stack,
    ) -> Result<Vec<RuntimeVersion>, ManifestError> {
        let manifest = self.load()?;
        if let Some(declared) = &manifest.language
            && declared != language
        {
            return Err(ManifestError::Parse {
                path: self.manifest_path(),
                message: format!("manifest is for {declared}, not {language}"),
            });
        }
        let mut versions = manifest
            .dependencies
            .iter()
            .filter(|dep| dep.name == dependency)
            .filter(|dep| dep.cf_stacks.iter().any(|candidate| candidate == stack.as_str()))
            .map(|dep| RuntimeVersion::parse(&dep.version))
            .collect::<Result<Vec<_>, _>>()?;
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    /// Returns the download URI of a specific dependency version on `stack`.
    ///
    /// Manifests list one entry per stack for the same version, each with its
    /// own tarball, so the stack is part of the key.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::UnknownDependency`] when no entry for the
    /// version lists `stack` or the entry has no URI.
    pub fn dependency_uri(
        &self,
        dependency: &str,
        version: &RuntimeVersion,
        stack: &Stack,
    ) -> Result<String, ManifestError> {
        self.load()?
            .dependencies
            .into_iter()
            .filter(|dep| dep.name == dependency && dep.version.trim() == version.as_str())
            .find(|dep| dep.cf_stacks.iter().any(|candidate| candidate == stack.as_str()))
            .and_then(|dep| dep.uri)
            .ok_or_else(|| ManifestError::UnknownDependency {
                dependency: dependency.to_string(),
                version: format!("{version} ({stack})"),
            })
    }

    /// Reads and parses the manifest.
    fn load(&self) -> Result<ManifestFile, ManifestError> {
        let path = self.manifest_path();
        let raw = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|err| ManifestError::Parse {
            path,
            message: err.to_string(),
        })
    }
}

/// Walks from `start` toward the filesystem root looking for
/// `<language>-buildpack`.
///
/// # Errors
///
/// Returns [`ManifestError::BuildpackDirNotFound`] when the root is reached.
pub fn find_buildpack_dir(start: &Path, language: &str) -> Result<PathBuf, ManifestError> {
    let name = format!("{language}-buildpack");
    start
        .ancestors()
        .map(|dir| dir.join(&name))
        .find(|candidate| candidate.is_dir())
        .ok_or_else(|| ManifestError::BuildpackDirNotFound(language.to_string()))
}

#[cfg(test)]
mod manifest_tests;
