// crates/brats/src/platform/buildpacks.rs
// ============================================================================
// Module: cf Buildpack Manager
// Description: Packages buildpack sources and registers them with `cf`.
// Purpose: Give each scenario group a known buildpack registration.
// Dependencies: serde_yaml, tempfile, walkdir, tracing
// ============================================================================

//! ## Overview
//! Every install stages a private copy of the buildpack source, optionally
//! edits it (credentialed dependency URIs, bumped `VERSION`), runs the
//! packager CLI in the copy, and registers the produced zip:
//! `cf create-buildpack <name> <zip> 100 --enable`.
//! The source directory itself is never modified.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use walkdir::WalkDir;

use super::BuildpackManager;
use super::command::CommandRunner;
use super::command::Invocation;
use super::command::SystemCommandRunner;
use super::command::run_checked;
use crate::config::BratsConfig;
use crate::error::ManifestError;
use crate::error::PlatformError;
use crate::manifest::MANIFEST_FILE;
use crate::redaction::CredentialFixture;
use crate::types::BuildpackName;
use crate::types::CachingMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Position given to registered buildpacks.
const BUILDPACK_POSITION: &str = "100";

/// Buildpack version file.
const VERSION_FILE: &str = "VERSION";

/// Manifest key holding a dependency download URI.
const URI_KEY: &str = "uri:";

// ============================================================================
// SECTION: Manager
// ============================================================================

/// [`BuildpackManager`] backed by `cf` and the buildpack packager.
#[derive(Debug)]
pub struct CfBuildpackManager<R = SystemCommandRunner> {
    /// Process runner.
    runner: R,
    /// `cf` binary.
    cf_binary: String,
    /// Packager binary.
    packager: String,
    /// Buildpack source directory.
    source_dir: PathBuf,
    /// Caching mode for standard installs.
    caching: CachingMode,
    /// Credentials injected by credentialed installs.
    credentials: CredentialFixture,
}

impl CfBuildpackManager<SystemCommandRunner> {
    /// Builds a manager running real `cf` and packager processes.
    #[must_use]
    pub fn from_config(config: &BratsConfig, source_dir: impl Into<PathBuf>) -> Self {
        Self::with_runner(SystemCommandRunner, config, source_dir)
    }
}

impl<R: CommandRunner> CfBuildpackManager<R> {
    /// Builds a manager over a custom runner.
    #[must_use]
    pub fn with_runner(runner: R, config: &BratsConfig, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            cf_binary: config.cf_binary.clone(),
            packager: config.packager.clone(),
            source_dir: source_dir.into(),
            caching: if config.cached { CachingMode::Cached } else { CachingMode::Uncached },
            credentials: CredentialFixture::default(),
        }
    }

    /// Overrides the injected credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialFixture) -> Self {
        self.credentials = credentials;
        self
    }

    /// Copies the buildpack source into a fresh directory.
    fn stage_source(&self) -> Result<TempDir, PlatformError> {
        let staged = tempfile::Builder::new().prefix("brats-buildpack-").tempdir().map_err(
            |source| PlatformError::Io {
                path: std::env::temp_dir(),
                source,
            },
        )?;
        copy_tree(&self.source_dir, staged.path())?;
        Ok(staged)
    }

    /// Packages a staged source and registers the zip.
    fn package_and_register(
        &self,
        staged: &Path,
        buildpack: &BuildpackName,
        caching: CachingMode,
    ) -> Result<(), PlatformError> {
        let mut args = vec!["build".to_string()];
        if caching == CachingMode::Cached {
            args.push("--cached".to_string());
        }
        let invocation = Invocation::new(&self.packager, args).current_dir(staged);
        run_checked(&self.runner, &invocation)?;
        let zip = find_zip(staged).ok_or_else(|| PlatformError::UnexpectedOutput {
            command: invocation.to_string(),
            detail: format!("no buildpack zip produced in {}", staged.display()),
        })?;
        let registration = buildpack.registration();
        let zip_path = zip.to_string_lossy();
        tracing::info!(buildpack = %registration, caching = %caching, "registering buildpack");
        run_checked(
            &self.runner,
            &Invocation::new(&self.cf_binary, [
                "create-buildpack",
                registration.as_str(),
                &*zip_path,
                BUILDPACK_POSITION,
                "--enable",
            ]),
        )?;
        Ok(())
    }
}

impl<R: CommandRunner> BuildpackManager for CfBuildpackManager<R> {
    fn cleanup(&self, buildpack: &BuildpackName) -> Result<(), PlatformError> {
        let registration = buildpack.registration();
        tracing::info!(buildpack = %registration, "removing buildpack");
        run_checked(
            &self.runner,
            &Invocation::new(&self.cf_binary, ["delete-buildpack", registration.as_str(), "-f"]),
        )
        .map(|_| ())
    }

    fn install(&self, buildpack: &BuildpackName) -> Result<(), PlatformError> {
        let staged = self.stage_source()?;
        self.package_and_register(staged.path(), buildpack, self.caching)
    }

    fn install_with_credentialed_uris(
        &self,
        buildpack: &BuildpackName,
        caching: CachingMode,
    ) -> Result<(), PlatformError> {
        let staged = self.stage_source()?;
        inject_manifest_credentials(&staged.path().join(MANIFEST_FILE), &self.credentials)?;
        self.package_and_register(staged.path(), buildpack, caching)
    }

    fn install_revision(
        &self,
        buildpack: &BuildpackName,
        revision: &str,
    ) -> Result<(), PlatformError> {
        let staged = self.stage_source()?;
        bump_version(&staged.path().join(VERSION_FILE), revision)?;
        self.package_and_register(staged.path(), buildpack, self.caching)
    }
}

// ============================================================================
// SECTION: Source Editing
// ============================================================================

/// Rewrites every `https://` dependency URI in a manifest with credentials.
///
/// Only the value of each `uri:` key changes; every other byte of the
/// manifest is kept, so untyped scalars such as `version: 1.10` survive.
///
/// # Errors
///
/// Returns [`PlatformError`] when the manifest cannot be read, is not valid
/// YAML, or cannot be written back.
pub fn inject_manifest_credentials(
    manifest: &Path,
    credentials: &CredentialFixture,
) -> Result<(), PlatformError> {
    let raw = fs::read_to_string(manifest).map_err(|source| ManifestError::Read {
        path: manifest.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str::<serde_yaml::Value>(&raw).map_err(|err| ManifestError::Parse {
        path: manifest.to_path_buf(),
        message: err.to_string(),
    })?;
    let mut rendered = String::with_capacity(raw.len());
    let mut injected = 0usize;
    for line in raw.split_inclusive('\n') {
        let body = line.trim_end_matches(['\r', '\n']);
        let ending = &line[body.len()..];
        match inject_uri_line(body, credentials) {
            Some(rewritten) => {
                injected += 1;
                rendered.push_str(&rewritten);
            }
            None => rendered.push_str(body),
        }
        rendered.push_str(ending);
    }
    tracing::debug!(manifest = %manifest.display(), injected, "injected dependency credentials");
    fs::write(manifest, rendered).map_err(|source| PlatformError::Io {
        path: manifest.to_path_buf(),
        source,
    })
}

/// Rewrites a `uri: https://...` line (optionally a `- ` list item, optionally
/// quoted); returns `None` for any other line.
fn inject_uri_line(line: &str, credentials: &CredentialFixture) -> Option<String> {
    let key_at = line.find(URI_KEY)?;
    let prefix = &line[..key_at];
    if !prefix.trim_start_matches([' ', '\t', '-']).is_empty() {
        return None;
    }
    let after_key = &line[key_at + URI_KEY.len()..];
    let value = after_key.trim_start();
    let spacing = &after_key[..after_key.len() - value.len()];
    let (quote, unquoted) = match value.as_bytes().first() {
        Some(b'"' | b'\'') => value.split_at(1),
        _ => ("", value),
    };
    if !unquoted.starts_with("https://") {
        return None;
    }
    Some(format!("{prefix}{URI_KEY}{spacing}{quote}{}", credentials.inject(unquoted)))
}

/// Suffixes the buildpack version so the platform sees a version change.
///
/// A missing `VERSION` file counts as `0.0.0`.
///
/// # Errors
///
/// Returns [`PlatformError::Io`] when the file exists but cannot be read, or
/// cannot be written.
pub fn bump_version(version_file: &Path, revision: &str) -> Result<(), PlatformError> {
    let current = match fs::read_to_string(version_file) {
        Ok(current) => current,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(PlatformError::Io {
                path: version_file.to_path_buf(),
                source,
            });
        }
    };
    let current = current.trim();
    let base = if current.is_empty() { "0.0.0" } else { current };
    fs::write(version_file, format!("{base}+{revision}\n")).map_err(|source| PlatformError::Io {
        path: version_file.to_path_buf(),
        source,
    })
}

/// Copies `from` into `to`, skipping VCS metadata and previously built zips.
fn copy_tree(from: &Path, to: &Path) -> Result<(), PlatformError> {
    if !from.is_dir() {
        return Err(PlatformError::Io {
            path: from.to_path_buf(),
            source: std::io::Error::new(
                ErrorKind::NotFound,
                "buildpack source directory missing",
            ),
        });
    }
    let walker = WalkDir::new(from).min_depth(1).into_iter().filter_entry(|entry| {
        entry.file_name() != ".git"
            && !(entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "zip"))
    });
    for entry in walker {
        let entry = entry.map_err(|err| PlatformError::Io {
            path: err.path().map_or_else(|| from.to_path_buf(), Path::to_path_buf),
            source: err.into(),
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        let io_err = |source| PlatformError::Io {
            path: target.clone(),
            source,
        };
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_err)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).map_err(io_err)?;
        }
    }
    Ok(())
}

/// Returns the most recently modified zip directly under `dir`.
fn find_zip(dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "zip"))
        .max_by_key(|path| fs::metadata(path).and_then(|meta| meta.modified()).ok())
}

#[cfg(test)]
mod buildpacks_tests;
