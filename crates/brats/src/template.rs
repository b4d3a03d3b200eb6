// crates/brats/src/template.rs
// ============================================================================
// Module: App Template Generator
// Description: Generates minimal sample apps pinned to a runtime version.
// Purpose: Produce a fresh, disposable source tree for every deploy.
// Dependencies: tempfile, walkdir
// ============================================================================

//! ## Overview
//! A [`TemplateGenerator`] renders template assets into a new temporary
//! directory owned by the returned [`AppTemplate`]. Assets are embedded (the
//! default Go web app) or read from a fixture directory; `{{ runtime_version }}`
//! is the only placeholder. The directory is removed when the template drops.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::GenerationError;
use crate::types::RuntimeVersion;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Body marker served by the default app at `/`.
pub const ROOT_BODY_MARKER: &str = "Hello, World";

/// Marker echoed by the default startup script.
pub const STARTUP_SCRIPT_MARKER: &str = "PROFILE_SCRIPT_IS_PRESENT_AND_RAN";

/// Startup script file name; staging sources it before the web process.
pub const STARTUP_SCRIPT_NAME: &str = ".profile";

/// Default startup script body.
pub const DEFAULT_STARTUP_SCRIPT: &str =
    "#!/usr/bin/env bash\n\necho PROFILE_SCRIPT_IS_PRESENT_AND_RAN\n";

/// Placeholder replaced with the runtime version.
const VERSION_PLACEHOLDER: &str = "runtime_version";

/// Embedded Go web app assets.
const GO_ASSETS: &[(&str, &str)] = &[
    ("main.go", include_str!("../templates/go/main.go")),
    ("Godeps/Godeps.json", include_str!("../templates/go/Godeps/Godeps.json")),
    ("Procfile", include_str!("../templates/go/Procfile")),
];

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Source of template assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateAssets {
    /// Assets compiled into the crate.
    Embedded(&'static [(&'static str, &'static str)]),
    /// Assets read from a fixture directory at generation time.
    Directory(PathBuf),
}

/// Renders sample apps for a runtime version.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    /// Where assets come from.
    assets: TemplateAssets,
}

impl TemplateGenerator {
    /// Generator for the embedded Go web app.
    #[must_use]
    pub const fn go() -> Self {
        Self {
            assets: TemplateAssets::Embedded(GO_ASSETS),
        }
    }

    /// Generator reading assets from a fixture directory.
    #[must_use]
    pub fn from_fixture(dir: impl Into<PathBuf>) -> Self {
        Self {
            assets: TemplateAssets::Directory(dir.into()),
        }
    }

    /// Generates a fresh app tree for `version`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when the fixture directory is missing, an
    /// asset uses an unknown placeholder, or files cannot be written.
    pub fn generate(&self, version: &RuntimeVersion) -> Result<AppTemplate, GenerationError> {
        let dir = tempfile::Builder::new().prefix("brats-app-").tempdir().map_err(|source| {
            GenerationError::Io {
                path: std::env::temp_dir(),
                source,
            }
        })?;
        match &self.assets {
            TemplateAssets::Embedded(assets) => {
                for (relative, contents) in *assets {
                    write_asset(dir.path(), relative, contents, version)?;
                }
            }
            TemplateAssets::Directory(root) => {
                if !root.is_dir() {
                    return Err(GenerationError::MissingAssets {
                        path: root.clone(),
                    });
                }
                copy_fixture(root, dir.path(), version)?;
            }
        }
        tracing::debug!(version = %version, path = %dir.path().display(), "generated app template");
        Ok(AppTemplate {
            dir,
            version: version.clone(),
            startup_script: None,
        })
    }
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::go()
    }
}

// ============================================================================
// SECTION: App Template
// ============================================================================

/// A generated app on disk, removed when dropped.
#[derive(Debug)]
pub struct AppTemplate {
    /// Owned temporary directory holding the app.
    dir: TempDir,
    /// Runtime version the app is pinned to.
    version: RuntimeVersion,
    /// Startup script path, once attached.
    startup_script: Option<PathBuf>,
}

impl AppTemplate {
    /// Returns the app root directory.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the pinned runtime version.
    #[must_use]
    pub const fn version(&self) -> &RuntimeVersion {
        &self.version
    }

    /// Returns the attached startup script path, if any.
    #[must_use]
    pub fn startup_script(&self) -> Option<&Path> {
        self.startup_script.as_deref()
    }

    /// Writes an executable `.profile` at the app root.
    ///
    /// Staging runs it before the web process starts. The file stays at the
    /// app root, so `/.profile` is the path a probe uses to check the router
    /// refuses to serve it.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Io`] when the file cannot be written or made
    /// executable.
    pub fn attach_startup_script(&mut self, body: &str) -> Result<&Path, GenerationError> {
        let path = self.dir.path().join(STARTUP_SCRIPT_NAME);
        fs::write(&path, body).map_err(|source| GenerationError::Io {
            path: path.clone(),
            source,
        })?;
        make_executable(&path)?;
        Ok(self.startup_script.insert(path).as_path())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders and writes one asset under `root`.
fn write_asset(
    root: &Path,
    relative: &str,
    contents: &str,
    version: &RuntimeVersion,
) -> Result<(), GenerationError> {
    let rendered = render(relative, contents, version)?;
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| GenerationError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, rendered).map_err(|source| GenerationError::Io {
        path,
        source,
    })
}

/// Copies and renders every file of a fixture directory.
fn copy_fixture(
    source_root: &Path,
    target_root: &Path,
    version: &RuntimeVersion,
) -> Result<(), GenerationError> {
    for entry in WalkDir::new(source_root).min_depth(1) {
        let entry = entry.map_err(|err| GenerationError::Io {
            path: err.path().map_or_else(|| source_root.to_path_buf(), Path::to_path_buf),
            source: err.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(source_root).unwrap_or(entry.path());
        let contents = fs::read_to_string(entry.path()).map_err(|source| GenerationError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        write_asset(target_root, &relative.to_string_lossy(), &contents, version)?;
    }
    Ok(())
}

/// Replaces `{{ runtime_version }}` placeholders.
fn render(asset: &str, contents: &str, version: &RuntimeVersion) -> Result<String, GenerationError> {
    let mut out = String::with_capacity(contents.len());
    let mut rest = contents;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = after[..end].trim();
        if name != VERSION_PLACEHOLDER {
            return Err(GenerationError::UnresolvedPlaceholder {
                asset: asset.to_string(),
                name: name.to_string(),
            });
        }
        out.push_str(version.as_str());
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Sets `0755` on the script.
#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), GenerationError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
        GenerationError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Non-unix hosts have no executable bit; the platform applies file modes.
#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), GenerationError> {
    Ok(())
}
