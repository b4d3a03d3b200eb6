// crates/brats/src/types.rs
// ============================================================================
// Module: Domain Types
// Description: Identifiers shared by the generator, platform, and runner.
// Purpose: Keep versions, stacks, and app/buildpack names strongly typed.
// Dependencies: rand, serde
// ============================================================================

//! ## Overview
//! Small validated newtypes. Runtime versions order by dotted numeric
//! components so manifest lookups yield ascending versions; app handles are
//! unique, route-safe platform app names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ManifestError;

// ============================================================================
// SECTION: Runtime Version
// ============================================================================

/// Version token of the language runtime under test (for example `1.8.3`).
///
/// # Invariants
/// - Non-empty, no whitespace.
/// - Ordering compares dot-separated segments numerically when both segments
///   are numeric, lexically otherwise; a shorter prefix sorts first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuntimeVersion(String);

impl RuntimeVersion {
    /// Validates and wraps a version token.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::InvalidVersion`] when the token is empty or
    /// contains whitespace.
    pub fn parse(raw: &str) -> Result<Self, ManifestError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(ManifestError::InvalidVersion(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the version token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the version with dots replaced, usable inside app names.
    #[must_use]
    pub fn slug(&self) -> String {
        self.0.replace(['.', '+', '_'], "-")
    }
}

impl TryFrom<String> for RuntimeVersion {
    type Error = ManifestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RuntimeVersion> for String {
    fn from(value: RuntimeVersion) -> Self {
        value.0
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialOrd for RuntimeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RuntimeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.0.split('.');
        let mut right = other.0.split('.');
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => {
                    let ordering = compare_segment(a, b);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
            }
        }
    }
}

/// Compares one version segment, numerically when both sides are numbers.
fn compare_segment(left: &str, right: &str) -> Ordering {
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => left.cmp(right),
    }
}

// ============================================================================
// SECTION: Stack
// ============================================================================

/// Platform root filesystem identifier (for example `cflinuxfs2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stack(String);

impl Stack {
    /// Wraps a stack identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the stack identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Buildpack Identity
// ============================================================================

/// Caching mode of a packaged buildpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachingMode {
    /// Dependencies bundled into the buildpack zip at package time.
    Cached,
    /// Dependencies downloaded during staging.
    Uncached,
}

impl CachingMode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Uncached => "uncached",
        }
    }
}

impl fmt::Display for CachingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buildpack identity under test.
///
/// # Invariants
/// - The registration name is fixed per language and variant so cleanup and
///   install always address the same platform buildpack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildpackName {
    /// Buildpack language (for example `go`).
    language: String,
    /// Optional variant for side-by-side registrations.
    variant: Option<String>,
}

impl BuildpackName {
    /// Builds the primary buildpack identity for a language.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            variant: None,
        }
    }

    /// Returns a side-by-side identity for the same language.
    #[must_use]
    pub fn with_variant(&self, variant: impl Into<String>) -> Self {
        Self {
            language: self.language.clone(),
            variant: Some(variant.into()),
        }
    }

    /// Returns the buildpack language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the name the buildpack is registered under on the platform.
    #[must_use]
    pub fn registration(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{}-brat-{variant}-buildpack", self.language),
            None => format!("{}-brat-buildpack", self.language),
        }
    }
}

impl fmt::Display for BuildpackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.registration())
    }
}

// ============================================================================
// SECTION: App Handle
// ============================================================================

/// Name of an app pushed to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AppHandle(String);

impl AppHandle {
    /// Allocates a unique app name for a language/version pair.
    #[must_use]
    pub fn allocate(language: &str, version: &RuntimeVersion) -> Self {
        let suffix: u32 = rand::random();
        Self(format!("brats-{language}-{}-{suffix:08x}", version.slug()))
    }

    /// Wraps an existing app name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the platform app name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
