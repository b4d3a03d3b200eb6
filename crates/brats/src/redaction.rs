// crates/brats/src/redaction.rs
// ============================================================================
// Module: Credential Redaction Fixtures
// Description: Credentialed dependency URIs and their expected log forms.
// Purpose: Check staging logs never leak dependency URI credentials.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`CredentialFixture`] injects a known `user:password` pair into the
//! buildpack's dependency URIs. The buildpack under test must log those URIs
//! with both parts replaced by `-redacted-`. Uncached buildpacks log URIs;
//! cached buildpacks log local file paths derived from them, with `:` and `/`
//! replaced by `_`. The suite only matches these fixed forms and never
//! reproduces the buildpack's general redaction rules.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::types::CachingMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Replacement the buildpack uses for each credential part.
pub const REDACTED: &str = "-redacted-";

/// URI scheme the credentials are injected after.
const HTTPS_SCHEME: &str = "https://";

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Credential pair used as a negative-match fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFixture {
    /// User part.
    username: String,
    /// Password part.
    password: String,
}

impl Default for CredentialFixture {
    fn default() -> Self {
        Self::new("login", "password")
    }
}

impl CredentialFixture {
    /// Builds a fixture from a user/password pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Embeds the credentials into an `https://` URI.
    ///
    /// Other schemes are returned unchanged.
    #[must_use]
    pub fn inject(&self, uri: &str) -> String {
        uri.strip_prefix(HTTPS_SCHEME).map_or_else(
            || uri.to_string(),
            |rest| format!("{HTTPS_SCHEME}{}:{}@{rest}", self.username, self.password),
        )
    }

    /// Returns the marker that must never appear in logs for `caching`.
    ///
    /// Uncached: `https://user:password@`. Cached: `https___user_password`.
    #[must_use]
    pub fn leaked_marker(&self, caching: CachingMode) -> String {
        match caching {
            CachingMode::Uncached => {
                format!("{HTTPS_SCHEME}{}:{}@", self.username, self.password)
            }
            CachingMode::Cached => {
                path_encode(&format!("{HTTPS_SCHEME}{}:{}", self.username, self.password))
            }
        }
    }

    /// Returns the redacted form of `dependency_uri` expected in logs.
    ///
    /// `dependency_uri` is the credential-free URI from the manifest.
    #[must_use]
    pub fn redacted_form(dependency_uri: &str, caching: CachingMode) -> String {
        let redacted = dependency_uri.strip_prefix(HTTPS_SCHEME).map_or_else(
            || dependency_uri.to_string(),
            |rest| format!("{HTTPS_SCHEME}{REDACTED}:{REDACTED}@{rest}"),
        );
        match caching {
            CachingMode::Uncached => redacted,
            CachingMode::Cached => path_encode(&redacted),
        }
    }
}

/// Encodes a URI the way cached buildpacks name dependency files.
#[must_use]
pub fn path_encode(uri: &str) -> String {
    uri.replace([':', '/'], "_")
}
