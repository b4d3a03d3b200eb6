// system-tests/tests/suites/credential_redaction.rs
// ============================================================================
// Module: Credential Redaction Tests
// Description: Credentialed dependency URIs never reach staging logs.
// Purpose: Confirm both buildpack packagings log only redacted URIs.
// Dependencies: system-tests helpers
// ============================================================================

use brats::CachingMode;

use crate::helpers;

#[test]
fn uncached_buildpack_redacts_dependency_credentials() -> Result<(), Box<dyn std::error::Error>> {
    helpers::run_suite("credential_redaction_uncached", |runner| {
        runner.run_credential_redaction(CachingMode::Uncached)
    })
}

#[test]
fn cached_buildpack_redacts_dependency_credentials() -> Result<(), Box<dyn std::error::Error>> {
    helpers::run_suite("credential_redaction_cached", |runner| {
        runner.run_credential_redaction(CachingMode::Cached)
    })
}
