// system-tests/tests/suites/upgrade_warning.rs
// ============================================================================
// Module: Upgrade Warning Tests
// Description: Restaging with a newer buildpack version warns once.
// Purpose: Confirm the version-change warning tracks the buildpack in use.
// Dependencies: system-tests helpers
// ============================================================================

use crate::helpers;

#[test]
fn restaging_with_newer_buildpack_warns() -> Result<(), Box<dyn std::error::Error>> {
    helpers::run_suite("upgrade_warning", |runner| runner.run_upgrade_warning())
}
