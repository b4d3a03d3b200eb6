// system-tests/tests/suites/deploy_matrix.rs
// ============================================================================
// Module: Deploy Matrix Tests
// Description: Every shipped runtime version deploys and serves on each stack.
// Purpose: Confirm the buildpack installs the pinned runtime and the app runs.
// Dependencies: system-tests helpers
// ============================================================================

use crate::helpers;

#[test]
fn every_manifest_version_deploys_and_serves() -> Result<(), Box<dyn std::error::Error>> {
    helpers::run_suite("deploy_matrix", |runner| {
        runner.run_version_matrix();
        Ok(())
    })
}
