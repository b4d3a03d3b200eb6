// system-tests/tests/suites/startup_script.rs
// ============================================================================
// Module: Startup Script Tests
// Description: `.profile` runs at startup and is never served.
// Purpose: Confirm the hook executes and the router refuses to expose it.
// Dependencies: system-tests helpers
// ============================================================================

use crate::helpers;

#[test]
fn profile_script_runs_and_returns_not_found() -> Result<(), Box<dyn std::error::Error>> {
    helpers::run_suite("startup_script", |runner| runner.run_startup_script())
}
