// crates/brats/src/telemetry.rs
// ============================================================================
// Module: Telemetry
// Description: Tracing subscriber setup for suite runs.
// Purpose: Route suite events to stderr, filtered by `BRATS_LOG`.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Installs a fmt subscriber writing through the test harness writer so
//! output is captured per test. The filter comes from `BRATS_LOG` and falls
//! back to `info`. Calling [`init`] more than once is harmless.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_FILTER_ENV: &str = "BRATS_LOG";

/// Filter used when `BRATS_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber once.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A subscriber installed by an earlier test in the same binary wins.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
