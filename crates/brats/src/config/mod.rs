// crates/brats/src/config/mod.rs
// ============================================================================
// Module: Suite Configuration
// Description: Centralized configuration for buildpack acceptance runs.
// Purpose: Provide typed access to platform, buildpack, and timing settings.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is read from an optional TOML file and then overlaid with
//! environment variables, mapped into [`BratsConfig`] for reuse by the
//! platform clients and the scenario runner.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod settings;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::BratsEnv;
pub use env::read_env_strict;
pub use settings::BratsConfig;
pub use settings::ConfigError;
pub use settings::DEFAULT_RUNNING_TIMEOUT;
