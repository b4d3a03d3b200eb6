// system-tests/src/lib.rs
// ============================================================================
// Module: Buildpack Acceptance System Tests Library
// Description: Live collaborators for suites run against a real platform.
// Purpose: Build the `cf`, packager, and HTTP clients from configuration.
// Dependencies: brats, thiserror
// ============================================================================

//! ## Overview
//! This crate hosts the live-platform wiring used by the suites in
//! `system-tests/tests`. Suites are compiled only with the `system-tests`
//! feature because they need a logged-in `cf` CLI and a buildpack checkout.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod live;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use live::LivePlatform;
pub use live::LiveSetupError;
