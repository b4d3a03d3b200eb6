// crates/brats/src/lib.rs
// ============================================================================
// Module: Buildpack Acceptance Suite Library
// Description: Scenario orchestration for buildpack runtime acceptance tests.
// Purpose: Generate sample apps, drive the platform CLI, and assert behavior.
// Dependencies: reqwest, serde, serde_yaml, tempfile, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate hosts the building blocks of the buildpack acceptance suite:
//! a sample-app template generator, a buildpack manifest lookup, platform
//! seams ([`DeploymentClient`], [`BuildpackManager`], [`HttpTransport`]) with
//! `cf` CLI and HTTP implementations, and a [`ScenarioRunner`] that sequences
//! generate, install, deploy, assert and teardown across runtime versions and
//! stacks.
//! Invariants:
//! - Every deployed app is deleted exactly once, on every exit path.
//! - Deploy readiness is bounded by a timeout; no wait blocks indefinitely.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod manifest;
pub mod platform;
pub mod readiness;
pub mod redaction;
pub mod report;
pub mod scenario;
pub mod telemetry;
pub mod template;
pub mod types;

#[cfg(test)]
mod testing;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use config::BratsConfig;
pub use error::GenerationError;
pub use error::ManifestError;
pub use error::PlatformError;
pub use error::ScenarioError;
pub use manifest::ManifestLookup;
pub use platform::BuildpackManager;
pub use platform::DeploymentClient;
pub use platform::HttpTransport;
pub use platform::browser::Browser;
pub use report::SuiteReport;
pub use scenario::ScenarioRunner;
pub use template::AppTemplate;
pub use template::TemplateGenerator;
pub use types::AppHandle;
pub use types::BuildpackName;
pub use types::CachingMode;
pub use types::RuntimeVersion;
pub use types::Stack;
