// crates/brats/src/scenario/mod.rs
// ============================================================================
// Module: Scenarios
// Description: Scenario identity, deployment sessions, buildpack groups, and
//              the runner sequencing them.
// Purpose: Run generate, install, deploy, assert, and teardown per scenario.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! A scenario deploys one generated app and asserts on it. Scenarios that
//! share a buildpack registration run inside a [`BuildpackGroup`], which
//! resets the registration on entry and removes it on close. Every app lives
//! in a [`DeployedApp`] session that deletes it exactly once, whatever way the
//! scenario ends.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod group;
pub mod runner;
pub mod session;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

use std::fmt;

pub use group::BuildpackGroup;
pub use group::GroupInstall;
pub use runner::ScenarioRunner;
pub use session::DeployedApp;
pub use session::with_deployed_app;
pub use session::with_session;

use crate::types::RuntimeVersion;
use crate::types::Stack;

// ============================================================================
// SECTION: Scenario Identity
// ============================================================================

/// Names a scenario in logs and failure output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioId {
    /// Buildpack language.
    language: String,
    /// Runtime version under test, once known.
    version: Option<RuntimeVersion>,
    /// Stack deployed against.
    stack: Stack,
    /// Scenario variant (for example `standard` or `startup script`).
    variant: String,
}

impl ScenarioId {
    /// Builds an identity without a runtime version.
    #[must_use]
    pub fn new(language: impl Into<String>, stack: Stack, variant: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            version: None,
            stack,
            variant: variant.into(),
        }
    }

    /// Attaches the runtime version under test.
    #[must_use]
    pub fn with_version(mut self, version: RuntimeVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Returns the runtime version, if set.
    #[must_use]
    pub const fn version(&self) -> Option<&RuntimeVersion> {
        self.version.as_ref()
    }

    /// Returns the stack.
    #[must_use]
    pub const fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Returns the variant label.
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(version) = &self.version {
            write!(f, " {version}")?;
        }
        write!(f, " on {} [{}]", self.stack, self.variant)
    }
}
