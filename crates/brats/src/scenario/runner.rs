// crates/brats/src/scenario/runner.rs
// ============================================================================
// Module: Scenario Runner
// Description: Sequences buildpack groups and scenarios against a platform.
// Purpose: Assert runtime behavior across versions and stacks, plus
//          credential redaction, startup script, and upgrade edge cases.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! Scenarios run one at a time. Each records a
//! [`ScenarioOutcome`](crate::report::ScenarioOutcome) in the runner's
//! [`SuiteReport`]. A failure that leaves the group's buildpack registration
//! suspect (platform or manifest errors) stops the rest of that group and is
//! recorded as an abort; assertion failures and timeouts do not.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use crate::config::BratsConfig;
use crate::error::ManifestError;
use crate::error::ScenarioError;
use crate::manifest::ManifestLookup;
use crate::platform::BuildpackManager;
use crate::platform::DeployRequest;
use crate::platform::DeploymentClient;
use crate::platform::HttpTransport;
use crate::platform::browser::Browser;
use crate::redaction::CredentialFixture;
use crate::report::ScenarioOutcome;
use crate::report::SuiteReport;
use crate::scenario::BuildpackGroup;
use crate::scenario::GroupInstall;
use crate::scenario::ScenarioId;
use crate::scenario::with_deployed_app;
use crate::scenario::with_session;
use crate::template::DEFAULT_STARTUP_SCRIPT;
use crate::template::ROOT_BODY_MARKER;
use crate::template::STARTUP_SCRIPT_MARKER;
use crate::template::STARTUP_SCRIPT_NAME;
use crate::template::TemplateGenerator;
use crate::types::AppHandle;
use crate::types::CachingMode;
use crate::types::RuntimeVersion;
use crate::types::Stack;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Staging output printed when an app is restaged with a different
/// buildpack version.
pub const UPGRADE_WARNING: &str = "WARNING: buildpack version changed from";

/// Revision appended to the second buildpack's version in the upgrade
/// scenario.
pub const UPGRADE_REVISION: &str = "brats";

/// Variant suffix of the second registration in the upgrade scenario.
const UPGRADE_VARIANT: &str = "second";

/// Root probes per deploy.
const ROOT_PROBES: usize = 2;

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs acceptance scenarios for one buildpack.
pub struct ScenarioRunner<'a> {
    /// Suite configuration.
    config: &'a BratsConfig,
    /// Pushes and observes apps.
    platform: &'a dyn DeploymentClient,
    /// Registers buildpacks.
    buildpacks: &'a dyn BuildpackManager,
    /// Probes app routes.
    transport: &'a dyn HttpTransport,
    /// Buildpack manifest.
    manifest: ManifestLookup,
    /// Sample app generator.
    generator: TemplateGenerator,
    /// Credentials the credentialed install embeds.
    credentials: CredentialFixture,
    /// Outcomes so far.
    report: SuiteReport,
}

impl<'a> ScenarioRunner<'a> {
    /// Builds a runner generating the embedded Go app.
    #[must_use]
    pub fn new(
        config: &'a BratsConfig,
        platform: &'a dyn DeploymentClient,
        buildpacks: &'a dyn BuildpackManager,
        transport: &'a dyn HttpTransport,
        manifest: ManifestLookup,
    ) -> Self {
        Self {
            config,
            platform,
            buildpacks,
            transport,
            manifest,
            generator: TemplateGenerator::go(),
            credentials: CredentialFixture::default(),
            report: SuiteReport::new(config.buildpack().registration()),
        }
    }

    /// Replaces the sample app generator.
    #[must_use]
    pub fn with_generator(mut self, generator: TemplateGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Replaces the credentials checked by redaction scenarios.
    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialFixture) -> Self {
        self.credentials = credentials;
        self
    }

    /// Returns the outcomes recorded so far.
    #[must_use]
    pub const fn report(&self) -> &SuiteReport {
        &self.report
    }

    /// Removes orphaned routes and returns the final report.
    #[must_use]
    pub fn finish(self) -> SuiteReport {
        let mut report = self.report;
        if let Err(err) = self.platform.delete_orphaned_routes() {
            tracing::warn!(error = %err, "orphaned route cleanup failed");
            report.record_abort("orphaned route cleanup", err.to_string());
        }
        report
    }

    // ------------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------------

    /// Deploys every manifest version on every configured stack.
    ///
    /// Each stack is its own buildpack group. For each version the app must
    /// reach the running state, log `Installing <dependency><version>`, and
    /// answer two root probes with the greeting.
    pub fn run_version_matrix(&mut self) {
        let config = self.config;
        let buildpack = config.buildpack();
        for stack in &config.stacks {
            let group_name = format!("{} on {stack}", buildpack.registration());
            let versions = match self.manifest.dependency_versions(
                &config.language,
                &config.dependency,
                stack,
            ) {
                Ok(versions) if versions.is_empty() => {
                    self.report.record_abort(
                        group_name,
                        format!("manifest lists no {} versions for {stack}", config.dependency),
                    );
                    continue;
                }
                Ok(versions) => versions,
                Err(err) => {
                    self.abort(&group_name, err.into());
                    continue;
                }
            };
            let group = match BuildpackGroup::establish(
                self.buildpacks,
                buildpack.clone(),
                &GroupInstall::Standard,
            ) {
                Ok(group) => group,
                Err(err) => {
                    self.abort(&group_name, err.into());
                    continue;
                }
            };
            for version in versions {
                let id = ScenarioId::new(&config.language, stack.clone(), "standard")
                    .with_version(version.clone());
                let result = self.run_recorded(&id, |runner| {
                    runner.deploy_and_probe(&version, stack, &group)
                });
                if let Err(err) = result
                    && err.aborts_group()
                {
                    self.abort(&group_name, err);
                    break;
                }
            }
            self.close_group(group, &group_name);
        }
    }

    /// Installs the buildpack with credentialed dependency URIs and checks
    /// the staging log shows only redacted URIs.
    ///
    /// # Errors
    ///
    /// Returns the scenario failure, which is also recorded.
    pub fn run_credential_redaction(&mut self, caching: CachingMode) -> Result<(), ScenarioError> {
        let config = self.config;
        let stack = self.primary_stack()?;
        let install = GroupInstall::CredentialedUris(caching);
        let base = ScenarioId::new(&config.language, stack.clone(), install.to_string());
        let version = self.latest_version(stack).map_err(|err| self.abort(&base.to_string(), err))?;
        let id = base.with_version(version.clone());
        let group = BuildpackGroup::establish(self.buildpacks, config.buildpack(), &install)
            .map_err(|err| self.abort(&id.to_string(), err.into()))?;
        let result = self.run_recorded(&id, |runner| {
            let uri = runner.manifest.dependency_uri(&config.dependency, &version, stack)?;
            let template = runner.generator.generate(&version)?;
            let request = DeployRequest {
                app_dir: template.full_path(),
                stack,
                buildpack: group.buildpack(),
            };
            let handle = AppHandle::allocate(&config.language, &version);
            with_deployed_app(runner.platform, handle, &request, config.running_timeout, |app| {
                let log = app.log_text()?;
                expect_log_lacks(&log, &runner.credentials.leaked_marker(caching))?;
                expect_log_contains(&log, &CredentialFixture::redacted_form(&uri, caching))
            })
        });
        self.close_group(group, &id.to_string());
        result
    }

    /// Deploys an app carrying a startup script; the script must run during
    /// staging and must not be served over HTTP.
    ///
    /// # Errors
    ///
    /// Returns the scenario failure, which is also recorded.
    pub fn run_startup_script(&mut self) -> Result<(), ScenarioError> {
        let config = self.config;
        let stack = self.primary_stack()?;
        let base = ScenarioId::new(&config.language, stack.clone(), "startup script");
        let version = self.latest_version(stack).map_err(|err| self.abort(&base.to_string(), err))?;
        let id = base.with_version(version.clone());
        let group =
            BuildpackGroup::establish(self.buildpacks, config.buildpack(), &GroupInstall::Standard)
                .map_err(|err| self.abort(&id.to_string(), err.into()))?;
        let result = self.run_recorded(&id, |runner| {
            let mut template = runner.generator.generate(&version)?;
            template.attach_startup_script(DEFAULT_STARTUP_SCRIPT)?;
            let request = DeployRequest {
                app_dir: template.full_path(),
                stack,
                buildpack: group.buildpack(),
            };
            let handle = AppHandle::allocate(&config.language, &version);
            with_deployed_app(runner.platform, handle, &request, config.running_timeout, |app| {
                expect_log_contains(&app.log_text()?, STARTUP_SCRIPT_MARKER)?;
                let mut browser = Browser::new(runner.transport, app.route()?);
                expect_root_greeting(&mut browser)?;
                let path = format!("/{STARTUP_SCRIPT_NAME}");
                browser.visit(&path)?;
                match browser.status() {
                    Some(404) => Ok(()),
                    status => Err(ScenarioError::assertion(format!(
                        "GET {path} answers 404 (got {})",
                        status.map_or_else(|| "no response".to_string(), |code| code.to_string())
                    ))),
                }
            })
        });
        self.close_group(group, &id.to_string());
        result
    }

    /// Pushes an app, then re-pushes it with a second registration of the
    /// same buildpack at a newer version; only the re-push may warn about the
    /// version change.
    ///
    /// # Errors
    ///
    /// Returns the scenario failure, which is also recorded.
    pub fn run_upgrade_warning(&mut self) -> Result<(), ScenarioError> {
        let config = self.config;
        let stack = self.primary_stack()?;
        let base = ScenarioId::new(&config.language, stack.clone(), "buildpack upgrade");
        let version = self.latest_version(stack).map_err(|err| self.abort(&base.to_string(), err))?;
        let id = base.with_version(version.clone());
        let first = config.buildpack();
        let second = first.with_variant(UPGRADE_VARIANT);
        let first_group = BuildpackGroup::establish(self.buildpacks, first, &GroupInstall::Standard)
            .map_err(|err| self.abort(&id.to_string(), err.into()))?;
        let second_group = match BuildpackGroup::establish(
            self.buildpacks,
            second,
            &GroupInstall::Revision(UPGRADE_REVISION.to_string()),
        ) {
            Ok(group) => group,
            Err(err) => {
                self.close_group(first_group, &id.to_string());
                return Err(self.abort(&id.to_string(), err.into()));
            }
        };
        let result = self.run_recorded(&id, |runner| {
            let template = runner.generator.generate(&version)?;
            let handle = AppHandle::allocate(&config.language, &version);
            with_session(runner.platform, handle, |app| {
                for (group, expect_warning) in [(&first_group, false), (&second_group, true)] {
                    let request = DeployRequest {
                        app_dir: template.full_path(),
                        stack,
                        buildpack: group.buildpack(),
                    };
                    app.push(&request, config.running_timeout)?;
                    let log = app.log_text()?;
                    if expect_warning {
                        expect_log_contains(&log, UPGRADE_WARNING)?;
                    } else {
                        expect_log_lacks(&log, UPGRADE_WARNING)?;
                    }
                    expect_root_greeting(&mut Browser::new(runner.transport, app.route()?))?;
                }
                Ok(())
            })
        });
        self.close_group(second_group, &id.to_string());
        self.close_group(first_group, &id.to_string());
        result
    }

    // ------------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------------

    /// Generates, deploys, and probes one version.
    fn deploy_and_probe(
        &self,
        version: &RuntimeVersion,
        stack: &Stack,
        group: &BuildpackGroup<'_>,
    ) -> Result<(), ScenarioError> {
        let template = self.generator.generate(version)?;
        let request = DeployRequest {
            app_dir: template.full_path(),
            stack,
            buildpack: group.buildpack(),
        };
        let handle = AppHandle::allocate(&self.config.language, version);
        let installing = format!("Installing {}{version}", self.config.dependency);
        with_deployed_app(self.platform, handle, &request, self.config.running_timeout, |app| {
            expect_log_contains(&app.log_text()?, &installing)?;
            let mut browser = Browser::new(self.transport, app.route()?);
            for _ in 0..ROOT_PROBES {
                expect_root_greeting(&mut browser)?;
            }
            Ok(())
        })
    }

    /// Runs `body` as the scenario `id` and records its outcome.
    fn run_recorded(
        &mut self,
        id: &ScenarioId,
        body: impl FnOnce(&Self) -> Result<(), ScenarioError>,
    ) -> Result<(), ScenarioError> {
        tracing::info!(scenario = %id, "scenario started");
        let started = Instant::now();
        let result = body(&*self);
        let elapsed = started.elapsed();
        match &result {
            Ok(()) => {
                tracing::info!(scenario = %id, elapsed = ?elapsed, "scenario passed");
                self.report.record(ScenarioOutcome::passed(id.to_string(), elapsed));
            }
            Err(err) => {
                tracing::warn!(scenario = %id, error = %err, "scenario failed");
                self.report.record(ScenarioOutcome::failed(id.to_string(), &err.to_string(), elapsed));
            }
        }
        result
    }

    /// Records a group abort and hands the error back.
    fn abort(&mut self, group: &str, err: ScenarioError) -> ScenarioError {
        tracing::error!(group, error = %err, "scenario group aborted");
        self.report.record_abort(group, err.to_string());
        err
    }

    /// Closes a group, recording a failed cleanup as an abort.
    fn close_group(&mut self, group: BuildpackGroup<'_>, name: &str) {
        if let Err(err) = group.close() {
            self.abort(name, err.into());
        }
    }

    /// First configured stack; edge-case scenarios run only there.
    fn primary_stack(&self) -> Result<&'a Stack, ScenarioError> {
        self.config
            .stacks
            .first()
            .ok_or_else(|| ScenarioError::assertion("at least one stack is configured"))
    }

    /// Newest manifest version for `stack`.
    fn latest_version(&self, stack: &Stack) -> Result<RuntimeVersion, ScenarioError> {
        let mut versions = self.manifest.dependency_versions(
            &self.config.language,
            &self.config.dependency,
            stack,
        )?;
        versions.pop().ok_or_else(|| {
            ScenarioError::Manifest(ManifestError::UnknownDependency {
                dependency: self.config.dependency.clone(),
                version: format!("any version for {stack}"),
            })
        })
    }
}

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Fails unless `log` contains `needle`.
fn expect_log_contains(log: &str, needle: &str) -> Result<(), ScenarioError> {
    if log.contains(needle) {
        return Ok(());
    }
    Err(ScenarioError::assertion(format!("log contains {needle:?}")))
}

/// Fails if `log` contains `needle`.
fn expect_log_lacks(log: &str, needle: &str) -> Result<(), ScenarioError> {
    if log.contains(needle) {
        return Err(ScenarioError::assertion(format!("log does not contain {needle:?}")));
    }
    Ok(())
}

/// Visits `/` and requires a 200 carrying the greeting.
fn expect_root_greeting(browser: &mut Browser<'_>) -> Result<(), ScenarioError> {
    browser.visit("/")?;
    if browser.status() == Some(200) && browser.body().contains(ROOT_BODY_MARKER) {
        return Ok(());
    }
    Err(ScenarioError::assertion(format!(
        "GET / answers 200 with {ROOT_BODY_MARKER:?} (got {} {:?})",
        browser.status().map_or_else(|| "no response".to_string(), |code| code.to_string()),
        browser.body()
    )))
}
