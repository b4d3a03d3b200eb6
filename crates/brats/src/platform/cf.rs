// crates/brats/src/platform/cf.rs
// ============================================================================
// Module: cf CLI Deployment Client
// Description: DeploymentClient backed by the Cloud Foundry `cf` CLI.
// Purpose: Push, observe, and delete apps through the platform CLI.
// Dependencies: url, tracing
// ============================================================================

//! ## Overview
//! Each operation maps to one `cf` command. Push output is retained per app
//! and prepended to `cf logs --recent`, so staging output stays observable
//! after the platform's recent-log buffer rolls over.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use url::Url;

use super::DeployRequest;
use super::DeploymentClient;
use super::InstanceState;
use super::command::CommandRunner;
use super::command::Invocation;
use super::command::SystemCommandRunner;
use super::command::run_checked;
use crate::config::BratsConfig;
use crate::error::PlatformError;
use crate::types::AppHandle;

// ============================================================================
// SECTION: Client
// ============================================================================

/// [`DeploymentClient`] that shells out to `cf`.
#[derive(Debug)]
pub struct CfDeploymentClient<R = SystemCommandRunner> {
    /// Process runner.
    runner: R,
    /// `cf` binary.
    cf_binary: String,
    /// Memory limit passed to `cf push -m`.
    memory: String,
    /// Disk limit passed to `cf push -k`.
    disk: String,
    /// Scheme for route URLs.
    route_scheme: String,
    /// Delay between readiness polls.
    poll_interval: Duration,
    /// Accumulated push output per app name.
    push_logs: Mutex<HashMap<String, String>>,
}

impl CfDeploymentClient<SystemCommandRunner> {
    /// Builds a client running real `cf` processes.
    #[must_use]
    pub fn from_config(config: &BratsConfig) -> Self {
        Self::with_runner(SystemCommandRunner, config)
    }
}

impl<R: CommandRunner> CfDeploymentClient<R> {
    /// Builds a client over a custom runner.
    #[must_use]
    pub fn with_runner(runner: R, config: &BratsConfig) -> Self {
        Self {
            runner,
            cf_binary: config.cf_binary.clone(),
            memory: config.memory.clone(),
            disk: config.disk.clone(),
            route_scheme: config.route_scheme.clone(),
            poll_interval: config.poll_interval,
            push_logs: Mutex::new(HashMap::new()),
        }
    }

    /// Builds a `cf` invocation.
    fn cf<const N: usize>(&self, args: [&str; N]) -> Invocation {
        Invocation::new(&self.cf_binary, args)
    }

    /// Appends push output for an app.
    fn record_push(&self, app: &AppHandle, text: &str) {
        let mut logs = self.push_logs.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = logs.entry(app.name().to_string()).or_default();
        entry.push_str(text);
        if !text.ends_with('\n') {
            entry.push('\n');
        }
    }

    /// Returns accumulated push output for an app.
    fn push_log(&self, app: &AppHandle) -> String {
        let logs = self.push_logs.lock().unwrap_or_else(PoisonError::into_inner);
        logs.get(app.name()).cloned().unwrap_or_default()
    }
}

impl<R: CommandRunner> DeploymentClient for CfDeploymentClient<R> {
    fn deploy(&self, app: &AppHandle, request: &DeployRequest<'_>) -> Result<(), PlatformError> {
        let app_dir = request.app_dir.to_string_lossy();
        let buildpack = request.buildpack.registration();
        let invocation = self.cf([
            "push",
            app.name(),
            "-p",
            &*app_dir,
            "-s",
            request.stack.as_str(),
            "-b",
            buildpack.as_str(),
            "-m",
            self.memory.as_str(),
            "-k",
            self.disk.as_str(),
        ]);
        tracing::info!(app = %app, stack = %request.stack, buildpack = %buildpack, "pushing app");
        let output = self.runner.run(&invocation)?;
        self.record_push(app, &output.stdout);
        if output.success {
            return Ok(());
        }
        let detail = if output.stderr.trim().is_empty() { &output.stdout } else { &output.stderr };
        Err(PlatformError::CommandFailed {
            command: invocation.to_string(),
            status: output.status,
            stderr: detail.trim().to_string(),
        })
    }

    fn delete(&self, app: &AppHandle) -> Result<(), PlatformError> {
        tracing::info!(app = %app, "deleting app");
        run_checked(&self.runner, &self.cf(["delete", app.name(), "-f", "-r"]))?;
        self.push_logs.lock().unwrap_or_else(PoisonError::into_inner).remove(app.name());
        Ok(())
    }

    fn instance_states(&self, app: &AppHandle) -> Result<Vec<InstanceState>, PlatformError> {
        let output = run_checked(&self.runner, &self.cf(["app", app.name()]))?;
        Ok(parse_instance_states(&output.stdout))
    }

    fn log_text(&self, app: &AppHandle) -> Result<String, PlatformError> {
        let output = run_checked(&self.runner, &self.cf(["logs", app.name(), "--recent"]))?;
        let mut text = self.push_log(app);
        text.push_str(&output.stdout);
        Ok(text)
    }

    fn route(&self, app: &AppHandle) -> Result<Url, PlatformError> {
        let invocation = self.cf(["app", app.name()]);
        let output = run_checked(&self.runner, &invocation)?;
        let route = parse_first_route(&output.stdout).ok_or_else(|| {
            PlatformError::UnexpectedOutput {
                command: invocation.to_string(),
                detail: "no routes bound to app".to_string(),
            }
        })?;
        Url::parse(&format!("{}://{route}", self.route_scheme)).map_err(|err| {
            PlatformError::UnexpectedOutput {
                command: invocation.to_string(),
                detail: format!("route {route:?} is not a valid host: {err}"),
            }
        })
    }

    fn delete_orphaned_routes(&self) -> Result<(), PlatformError> {
        run_checked(&self.runner, &self.cf(["delete-orphaned-routes", "-f"])).map(|_| ())
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

// ============================================================================
// SECTION: Output Parsing
// ============================================================================

/// Extracts instance states from `cf app` output rows such as
/// `#0   running   2017-10-19T08:37:00Z   0.0%   ...`.
#[must_use]
pub fn parse_instance_states(output: &str) -> Vec<InstanceState> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let index = fields.next()?;
            let ordinal = index.strip_prefix('#')?;
            if ordinal.is_empty() || !ordinal.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            fields.next().map(InstanceState::parse)
        })
        .collect()
}

/// Extracts the first route from a `routes:` (or legacy `urls:`) line.
#[must_use]
pub fn parse_first_route(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let trimmed = line.trim_start();
        let rest = trimmed.strip_prefix("routes:").or_else(|| trimmed.strip_prefix("urls:"))?;
        rest.split(',').map(str::trim).find(|route| !route.is_empty()).map(str::to_string)
    })
}
