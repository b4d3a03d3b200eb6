// crates/brats/src/testing.rs
// ============================================================================
// Module: Test Doubles
// Description: In-memory platform, buildpack registry, transport, and runner.
// Purpose: Exercise scenario sequencing without a live platform.
// Dependencies: url
// ============================================================================

//! ## Overview
//! Fakes record every call so tests can assert ordering and the
//! one-delete-per-app teardown property.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only doubles favor direct unwrap/expect for clarity."
)]

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use url::Url;

use crate::error::PlatformError;
use crate::platform::BuildpackManager;
use crate::platform::DeployRequest;
use crate::platform::DeploymentClient;
use crate::platform::HttpResponse;
use crate::platform::HttpTransport;
use crate::platform::InstanceState;
use crate::platform::command::CommandOutput;
use crate::platform::command::CommandRunner;
use crate::platform::command::Invocation;
use crate::types::AppHandle;
use crate::types::BuildpackName;
use crate::types::CachingMode;

/// Builds a platform failure for scripted errors.
pub fn platform_failure(message: &str) -> PlatformError {
    PlatformError::CommandFailed {
        command: "fake".to_string(),
        status: "exit status: 1".to_string(),
        stderr: message.to_string(),
    }
}

// ============================================================================
// SECTION: Fake Platform
// ============================================================================

/// In-memory deployment client.
pub struct FakePlatform {
    /// Ordered call log (`deploy:<app>:<stack>:<buildpack>`, `delete:<app>`, ...).
    pub calls: Mutex<Vec<String>>,
    /// Queued instance states; the last entry repeats.
    states: Mutex<VecDeque<Vec<InstanceState>>>,
    /// Log text appended per push, keyed by buildpack registration.
    push_logs: Mutex<HashMap<String, String>>,
    /// Log text returned for every app.
    base_log: Mutex<String>,
    /// Accumulated log per app.
    app_logs: Mutex<HashMap<String, String>>,
    /// Error message for the next deploy.
    deploy_error: Mutex<Option<String>>,
    /// Error message for every log query.
    log_error: Mutex<Option<String>>,
    /// Deletes per app name.
    deletes: Mutex<HashMap<String, usize>>,
    /// Apps pushed at least once.
    deployed: Mutex<Vec<String>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            states: Mutex::new(VecDeque::from([vec![InstanceState::Running]])),
            push_logs: Mutex::new(HashMap::new()),
            base_log: Mutex::new(String::new()),
            app_logs: Mutex::new(HashMap::new()),
            deploy_error: Mutex::new(None),
            log_error: Mutex::new(None),
            deletes: Mutex::new(HashMap::new()),
            deployed: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the queued instance states.
    pub fn with_states(self, states: Vec<Vec<InstanceState>>) -> Self {
        *self.states.lock().unwrap() = states.into();
        self
    }

    /// Log text every app reports.
    pub fn with_log(self, log: &str) -> Self {
        *self.base_log.lock().unwrap() = log.to_string();
        self
    }

    /// Log text appended when pushing with `registration`.
    pub fn with_push_log(self, registration: &str, log: &str) -> Self {
        self.push_logs.lock().unwrap().insert(registration.to_string(), log.to_string());
        self
    }

    /// Fails the next deploy.
    pub fn with_deploy_error(self, message: &str) -> Self {
        *self.deploy_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Fails every log query.
    pub fn with_log_error(self, message: &str) -> Self {
        *self.log_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deployed(&self) -> Vec<String> {
        self.deployed.lock().unwrap().clone()
    }

    pub fn delete_count(&self, app: &str) -> usize {
        self.deletes.lock().unwrap().get(app).copied().unwrap_or(0)
    }

    /// Asserts every pushed app was deleted exactly once.
    pub fn assert_each_app_deleted_once(&self) {
        let deployed = self.deployed();
        assert!(!deployed.is_empty(), "no app was deployed");
        for app in deployed {
            assert_eq!(self.delete_count(&app), 1, "app {app} delete count");
        }
    }
}

impl DeploymentClient for FakePlatform {
    fn deploy(&self, app: &AppHandle, request: &DeployRequest<'_>) -> Result<(), PlatformError> {
        let registration = request.buildpack.registration();
        self.calls.lock().unwrap().push(format!(
            "deploy:{}:{}:{}",
            app.name(),
            request.stack,
            registration
        ));
        {
            let mut deployed = self.deployed.lock().unwrap();
            if !deployed.iter().any(|name| name == app.name()) {
                deployed.push(app.name().to_string());
            }
        }
        if let Some(message) = self.deploy_error.lock().unwrap().take() {
            return Err(platform_failure(&message));
        }
        let push_log = self.push_logs.lock().unwrap().get(&registration).cloned();
        if let Some(log) = push_log {
            self.app_logs.lock().unwrap().entry(app.name().to_string()).or_default().push_str(&log);
        }
        Ok(())
    }

    fn delete(&self, app: &AppHandle) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push(format!("delete:{}", app.name()));
        *self.deletes.lock().unwrap().entry(app.name().to_string()).or_default() += 1;
        Ok(())
    }

    fn instance_states(&self, app: &AppHandle) -> Result<Vec<InstanceState>, PlatformError> {
        self.calls.lock().unwrap().push(format!("states:{}", app.name()));
        let mut states = self.states.lock().unwrap();
        if states.len() > 1 {
            return Ok(states.pop_front().unwrap_or_default());
        }
        Ok(states.front().cloned().unwrap_or_default())
    }

    fn log_text(&self, app: &AppHandle) -> Result<String, PlatformError> {
        if let Some(message) = self.log_error.lock().unwrap().clone() {
            return Err(platform_failure(&message));
        }
        let mut text = self.app_logs.lock().unwrap().get(app.name()).cloned().unwrap_or_default();
        text.push_str(&self.base_log.lock().unwrap());
        Ok(text)
    }

    fn route(&self, app: &AppHandle) -> Result<Url, PlatformError> {
        Ok(Url::parse(&format!("http://{}.apps.example.com", app.name())).unwrap())
    }

    fn delete_orphaned_routes(&self) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push("delete-orphaned-routes".to_string());
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(1)
    }
}

// ============================================================================
// SECTION: Fake Buildpack Registry
// ============================================================================

/// In-memory buildpack manager.
#[derive(Default)]
pub struct FakeBuildpacks {
    pub calls: Mutex<Vec<String>>,
    /// Error message for install calls.
    install_error: Mutex<Option<String>>,
}

impl FakeBuildpacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_install(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            install_error: Mutex::new(Some(message.to_string())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn install_result(&self) -> Result<(), PlatformError> {
        match self.install_error.lock().unwrap().clone() {
            Some(message) => Err(platform_failure(&message)),
            None => Ok(()),
        }
    }
}

impl BuildpackManager for FakeBuildpacks {
    fn cleanup(&self, buildpack: &BuildpackName) -> Result<(), PlatformError> {
        self.record(format!("cleanup:{buildpack}"))
    }

    fn install(&self, buildpack: &BuildpackName) -> Result<(), PlatformError> {
        self.record(format!("install:{buildpack}"))?;
        self.install_result()
    }

    fn install_with_credentialed_uris(
        &self,
        buildpack: &BuildpackName,
        caching: CachingMode,
    ) -> Result<(), PlatformError> {
        self.record(format!("install-credentialed:{buildpack}:{caching}"))?;
        self.install_result()
    }

    fn install_revision(
        &self,
        buildpack: &BuildpackName,
        revision: &str,
    ) -> Result<(), PlatformError> {
        self.record(format!("install-revision:{buildpack}:{revision}"))?;
        self.install_result()
    }
}

// ============================================================================
// SECTION: Fake Transport
// ============================================================================

/// Serves canned responses by URL path; unknown paths answer 404.
#[derive(Default)]
pub struct FakeTransport {
    responses: HashMap<String, HttpResponse>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, status: u16, body: &str) -> Self {
        self.responses.insert(path.to_string(), HttpResponse {
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for FakeTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, PlatformError> {
        self.requests.lock().unwrap().push(url.to_string());
        Ok(self.responses.get(url.path()).cloned().unwrap_or(HttpResponse {
            status: 404,
            body: "404 Not Found".to_string(),
        }))
    }
}

// ============================================================================
// SECTION: Scripted Runner
// ============================================================================

/// Command runner answering by argument prefix; unmatched commands succeed
/// with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Vec<(Vec<String>, CommandOutput)>,
    pub invocations: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, args_prefix: &[&str], output: CommandOutput) -> Self {
        self.responses.push((args_prefix.iter().map(ToString::to_string).collect(), output));
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Rendered command lines, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, PlatformError> {
        self.invocations.lock().unwrap().push(invocation.clone());
        let output = self
            .responses
            .iter()
            .find(|(prefix, _)| invocation.args.starts_with(prefix))
            .map_or_else(|| CommandOutput::ok(""), |(_, output)| output.clone());
        Ok(output)
    }
}

/// Failing output with stderr.
pub fn failed_output(stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        status: "exit status: 1".to_string(),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}
