// crates/brats/src/report.rs
// ============================================================================
// Module: Suite Report
// Description: Scenario outcomes and the summary artifacts written per run.
// Purpose: Name every failing scenario and persist a deterministic summary.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! [`SuiteReport`] collects one [`ScenarioOutcome`] per scenario plus any
//! group aborts. [`SuiteReporter`] writes `summary.json` (canonical JCS) and
//! `summary.md` under the run root, and still writes them when the suite
//! panics before finishing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::BratsConfig;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result class of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Every expectation held.
    Passed,
    /// The scenario failed; see the failure text.
    Failed,
}

/// Recorded result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario display name.
    pub scenario: String,
    /// Pass or fail.
    pub status: OutcomeStatus,
    /// Failure rendered as `<scenario>: <unmet expectation>`.
    pub failure: Option<String>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    /// Outcome of a passing scenario.
    #[must_use]
    pub fn passed(scenario: impl Into<String>, duration: Duration) -> Self {
        Self {
            scenario: scenario.into(),
            status: OutcomeStatus::Passed,
            failure: None,
            duration_ms: millis(duration),
        }
    }

    /// Outcome of a failing scenario.
    #[must_use]
    pub fn failed(scenario: impl Into<String>, failure: &str, duration: Duration) -> Self {
        let scenario = scenario.into();
        Self {
            failure: Some(format!("{scenario}: {failure}")),
            scenario,
            status: OutcomeStatus::Failed,
            duration_ms: millis(duration),
        }
    }
}

/// A scenario group stopped before all its scenarios ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAbort {
    /// Group display name.
    pub group: String,
    /// Error that stopped the group.
    pub reason: String,
}

/// Outcomes of one suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub suite: String,
    /// Outcomes in execution order.
    pub outcomes: Vec<ScenarioOutcome>,
    /// Groups aborted early.
    pub aborts: Vec<GroupAbort>,
}

impl SuiteReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            outcomes: Vec::new(),
            aborts: Vec::new(),
        }
    }

    /// Appends a scenario outcome.
    pub fn record(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    /// Records that `group` stopped early.
    pub fn record_abort(&mut self, group: impl Into<String>, reason: impl Into<String>) {
        self.aborts.push(GroupAbort {
            group: group.into(),
            reason: reason.into(),
        });
    }

    /// Returns true when no scenario failed and no group aborted.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.aborts.is_empty()
            && self.outcomes.iter().all(|outcome| outcome.status == OutcomeStatus::Passed)
    }

    /// Failure lines, one per failed scenario or aborted group.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.failure.clone())
            .chain(
                self.aborts
                    .iter()
                    .map(|abort| format!("{} aborted: {}", abort.group, abort.reason)),
            )
            .collect()
    }

    /// Failure lines joined for a test-runner panic message.
    #[must_use]
    pub fn failure_text(&self) -> String {
        self.failures().join("\n")
    }

    /// Renders the markdown summary.
    #[must_use]
    pub fn to_markdown(&self, status: &str, duration_ms: u64) -> String {
        let mut out = String::new();
        out.push_str("# Buildpack Acceptance Summary\n\n");
        out.push_str("## Status\n\n");
        let _ = writeln!(out, "- Suite: {}", self.suite);
        let _ = writeln!(out, "- Status: {status}");
        let _ = writeln!(out, "- Duration (ms): {duration_ms}");
        out.push_str("\n## Scenarios\n\n");
        if self.outcomes.is_empty() {
            out.push_str("- None\n");
        }
        for outcome in &self.outcomes {
            let mark = match outcome.status {
                OutcomeStatus::Passed => "pass",
                OutcomeStatus::Failed => "FAIL",
            };
            let _ = writeln!(out, "- [{mark}] {} ({} ms)", outcome.scenario, outcome.duration_ms);
        }
        out.push_str("\n## Failures\n\n");
        let failures = self.failures();
        if failures.is_empty() {
            out.push_str("- None\n");
        }
        for failure in failures {
            let _ = writeln!(out, "- {failure}");
        }
        out
    }
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Serialized `summary.json` layout.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    /// Suite name.
    suite: &'a str,
    /// `pass`, `fail`, `panic`, or `unknown`.
    status: &'a str,
    /// Start time in Unix milliseconds.
    started_at_ms: u64,
    /// End time in Unix milliseconds.
    ended_at_ms: u64,
    /// Run duration in milliseconds.
    duration_ms: u64,
    /// Scenario outcomes.
    outcomes: &'a [ScenarioOutcome],
    /// Group aborts.
    aborts: &'a [GroupAbort],
}

/// Writes run summaries, even when the suite panics.
#[derive(Debug)]
pub struct SuiteReporter {
    /// Directory receiving artifacts.
    root: PathBuf,
    /// Suite name used when no report is available.
    suite: String,
    /// Start time in Unix milliseconds.
    started_at_ms: u64,
    /// Set once a summary has been written.
    finalized: bool,
}

impl SuiteReporter {
    /// Creates the suite directory: `<run_root>/<suite>`, or
    /// `target/brats/run_<ms>/<suite>` when no run root is configured.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when the directory cannot be created.
    pub fn new(config: &BratsConfig, suite: &str) -> io::Result<Self> {
        let started_at_ms = now_millis();
        let run_root = config.run_root.clone().unwrap_or_else(|| {
            PathBuf::from("target/brats").join(format!("run_{started_at_ms}"))
        });
        let root = run_root.join(suite);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            suite: suite.to_string(),
            started_at_ms,
            finalized: false,
        })
    }

    /// Returns the artifact directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `summary.json` and `summary.md` for `report`.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when serialization or writing fails.
    pub fn finish(&mut self, report: &SuiteReport) -> io::Result<Vec<PathBuf>> {
        let status = if report.all_passed() { "pass" } else { "fail" };
        self.write(report, status)
    }

    /// Serializes and writes both artifacts.
    fn write(&mut self, report: &SuiteReport, status: &str) -> io::Result<Vec<PathBuf>> {
        let ended_at_ms = now_millis();
        let duration_ms = ended_at_ms.saturating_sub(self.started_at_ms);
        let summary = RunSummary {
            suite: &report.suite,
            status,
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms,
            outcomes: &report.outcomes,
            aborts: &report.aborts,
        };
        let json = serde_jcs::to_vec(&summary).map_err(|err| io::Error::other(err.to_string()))?;
        let json_path = self.root.join("summary.json");
        fs::write(&json_path, json)?;
        let md_path = self.root.join("summary.md");
        fs::write(&md_path, report.to_markdown(status, duration_ms))?;
        self.finalized = true;
        tracing::info!(root = %self.root.display(), status, "wrote suite summary");
        Ok(vec![json_path, md_path])
    }
}

impl Drop for SuiteReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let mut report = SuiteReport::new(self.suite.clone());
        report.record_abort(self.suite.clone(), "suite terminated without explicit summary");
        if let Err(err) = self.write(&report, status) {
            tracing::warn!(error = %err, "failed to write suite summary");
        }
    }
}

/// Current Unix time in milliseconds.
fn now_millis() -> u64 {
    millis(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default())
}

/// Duration in whole milliseconds, saturating.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
