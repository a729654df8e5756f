//! Scenario outcomes and the run report
//!
//! Every scenario terminates in exactly one of three buckets. Inconclusive is
//! a distinct third bucket: it never counts toward passed or failed tallies.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::SuiteResult;

/// Terminal verdict of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// One or more checks failed; all failure messages are carried, not just
    /// the first.
    Failed { reasons: Vec<String> },
    /// The feature under test was absent or not applicable.
    Inconclusive { reason: String },
}

impl Outcome {
    pub fn failed(reasons: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Failed {
            reasons: reasons.into_iter().map(Into::into).collect(),
        }
    }

    pub fn inconclusive(reason: impl Into<String>) -> Self {
        Self::Inconclusive {
            reason: reason.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Outcome of one scenario plus bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

/// Aggregate of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub inconclusive: usize,
    pub duration_ms: u64,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn new(scenarios: Vec<ScenarioReport>, duration_ms: u64) -> Self {
        let mut passed = 0;
        let mut failed = 0;
        let mut inconclusive = 0;
        for report in &scenarios {
            match report.outcome {
                Outcome::Passed => passed += 1,
                Outcome::Failed { .. } => failed += 1,
                Outcome::Inconclusive { .. } => inconclusive += 1,
            }
        }
        Self {
            total: scenarios.len(),
            passed,
            failed,
            inconclusive,
            duration_ms,
            scenarios,
        }
    }

    /// Log per-bucket tallies and failure reasons verbatim.
    pub fn log_summary(&self) {
        info!("");
        info!(
            "Results: {} passed, {} failed, {} inconclusive ({} ms)",
            self.passed, self.failed, self.inconclusive, self.duration_ms
        );
        for report in &self.scenarios {
            match &report.outcome {
                Outcome::Failed { reasons } => {
                    for reason in reasons {
                        error!("  {} - {}", report.name, reason);
                    }
                }
                Outcome::Inconclusive { reason } => {
                    warn!("  {} - inconclusive: {}", report.name, reason);
                }
                Outcome::Passed => {}
            }
        }
    }

    /// Write the report as pretty JSON under `output_dir`.
    pub fn write_json(&self, output_dir: &Path) -> SuiteResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join("run-report.json");
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!("Report written to {}", path.display());
        Ok(path)
    }
}
