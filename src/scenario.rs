//! Scenario execution
//!
//! A scenario owns an exclusive driver session for its duration. The runner
//! composes a setup closure (acquire the session) with a scenario body and
//! guarantees teardown on every exit path: failure screenshot when configured,
//! then session release, both log-and-swallow so teardown can never mask the
//! scenario's real outcome.
//!
//! Classification is strict: only an explicit absence short-circuit inside the
//! body yields an inconclusive verdict. Every error the body surfaces,
//! including faults during a presence probe, is reported as a failure.

use std::future::Future;
use std::path::PathBuf;

use futures::future::BoxFuture;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::TestConfig;
use crate::driver::Driver;
use crate::error::SuiteResult;
use crate::outcome::{Outcome, RunReport, ScenarioReport};
use crate::screenshot;

/// A scenario body: interacts with the driver, returns one verdict.
pub type ScenarioBody =
    for<'a> fn(&'a dyn Driver, &'a TestConfig) -> BoxFuture<'a, SuiteResult<Outcome>>;

/// A named, registered scenario.
#[derive(Clone, Copy)]
pub struct ScenarioSpec {
    pub name: &'static str,
    pub body: ScenarioBody,
}

/// Runs scenarios against driver sessions produced by a setup closure.
pub struct ScenarioRunner<'cfg> {
    config: &'cfg TestConfig,
    screenshot_dir: PathBuf,
}

impl<'cfg> ScenarioRunner<'cfg> {
    pub fn new(config: &'cfg TestConfig) -> Self {
        Self {
            config,
            screenshot_dir: PathBuf::from("Screenshots"),
        }
    }

    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Run one scenario: acquire a session, execute the body, tear down.
    ///
    /// Session acquisition is retried up to `maxRetryAttempts`; the body is
    /// never retried.
    pub async fn run<D, S, Fut>(
        &self,
        name: &str,
        mut setup: S,
        body: ScenarioBody,
    ) -> ScenarioReport
    where
        D: Driver,
        S: FnMut() -> Fut,
        Fut: Future<Output = SuiteResult<D>>,
    {
        let start = Instant::now();

        let driver = match self.acquire_session(name, &mut setup).await {
            Ok(driver) => driver,
            Err(e) => {
                error!("✗ {name} - session setup failed: {e}");
                return ScenarioReport {
                    name: name.to_string(),
                    outcome: Outcome::failed([format!("session setup failed: {e}")]),
                    duration_ms: start.elapsed().as_millis() as u64,
                };
            }
        };

        let outcome = match body(&driver, self.config).await {
            Ok(outcome) => outcome,
            // Absence was already classified by the body; anything that
            // reaches here as an error is a genuine failure, never
            // inconclusive.
            Err(e) => Outcome::failed([e.to_string()]),
        };

        if outcome.is_failed() && self.config.screenshot_on_failure {
            screenshot::capture_on_failure(&driver, &self.screenshot_dir, name).await;
        }

        if let Err(e) = driver.quit().await {
            warn!("Failed to release session for {name}: {e}");
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Outcome::Passed => info!("✓ {name} ({duration_ms} ms)"),
            Outcome::Failed { reasons } => {
                error!("✗ {name} - {}", reasons.join("; "));
            }
            Outcome::Inconclusive { reason } => {
                warn!("~ {name} - inconclusive: {reason}");
            }
        }

        ScenarioReport {
            name: name.to_string(),
            outcome,
            duration_ms,
        }
    }

    /// Run every registered scenario, one session each, sequentially.
    pub async fn run_all<D, S, Fut>(&self, scenarios: &[ScenarioSpec], mut setup: S) -> RunReport
    where
        D: Driver,
        S: FnMut() -> Fut,
        Fut: Future<Output = SuiteResult<D>>,
    {
        let start = Instant::now();
        info!("Running {} scenario(s)...", scenarios.len());

        let mut reports = Vec::with_capacity(scenarios.len());
        for spec in scenarios {
            reports.push(self.run(spec.name, &mut setup, spec.body).await);
        }

        RunReport::new(reports, start.elapsed().as_millis() as u64)
    }

    async fn acquire_session<D, S, Fut>(&self, name: &str, setup: &mut S) -> SuiteResult<D>
    where
        D: Driver,
        S: FnMut() -> Fut,
        Fut: Future<Output = SuiteResult<D>>,
    {
        let attempts = self.config.max_retry_attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match setup().await {
                Ok(driver) => return Ok(driver),
                Err(e) => {
                    warn!("Session setup for {name} failed (attempt {attempt}/{attempts}): {e}");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.expect("at least one setup attempt"))
    }
}
