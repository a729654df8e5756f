//! Condition polling
//!
//! The driver boundary exposes no change-notification channel, so the suite
//! synchronizes by evaluating a condition, sleeping for a poll interval, and
//! re-evaluating until the condition holds or the budget runs out. Elapsed
//! time is measured from poll start; a single slow final evaluation may
//! overrun the budget by its own duration.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::driver::{first_displayed, Driver, ElementHandle, Selector};
use crate::error::{SuiteError, SuiteResult};

/// Default wait budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay between condition evaluations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A bounded wait: what is being waited for, for how long, and how often to
/// re-check. Constructed per wait call and discarded after evaluation.
#[derive(Debug, Clone)]
pub struct WaitSpec {
    pub description: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitSpec {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Intervals are clamped to at least 1 ms so the loop always yields.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }
}

/// Result of a single presence probe: the feature is there, or it is not.
/// Genuine faults travel separately as `Err`, so absence and breakage are
/// distinguishable types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe<T> {
    Present(T),
    Absent,
}

impl<T> Probe<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Probe::Present(_))
    }
}

/// Poll `poll` until it reports a present value or the budget elapses.
///
/// The condition is evaluated immediately; on success the observed value is
/// returned without a trailing sleep. A poll error aborts the wait at once: a
/// broken condition is not retried as if it were "not yet true".
pub async fn wait_for<T, F, Fut>(spec: &WaitSpec, mut poll: F) -> SuiteResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SuiteResult<Probe<T>>>,
{
    let start = Instant::now();
    loop {
        if let Probe::Present(value) = poll().await? {
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= spec.timeout {
            debug!(condition = %spec.description, ?elapsed, "wait timed out");
            return Err(SuiteError::WaitTimeout {
                condition: spec.description.clone(),
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }

        // Never sleep past the deadline; the last evaluation runs at the
        // budget boundary.
        let remaining = spec.timeout - elapsed;
        tokio::time::sleep(spec.poll_interval.min(remaining)).await;
    }
}

/// Boolean adapter over [`wait_for`].
pub async fn wait_until<F, Fut>(spec: &WaitSpec, mut pred: F) -> SuiteResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SuiteResult<bool>>,
{
    wait_for(spec, move || {
        let fut = pred();
        async move {
            Ok(if fut.await? {
                Probe::Present(())
            } else {
                Probe::Absent
            })
        }
    })
    .await
}

/// One-shot presence probe for a selector.
pub async fn probe(driver: &dyn Driver, selector: &Selector) -> SuiteResult<Probe<ElementHandle>> {
    match driver.find(selector).await? {
        Some(el) => Ok(Probe::Present(el)),
        None => Ok(Probe::Absent),
    }
}

/// One-shot presence probe that also requires the element to be displayed.
pub async fn probe_displayed(
    driver: &dyn Driver,
    selector: &Selector,
) -> SuiteResult<Probe<ElementHandle>> {
    match first_displayed(driver, selector).await? {
        Some(el) => Ok(Probe::Present(el)),
        None => Ok(Probe::Absent),
    }
}

/// Bounded probe: keep re-probing until the element shows up or the (short)
/// budget elapses, then report absence rather than failing.
pub async fn probe_within(
    driver: &dyn Driver,
    selector: &Selector,
    spec: &WaitSpec,
) -> SuiteResult<Probe<ElementHandle>> {
    match wait_for(spec, || probe_displayed(driver, selector)).await {
        Ok(el) => Ok(Probe::Present(el)),
        Err(SuiteError::WaitTimeout { .. }) => Ok(Probe::Absent),
        Err(e) => Err(e),
    }
}

/// Wait for a visible element matching `selector`.
pub async fn wait_for_element(
    driver: &dyn Driver,
    selector: &Selector,
    spec: &WaitSpec,
) -> SuiteResult<ElementHandle> {
    wait_for(spec, || probe_displayed(driver, selector)).await
}

/// Wait until the current URL differs from `from`, returning the new URL.
pub async fn wait_for_url_change(
    driver: &dyn Driver,
    from: &str,
    spec: &WaitSpec,
) -> SuiteResult<String> {
    wait_for(spec, move || {
        let d = driver;
        async move {
            let url = d.current_url().await?;
            Ok(if url != from {
                Probe::Present(url)
            } else {
                Probe::Absent
            })
        }
    })
    .await
}

/// Wait until the current URL contains `fragment`.
pub async fn wait_for_url_contains(
    driver: &dyn Driver,
    fragment: &str,
    spec: &WaitSpec,
) -> SuiteResult<String> {
    wait_for(spec, move || {
        let d = driver;
        async move {
            let url = d.current_url().await?;
            Ok(if url.contains(fragment) {
                Probe::Present(url)
            } else {
                Probe::Absent
            })
        }
    })
    .await
}

/// Wait for `document.readyState` to report a fully loaded page.
pub async fn wait_for_page_load(driver: &dyn Driver, spec: &WaitSpec) -> SuiteResult<()> {
    wait_until(spec, move || {
        let d = driver;
        async move {
            let state = d.execute_script("return document.readyState;").await?;
            Ok(state.as_str() == Some("complete"))
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn spec_ms(timeout: u64, interval: u64) -> WaitSpec {
        WaitSpec::new("test condition")
            .with_timeout(Duration::from_millis(timeout))
            .with_poll_interval(Duration::from_millis(interval))
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_does_not_sleep() {
        let start = Instant::now();
        let value = wait_for(&spec_ms(2000, 100), || async { Ok(Probe::Present(7)) })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_three_failed_polls() {
        // timeout 2000ms, interval 100ms, present on the 4th evaluation:
        // evaluations land at 0, 100, 200, 300ms.
        let calls = Cell::new(0u32);
        let start = Instant::now();
        let value = wait_for(&spec_ms(2000, 100), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                Ok(if n >= 4 {
                    Probe::Present("ready")
                } else {
                    Probe::Absent
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "ready");
        assert_eq!(calls.get(), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_condition_and_elapsed() {
        let start = Instant::now();
        let err = wait_for::<(), _, _>(&spec_ms(500, 100), || async { Ok(Probe::Absent) })
            .await
            .unwrap_err();

        assert!(start.elapsed() >= Duration::from_millis(500));
        match err {
            SuiteError::WaitTimeout {
                condition,
                elapsed_ms,
            } => {
                assert_eq!(condition, "test condition");
                assert!(elapsed_ms >= 500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_propagates_without_retry() {
        let calls = Cell::new(0u32);
        let err = wait_for::<(), _, _>(&spec_ms(2000, 100), || {
            calls.set(calls.get() + 1);
            async {
                Err(SuiteError::AssertionFailed(
                    "broken predicate".to_string(),
                ))
            }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.get(), 1, "a failing poll must not be retried");
        assert!(matches!(err, SuiteError::AssertionFailed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_longer_than_timeout_clamps_to_deadline() {
        let calls = Cell::new(0u32);
        let start = Instant::now();
        let _ = wait_for::<(), _, _>(&spec_ms(200, 5000), || {
            calls.set(calls.get() + 1);
            async { Ok(Probe::Absent) }
        })
        .await
        .unwrap_err();

        // One evaluation up front, one at the deadline; the 5s interval must
        // not stretch the 200ms budget.
        assert_eq!(calls.get(), 2);
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_maps_booleans() {
        let calls = Cell::new(0u32);
        wait_until(&spec_ms(1000, 50), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok(n > 2) }
        })
        .await
        .unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let spec = WaitSpec::new("x").with_poll_interval(Duration::ZERO);
        assert_eq!(spec.poll_interval, Duration::from_millis(1));
    }
}
