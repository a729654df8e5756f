//! Soft assertions
//!
//! A scenario runs every one of its named checks regardless of earlier
//! failures and reports all failure messages in one verdict, so a single run
//! gives the full picture. Checks are cheap boolean evaluations over state the
//! scenario already observed through the driver.

use serde::{Deserialize, Serialize};

use crate::error::SuiteResult;
use crate::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// Not applicable on this page; counts toward neither pass nor fail.
    Skipped,
}

/// One named check. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

/// Ordered collector of check results for one scenario.
#[derive(Debug, Default)]
pub struct Checks {
    results: Vec<CheckResult>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a boolean check. `message` is reported when the check fails.
    pub fn check(&mut self, name: &str, passed: bool, message: impl Into<String>) -> &mut Self {
        self.results.push(CheckResult {
            name: name.to_string(),
            status: if passed {
                CheckStatus::Passed
            } else {
                CheckStatus::Failed
            },
            message: message.into(),
        });
        self
    }

    /// Record a check whose evaluation may itself fail. An error is folded
    /// into a failed check carrying the error text, not propagated.
    pub fn check_fn(
        &mut self,
        name: &str,
        message: impl Into<String>,
        eval: impl FnOnce() -> SuiteResult<bool>,
    ) -> &mut Self {
        match eval() {
            Ok(passed) => self.check(name, passed, message),
            Err(e) => {
                self.results.push(CheckResult {
                    name: name.to_string(),
                    status: CheckStatus::Failed,
                    message: format!("{}: {e}", message.into()),
                });
                self
            }
        }
    }

    /// Record a not-applicable check.
    pub fn skip(&mut self, name: &str, reason: impl Into<String>) -> &mut Self {
        self.results.push(CheckResult {
            name: name.to_string(),
            status: CheckStatus::Skipped,
            message: reason.into(),
        });
        self
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Collapse the batch into one verdict.
    ///
    /// Any failed check makes the batch a failure carrying every failing
    /// message in order. A batch that executed nothing (empty, or skipped
    /// throughout) is inconclusive, not a pass.
    pub fn into_outcome(self) -> Outcome {
        let failing: Vec<String> = self
            .results
            .iter()
            .filter(|c| c.status == CheckStatus::Failed)
            .map(|c| c.message.clone())
            .collect();

        if !failing.is_empty() {
            Outcome::Failed { reasons: failing }
        } else if self
            .results
            .iter()
            .any(|c| c.status == CheckStatus::Passed)
        {
            Outcome::Passed
        } else {
            Outcome::inconclusive("no applicable checks were executed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[true, true, true] => true; "all passing")]
    #[test_case(&[true, false] => false; "one failing")]
    #[test_case(&[false, false] => false; "all failing")]
    fn batch_passes(flags: &[bool]) -> bool {
        let mut checks = Checks::new();
        for (i, &flag) in flags.iter().enumerate() {
            checks.check(&format!("c{i}"), flag, format!("c{i} failed"));
        }
        checks.into_outcome() == Outcome::Passed
    }

    #[test]
    fn test_all_failing_messages_reported_in_order() {
        let mut checks = Checks::new();
        checks
            .check("hasHeader", false, "header missing")
            .check("hasFooter", true, "footer missing")
            .check("hasNav", false, "nav missing");

        match checks.into_outcome() {
            Outcome::Failed { reasons } => {
                assert_eq!(reasons, vec!["header missing", "nav missing"]);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_only_failing_messages_are_reported() {
        let mut checks = Checks::new();
        checks
            .check("hasTitle", true, "no title")
            .check("titleLength", false, "too short");
        assert_eq!(checks.into_outcome(), Outcome::failed(["too short"]));
    }

    #[test]
    fn test_empty_batch_is_inconclusive() {
        assert!(matches!(
            Checks::new().into_outcome(),
            Outcome::Inconclusive { .. }
        ));
    }

    #[test]
    fn test_all_skipped_batch_is_inconclusive() {
        let mut checks = Checks::new();
        checks
            .skip("mobileNav", "no mobile nav on this page")
            .skip("sidebar", "no sidebar on this page");
        assert!(matches!(
            checks.into_outcome(),
            Outcome::Inconclusive { .. }
        ));
    }

    #[test]
    fn test_check_fn_folds_error_into_failure() {
        let mut checks = Checks::new();
        checks.check_fn("brokenEval", "could not read attribute", || {
            Err(crate::error::SuiteError::AssertionFailed(
                "stale handle".to_string(),
            ))
        });
        match checks.into_outcome() {
            Outcome::Failed { reasons } => {
                assert_eq!(reasons.len(), 1);
                assert!(reasons[0].contains("could not read attribute"));
                assert!(reasons[0].contains("stale handle"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_skipped_alongside_passed_still_passes() {
        let mut checks = Checks::new();
        checks
            .check("hasTitle", true, "no title")
            .skip("optionalWidget", "widget absent");
        assert_eq!(checks.into_outcome(), Outcome::Passed);
    }
}
