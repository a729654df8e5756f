//! webcheck - browser E2E test suite
//!
//! Drives a real browser (through the [`driver::Driver`] facade) against a
//! target web application and reports one of three verdicts per scenario:
//! Passed, Failed with every failing check's message, or Inconclusive when
//! the feature under test is absent from the page.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    Scenario Runner                     │
//! │   setup (acquire session) -> body -> teardown          │
//! ├────────────────────────────────────────────────────────┤
//! │  suite: locate -> act -> wait -> soft-check sequences  │
//! │    ├── wait: bounded polling, tri-state probes         │
//! │    ├── check: non-short-circuiting soft assertions     │
//! │    └── pages: named selector groups                    │
//! ├────────────────────────────────────────────────────────┤
//! │  driver: Driver trait (find / navigate / script /      │
//! │          screenshot) - adapters live outside the crate │
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod check;
pub mod config;
pub mod driver;
pub mod error;
pub mod mock;
pub mod outcome;
pub mod pages;
pub mod scenario;
pub mod screenshot;
pub mod suite;
pub mod wait;

pub use check::{CheckResult, CheckStatus, Checks};
pub use config::TestConfig;
pub use driver::{Driver, DriverError, ElementHandle, Selector};
pub use error::{SuiteError, SuiteResult};
pub use outcome::{Outcome, RunReport, ScenarioReport};
pub use scenario::{ScenarioRunner, ScenarioSpec};
pub use wait::{Probe, WaitSpec};
