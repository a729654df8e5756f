//! Error types for the test suite

use thiserror::Error;

use crate::driver::DriverError;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("timed out after {elapsed_ms} ms waiting for: {condition}")]
    WaitTimeout { condition: String, elapsed_ms: u64 },

    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SuiteResult<T> = Result<T, SuiteError>;
