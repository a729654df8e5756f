//! Suite configuration loaded once at startup
//!
//! The configuration is an explicit value constructed at process start and
//! passed by reference to every component that needs it. There is no ambient
//! static accessor.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SuiteError, SuiteResult};
use crate::wait::WaitSpec;

/// Top-level suite settings, read from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestConfig {
    /// Base URL of the application under test
    pub base_url: String,

    /// Explicit wait budget for pollers, in seconds
    pub timeout_seconds: u64,

    /// Implicit wait applied to presence probes, in seconds
    pub implicit_wait_seconds: u64,

    /// How many times to retry acquiring a driver session
    pub max_retry_attempts: u32,

    /// Capture a screenshot when a scenario fails
    pub screenshot_on_failure: bool,

    pub browser_options: BrowserOptions,

    pub test_data: TestData,
}

/// Options forwarded to the browser session by driver adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_size: String,
    pub disable_notifications: bool,
    pub disable_popup_blocking: bool,
}

/// Canned inputs used by the scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestData {
    pub search_query: String,
    pub valid_email: String,
    pub valid_password: String,
    pub invalid_email: String,
    pub invalid_password: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com".to_string(),
            timeout_seconds: 10,
            implicit_wait_seconds: 5,
            max_retry_attempts: 3,
            screenshot_on_failure: true,
            browser_options: BrowserOptions::default(),
            test_data: TestData::default(),
        }
    }
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            window_size: "1920x1080".to_string(),
            disable_notifications: true,
            disable_popup_blocking: true,
        }
    }
}

impl Default for TestData {
    fn default() -> Self {
        Self {
            search_query: "test query".to_string(),
            valid_email: "test@example.com".to_string(),
            valid_password: "TestPassword123!".to_string(),
            invalid_email: "invalid-email".to_string(),
            invalid_password: "123".to_string(),
        }
    }
}

impl TestConfig {
    /// Load the configuration from a JSON file.
    pub fn load(path: &Path) -> SuiteResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> SuiteResult<()> {
        if self.base_url.is_empty() {
            return Err(SuiteError::Config("baseUrl must not be empty".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(SuiteError::Config("timeoutSeconds must be > 0".into()));
        }
        Ok(())
    }

    /// Explicit wait budget for a named condition.
    pub fn wait_spec(&self, description: &str) -> WaitSpec {
        WaitSpec::new(description).with_timeout(Duration::from_secs(self.timeout_seconds))
    }

    /// Short budget used by presence probes.
    pub fn probe_spec(&self, description: &str) -> WaitSpec {
        WaitSpec::new(description).with_timeout(Duration::from_secs(self.implicit_wait_seconds))
    }

    /// Parse `windowSize` ("1920x1080") into (width, height).
    pub fn window_size(&self) -> SuiteResult<(u32, u32)> {
        let raw = &self.browser_options.window_size;
        let (w, h) = raw
            .split_once('x')
            .ok_or_else(|| SuiteError::Config(format!("invalid windowSize: {raw}")))?;
        let width = w
            .parse()
            .map_err(|_| SuiteError::Config(format!("invalid windowSize width: {raw}")))?;
        let height = h
            .parse()
            .map_err(|_| SuiteError::Config(format!("invalid windowSize height: {raw}")))?;
        Ok((width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TestConfig::default();
        assert_eq!(config.timeout_seconds, 10);
        assert!(config.screenshot_on_failure);
        assert_eq!(config.test_data.invalid_email, "invalid-email");
    }

    #[test]
    fn test_parse_partial_json() {
        let json = r#"{
            "baseUrl": "http://localhost:8080",
            "timeoutSeconds": 3,
            "browserOptions": { "headless": true },
            "testData": { "searchQuery": "rust" }
        }"#;
        let config: TestConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_seconds, 3);
        assert!(config.browser_options.headless);
        assert_eq!(config.test_data.search_query, "rust");
        // unspecified keys fall back to defaults
        assert_eq!(config.test_data.valid_email, "test@example.com");
    }

    #[test]
    fn test_window_size_parse() {
        let config = TestConfig::default();
        assert_eq!(config.window_size().unwrap(), (1920, 1080));

        let mut bad = config.clone();
        bad.browser_options.window_size = "wide".to_string();
        assert!(bad.window_size().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let json = r#"{ "timeoutSeconds": 0 }"#;
        let config: TestConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }
}
