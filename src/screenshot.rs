//! Failure screenshots
//!
//! Capture runs during teardown, so nothing here is allowed to propagate an
//! error past the teardown boundary: faults are logged and swallowed.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::driver::Driver;

/// File name for a failure screenshot: `{name}_{timestamp}.png`.
pub fn screenshot_path(dir: &Path, scenario_name: &str) -> PathBuf {
    let sanitized: String = scenario_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{sanitized}_{timestamp}.png"))
}

/// Capture a screenshot for a failed scenario. Never fails.
pub async fn capture_on_failure(driver: &dyn Driver, dir: &Path, scenario_name: &str) {
    let bytes = match driver.take_screenshot().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to take screenshot for {scenario_name}: {e}");
            return;
        }
    };

    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Failed to create screenshot dir {}: {e}", dir.display());
        return;
    }

    let path = screenshot_path(dir, scenario_name);
    match std::fs::write(&path, bytes) {
        Ok(()) => info!("Screenshot saved: {}", path.display()),
        Err(e) => warn!("Failed to write screenshot {}: {e}", path.display()),
    }
}
