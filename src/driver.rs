//! Browser driver facade
//!
//! The suite is written against this trait, not against any particular
//! automation library. Anything that can look elements up by CSS selector,
//! navigate, run JavaScript, and capture screenshots is substitutable.
//! The in-tree [`crate::mock::MockDriver`] implements it for deterministic
//! tests; real browser adapters live outside this crate.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised at the driver boundary.
///
/// Probe-level absence is not an error: [`Driver::find`] returns `Ok(None)`
/// for a selector that matches nothing. `NotFound` is reserved for operations
/// on a handle whose element is gone (navigation, DOM mutation).
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("element no longer attached: {0}")]
    NotFound(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("session error: {0}")]
    Session(String),
}

pub type DriverResult<T> = Result<T, DriverError>;

/// A CSS selector, possibly listing comma-separated alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    css: String,
}

impl Selector {
    pub fn css(css: impl Into<String>) -> Self {
        Self { css: css.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.css
    }

    /// The individual comma-separated alternatives.
    pub fn alternatives(&self) -> impl Iterator<Item = &str> {
        self.css.split(',').map(str::trim).filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.css)
    }
}

/// Opaque reference to an element in the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// The browser capabilities the suite consumes.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    async fn current_url(&self) -> DriverResult<String>;

    async fn title(&self) -> DriverResult<String>;

    /// Look up the first element matching `selector`. Absence is `Ok(None)`.
    async fn find(&self, selector: &Selector) -> DriverResult<Option<ElementHandle>>;

    /// Look up all elements matching `selector`, in document order.
    async fn find_all(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>>;

    async fn click(&self, el: ElementHandle) -> DriverResult<()>;

    async fn clear(&self, el: ElementHandle) -> DriverResult<()>;

    async fn send_keys(&self, el: ElementHandle, text: &str) -> DriverResult<()>;

    async fn text(&self, el: ElementHandle) -> DriverResult<String>;

    async fn attr(&self, el: ElementHandle, name: &str) -> DriverResult<Option<String>>;

    async fn tag_name(&self, el: ElementHandle) -> DriverResult<String>;

    async fn is_displayed(&self, el: ElementHandle) -> DriverResult<bool>;

    async fn is_enabled(&self, el: ElementHandle) -> DriverResult<bool>;

    async fn execute_script(&self, script: &str) -> DriverResult<serde_json::Value>;

    async fn take_screenshot(&self) -> DriverResult<Vec<u8>>;

    async fn set_window_size(&self, width: u32, height: u32) -> DriverResult<()>;

    async fn window_size(&self) -> DriverResult<(u32, u32)>;

    /// Release the session. Idempotent.
    async fn quit(&self) -> DriverResult<()>;
}

/// First matching element that is currently displayed, if any.
pub async fn first_displayed(
    driver: &dyn Driver,
    selector: &Selector,
) -> DriverResult<Option<ElementHandle>> {
    for el in driver.find_all(selector).await? {
        if driver.is_displayed(el).await? {
            return Ok(Some(el));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_alternatives() {
        let sel = Selector::css("nav a, .navigation a , header a");
        let alts: Vec<&str> = sel.alternatives().collect();
        assert_eq!(alts, vec!["nav a", ".navigation a", "header a"]);
    }

    #[test]
    fn test_selector_display() {
        let sel = Selector::css("#search");
        assert_eq!(sel.to_string(), "#search");
    }
}
