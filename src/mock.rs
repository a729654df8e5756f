//! Deterministic in-memory driver
//!
//! A small page model behind the [`Driver`] trait, used by the unit tests,
//! the integration tests, and the bundled harness. Pages hold flat element
//! lists; each element declares the selector alternatives it satisfies, and
//! click/enter effects mutate the model (navigate, reveal, hide) the way a
//! real page would react.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::driver::{Driver, DriverError, DriverResult, ElementHandle, Selector};

/// What happens when an element is clicked or receives Enter.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Load another page.
    Navigate(String),
    /// Make elements carrying this selector alias visible.
    Reveal(String),
    /// Hide elements carrying this selector alias.
    Hide(String),
}

/// One element in a mock page.
#[derive(Debug, Clone)]
pub struct MockElement {
    tag: String,
    aliases: Vec<String>,
    text: String,
    attrs: HashMap<String, String>,
    displayed: bool,
    enabled: bool,
    on_click: Option<Effect>,
    on_enter: Option<Effect>,
}

impl MockElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            aliases: Vec::new(),
            text: String::new(),
            attrs: HashMap::new(),
            displayed: true,
            enabled: true,
            on_click: None,
            on_enter: None,
        }
    }

    /// Declare a selector alternative this element satisfies. The bare tag
    /// name always matches.
    pub fn matches(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn on_click(mut self, effect: Effect) -> Self {
        self.on_click = Some(effect);
        self
    }

    pub fn on_enter(mut self, effect: Effect) -> Self {
        self.on_enter = Some(effect);
        self
    }

    fn matches_alternative(&self, alternative: &str) -> bool {
        self.tag == alternative || self.aliases.iter().any(|a| a == alternative)
    }

    fn matches_selector(&self, selector: &Selector) -> bool {
        selector.alternatives().any(|alt| self.matches_alternative(alt))
    }
}

/// One mock page: a title and a flat element list in document order.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    title: String,
    elements: Vec<MockElement>,
}

impl MockPage {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: Vec::new(),
        }
    }

    pub fn element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }
}

struct Stored {
    id: u64,
    element: MockElement,
}

struct State {
    pages: HashMap<String, Vec<Stored>>,
    titles: HashMap<String, String>,
    current_url: String,
    window: (u32, u32),
    script_results: Vec<(String, Value)>,
    next_find_error: Option<DriverError>,
    resize_calls: u32,
    fail_resizes_after: Option<u32>,
    fail_screenshots: bool,
    fail_quit: bool,
    quit: bool,
}

/// In-memory [`Driver`] implementation.
pub struct MockDriver {
    state: Mutex<State>,
}

pub struct MockDriverBuilder {
    pages: Vec<(String, MockPage)>,
    start_at: Option<String>,
    script_results: Vec<(String, Value)>,
}

impl MockDriverBuilder {
    pub fn page(mut self, url: impl Into<String>, page: MockPage) -> Self {
        self.pages.push((url.into(), page));
        self
    }

    pub fn start_at(mut self, url: impl Into<String>) -> Self {
        self.start_at = Some(url.into());
        self
    }

    /// Canned answer for any script containing `fragment`.
    pub fn script_result(mut self, fragment: impl Into<String>, value: Value) -> Self {
        self.script_results.push((fragment.into(), value));
        self
    }

    pub fn build(self) -> MockDriver {
        let mut next_id = 1u64;
        let mut pages = HashMap::new();
        let mut titles = HashMap::new();
        let start = self
            .start_at
            .or_else(|| self.pages.first().map(|(url, _)| url.clone()))
            .unwrap_or_else(|| "about:blank".to_string());

        for (url, page) in self.pages {
            let stored: Vec<Stored> = page
                .elements
                .into_iter()
                .map(|element| {
                    let id = next_id;
                    next_id += 1;
                    Stored { id, element }
                })
                .collect();
            titles.insert(url.clone(), page.title);
            pages.insert(url, stored);
        }

        MockDriver {
            state: Mutex::new(State {
                pages,
                titles,
                current_url: start,
                window: (1920, 1080),
                script_results: self.script_results,
                next_find_error: None,
                resize_calls: 0,
                fail_resizes_after: None,
                fail_screenshots: false,
                fail_quit: false,
                quit: false,
            }),
        }
    }
}

impl MockDriver {
    pub fn builder() -> MockDriverBuilder {
        MockDriverBuilder {
            pages: Vec::new(),
            start_at: None,
            script_results: Vec::new(),
        }
    }

    /// Make the next `find`/`find_all` call fail with `error`. Used to verify
    /// that probe faults are not misread as absence.
    pub fn fail_next_find(&self, error: DriverError) {
        self.state.lock().unwrap().next_find_error = Some(error);
    }

    pub fn fail_screenshots(&self) {
        self.state.lock().unwrap().fail_screenshots = true;
    }

    /// Let the first `n` window resizes succeed and fail every one after.
    pub fn fail_window_resizes_after(&self, n: u32) {
        self.state.lock().unwrap().fail_resizes_after = Some(n);
    }

    pub fn fail_quit(&self) {
        self.state.lock().unwrap().fail_quit = true;
    }

    pub fn was_quit(&self) -> bool {
        self.state.lock().unwrap().quit
    }

    fn with_element<T>(
        &self,
        el: ElementHandle,
        f: impl FnOnce(&mut State, usize) -> T,
    ) -> DriverResult<T> {
        let mut state = self.state.lock().unwrap();
        let current = state.current_url.clone();
        let index = state
            .pages
            .get(&current)
            .and_then(|els| els.iter().position(|s| s.id == el.0))
            .ok_or_else(|| DriverError::NotFound(format!("element #{}", el.0)))?;
        Ok(f(&mut state, index))
    }
}

fn apply_effect(state: &mut State, effect: &Effect) {
    match effect {
        Effect::Navigate(url) => {
            state.pages.entry(url.clone()).or_default();
            state.current_url = url.clone();
        }
        Effect::Reveal(alias) => set_displayed(state, alias, true),
        Effect::Hide(alias) => set_displayed(state, alias, false),
    }
}

fn set_displayed(state: &mut State, alias: &str, displayed: bool) {
    let current = state.current_url.clone();
    if let Some(elements) = state.pages.get_mut(&current) {
        for stored in elements.iter_mut() {
            if stored.element.matches_alternative(alias) {
                stored.element.displayed = displayed;
            }
        }
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.pages.entry(url.to_string()).or_default();
        state.current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.state.lock().unwrap().current_url.clone())
    }

    async fn title(&self) -> DriverResult<String> {
        let state = self.state.lock().unwrap();
        Ok(state
            .titles
            .get(&state.current_url)
            .cloned()
            .unwrap_or_default())
    }

    async fn find(&self, selector: &Selector) -> DriverResult<Option<ElementHandle>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    async fn find_all(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.next_find_error.take() {
            return Err(error);
        }
        let current = state.current_url.clone();
        Ok(state
            .pages
            .get(&current)
            .map(|elements| {
                elements
                    .iter()
                    .filter(|s| s.element.matches_selector(selector))
                    .map(|s| ElementHandle(s.id))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn click(&self, el: ElementHandle) -> DriverResult<()> {
        let effect = self.with_element(el, |state, i| {
            state.pages[&state.current_url][i].element.on_click.clone()
        })?;
        if let Some(effect) = effect {
            apply_effect(&mut self.state.lock().unwrap(), &effect);
        }
        Ok(())
    }

    async fn clear(&self, el: ElementHandle) -> DriverResult<()> {
        self.with_element(el, |state, i| {
            let current = state.current_url.clone();
            let stored = &mut state.pages.get_mut(&current).unwrap()[i];
            stored.element.attrs.remove("value");
        })
    }

    async fn send_keys(&self, el: ElementHandle, text: &str) -> DriverResult<()> {
        let effect = self.with_element(el, |state, i| {
            let current = state.current_url.clone();
            let stored = &mut state.pages.get_mut(&current).unwrap()[i];
            let typed = text.trim_end_matches('\n');
            stored
                .element
                .attrs
                .entry("value".to_string())
                .or_default()
                .push_str(typed);
            if text.contains('\n') {
                stored.element.on_enter.clone()
            } else {
                None
            }
        })?;
        if let Some(effect) = effect {
            apply_effect(&mut self.state.lock().unwrap(), &effect);
        }
        Ok(())
    }

    async fn text(&self, el: ElementHandle) -> DriverResult<String> {
        self.with_element(el, |state, i| {
            state.pages[&state.current_url][i].element.text.clone()
        })
    }

    async fn attr(&self, el: ElementHandle, name: &str) -> DriverResult<Option<String>> {
        self.with_element(el, |state, i| {
            state.pages[&state.current_url][i]
                .element
                .attrs
                .get(name)
                .cloned()
        })
    }

    async fn tag_name(&self, el: ElementHandle) -> DriverResult<String> {
        self.with_element(el, |state, i| {
            state.pages[&state.current_url][i].element.tag.clone()
        })
    }

    async fn is_displayed(&self, el: ElementHandle) -> DriverResult<bool> {
        self.with_element(el, |state, i| {
            state.pages[&state.current_url][i].element.displayed
        })
    }

    async fn is_enabled(&self, el: ElementHandle) -> DriverResult<bool> {
        self.with_element(el, |state, i| {
            state.pages[&state.current_url][i].element.enabled
        })
    }

    async fn execute_script(&self, script: &str) -> DriverResult<Value> {
        let state = self.state.lock().unwrap();
        for (fragment, value) in &state.script_results {
            if script.contains(fragment.as_str()) {
                return Ok(value.clone());
            }
        }
        // Defaults for the scripts the suite relies on.
        if script.contains("readyState") {
            Ok(json!("complete"))
        } else if script.contains("scrollWidth >") {
            Ok(json!(false))
        } else if script.contains("clientWidth") {
            Ok(json!(state.window.0))
        } else {
            Ok(Value::Null)
        }
    }

    async fn take_screenshot(&self) -> DriverResult<Vec<u8>> {
        let state = self.state.lock().unwrap();
        if state.fail_screenshots {
            return Err(DriverError::Session("screenshot capture failed".into()));
        }
        // Minimal PNG header; enough for reporting tests.
        Ok(vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'])
    }

    async fn set_window_size(&self, width: u32, height: u32) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.resize_calls += 1;
        if let Some(limit) = state.fail_resizes_after {
            if state.resize_calls > limit {
                return Err(DriverError::Session("window resize failed".into()));
            }
        }
        state.window = (width, height);
        Ok(())
    }

    async fn window_size(&self) -> DriverResult<(u32, u32)> {
        Ok(self.state.lock().unwrap().window)
    }

    async fn quit(&self) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_quit {
            return Err(DriverError::Session("session close failed".into()));
        }
        state.quit = true;
        Ok(())
    }
}

/// A small demo site exercising every scenario in the suite.
pub fn fixture_site(base_url: &str) -> MockDriver {
    let base = base_url.trim_end_matches('/');
    let home_url = format!("{base}/");
    let about_url = format!("{base}/about");
    let login_url = format!("{base}/login");
    let contact_url = format!("{base}/contact");
    let thanks_url = format!("{base}/contact/thanks");
    let search_url = format!("{base}/search?q=test+query");

    let home = MockPage::new("Example Domain - Home")
        .element(MockElement::new("html").attr("lang", "en"))
        .element(MockElement::new("meta").matches("meta[name='description']"))
        .element(MockElement::new("h1").text("Welcome"))
        .element(MockElement::new("header"))
        .element(MockElement::new("nav"))
        .element(
            MockElement::new("img")
                .matches(".logo")
                .attr("alt", "site logo"),
        )
        .element(
            MockElement::new("a")
                .matches("nav a")
                .matches("header a")
                .text("About")
                .attr("href", about_url.clone())
                .on_click(Effect::Navigate(about_url.clone())),
        )
        .element(
            MockElement::new("a")
                .matches("a[href*='login']")
                .matches(".login-link")
                .text("Sign in")
                .attr("href", login_url.clone())
                .on_click(Effect::Navigate(login_url.clone())),
        )
        .element(
            MockElement::new("a")
                .matches("a[href*='contact']")
                .matches(".contact-link")
                .text("Contact")
                .attr("href", contact_url.clone())
                .on_click(Effect::Navigate(contact_url.clone())),
        )
        .element(
            MockElement::new("input")
                .matches("input[type='search']")
                .matches("#search")
                .attr("placeholder", "search the site")
                .on_enter(Effect::Navigate(search_url.clone())),
        )
        .element(
            MockElement::new("form")
                .matches("form.newsletter"),
        )
        .element(
            MockElement::new("input")
                .matches("form input[type='email']")
                .attr("type", "email"),
        )
        .element(
            MockElement::new("button")
                .matches("form button[type='submit']")
                .on_click(Effect::Reveal(".invalid".to_string())),
        )
        .element(
            MockElement::new("span")
                .matches(".invalid")
                .text("Please enter a valid email address")
                .hidden(),
        )
        .element(
            MockElement::new("button")
                .matches(".modal-trigger")
                .matches("button:not([type='submit'])")
                .text("Open dialog")
                .on_click(Effect::Reveal(".modal-parts".to_string())),
        )
        .element(
            MockElement::new("div")
                .matches(".modal")
                .matches(".modal-parts")
                .hidden(),
        )
        .element(
            MockElement::new("button")
                .matches(".modal .close")
                .matches("[data-dismiss='modal']")
                .matches(".modal-parts")
                .hidden()
                .on_click(Effect::Hide(".modal-parts".to_string())),
        )
        .element(MockElement::new("footer"));

    let about = MockPage::new("About - Example Domain")
        .element(MockElement::new("html").attr("lang", "en"))
        .element(MockElement::new("header"))
        .element(MockElement::new("h1").text("About us"))
        .element(MockElement::new("footer"));

    let login = MockPage::new("Sign in - Example Domain")
        .element(MockElement::new("html").attr("lang", "en"))
        .element(
            MockElement::new("input")
                .matches("input[type='email']")
                .matches("input[name*='email']")
                .attr("type", "email"),
        )
        .element(
            MockElement::new("input")
                .matches("input[type='password']")
                .attr("type", "password"),
        )
        .element(
            MockElement::new("button")
                .matches("button[type='submit']")
                .matches(".login-button")
                .on_click(Effect::Reveal(".error".to_string())),
        )
        .element(
            MockElement::new("div")
                .matches(".error")
                .matches(".invalid-credentials")
                .text("Invalid email or password")
                .hidden(),
        );

    let contact = MockPage::new("Contact - Example Domain")
        .element(MockElement::new("html").attr("lang", "en"))
        .element(MockElement::new("form"))
        .element(
            MockElement::new("input")
                .matches("input[name*='name']")
                .matches("#name"),
        )
        .element(
            MockElement::new("input")
                .matches("input[type='email']")
                .matches("input[name*='email']")
                .attr("type", "email"),
        )
        .element(
            MockElement::new("textarea")
                .matches("textarea")
                .matches("#message"),
        )
        .element(
            MockElement::new("button")
                .matches("button[type='submit']")
                .matches(".submit-button")
                .on_click(Effect::Navigate(thanks_url.clone())),
        );

    let thanks = MockPage::new("Thank you - Example Domain")
        .element(MockElement::new("html").attr("lang", "en"))
        .element(
            MockElement::new("div")
                .matches(".success")
                .text("Thanks, we got your message"),
        );

    let search = MockPage::new("Search results - Example Domain")
        .element(MockElement::new("html").attr("lang", "en"))
        .element(MockElement::new("div").matches(".search-results"));

    MockDriver::builder()
        .page(home_url.clone(), home)
        .page(about_url, about)
        .page(login_url, login)
        .page(contact_url, contact)
        .page(thanks_url, thanks)
        .page(search_url, search)
        .start_at(home_url)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_matches_tag_and_alias() {
        let driver = MockDriver::builder()
            .page(
                "http://t/",
                MockPage::new("t")
                    .element(MockElement::new("header"))
                    .element(MockElement::new("input").matches("#search")),
            )
            .build();

        assert!(driver
            .find(&Selector::css("header"))
            .await
            .unwrap()
            .is_some());
        assert!(driver
            .find(&Selector::css("input[type='search'], #search"))
            .await
            .unwrap()
            .is_some());
        assert!(driver.find(&Selector::css(".missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_click_effect_navigates() {
        let driver = fixture_site("http://t");
        let link = driver
            .find(&Selector::css(".login-link"))
            .await
            .unwrap()
            .unwrap();
        driver.click(link).await.unwrap();
        assert_eq!(driver.current_url().await.unwrap(), "http://t/login");
        // handles from the previous page are stale now
        assert!(driver.click(link).await.is_err());
    }

    #[tokio::test]
    async fn test_enter_effect_fires_on_newline() {
        let driver = fixture_site("http://t");
        let search = driver
            .find(&Selector::css("#search"))
            .await
            .unwrap()
            .unwrap();
        driver.send_keys(search, "test query").await.unwrap();
        assert_eq!(driver.current_url().await.unwrap(), "http://t/");
        driver.send_keys(search, "\n").await.unwrap();
        assert!(driver.current_url().await.unwrap().contains("q="));
    }

    #[tokio::test]
    async fn test_reveal_and_hide() {
        let driver = fixture_site("http://t");
        let modal = driver.find(&Selector::css(".modal")).await.unwrap().unwrap();
        assert!(!driver.is_displayed(modal).await.unwrap());

        let trigger = driver
            .find(&Selector::css(".modal-trigger"))
            .await
            .unwrap()
            .unwrap();
        driver.click(trigger).await.unwrap();
        assert!(driver.is_displayed(modal).await.unwrap());

        let close = driver
            .find(&Selector::css(".modal .close"))
            .await
            .unwrap()
            .unwrap();
        driver.click(close).await.unwrap();
        assert!(!driver.is_displayed(modal).await.unwrap());
    }

    #[tokio::test]
    async fn test_fail_next_find_fires_once() {
        let driver = fixture_site("http://t");
        driver.fail_next_find(DriverError::Session("connection reset".into()));
        assert!(driver.find(&Selector::css("header")).await.is_err());
        assert!(driver.find(&Selector::css("header")).await.is_ok());
    }
}
