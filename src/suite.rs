//! The scenario set
//!
//! Each scenario is a sequence of locate/act/wait steps over the driver
//! facade followed by a batch of soft checks. Scenarios exercising optional
//! page affordances probe for the feature first and return an inconclusive
//! verdict when it is absent; once the feature is known to exist, every
//! further problem is an authoritative failure.

use futures::FutureExt;
use tokio::time::Instant;
use tracing::warn;

use crate::check::Checks;
use crate::config::TestConfig;
use crate::driver::{first_displayed, Driver, Selector};
use crate::error::{SuiteError, SuiteResult};
use crate::outcome::Outcome;
use crate::pages::{ContactPage, HomePage, LoginPage};
use crate::scenario::ScenarioSpec;
use crate::wait::{self, Probe};

/// All registered scenarios, in execution order.
pub fn scenarios() -> Vec<ScenarioSpec> {
    vec![
        ScenarioSpec {
            name: "homepage_loads",
            body: |d, c| homepage_loads(d, c).boxed(),
        },
        ScenarioSpec {
            name: "essential_elements",
            body: |d, c| essential_elements(d, c).boxed(),
        },
        ScenarioSpec {
            name: "navigation_links",
            body: |d, c| navigation_links(d, c).boxed(),
        },
        ScenarioSpec {
            name: "search",
            body: |d, c| search(d, c).boxed(),
        },
        ScenarioSpec {
            name: "form_validation",
            body: |d, c| form_validation(d, c).boxed(),
        },
        ScenarioSpec {
            name: "form_submission",
            body: |d, c| form_submission(d, c).boxed(),
        },
        ScenarioSpec {
            name: "login_invalid_credentials",
            body: |d, c| login_invalid_credentials(d, c).boxed(),
        },
        ScenarioSpec {
            name: "modal_dialog",
            body: |d, c| modal_dialog(d, c).boxed(),
        },
        ScenarioSpec {
            name: "button_click",
            body: |d, c| button_click(d, c).boxed(),
        },
        ScenarioSpec {
            name: "responsive_layout",
            body: |d, c| responsive_layout(d, c).boxed(),
        },
        ScenarioSpec {
            name: "breakpoint_transitions",
            body: |d, c| breakpoint_transitions(d, c).boxed(),
        },
        ScenarioSpec {
            name: "page_load_performance",
            body: |d, c| page_load_performance(d, c).boxed(),
        },
    ]
}

/// Homepage loads and carries a title and the expected URL.
pub async fn homepage_loads(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;

    let title = driver.title().await?;
    let url = driver.current_url().await?;
    let base = config.base_url.trim_end_matches('/');

    let mut checks = Checks::new();
    checks
        .check("title_present", !title.is_empty(), "page title should not be empty")
        .check(
            "url_contains_base",
            url.contains(base),
            format!("url {url} should contain base url {base}"),
        );
    Ok(checks.into_outcome())
}

/// Header, footer, navigation, and logo are present.
pub async fn essential_elements(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;

    let header = wait::probe(driver, &HomePage::header()).await?.is_present();
    let footer = wait::probe(driver, &HomePage::footer()).await?.is_present();
    let nav = wait::probe(driver, &HomePage::navigation()).await?.is_present();
    let logo = wait::probe(driver, &HomePage::logo()).await?.is_present();

    let mut checks = Checks::new();
    checks
        .check("header_present", header, "header should be present")
        .check("footer_present", footer, "footer should be present")
        .check("nav_present", nav, "navigation menu should be present")
        .check("logo_present", logo, "logo should be present");
    Ok(checks.into_outcome())
}

/// Clicking the first real navigation link changes the URL.
pub async fn navigation_links(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;
    let initial = driver.current_url().await?;

    let mut target = None;
    for link in driver.find_all(&HomePage::nav_links()).await? {
        if let Some(href) = driver.attr(link, "href").await? {
            if !href.is_empty() && !href.starts_with("javascript:") && !href.starts_with('#') {
                target = Some(link);
                break;
            }
        }
    }
    let Some(link) = target else {
        return Ok(Outcome::inconclusive("no valid navigation links found"));
    };

    driver.click(link).await?;
    let new_url = wait::wait_for_url_change(
        driver,
        &initial,
        &config.wait_spec("url change after clicking navigation link"),
    )
    .await?;
    wait::wait_for_page_load(driver, &config.wait_spec("page load after navigation")).await?;

    let mut checks = Checks::new();
    checks.check(
        "url_changed",
        new_url != initial,
        format!("url should change after clicking navigation link (still {initial})"),
    );
    Ok(checks.into_outcome())
}

/// Search, when the page has a search box at all.
pub async fn search(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;

    let probe_spec = config.probe_spec("search box");
    if let Probe::Absent = wait::probe_within(driver, &HomePage::search_box(), &probe_spec).await? {
        return Ok(Outcome::inconclusive("search functionality not found on the page"));
    }

    let initial = driver.current_url().await?;
    HomePage::new(driver)
        .perform_search(&config.test_data.search_query)
        .await?;

    let initial_ref: &str = &initial;
    let results_url = wait::wait_for(
        &config.wait_spec("search results or url change"),
        move || {
            let d = driver;
            let init = initial_ref;
            async move {
                let url = d.current_url().await?;
                if url != init {
                    return Ok(Probe::Present(url));
                }
                let results = Selector::css(".search-results, .results");
                Ok(if d.find(&results).await?.is_some() {
                    Probe::Present(url)
                } else {
                    Probe::Absent
                })
            }
        },
    )
    .await?;

    let mut checks = Checks::new();
    checks.check(
        "search_reflected_in_url",
        results_url.contains("search")
            || results_url.contains("query")
            || results_url.contains("q="),
        format!("url {results_url} should indicate a search was performed"),
    );
    Ok(checks.into_outcome())
}

/// Submitting a form with invalid data surfaces validation feedback.
pub async fn form_validation(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;

    let probe_spec = config.probe_spec("testable form");
    if let Probe::Absent = wait::probe_within(driver, &Selector::css("form"), &probe_spec).await? {
        return Ok(Outcome::inconclusive("no testable forms found on the page"));
    }

    let inputs_sel = Selector::css("form input[type='text'], form input[type='email'], form textarea");
    let mut inputs = Vec::new();
    for el in driver.find_all(&inputs_sel).await? {
        if driver.is_displayed(el).await? {
            inputs.push(el);
        }
    }
    let submit_sel = Selector::css("form button[type='submit'], form input[type='submit']");
    let submit = first_displayed(driver, &submit_sel).await?;

    let (Some(submit), false) = (submit, inputs.is_empty()) else {
        return Ok(Outcome::inconclusive(
            "no suitable form inputs found for validation testing",
        ));
    };

    for &input in inputs.iter().take(2) {
        driver.clear(input).await?;
        let kind = driver.attr(input, "type").await?;
        if kind.as_deref() == Some("email") {
            driver.send_keys(input, &config.test_data.invalid_email).await?;
        } else {
            driver.send_keys(input, "x").await?;
        }
    }
    driver.click(submit).await?;

    let indicator = Selector::css(".error, .invalid, [aria-invalid='true']");
    wait::wait_for_element(
        driver,
        &indicator,
        &config.wait_spec("validation feedback for invalid form data"),
    )
    .await?;

    let shown = first_displayed(driver, &indicator).await?.is_some();
    let mut checks = Checks::new();
    checks.check(
        "validation_feedback_shown",
        shown,
        "form should show validation errors for invalid data",
    );
    Ok(checks.into_outcome())
}

/// The contact form accepts valid data.
pub async fn form_submission(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;

    let probe_spec = config.probe_spec("contact link");
    match wait::probe_within(driver, &HomePage::contact_link(), &probe_spec).await? {
        Probe::Present(link) => {
            driver.click(link).await?;
            wait::wait_for_page_load(driver, &config.wait_spec("contact page load")).await?;
        }
        Probe::Absent => {
            return Ok(Outcome::inconclusive("no contact link found on the page"));
        }
    }

    let name = wait::probe(driver, &ContactPage::name_field()).await?;
    let email = wait::probe(driver, &ContactPage::email_field()).await?;
    let submit = wait::probe(driver, &ContactPage::submit_button()).await?;
    if !(name.is_present() && email.is_present() && submit.is_present()) {
        return Ok(Outcome::inconclusive("required contact form fields not found"));
    }

    let initial = driver.current_url().await?;
    ContactPage::new(driver)
        .submit_message(
            "Test User",
            &config.test_data.valid_email,
            "This is a test message for automated testing.",
        )
        .await?;

    let initial_ref: &str = &initial;
    wait::wait_until(
        &config.wait_spec("form submission acknowledgement"),
        move || {
            let d = driver;
            let init = initial_ref;
            async move {
                if d.current_url().await? != init {
                    return Ok(true);
                }
                Ok(d.find(&ContactPage::success_message()).await?.is_some())
            }
        },
    )
    .await?;

    let url = driver.current_url().await?;
    let success = url != initial
        || first_displayed(driver, &ContactPage::success_message())
            .await?
            .is_some();
    let mut checks = Checks::new();
    checks.check(
        "submission_acknowledged",
        success,
        "form should submit successfully with valid data",
    );
    Ok(checks.into_outcome())
}

/// Login rejects invalid credentials with a visible error.
pub async fn login_invalid_credentials(
    driver: &dyn Driver,
    config: &TestConfig,
) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;

    // Follow the login link when the page has one; some sites render the
    // login form inline.
    if let Probe::Present(link) =
        wait::probe_displayed(driver, &HomePage::login_link()).await?
    {
        driver.click(link).await?;
        wait::wait_for_page_load(driver, &config.wait_spec("login page load")).await?;
    }

    let email = wait::probe_displayed(driver, &LoginPage::email_field()).await?;
    let password = wait::probe_displayed(driver, &LoginPage::password_field()).await?;
    let submit = wait::probe_displayed(driver, &LoginPage::submit_button()).await?;
    if !(email.is_present() && password.is_present() && submit.is_present()) {
        return Ok(Outcome::inconclusive("login form elements not found"));
    }

    LoginPage::new(driver)
        .login(
            &config.test_data.invalid_email,
            &config.test_data.invalid_password,
        )
        .await?;

    wait::wait_for_element(
        driver,
        &LoginPage::error_message(),
        &config.wait_spec("error message for invalid credentials"),
    )
    .await?;

    let shown = first_displayed(driver, &LoginPage::error_message())
        .await?
        .is_some();
    let mut checks = Checks::new();
    checks.check(
        "error_displayed",
        shown,
        "error message should appear for invalid login credentials",
    );
    Ok(checks.into_outcome())
}

/// A modal trigger, when present, opens and closes a dialog.
pub async fn modal_dialog(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;

    let trigger_sel =
        Selector::css("[data-toggle='modal'], .modal-trigger, button[data-target*='modal']");
    let probe_spec = config.probe_spec("modal trigger");
    let trigger = match wait::probe_within(driver, &trigger_sel, &probe_spec).await? {
        Probe::Present(el) => el,
        Probe::Absent => {
            return Ok(Outcome::inconclusive("no modal triggers found on the page"));
        }
    };

    driver.click(trigger).await?;
    let dialog_sel = Selector::css(".modal, .popup, .dialog, [role='dialog']");
    wait::wait_for_element(driver, &dialog_sel, &config.wait_spec("modal to appear")).await?;

    let mut checks = Checks::new();
    let visible = first_displayed(driver, &dialog_sel).await?.is_some();
    checks.check(
        "modal_appeared",
        visible,
        "modal should appear when trigger is clicked",
    );

    let close_sel = Selector::css(".modal .close, .popup .close, [data-dismiss='modal']");
    match first_displayed(driver, &close_sel).await? {
        Some(close) => {
            driver.click(close).await?;
            let dialog_ref = &dialog_sel;
            wait::wait_until(&config.wait_spec("modal to close"), move || {
                let d = driver;
                let sel = dialog_ref;
                async move { Ok(first_displayed(d, sel).await?.is_none()) }
            })
            .await?;
            checks.check("modal_dismissed", true, "modal should close");
        }
        None => {
            checks.skip("modal_dismissed", "no close control found");
        }
    }
    Ok(checks.into_outcome())
}

/// A generic non-submit button, when present, produces an observable effect:
/// a class change, a navigation, or an overlay.
pub async fn button_click(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;

    let buttons_sel = Selector::css(
        "button:not([type='submit']), .btn:not([type='submit']), input[type='button']",
    );
    let mut candidate = None;
    for el in driver.find_all(&buttons_sel).await? {
        if driver.is_displayed(el).await? && driver.is_enabled(el).await? {
            candidate = Some(el);
            break;
        }
    }
    let Some(button) = candidate else {
        return Ok(Outcome::inconclusive("no testable buttons found on the page"));
    };

    let initial_url = driver.current_url().await?;
    let initial_class = driver.attr(button, "class").await?;

    driver.click(button).await?;

    let overlay_sel = Selector::css(".modal, .popup, .dropdown-menu");
    let initial_url_ref: &str = &initial_url;
    let initial_class_ref = initial_class.as_deref();
    let overlay_ref = &overlay_sel;
    let observed = match wait::wait_until(
        &config.wait_spec("button click to produce an effect"),
        move || {
            let d = driver;
            let init_url = initial_url_ref;
            let init_class = initial_class_ref;
            let overlay = overlay_ref;
            async move {
                // URL first: after a navigation the handle is stale.
                if d.current_url().await? != init_url {
                    return Ok(true);
                }
                if d.attr(button, "class").await?.as_deref() != init_class {
                    return Ok(true);
                }
                Ok(first_displayed(d, overlay).await?.is_some())
            }
        },
    )
    .await
    {
        Ok(()) => true,
        Err(SuiteError::WaitTimeout { .. }) => false,
        Err(e) => return Err(e),
    };

    let mut checks = Checks::new();
    checks.check(
        "button_produced_effect",
        observed,
        "clicking the button should change its state, the url, or open an overlay",
    );
    Ok(checks.into_outcome())
}

const VIEWPORTS: [(u32, u32); 4] = [(375, 667), (390, 844), (360, 740), (768, 1024)];

// Content may exceed the viewport by this much before it counts as overflow,
// covering scrollbar gutters and rounding.
const VIEWPORT_MARGIN_PX: u64 = 50;

/// Layout adapts across mobile and tablet viewports without overflow.
pub async fn responsive_layout(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;
    let original = driver.window_size().await?;

    let result = viewport_sweep(driver, config).await;

    // Restoring the window is teardown work; a fault here must not replace
    // the sweep's verdict.
    if let Err(e) = driver.set_window_size(original.0, original.1).await {
        warn!("Failed to restore window size: {e}");
    }
    result
}

async fn viewport_sweep(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    let mut checks = Checks::new();

    for (width, height) in VIEWPORTS {
        driver.set_window_size(width, height).await?;

        wait::wait_until(
            &config.wait_spec("layout to settle after resize"),
            move || {
                let d = driver;
                async move {
                    let value = d
                        .execute_script("return document.body.clientWidth;")
                        .await?;
                    Ok(value.as_u64().unwrap_or(u64::MAX) <= width as u64 + VIEWPORT_MARGIN_PX)
                }
            },
        )
        .await?;

        let body_width = driver
            .execute_script("return document.body.clientWidth;")
            .await?
            .as_u64()
            .unwrap_or(u64::MAX);
        let overflow = driver
            .execute_script("return document.body.scrollWidth > document.body.clientWidth;")
            .await?
            .as_bool()
            .unwrap_or(false);

        checks
            .check(
                &format!("fits_viewport_{width}x{height}"),
                body_width <= width as u64 + VIEWPORT_MARGIN_PX,
                format!("body width {body_width}px exceeds the {width}px viewport"),
            )
            .check(
                &format!("no_horizontal_scroll_{width}x{height}"),
                !overflow,
                format!("page should not scroll horizontally at {width}px"),
            );
    }

    Ok(checks.into_outcome())
}

const BREAKPOINTS: [u32; 5] = [1920, 1200, 768, 480, 320];

/// Layout transitions cleanly from desktop width down to narrow mobile.
pub async fn breakpoint_transitions(
    driver: &dyn Driver,
    config: &TestConfig,
) -> SuiteResult<Outcome> {
    wait::wait_for_page_load(driver, &config.wait_spec("page load")).await?;
    let original = driver.window_size().await?;

    let result = breakpoint_sweep(driver, config).await;

    if let Err(e) = driver.set_window_size(original.0, original.1).await {
        warn!("Failed to restore window size: {e}");
    }
    result
}

async fn breakpoint_sweep(driver: &dyn Driver, config: &TestConfig) -> SuiteResult<Outcome> {
    let mut checks = Checks::new();

    for width in BREAKPOINTS {
        driver.set_window_size(width, 800).await?;

        wait::wait_until(
            &config.wait_spec("layout to settle after resize"),
            move || {
                let d = driver;
                async move {
                    let value = d
                        .execute_script("return document.body.clientWidth;")
                        .await?;
                    let body = value.as_u64().unwrap_or(u64::MAX);
                    Ok(body.abs_diff(width as u64) <= VIEWPORT_MARGIN_PX)
                }
            },
        )
        .await?;

        let overflow = driver
            .execute_script("return document.body.scrollWidth > window.innerWidth;")
            .await?
            .as_bool()
            .unwrap_or(false);
        checks.check(
            &format!("no_horizontal_overflow_{width}px"),
            !overflow,
            format!("page should not overflow horizontally at the {width}px breakpoint"),
        );
    }

    // At a phone-sized width a collapsed navigation control is expected, but
    // its absence only affects usability, not correctness.
    driver.set_window_size(480, 800).await?;
    let mobile_menu =
        Selector::css(".hamburger, .mobile-menu-toggle, .nav-toggle, .menu-button");
    match wait::probe(driver, &mobile_menu).await? {
        Probe::Present(_) => {
            checks.check("mobile_menu", true, "mobile navigation menu present");
        }
        Probe::Absent => {
            checks.skip("mobile_menu", "no mobile navigation menu detected");
        }
    }

    Ok(checks.into_outcome())
}

/// Reload stays within the load budget and basic SEO signals are in place.
pub async fn page_load_performance(
    driver: &dyn Driver,
    config: &TestConfig,
) -> SuiteResult<Outcome> {
    let url = driver.current_url().await?;
    let start = Instant::now();
    driver.navigate(&url).await?;
    wait::wait_for_page_load(driver, &config.wait_spec("page reload")).await?;
    let load_ms = start.elapsed().as_millis() as u64;

    let title = driver.title().await?;
    let title_chars = title.chars().count();
    let meta = wait::probe(driver, &Selector::css("meta[name='description']")).await?;
    let h1 = wait::probe(driver, &Selector::css("h1")).await?;
    let lang = match driver.find(&Selector::css("html")).await? {
        Some(el) => driver.attr(el, "lang").await?.unwrap_or_default(),
        None => String::new(),
    };

    let mut checks = Checks::new();
    checks
        .check(
            "load_within_budget",
            load_ms < 10_000,
            format!("page should load within 10 seconds, took {load_ms} ms"),
        )
        .check("has_title", !title.is_empty(), "page should have a title")
        .check(
            "title_descriptive",
            title_chars > 10,
            format!("page title \"{title}\" should be descriptive"),
        )
        .check(
            "title_seo_length",
            title_chars < 70,
            "page title should not be too long for SEO",
        )
        .check(
            "meta_description",
            meta.is_present(),
            "page should have a meta description",
        )
        .check("has_h1", h1.is_present(), "page should have an h1 heading")
        .check(
            "html_lang",
            !lang.is_empty(),
            "html element should declare a lang attribute",
        );
    Ok(checks.into_outcome())
}
