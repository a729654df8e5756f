//! Full scenario runs against the in-memory fixture site

use webcheck::driver::DriverError;
use webcheck::mock::{fixture_site, MockDriver, MockElement, MockPage};
use webcheck::scenario::ScenarioRunner;
use webcheck::suite;
use webcheck::{Driver, Outcome, TestConfig};

fn body_of(name: &str) -> webcheck::scenario::ScenarioBody {
    suite::scenarios()
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("scenario {name} not registered"))
        .body
}

fn test_config() -> TestConfig {
    let mut config = TestConfig::default();
    config.base_url = "http://fixture.test".to_string();
    // Keep probe and wait budgets short; the fixture answers instantly.
    config.timeout_seconds = 1;
    config.implicit_wait_seconds = 1;
    config.screenshot_on_failure = false;
    config
}

/// A page with none of the optional affordances the suite probes for.
fn bare_site(base_url: &str) -> MockDriver {
    MockDriver::builder()
        .page(
            format!("{base_url}/"),
            MockPage::new("Bare page")
                .element(MockElement::new("html").attr("lang", "en"))
                .element(MockElement::new("header"))
                .element(MockElement::new("footer")),
        )
        .build()
}

#[tokio::test]
async fn full_suite_passes_against_fixture_site() {
    let config = test_config();
    let runner = ScenarioRunner::new(&config);
    let base = config.base_url.clone();

    let report = runner
        .run_all(&suite::scenarios(), move || {
            let base = base.clone();
            async move {
                let driver = fixture_site(&base);
                driver.navigate(&format!("{base}/")).await?;
                Ok(driver)
            }
        })
        .await;

    assert_eq!(report.failed, 0, "failures: {:#?}", report.scenarios);
    assert_eq!(report.inconclusive, 0);
    assert_eq!(report.passed, report.total);
}

#[tokio::test]
async fn absent_features_are_inconclusive_not_failed() {
    let config = test_config();
    let runner = ScenarioRunner::new(&config);

    for (name, body) in [
        ("search", body_of("search")),
        ("modal_dialog", body_of("modal_dialog")),
        ("button_click", body_of("button_click")),
    ] {
        let base = config.base_url.clone();
        let report = runner
            .run(
                name,
                move || {
                    let base = base.clone();
                    async move {
                        let driver = bare_site(&base);
                        driver.navigate(&format!("{base}/")).await?;
                        Ok(driver)
                    }
                },
                body,
            )
            .await;

        assert!(
            matches!(report.outcome, Outcome::Inconclusive { .. }),
            "{name} should be inconclusive on a bare page, got {:?}",
            report.outcome
        );
    }
}

#[tokio::test]
async fn probe_fault_is_failed_not_inconclusive() {
    // A session fault during the presence probe must not be misread as
    // "feature absent".
    let config = test_config();
    let runner = ScenarioRunner::new(&config);
    let base = config.base_url.clone();

    let report = runner
        .run(
            "search",
            move || {
                let base = base.clone();
                async move {
                    let driver = fixture_site(&base);
                    driver.navigate(&format!("{base}/")).await?;
                    driver.fail_next_find(DriverError::Session(
                        "simulated network fault".to_string(),
                    ));
                    Ok(driver)
                }
            },
            body_of("search"),
        )
        .await;

    match &report.outcome {
        Outcome::Failed { reasons } => {
            assert!(reasons[0].contains("simulated network fault"));
        }
        other => panic!("probe fault must be Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn broken_present_feature_is_failed() {
    // Search box exists but submitting never changes the page: the feature
    // demonstrably exists and misbehaves, so the verdict is authoritative.
    let config = test_config();
    let runner = ScenarioRunner::new(&config);
    let base = config.base_url.clone();

    let report = runner
        .run(
            "search",
            move || {
                let base = base.clone();
                async move {
                    let driver = MockDriver::builder()
                        .page(
                            format!("{base}/"),
                            MockPage::new("Broken search").element(
                                MockElement::new("input").matches("#search"),
                            ),
                        )
                        .build();
                    driver.navigate(&format!("{base}/")).await?;
                    Ok(driver)
                }
            },
            body_of("search"),
        )
        .await;

    match &report.outcome {
        Outcome::Failed { reasons } => {
            assert!(
                reasons[0].contains("timed out"),
                "expected a wait timeout, got {reasons:?}"
            );
        }
        other => panic!("broken search must be Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn window_restore_fault_does_not_mask_sweep_outcome() {
    // Four viewport resizes succeed; the fifth call is the restore and fails.
    let config = test_config();
    let runner = ScenarioRunner::new(&config);
    let base = config.base_url.clone();

    let report = runner
        .run(
            "responsive_layout",
            move || {
                let base = base.clone();
                async move {
                    let driver = fixture_site(&base);
                    driver.navigate(&format!("{base}/")).await?;
                    driver.fail_window_resizes_after(4);
                    Ok(driver)
                }
            },
            body_of("responsive_layout"),
        )
        .await;

    assert_eq!(
        report.outcome,
        Outcome::Passed,
        "a failed window restore must not replace the sweep's verdict"
    );
}

#[tokio::test]
async fn non_ascii_title_is_measured_in_characters() {
    // 32 characters, 96 bytes: well inside the 70-character SEO bound.
    let title = "テスト対象サイト".repeat(4);
    let config = test_config();
    let runner = ScenarioRunner::new(&config);
    let base = config.base_url.clone();

    let report = runner
        .run(
            "page_load_performance",
            move || {
                let base = base.clone();
                let title = title.clone();
                async move {
                    let driver = MockDriver::builder()
                        .page(
                            format!("{base}/"),
                            MockPage::new(&title)
                                .element(MockElement::new("html").attr("lang", "ja"))
                                .element(
                                    MockElement::new("meta")
                                        .matches("meta[name='description']"),
                                )
                                .element(MockElement::new("h1").text("ようこそ")),
                        )
                        .build();
                    driver.navigate(&format!("{base}/")).await?;
                    Ok(driver)
                }
            },
            body_of("page_load_performance"),
        )
        .await;

    assert_eq!(report.outcome, Outcome::Passed, "got {:?}", report.outcome);
}

#[tokio::test]
async fn run_report_buckets_are_disjoint() {
    let config = test_config();
    let runner = ScenarioRunner::new(&config);
    let base = config.base_url.clone();

    // Bare site: element scenarios fail (no nav/logo), optional-feature
    // scenarios go inconclusive, basic load checks pass.
    let report = runner
        .run_all(&suite::scenarios(), move || {
            let base = base.clone();
            async move {
                let driver = bare_site(&base);
                driver.navigate(&format!("{base}/")).await?;
                Ok(driver)
            }
        })
        .await;

    assert_eq!(
        report.passed + report.failed + report.inconclusive,
        report.total
    );
    assert!(report.inconclusive > 0);
    assert!(report.failed > 0);
}
