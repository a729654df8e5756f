//! Page object accessors
//!
//! Named selector groups per logical page, with a few interaction helpers.
//! The selectors list alternatives so the suite tolerates common markup
//! variants of the same affordance.

use crate::driver::{first_displayed, Driver, Selector};
use crate::error::{SuiteError, SuiteResult};

pub struct HomePage<'d> {
    driver: &'d dyn Driver,
}

impl<'d> HomePage<'d> {
    pub fn new(driver: &'d dyn Driver) -> Self {
        Self { driver }
    }

    pub fn logo() -> Selector {
        Selector::css("img[alt*='logo'], .logo, #logo")
    }

    pub fn header() -> Selector {
        Selector::css("header")
    }

    pub fn footer() -> Selector {
        Selector::css("footer")
    }

    pub fn navigation() -> Selector {
        Selector::css("nav, .navigation, .nav-menu")
    }

    pub fn nav_links() -> Selector {
        Selector::css("nav a, .navigation a, .nav-menu a, header a")
    }

    pub fn search_box() -> Selector {
        Selector::css("input[type='search'], input[placeholder*='search'], #search")
    }

    pub fn login_link() -> Selector {
        Selector::css("a[href*='login'], .login-link")
    }

    pub fn contact_link() -> Selector {
        Selector::css("a[href*='contact'], .contact-link")
    }

    /// Type a query into the search box and submit with Enter.
    pub async fn perform_search(&self, query: &str) -> SuiteResult<()> {
        let search = first_displayed(self.driver, &Self::search_box())
            .await?
            .ok_or_else(|| SuiteError::AssertionFailed("search box not found".into()))?;
        self.driver.clear(search).await?;
        self.driver.send_keys(search, query).await?;
        self.driver.send_keys(search, "\n").await?;
        Ok(())
    }
}

pub struct LoginPage<'d> {
    driver: &'d dyn Driver,
}

impl<'d> LoginPage<'d> {
    pub fn new(driver: &'d dyn Driver) -> Self {
        Self { driver }
    }

    pub fn email_field() -> Selector {
        Selector::css("input[type='email'], input[name*='email'], input[name*='username']")
    }

    pub fn password_field() -> Selector {
        Selector::css("input[type='password']")
    }

    pub fn submit_button() -> Selector {
        Selector::css("button[type='submit'], input[type='submit'], .login-button")
    }

    pub fn error_message() -> Selector {
        Selector::css(".error, .alert-danger, .invalid-credentials")
    }

    /// Fill the credential fields and submit.
    pub async fn login(&self, email: &str, password: &str) -> SuiteResult<()> {
        let driver = self.driver;
        let email_el = first_displayed(driver, &Self::email_field())
            .await?
            .ok_or_else(|| SuiteError::AssertionFailed("email field not found".into()))?;
        let password_el = first_displayed(driver, &Self::password_field())
            .await?
            .ok_or_else(|| SuiteError::AssertionFailed("password field not found".into()))?;
        let submit = first_displayed(driver, &Self::submit_button())
            .await?
            .ok_or_else(|| SuiteError::AssertionFailed("login button not found".into()))?;

        driver.clear(email_el).await?;
        driver.send_keys(email_el, email).await?;
        driver.clear(password_el).await?;
        driver.send_keys(password_el, password).await?;
        driver.click(submit).await?;
        Ok(())
    }
}

pub struct ContactPage<'d> {
    driver: &'d dyn Driver,
}

impl<'d> ContactPage<'d> {
    pub fn new(driver: &'d dyn Driver) -> Self {
        Self { driver }
    }

    pub fn name_field() -> Selector {
        Selector::css("input[name*='name'], #name")
    }

    pub fn email_field() -> Selector {
        Selector::css("input[type='email'], input[name*='email'], #email")
    }

    pub fn message_field() -> Selector {
        Selector::css("textarea, input[name*='message'], #message")
    }

    pub fn submit_button() -> Selector {
        Selector::css("button[type='submit'], .submit-button, input[type='submit']")
    }

    pub fn success_message() -> Selector {
        Selector::css(".success, .thank-you, .confirmation")
    }

    /// Fill whatever contact fields exist and submit the form.
    pub async fn submit_message(&self, name: &str, email: &str, message: &str) -> SuiteResult<()> {
        let driver = self.driver;
        let name_el = first_displayed(driver, &Self::name_field())
            .await?
            .ok_or_else(|| SuiteError::AssertionFailed("name field not found".into()))?;
        let email_el = first_displayed(driver, &Self::email_field())
            .await?
            .ok_or_else(|| SuiteError::AssertionFailed("email field not found".into()))?;
        let submit = first_displayed(driver, &Self::submit_button())
            .await?
            .ok_or_else(|| SuiteError::AssertionFailed("submit button not found".into()))?;

        driver.clear(name_el).await?;
        driver.send_keys(name_el, name).await?;
        driver.clear(email_el).await?;
        driver.send_keys(email_el, email).await?;

        // The message box is optional on some contact forms.
        if let Some(message_el) = first_displayed(driver, &Self::message_field()).await? {
            driver.clear(message_el).await?;
            driver.send_keys(message_el, message).await?;
        }

        driver.click(submit).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::fixture_site;

    #[tokio::test]
    async fn test_perform_search_navigates() {
        let driver = fixture_site("http://t");
        let home = HomePage::new(&driver);
        home.perform_search("test query").await.unwrap();
        assert!(driver.current_url().await.unwrap().contains("q="));
    }

    #[tokio::test]
    async fn test_login_reveals_error_on_fixture() {
        let driver = fixture_site("http://t");
        driver.navigate("http://t/login").await.unwrap();

        LoginPage::new(&driver)
            .login("invalid-email", "123")
            .await
            .unwrap();

        let error = first_displayed(&driver, &LoginPage::error_message())
            .await
            .unwrap();
        assert!(error.is_some());
    }
}
