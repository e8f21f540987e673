use untappd_core::Credentials;

use crate::driver::{By, Element, Session};
use crate::error::ScraperError;

pub const USERNAME_FIELD_ID: &str = "username";
pub const PASSWORD_FIELD_ID: &str = "password";
pub const SUBMIT_SELECTOR: &str = "input[type='submit']";

/// Signs the session in through the site's login form.
///
/// The password is typed into the browser and never logged.
///
/// # Errors
///
/// - [`ScraperError::MissingElement`] if the form lacks a username field,
///   password field or submit button.
/// - [`ScraperError::Driver`] if navigation, typing or the click fails.
pub async fn login<S: Session>(
    session: &S,
    login_url: &str,
    credentials: &Credentials,
) -> Result<(), ScraperError> {
    session.navigate(login_url).await?;

    for (field_id, value) in [
        (USERNAME_FIELD_ID, credentials.username.as_str()),
        (PASSWORD_FIELD_ID, credentials.password.as_str()),
    ] {
        let by = By::Id(field_id);
        let field = session
            .find_one(by)
            .await?
            .ok_or_else(|| ScraperError::missing("login form", by))?;
        field.send_keys(value).await?;
    }

    let submit_by = By::Css(SUBMIT_SELECTOR);
    session
        .find_one(submit_by)
        .await?
        .ok_or_else(|| ScraperError::missing("login form", submit_by))?
        .click()
        .await?;

    tracing::info!(username = %credentials.username, "submitted login form");
    Ok(())
}
