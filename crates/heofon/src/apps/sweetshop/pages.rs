//! Page factories and page-specific actions of the Sweet Shop.

use super::{ACCOUNT_PAGE, ABOUT_PAGE, BASKET_PAGE, HOME_PAGE, LOGIN_PAGE, SWEETS_PAGE, TITLE};
use crate::application::Application;
use crate::locator::Selector;
use crate::page_object::{OnConstruct, PageArgs, PageBlueprint, PageObject};
use crate::result::{HeofonError, HeofonResult};
use crate::transition::TransitionOptions;
use serde_json::Value;

fn blueprint(
    app: &Application,
    name: &str,
    url_path: &str,
    on_construct: OnConstruct,
) -> PageBlueprint {
    PageBlueprint {
        name: name.to_string(),
        title: TITLE.to_string(),
        url: app.url_for(url_path),
        url_path: url_path.to_string(),
        on_construct,
    }
}

/// Entry page; constructing it loads the site
pub fn home_page(app: &Application, _args: &PageArgs) -> HeofonResult<PageBlueprint> {
    Ok(blueprint(app, HOME_PAGE, "/", OnConstruct::Navigate))
}

/// Product listing
pub fn sweets_page(app: &Application, _args: &PageArgs) -> HeofonResult<PageBlueprint> {
    Ok(blueprint(app, SWEETS_PAGE, "/sweets", OnConstruct::AssumeLoaded))
}

/// Static about page
pub fn about_page(app: &Application, _args: &PageArgs) -> HeofonResult<PageBlueprint> {
    Ok(blueprint(app, ABOUT_PAGE, "/about", OnConstruct::AssumeLoaded))
}

/// Login form; the only page [`log_in`] works from
pub fn login_page(app: &Application, _args: &PageArgs) -> HeofonResult<PageBlueprint> {
    Ok(blueprint(app, LOGIN_PAGE, "/login", OnConstruct::AssumeLoaded))
}

/// Basket contents, kept in local storage
pub fn basket_page(app: &Application, _args: &PageArgs) -> HeofonResult<PageBlueprint> {
    Ok(blueprint(app, BASKET_PAGE, "/basket", OnConstruct::AssumeLoaded))
}

/// Account page, reached by logging in
///
/// Expects an `email` pass-through argument naming the logged-in user.
pub fn account_page(app: &Application, args: &PageArgs) -> HeofonResult<PageBlueprint> {
    match args.get("email").and_then(Value::as_str) {
        Some(email) => tracing::info!("account page for {email}"),
        None => tracing::warn!("account page resolved without an email"),
    }
    Ok(blueprint(app, ACCOUNT_PAGE, "/account", OnConstruct::AssumeLoaded))
}

// =============================================================================
// LOGIN
// =============================================================================

/// Email field of the login form
pub const EMAIL_INPUT: &str = "#exampleInputEmail";

/// Password field of the login form
pub const PASSWORD_INPUT: &str = "#exampleInputPassword";

/// Submit button of the login form
pub const LOGIN_BUTTON: &str = "form button[type='submit']";

/// Fill the login form and submit it, crossing into the authenticated pages
///
/// # Errors
///
/// Returns a configuration error when called on any page other than the login
/// page, [`HeofonError::ElementNotFound`] when a form field is missing, and
/// otherwise the errors of [`PageObject::click_and_load`].
pub async fn log_in(
    page: &mut PageObject,
    email: &str,
    password: &str,
) -> HeofonResult<PageObject> {
    if page.name() != LOGIN_PAGE {
        return Err(HeofonError::config(format!(
            "log_in needs '{LOGIN_PAGE}', not '{}'",
            page.name()
        )));
    }

    for (css, value) in [(EMAIL_INPUT, email), (PASSWORD_INPUT, password)] {
        page.tab().type_text(&Selector::css(css), value).await?;
    }
    let _ = page.record_event(&format!("filled login form for {email}"), None);

    let mut args = PageArgs::new();
    let _ = args.insert("email".to_string(), Value::String(email.to_string()));
    let options = TransitionOptions::new()
        .crossing()
        .with_pass_through(args)
        .with_message("submitted login form")
        .with_target_url("/account");
    page.click_and_load(&Selector::css(LOGIN_BUTTON), "login button", ACCOUNT_PAGE, true, options)
        .await
}
