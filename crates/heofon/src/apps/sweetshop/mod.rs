//! Sweet Shop: a small demo shop at `sweetshop.vivrichards.co.uk`.
//!
//! Five public pages share one flat top menu. Logging in crosses into the
//! authenticated account page; logging out crosses back to the login page.

pub mod pages;

use crate::application::{Application, TierDomains};
use crate::config::Tier;
use crate::locator::Selector;
use crate::mock::MockTab;
use crate::result::HeofonResult;
use crate::routing::PageRegistry;
use std::sync::Arc;

/// Application name
pub const APP_NAME: &str = "sweetshop";

/// Host of every tier
pub const DOMAIN: &str = "sweetshop.vivrichards.co.uk";

/// Title shared by all pages
pub const TITLE: &str = "Sweet Shop";

/// Page id of the landing page
pub const HOME_PAGE: &str = "sweetshop home page";
/// Page id of the product listing
pub const SWEETS_PAGE: &str = "sweetshop sweets page";
/// Page id of the about page
pub const ABOUT_PAGE: &str = "sweetshop about page";
/// Page id of the login form
pub const LOGIN_PAGE: &str = "sweetshop login page";
/// Page id of the basket
pub const BASKET_PAGE: &str = "sweetshop basket page";
/// Page id of the account page, only in the auth table
pub const ACCOUNT_PAGE: &str = "sweetshop account page";

/// Routing tables
pub const ROUTINGS_YAML: &str = include_str!("routings.yaml");

/// Top menu
pub const NAVIGATION_YAML: &str = include_str!("navigation.yaml");

/// Factories named by the routing tables
#[must_use]
pub fn registry() -> PageRegistry {
    PageRegistry::new()
        .with("HomePage", pages::home_page)
        .with("SweetsPage", pages::sweets_page)
        .with("AboutPage", pages::about_page)
        .with("LoginPage", pages::login_page)
        .with("BasketPage", pages::basket_page)
        .with("AccountPage", pages::account_page)
}

/// Domains per tier
#[must_use]
pub fn domains() -> TierDomains {
    TierDomains::new(DOMAIN)
}

/// The Sweet Shop as served on a tier
///
/// # Errors
///
/// Returns a configuration error if the bundled routing or navigation data
/// is inconsistent.
pub fn application(tier: Tier) -> HeofonResult<Arc<Application>> {
    let app = Application::from_yaml(
        APP_NAME,
        domains().for_tier(tier)?,
        ROUTINGS_YAML,
        NAVIGATION_YAML,
        &registry(),
    )?;
    Ok(Arc::new(app))
}

/// Scripted copy of the site for tests and dry runs
///
/// Every page has the shop title and the public navbar links. The login page
/// has the email and password fields, and its submit button leads to the
/// account page. The account page links to itself and back out to the login
/// page.
#[must_use]
pub fn mock_site(app: &Application) -> MockTab {
    let mut tab = MockTab::new().with_link(Selector::css("nav a.navbar-brand"), app.url_for("/"));
    for (text, path) in [
        ("Sweets", "/sweets"),
        ("About", "/about"),
        ("Login", "/login"),
        ("Basket", "/basket"),
    ] {
        tab = tab.with_link(Selector::css_with_text("nav a", text), app.url_for(path));
    }
    for path in ["/", "/sweets", "/about", "/login", "/basket", "/account"] {
        tab = tab.with_page(app.url_for(path), TITLE);
    }
    let login = app.url_for("/login");
    let account = app.url_for("/account");
    tab.with_element_on(login.clone(), Selector::css(pages::EMAIL_INPUT))
        .with_element_on(login.clone(), Selector::css(pages::PASSWORD_INPUT))
        .with_link_on(login.clone(), Selector::css(pages::LOGIN_BUTTON), account.clone())
        .with_link_on(
            account.clone(),
            Selector::css_with_text("nav a", "Account"),
            account.clone(),
        )
        .with_link_on(account, Selector::css_with_text("nav a", "Logout"), login)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::AuthMode;

    #[test]
    fn test_bundled_data_loads() {
        let app = application(Tier::Stage).unwrap();
        assert_eq!(app.name(), "sweetshop");
        assert_eq!(app.url_for("/sweets"), "https://sweetshop.vivrichards.co.uk/sweets");

        let noauth = app.routing().table(AuthMode::NoAuth);
        assert_eq!(noauth.len(), 5);
        assert!(noauth.contains(HOME_PAGE));
        assert!(app.routing().table(AuthMode::Auth).contains(ACCOUNT_PAGE));

        let menu = app.navigation().menu(AuthMode::NoAuth).unwrap();
        assert_eq!(menu.labels(), vec!["About", "Basket", "Home", "Login", "Sweets"]);
        let sweets = menu.stage_for("Sweets").unwrap();
        assert_eq!(sweets.final_selector.to_string(), "nav a:has-text('Sweets')");
        assert_eq!(sweets.target, SWEETS_PAGE);

        let logout = app
            .navigation()
            .menu(AuthMode::Auth)
            .and_then(|m| m.stage_for("Logout"))
            .unwrap();
        assert_eq!(logout.final_selector, Selector::css_with_text("nav a", "Logout"));
        assert!(logout.cross_auth_boundary);
        let home = menu.stage_for("Home").unwrap();
        assert_eq!(home.final_selector, Selector::css("nav a.navbar-brand"));
    }

    #[test]
    fn test_every_factory_matches_its_key() {
        let app = application(Tier::Qa).unwrap();
        for mode in [AuthMode::NoAuth, AuthMode::Auth] {
            let table = app.routing().table(mode);
            for id in table.page_ids() {
                let entry = table.get(id).unwrap();
                let blueprint = (entry.factory)(app.as_ref(), &crate::PageArgs::new()).unwrap();
                assert_eq!(blueprint.name, id);
                assert_eq!(blueprint.title, TITLE);
            }
        }
    }
}
