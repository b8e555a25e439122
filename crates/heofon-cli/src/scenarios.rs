//! Navigation scenarios of the bundled Sweet Shop.
//!
//! Every case starts on the home page and then takes its steps in order.

use crate::commands::ScenarioArg;
use heofon::apps::sweetshop::{self, pages};
use heofon::{HeofonResult, PageObject};

/// Email used by the login scenario
pub const LOGIN_EMAIL: &str = "heofon@example.com";

/// Password used by the login scenario
pub const LOGIN_PASSWORD: &str = "heofon-e2e";

/// One step of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Follow a top-menu destination label
    Menu(&'static str),
    /// Submit the login form
    LogIn,
}

impl Step {
    /// Take the step from `page`, returning the page it leads to
    ///
    /// # Errors
    ///
    /// Propagates transition errors.
    pub async fn take(self, page: &mut PageObject) -> HeofonResult<PageObject> {
        match self {
            Self::Menu(label) => page.top_menu_goto(label).await,
            Self::LogIn => pages::log_in(page, LOGIN_EMAIL, LOGIN_PASSWORD).await,
        }
    }

    /// Label of the screenshot taken once the step has landed
    #[must_use]
    pub fn screenshot_label(self) -> String {
        match self {
            Self::Menu(label) => format!("{} page loaded", label.to_lowercase()),
            Self::LogIn => "logged in".to_string(),
        }
    }
}

/// A named sequence of steps; the name becomes the case's output folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Case name
    pub name: String,
    /// Steps after the home page
    pub steps: Vec<Step>,
}

impl TestCase {
    fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

const DYNAMIC_WALKS: [[&str; 3]; 6] = [
    ["Sweets", "Login", "About"],
    ["About", "Basket", "Home"],
    ["Login", "Home", "Sweets"],
    ["Basket", "About", "Home"],
    ["Basket", "Sweets", "Login"],
    ["Sweets", "Basket", "About"],
];

fn linear() -> Vec<TestCase> {
    let steps = ["Sweets", "About", "Login", "Basket", "Home"]
        .into_iter()
        .map(Step::Menu)
        .collect();
    vec![TestCase::new("test_linear_navigation", steps)]
}

fn dynamic() -> Vec<TestCase> {
    DYNAMIC_WALKS
        .iter()
        .enumerate()
        .map(|(i, walk)| {
            TestCase::new(
                format!("test_dynamic_navigation_{}", i + 1),
                walk.iter().copied().map(Step::Menu).collect(),
            )
        })
        .collect()
}

fn login() -> Vec<TestCase> {
    vec![TestCase::new(
        "test_login_logout",
        vec![
            Step::Menu("Login"),
            Step::LogIn,
            Step::Menu("Account"),
            Step::Menu("Logout"),
        ],
    )]
}

/// Cases of a scenario selection
#[must_use]
pub fn cases(scenario: ScenarioArg) -> Vec<TestCase> {
    match scenario {
        ScenarioArg::Linear => linear(),
        ScenarioArg::Dynamic => dynamic(),
        ScenarioArg::Login => login(),
        ScenarioArg::All => {
            let mut all = linear();
            all.extend(dynamic());
            all.extend(login());
            all
        }
    }
}

/// First page of every case
pub const START_PAGE: &str = sweetshop::HOME_PAGE;

/// Screenshot label of the first page
pub const START_SCREENSHOT: &str = "home loaded";
