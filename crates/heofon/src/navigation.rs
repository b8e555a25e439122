//! Top-menu navigation: destination labels to two-stage click sequences.
//!
//! A destination label maps to an `[activator, final]` pair. The activator
//! is the element that opens a menu (a dropdown header, a hamburger button);
//! the final element is the link that loads the page. Flat menus use the same
//! label for both and reveal nothing:
//!
//! ```yaml
//! menus:
//!   - auth_mode: noauth
//!     destinations:
//!       Sweets: [Sweets, Sweets]
//!     stages:
//!       - activator: Sweets
//!         final: Sweets
//!         final_selector: { css_with_text: { css: nav a, text: Sweets } }
//!         target: sweetshop sweets page
//!         url: /sweets
//! ```

use crate::locator::Selector;
use crate::page_object::PageObject;
use crate::result::{HeofonError, HeofonResult};
use crate::routing::{select_table, AuthMode, RoutingConfig};
use crate::transition::TransitionOptions;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// What to do with the activator before the final click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reveal {
    /// Nothing; the final element is always visible
    #[default]
    None,
    /// Hover the activator
    Hover,
    /// Click the activator
    Click,
}

/// How to reach one destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationStage {
    /// Activator label
    pub activator: String,
    /// Final element label
    #[serde(rename = "final")]
    pub final_label: String,
    /// Activator element, required unless `reveal` is `none`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml_ng::with::singleton_map"
    )]
    pub activator_selector: Option<Selector>,
    /// Action on the activator
    #[serde(default)]
    pub reveal: Reveal,
    /// Element whose click loads the target
    #[serde(with = "serde_yaml_ng::with::singleton_map")]
    pub final_selector: Selector,
    /// Page id the click leads to
    pub target: String,
    /// Path the URL must reach
    pub url: String,
    /// Resolve the target across the auth boundary
    #[serde(default)]
    pub cross_auth_boundary: bool,
}

/// Menu of the pages of one auth mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationMap {
    auth_mode: AuthMode,
    destinations: BTreeMap<String, (String, String)>,
    stages: HashMap<(String, String), NavigationStage>,
}

impl NavigationMap {
    /// Auth mode of the pages showing this menu
    #[must_use]
    pub const fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// Destination labels in sorted order
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.destinations.keys().map(String::as_str).collect()
    }

    /// Stage reaching a destination label
    #[must_use]
    pub fn stage_for(&self, label: &str) -> Option<&NavigationStage> {
        self.destinations
            .get(label)
            .and_then(|pair| self.stages.get(pair))
    }

    fn validate(&self, routing: &RoutingConfig) -> HeofonResult<()> {
        for (label, (activator, final_label)) in &self.destinations {
            if !self
                .stages
                .contains_key(&(activator.clone(), final_label.clone()))
            {
                return Err(HeofonError::config(format!(
                    "{} menu label '{label}' has no stage for [{activator}, {final_label}]",
                    self.auth_mode
                )));
            }
        }
        for stage in self.stages.values() {
            let table = routing.table(select_table(self.auth_mode, stage.cross_auth_boundary));
            if !table.contains(&stage.target) {
                return Err(HeofonError::config(format!(
                    "{} menu stage [{}, {}] targets '{}', which is not in the {} table",
                    self.auth_mode,
                    stage.activator,
                    stage.final_label,
                    stage.target,
                    table.auth_mode()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawMenu {
    auth_mode: String,
    #[serde(default)]
    destinations: BTreeMap<String, (String, String)>,
    #[serde(default)]
    stages: Vec<NavigationStage>,
}

#[derive(Debug, Deserialize)]
struct RawNavigation {
    #[serde(default)]
    menus: Vec<RawMenu>,
}

/// Menus of an application, at most one per auth mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationConfig {
    noauth: Option<NavigationMap>,
    auth: Option<NavigationMap>,
}

impl NavigationConfig {
    /// Parse navigation YAML
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid or duplicated auth mode,
    /// a duplicated stage, or a revealing stage without an activator selector.
    pub fn from_yaml(yaml: &str) -> HeofonResult<Self> {
        let raw: RawNavigation = serde_yaml_ng::from_str(yaml)?;
        let mut config = Self::default();
        for menu in raw.menus {
            let mode: AuthMode = menu.auth_mode.parse()?;
            let slot = match mode {
                AuthMode::NoAuth => &mut config.noauth,
                AuthMode::Auth => &mut config.auth,
            };
            if slot.is_some() {
                return Err(HeofonError::config(format!(
                    "{mode} menu is declared more than once"
                )));
            }

            let mut stages = HashMap::with_capacity(menu.stages.len());
            for stage in menu.stages {
                if stage.reveal != Reveal::None && stage.activator_selector.is_none() {
                    return Err(HeofonError::config(format!(
                        "{mode} menu stage '{}' reveals without an activator selector",
                        stage.activator
                    )));
                }
                let key = (stage.activator.clone(), stage.final_label.clone());
                if stages.insert(key, stage).is_some() {
                    return Err(HeofonError::config(format!(
                        "{mode} menu declares a stage twice"
                    )));
                }
            }
            *slot = Some(NavigationMap {
                auth_mode: mode,
                destinations: menu.destinations,
                stages,
            });
        }
        Ok(config)
    }

    /// Menu shown on pages of a mode
    #[must_use]
    pub const fn menu(&self, mode: AuthMode) -> Option<&NavigationMap> {
        match mode {
            AuthMode::NoAuth => self.noauth.as_ref(),
            AuthMode::Auth => self.auth.as_ref(),
        }
    }

    /// Check completeness and that every target is routable
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending entry.
    pub fn validate(&self, routing: &RoutingConfig) -> HeofonResult<()> {
        for menu in [&self.noauth, &self.auth].into_iter().flatten() {
            menu.validate(routing)?;
        }
        Ok(())
    }
}

impl PageObject {
    /// Navigate through the top menu to a destination label
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::UnknownDestination`] for a label the page's menu
    /// does not have; otherwise the errors of
    /// [`PageObject::click_and_load`].
    pub async fn top_menu_goto(&mut self, destination: &str) -> HeofonResult<PageObject> {
        let stage = self
            .application()
            .navigation()
            .menu(self.auth_mode())
            .and_then(|menu| menu.stage_for(destination))
            .cloned()
            .ok_or_else(|| HeofonError::UnknownDestination {
                label: destination.to_string(),
                page: self.name().to_string(),
            })?;
        tracing::info!(
            "top menu: '{destination}' via [{}, {}] to '{}'",
            stage.activator,
            stage.final_label,
            stage.target
        );

        if let Some(activator) = &stage.activator_selector {
            match stage.reveal {
                Reveal::None => {}
                Reveal::Hover => self.tab().hover(activator).await?,
                Reveal::Click => self.click_element(activator, &stage.activator, None).await?,
            }
        }

        let options = TransitionOptions::new()
            .with_cross_auth_boundary(stage.cross_auth_boundary)
            .with_target_url(stage.url.as_str());
        self.click_and_load(
            &stage.final_selector,
            &format!("destination link {}", stage.final_label),
            &stage.target,
            true,
            options,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_object::{OnConstruct, PageArgs, PageBlueprint};
    use crate::routing::PageRegistry;
    use crate::Application;

    fn page(_app: &Application, _args: &PageArgs) -> HeofonResult<PageBlueprint> {
        Ok(PageBlueprint {
            name: "unused".into(),
            title: "unused".into(),
            url: "https://example.test/".into(),
            url_path: "/".into(),
            on_construct: OnConstruct::AssumeLoaded,
        })
    }

    fn routing() -> RoutingConfig {
        let yaml = "
tables:
  - auth_mode: noauth
    pages:
      home: { module: home, object: Page }
      shop: { module: shop, object: Page }
  - auth_mode: auth
    pages:
      account: { module: account, object: Page }
";
        RoutingConfig::from_yaml(yaml, &PageRegistry::new().with("Page", page)).unwrap()
    }

    const NAVIGATION: &str = "
menus:
  - auth_mode: noauth
    destinations:
      Shop: [Products, Shop]
      Home: [Home, Home]
    stages:
      - activator: Products
        final: Shop
        activator_selector: { css: '#products' }
        reveal: hover
        final_selector: { css: '#shop' }
        target: shop
        url: /shop
      - activator: Home
        final: Home
        final_selector: { css: a.brand }
        target: home
        url: /
  - auth_mode: auth
    destinations:
      Account: [Account, Account]
    stages:
      - activator: Account
        final: Account
        final_selector: { test_id: account }
        target: account
        url: /account
";

    #[test]
    fn test_parse_and_lookup() {
        let nav = NavigationConfig::from_yaml(NAVIGATION).unwrap();
        nav.validate(&routing()).unwrap();

        let menu = nav.menu(AuthMode::NoAuth).unwrap();
        assert_eq!(menu.labels(), vec!["Home", "Shop"]);
        let stage = menu.stage_for("Shop").unwrap();
        assert_eq!(stage.reveal, Reveal::Hover);
        assert_eq!(stage.activator_selector, Some(Selector::css("#products")));
        assert_eq!(stage.target, "shop");

        let home = menu.stage_for("Home").unwrap();
        assert_eq!(home.reveal, Reveal::None);
        assert!(!home.cross_auth_boundary);
        assert!(menu.stage_for("Basket").is_none());
    }

    #[test]
    fn test_label_without_stage_rejected() {
        let yaml = NAVIGATION.replace("Shop: [Products, Shop]", "Shop: [Products, Cart]");
        let nav = NavigationConfig::from_yaml(&yaml).unwrap();
        let err = nav.validate(&routing()).unwrap_err();
        assert!(err.to_string().contains("no stage for [Products, Cart]"));
    }

    #[test]
    fn test_target_must_exist_in_mode_table() {
        let yaml = NAVIGATION.replace("target: account", "target: home");
        let nav = NavigationConfig::from_yaml(&yaml).unwrap();
        let err = nav.validate(&routing()).unwrap_err();
        assert!(err.to_string().contains("not in the auth table"));
    }

    #[test]
    fn test_crossing_stage_checks_other_table() {
        let yaml = NAVIGATION.replace(
            "target: account\n        url: /account",
            "target: home\n        url: /\n        cross_auth_boundary: true",
        );
        let nav = NavigationConfig::from_yaml(&yaml).unwrap();
        nav.validate(&routing()).unwrap();
    }

    #[test]
    fn test_reveal_requires_activator_selector() {
        let yaml = NAVIGATION.replace("        activator_selector: { css: '#products' }\n", "");
        let err = NavigationConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, HeofonError::Configuration { .. }));
    }

    #[test]
    fn test_duplicate_menu_rejected() {
        let yaml = NAVIGATION.replace("auth_mode: auth", "auth_mode: noauth");
        assert!(NavigationConfig::from_yaml(&yaml).is_err());
    }
}
