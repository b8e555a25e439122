//! Application wrapper: the routing, navigation and domain of one site.

use crate::config::Tier;
use crate::context::TestContext;
use crate::navigation::NavigationConfig;
use crate::page_object::{PageArgs, PageObject};
use crate::resolver::resolve;
use crate::result::{HeofonError, HeofonResult};
use crate::routing::{AuthMode, PageRegistry, RoutingConfig};
use crate::tab::SharedTab;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything the engine knows about one application under test
#[derive(Debug, Clone)]
pub struct Application {
    name: String,
    domain: String,
    routing: RoutingConfig,
    navigation: NavigationConfig,
}

impl Application {
    /// Assemble an application from already-loaded data
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the navigation data targets pages
    /// the routing tables do not contain.
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        routing: RoutingConfig,
        navigation: NavigationConfig,
    ) -> HeofonResult<Self> {
        navigation.validate(&routing)?;
        Ok(Self {
            name: name.into(),
            domain: domain.into(),
            routing,
            navigation,
        })
    }

    /// Load routing and navigation YAML for an application
    ///
    /// # Errors
    ///
    /// Returns a configuration or YAML error for malformed data.
    pub fn from_yaml(
        name: impl Into<String>,
        domain: impl Into<String>,
        routing_yaml: &str,
        navigation_yaml: &str,
        registry: &PageRegistry,
    ) -> HeofonResult<Self> {
        let routing = RoutingConfig::from_yaml(routing_yaml, registry)?;
        let navigation = NavigationConfig::from_yaml(navigation_yaml)?;
        Self::new(name, domain, routing, navigation)
    }

    /// Application name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host the application is served from
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Absolute URL of a path on this application
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("https://{}{path}", self.domain)
    }

    /// Routing tables
    #[must_use]
    pub const fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    /// Navigation menus
    #[must_use]
    pub const fn navigation(&self) -> &NavigationConfig {
        &self.navigation
    }

    /// Resolve the first page of a test from the `noauth` table
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::UnknownPage`] for an unroutable id and
    /// propagates construction errors.
    pub async fn start_with(
        self: &Arc<Self>,
        ctx: &Arc<TestContext>,
        tab: &SharedTab,
        page_id: &str,
    ) -> HeofonResult<PageObject> {
        tracing::info!("starting {} with '{page_id}'", self.name);
        resolve(self, ctx, AuthMode::NoAuth, page_id, false, tab, None).await
    }

    /// Resolve a first page with pass-through arguments
    ///
    /// # Errors
    ///
    /// Same as [`Application::start_with`].
    pub async fn start_with_args(
        self: &Arc<Self>,
        ctx: &Arc<TestContext>,
        tab: &SharedTab,
        page_id: &str,
        args: &PageArgs,
    ) -> HeofonResult<PageObject> {
        resolve(self, ctx, AuthMode::NoAuth, page_id, false, tab, Some(args)).await
    }
}

/// Domain per tier, with a fallback for tiers that are not listed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierDomains {
    default: String,
    per_tier: BTreeMap<Tier, String>,
}

impl TierDomains {
    /// Same domain for every tier
    #[must_use]
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            per_tier: BTreeMap::new(),
        }
    }

    /// Override the domain of one tier
    #[must_use]
    pub fn with_tier(mut self, tier: Tier, domain: impl Into<String>) -> Self {
        let _ = self.per_tier.insert(tier, domain.into());
        self
    }

    /// Domain serving a tier
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no domain is known at all.
    pub fn for_tier(&self, tier: Tier) -> HeofonResult<&str> {
        let domain = self.per_tier.get(&tier).unwrap_or(&self.default);
        if domain.is_empty() {
            return Err(HeofonError::config(format!("no domain configured for tier '{tier}'")));
        }
        Ok(domain)
    }
}
