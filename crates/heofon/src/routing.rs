//! Routing tables: page id to page-object factory, one table per auth mode.
//!
//! Every application carries exactly two tables, `noauth` and `auth`. Which
//! one a transition searches depends on the auth mode of the page it starts
//! from and on whether the transition crosses the auth boundary:
//!
//! | current | cross | table  |
//! |---------|-------|--------|
//! | noauth  | false | noauth |
//! | noauth  | true  | auth   |
//! | auth    | false | auth   |
//! | auth    | true  | noauth |
//!
//! Tables are declared as YAML data. The `object` of each entry names a
//! factory registered in a [`PageRegistry`]; unknown names are rejected when
//! the routing is loaded, not when a test first navigates.

use crate::page_object::PageFactory;
use crate::result::{HeofonError, HeofonResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Which page universe a page belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMode {
    /// Pages reachable without logging in
    #[serde(rename = "noauth")]
    NoAuth,
    /// Pages that require an authenticated session
    #[serde(rename = "auth")]
    Auth,
}

impl AuthMode {
    /// Textual form used in routing data and logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoAuth => "noauth",
            Self::Auth => "auth",
        }
    }

    /// The mode on the other side of the auth boundary
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::NoAuth => Self::Auth,
            Self::Auth => Self::NoAuth,
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = HeofonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "noauth" => Ok(Self::NoAuth),
            "auth" => Ok(Self::Auth),
            other => Err(HeofonError::config(format!(
                "invalid auth mode '{other}', expected 'noauth' or 'auth'"
            ))),
        }
    }
}

/// Select the routing table for a transition
///
/// Crossing the boundary flips the mode; otherwise the current mode is kept.
#[must_use]
pub const fn select_table(current: AuthMode, cross_auth_boundary: bool) -> AuthMode {
    if cross_auth_boundary {
        current.opposite()
    } else {
        current
    }
}

// =============================================================================
// PAGE REGISTRY
// =============================================================================

/// Compile-time registry of page factories, keyed by object name
#[derive(Clone, Default)]
pub struct PageRegistry {
    factories: HashMap<String, PageFactory>,
}

impl fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRegistry")
            .field("objects", &self.list())
            .finish()
    }
}

impl PageRegistry {
    /// Create a new page registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under an object name
    #[must_use]
    pub fn with(mut self, object: impl Into<String>, factory: PageFactory) -> Self {
        self.register(object, factory);
        self
    }

    /// Register a factory under an object name
    pub fn register(&mut self, object: impl Into<String>, factory: PageFactory) {
        let _ = self.factories.insert(object.into(), factory);
    }

    /// Get a factory by object name
    #[must_use]
    pub fn get(&self, object: &str) -> Option<PageFactory> {
        self.factories.get(object).copied()
    }

    /// List all registered object names
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered factories
    #[must_use]
    pub fn count(&self) -> usize {
        self.factories.len()
    }
}

// =============================================================================
// ROUTING DATA
// =============================================================================

/// One routable page
#[derive(Clone)]
pub struct RoutingEntry {
    /// Page id, equal to the page object's name
    pub page_id: String,
    /// Module reference, relative to the table's base path
    pub module: String,
    /// Registered object name
    pub object: String,
    /// Factory resolved from the registry
    pub factory: PageFactory,
}

impl fmt::Debug for RoutingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingEntry")
            .field("page_id", &self.page_id)
            .field("module", &self.module)
            .field("object", &self.object)
            .finish_non_exhaustive()
    }
}

impl RoutingEntry {
    /// Full module path as logged on resolution
    #[must_use]
    pub fn module_path(&self, base_path: &str) -> String {
        format!("{base_path}{}", self.module)
    }
}

/// Page id to entry mapping for one auth mode
#[derive(Debug, Clone)]
pub struct RoutingTable {
    auth_mode: AuthMode,
    base_path: String,
    entries: HashMap<String, RoutingEntry>,
}

impl RoutingTable {
    /// Mode this table serves
    #[must_use]
    pub const fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// Prefix prepended to module references
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Get an entry by page id
    #[must_use]
    pub fn get(&self, page_id: &str) -> Option<&RoutingEntry> {
        self.entries.get(page_id)
    }

    /// Check whether a page id is routable in this table
    #[must_use]
    pub fn contains(&self, page_id: &str) -> bool {
        self.entries.contains_key(page_id)
    }

    /// Page ids in sorted order
    #[must_use]
    pub fn page_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of routable pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no pages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    module: String,
    object: String,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    auth_mode: String,
    #[serde(default)]
    base_path: String,
    #[serde(default)]
    pages: BTreeMap<String, RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawRouting {
    tables: Vec<RawTable>,
}

/// Both routing tables of an application
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    noauth: RoutingTable,
    auth: RoutingTable,
}

impl RoutingConfig {
    /// Load routing tables from YAML, resolving objects against the registry
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid or duplicated auth mode,
    /// a missing table, or an object name the registry does not know.
    pub fn from_yaml(yaml: &str, registry: &PageRegistry) -> HeofonResult<Self> {
        let raw: RawRouting = serde_yaml_ng::from_str(yaml)?;

        let mut noauth = None;
        let mut auth = None;
        for table in raw.tables {
            let mode: AuthMode = table.auth_mode.parse()?;
            let slot = match mode {
                AuthMode::NoAuth => &mut noauth,
                AuthMode::Auth => &mut auth,
            };
            if slot.is_some() {
                return Err(HeofonError::config(format!(
                    "routing table '{mode}' is declared more than once"
                )));
            }
            *slot = Some(Self::build_table(mode, table, registry)?);
        }

        let missing =
            |mode: AuthMode| HeofonError::config(format!("routing table '{mode}' is missing"));
        Ok(Self {
            noauth: noauth.ok_or_else(|| missing(AuthMode::NoAuth))?,
            auth: auth.ok_or_else(|| missing(AuthMode::Auth))?,
        })
    }

    fn build_table(
        auth_mode: AuthMode,
        raw: RawTable,
        registry: &PageRegistry,
    ) -> HeofonResult<RoutingTable> {
        let mut entries = HashMap::with_capacity(raw.pages.len());
        for (page_id, entry) in raw.pages {
            let factory = registry.get(&entry.object).ok_or_else(|| {
                HeofonError::config(format!(
                    "page '{page_id}' in the {auth_mode} table refers to unregistered object '{}'",
                    entry.object
                ))
            })?;
            let _ = entries.insert(
                page_id.clone(),
                RoutingEntry {
                    page_id,
                    module: entry.module,
                    object: entry.object,
                    factory,
                },
            );
        }
        Ok(RoutingTable {
            auth_mode,
            base_path: raw.base_path,
            entries,
        })
    }

    /// Table for a mode
    #[must_use]
    pub const fn table(&self, mode: AuthMode) -> &RoutingTable {
        match mode {
            AuthMode::NoAuth => &self.noauth,
            AuthMode::Auth => &self.auth,
        }
    }

    /// Select the table for a transition and look up the target page
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::UnknownPage`] naming the id and the table searched.
    pub fn lookup(
        &self,
        current: AuthMode,
        page_id: &str,
        cross_auth_boundary: bool,
    ) -> HeofonResult<(&RoutingTable, &RoutingEntry)> {
        let table = self.table(select_table(current, cross_auth_boundary));
        let entry = table.get(page_id).ok_or_else(|| HeofonError::UnknownPage {
            page_id: page_id.to_string(),
            table: table.auth_mode(),
        })?;
        Ok((table, entry))
    }
}
