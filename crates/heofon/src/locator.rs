//! Selectors for the elements a page object interacts with.
//!
//! A [`Selector`] is plain data: it can be declared in navigation YAML, logged,
//! and turned into a DOM query for tabs that only speak JavaScript.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "nav a.navbar-brand")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Text content selector
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// CSS selector narrowed to elements containing a text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a CSS selector filtered by text content
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// The plain CSS form, when the selector has one
    #[must_use]
    pub fn as_css(&self) -> Option<&str> {
        match self {
            Self::Css(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a JavaScript expression yielding the first matching element
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::XPath(s) => format!(
                "document.evaluate({s:?}, document, null, \
                 XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue"
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('*'))\
                 .find(el => el.textContent.includes({t:?}))"
            ),
            Self::TestId(id) => format!("document.querySelector('[data-testid={id:?}]')"),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({css:?}))\
                 .find(el => el.textContent.includes({text:?}))"
            ),
        }
    }

    /// Script that clicks the first match and reports whether one existed
    #[must_use]
    pub fn to_click_script(&self) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) {{ return false; }} el.click(); return true; }})()",
            self.to_query()
        )
    }

    /// Script that replaces the value of the first match and fires `input`
    #[must_use]
    pub fn to_fill_script(&self, text: &str) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) {{ return false; }} el.value = {text:?}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); return true; }})()",
            self.to_query()
        )
    }

    /// Script that dispatches a mouseover on the first match
    #[must_use]
    pub fn to_hover_script(&self) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) {{ return false; }} \
             el.dispatchEvent(new MouseEvent('mouseover', {{ bubbles: true }})); \
             return true; }})()",
            self.to_query()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::TestId(id) => write!(f, "[data-testid={id}]"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text('{text}')"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let sel = Selector::css("nav a.navbar-brand");
            assert_eq!(
                sel.to_query(),
                "document.querySelector(\"nav a.navbar-brand\")"
            );
            assert_eq!(sel.as_css(), Some("nav a.navbar-brand"));
        }

        #[test]
        fn test_css_with_text_query() {
            let sel = Selector::css_with_text("nav a", "Sweets");
            let query = sel.to_query();
            assert!(query.contains("querySelectorAll(\"nav a\")"));
            assert!(query.contains("includes(\"Sweets\")"));
            assert!(sel.as_css().is_none());
        }

        #[test]
        fn test_click_script_wraps_query() {
            let script = Selector::test_id("login").to_click_script();
            assert!(script.contains("data-testid"));
            assert!(script.contains("el.click()"));
        }

        #[test]
        fn test_fill_script_reports_missing_element() {
            let script = Selector::css("#email").to_fill_script("ada@example.com");
            assert!(script.contains("if (!el) { return false; }"));
            assert!(script.contains("el.value = \"ada@example.com\""));
        }

        #[test]
        fn test_display_uses_has_text_form() {
            let sel = Selector::css_with_text("nav a", "About");
            assert_eq!(sel.to_string(), "nav a:has-text('About')");
        }
    }

    mod serde_tests {
        use super::*;

        fn from_map(yaml: &str) -> Selector {
            serde_yaml_ng::with::singleton_map::deserialize(serde_yaml_ng::Deserializer::from_str(
                yaml,
            ))
            .unwrap()
        }

        #[test]
        fn test_yaml_map_forms() {
            assert_eq!(
                from_map("css: nav a.navbar-brand"),
                Selector::css("nav a.navbar-brand")
            );
            assert_eq!(
                from_map("css_with_text: { css: nav a, text: Basket }"),
                Selector::css_with_text("nav a", "Basket")
            );
        }

        #[test]
        fn test_yaml_tag_form() {
            let sel: Selector = serde_yaml_ng::from_str("!test_id login").unwrap();
            assert_eq!(sel, Selector::test_id("login"));
        }
    }
}
