//! In-memory stand-ins for the browser and the artifact files.
//!
//! [`MockTab`] is a scripted site: a set of pages with titles and a set of
//! clickable elements that lead to URLs. [`RecordingSink`] keeps every capture
//! in memory so tests can count capture cycles.
//!
//! ```rust,ignore
//! let tab = MockTab::new()
//!     .with_page("https://shop.test/", "Shop")
//!     .with_page("https://shop.test/cart", "Shop")
//!     .with_link(Selector::css("a.cart"), "https://shop.test/cart");
//! tab.navigate("https://shop.test/").await?;
//! tab.click(&Selector::css("a.cart")).await?;
//! assert_eq!(tab.url(), "https://shop.test/cart");
//! ```

mod sink;
mod tab;

pub use sink::{Capture, RecordingSink};
pub use tab::MockTab;
