//! Browser capability seam.
//!
//! Everything above this module talks to the page through [`Session`] and
//! [`Element`]. The production implementation lives in
//! [`crate::webdriver`]; tests drive the same code against an in-memory DOM.
//!
//! "No such element" is not an error here: `find_one` returns `Ok(None)` so
//! callers branch on absence instead of catching failures.

use std::fmt;

use crate::error::DriverError;

/// Element lookup strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum By<'a> {
    Id(&'a str),
    ClassName(&'a str),
    Tag(&'a str),
    Css(&'a str),
    LinkText(&'a str),
    /// Any element whose own text node contains the given string.
    ContainsText(&'a str),
}

impl fmt::Display for By<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Id(id) => write!(f, "id `{id}`"),
            By::ClassName(class) => write!(f, "class `{class}`"),
            By::Tag(tag) => write!(f, "tag `{tag}`"),
            By::Css(css) => write!(f, "css `{css}`"),
            By::LinkText(text) => write!(f, "link text `{text}`"),
            By::ContainsText(text) => write!(f, "text containing `{text}`"),
        }
    }
}

/// A browser session bound to one tab.
///
/// Sessions are single-owner: one per scraping task, never shared between
/// concurrent workers.
#[allow(async_fn_in_trait)]
pub trait Session {
    type Element: Element;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn find_one(&self, by: By<'_>) -> Result<Option<Self::Element>, DriverError>;

    async fn find_many(&self, by: By<'_>) -> Result<Vec<Self::Element>, DriverError>;

    /// Route subsequent lookups into the given `<iframe>`.
    async fn switch_frame(&self, frame: &Self::Element) -> Result<(), DriverError>;

    /// Route subsequent lookups back to the top-level document.
    async fn switch_default_context(&self) -> Result<(), DriverError>;
}

/// A located DOM node.
#[allow(async_fn_in_trait)]
pub trait Element: Sized {
    /// Visible text, including descendants.
    async fn text(&self) -> Result<String, DriverError>;

    /// Raw markup value of an attribute, as written in the page source.
    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError>;

    /// Live DOM property. For `href` this is the URL resolved against the
    /// document base, so relative links come back absolute.
    async fn property(&self, name: &str) -> Result<Option<String>, DriverError>;

    async fn click(&self) -> Result<(), DriverError>;

    async fn send_keys(&self, text: &str) -> Result<(), DriverError>;

    async fn find_one(&self, by: By<'_>) -> Result<Option<Self>, DriverError>;

    async fn find_many(&self, by: By<'_>) -> Result<Vec<Self>, DriverError>;
}
