// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page-query capability consumed by the structural checks.
//!
//! Two adapters implement [`PageQuery`]:
//! - [`static_page::StaticPage`]: a parsed HTML document with a simulated
//!   sequential focus order, used for offline audits and tests
//! - [`browser::BrowserSession`]: a live Chromium page driven over CDP

pub mod browser;
pub mod static_page;

use thiserror::Error;

/// Failures raised by a page adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("no element matches '{0}'")]
    NotFound(String),

    #[error("invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("element {0} is no longer attached to the page")]
    StaleElement(u64),

    #[error("browser transport error: {0}")]
    Transport(String),
}

/// Opaque identity of one element on the current page.
///
/// Two handles compare equal iff they denote the same DOM node, which is what
/// the keyboard walk relies on to detect revisits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Synthetic key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Sequential focus advance
    Tab,
}

impl Key {
    /// Key name as understood by the browser input domain
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Tab => "Tab",
        }
    }
}

/// Query the rendered element tree and synthesize key input
pub trait PageQuery {
    /// All elements matching a CSS selector, in document order. No match is
    /// an empty vector, not an error.
    fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, PageError>;

    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, element: ElementHandle, name: &str) -> Result<Option<String>, PageError>;

    /// Lower-case tag name
    fn tag_name(&self, element: ElementHandle) -> Result<String, PageError>;

    /// Serialized outer HTML of the element
    fn outer_html(&self, element: ElementHandle) -> Result<String, PageError>;

    /// Element that currently holds keyboard focus (the body when nothing does)
    fn active_element(&self) -> Result<ElementHandle, PageError>;

    /// Send a key press to an element
    fn send_key(&self, element: ElementHandle, key: Key) -> Result<(), PageError>;

    /// First element matching a selector
    fn find_first(&self, selector: &str) -> Result<Option<ElementHandle>, PageError> {
        Ok(self.find_all(selector)?.into_iter().next())
    }
}
