// SPDX-License-Identifier: PMPL-1.0-or-later
//! Static HTML page adapter.
//!
//! Parses a document with `scraper` and answers element queries against it.
//! Sequential focus navigation is simulated the way browsers order it:
//! positive `tabindex` values first (ascending, ties in document order), then
//! natively focusable or `tabindex="0"` elements in document order. Tabbing
//! past the last element returns focus to the document body.

use crate::error::Result;
use crate::page::{ElementHandle, Key, PageError, PageQuery};
use scraper::{ElementRef, Html, Selector};
use std::cell::Cell;
use std::path::Path;
use tracing::debug;

/// A parsed, non-scripted HTML document
pub struct StaticPage {
    document: Html,
    focused: Cell<Option<ElementHandle>>,
}

impl StaticPage {
    /// Parse a full HTML document
    pub fn parse(content: &str) -> Self {
        Self {
            document: Html::parse_document(content),
            focused: Cell::new(None),
        }
    }

    /// Read and parse an HTML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!("Parsed {} ({} bytes)", path.display(), content.len());
        Ok(Self::parse(&content))
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    fn element(&self, handle: ElementHandle) -> std::result::Result<ElementRef<'_>, PageError> {
        usize::try_from(handle.id())
            .ok()
            .and_then(|idx| self.elements().nth(idx))
            .ok_or(PageError::StaleElement(handle.id()))
    }

    fn body(&self) -> ElementHandle {
        let body_sel = Selector::parse("body").expect("valid selector");
        self.document
            .select(&body_sel)
            .next()
            .and_then(|body| self.elements().position(|e| e.id() == body.id()))
            .map(|idx| ElementHandle::new(idx as u64))
            .unwrap_or(ElementHandle::new(0))
    }

    /// Focusable elements in sequential navigation order
    fn tab_sequence(&self) -> Vec<ElementHandle> {
        let mut positive: Vec<(i32, ElementHandle)> = Vec::new();
        let mut natural: Vec<ElementHandle> = Vec::new();

        for (idx, el) in self.elements().enumerate() {
            let handle = ElementHandle::new(idx as u64);
            match tab_index(el) {
                Some(n) if n > 0 => positive.push((n, handle)),
                Some(0) => natural.push(handle),
                Some(_) => {}
                None if is_natively_focusable(el) => natural.push(handle),
                None => {}
            }
        }

        // stable sort keeps document order among equal tabindex values
        positive.sort_by_key(|(n, _)| *n);
        positive.into_iter().map(|(_, h)| h).chain(natural).collect()
    }
}

/// Parsed `tabindex`, ignoring disabled controls and malformed values
fn tab_index(el: ElementRef<'_>) -> Option<i32> {
    if el.value().attr("disabled").is_some() {
        return Some(-1);
    }
    el.value().attr("tabindex").and_then(|v| v.trim().parse().ok())
}

fn is_natively_focusable(el: ElementRef<'_>) -> bool {
    let value = el.value();
    match value.name() {
        "a" | "area" => value.attr("href").is_some(),
        "button" | "select" | "textarea" | "iframe" | "summary" => true,
        "input" => !value
            .attr("type")
            .map(|t| t.eq_ignore_ascii_case("hidden"))
            .unwrap_or(false),
        _ => value.attr("contenteditable").is_some_and(|v| v != "false"),
    }
}

impl PageQuery for StaticPage {
    fn find_all(&self, selector: &str) -> std::result::Result<Vec<ElementHandle>, PageError> {
        let parsed =
            Selector::parse(selector).map_err(|_| PageError::InvalidSelector(selector.to_string()))?;
        let order: Vec<_> = self.elements().map(|e| e.id()).collect();

        Ok(self
            .document
            .select(&parsed)
            .filter_map(|el| order.iter().position(|id| *id == el.id()))
            .map(|idx| ElementHandle::new(idx as u64))
            .collect())
    }

    fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> std::result::Result<Option<String>, PageError> {
        Ok(self.element(element)?.value().attr(name).map(str::to_string))
    }

    fn tag_name(&self, element: ElementHandle) -> std::result::Result<String, PageError> {
        Ok(self.element(element)?.value().name().to_lowercase())
    }

    fn outer_html(&self, element: ElementHandle) -> std::result::Result<String, PageError> {
        Ok(self.element(element)?.html())
    }

    fn active_element(&self) -> std::result::Result<ElementHandle, PageError> {
        Ok(self.focused.get().unwrap_or_else(|| self.body()))
    }

    fn send_key(&self, element: ElementHandle, key: Key) -> std::result::Result<(), PageError> {
        self.element(element)?;
        match key {
            Key::Tab => {
                let sequence = self.tab_sequence();
                let next = match sequence.iter().position(|h| *h == element) {
                    Some(pos) => sequence.get(pos + 1).copied(),
                    None => sequence.first().copied(),
                };
                debug!("Tab from {} moves focus to {:?}", element, next);
                self.focused.set(next);
            }
        }
        Ok(())
    }
}
