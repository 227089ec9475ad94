// SPDX-License-Identifier: PMPL-1.0-or-later
//! Keyboard navigation check - WCAG 2.1.1 Keyboard, 2.1.2 No Keyboard Trap (Level A)
//!
//! Walks the sequential focus order from the document body by sending Tab:
//! - every newly focused element counts as reachable
//! - focus landing on an element seen before is a keyboard trap
//! - focus returning to the body means the order was exhausted
//!
//! The walk is bounded so it terminates on any page.

use crate::analyzers::Check;
use crate::page::{ElementHandle, Key, PageError, PageQuery};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Upper bound on Tab presses per walk
pub const MAX_TAB_STEPS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardNavigationResult {
    /// Distinct elements that received focus
    pub reachable_element_count: usize,
    pub can_tab_through: bool,
    pub trap_detected: bool,
    /// Tab press at which a previously seen element came back
    pub trap_index: Option<usize>,
    pub errors: Vec<String>,
}

/// Keyboard reachability and trap check
pub struct KeyboardCheck;

impl Check for KeyboardCheck {
    type Output = KeyboardNavigationResult;

    fn name(&self) -> &str {
        "Keyboard Navigation"
    }

    fn description(&self) -> &str {
        "Tabs through the page counting focusable elements and detecting focus traps"
    }

    fn wcag_criterion(&self) -> &str {
        "2.1.1"
    }

    fn run(&self, page: &dyn PageQuery) -> KeyboardNavigationResult {
        let mut result = KeyboardNavigationResult::default();

        if let Err(e) = walk_focus_order(page, &mut result) {
            warn!("Keyboard walk stopped early: {}", e);
            result
                .errors
                .push(format!("Error during keyboard navigation test: {}", e));
        }

        result.can_tab_through = result.reachable_element_count > 0;
        result
    }
}

fn walk_focus_order(
    page: &dyn PageQuery,
    result: &mut KeyboardNavigationResult,
) -> Result<(), PageError> {
    let body = page
        .find_first("body")?
        .ok_or_else(|| PageError::NotFound("body".to_string()))?;
    page.send_key(body, Key::Tab)?;

    let mut seen: HashSet<ElementHandle> = HashSet::new();

    for i in 0..MAX_TAB_STEPS {
        let current = page.active_element()?;

        if current == body {
            debug!("Focus returned to the body after {} tabs", i);
            return Ok(());
        }

        if !seen.insert(current) {
            result.trap_detected = true;
            result.trap_index = Some(i);
            result.errors.push(format!("Tab trap detected after {} tabs", i));
            return Ok(());
        }

        result.reachable_element_count += 1;
        page.send_key(current, Key::Tab)?;
    }

    debug!("Stopped after {} tabs without exhausting focus order", MAX_TAB_STEPS);
    Ok(())
}
