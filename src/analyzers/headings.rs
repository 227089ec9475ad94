// SPDX-License-Identifier: PMPL-1.0-or-later
//! Heading structure check - WCAG 1.3.1 Info and Relationships (Level A)

use crate::analyzers::Check;
use crate::page::{ElementHandle, PageError, PageQuery};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingStructureResult {
    pub total_headings: usize,
    pub levels_used: BTreeSet<u8>,
    pub has_level_one: bool,
    pub proper_sequence: bool,
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for HeadingStructureResult {
    fn default() -> Self {
        Self {
            total_headings: 0,
            levels_used: BTreeSet::new(),
            has_level_one: false,
            proper_sequence: true,
            issues: Vec::new(),
            error: None,
        }
    }
}

/// Heading level order check
pub struct HeadingCheck;

impl Check for HeadingCheck {
    type Output = HeadingStructureResult;

    fn name(&self) -> &str {
        "Heading Structure"
    }

    fn description(&self) -> &str {
        "Checks that the page starts at h1 and never skips a heading level"
    }

    fn wcag_criterion(&self) -> &str {
        "1.3.1"
    }

    fn run(&self, page: &dyn PageQuery) -> HeadingStructureResult {
        let mut result = HeadingStructureResult::default();

        let headings = match page.find_all(HEADINGS) {
            Ok(headings) => headings,
            Err(e) => {
                warn!("Heading check incomplete: {}", e);
                result.error = Some(format!("Error checking heading structure: {}", e));
                return result;
            }
        };

        let mut levels = Vec::with_capacity(headings.len());
        let mut failure = None;
        for heading in &headings {
            match heading_level(page, *heading) {
                Ok(Some(level)) => levels.push(level),
                Ok(None) => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        evaluate_levels(&levels, &mut result);
        result.total_headings = headings.len();

        if let Some(e) = failure {
            warn!("Heading check incomplete: {}", e);
            result.error = Some(format!("Error checking heading structure: {}", e));
        }

        result
    }
}

fn heading_level(page: &dyn PageQuery, heading: ElementHandle) -> Result<Option<u8>, PageError> {
    let tag = page.tag_name(heading)?;
    Ok(tag.strip_prefix('h').and_then(|n| n.parse().ok()))
}

/// Apply the ordering rules to heading levels in document order
pub fn evaluate_levels(levels: &[u8], result: &mut HeadingStructureResult) {
    result.total_headings = levels.len();
    result.levels_used = levels.iter().copied().collect();
    result.has_level_one = result.levels_used.contains(&1);

    let mut previous = 0u8;
    for (i, &level) in levels.iter().enumerate() {
        if i == 0 && level != 1 {
            result.proper_sequence = false;
            result
                .issues
                .push(format!("First heading is not h1, found h{}", level));
        }

        if previous > 0 && level > previous + 1 {
            result.proper_sequence = false;
            result
                .issues
                .push(format!("Heading level jumped from h{} to h{}", previous, level));
        }

        previous = level;
    }
}
