// SPDX-License-Identifier: PMPL-1.0-or-later
//! Structural accessibility checks run against a rendered page.
//!
//! Each check covers one WCAG criterion the injected rule engine handles
//! poorly or not at all. Checks only read the page (the keyboard walk sends
//! Tab presses) and never fail: lookup errors are recorded inside their own
//! result so sibling checks still run.

pub mod alt_text;
pub mod forms;
pub mod headings;
pub mod keyboard;

use crate::page::PageQuery;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use alt_text::{AltTextCheck, ImageAltTextResult};
pub use forms::{FormLabelCheck, FormLabelsResult};
pub use headings::{HeadingCheck, HeadingStructureResult};
pub use keyboard::{KeyboardCheck, KeyboardNavigationResult};

/// Trait implemented by all structural checks
pub trait Check: Send + Sync {
    /// Result record produced by one run
    type Output;

    /// Human-readable name of this check
    fn name(&self) -> &str;

    /// Short description of what this check verifies
    fn description(&self) -> &str;

    /// WCAG success criterion this check maps to
    fn wcag_criterion(&self) -> &str;

    /// Inspect the page; failures are folded into the output
    fn run(&self, page: &dyn PageQuery) -> Self::Output;
}

/// An element flagged by a check, with the reason and its markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemElement {
    pub issue: String,
    pub html: String,
}

impl ProblemElement {
    pub fn new(issue: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            html: html.into(),
        }
    }
}

/// All four structural checks for one page visit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralAudit {
    pub keyboard_navigation: KeyboardNavigationResult,
    pub image_alt_text: ImageAltTextResult,
    pub form_labels: FormLabelsResult,
    pub heading_structure: HeadingStructureResult,
}

impl StructuralAudit {
    /// Number of distinct problems across the four checks
    pub fn issue_count(&self) -> usize {
        usize::from(self.keyboard_navigation.trap_detected)
            + self.image_alt_text.problem_images.len()
            + self.form_labels.problem_fields.len()
            + self.heading_structure.issues.len()
    }

    /// Lookup failures recorded by any check
    pub fn errors(&self) -> Vec<String> {
        let mut errors = self.keyboard_navigation.errors.clone();
        errors.extend(self.image_alt_text.error.iter().cloned());
        errors.extend(self.form_labels.error.iter().cloned());
        errors.extend(self.heading_structure.error.iter().cloned());
        errors
    }
}

/// Run every structural check against the page
pub fn run_structural_audit(page: &dyn PageQuery) -> StructuralAudit {
    let audit = StructuralAudit {
        keyboard_navigation: run_check(&KeyboardCheck, page),
        image_alt_text: run_check(&AltTextCheck, page),
        form_labels: run_check(&FormLabelCheck, page),
        heading_structure: run_check(&HeadingCheck, page),
    };

    info!(issues = audit.issue_count(), "Structural audit complete");
    audit
}

fn run_check<C: Check>(check: &C, page: &dyn PageQuery) -> C::Output {
    debug!("Running {} (WCAG {})", check.name(), check.wcag_criterion());
    check.run(page)
}
