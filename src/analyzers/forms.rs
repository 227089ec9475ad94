// SPDX-License-Identifier: PMPL-1.0-or-later
//! Form label check - WCAG 3.3.2 Labels or Instructions (Level A)
//!
//! A control counts as labelled only when it has an `id` and some
//! `<label for="...">` names that id. Wrapping labels are not considered.

use crate::analyzers::{Check, ProblemElement};
use crate::page::{PageError, PageQuery};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const FORM_CONTROLS: &str = "input, select, textarea";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormLabelsResult {
    pub total_fields: usize,
    pub fields_without_labels: usize,
    pub fields_with_labels: usize,
    pub problem_fields: Vec<ProblemElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Explicit label association check
pub struct FormLabelCheck;

impl Check for FormLabelCheck {
    type Output = FormLabelsResult;

    fn name(&self) -> &str {
        "Form Labels"
    }

    fn description(&self) -> &str {
        "Checks that form controls are associated with a <label for> element"
    }

    fn wcag_criterion(&self) -> &str {
        "3.3.2"
    }

    fn run(&self, page: &dyn PageQuery) -> FormLabelsResult {
        let mut result = FormLabelsResult::default();

        if let Err(e) = check_fields(page, &mut result) {
            warn!("Form label check incomplete: {}", e);
            result.error = Some(format!("Error checking form labels: {}", e));
        }

        result
    }
}

fn check_fields(page: &dyn PageQuery, result: &mut FormLabelsResult) -> Result<(), PageError> {
    let fields = page.find_all(FORM_CONTROLS)?;
    result.total_fields = fields.len();

    for field in fields {
        let issue = match page.attribute(field, "id")?.filter(|id| !id.is_empty()) {
            None => Some("No ID attribute for label association".to_string()),
            Some(id) => {
                if page.find_all(&label_selector(&id))?.is_empty() {
                    Some(format!("No label found for field with ID '{}'", id))
                } else {
                    None
                }
            }
        };

        match issue {
            Some(issue) => {
                debug!("Field {}: {}", field, issue);
                result.fields_without_labels += 1;
                result
                    .problem_fields
                    .push(ProblemElement::new(issue, page.outer_html(field)?));
            }
            None => result.fields_with_labels += 1,
        }
    }

    Ok(())
}

/// `label[for='<id>']` with the id quoted as a CSS string
pub fn label_selector(id: &str) -> String {
    let mut quoted = String::with_capacity(id.len());
    for c in id.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    format!("label[for='{}']", quoted)
}
