// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule-engine invocation and scan-result extraction.
//!
//! The rule engine (axe-core, injected into the page) is reached through the
//! [`RuleEngine`] capability. Engine failures never escape this module: a
//! failed or malformed run is reported as "no results" and the extractor
//! functions turn an absent result into empty sections.

use crate::error::Result;
use crate::model::{ScanResult, Violation, ViolationSummary, WcagLevel};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Context selector used when a custom scan does not name one
pub const DEFAULT_CONTEXT: &str = "body";

/// Inject and run an accessibility rule engine in the current page
pub trait RuleEngine {
    /// Make the engine available in the page. Safe to call repeatedly.
    fn inject(&self) -> Result<()>;

    /// Run the engine and return its raw JSON payload.
    ///
    /// `None` context scans the whole document; `None` options use the
    /// engine defaults.
    fn run(
        &self,
        context: Option<&str>,
        options: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value>;
}

/// Restrict a run to rules carrying given tags, or to named rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum RunOnly {
    Tag(Vec<String>),
    Rule(Vec<String>),
}

/// Options object handed to `axe.run`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_only: Option<RunOnly>,
}

impl ScanOptions {
    /// Rules tagged for a WCAG conformance level (and the levels below it)
    pub fn for_level(level: WcagLevel) -> Self {
        Self {
            run_only: Some(RunOnly::Tag(level.axe_tags())),
        }
    }

    /// Only the named rules
    pub fn for_rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            run_only: Some(RunOnly::Rule(rules.into_iter().map(Into::into).collect())),
        }
    }

    /// Explicit rules win over the level's tags
    pub fn from_level_and_rules(level: WcagLevel, rules: &[String]) -> Self {
        if rules.is_empty() {
            Self::for_level(level)
        } else {
            Self::for_rules(rules.iter().cloned())
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::for_level(WcagLevel::AA)
    }
}

/// Drives one rule engine and normalizes what it returns
pub struct Scanner<'a> {
    engine: &'a dyn RuleEngine,
}

impl<'a> Scanner<'a> {
    pub fn new(engine: &'a dyn RuleEngine) -> Self {
        Self { engine }
    }

    fn inject(&self) -> bool {
        match self.engine.inject() {
            Ok(()) => {
                debug!("axe-core injected");
                true
            }
            Err(e) => {
                warn!("Could not inject rule engine: {}", e);
                false
            }
        }
    }

    fn run(&self, context: Option<&str>, options: Option<&ScanOptions>) -> Option<ScanResult> {
        if !self.inject() {
            return None;
        }

        let options = options.map(ScanOptions::to_value);
        match self.engine.run(context, options.as_ref()) {
            Ok(payload) => {
                let result = ScanResult::from_value(payload)?;
                info!(
                    violations = result.violations.len(),
                    passes = result.passes.len(),
                    "Rule engine scan complete"
                );
                Some(result)
            }
            Err(e) => {
                warn!("Error running accessibility scan: {}", e);
                None
            }
        }
    }

    /// Whole document, engine defaults
    pub fn run_full_scan(&self) -> Option<ScanResult> {
        self.run(None, None)
    }

    /// Scoped scan; defaults to the body and WCAG 2 A/AA rules
    pub fn run_custom_scan(
        &self,
        context: Option<&str>,
        options: Option<&ScanOptions>,
    ) -> Option<ScanResult> {
        let default_options = ScanOptions::default();
        self.run(
            Some(context.unwrap_or(DEFAULT_CONTEXT)),
            Some(options.unwrap_or(&default_options)),
        )
    }

    /// A single rule over the body
    pub fn run_rule_scan(&self, rule_id: &str) -> Option<ScanResult> {
        let options = ScanOptions::for_rules([rule_id]);
        self.run(Some(DEFAULT_CONTEXT), Some(&options))
    }
}

/// Violations of a scan; empty when there is no result
pub fn violations(result: Option<&ScanResult>) -> &[Violation] {
    result.map(|r| r.violations.as_slice()).unwrap_or(&[])
}

pub fn violation_count(result: Option<&ScanResult>) -> usize {
    violations(result).len()
}

/// `{id, help, impact, nodeCount}` per violation
pub fn violation_summary(result: Option<&ScanResult>) -> Vec<ViolationSummary> {
    violations(result).iter().map(ViolationSummary::from).collect()
}

/// Human-readable numbered summary of the violations
pub fn format_violation_summary(result: Option<&ScanResult>) -> String {
    let summary = violation_summary(result);
    if summary.is_empty() {
        return "No accessibility violations found!\n".to_string();
    }

    let mut output = format!("Found {} accessibility violations:\n", summary.len());
    for (i, v) in summary.iter().enumerate() {
        let help = if v.help.is_empty() { "No description" } else { &v.help };
        let id = if v.id.is_empty() { "Unknown" } else { &v.id };
        output.push_str(&format!("{}. {}: {}\n", i + 1, id, help));
        output.push_str(&format!("   Impact: {}\n", v.impact));
        output.push_str(&format!("   Nodes affected: {}\n\n", v.node_count));
    }
    output
}
