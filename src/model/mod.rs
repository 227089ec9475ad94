// SPDX-License-Identifier: PMPL-1.0-or-later
//! Scan data model shared by the extractor, the aggregator and the renderers.
//!
//! These types mirror the JSON payload returned by axe-core's `axe.run()`
//! closely enough to deserialize it directly, while tolerating missing
//! fields and `null` impacts so that a partial payload never fails.

use crate::glossary;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Impact severity assigned by the rule engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Engine gave no impact (or one we do not recognise)
    #[default]
    Unknown,
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl Impact {
    /// All impacts from most to least severe
    pub const ALL: [Impact; 5] = [
        Impact::Critical,
        Impact::Serious,
        Impact::Moderate,
        Impact::Minor,
        Impact::Unknown,
    ];

    /// Parse an engine impact string, falling back to `Unknown`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "minor" => Impact::Minor,
            "moderate" => Impact::Moderate,
            "serious" => Impact::Serious,
            "critical" => Impact::Critical,
            _ => Impact::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Unknown => "unknown",
            Impact::Minor => "minor",
            Impact::Moderate => "moderate",
            Impact::Serious => "serious",
            Impact::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Impact {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Impact::parse).unwrap_or_default())
    }
}

/// WCAG conformance level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Level A - minimum conformance
    A,
    /// Level AA - standard conformance
    #[default]
    AA,
    /// Level AAA - enhanced conformance
    AAA,
}

impl WcagLevel {
    /// axe-core tags to pass as `runOnly` values for this level
    pub fn axe_tags(&self) -> Vec<String> {
        let tags: &[&str] = match self {
            WcagLevel::A => &["wcag2a"],
            WcagLevel::AA => &["wcag2a", "wcag2aa"],
            WcagLevel::AAA => &["wcag2a", "wcag2aa", "wcag2aaa"],
        };
        tags.iter().map(|t| t.to_string()).collect()
    }
}

impl std::fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WcagLevel::A => write!(f, "A"),
            WcagLevel::AA => write!(f, "AA"),
            WcagLevel::AAA => write!(f, "AAA"),
        }
    }
}

impl std::str::FromStr for WcagLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(WcagLevel::A),
            "AA" => Ok(WcagLevel::AA),
            "AAA" => Ok(WcagLevel::AAA),
            other => Err(format!("Unknown WCAG level: {}", other)),
        }
    }
}

/// One DOM element affected by a rule, as serialized markup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AffectedNode {
    /// Outer HTML fragment identifying the element
    #[serde(rename = "html")]
    pub html_snippet: String,
    /// Engine's explanation of what to fix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

/// A single rule failure reported by the rule engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Violation {
    /// Rule identifier (e.g. "image-alt")
    pub id: String,
    /// Short human-readable rule summary
    pub help: String,
    /// Longer rule description
    pub description: String,
    pub impact: Impact,
    /// Link to the rule documentation
    pub help_url: String,
    pub tags: BTreeSet<String>,
    pub nodes: Vec<AffectedNode>,
}

impl Violation {
    /// WCAG criterion numbers encoded in this violation's tags
    pub fn wcag_criteria(&self) -> Vec<String> {
        self.tags
            .iter()
            .filter_map(|tag| glossary::criterion_from_tag(tag))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// A rule that passed on the scanned page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PassedCheck {
    pub id: String,
    pub help: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub nodes: Vec<AffectedNode>,
}

/// Normalized rule-engine payload for one scan invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanResult {
    pub violations: Vec<Violation>,
    pub passes: Vec<PassedCheck>,
    pub url: String,
    /// Engine-reported scan time, as given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ScanResult {
    /// Build from a raw engine payload. Anything that is not a scan-shaped
    /// object yields `None`.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            warn!("Rule engine returned a non-object payload; treating as no results");
            return None;
        }
        match serde_json::from_value(value) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Could not interpret rule engine payload: {}", e);
                None
            }
        }
    }
}

/// Projection of a violation used for summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationSummary {
    pub id: String,
    pub help: String,
    pub impact: Impact,
    pub node_count: usize,
}

impl From<&Violation> for ViolationSummary {
    fn from(v: &Violation) -> Self {
        Self {
            id: v.id.clone(),
            help: v.help.clone(),
            impact: v.impact,
            node_count: v.nodes.len(),
        }
    }
}
