// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report aggregation and rendering.
//!
//! [`aggregate`] merges one rule-engine scan and one structural audit into an
//! [`AggregatedReport`]. Absent inputs become empty sections. The report can
//! then be rendered as:
//! - Text: human-readable summary with WCAG criterion references
//! - JSON: the aggregated report itself
//! - HTML: standalone page (see [`html`])
//! - SARIF: Static Analysis Results Interchange Format for CI integration

pub mod dashboard;
pub mod html;

use crate::analyzers::StructuralAudit;
use crate::glossary;
use crate::model::{Impact, PassedCheck, ScanResult, Violation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// Standalone HTML page
    #[default]
    Html,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
            OutputFormat::Sarif => "sarif",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Everything learned about one page visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedReport {
    pub source_url: String,
    pub timestamp: DateTime<Utc>,
    pub violations: Vec<Violation>,
    pub passes: Vec<PassedCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural_audit: Option<StructuralAudit>,
}

impl AggregatedReport {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Affected elements summed over all violations
    pub fn affected_node_count(&self) -> usize {
        self.violations.iter().map(Violation::node_count).sum()
    }

    pub fn count_by_impact(&self, impact: Impact) -> usize {
        self.violations.iter().filter(|v| v.impact == impact).count()
    }

    /// `(impact, count)` from most to least severe, skipping zero counts
    pub fn impact_breakdown(&self) -> Vec<(Impact, usize)> {
        Impact::ALL
            .iter()
            .map(|&impact| (impact, self.count_by_impact(impact)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    pub fn structural_issue_count(&self) -> usize {
        self.structural_audit
            .as_ref()
            .map(StructuralAudit::issue_count)
            .unwrap_or(0)
    }

    /// True when either the engine or the structural checks found something
    pub fn has_problems(&self) -> bool {
        !self.violations.is_empty() || self.structural_issue_count() > 0
    }
}

/// Merge a scan result and a structural audit into one report.
///
/// `url` names the visited page; when it is empty the scan's own URL is used.
pub fn aggregate(
    scan: Option<&ScanResult>,
    audit: Option<StructuralAudit>,
    url: &str,
) -> AggregatedReport {
    let source_url = if url.is_empty() {
        scan.map(|s| s.url.clone()).unwrap_or_default()
    } else {
        url.to_string()
    };

    AggregatedReport {
        source_url,
        timestamp: Utc::now(),
        violations: scan.map(|s| s.violations.clone()).unwrap_or_default(),
        passes: scan.map(|s| s.passes.clone()).unwrap_or_default(),
        structural_audit: audit,
    }
}

/// Render a report in the requested format
pub fn generate_report(report: &AggregatedReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(report),
        OutputFormat::Json => generate_json_report(report),
        OutputFormat::Html => html::render_report(report),
        OutputFormat::Sarif => generate_sarif_report(report),
    }
}

/// Generate human-readable text report
fn generate_text_report(report: &AggregatedReport) -> String {
    let mut output = String::new();

    output.push_str("=== a11ybot Accessibility Report ===\n\n");
    output.push_str(&format!("URL: {}\n", display_url(&report.source_url)));
    output.push_str(&format!(
        "Scanned: {}\n\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if report.violations.is_empty() {
        output.push_str("No rule engine violations found.\n\n");
    } else {
        let breakdown = report
            .impact_breakdown()
            .iter()
            .map(|(impact, n)| format!("{} {}", n, impact))
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!(
            "Found {} violation(s) affecting {} element(s): {}\n\n",
            report.violation_count(),
            report.affected_node_count(),
            breakdown
        ));

        for impact in Impact::ALL {
            let group: Vec<&Violation> =
                report.violations.iter().filter(|v| v.impact == impact).collect();
            if group.is_empty() {
                continue;
            }

            output.push_str(&format!("--- {} ({}) ---\n", impact.as_str().to_uppercase(), group.len()));

            for v in group {
                output.push_str(&format!("[{}] {}\n", v.id, v.help));

                for criterion in v.wcag_criteria() {
                    match glossary::explain(&criterion) {
                        Some(text) => output.push_str(&format!("  WCAG {}: {}\n", criterion, text)),
                        None => output.push_str(&format!("  WCAG {}\n", criterion)),
                    }
                }

                output.push_str(&format!("  Elements affected: {}\n", v.node_count()));
                if !v.help_url.is_empty() {
                    output.push_str(&format!("  More info: {}\n", v.help_url));
                }
                output.push('\n');
            }
        }
    }

    if let Some(audit) = &report.structural_audit {
        output.push_str(&structural_text(audit));
    }

    let structural = report.structural_issue_count();
    if report.has_problems() {
        output.push_str(&format!(
            "RESULT: FAIL ({} violation(s), {} structural issue(s))\n",
            report.violation_count(),
            structural
        ));
    } else {
        output.push_str(&format!("RESULT: PASS ({} rule(s) passed)\n", report.pass_count()));
    }

    output
}

fn structural_text(audit: &StructuralAudit) -> String {
    let kb = &audit.keyboard_navigation;
    let alt = &audit.image_alt_text;
    let forms = &audit.form_labels;
    let headings = &audit.heading_structure;

    let mut output = String::from("--- Structural checks ---\n");
    output.push_str(&format!(
        "Keyboard: {} focusable element(s){}\n",
        kb.reachable_element_count,
        if kb.trap_detected { ", focus trap detected" } else { "" }
    ));
    output.push_str(&format!(
        "Images: {} total, {} missing alt, {} empty alt, {} valid\n",
        alt.total_images, alt.missing_alt, alt.empty_alt, alt.valid_alt
    ));
    for p in &alt.problem_images {
        output.push_str(&format!("  - {}: {}\n", p.issue, p.html));
    }
    output.push_str(&format!(
        "Form fields: {} total, {} without labels\n",
        forms.total_fields, forms.fields_without_labels
    ));
    for p in &forms.problem_fields {
        output.push_str(&format!("  - {}: {}\n", p.issue, p.html));
    }
    output.push_str(&format!(
        "Headings: {} total, sequence {}\n",
        headings.total_headings,
        if headings.proper_sequence { "ok" } else { "broken" }
    ));
    for issue in &headings.issues {
        output.push_str(&format!("  - {}\n", issue));
    }
    for error in audit.errors() {
        output.push_str(&format!("Error: {}\n", error));
    }
    output.push('\n');
    output
}

fn display_url(url: &str) -> &str {
    if url.is_empty() {
        "Unknown"
    } else {
        url
    }
}

/// Generate JSON report
fn generate_json_report(report: &AggregatedReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize report: {}\"}}", e)
    })
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    #[serde(rename = "informationUri")]
    information_uri: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

fn sarif_level(impact: Impact) -> &'static str {
    match impact {
        Impact::Critical | Impact::Serious => "error",
        Impact::Moderate => "warning",
        Impact::Minor | Impact::Unknown => "note",
    }
}

/// Generate SARIF report
fn generate_sarif_report(report: &AggregatedReport) -> String {
    let location = || {
        vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: report.source_url.clone(),
                },
            },
        }]
    };

    let result = |rule_id: &str, level: &str, text: String| SarifResult {
        rule_id: rule_id.to_string(),
        level: level.to_string(),
        message: SarifMessage { text },
        locations: location(),
    };

    let mut results: Vec<SarifResult> = report
        .violations
        .iter()
        .map(|v| {
            result(
                &v.id,
                sarif_level(v.impact),
                format!("{} ({} element(s))", v.help, v.node_count()),
            )
        })
        .collect();

    if let Some(audit) = &report.structural_audit {
        if audit.keyboard_navigation.trap_detected {
            let text = audit.keyboard_navigation.errors.join("; ");
            results.push(result("structural/keyboard-trap", "error", text));
        }
        for p in &audit.image_alt_text.problem_images {
            results.push(result("structural/image-alt", "error", format!("{}: {}", p.issue, p.html)));
        }
        for p in &audit.form_labels.problem_fields {
            results.push(result("structural/form-label", "error", format!("{}: {}", p.issue, p.html)));
        }
        for issue in &audit.heading_structure.issues {
            results.push(result("structural/heading-order", "warning", issue.clone()));
        }
    }

    let sarif = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "a11ybot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://github.com/dequelabs/axe-core".to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&sarif).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::ProblemElement;
    use serde_json::json;

    fn sample_scan() -> ScanResult {
        ScanResult::from_value(json!({
            "url": "https://example.com/",
            "violations": [
                { "id": "image-alt", "help": "Images must have alternate text",
                  "impact": "critical", "tags": ["wcag2a", "wcag111"],
                  "helpUrl": "https://dequeuniversity.com/rules/axe/4.9/image-alt",
                  "nodes": [{ "html": "<img>" }, { "html": "<img src=a>" }] },
                { "id": "color-contrast", "help": "Elements must meet minimum color contrast",
                  "impact": "serious", "nodes": [{ "html": "<p>" }] }
            ],
            "passes": [{ "id": "document-title", "help": "Documents must have <title> element" }]
        }))
        .unwrap()
    }

    fn sample_audit() -> StructuralAudit {
        let mut audit = StructuralAudit::default();
        audit.image_alt_text.total_images = 1;
        audit.image_alt_text.missing_alt = 1;
        audit
            .image_alt_text
            .problem_images
            .push(ProblemElement::new("Missing alt attribute", "<img src=\"a.png\">"));
        audit.heading_structure.proper_sequence = false;
        audit.heading_structure.issues.push("First heading is not h1, found h2".into());
        audit
    }

    #[test]
    fn test_aggregate_absent_inputs() {
        let report = aggregate(None, None, "https://example.com/");
        assert_eq!(report.source_url, "https://example.com/");
        assert!(report.violations.is_empty());
        assert!(report.passes.is_empty());
        assert!(report.structural_audit.is_none());
        assert!(!report.has_problems());
    }

    #[test]
    fn test_aggregate_counts() {
        let scan = sample_scan();
        let report = aggregate(Some(&scan), Some(sample_audit()), "");

        assert_eq!(report.source_url, "https://example.com/");
        assert_eq!(report.violation_count(), 2);
        assert_eq!(report.pass_count(), 1);
        assert_eq!(report.affected_node_count(), 3);
        assert_eq!(report.count_by_impact(Impact::Critical), 1);
        assert_eq!(
            report.impact_breakdown(),
            vec![(Impact::Critical, 1), (Impact::Serious, 1)]
        );
        assert_eq!(report.structural_issue_count(), 2);
    }

    #[test]
    fn test_text_report() {
        let scan = sample_scan();
        let text = generate_report(&aggregate(Some(&scan), Some(sample_audit()), ""), OutputFormat::Text);

        assert!(text.contains("--- CRITICAL (1) ---"));
        assert!(text.contains("[image-alt] Images must have alternate text"));
        assert!(text.contains("WCAG 1.1.1: Non-text Content"));
        assert!(text.contains("First heading is not h1, found h2"));
        assert!(text.contains("RESULT: FAIL (2 violation(s), 2 structural issue(s))"));
    }

    #[test]
    fn test_text_report_clean() {
        let text = generate_report(&aggregate(None, None, ""), OutputFormat::Text);
        assert!(text.contains("URL: Unknown"));
        assert!(text.contains("No rule engine violations found"));
        assert!(text.contains("RESULT: PASS"));
    }

    #[test]
    fn test_json_report() {
        let scan = sample_scan();
        let report = aggregate(Some(&scan), Some(sample_audit()), "");
        let json = generate_report(&report, OutputFormat::Json);

        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(parsed["sourceUrl"], "https://example.com/");
        assert_eq!(parsed["violations"][0]["nodes"][1]["html"], "<img src=a>");
        assert_eq!(parsed["structuralAudit"]["imageAltText"]["missingAlt"], 1);

        let back: AggregatedReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_sarif_report() {
        let scan = sample_scan();
        let report = aggregate(Some(&scan), Some(sample_audit()), "");
        let sarif = generate_report(&report, OutputFormat::Sarif);

        let parsed: serde_json::Value = serde_json::from_str(&sarif).expect("valid JSON");
        assert_eq!(parsed["version"], "2.1.0");
        let results = parsed["runs"][0]["results"].as_array().unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0]["ruleId"], "image-alt");
        assert_eq!(results[0]["level"], "error");
        assert_eq!(results[2]["ruleId"], "structural/image-alt");
        assert_eq!(results[3]["level"], "warning");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("sarif".parse::<OutputFormat>().unwrap(), OutputFormat::Sarif);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}
