// SPDX-License-Identifier: PMPL-1.0-or-later
//! Standalone HTML rendering of an aggregated report.

use crate::analyzers::{
    AltTextCheck, Check, FormLabelCheck, HeadingCheck, KeyboardCheck, ProblemElement,
    StructuralAudit,
};
use crate::model::{PassedCheck, Violation};
use crate::report::AggregatedReport;
use std::fmt::Write;

/// Affected elements listed per violation before collapsing the rest
const NODES_SHOWN: usize = 3;
/// Passed rules listed for context
const PASSES_SHOWN: usize = 5;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 20px; color: #333; }
        h1 { color: #333; }
        .summary { background-color: #f5f5f5; padding: 10px; border-radius: 5px; }
        .violation { background-color: #fff0f0; padding: 10px; margin: 10px 0; border-left: 4px solid #ff0000; }
        .pass { background-color: #f0fff0; padding: 5px; margin: 5px 0; border-left: 4px solid #00ff00; }
        .check { background-color: #f7f7ff; padding: 10px; margin: 10px 0; border-left: 4px solid #3355cc; }
        .check.failed { border-left-color: #ff8800; }
        code { white-space: pre-wrap; }
"#;

/// Escape text for inclusion in HTML element content or attribute values
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the full report page
pub fn render_report(report: &AggregatedReport) -> String {
    let url = if report.source_url.is_empty() { "Unknown" } else { &report.source_url };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"utf-8\">\n");
    html.push_str("    <title>Accessibility Test Report</title>\n");
    let _ = writeln!(html, "    <style>{}    </style>", STYLE);
    html.push_str("</head>\n<body>\n    <h1>Accessibility Test Report</h1>\n");

    html.push_str("    <div class=\"summary\">\n        <h2>Summary</h2>\n");
    let _ = writeln!(html, "        <p>Test URL: {}</p>", html_escape(url));
    let _ = writeln!(
        html,
        "        <p>Test run: {}</p>",
        report.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(html, "        <p>Violations: {}</p>", report.violation_count());
    let _ = writeln!(html, "        <p>Affected elements: {}</p>", report.affected_node_count());
    for (impact, count) in report.impact_breakdown() {
        let _ = writeln!(html, "        <p>{}: {}</p>", capitalize(impact.as_str()), count);
    }
    let _ = writeln!(html, "        <p>Passed tests: {}</p>", report.pass_count());
    if report.structural_audit.is_some() {
        let _ = writeln!(
            html,
            "        <p>Structural issues: {}</p>",
            report.structural_issue_count()
        );
    }
    html.push_str("    </div>\n");

    if report.violations.is_empty() {
        html.push_str("    <h2>No violations found!</h2>\n");
    } else {
        html.push_str("    <h2>Violations</h2>\n");
        for v in &report.violations {
            html.push_str(&render_violation(v));
        }
    }

    if !report.passes.is_empty() {
        html.push_str("    <h2>Passed tests (sample)</h2>\n");
        for pass in report.passes.iter().take(PASSES_SHOWN) {
            html.push_str(&render_pass(pass));
        }
    }

    if let Some(audit) = &report.structural_audit {
        html.push_str(&render_structural(audit));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render_violation(v: &Violation) -> String {
    let mut html = String::from("    <div class=\"violation\">\n");
    let _ = writeln!(
        html,
        "        <h3>{} - {} impact</h3>",
        html_escape(or_default(&v.id, "Unknown")),
        v.impact.as_str().to_uppercase()
    );
    let _ = writeln!(html, "        <p>{}</p>", html_escape(or_default(&v.help, "No description")));

    let criteria = v.wcag_criteria();
    if !criteria.is_empty() {
        let _ = writeln!(html, "        <p>WCAG: {}</p>", html_escape(&criteria.join(", ")));
    }

    let _ = writeln!(
        html,
        "        <p><a href=\"{}\" target=\"_blank\">More info</a></p>",
        html_escape(or_default(&v.help_url, "#"))
    );
    let _ = writeln!(html, "        <p>Elements affected: {}</p>", v.node_count());

    if !v.nodes.is_empty() {
        html.push_str("        <ul>\n");
        for node in v.nodes.iter().take(NODES_SHOWN) {
            let _ = writeln!(
                html,
                "            <li><code>{}</code></li>",
                html_escape(or_default(&node.html_snippet, "No HTML"))
            );
        }
        if v.node_count() > NODES_SHOWN {
            let _ = writeln!(
                html,
                "            <li>... and {} more elements</li>",
                v.node_count() - NODES_SHOWN
            );
        }
        html.push_str("        </ul>\n");
    }

    html.push_str("    </div>\n");
    html
}

fn render_pass(pass: &PassedCheck) -> String {
    format!(
        "    <div class=\"pass\">\n        <h3>{}</h3>\n        <p>{}</p>\n    </div>\n",
        html_escape(or_default(&pass.id, "Unknown")),
        html_escape(or_default(&pass.help, "No description"))
    )
}

fn check_header<C: Check>(check: &C, failed: bool) -> String {
    format!(
        "    <div class=\"check{}\">\n        <h3>{} (WCAG {})</h3>\n        <p>{}</p>\n",
        if failed { " failed" } else { "" },
        html_escape(check.name()),
        html_escape(check.wcag_criterion()),
        html_escape(check.description())
    )
}

fn problem_list(problems: &[ProblemElement]) -> String {
    if problems.is_empty() {
        return String::new();
    }
    let mut html = String::from("        <ul>\n");
    for p in problems {
        let _ = writeln!(
            html,
            "            <li>{}: <code>{}</code></li>",
            html_escape(&p.issue),
            html_escape(&p.html)
        );
    }
    html.push_str("        </ul>\n");
    html
}

fn render_structural(audit: &StructuralAudit) -> String {
    let kb = &audit.keyboard_navigation;
    let alt = &audit.image_alt_text;
    let forms = &audit.form_labels;
    let headings = &audit.heading_structure;

    let mut html = String::from("    <h2>Structural checks</h2>\n");

    html.push_str(&check_header(&KeyboardCheck, kb.trap_detected || !kb.errors.is_empty()));
    let _ = writeln!(
        html,
        "        <p>Focusable elements reached: {}</p>\n        <p>Focus trap: {}</p>",
        kb.reachable_element_count,
        if kb.trap_detected { "yes" } else { "no" }
    );
    for e in &kb.errors {
        let _ = writeln!(html, "        <p>{}</p>", html_escape(e));
    }
    html.push_str("    </div>\n");

    html.push_str(&check_header(&AltTextCheck, !alt.problem_images.is_empty()));
    let _ = writeln!(
        html,
        "        <p>Images: {} (missing alt {}, empty alt {}, valid {})</p>",
        alt.total_images, alt.missing_alt, alt.empty_alt, alt.valid_alt
    );
    html.push_str(&problem_list(&alt.problem_images));
    if let Some(e) = &alt.error {
        let _ = writeln!(html, "        <p>{}</p>", html_escape(e));
    }
    html.push_str("    </div>\n");

    html.push_str(&check_header(&FormLabelCheck, !forms.problem_fields.is_empty()));
    let _ = writeln!(
        html,
        "        <p>Form fields: {} (labelled {}, unlabelled {})</p>",
        forms.total_fields, forms.fields_with_labels, forms.fields_without_labels
    );
    html.push_str(&problem_list(&forms.problem_fields));
    if let Some(e) = &forms.error {
        let _ = writeln!(html, "        <p>{}</p>", html_escape(e));
    }
    html.push_str("    </div>\n");

    html.push_str(&check_header(&HeadingCheck, !headings.proper_sequence));
    let levels = headings
        .levels_used
        .iter()
        .map(|l| format!("h{}", l))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        html,
        "        <p>Headings: {} (levels used: {})</p>",
        headings.total_headings,
        if levels.is_empty() { "none".to_string() } else { levels }
    );
    if !headings.issues.is_empty() {
        html.push_str("        <ul>\n");
        for issue in &headings.issues {
            let _ = writeln!(html, "            <li>{}</li>", html_escape(issue));
        }
        html.push_str("        </ul>\n");
    }
    if let Some(e) = &headings.error {
        let _ = writeln!(html, "        <p>{}</p>", html_escape(e));
    }
    html.push_str("    </div>\n");

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AffectedNode, Impact, ScanResult};
    use crate::report::aggregate;

    fn violation_with_nodes(n: usize) -> Violation {
        Violation {
            id: "image-alt".into(),
            help: "Images must have alternate text".into(),
            impact: Impact::Critical,
            help_url: "https://example.com/rules?a=1&b=2".into(),
            nodes: (0..n)
                .map(|i| AffectedNode {
                    html_snippet: format!("<img src=\"{}.png\">", i),
                    failure_summary: None,
                })
                .collect(),
            ..Violation::default()
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(html_escape("<a href=\"x\">&'</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_violation_nodes_truncated() {
        let html = render_violation(&violation_with_nodes(5));
        assert!(html.contains("image-alt - CRITICAL impact"));
        assert!(html.contains("&lt;img src=&quot;2.png&quot;&gt;"));
        assert!(!html.contains("3.png"));
        assert!(html.contains("... and 2 more elements"));
        assert!(html.contains("href=\"https://example.com/rules?a=1&amp;b=2\""));
    }

    #[test]
    fn test_empty_report_page() {
        let html = render_report(&aggregate(None, None, ""));
        assert!(html.contains("Test URL: Unknown"));
        assert!(html.contains("No violations found!"));
        assert!(!html.contains("Structural checks"));
    }

    #[test]
    fn test_pass_sample_limited() {
        let scan = ScanResult {
            passes: (0..8)
                .map(|i| PassedCheck { id: format!("rule-{}", i), ..PassedCheck::default() })
                .collect(),
            ..ScanResult::default()
        };
        let html = render_report(&aggregate(Some(&scan), None, "https://example.com"));
        assert!(html.contains("rule-4"));
        assert!(!html.contains("rule-5"));
        assert!(html.contains("Passed tests: 8"));
    }

    #[test]
    fn test_structural_section() {
        let mut audit = StructuralAudit::default();
        audit.heading_structure.proper_sequence = false;
        audit.heading_structure.levels_used = [2, 3].into_iter().collect();
        audit.heading_structure.issues.push("First heading is not h1, found h2".into());

        let html = render_report(&aggregate(None, Some(audit), "https://example.com"));
        assert!(html.contains("Heading Structure (WCAG 1.3.1)"));
        assert!(html.contains("levels used: h2, h3"));
        assert!(html.contains("<li>First heading is not h1, found h2</li>"));
        assert!(html.contains("Structural issues: 1"));
    }
}
