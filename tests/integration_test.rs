// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for a11ybot

use a11ybot::analyzers::run_structural_audit;
use a11ybot::error::Result;
use a11ybot::model::Impact;
use a11ybot::page::static_page::StaticPage;
use a11ybot::report::{aggregate, dashboard, generate_report, OutputFormat};
use a11ybot::scanner::{self, RuleEngine, Scanner};
use std::path::Path;

fn fixture(name: &str) -> StaticPage {
    StaticPage::from_file(&Path::new("tests/fixtures").join(name)).expect("fixture should parse")
}

/// Replays a recorded axe-core payload
struct RecordedEngine(&'static str);

impl RuleEngine for RecordedEngine {
    fn inject(&self) -> Result<()> {
        Ok(())
    }

    fn run(
        &self,
        _context: Option<&str>,
        _options: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let raw = std::fs::read_to_string(Path::new("tests/fixtures").join(self.0))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[test]
fn test_missing_alt_fixture() {
    let audit = run_structural_audit(&fixture("missing_alt.html"));
    let alt = &audit.image_alt_text;

    assert_eq!(alt.total_images, 5);
    assert_eq!(alt.missing_alt, 2);
    assert_eq!(alt.empty_alt, 2);
    assert_eq!(alt.valid_alt, 1);
    assert_eq!(alt.problem_images.len(), alt.missing_alt);
    assert_eq!(alt.problem_images[1].issue, "Generic alt text: image");

    assert!(audit.heading_structure.proper_sequence);
    assert!(!audit.keyboard_navigation.can_tab_through);
    assert_eq!(audit.issue_count(), 2);
}

#[test]
fn test_form_labels_fixture() {
    let audit = run_structural_audit(&fixture("form_labels.html"));
    let forms = &audit.form_labels;

    assert_eq!(forms.total_fields, 6);
    assert_eq!(forms.fields_without_labels, 3);
    assert_eq!(forms.fields_with_labels, 3);
    assert!(forms
        .problem_fields
        .iter()
        .all(|p| p.issue == "No ID attribute for label association"));

    // six controls and two submit buttons
    assert_eq!(audit.keyboard_navigation.reachable_element_count, 8);
    assert!(!audit.keyboard_navigation.trap_detected);
    assert!(audit.heading_structure.proper_sequence);
}

#[test]
fn test_heading_order_fixture() {
    let audit = run_structural_audit(&fixture("heading_order.html"));
    let headings = &audit.heading_structure;

    assert_eq!(headings.total_headings, 4);
    assert!(!headings.has_level_one);
    assert!(!headings.proper_sequence);
    assert_eq!(
        headings.issues,
        vec![
            "First heading is not h1, found h2".to_string(),
            "Heading level jumped from h3 to h5".to_string(),
        ]
    );
    assert_eq!(headings.levels_used.iter().copied().collect::<Vec<_>>(), vec![2, 3, 5]);
}

#[test]
fn test_clean_fixtures_have_no_structural_issues() {
    for name in ["accessible.html", "contrast_issues.html"] {
        let audit = run_structural_audit(&fixture(name));
        assert_eq!(audit.issue_count(), 0, "{} should be clean: {:?}", name, audit);
        assert!(audit.errors().is_empty());
    }

    let audit = run_structural_audit(&fixture("accessible.html"));
    assert_eq!(audit.keyboard_navigation.reachable_element_count, 3);
}

#[test]
fn test_recorded_scan_and_aggregate() {
    let engine = RecordedEngine("axe_missing_alt.json");
    let scan = Scanner::new(&engine).run_custom_scan(None, None);

    assert_eq!(scanner::violation_count(scan.as_ref()), 3);
    let summary = scanner::violation_summary(scan.as_ref());
    assert_eq!(summary[0].impact, Impact::Critical);
    assert_eq!(summary[2].node_count, 4);

    let audit = run_structural_audit(&fixture("missing_alt.html"));
    let report = aggregate(scan.as_ref(), Some(audit), "");

    assert_eq!(report.source_url, "file:///tests/fixtures/missing_alt.html");
    assert_eq!(report.pass_count(), 3);
    assert_eq!(report.affected_node_count(), 6);
    assert_eq!(report.count_by_impact(Impact::Moderate), 2);
    assert_eq!(report.violations[0].wcag_criteria(), vec!["1.1.1".to_string()]);
    assert!(report.has_problems());

    let html = generate_report(&report, OutputFormat::Html);
    assert!(html.contains("image-alt - CRITICAL impact"));
    assert!(html.contains("... and 1 more elements"));
    assert!(html.contains("Generic alt text: image"));
    assert!(!html.contains("<img src"));
}

#[test]
fn test_missing_engine_payload_degrades_to_empty_report() {
    let engine = RecordedEngine("does_not_exist.json");
    let scan = Scanner::new(&engine).run_full_scan();
    assert!(scan.is_none());

    let report = aggregate(scan.as_ref(), None, "https://example.com");
    assert!(report.violations.is_empty());
    assert!(generate_report(&report, OutputFormat::Text).contains("RESULT: PASS"));
}

#[test]
fn test_reports_feed_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RecordedEngine("axe_missing_alt.json");
    let scan = Scanner::new(&engine).run_custom_scan(None, None);
    let report = aggregate(scan.as_ref(), None, "https://www.example.com/about");

    std::fs::write(
        dir.path().join("accessibility_www.example.com_about.html"),
        generate_report(&report, OutputFormat::Html),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("rule_image-alt.html"),
        generate_report(&report, OutputFormat::Html),
    )
    .unwrap();

    let path = dashboard::create_dashboard(dir.path()).unwrap();
    let html = std::fs::read_to_string(path).unwrap();

    assert!(html.contains("<td>example.com about</td>"));
    assert!(html.contains("<td>Image Alt</td>"));
    assert!(html.contains("<div class=\"summary-value\">0</div>"));
}
