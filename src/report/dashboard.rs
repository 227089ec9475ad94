// SPDX-License-Identifier: PMPL-1.0-or-later
//! Dashboard page linking every report and screenshot in an output directory.

use crate::error::Result;
use crate::report::html::html_escape;
use chrono::Local;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

pub const DASHBOARD_FILE: &str = "dashboard.html";
pub const SCREENSHOT_DIR: &str = "screenshots";

/// Screenshots shown in the gallery
const GALLERY_LIMIT: usize = 12;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; line-height: 1.6; margin: 0; padding: 20px; color: #333; }
        .container { max-width: 1200px; margin: 0 auto; }
        header { background-color: #f4f4f4; padding: 20px; margin-bottom: 20px; border-radius: 5px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }
        h1, h2, h3 { color: #444; }
        .card { background: white; padding: 15px; margin-bottom: 20px; border-radius: 5px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }
        .summary { display: flex; justify-content: space-between; flex-wrap: wrap; }
        .summary-card { flex: 1; min-width: 200px; margin: 10px; padding: 15px; border-radius: 5px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); text-align: center; }
        .summary-value { font-size: 2em; font-weight: bold; margin: 10px 0; }
        table { width: 100%; border-collapse: collapse; }
        table, th, td { border: 1px solid #ddd; }
        th, td { padding: 12px; text-align: left; }
        th { background-color: #f4f4f4; }
        tr:nth-child(even) { background-color: #f9f9f9; }
        a { color: #0066cc; text-decoration: none; }
        a:hover { text-decoration: underline; }
        .screenshot-gallery { display: flex; flex-wrap: wrap; gap: 10px; }
        .screenshot-card { flex: 1; min-width: 250px; max-width: 300px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); border-radius: 5px; overflow: hidden; }
        .screenshot-card img { width: 100%; height: 150px; object-fit: cover; }
        .screenshot-card .caption { padding: 10px; background: white; }
"#;

/// One linked artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardEntry {
    pub file_name: String,
    pub display_name: String,
}

/// Artifacts found in a report directory, each list sorted by file name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardIndex {
    pub page_reports: Vec<DashboardEntry>,
    pub rule_reports: Vec<DashboardEntry>,
    pub screenshots: Vec<DashboardEntry>,
}

/// `accessibility_www.example.com.html` -> `example.com`
pub fn page_display_name(file_name: &str) -> String {
    let stem = file_name
        .strip_prefix("accessibility_")
        .unwrap_or(file_name)
        .trim_end_matches(".html");
    tidy_page_name(stem)
}

/// `rule_color-contrast.html` -> `Color Contrast`
pub fn rule_display_name(file_name: &str) -> String {
    let stem = file_name
        .strip_prefix("rule_")
        .unwrap_or(file_name)
        .trim_end_matches(".html");
    stem.split('-')
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `screenshot_www.example.com_about.png` -> `example.com about`
pub fn screenshot_display_name(file_name: &str) -> String {
    let stem = file_name
        .strip_prefix("screenshot_")
        .unwrap_or(file_name)
        .trim_end_matches(".png");
    tidy_page_name(stem)
}

fn tidy_page_name(stem: &str) -> String {
    stem.strip_prefix("www.").unwrap_or(stem).replace('_', " ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// File names directly inside `dir` accepted by `keep`, sorted
fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Vec<String> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut names: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| keep(name))
        .collect();
    names.sort();
    names
}

/// Scan a report directory for page reports, rule reports and screenshots
pub fn collect(report_dir: &Path) -> DashboardIndex {
    let entries = |names: Vec<String>, display: fn(&str) -> String| -> Vec<DashboardEntry> {
        names
            .into_iter()
            .map(|file_name| DashboardEntry {
                display_name: display(&file_name),
                file_name,
            })
            .collect()
    };

    DashboardIndex {
        page_reports: entries(
            list_files(report_dir, |n| n.starts_with("accessibility_") && n.ends_with(".html")),
            page_display_name,
        ),
        rule_reports: entries(
            list_files(report_dir, |n| n.starts_with("rule_") && n.ends_with(".html")),
            rule_display_name,
        ),
        screenshots: entries(
            list_files(&report_dir.join(SCREENSHOT_DIR), |n| n.ends_with(".png")),
            screenshot_display_name,
        ),
    }
}

/// Render the dashboard page
pub fn render(index: &DashboardIndex, generated: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"utf-8\">\n");
    html.push_str("    <title>Accessibility Testing Dashboard</title>\n");
    let _ = writeln!(html, "    <style>{}    </style>", STYLE);
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");

    html.push_str("    <header>\n        <h1>Accessibility Testing Dashboard</h1>\n");
    let _ = writeln!(html, "        <p>Generated on {}</p>\n    </header>", html_escape(generated));

    html.push_str("    <div class=\"summary\">\n");
    for (label, colour, count) in [
        ("Total Pages Tested", "#e3f2fd", index.page_reports.len()),
        ("WCAG Rules Tested", "#e8f5e9", index.rule_reports.len()),
        ("Screenshots", "#fff3e0", index.screenshots.len()),
    ] {
        let _ = writeln!(
            html,
            "        <div class=\"summary-card\" style=\"background-color: {};\">\n            <h3>{}</h3>\n            <div class=\"summary-value\">{}</div>\n        </div>",
            colour, label, count
        );
    }
    html.push_str("    </div>\n");

    html.push_str(&link_table("Test Reports by Page", "Page", &index.page_reports));
    html.push_str(&link_table("WCAG Rule Reports", "Rule", &index.rule_reports));

    html.push_str("    <div class=\"card\">\n        <h2>Screenshots</h2>\n");
    html.push_str("        <p>Visual evidence of testing and identified issues.</p>\n");
    html.push_str("        <div class=\"screenshot-gallery\">\n");
    for shot in index.screenshots.iter().take(GALLERY_LIMIT) {
        let name = html_escape(&shot.display_name);
        let _ = writeln!(
            html,
            "            <div class=\"screenshot-card\">\n                <img src=\"{}/{}\" alt=\"{}\">\n                <div class=\"caption\">{}</div>\n            </div>",
            SCREENSHOT_DIR,
            html_escape(&shot.file_name),
            name,
            name
        );
    }
    html.push_str("        </div>\n    </div>\n");

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn link_table(title: &str, column: &str, entries: &[DashboardEntry]) -> String {
    let mut html = String::from("    <div class=\"card\">\n");
    let _ = writeln!(html, "        <h2>{}</h2>", title);
    let _ = writeln!(
        html,
        "        <table>\n            <tr><th>{}</th><th>Report</th></tr>",
        column
    );
    for entry in entries {
        let _ = writeln!(
            html,
            "            <tr><td>{}</td><td><a href=\"{}\" target=\"_blank\">View Report</a></td></tr>",
            html_escape(&entry.display_name),
            html_escape(&entry.file_name)
        );
    }
    html.push_str("        </table>\n    </div>\n");
    html
}

/// Write `dashboard.html` into the report directory
pub fn create_dashboard(report_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(report_dir)?;

    let index = collect(report_dir);
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let path = report_dir.join(DASHBOARD_FILE);
    std::fs::write(&path, render(&index, &generated))?;

    info!(
        pages = index.page_reports.len(),
        rules = index.rule_reports.len(),
        screenshots = index.screenshots.len(),
        "Dashboard generated at {}",
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(page_display_name("accessibility_www.example.com.html"), "example.com");
        assert_eq!(
            page_display_name("accessibility_localhost:8080_forms_laptop.html"),
            "localhost:8080 forms laptop"
        );
        assert_eq!(rule_display_name("rule_color-contrast.html"), "Color Contrast");
        assert_eq!(rule_display_name("rule_image-alt.html"), "Image Alt");
        assert_eq!(screenshot_display_name("screenshot_www.w3.org_WAI.png"), "w3.org WAI");
    }

    #[test]
    fn test_collect_and_render() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("accessibility_example.com.html"), "x").unwrap();
        std::fs::write(root.join("rule_label.html"), "x").unwrap();
        std::fs::write(root.join("notes.txt"), "x").unwrap();
        std::fs::create_dir(root.join(SCREENSHOT_DIR)).unwrap();
        for i in 0..14 {
            std::fs::write(root.join(SCREENSHOT_DIR).join(format!("screenshot_{:02}.png", i)), "x")
                .unwrap();
        }

        let index = collect(root);
        assert_eq!(index.page_reports.len(), 1);
        assert_eq!(index.rule_reports[0].display_name, "Label");
        assert_eq!(index.screenshots.len(), 14);

        let html = render(&index, "2024-01-01 00:00:00");
        assert!(html.contains("<div class=\"summary-value\">14</div>"));
        assert!(html.contains("href=\"accessibility_example.com.html\""));
        assert!(html.contains("screenshots/screenshot_11.png"));
        assert!(!html.contains("screenshots/screenshot_12.png"));
    }

    #[test]
    fn test_create_dashboard_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let path = create_dashboard(&out).unwrap();
        assert!(path.ends_with(DASHBOARD_FILE));
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("Total Pages Tested"));
    }
}
