// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page visit orchestration.
//!
//! A visit opens one URL, runs the rule engine and the structural checks,
//! aggregates both and writes the rendered reports (and optionally a
//! screenshot) into the output directory. Visits run one after another; a
//! failed target is recorded and the run moves on.

use crate::analyzers::run_structural_audit;
use crate::config::{Config, Viewport};
use crate::error::Result;
use crate::page::browser::BrowserSession;
use crate::page::PageQuery;
use crate::report::dashboard::{self, SCREENSHOT_DIR};
use crate::report::{aggregate, generate_report, AggregatedReport, OutputFormat};
use crate::scanner::{self, RuleEngine, ScanOptions, Scanner};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Rules checked one at a time by a rule sweep when none are given
pub const ESSENTIAL_RULES: &[&str] = &[
    "image-alt",      // 1.1.1
    "label",          // 3.3.2
    "color-contrast", // 1.4.3
    "heading-order",  // 1.3.1
    "link-name",      // 2.4.4
];

/// A page the runner can navigate, query, scan and photograph
pub trait Session: PageQuery + RuleEngine {
    fn open(&self, url: &str) -> Result<()>;
    fn set_viewport(&self, viewport: Viewport) -> Result<()>;
    fn screenshot(&self, path: &Path) -> Result<PathBuf>;
}

impl Session for BrowserSession {
    fn open(&self, url: &str) -> Result<()> {
        BrowserSession::open(self, url)
    }

    fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        BrowserSession::set_viewport(self, viewport)
    }

    fn screenshot(&self, path: &Path) -> Result<PathBuf> {
        BrowserSession::screenshot(self, path)
    }
}

/// File-name fragment for a URL: scheme dropped, `/` replaced by `_`
pub fn page_slug(url: &str) -> String {
    let rest = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url)
        .trim_matches('/');

    let slug: String = rest
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '#' | '&' | '=' | ' ' => '_',
            c => c,
        })
        .collect();

    if slug.is_empty() {
        "page".to_string()
    } else {
        slug
    }
}

/// Slug with the device class appended for viewport sweeps
pub fn visit_slug(url: &str, viewport: Option<Viewport>) -> String {
    match viewport {
        Some(v) => format!("{}_{}", page_slug(url), v.device_name()),
        None => page_slug(url),
    }
}

/// axe rule ids are lower-case words joined by hyphens
fn is_rule_id(rule: &str) -> bool {
    !rule.is_empty()
        && rule
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// One completed page visit
#[derive(Debug, Clone)]
pub struct VisitOutcome {
    pub url: String,
    pub viewport: Option<Viewport>,
    pub report: AggregatedReport,
    pub files: Vec<PathBuf>,
}

/// Everything a run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    pub visits: Vec<VisitOutcome>,
    /// `(url, error)` for targets that could not be visited
    pub failures: Vec<(String, String)>,
    pub dashboard: Option<PathBuf>,
}

impl RunSummary {
    pub fn total_violations(&self) -> usize {
        self.visits.iter().map(|v| v.report.violation_count()).sum()
    }

    pub fn total_structural_issues(&self) -> usize {
        self.visits.iter().map(|v| v.report.structural_issue_count()).sum()
    }

    pub fn has_problems(&self) -> bool {
        self.visits.iter().any(|v| v.report.has_problems())
    }
}

/// Runs visits against one session using one configuration
pub struct Runner<'a, S: Session> {
    session: &'a S,
    config: &'a Config,
}

impl<'a, S: Session> Runner<'a, S> {
    pub fn new(session: &'a S, config: &'a Config) -> Self {
        Self { session, config }
    }

    fn output_dir(&self) -> &Path {
        &self.config.report.output_dir
    }

    /// Visit every target (at every configured viewport) and build the dashboard
    pub fn run(&self, targets: &[String]) -> RunSummary {
        let mut summary = RunSummary::default();

        for url in targets {
            self.visit(url, &mut summary);
        }

        summary.dashboard = self.finish();
        summary
    }

    /// Visit one URL at the default size and then each extra viewport.
    ///
    /// Stops at the first failed visit for this URL; visits already written
    /// stay in the summary.
    pub fn visit(&self, url: &str, summary: &mut RunSummary) {
        let sizes = std::iter::once(None).chain(self.config.scan.viewports.iter().copied().map(Some));
        for viewport in sizes {
            match self.visit_once(url, viewport) {
                Ok(outcome) => summary.visits.push(outcome),
                Err(e) => {
                    warn!("Error testing {}: {}", url, e);
                    let target = match viewport {
                        Some(v) => format!("{} @ {}", url, v),
                        None => url.to_string(),
                    };
                    summary.failures.push((target, e.to_string()));
                    return;
                }
            }
        }
    }

    fn visit_once(&self, url: &str, viewport: Option<Viewport>) -> Result<VisitOutcome> {
        self.session.open(url)?;
        match viewport {
            Some(v) => {
                info!("Testing {} at {} ({})", url, v, v.device_name());
                self.session.set_viewport(v)?;
            }
            // reset any size left over from a previous sweep
            None => self.session.set_viewport(self.config.browser.window)?,
        }

        let scan_settings = &self.config.scan;
        let options = ScanOptions::from_level_and_rules(scan_settings.level, &scan_settings.rules);
        let scan = Scanner::new(self.session).run_custom_scan(Some(&scan_settings.context), Some(&options));
        debug!("{}", scanner::format_violation_summary(scan.as_ref()));

        let audit = scan_settings
            .structural_checks
            .then(|| run_structural_audit(self.session));

        let report = aggregate(scan.as_ref(), audit, url);
        info!(
            violations = report.violation_count(),
            structural_issues = report.structural_issue_count(),
            "Found {} accessibility violations on {}",
            report.violation_count(),
            url
        );

        let slug = visit_slug(url, viewport);
        let mut files = Vec::new();
        for format in &self.config.report.formats {
            let name = format!("accessibility_{}.{}", slug, format.extension());
            files.push(self.write(&name, &generate_report(&report, *format))?);
        }

        if self.config.report.screenshots {
            let path = self
                .output_dir()
                .join(SCREENSHOT_DIR)
                .join(format!("screenshot_{}.png", slug));
            match self.session.screenshot(&path) {
                Ok(path) => files.push(path),
                Err(e) => warn!("Error taking screenshot: {}", e),
            }
        }

        Ok(VisitOutcome {
            url: url.to_string(),
            viewport,
            report,
            files,
        })
    }

    /// Scan one page once per rule, writing `rule_<id>.html` for each
    pub fn rule_sweep(&self, url: &str, rules: &[String]) -> Result<Vec<VisitOutcome>> {
        self.session.open(url)?;
        let scanner = Scanner::new(self.session);

        let mut outcomes = Vec::new();
        for rule in rules {
            if !is_rule_id(rule) {
                warn!("Skipping invalid rule id '{}'", rule);
                continue;
            }
            let scan = scanner.run_rule_scan(rule);
            let report = aggregate(scan.as_ref(), None, url);
            info!("Tested rule {} with {} violations", rule, report.violation_count());

            let file = self.write(
                &format!("rule_{}.html", rule),
                &generate_report(&report, OutputFormat::Html),
            )?;
            outcomes.push(VisitOutcome {
                url: url.to_string(),
                viewport: None,
                report,
                files: vec![file],
            });
        }
        Ok(outcomes)
    }

    /// Regenerate the dashboard when enabled; failures only warn
    pub fn finish(&self) -> Option<PathBuf> {
        if !self.config.report.dashboard {
            return None;
        }
        match dashboard::create_dashboard(self.output_dir()) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Could not generate dashboard: {}", e);
                None
            }
        }
    }

    fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(self.output_dir())?;
        let path = self.output_dir().join(name);
        std::fs::write(&path, content)?;
        info!("Report generated at {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::page::static_page::StaticPage;
    use crate::page::{ElementHandle, Key, PageError};
    use serde_json::json;
    use std::cell::RefCell;

    /// Static page plus a canned rule engine; records navigation
    struct FakeSession {
        page: StaticPage,
        payload: serde_json::Value,
        opened: RefCell<Vec<String>>,
        viewports: RefCell<Vec<Viewport>>,
        runs: RefCell<Vec<Option<serde_json::Value>>>,
    }

    impl FakeSession {
        fn new(html: &str) -> Self {
            Self {
                page: StaticPage::parse(html),
                payload: json!({
                    "violations": [{ "id": "image-alt", "impact": "critical", "nodes": [{ "html": "<img>" }] }],
                    "passes": []
                }),
                opened: RefCell::new(Vec::new()),
                viewports: RefCell::new(Vec::new()),
                runs: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageQuery for FakeSession {
        fn find_all(&self, s: &str) -> std::result::Result<Vec<ElementHandle>, PageError> {
            self.page.find_all(s)
        }
        fn attribute(&self, e: ElementHandle, n: &str) -> std::result::Result<Option<String>, PageError> {
            self.page.attribute(e, n)
        }
        fn tag_name(&self, e: ElementHandle) -> std::result::Result<String, PageError> {
            self.page.tag_name(e)
        }
        fn outer_html(&self, e: ElementHandle) -> std::result::Result<String, PageError> {
            self.page.outer_html(e)
        }
        fn active_element(&self) -> std::result::Result<ElementHandle, PageError> {
            self.page.active_element()
        }
        fn send_key(&self, e: ElementHandle, k: Key) -> std::result::Result<(), PageError> {
            self.page.send_key(e, k)
        }
    }

    impl RuleEngine for FakeSession {
        fn inject(&self) -> Result<()> {
            Ok(())
        }
        fn run(&self, _: Option<&str>, options: Option<&serde_json::Value>) -> Result<serde_json::Value> {
            self.runs.borrow_mut().push(options.cloned());
            Ok(self.payload.clone())
        }
    }

    impl Session for FakeSession {
        fn open(&self, url: &str) -> Result<()> {
            if url.contains("unreachable") {
                return Err(HarnessError::Browser("net::ERR_NAME_NOT_RESOLVED".into()));
            }
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
        fn set_viewport(&self, viewport: Viewport) -> Result<()> {
            if viewport.width > 3840 {
                return Err(HarnessError::Browser("viewport exceeds screen".into()));
            }
            self.viewports.borrow_mut().push(viewport);
            Ok(())
        }
        fn screenshot(&self, path: &Path) -> Result<PathBuf> {
            std::fs::create_dir_all(path.parent().unwrap())?;
            std::fs::write(path, b"png")?;
            Ok(path.to_path_buf())
        }
    }

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.report.output_dir = dir.to_path_buf();
        config
    }

    const PAGE: &str = r#"<html><body><h1>Hi</h1><img src="x.png"></body></html>"#;

    #[test]
    fn test_slugs() {
        assert_eq!(page_slug("https://www.example.com"), "www.example.com");
        assert_eq!(page_slug("https://www.w3.org/WAI/demos/bad/"), "www.w3.org_WAI_demos_bad");
        assert_eq!(page_slug("file:///tests/sites/form_labels.html"), "tests_sites_form_labels.html");
        assert_eq!(page_slug("https://"), "page");
        assert_eq!(
            visit_slug("http://localhost:8000", Some(Viewport::new(375, 667))),
            "localhost:8000_mobile"
        );
    }

    #[test]
    fn test_run_writes_reports_and_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let session = FakeSession::new(PAGE);

        let targets = vec!["https://example.com".to_string(), "https://unreachable.test".to_string()];
        let summary = Runner::new(&session, &config).run(&targets);

        assert_eq!(summary.visits.len(), 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.total_violations(), 1);
        assert_eq!(summary.total_structural_issues(), 1);
        assert!(summary.has_problems());

        assert!(dir.path().join("accessibility_example.com.html").is_file());
        assert!(dir.path().join("accessibility_example.com.json").is_file());
        assert!(dir.path().join("screenshots/screenshot_example.com.png").is_file());

        let dashboard = std::fs::read_to_string(summary.dashboard.unwrap()).unwrap();
        assert!(dashboard.contains("accessibility_example.com.html"));

        let runs = session.runs.borrow();
        assert_eq!(
            runs[0],
            Some(json!({ "runOnly": { "type": "tag", "values": ["wcag2a", "wcag2aa"] } }))
        );
    }

    #[test]
    fn test_viewport_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.scan.viewports = vec![Viewport::new(375, 667), Viewport::new(1920, 1080)];
        config.report.formats = vec![OutputFormat::Json];
        config.report.screenshots = false;
        let session = FakeSession::new(PAGE);

        let mut summary = RunSummary::default();
        Runner::new(&session, &config).visit("https://example.com", &mut summary);

        assert_eq!(summary.visits.len(), 3);
        assert_eq!(session.viewports.borrow().len(), 3);
        assert!(dir.path().join("accessibility_example.com_mobile.json").is_file());
        assert!(dir.path().join("accessibility_example.com_desktop.json").is_file());
        assert!(!dir.path().join(SCREENSHOT_DIR).exists());
    }

    #[test]
    fn test_default_visit_restores_window_after_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.scan.viewports = vec![Viewport::new(375, 667)];
        config.report.formats = vec![OutputFormat::Json];
        config.report.screenshots = false;
        let session = FakeSession::new(PAGE);

        let targets = vec!["https://a.test".to_string(), "https://b.test".to_string()];
        let summary = Runner::new(&session, &config).run(&targets);

        assert_eq!(summary.visits.len(), 4);
        let window = config.browser.window;
        let mobile = Viewport::new(375, 667);
        assert_eq!(*session.viewports.borrow(), vec![window, mobile, window, mobile]);
        assert!(dir.path().join("accessibility_b.test.json").is_file());
        assert!(dir.path().join("accessibility_b.test_mobile.json").is_file());
    }

    #[test]
    fn test_failed_viewport_keeps_earlier_visits() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.scan.viewports = vec![Viewport::new(375, 667), Viewport::new(4000, 3000)];
        config.report.formats = vec![OutputFormat::Json];
        config.report.screenshots = false;
        let session = FakeSession::new(PAGE);

        let summary = Runner::new(&session, &config).run(&["https://example.com".to_string()]);

        assert_eq!(summary.visits.len(), 2);
        assert_eq!(summary.visits[1].viewport, Some(Viewport::new(375, 667)));
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "https://example.com @ 4000x3000");
        assert!(dir.path().join("accessibility_example.com_mobile.json").is_file());
    }

    #[test]
    fn test_rule_sweep_skips_unsafe_rule_ids() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path().join("out").as_path());
        let session = FakeSession::new(PAGE);
        let rules = vec!["../escape".to_string(), "Label".to_string(), "image-alt".to_string()];

        let outcomes = Runner::new(&session, &config).rule_sweep("https://example.com", &rules).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(session.runs.borrow().len(), 1);
        assert!(!dir.path().join("escape.html").exists());
        assert!(dir.path().join("out/rule_image-alt.html").is_file());
    }

    #[test]
    fn test_rule_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let session = FakeSession::new(PAGE);
        let rules: Vec<String> = ESSENTIAL_RULES.iter().map(|r| r.to_string()).collect();

        let outcomes = Runner::new(&session, &config).rule_sweep("https://example.com", &rules).unwrap();

        assert_eq!(outcomes.len(), ESSENTIAL_RULES.len());
        assert_eq!(session.opened.borrow().len(), 1);
        assert!(dir.path().join("rule_color-contrast.html").is_file());
        assert!(outcomes.iter().all(|o| o.report.structural_audit.is_none()));
        assert_eq!(
            session.runs.borrow()[1],
            Some(json!({ "runOnly": { "type": "rule", "values": ["label"] } }))
        );
    }

    #[test]
    fn test_structural_checks_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.scan.structural_checks = false;
        config.report.dashboard = false;
        let session = FakeSession::new(PAGE);

        let summary = Runner::new(&session, &config).run(&["https://example.com".to_string()]);
        assert!(summary.dashboard.is_none());
        assert_eq!(summary.total_structural_issues(), 0);
    }
}
