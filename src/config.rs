// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration handling for a11ybot
//!
//! Settings come from an optional TOML file; the CLI layers flag and
//! `A11YBOT_*` environment overrides on top of whatever is loaded here.

use crate::error::{HarnessError, Result};
use crate::model::WcagLevel;
use crate::report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default axe-core build injected when no local script is configured
pub const DEFAULT_AXE_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/axe-core/4.9.1/axe.min.js";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// URLs to visit
    #[serde(default)]
    pub targets: Vec<String>,

    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Rule engine and audit settings
    #[serde(default)]
    pub scan: ScanSettings,

    /// Report output settings
    #[serde(default)]
    pub report: ReportSettings,
}

/// Supported browsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Chromium,
}

impl BrowserKind {
    /// Resolve a browser name; anything unsupported falls back to Chrome
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "chrome" | "google-chrome" => BrowserKind::Chrome,
            "chromium" => BrowserKind::Chromium,
            other => {
                warn!("Browser {} not supported. Using Chrome instead.", other);
                BrowserKind::Chrome
            }
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserKind::Chrome => write!(f, "chrome"),
            BrowserKind::Chromium => write!(f, "chromium"),
        }
    }
}

/// Window or viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Device class used in report names
    pub fn device_name(&self) -> &'static str {
        match self.width {
            0..=375 => "mobile",
            376..=768 => "tablet",
            769..=1366 => "laptop",
            _ => "desktop",
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1366, 768)
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("Viewport must look like WIDTHxHEIGHT, got {}", s))?;
        let width = w.trim().parse().map_err(|_| format!("Bad viewport width: {}", w))?;
        let height = h.trim().parse().map_err(|_| format!("Bad viewport height: {}", h))?;
        Ok(Self::new(width, height))
    }
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Browser name (chrome, chromium)
    #[serde(default = "default_browser")]
    pub name: String,

    /// Run without a visible window
    #[serde(default)]
    pub headless: bool,

    /// Explicit browser binary
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Pause after navigation before scanning, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Initial window size
    #[serde(default)]
    pub window: Viewport,
}

impl BrowserSettings {
    pub fn kind(&self) -> BrowserKind {
        BrowserKind::from_name(&self.name)
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            name: default_browser(),
            headless: false,
            executable: None,
            settle_ms: default_settle_ms(),
            window: Viewport::default(),
        }
    }
}

fn default_browser() -> String {
    "chrome".to_string()
}

fn default_settle_ms() -> u64 {
    1000
}

/// Where the axe-core script comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxeSource {
    /// Loaded by the page from a URL
    Url(String),
    /// Read from disk and evaluated in the page
    File(PathBuf),
}

impl Default for AxeSource {
    fn default() -> Self {
        AxeSource::Url(DEFAULT_AXE_URL.to_string())
    }
}

/// Rule engine and structural audit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// WCAG conformance level to test
    #[serde(default)]
    pub level: WcagLevel,

    /// Explicit axe rule ids; overrides the level's tags when non-empty
    #[serde(default)]
    pub rules: Vec<String>,

    /// CSS selector limiting the rule engine's scope
    #[serde(default = "default_context")]
    pub context: String,

    /// Run the keyboard/alt/label/heading checks alongside the engine
    #[serde(default = "default_true")]
    pub structural_checks: bool,

    /// Additional viewports to re-scan each target at
    #[serde(default)]
    pub viewports: Vec<Viewport>,

    /// axe-core script source
    #[serde(default)]
    pub axe: AxeSource,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            level: WcagLevel::default(),
            rules: Vec::new(),
            context: default_context(),
            axe: AxeSource::default(),
            structural_checks: true,
            viewports: Vec::new(),
        }
    }
}

fn default_context() -> String {
    "body".to_string()
}

fn default_true() -> bool {
    true
}

/// Report output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Directory receiving reports, screenshots and the dashboard
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Capture a full-page screenshot per visit
    #[serde(default = "default_true")]
    pub screenshots: bool,

    /// Regenerate the dashboard after a run
    #[serde(default = "default_true")]
    pub dashboard: bool,

    /// Formats written per page visit
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            screenshots: true,
            dashboard: true,
            formats: default_formats(),
        }
    }
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Html, OutputFormat::Json]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// Load configuration from a path; a missing file yields the defaults
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Get the default config path
pub fn default_config_path() -> PathBuf {
    PathBuf::from("a11ybot.toml")
}

/// Write default configuration to a file
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(HarnessError::Config(format!(
            "{} already exists; refusing to overwrite",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.browser.kind(), BrowserKind::Chrome);
        assert_eq!(config.browser.window, Viewport::new(1366, 768));
        assert_eq!(config.scan.level, WcagLevel::AA);
        assert_eq!(config.scan.context, "body");
        assert_eq!(config.report.output_dir, PathBuf::from("reports"));
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_unknown_browser_falls_back() {
        assert_eq!(BrowserKind::from_name("netscape"), BrowserKind::Chrome);
        assert_eq!(BrowserKind::from_name("Chromium"), BrowserKind::Chromium);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            targets = ["https://example.com"]

            [browser]
            headless = true

            [scan]
            level = "AAA"
            rules = ["label"]
            viewports = [{ width = 375, height = 667 }]

            [scan.axe]
            file = "vendor/axe.min.js"
            "#,
        )
        .unwrap();

        assert!(config.browser.headless);
        assert_eq!(config.browser.name, "chrome");
        assert_eq!(config.scan.level, WcagLevel::AAA);
        assert_eq!(config.scan.axe, AxeSource::File(PathBuf::from("vendor/axe.min.js")));
        assert_eq!(config.scan.viewports[0].device_name(), "mobile");
        assert!(config.report.dashboard);
        assert_eq!(config.report.formats, vec![OutputFormat::Html, OutputFormat::Json]);
    }

    #[test]
    fn test_viewport_parse_and_names() {
        assert_eq!("768x1024".parse::<Viewport>().unwrap(), Viewport::new(768, 1024));
        assert!("wide".parse::<Viewport>().is_err());
        assert_eq!(Viewport::new(768, 1024).device_name(), "tablet");
        assert_eq!(Viewport::new(1366, 768).device_name(), "laptop");
        assert_eq!(Viewport::new(1920, 1080).device_name(), "desktop");
    }

    #[test]
    fn test_load_missing_and_write_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a11ybot.toml");

        let config = load_config(&path).unwrap();
        assert_eq!(config.scan.level, WcagLevel::AA);

        write_default_config(&path).unwrap();
        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded.browser.window, Viewport::new(1366, 768));
        assert!(write_default_config(&path).is_err());
    }
}
