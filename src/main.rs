// SPDX-License-Identifier: PMPL-1.0-or-later
//! a11ybot CLI - browser-driven WCAG accessibility testing

use a11ybot::analyzers::run_structural_audit;
use a11ybot::config::{self, AxeSource, Config, Viewport};
use a11ybot::glossary;
use a11ybot::model::WcagLevel;
use a11ybot::page::browser::BrowserSession;
use a11ybot::page::static_page::StaticPage;
use a11ybot::report::{aggregate, dashboard, generate_report, OutputFormat};
use a11ybot::runner::{Runner, RunSummary, ESSENTIAL_RULES};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Browser-driven WCAG accessibility testing with axe-core
#[derive(Parser)]
#[command(name = "a11ybot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan pages in a browser and write reports
    Scan {
        /// URLs to test (defaults to the config file's targets)
        urls: Vec<String>,

        #[command(flatten)]
        session: SessionArgs,

        /// WCAG conformance level
        #[arg(long, short, env = "A11YBOT_WCAG_LEVEL", ignore_case = true)]
        wcag: Option<WcagLevelArg>,

        /// Specific axe rules to run (comma-separated)
        #[arg(long, short, env = "A11YBOT_RULES", value_delimiter = ',')]
        rules: Vec<String>,

        /// Extra viewport to test each page at, as WIDTHxHEIGHT (repeatable)
        #[arg(long)]
        viewport: Vec<Viewport>,

        /// Skip the keyboard/alt/label/heading checks
        #[arg(long)]
        no_structural: bool,

        /// Do not capture screenshots
        #[arg(long)]
        no_screenshots: bool,

        /// Do not regenerate the dashboard
        #[arg(long)]
        no_dashboard: bool,

        /// Exit with status 1 when any page has violations or structural issues
        #[arg(long)]
        fail_on_violations: bool,
    },

    /// Run the structural checks on a local HTML file (no browser)
    Audit {
        /// HTML file to audit
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Test individual axe rules against one page, one report per rule
    Rules {
        /// Page to test
        url: String,

        /// Rules to test (comma-separated; defaults to the essential set)
        #[arg(long, short, env = "A11YBOT_RULES", value_delimiter = ',')]
        rules: Vec<String>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Rebuild the dashboard for a report directory
    Dashboard {
        /// Report directory
        #[arg(long, short, env = "A11YBOT_OUTPUT", default_value = "reports")]
        output: PathBuf,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Explain a WCAG term, criterion or axe rule id
    Glossary {
        /// Term to look up; lists all success criteria when omitted
        term: Option<String>,

        /// List every entry, including rule ids and general terms
        #[arg(long, conflicts_with = "term")]
        all: bool,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write it
        #[arg(default_value = "a11ybot.toml")]
        path: PathBuf,
    },
}

/// Options shared by every command that launches a browser
#[derive(Args)]
struct SessionArgs {
    /// Configuration file
    #[arg(long, short, env = "A11YBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Browser to use (chrome, chromium)
    #[arg(long, short, env = "A11YBOT_BROWSER")]
    browser: Option<String>,

    /// Run the browser without a window
    #[arg(long, env = "A11YBOT_HEADLESS")]
    headless: bool,

    /// Local axe-core script instead of the CDN build
    #[arg(long, env = "A11YBOT_AXE_FILE")]
    axe_file: Option<PathBuf>,

    /// Output directory for reports
    #[arg(long, short, env = "A11YBOT_OUTPUT")]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

impl SessionArgs {
    /// Load the config file and layer these flags over it
    fn load(&self) -> anyhow::Result<Config> {
        let path = self.config.clone().unwrap_or_else(config::default_config_path);
        let mut config = config::load_config(&path)?;

        if let Some(browser) = &self.browser {
            config.browser.name = browser.clone();
        }
        if self.headless {
            config.browser.headless = true;
        }
        if let Some(file) = &self.axe_file {
            config.scan.axe = AxeSource::File(file.clone());
        }
        if let Some(output) = &self.output {
            config.report.output_dir = output.clone();
        }
        Ok(config)
    }
}

/// WCAG conformance level CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WcagLevelArg {
    /// Level A - minimum
    A,
    /// Level AA - standard
    Aa,
    /// Level AAA - enhanced
    Aaa,
}

impl From<WcagLevelArg> for WcagLevel {
    fn from(arg: WcagLevelArg) -> Self {
        match arg {
            WcagLevelArg::A => WcagLevel::A,
            WcagLevelArg::Aa => WcagLevel::AA,
            WcagLevelArg::Aaa => WcagLevel::AAA,
        }
    }
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// Standalone HTML page
    Html,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("a11ybot=debug")
        } else {
            EnvFilter::new("a11ybot=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            urls,
            session,
            wcag,
            rules,
            viewport,
            no_structural,
            no_screenshots,
            no_dashboard,
            fail_on_violations,
        } => {
            init_logging(session.verbose);
            let mut config = session.load()?;

            if let Some(level) = wcag {
                config.scan.level = level.into();
            }
            if !rules.is_empty() {
                config.scan.rules = rules;
            }
            config.scan.viewports.extend(viewport);
            config.scan.structural_checks &= !no_structural;
            config.report.screenshots &= !no_screenshots;
            config.report.dashboard &= !no_dashboard;

            let targets = if urls.is_empty() { config.targets.clone() } else { urls };
            if targets.is_empty() {
                anyhow::bail!("No URLs given and no targets in the configuration file");
            }

            let browser = BrowserSession::launch(&config.browser, config.scan.axe.clone())?;
            let summary = Runner::new(&browser, &config).run(&targets);
            browser.close()?;

            print_summary(&summary);

            if summary.visits.is_empty() {
                anyhow::bail!("Every target failed to load");
            }
            if fail_on_violations && summary.has_problems() {
                std::process::exit(1);
            }
        }

        Commands::Audit { file, format, output, verbose } => {
            init_logging(verbose);
            let page = StaticPage::from_file(&file)?;
            let audit = run_structural_audit(&page);
            let report = aggregate(None, Some(audit), &file_url(&file));
            write_output(&generate_report(&report, format.into()), output.as_deref())?;

            if report.has_problems() {
                std::process::exit(1);
            }
        }

        Commands::Rules { url, rules, session } => {
            init_logging(session.verbose);
            let config = session.load()?;
            let rules = if rules.is_empty() {
                ESSENTIAL_RULES.iter().map(|r| r.to_string()).collect()
            } else {
                rules
            };

            let browser = BrowserSession::launch(&config.browser, config.scan.axe.clone())?;
            let runner = Runner::new(&browser, &config);
            let outcomes = runner.rule_sweep(&url, &rules);
            let dashboard = runner.finish();
            browser.close()?;

            for outcome in outcomes? {
                println!(
                    "{}: {} violation(s)",
                    outcome.files.first().map(|p| p.display().to_string()).unwrap_or_default(),
                    outcome.report.violation_count()
                );
            }
            if let Some(path) = dashboard {
                println!("Dashboard available at: {}", path.display());
            }
        }

        Commands::Dashboard { output, verbose } => {
            init_logging(verbose);
            let path = dashboard::create_dashboard(&output)?;
            println!("Dashboard available at: {}", path.display());
        }

        Commands::Glossary { term, all } => match term {
            Some(term) => match glossary::explain(&term) {
                Some(text) => println!("{}: {}", term, text),
                None => {
                    eprintln!("No glossary entry for '{}'", term);
                    for (key, text) in glossary::terms_with_prefix(&term) {
                        eprintln!("  {}: {}", key, text);
                    }
                    std::process::exit(1);
                }
            },
            None => {
                let entries = if all { glossary::all_terms() } else { glossary::guidelines() };
                for (key, text) in entries {
                    println!("{:<16} {}", key, text);
                }
            }
        },

        Commands::InitConfig { path } => {
            config::write_default_config(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    for visit in &summary.visits {
        let at = visit
            .viewport
            .map(|v| format!(" @ {} ({})", v, v.device_name()))
            .unwrap_or_default();
        println!(
            "{}{}: {} violation(s), {} structural issue(s)",
            visit.url,
            at,
            visit.report.violation_count(),
            visit.report.structural_issue_count()
        );
        for file in &visit.files {
            println!("  {}", file.display());
        }
    }
    for (url, error) in &summary.failures {
        println!("{}: FAILED ({})", url, error);
    }
    if let Some(path) = &summary.dashboard {
        println!("Dashboard available at: {}", path.display());
    }
    info!(
        violations = summary.total_violations(),
        structural_issues = summary.total_structural_issues(),
        "Run complete"
    );
}

fn file_url(path: &Path) -> String {
    let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
