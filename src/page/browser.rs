// SPDX-License-Identifier: PMPL-1.0-or-later
//! Live browser adapter over the Chrome DevTools Protocol.
//!
//! `chromiumoxide` is async; the structural checks and the scanner are not.
//! [`BrowserSession`] owns a tokio runtime and blocks on each protocol call,
//! so callers see a plain synchronous [`PageQuery`] / [`RuleEngine`].

use crate::config::{AxeSource, BrowserKind, BrowserSettings, Viewport};
use crate::error::{HarnessError, Result};
use crate::page::{ElementHandle, Key, PageError, PageQuery};
use crate::scanner::RuleEngine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Focus the receiver, or clear focus when the receiver is the document body
const FOCUS_FN: &str = "function() {
    if (this === document.body || this === document.documentElement) {
        if (document.activeElement) { document.activeElement.blur(); }
    } else {
        this.focus();
    }
}";

const TAG_NAME_FN: &str = "function() { return this.tagName.toLowerCase(); }";

/// One browser process with a single page
pub struct BrowserSession {
    runtime: Runtime,
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    axe: AxeSource,
    settle: Duration,
    elements: RefCell<HashMap<ElementHandle, Element>>,
}

impl BrowserSession {
    /// Launch the configured browser and open a blank page
    pub fn launch(settings: &BrowserSettings, axe: AxeSource) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let kind = settings.kind();
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .window_size(settings.window.width, settings.window.height);

        if !settings.headless {
            builder = builder.with_head();
        }

        if let Some(exe) = settings.executable.clone().or_else(|| locate_executable(kind)) {
            debug!("Using browser binary {}", exe.display());
            builder = builder.chrome_executable(exe);
        }

        let config = builder.build().map_err(HarnessError::Browser)?;

        info!(browser = %kind, headless = settings.headless, "Launching browser");
        let (browser, mut handler) = runtime.block_on(Browser::launch(config))?;

        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = runtime.block_on(browser.new_page("about:blank"))?;

        Ok(Self {
            runtime,
            browser,
            page,
            handler,
            axe,
            settle: Duration::from_millis(settings.settle_ms),
            elements: RefCell::new(HashMap::new()),
        })
    }

    /// Navigate and give the page time to settle
    pub fn open(&self, url: &str) -> Result<()> {
        info!("Opening {}", url);
        self.elements.borrow_mut().clear();
        self.runtime.block_on(self.page.goto(url))?;
        std::thread::sleep(self.settle);
        Ok(())
    }

    /// Emulate a viewport size and let the layout settle
    pub fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        debug!("Resizing viewport to {}", viewport);
        let params = SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            1.0,
            false,
        );
        self.runtime.block_on(self.page.execute(params))?;
        std::thread::sleep(self.settle);
        Ok(())
    }

    /// Save a full-page PNG screenshot
    pub fn screenshot(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let params = ScreenshotParams::builder().full_page(true).build();
        self.runtime.block_on(self.page.save_screenshot(params, path))?;
        info!("Screenshot saved to {}", path.display());
        Ok(path.to_path_buf())
    }

    /// Shut the browser down and wait for the process to exit
    pub fn close(self) -> Result<()> {
        let BrowserSession { runtime, mut browser, handler, .. } = self;
        runtime.block_on(async move {
            browser.close().await?;
            if let Err(e) = browser.wait().await {
                warn!("Browser did not exit cleanly: {}", e);
            }
            handler.abort();
            Ok::<(), HarnessError>(())
        })
    }

    fn evaluate(&self, expression: String) -> Result<serde_json::Value> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(HarnessError::Engine)?;

        let result = self.runtime.block_on(self.page.evaluate_expression(params))?;
        Ok(result.into_value().unwrap_or(serde_json::Value::Null))
    }

    fn register(&self, element: Element) -> ElementHandle {
        let handle = ElementHandle::new(*element.backend_node_id.inner() as u64);
        self.elements.borrow_mut().entry(handle).or_insert(element);
        handle
    }

    fn query(&self, selector: &str) -> std::result::Result<Vec<ElementHandle>, PageError> {
        let found = self
            .runtime
            .block_on(self.page.find_elements(selector))
            .map_err(|e| match e {
                CdpError::NotFound => PageError::NotFound(selector.to_string()),
                other => PageError::Transport(other.to_string()),
            });

        match found {
            Ok(elements) => Ok(elements.into_iter().map(|e| self.register(e)).collect()),
            Err(PageError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

fn transport(err: CdpError) -> PageError {
    PageError::Transport(err.to_string())
}

/// Look for a well-known binary name on PATH
fn locate_executable(kind: BrowserKind) -> Option<PathBuf> {
    let names: &[&str] = match kind {
        BrowserKind::Chrome => &["google-chrome", "google-chrome-stable", "chrome"],
        BrowserKind::Chromium => &["chromium", "chromium-browser"],
    };
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .flat_map(|dir| names.iter().map(move |n| dir.join(n)))
        .find(|candidate| candidate.is_file())
}

impl PageQuery for BrowserSession {
    fn find_all(&self, selector: &str) -> std::result::Result<Vec<ElementHandle>, PageError> {
        self.query(selector)
    }

    fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> std::result::Result<Option<String>, PageError> {
        let elements = self.elements.borrow();
        let el = elements.get(&element).ok_or(PageError::StaleElement(element.id()))?;
        self.runtime.block_on(el.attribute(name)).map_err(transport)
    }

    fn tag_name(&self, element: ElementHandle) -> std::result::Result<String, PageError> {
        let elements = self.elements.borrow();
        let el = elements.get(&element).ok_or(PageError::StaleElement(element.id()))?;
        let returned = self
            .runtime
            .block_on(el.call_js_fn(TAG_NAME_FN, false))
            .map_err(transport)?;
        returned
            .result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_lowercase)
            .ok_or(PageError::StaleElement(element.id()))
    }

    fn outer_html(&self, element: ElementHandle) -> std::result::Result<String, PageError> {
        let elements = self.elements.borrow();
        let el = elements.get(&element).ok_or(PageError::StaleElement(element.id()))?;
        let html = self.runtime.block_on(el.outer_html()).map_err(transport)?;
        Ok(html.unwrap_or_default())
    }

    fn active_element(&self) -> std::result::Result<ElementHandle, PageError> {
        if let Some(focused) = self.query(":focus")?.into_iter().next() {
            return Ok(focused);
        }
        self.query("body")?
            .into_iter()
            .next()
            .ok_or_else(|| PageError::NotFound("body".to_string()))
    }

    fn send_key(&self, element: ElementHandle, key: Key) -> std::result::Result<(), PageError> {
        let elements = self.elements.borrow();
        let el = elements.get(&element).ok_or(PageError::StaleElement(element.id()))?;
        self.runtime
            .block_on(async {
                el.call_js_fn(FOCUS_FN, false).await?;
                el.press_key(key.as_str()).await?;
                Ok::<(), CdpError>(())
            })
            .map_err(transport)
    }
}

impl RuleEngine for BrowserSession {
    fn inject(&self) -> Result<()> {
        let expression = match &self.axe {
            AxeSource::File(path) => {
                let source = std::fs::read_to_string(path)?;
                format!("{}\n;typeof window.axe !== 'undefined'", source)
            }
            AxeSource::Url(url) => format!(
                "new Promise((resolve, reject) => {{
                    if (window.axe) {{ resolve(true); return; }}
                    const s = document.createElement('script');
                    s.src = {};
                    s.onload = () => resolve(true);
                    s.onerror = () => reject(new Error('failed to load axe-core'));
                    (document.head || document.documentElement).appendChild(s);
                }})",
                serde_json::to_string(url)?
            ),
        };

        match self.evaluate(expression)? {
            serde_json::Value::Bool(true) => Ok(()),
            other => Err(HarnessError::Engine(format!(
                "axe-core not available after injection (got {})",
                other
            ))),
        }
    }

    fn run(
        &self,
        context: Option<&str>,
        options: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let context = match context {
            Some(selector) => serde_json::to_string(selector)?,
            None => "document".to_string(),
        };
        let options = options
            .map(|o| o.to_string())
            .unwrap_or_else(|| "{}".to_string());

        self.evaluate(format!(
            "axe.run({}, {}).then(r => JSON.parse(JSON.stringify(r)))",
            context, options
        ))
    }
}
