//! Chrome implementation of [`PageDriver`] using `headless_chrome`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};

use super::driver::{Extract, PageDriver, PdfOptions};
use crate::error::{Error, Result};
use crate::layout::{discard, partial_path};

/// How often `wait_for_url` polls the page URL.
const URL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Options for launching Chrome.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// Run without a visible window
    pub headless: bool,

    /// Window size in pixels
    pub window_size: (u32, u32),

    /// Chrome executable (auto-detected when `None`)
    pub executable: Option<PathBuf>,

    /// How long the browser may stay idle before the connection is dropped
    pub idle_timeout: Duration,
}

impl ChromeOptions {
    /// Create new launch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show or hide the browser window.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Use a specific Chrome executable.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1280, 1024),
            executable: None,
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// A single Chrome tab driven over the DevTools protocol.
pub struct ChromeDriver {
    // Dropping the browser kills the Chrome process.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    /// Launch Chrome and open one tab.
    pub fn launch(options: &ChromeOptions) -> Result<Self> {
        let launch = LaunchOptions::default_builder()
            .headless(options.headless)
            .window_size(Some(options.window_size))
            .path(options.executable.clone())
            .idle_browser_timeout(options.idle_timeout)
            .build()
            .map_err(|e| Error::Browser(e.to_string()))?;

        let browser = Browser::new(launch).map_err(browser_error)?;
        let tab = browser.new_tab().map_err(browser_error)?;
        log::debug!("Chrome launched (headless: {})", options.headless);

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Evaluate a script returning a JSON-encoded string array.
    fn eval_string_list(&self, script: &str) -> Result<Vec<String>> {
        let result = self.tab.evaluate(script, false).map_err(browser_error)?;
        let json = result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::Browser("script returned no value".to_string()))?;
        serde_json::from_str(json).map_err(|e| Error::Browser(e.to_string()))
    }
}

impl PageDriver for ChromeDriver {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.tab.set_default_timeout(timeout);
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(browser_error)?;
        Ok(())
    }

    fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|_| Error::Timeout(timeout.as_millis(), selector.to_string()))?;
        Ok(())
    }

    fn extract(&mut self, selector: &str, what: &Extract) -> Result<Vec<String>> {
        let selector = serde_json::to_string(selector).map_err(|e| Error::Other(e.to_string()))?;
        let mapper = match what {
            Extract::Text => "(e.textContent || '').trim()".to_string(),
            Extract::Property(name) => {
                let name = serde_json::to_string(name).map_err(|e| Error::Other(e.to_string()))?;
                format!("String(e[{name}] ?? e.getAttribute({name}) ?? '')")
            }
        };
        let script = format!(
            "JSON.stringify(Array.from(document.querySelectorAll({selector})).map(e => {mapper}))"
        );
        self.eval_string_list(&script)
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        self.tab
            .find_element(selector)
            .and_then(|el| el.type_into(value).map(|_| ()))
            .map_err(browser_error)
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        self.tab
            .find_element(selector)
            .and_then(|el| el.click().map(|_| ()))
            .map_err(browser_error)
    }

    fn wait_for_url(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.tab.get_url() == url {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(timeout.as_millis(), url.to_string()));
            }
            std::thread::sleep(URL_POLL_INTERVAL);
        }
    }

    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn render_pdf(&mut self, path: &Path, options: &PdfOptions) -> Result<()> {
        let (width, height) = options.paper.inches();
        let print = PrintToPdfOptions {
            landscape: Some(options.landscape),
            print_background: Some(options.print_background),
            paper_width: Some(width),
            paper_height: Some(height),
            ..Default::default()
        };
        let bytes = self.tab.print_to_pdf(Some(print)).map_err(browser_error)?;

        // Only complete files appear under the final name.
        let partial = partial_path(path);
        if let Err(e) = fs::write(&partial, &bytes) {
            discard(&partial);
            return Err(e.into());
        }
        fs::rename(&partial, path)?;
        Ok(())
    }
}

fn browser_error(err: impl std::fmt::Display) -> Error {
    Error::Browser(err.to_string())
}
