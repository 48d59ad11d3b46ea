//! Capturing one lecture page as a PDF file.
//!
//! [`capture`] is idempotent: when the destination file already exists it
//! reports success without touching the browser. Otherwise it retries a
//! fixed number of times with a fixed backoff. Failures never escape as
//! errors; they come back as [`CaptureOutcome::Failed`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::{PageDriver, PdfOptions};
use crate::detect;
use crate::error::{Error, Result};
use crate::layout;

/// Options for capturing lecture pages.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Number of attempts per lecture (at least 1)
    pub max_attempts: u32,

    /// Navigation timeout for each attempt on a lecture page.
    ///
    /// Login, course list and course pages use
    /// [`Timeouts::navigation`](crate::portal::Timeouts::navigation) instead.
    pub navigation_timeout: Duration,

    /// Pause after the page has loaded, before rendering
    pub settle: Duration,

    /// Pause after a failed attempt
    pub backoff: Duration,

    /// Rendering options
    pub pdf: PdfOptions,
}

impl CaptureOptions {
    /// Create new capture options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of attempts (clamped to at least 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the navigation timeout.
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set the settle pause.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Set the backoff pause.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the rendering options.
    pub fn with_pdf_options(mut self, pdf: PdfOptions) -> Self {
        self.pdf = pdf;
        self
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            navigation_timeout: Duration::from_secs(60),
            settle: Duration::from_millis(1500),
            backoff: Duration::from_secs(2),
            pdf: PdfOptions::default(),
        }
    }
}

/// Result of capturing one lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaptureOutcome {
    /// The file existed before; nothing was done.
    AlreadyPresent,

    /// The page was rendered on the given attempt.
    Saved { attempt: u32 },

    /// Every attempt failed.
    Failed { attempts: u32, last_error: String },
}

impl CaptureOutcome {
    /// Whether a usable file exists at the destination.
    pub fn is_success(&self) -> bool {
        !matches!(self, CaptureOutcome::Failed { .. })
    }
}

/// Render `url` to `destination`, retrying on failure.
pub fn capture<D: PageDriver>(
    driver: &mut D,
    url: &str,
    destination: &Path,
    options: &CaptureOptions,
) -> CaptureOutcome {
    if destination.exists() {
        log::info!("Already downloaded: {}", destination.display());
        return CaptureOutcome::AlreadyPresent;
    }

    let attempts = options.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match attempt_capture(driver, url, destination, options) {
            Ok(()) => {
                log::info!("Saved: {}", destination.display());
                return CaptureOutcome::Saved { attempt };
            }
            Err(e) => {
                match &e {
                    Error::Timeout(..) => log::warn!(
                        "Timed out loading lecture {}, attempt {}/{}",
                        url,
                        attempt,
                        attempts
                    ),
                    _ => log::warn!(
                        "Failed to save lecture {}: {}, attempt {}/{}",
                        url,
                        e,
                        attempt,
                        attempts
                    ),
                }
                last_error = e.to_string();
                if attempt < attempts {
                    driver.pause(options.backoff);
                }
            }
        }
    }

    log::error!(
        "Could not save lecture {} after {} attempts",
        url,
        attempts
    );
    CaptureOutcome::Failed {
        attempts,
        last_error,
    }
}

fn attempt_capture<D: PageDriver>(
    driver: &mut D,
    url: &str,
    destination: &Path,
    options: &CaptureOptions,
) -> Result<()> {
    driver.navigate(url, options.navigation_timeout)?;
    driver.pause(options.settle);
    driver.render_pdf(destination, &options.pdf)?;

    // A login page or error page rendered as HTML is not a lecture.
    match detect::read_header(destination) {
        Ok(header) => {
            log::debug!("Rendered {} as PDF {}", url, header.version);
            Ok(())
        }
        Err(e) => {
            if !layout::discard(destination) {
                log::warn!(
                    "Invalid render of {} is still at {}; delete it before the next run",
                    url,
                    destination.display()
                );
            }
            Err(e)
        }
    }
}
