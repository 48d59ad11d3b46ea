//! Page driver abstraction.
//!
//! The traversal talks to the portal only through [`PageDriver`]. One
//! driver stands for one browser page that is reused for every
//! navigation, so all methods take `&mut self`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What to read from each element matched by a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extract {
    /// Trimmed text content
    Text,
    /// A DOM property such as `href` (resolved to an absolute URL by the page)
    Property(String),
}

impl Extract {
    /// Shorthand for the `href` property.
    pub fn href() -> Self {
        Extract::Property("href".to_string())
    }
}

/// Paper size of rendered PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PaperFormat {
    /// 210 x 297 mm
    #[default]
    A4,
    /// 8.5 x 11 in
    Letter,
    /// Custom size in inches
    Custom { width: f64, height: f64 },
}

impl PaperFormat {
    /// Paper width and height in inches.
    pub fn inches(&self) -> (f64, f64) {
        match *self {
            PaperFormat::A4 => (8.27, 11.69),
            PaperFormat::Letter => (8.5, 11.0),
            PaperFormat::Custom { width, height } => (width, height),
        }
    }
}

/// Options for rendering the loaded page to PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    /// Paper size
    pub paper: PaperFormat,

    /// Print background colors and images
    pub print_background: bool,

    /// Landscape orientation
    pub landscape: bool,
}

impl PdfOptions {
    /// Create new PDF options with defaults (A4, backgrounds on).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the paper size.
    pub fn with_paper(mut self, paper: PaperFormat) -> Self {
        self.paper = paper;
        self
    }

    /// Enable or disable background graphics.
    pub fn with_background(mut self, print_background: bool) -> Self {
        self.print_background = print_background;
        self
    }

    /// Enable or disable landscape orientation.
    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.landscape = landscape;
        self
    }
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            paper: PaperFormat::A4,
            print_background: true,
            landscape: false,
        }
    }
}

/// Abstract interface for one browser page.
///
/// Every blocking call carries its own timeout; expiry is returned as an
/// error and never panics.
pub trait PageDriver {
    /// Navigate to `url` and wait until the document has loaded.
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait until at least one element matches `selector`.
    fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Read a value from every element matching `selector`, in document order.
    fn extract(&mut self, selector: &str, what: &Extract) -> Result<Vec<String>>;

    /// Type `value` into the first element matching `selector`.
    fn fill(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Click the first element matching `selector`.
    fn click(&mut self, selector: &str) -> Result<()>;

    /// Wait until the page URL equals `url`.
    fn wait_for_url(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Block for a fixed duration.
    fn pause(&mut self, duration: Duration);

    /// Render the currently loaded page to a PDF file at `path`.
    ///
    /// Either a complete file exists at `path` afterwards or none does.
    fn render_pdf(&mut self, path: &Path, options: &PdfOptions) -> Result<()>;
}

impl<D: PageDriver + ?Sized> PageDriver for &mut D {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        (**self).navigate(url, timeout)
    }

    fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        (**self).wait_for_element(selector, timeout)
    }

    fn extract(&mut self, selector: &str, what: &Extract) -> Result<Vec<String>> {
        (**self).extract(selector, what)
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        (**self).fill(selector, value)
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        (**self).click(selector)
    }

    fn wait_for_url(&mut self, url: &str, timeout: Duration) -> Result<()> {
        (**self).wait_for_url(url, timeout)
    }

    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }

    fn render_pdf(&mut self, path: &Path, options: &PdfOptions) -> Result<()> {
        (**self).render_pdf(path, options)
    }
}
