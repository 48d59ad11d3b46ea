//! Browser access.
//!
//! [`PageDriver`] is the only way the rest of the crate touches a web
//! page. [`ChromeDriver`] implements it on top of `headless_chrome` when
//! the `chrome` feature is enabled (the default).

#[cfg(feature = "chrome")]
mod chrome;
mod driver;

#[cfg(feature = "chrome")]
pub use chrome::{ChromeDriver, ChromeOptions};
pub use driver::{Extract, PageDriver, PaperFormat, PdfOptions};
