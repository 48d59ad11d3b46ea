//! Output file layout.
//!
//! Every lecture is written to a path derived only from the course title
//! and the lecture position:
//!
//! ```text
//! {output_dir}/{course_stem}_lecture{position}.pdf
//! {output_dir}/{course_stem}_ALL.pdf
//! ```
//!
//! Because the path never depends on run state, a later run finds the
//! files of an earlier one and skips them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::normalize::sanitize_file_stem;

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "pdf";

/// Maps courses and lectures onto files in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: PathBuf,
}

impl OutputLayout {
    /// Create a layout rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Capture path of one lecture.
    pub fn lecture_path(&self, course_title: &str, position: usize) -> PathBuf {
        self.dir.join(format!(
            "{}_lecture{}.pdf",
            sanitize_file_stem(course_title),
            position
        ))
    }

    /// Path of a course's merged document.
    pub fn merged_path(&self, course_title: &str) -> PathBuf {
        self.dir
            .join(format!("{}_ALL.pdf", sanitize_file_stem(course_title)))
    }
}

/// Temporary sibling path used while a file is being written.
///
/// Writers create this file first and rename it onto `path` once the
/// content is complete.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Remove a file that must not be left behind.
///
/// Returns `true` when nothing remains at `path`. A failed removal is
/// logged with the path and returns `false`.
pub fn discard(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            log::warn!("Could not remove {}: {}", path.display(), e);
            false
        }
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}
